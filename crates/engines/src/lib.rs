#![deny(unsafe_code)]
//! Engine registry: maps engine names to implementations and writes frame
//! snapshots.
//!
//! This crate sits between `curlflow-core` (which defines the `Engine` trait)
//! and the engine crates (`curlflow-streamline`). The CLI depends on this crate
//! so that dispatch by name lives in one place.

pub mod snapshot;

use curlflow_core::error::EngineError;
use curlflow_core::{Engine, StreamConfig};
use curlflow_streamline::Streamline;
use serde_json::Value;

/// All available engine names.
const ENGINE_NAMES: &[&str] = &["streamline"];

/// Enumeration of all available engines.
///
/// Wraps each engine implementation and delegates `Engine` trait methods.
/// Use [`EngineKind::from_name`] for string-based construction.
pub enum EngineKind {
    /// Curl-noise streamline.
    Streamline(Box<Streamline>),
}

impl EngineKind {
    /// Constructs an engine by name from flat JSON params.
    ///
    /// `seed` overrides any `seed` key in `params`. Returns
    /// `EngineError::UnknownEngine` if the name is not recognized.
    pub fn from_name(name: &str, seed: f64, params: &Value) -> Result<Self, EngineError> {
        match name {
            "streamline" => {
                let config = StreamConfig {
                    seed,
                    ..StreamConfig::from_json(params)
                };
                log::debug!("building engine '{name}' with seed {seed}");
                Ok(EngineKind::Streamline(Box::new(Streamline::new(&config)?)))
            }
            _ => Err(EngineError::UnknownEngine(name.to_string())),
        }
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }

    /// Registry name of the wrapped engine.
    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Streamline(_) => "streamline",
        }
    }

    /// Frames stepped since construction or the last reset.
    pub fn frame(&self) -> u64 {
        match self {
            EngineKind::Streamline(e) => e.frame(),
        }
    }
}

impl Engine for EngineKind {
    fn step(&mut self) -> Result<(), EngineError> {
        match self {
            EngineKind::Streamline(e) => e.step(),
        }
    }

    fn len(&self) -> usize {
        match self {
            EngineKind::Streamline(e) => Engine::len(e.as_ref()),
        }
    }

    fn positions(&self) -> &[f32] {
        match self {
            EngineKind::Streamline(e) => e.positions(),
        }
    }

    fn colors(&self) -> &[f32] {
        match self {
            EngineKind::Streamline(e) => e.colors(),
        }
    }

    fn params(&self) -> Value {
        match self {
            EngineKind::Streamline(e) => e.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            EngineKind::Streamline(e) => e.param_schema(),
        }
    }
}
