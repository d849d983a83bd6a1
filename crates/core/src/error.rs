//! Error types for the curlflow core.

use thiserror::Error;

/// Errors produced while configuring or driving a particle engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The particle count was zero.
    #[error("invalid particle count {0}: at least one particle is required")]
    InvalidParticleCount(usize),

    /// A numeric parameter was NaN or infinite.
    #[error("parameter '{name}' must be finite, got {value}")]
    NonFinite { name: String, value: f64 },

    /// The spawn diameter was zero, negative or non-finite. Color phases divide
    /// by this value, so it must be strictly positive.
    #[error("invalid spawn diameter {0}: must be finite, positive and within the sampler's range")]
    InvalidSpawnDiameter(f64),

    /// Life span bounds were negative or inverted.
    #[error("invalid life span range [{min}, {max}]")]
    InvalidLifeSpan { min: f64, max: f64 },

    /// A palette name was not present in the registry.
    #[error("unknown palette: {0}")]
    UnknownPalette(String),

    /// An engine name was not recognized by the registry.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// A per-sample operation addressed a sample past the end of the buffers.
    #[error("sample index {index} out of range for {len} samples")]
    IndexOutOfRange { index: usize, len: usize },

    /// Writing a snapshot or other file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Convenience constructor for [`EngineError::NonFinite`].
    pub fn non_finite(name: &str, value: f64) -> Self {
        EngineError::NonFinite {
            name: name.to_string(),
            value,
        }
    }
}
