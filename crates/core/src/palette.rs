//! Cosine palettes and the named preset registry.
//!
//! A cosine palette maps a scalar phase `t` to a color with one cosine per
//! channel: `a + b * cos(2π (c t + d))`. Vectors `a` and `b` set the per-channel
//! bias and amplitude, `c` the frequency and `d` the phase. The registry is an
//! explicit value handed to a [`ColorGenerator`](crate::color::ColorGenerator)
//! rather than global state.

use crate::error::EngineError;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Four channel vectors plus the phase remap applied before evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CosinePalette {
    pub a: DVec3,
    pub b: DVec3,
    pub c: DVec3,
    pub d: DVec3,
    #[serde(default)]
    pub offset: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl CosinePalette {
    /// Creates a palette with offset 0 and scale 1.
    pub const fn new(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> Self {
        Self::with_remap(a, b, c, d, 0.0, 1.0)
    }

    pub const fn with_remap(
        a: DVec3,
        b: DVec3,
        c: DVec3,
        d: DVec3,
        offset: f64,
        scale: f64,
    ) -> Self {
        Self {
            a,
            b,
            c,
            d,
            offset,
            scale,
        }
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.a.is_finite()
            && self.b.is_finite()
            && self.c.is_finite()
            && self.d.is_finite()
            && self.offset.is_finite()
            && self.scale.is_finite()
    }

    /// Evaluates the three channels at an already remapped phase.
    pub fn channels(&self, phase: f64) -> DVec3 {
        let angle = (self.c * phase + self.d) * std::f64::consts::TAU;
        self.a + self.b * DVec3::new(angle.x.cos(), angle.y.cos(), angle.z.cos())
    }

    // -- Built-in presets --

    /// Grayscale ramp.
    pub const fn grayscale() -> Self {
        Self::with_remap(
            DVec3::splat(0.5),
            DVec3::splat(0.5),
            DVec3::splat(1.0),
            DVec3::ZERO,
            0.5,
            1.0,
        )
    }

    /// Full hue cycle with channels a third of a turn apart.
    pub const fn rainbow() -> Self {
        Self::new(
            DVec3::splat(0.5),
            DVec3::splat(0.5),
            DVec3::splat(1.0),
            DVec3::new(0.0, 0.333, 0.666),
        )
    }

    pub const fn cyan_mauve() -> Self {
        Self::new(
            DVec3::splat(0.5),
            DVec3::splat(0.5),
            DVec3::splat(1.0),
            DVec3::new(0.3, 0.2, 0.2),
        )
    }

    pub const fn sludge() -> Self {
        Self::new(
            DVec3::splat(0.5),
            DVec3::splat(0.5),
            DVec3::new(1.0, 1.0, 0.5),
            DVec3::new(0.8, 0.9, 0.3),
        )
    }

    pub const fn desert() -> Self {
        Self::new(
            DVec3::splat(0.5),
            DVec3::splat(0.5),
            DVec3::new(1.0, 0.7, 0.4),
            DVec3::new(0.0, 0.15, 0.2),
        )
    }

    pub const fn nineties() -> Self {
        Self::new(
            DVec3::splat(0.5),
            DVec3::splat(0.5),
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(0.5, 0.2, 0.25),
        )
    }

    pub const fn green_orange() -> Self {
        Self::new(
            DVec3::new(0.8, 0.5, 0.4),
            DVec3::new(0.2, 0.4, 0.2),
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(0.0, 0.25, 0.25),
        )
    }
}

/// Name of the preset selected when nothing else is configured.
pub const DEFAULT_PRESET: &str = "default";

/// Immutable name-to-palette lookup table.
///
/// Iteration and [`names`](PaletteRegistry::names) follow insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteRegistry {
    entries: Vec<(String, CosinePalette)>,
}

impl PaletteRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The built-in presets.
    pub fn builtin() -> Self {
        Self::empty()
            .with(DEFAULT_PRESET, CosinePalette::grayscale())
            .with("rainbow", CosinePalette::rainbow())
            .with("cyanMauve", CosinePalette::cyan_mauve())
            .with("sludge", CosinePalette::sludge())
            .with("desert", CosinePalette::desert())
            .with("nineties", CosinePalette::nineties())
            .with("greenOrange", CosinePalette::green_orange())
    }

    /// Returns a registry with `palette` registered under `name`, replacing any
    /// existing entry of that name in place.
    pub fn with(mut self, name: &str, palette: CosinePalette) -> Self {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = palette,
            None => self.entries.push((name.to_string(), palette)),
        }
        self
    }

    /// Looks up a preset by name.
    ///
    /// Returns `EngineError::UnknownPalette` if the name is not registered.
    pub fn get(&self, name: &str) -> Result<&CosinePalette, EngineError> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
            .ok_or_else(|| EngineError::UnknownPalette(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PaletteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
