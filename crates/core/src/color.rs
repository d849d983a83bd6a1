//! Color generation from a scalar phase.
//!
//! [`ColorGenerator`] owns the active cosine palette plus the phase remap
//! (`t / 2 * scale + offset`) and produces unclamped [`Rgb`] triples. Values
//! outside [0, 1] are passed through; clamping is left to whoever displays them.

use crate::error::EngineError;
use crate::palette::{CosinePalette, PaletteRegistry};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Linear RGB triple. Channels are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Hex string like `"#rrggbb"`, clamping each channel to [0, 1] first.
    pub fn to_hex(self) -> String {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", q(self.r), q(self.g), q(self.b))
    }

    /// Channels narrowed to `f32` for vertex buffers.
    pub fn to_f32(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }
}

impl From<DVec3> for Rgb {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Default channel vector used before any preset is selected.
const DEFAULT_VECTOR: DVec3 = DVec3::splat(0.5);

/// Maps scalar phases to colors through a cosine palette.
///
/// Selecting a preset swaps all four channel vectors at once and records its
/// name; assigning raw vectors clears that name. Offset and scale belong to the
/// generator and survive preset changes.
#[derive(Debug, Clone)]
pub struct ColorGenerator {
    registry: PaletteRegistry,
    a: DVec3,
    b: DVec3,
    c: DVec3,
    d: DVec3,
    offset: f64,
    scale: f64,
    preset: Option<String>,
}

impl ColorGenerator {
    /// Creates a generator with neutral vectors and no preset selected.
    pub fn new(registry: PaletteRegistry, offset: f64, scale: f64) -> Self {
        Self {
            registry,
            a: DEFAULT_VECTOR,
            b: DEFAULT_VECTOR,
            c: DEFAULT_VECTOR,
            d: DEFAULT_VECTOR,
            offset,
            scale,
            preset: None,
        }
    }

    /// Creates a generator with `name` selected from `registry`.
    pub fn from_preset(
        registry: PaletteRegistry,
        name: &str,
        offset: f64,
        scale: f64,
    ) -> Result<Self, EngineError> {
        let mut generator = Self::new(registry, offset, scale);
        generator.set_preset(name)?;
        Ok(generator)
    }

    /// Creates a generator from explicit vectors and remap.
    pub fn from_palette(registry: PaletteRegistry, palette: CosinePalette) -> Self {
        let mut generator = Self::new(registry, palette.offset, palette.scale);
        generator.set_vectors(palette.a, palette.b, palette.c, palette.d);
        generator
    }

    /// Selects a registered preset, replacing all four vectors.
    ///
    /// On `EngineError::UnknownPalette` the generator is left unchanged.
    pub fn set_preset(&mut self, name: &str) -> Result<(), EngineError> {
        let p = *self.registry.get(name)?;
        self.a = p.a;
        self.b = p.b;
        self.c = p.c;
        self.d = p.d;
        self.preset = Some(name.to_string());
        Ok(())
    }

    /// Assigns raw vectors and clears the preset name.
    pub fn set_vectors(&mut self, a: DVec3, b: DVec3, c: DVec3, d: DVec3) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.preset = None;
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Name of the active preset, if the vectors came from the registry.
    pub fn preset_name(&self) -> Option<&str> {
        self.preset.as_deref()
    }

    pub fn registry(&self) -> &PaletteRegistry {
        &self.registry
    }

    /// The active vectors with the generator's offset and scale.
    pub fn palette(&self) -> CosinePalette {
        CosinePalette::with_remap(self.a, self.b, self.c, self.d, self.offset, self.scale)
    }

    /// Color at phase `t` using the generator's own offset and scale.
    pub fn color_at(&self, t: f64) -> Rgb {
        self.color_at_with(t, self.offset, self.scale)
    }

    /// Color at phase `t` with an explicit remap.
    pub fn color_at_with(&self, t: f64, offset: f64, scale: f64) -> Rgb {
        let phase = t / 2.0 * scale + offset;
        Rgb::from(self.palette().channels(phase))
    }
}

impl Default for ColorGenerator {
    /// The built-in registry with the grayscale preset, offset 0 and scale 1.
    fn default() -> Self {
        let registry = PaletteRegistry::builtin();
        let p = CosinePalette::grayscale();
        let mut generator = Self::new(registry, 0.0, 1.0);
        generator.a = p.a;
        generator.b = p.b;
        generator.c = p.c;
        generator.d = p.d;
        generator.preset = Some(crate::palette::DEFAULT_PRESET.to_string());
        generator
    }
}
