//! Streamline configuration value object.
//!
//! A [`StreamConfig`] captures everything needed to rebuild a scene: particle
//! count, noise seed, spawn and step sizes, drift mode, palette and life-cycle
//! policy. It is passed by reference into the integrator; nothing reads
//! configuration from ambient state.

use crate::color::ColorGenerator;
use crate::error::EngineError;
use crate::palette::{CosinePalette, PaletteRegistry, DEFAULT_PRESET};
use crate::params::{param_bool, param_f64, param_string, param_usize, param_vec3};
use crate::spawn::SpawnSampler;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_PARTICLE_COUNT: usize = 5000;
pub const DEFAULT_SEED: f64 = 0.0;
pub const DEFAULT_SPAWN_DIAMETER: f64 = 0.05;
pub const DEFAULT_STEP_DISTANCE: f64 = 0.01;
pub const DEFAULT_LIFE_SPAN_MIN: f64 = 100.0;
pub const DEFAULT_LIFE_SPAN_MAX: f64 = 500.0;
pub const DEFAULT_MIN_SPEED: f64 = 0.1;
pub const DEFAULT_EXTINCTION_DISTANCE: f64 = 1.0;

/// Palette selection: a registry name or explicit vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaletteSpec {
    Named(String),
    Custom(CosinePalette),
}

impl Default for PaletteSpec {
    fn default() -> Self {
        PaletteSpec::Named(DEFAULT_PRESET.to_string())
    }
}

/// Rule deciding when a sample is retired and respawned.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExtinctionPolicy {
    /// Samples never die.
    #[default]
    None,
    /// Dies once its remaining life reaches zero.
    ByAge,
    /// Dies when the local field speed drops below `min_speed`.
    ByVelocity { min_speed: f64 },
    /// Dies when it strays farther than `max_distance` from the origin.
    ByDistance { max_distance: f64 },
}

impl ExtinctionPolicy {
    /// Parses the short policy names used in flat params
    /// (`none`, `age`, `velocity`, `distance`).
    pub fn from_name(name: &str, min_speed: f64, max_distance: f64) -> Option<Self> {
        match name {
            "none" => Some(ExtinctionPolicy::None),
            "age" => Some(ExtinctionPolicy::ByAge),
            "velocity" => Some(ExtinctionPolicy::ByVelocity { min_speed }),
            "distance" => Some(ExtinctionPolicy::ByDistance { max_distance }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExtinctionPolicy::None => "none",
            ExtinctionPolicy::ByAge => "age",
            ExtinctionPolicy::ByVelocity { .. } => "velocity",
            ExtinctionPolicy::ByDistance { .. } => "distance",
        }
    }
}

/// Complete, reproducible description of one streamline scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Number of samples along the trail.
    pub particle_count: usize,
    /// Noise seed; also seeds the spawn random stream.
    pub seed: f64,
    /// Spawn bound. The uniform sampler compares squared norms against it.
    pub spawn_diameter: f64,
    /// Distance multiplier applied to the curl at each trail step.
    pub step_distance: f64,
    /// Field-driven drift of the head when set, random jitter otherwise.
    pub smooth_drift: bool,
    pub sampler: SpawnSampler,
    pub palette: PaletteSpec,
    pub palette_offset: f64,
    pub palette_scale: f64,
    pub extinction: ExtinctionPolicy,
    pub life_span_min: f64,
    pub life_span_max: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: DEFAULT_SEED,
            spawn_diameter: DEFAULT_SPAWN_DIAMETER,
            step_distance: DEFAULT_STEP_DISTANCE,
            smooth_drift: true,
            sampler: SpawnSampler::Uniform,
            palette: PaletteSpec::default(),
            palette_offset: 0.0,
            palette_scale: 1.0,
            extinction: ExtinctionPolicy::None,
            life_span_min: DEFAULT_LIFE_SPAN_MIN,
            life_span_max: DEFAULT_LIFE_SPAN_MAX,
        }
    }
}

impl StreamConfig {
    /// Creates a config with defaults for everything but count and seed.
    pub fn new(particle_count: usize, seed: f64) -> Self {
        Self {
            particle_count,
            seed,
            ..Self::default()
        }
    }

    /// Builds a config from flat JSON params, falling back to defaults for
    /// missing or mistyped keys. Unknown sampler or policy names also fall
    /// back. The result still needs [`validate`](Self::validate).
    ///
    /// `palette` may be a preset name or an object with `a`, `b`, `c`, `d`
    /// vectors (and optional `offset`, `scale`).
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();

        let sampler = SpawnSampler::from_name(&param_string(params, "sampler", d.sampler.name()))
            .unwrap_or(d.sampler);

        let palette = match params.get("palette") {
            Some(Value::String(name)) => PaletteSpec::Named(name.clone()),
            Some(obj @ Value::Object(_)) => {
                let base = CosinePalette::grayscale();
                PaletteSpec::Custom(CosinePalette::with_remap(
                    param_vec3(obj, "a", base.a),
                    param_vec3(obj, "b", base.b),
                    param_vec3(obj, "c", base.c),
                    param_vec3(obj, "d", base.d),
                    param_f64(obj, "offset", 0.0),
                    param_f64(obj, "scale", 1.0),
                ))
            }
            _ => d.palette.clone(),
        };

        let min_speed = param_f64(params, "min_speed", DEFAULT_MIN_SPEED);
        let max_distance = param_f64(params, "extinction_distance", DEFAULT_EXTINCTION_DISTANCE);
        let extinction = ExtinctionPolicy::from_name(
            &param_string(params, "extinction", d.extinction.name()),
            min_speed,
            max_distance,
        )
        .unwrap_or(d.extinction);

        Self {
            particle_count: param_usize(params, "particle_count", d.particle_count),
            seed: param_f64(params, "seed", d.seed),
            spawn_diameter: param_f64(params, "spawn_diameter", d.spawn_diameter),
            step_distance: param_f64(params, "step_distance", d.step_distance),
            smooth_drift: param_bool(params, "smooth_drift", d.smooth_drift),
            sampler,
            palette,
            palette_offset: param_f64(params, "palette_offset", d.palette_offset),
            palette_scale: param_f64(params, "palette_scale", d.palette_scale),
            extinction,
            life_span_min: param_f64(params, "life_span_min", d.life_span_min),
            life_span_max: param_f64(params, "life_span_max", d.life_span_max),
        }
    }

    /// Checks every value that would otherwise leak NaN into the buffers.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.particle_count == 0 {
            return Err(EngineError::InvalidParticleCount(self.particle_count));
        }
        check_finite("seed", self.seed)?;
        check_finite("step_distance", self.step_distance)?;
        let d = self.spawn_diameter;
        if !d.is_finite() || d <= 0.0 || d < self.sampler.min_diameter() {
            return Err(EngineError::InvalidSpawnDiameter(self.spawn_diameter));
        }
        check_finite("palette_offset", self.palette_offset)?;
        check_finite("palette_scale", self.palette_scale)?;
        if let PaletteSpec::Custom(p) = &self.palette {
            if !p.is_finite() {
                return Err(EngineError::non_finite("palette", f64::NAN));
            }
        }
        match self.extinction {
            ExtinctionPolicy::ByVelocity { min_speed } => check_finite("min_speed", min_speed)?,
            ExtinctionPolicy::ByDistance { max_distance } => {
                check_finite("extinction_distance", max_distance)?
            }
            ExtinctionPolicy::None | ExtinctionPolicy::ByAge => {}
        }
        let (min, max) = (self.life_span_min, self.life_span_max);
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(EngineError::InvalidLifeSpan { min, max });
        }
        Ok(())
    }

    /// Builds the color generator this config describes.
    ///
    /// Named palettes are resolved against `registry`; an unknown name yields
    /// `EngineError::UnknownPalette`. Custom palettes carry their own remap.
    pub fn color_generator(&self, registry: PaletteRegistry) -> Result<ColorGenerator, EngineError> {
        match &self.palette {
            PaletteSpec::Named(name) => {
                ColorGenerator::from_preset(registry, name, self.palette_offset, self.palette_scale)
                    .inspect_err(|_| log::warn!("palette '{name}' is not registered"))
            }
            PaletteSpec::Custom(p) => Ok(ColorGenerator::from_palette(registry, *p)),
        }
    }

    /// Current values as a flat JSON object, the inverse of [`from_json`](Self::from_json).
    pub fn to_params(&self) -> Value {
        let palette = match &self.palette {
            PaletteSpec::Named(name) => json!(name),
            PaletteSpec::Custom(p) => json!({
                "a": vec3_json(p.a),
                "b": vec3_json(p.b),
                "c": vec3_json(p.c),
                "d": vec3_json(p.d),
                "offset": p.offset,
                "scale": p.scale,
            }),
        };
        let mut params = json!({
            "particle_count": self.particle_count,
            "seed": self.seed,
            "spawn_diameter": self.spawn_diameter,
            "step_distance": self.step_distance,
            "smooth_drift": self.smooth_drift,
            "sampler": self.sampler.name(),
            "palette": palette,
            "palette_offset": self.palette_offset,
            "palette_scale": self.palette_scale,
            "extinction": self.extinction.name(),
            "life_span_min": self.life_span_min,
            "life_span_max": self.life_span_max,
        });
        match self.extinction {
            ExtinctionPolicy::ByVelocity { min_speed } => params["min_speed"] = json!(min_speed),
            ExtinctionPolicy::ByDistance { max_distance } => {
                params["extinction_distance"] = json!(max_distance)
            }
            ExtinctionPolicy::None | ExtinctionPolicy::ByAge => {}
        }
        params
    }

    /// Schema describing every flat parameter: type, default, range, description.
    pub fn param_schema() -> Value {
        json!({
            "particle_count": {
                "type": "integer",
                "default": DEFAULT_PARTICLE_COUNT,
                "min": 1,
                "description": "Number of samples along the trail"
            },
            "seed": {
                "type": "number",
                "default": DEFAULT_SEED,
                "description": "Noise seed; identical seeds give identical fields"
            },
            "spawn_diameter": {
                "type": "number",
                "default": DEFAULT_SPAWN_DIAMETER,
                "min": 0.0,
                "exclusive_min": true,
                "uniform_min": crate::spawn::MIN_UNIFORM_DIAMETER,
                "description": "Spawn bound; the uniform sampler compares squared norms against it"
            },
            "step_distance": {
                "type": "number",
                "default": DEFAULT_STEP_DISTANCE,
                "description": "Curl multiplier per trail step"
            },
            "smooth_drift": {
                "type": "boolean",
                "default": true,
                "description": "Drift the head through the field instead of jittering it"
            },
            "sampler": {
                "type": "string",
                "default": "uniform",
                "options": SpawnSampler::ALL.iter().map(|s| s.name()).collect::<Vec<_>>(),
                "description": "Spawn point sampler"
            },
            "palette": {
                "type": "string|object",
                "default": DEFAULT_PRESET,
                "options": PaletteRegistry::builtin().names(),
                "description": "Preset name or {a, b, c, d, offset, scale} cosine palette"
            },
            "palette_offset": {
                "type": "number",
                "default": 0.0,
                "description": "Phase offset added after scaling"
            },
            "palette_scale": {
                "type": "number",
                "default": 1.0,
                "description": "Phase multiplier"
            },
            "extinction": {
                "type": "string",
                "default": "none",
                "options": ["none", "age", "velocity", "distance"],
                "description": "Life-cycle policy applied by the extinction pass"
            },
            "min_speed": {
                "type": "number",
                "default": DEFAULT_MIN_SPEED,
                "min": 0.0,
                "description": "Speed threshold for the velocity policy"
            },
            "extinction_distance": {
                "type": "number",
                "default": DEFAULT_EXTINCTION_DISTANCE,
                "min": 0.0,
                "description": "Distance threshold for the distance policy"
            },
            "life_span_min": {
                "type": "number",
                "default": DEFAULT_LIFE_SPAN_MIN,
                "min": 0.0,
                "description": "Lower bound of a respawned sample's life"
            },
            "life_span_max": {
                "type": "number",
                "default": DEFAULT_LIFE_SPAN_MAX,
                "min": 0.0,
                "description": "Upper bound of a respawned sample's life"
            }
        })
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::non_finite(name, value))
    }
}

fn vec3_json(v: DVec3) -> Value {
    json!([v.x, v.y, v.z])
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Defaults --

    #[test]
    fn default_config_is_valid() {
        let c = StreamConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.particle_count, 5000);
        assert_eq!(c.spawn_diameter, 0.05);
        assert!(c.smooth_drift);
        assert_eq!(c.palette, PaletteSpec::Named("default".into()));
    }

    #[test]
    fn new_overrides_count_and_seed_only() {
        let c = StreamConfig::new(10, 42.0);
        assert_eq!(c.particle_count, 10);
        assert_eq!(c.seed, 42.0);
        assert_eq!(c.step_distance, DEFAULT_STEP_DISTANCE);
    }

    // -- Validation --

    #[test]
    fn zero_particles_is_rejected() {
        let c = StreamConfig::new(0, 1.0);
        assert!(matches!(
            c.validate(),
            Err(EngineError::InvalidParticleCount(0))
        ));
    }

    #[test]
    fn non_finite_seed_is_rejected() {
        let c = StreamConfig::new(10, f64::NAN);
        assert!(matches!(c.validate(), Err(EngineError::NonFinite { name, .. }) if name == "seed"));
    }

    #[test]
    fn non_finite_step_distance_is_rejected() {
        let c = StreamConfig {
            step_distance: f64::INFINITY,
            ..StreamConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(EngineError::NonFinite { name, .. }) if name == "step_distance"
        ));
    }

    #[test]
    fn degenerate_spawn_diameters_are_rejected() {
        for d in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let c = StreamConfig {
                spawn_diameter: d,
                ..StreamConfig::default()
            };
            assert!(
                matches!(c.validate(), Err(EngineError::InvalidSpawnDiameter(_))),
                "diameter {d} accepted"
            );
        }
    }

    #[test]
    fn tiny_diameter_is_rejected_for_uniform_sampler() {
        let c = StreamConfig {
            spawn_diameter: 1e-9,
            ..StreamConfig::new(4, 42.0)
        };
        assert!(matches!(
            c.validate(),
            Err(EngineError::InvalidSpawnDiameter(d)) if d == 1e-9
        ));
        let at_bound = StreamConfig {
            spawn_diameter: crate::spawn::MIN_UNIFORM_DIAMETER,
            ..c.clone()
        };
        assert!(at_bound.validate().is_ok());
    }

    #[test]
    fn tiny_diameter_is_allowed_for_weighted_sampler() {
        let c = StreamConfig {
            spawn_diameter: 1e-9,
            sampler: SpawnSampler::Weighted,
            ..StreamConfig::new(4, 42.0)
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn inverted_life_span_is_rejected() {
        let c = StreamConfig {
            life_span_min: 10.0,
            life_span_max: 5.0,
            ..StreamConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(EngineError::InvalidLifeSpan { .. })
        ));
    }

    #[test]
    fn non_finite_custom_palette_is_rejected() {
        let mut p = CosinePalette::rainbow();
        p.c.y = f64::NAN;
        let c = StreamConfig {
            palette: PaletteSpec::Custom(p),
            ..StreamConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn non_finite_policy_threshold_is_rejected() {
        let c = StreamConfig {
            extinction: ExtinctionPolicy::ByDistance {
                max_distance: f64::NAN,
            },
            ..StreamConfig::default()
        };
        assert!(c.validate().is_err());
    }

    // -- from_json --

    #[test]
    fn from_json_empty_gives_defaults() {
        assert_eq!(StreamConfig::from_json(&json!({})), StreamConfig::default());
    }

    #[test]
    fn from_json_reads_flat_values() {
        let c = StreamConfig::from_json(&json!({
            "particle_count": 10,
            "seed": 42,
            "spawn_diameter": 1.0,
            "step_distance": 0.02,
            "smooth_drift": false,
            "sampler": "weighted",
            "palette": "rainbow",
            "palette_offset": 0.25,
            "palette_scale": 2.0,
            "extinction": "velocity",
            "min_speed": 0.3,
        }));
        assert_eq!(c.particle_count, 10);
        assert_eq!(c.seed, 42.0);
        assert_eq!(c.spawn_diameter, 1.0);
        assert_eq!(c.step_distance, 0.02);
        assert!(!c.smooth_drift);
        assert_eq!(c.sampler, SpawnSampler::Weighted);
        assert_eq!(c.palette, PaletteSpec::Named("rainbow".into()));
        assert_eq!(c.palette_offset, 0.25);
        assert_eq!(c.palette_scale, 2.0);
        assert_eq!(c.extinction, ExtinctionPolicy::ByVelocity { min_speed: 0.3 });
    }

    #[test]
    fn from_json_reads_custom_palette_object() {
        let c = StreamConfig::from_json(&json!({
            "palette": {
                "a": [0.5, 0.5, 0.5],
                "b": {"x": 0.5, "y": 0.5, "z": 0.5},
                "c": [1.0, 1.0, 1.0],
                "d": [0.0, 0.1, 0.2],
                "offset": 0.5,
            }
        }));
        match c.palette {
            PaletteSpec::Custom(p) => {
                assert_eq!(p.d, DVec3::new(0.0, 0.1, 0.2));
                assert_eq!(p.offset, 0.5);
                assert_eq!(p.scale, 1.0);
            }
            other => panic!("expected custom palette, got {other:?}"),
        }
    }

    #[test]
    fn from_json_unknown_names_fall_back() {
        let c = StreamConfig::from_json(&json!({"sampler": "gaussian", "extinction": "boredom"}));
        assert_eq!(c.sampler, SpawnSampler::Uniform);
        assert_eq!(c.extinction, ExtinctionPolicy::None);
    }

    #[test]
    fn to_params_round_trips_through_from_json() {
        let c = StreamConfig {
            particle_count: 64,
            seed: 7.0,
            smooth_drift: false,
            sampler: SpawnSampler::Weighted,
            palette: PaletteSpec::Custom(CosinePalette::nineties()),
            extinction: ExtinctionPolicy::ByDistance { max_distance: 2.0 },
            ..StreamConfig::default()
        };
        assert_eq!(StreamConfig::from_json(&c.to_params()), c);
    }

    // -- serde --

    #[test]
    fn serde_round_trip_preserves_config() {
        let c = StreamConfig {
            palette: PaletteSpec::Custom(CosinePalette::desert()),
            extinction: ExtinctionPolicy::ByVelocity { min_speed: 0.2 },
            ..StreamConfig::new(128, 3.5)
        };
        let json = serde_json::to_string_pretty(&c).unwrap();
        let back: StreamConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let c: StreamConfig = serde_json::from_str(r#"{"particle_count": 12}"#).unwrap();
        assert_eq!(c.particle_count, 12);
        assert_eq!(c.spawn_diameter, DEFAULT_SPAWN_DIAMETER);
    }

    // -- color_generator --

    #[test]
    fn color_generator_resolves_named_palette() {
        let c = StreamConfig {
            palette: PaletteSpec::Named("desert".into()),
            palette_offset: 0.1,
            ..StreamConfig::default()
        };
        let g = c.color_generator(PaletteRegistry::builtin()).unwrap();
        assert_eq!(g.preset_name(), Some("desert"));
        assert_eq!(g.palette().offset, 0.1);
    }

    #[test]
    fn color_generator_unknown_name_is_error() {
        let c = StreamConfig {
            palette: PaletteSpec::Named("ultraviolet".into()),
            ..StreamConfig::default()
        };
        assert!(matches!(
            c.color_generator(PaletteRegistry::builtin()),
            Err(EngineError::UnknownPalette(_))
        ));
    }

    #[test]
    fn param_schema_describes_every_param() {
        let schema = StreamConfig::param_schema();
        let params = StreamConfig::default().to_params();
        for key in params.as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing {key}");
            assert!(schema[key].get("type").is_some(), "{key} missing type");
            assert!(schema[key].get("description").is_some(), "{key} missing description");
        }
    }
}
