#![deny(unsafe_code)]
//! Curl-noise streamline engine.
//!
//! A single polyline of `N` samples is recomputed from scratch every frame:
//! the head drifts through the curl field (or jitters randomly), and the body
//! is an instantaneous streamline cast forward from that head. Colors come from
//! a cosine palette indexed by the head's distance from the origin, and alpha
//! fades in over the first quarter of the trail and out over the last.
//!
//! The engine owns flat `f32` buffers laid out for direct GPU upload:
//! positions `[x0, y0, z0, x1, ...]` and colors `[r0, g0, b0, a0, r1, ...]`.

pub mod lifecycle;

use curlflow_core::error::EngineError;
use curlflow_core::palette::PaletteRegistry;
use curlflow_core::{
    ColorGenerator, CurlField, DVec3, Engine, NoiseField, Rgb, StreamConfig, Xorshift64,
};
use lifecycle::{classify, ParticleState};
use serde_json::Value;

/// Curl multiplier used when seeding the initial trail.
const INIT_NUDGE: f64 = 0.001;
/// Field coordinates are scaled by this before computing the head drift.
const DRIFT_FIELD_SCALE: f64 = 10.0;
/// Curl offsets used for the head drift.
const DRIFT_OFFSETS: DVec3 = DVec3::new(-500.0, -500.0, 500.0);
/// Drift curl is divided by this.
const DRIFT_DIVISOR: f64 = 5000.0;
/// Fraction of the drifted head pulled back toward the origin each frame.
const CENTER_PULL: f64 = 0.0025;
/// Spawn draw multiplier when jittering instead of drifting.
const JITTER_SCALE: f64 = 0.01;
/// Curl offsets used along the trail body.
const TRAIL_OFFSETS: DVec3 = DVec3::new(100.0, 10.0, 10.0);
/// Color phase advance per sample along the trail.
const PHASE_STEP: f64 = 0.0001;
/// Fraction of the trail spent fading in, and again fading out.
const FADE_FRACTION: f64 = 0.25;
/// Mixed into the seed bits for the life-cycle random stream.
const LIFE_STREAM_SALT: u64 = 0x11FE_C7C1_E5EE_D000;

/// Which buffers changed since the renderer last uploaded them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadFlags {
    pub positions: bool,
    pub colors: bool,
}

impl UploadFlags {
    const ALL: UploadFlags = UploadFlags {
        positions: true,
        colors: true,
    };

    pub fn any(self) -> bool {
        self.positions || self.colors
    }
}

/// Three-segment alpha envelope over sample indices `0..n`.
#[derive(Debug, Clone, Copy)]
struct AlphaRamp {
    fade_in_end: f64,
    fade_out_start: f64,
    step: f64,
}

impl AlphaRamp {
    fn new(n: usize) -> Self {
        let n = n as f64;
        Self {
            fade_in_end: n * FADE_FRACTION,
            fade_out_start: n * (1.0 - FADE_FRACTION),
            step: 1.0 / (n * FADE_FRACTION),
        }
    }

    fn alpha(&self, i: usize) -> f64 {
        let i = i as f64;
        let a = if i > self.fade_out_start {
            1.0 - (i - self.fade_out_start) * self.step
        } else if i < self.fade_in_end {
            i * self.step
        } else {
            1.0
        };
        a.clamp(0.0, 1.0)
    }
}

/// Streamline engine.
///
/// Create with [`Streamline::new`], call [`tick`](Streamline::tick) once per
/// frame and upload [`positions`](Streamline::positions) and
/// [`colors`](Streamline::colors) when [`take_upload`](Streamline::take_upload)
/// reports them dirty. Ticks must not overlap; `&mut self` enforces that.
pub struct Streamline {
    config: StreamConfig,
    field: CurlField,
    color: ColorGenerator,
    rng: Xorshift64,
    life_rng: Xorshift64,
    positions: Vec<f32>,
    colors: Vec<f32>,
    speeds: Vec<f32>,
    life: Vec<f32>,
    states: Vec<ParticleState>,
    upload: UploadFlags,
    frame: u64,
}

impl Streamline {
    /// Validates `config`, builds the noise field and palette it names, and
    /// initializes the trail.
    pub fn new(config: &StreamConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let field = CurlField::new(NoiseField::new(config.seed)?);
        let color = config.color_generator(PaletteRegistry::builtin())?;
        Self::with_parts(config, field, color)
    }

    /// Initializes the trail with an explicit field and color generator.
    ///
    /// The config still supplies count, spawn sampler, diameter and seed for
    /// the spawn stream.
    pub fn with_parts(
        config: &StreamConfig,
        field: CurlField,
        color: ColorGenerator,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let mut streamline = Self {
            config: config.clone(),
            field,
            color,
            rng: Xorshift64::from_seed(config.seed),
            life_rng: Xorshift64::new(config.seed.to_bits() ^ LIFE_STREAM_SALT),
            positions: Vec::new(),
            colors: Vec::new(),
            speeds: Vec::new(),
            life: Vec::new(),
            states: Vec::new(),
            upload: UploadFlags::default(),
            frame: 0,
        };
        streamline.initialize();
        Ok(streamline)
    }

    /// Creates a streamline from flat JSON params.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::new(&StreamConfig::from_json(params))
    }

    /// Replaces the configuration and rebuilds field, palette and buffers.
    ///
    /// On error the streamline is left as it was.
    pub fn reset(&mut self, config: &StreamConfig) -> Result<(), EngineError> {
        *self = Self::new(config)?;
        Ok(())
    }

    /// Reallocates every buffer and reseeds the trail from a fresh spawn point,
    /// keeping the current field, palette and random streams.
    pub fn reinitialize(&mut self) {
        self.initialize();
    }

    fn initialize(&mut self) {
        let n = self.config.particle_count;
        let diameter = self.config.spawn_diameter;

        self.positions = vec![0.0; n * 3];
        self.colors = vec![0.0; n * 4];
        self.speeds = vec![0.0; n];
        self.life = vec![0.0; n];
        self.states = vec![ParticleState::Active; n];

        let mut position = self.config.sampler.sample(diameter, &mut self.rng);
        for i in 0..n {
            if i > 0 {
                let prev = self.position(i - 1);
                position = prev + self.field.curl(prev) * INIT_NUDGE;
            }
            self.write_position(i, position);
            let color = self.color.color_at(position.length() / diameter);
            self.write_color(i, color, 0.0);
            self.roll_vitals(i);
        }

        self.frame = 0;
        self.upload = UploadFlags::ALL;
        log::debug!(
            "initialized streamline: {n} samples, seed {}, head at {position}",
            self.config.seed
        );
    }

    /// Recomputes the whole trail using the configured step distance and drift mode.
    pub fn tick(&mut self) {
        // The config was validated on construction.
        self.advance(self.config.step_distance, self.config.smooth_drift);
    }

    /// Recomputes the whole trail from the previous head.
    ///
    /// With `smooth_drift` the head moves along a coarse curl field and is
    /// pulled slightly toward the origin; otherwise it takes a small random
    /// step from the spawn sampler. Every following sample steps along the
    /// curl from its predecessor by `step_distance`.
    ///
    /// A non-finite `step_distance` is rejected with
    /// `EngineError::NonFinite` and leaves the buffers untouched.
    pub fn tick_with(
        &mut self,
        step_distance: f64,
        smooth_drift: bool,
    ) -> Result<(), EngineError> {
        if !step_distance.is_finite() {
            return Err(EngineError::non_finite("step_distance", step_distance));
        }
        self.advance(step_distance, smooth_drift);
        Ok(())
    }

    fn advance(&mut self, step_distance: f64, smooth_drift: bool) {
        let n = self.len();
        if n == 0 {
            return;
        }
        let diameter = self.config.spawn_diameter;
        let prev_origin = self.position(0);

        let origin = if smooth_drift {
            let drift = self
                .field
                .curl_with_offsets(prev_origin * DRIFT_FIELD_SCALE, DRIFT_OFFSETS)
                / DRIFT_DIVISOR;
            let drifted = drift + prev_origin;
            drifted + drifted * -CENTER_PULL
        } else {
            prev_origin + self.config.sampler.sample(diameter, &mut self.rng) * JITTER_SCALE
        };

        self.write_position(0, origin);
        let head_phase = origin.length() / diameter;
        let head_color = self.color.color_at(head_phase);
        self.write_color(0, head_color, 0.0);

        let ramp = AlphaRamp::new(n);
        for i in 1..n {
            let prev = self.position(i - 1);
            let velocity = self.field.curl_with_offsets(prev, TRAIL_OFFSETS);
            self.write_position(i, prev + velocity * step_distance);
            let color = self.color.color_at(head_phase + i as f64 * PHASE_STEP);
            self.write_color(i, color, ramp.alpha(i));
        }

        self.frame += 1;
        self.upload = UploadFlags::ALL;
        log::trace!("tick {}: head at {origin}", self.frame);
    }

    /// Respawns one sample: new position from the spawn sampler, matching
    /// color with zero alpha, fresh speed and life.
    ///
    /// Draws come from the life-cycle stream, so the trail's own random
    /// sequence is unaffected.
    pub fn respawn(&mut self, index: usize) -> Result<(), EngineError> {
        let len = self.len();
        if index >= len {
            return Err(EngineError::IndexOutOfRange { index, len });
        }
        let diameter = self.config.spawn_diameter;
        let position = self.config.sampler.sample(diameter, &mut self.life_rng);
        self.write_position(index, position);
        let color = self.color.color_at(position.length() / diameter);
        self.write_color(index, color, 0.0);
        self.roll_vitals(index);
        self.states[index] = ParticleState::Respawning;
        self.upload = UploadFlags::ALL;
        Ok(())
    }

    /// Ages every sample by one unit, classifies it under the configured
    /// extinction policy and respawns the ones that die.
    ///
    /// Returns how many samples were respawned. Not part of [`tick`](Self::tick).
    pub fn apply_extinction(&mut self) -> usize {
        let policy = self.config.extinction;
        let mut respawned = 0;
        for i in 0..self.len() {
            self.life[i] -= 1.0;
            let position = self.position(i);
            let field = &self.field;
            let state = classify(&policy, position, f64::from(self.life[i]), || {
                field.curl_with_offsets(position, TRAIL_OFFSETS).length()
            });
            self.states[i] = state;
            if state.is_dying() {
                // Index is in range by construction.
                if self.respawn(i).is_ok() {
                    respawned += 1;
                }
            }
        }
        if respawned > 0 {
            log::debug!("extinction pass respawned {respawned} samples");
        }
        respawned
    }

    /// Returns and clears the pending upload flags.
    pub fn take_upload(&mut self) -> UploadFlags {
        std::mem::take(&mut self.upload)
    }

    /// Upload flags without clearing them.
    pub fn needs_upload(&self) -> UploadFlags {
        self.upload
    }

    /// Clears the upload flags after the renderer has consumed the buffers.
    pub fn mark_uploaded(&mut self) {
        self.upload = UploadFlags::default();
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Ticks since the last (re)initialization.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Per-sample speed, used only by the life-cycle pass.
    pub fn speeds(&self) -> &[f32] {
        &self.speeds
    }

    /// Per-sample remaining life, used only by the life-cycle pass.
    pub fn life(&self) -> &[f32] {
        &self.life
    }

    pub fn states(&self) -> &[ParticleState] {
        &self.states
    }

    /// Position of sample `i`, widened to `f64`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    pub fn position(&self, i: usize) -> DVec3 {
        let p = &self.positions[i * 3..i * 3 + 3];
        DVec3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2]))
    }

    /// Alpha of sample `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    pub fn alpha(&self, i: usize) -> f32 {
        self.colors[i * 4 + 3]
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn field(&self) -> &CurlField {
        &self.field
    }

    pub fn color_generator(&self) -> &ColorGenerator {
        &self.color
    }

    /// Mutable palette access; changes show up on the next tick.
    pub fn color_generator_mut(&mut self) -> &mut ColorGenerator {
        &mut self.color
    }

    fn write_position(&mut self, i: usize, p: DVec3) {
        self.positions[i * 3] = p.x as f32;
        self.positions[i * 3 + 1] = p.y as f32;
        self.positions[i * 3 + 2] = p.z as f32;
    }

    fn write_color(&mut self, i: usize, c: Rgb, alpha: f64) {
        let [r, g, b] = c.to_f32();
        let slot = &mut self.colors[i * 4..i * 4 + 4];
        slot[0] = r;
        slot[1] = g;
        slot[2] = b;
        slot[3] = alpha as f32;
    }

    fn roll_vitals(&mut self, i: usize) {
        let (min, max) = (self.config.life_span_min, self.config.life_span_max);
        self.speeds[i] = self.life_rng.next_f64() as f32;
        self.life[i] = self.life_rng.next_range(min, max.max(min)) as f32;
    }
}

impl Engine for Streamline {
    fn step(&mut self) -> Result<(), EngineError> {
        self.tick();
        Ok(())
    }

    fn len(&self) -> usize {
        Streamline::len(self)
    }

    fn positions(&self) -> &[f32] {
        &self.positions
    }

    fn colors(&self) -> &[f32] {
        &self.colors
    }

    fn params(&self) -> Value {
        self.config.to_params()
    }

    fn param_schema(&self) -> Value {
        StreamConfig::param_schema()
    }
}
