//! Divergence-free curl field built from three offset noise gradients.
//!
//! Each call samples the noise three times, displacing one axis per sample by
//! a fixed offset so that the three scalar potentials are decorrelated, then
//! combines their gradients crosswise. The result is unnormalized; callers
//! scale it to get a bounded step.

use crate::noise::{NoiseField, NoiseSample};
use glam::DVec3;

/// Per-axis offsets used when no override is given.
pub const DEFAULT_CURL_OFFSETS: DVec3 = DVec3::new(100.0, 10.0, -10.0);

/// Three-dimensional vector field sampled at arbitrary points.
///
/// Implementations must be deterministic: the same point gives the same vector.
pub trait VectorField: Send + Sync {
    fn sample(&self, p: DVec3) -> DVec3;
}

/// Curl of the seeded simplex noise.
#[derive(Debug, Clone, PartialEq)]
pub struct CurlField {
    noise: NoiseField,
    offsets: DVec3,
}

impl CurlField {
    /// Wraps `noise` with [`DEFAULT_CURL_OFFSETS`].
    pub fn new(noise: NoiseField) -> Self {
        Self::with_offsets(noise, DEFAULT_CURL_OFFSETS)
    }

    /// Wraps `noise` with custom default offsets.
    pub fn with_offsets(noise: NoiseField, offsets: DVec3) -> Self {
        Self { noise, offsets }
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Default per-axis offsets.
    pub fn offsets(&self) -> DVec3 {
        self.offsets
    }

    /// Curl at `p` using the default offsets.
    pub fn curl(&self, p: DVec3) -> DVec3 {
        compose(&self.noise, p, self.offsets)
    }

    /// Curl at `p` with per-call offsets.
    ///
    /// A zero component means "unset" and falls back to the default offset for
    /// that axis.
    pub fn curl_with_offsets(&self, p: DVec3, offsets: DVec3) -> DVec3 {
        let resolved = DVec3::select(offsets.cmpeq(DVec3::ZERO), self.offsets, offsets);
        compose(&self.noise, p, resolved)
    }
}

impl VectorField for CurlField {
    fn sample(&self, p: DVec3) -> DVec3 {
        self.curl(p)
    }
}

/// The three noise samples, one per displaced axis.
struct AxisSamples {
    x: NoiseSample,
    y: NoiseSample,
    z: NoiseSample,
}

fn compose(noise: &NoiseField, p: DVec3, offsets: DVec3) -> DVec3 {
    let s = AxisSamples {
        x: noise.sample3(p.x + offsets.x, p.y, p.z),
        y: noise.sample3(p.x, p.y + offsets.y, p.z),
        z: noise.sample3(p.x, p.y, p.z + offsets.z),
    };
    DVec3::new(
        s.z.gradient.y - s.y.gradient.z,
        s.x.gradient.z - s.z.gradient.x,
        s.y.gradient.x - s.x.gradient.y,
    )
}
