#![deny(unsafe_code)]
//! Core numeric engine for curlflow.
//!
//! Provides the seeded Alea/Xorshift64 generators, the noise permutation
//! table, 3D simplex noise with analytic gradients (`NoiseField`), the
//! divergence-free `CurlField` built on it, cosine palettes with a preset
//! registry and `ColorGenerator`, spawn samplers, the `StreamConfig` value
//! object and the object-safe `Engine` trait.

pub mod color;
pub mod config;
pub mod curl;
pub mod engine;
pub mod error;
pub mod noise;
pub mod palette;
pub mod params;
pub mod permutation;
pub mod prng;
pub mod spawn;

pub use color::{ColorGenerator, Rgb};
pub use config::{ExtinctionPolicy, PaletteSpec, StreamConfig};
pub use curl::{CurlField, VectorField, DEFAULT_CURL_OFFSETS};
pub use engine::Engine;
pub use error::EngineError;
pub use noise::{NoiseField, NoiseSample};
pub use palette::{CosinePalette, PaletteRegistry};
pub use permutation::PermutationTable;
pub use prng::{Alea, Xorshift64};
pub use spawn::SpawnSampler;

/// Re-exported so downstream crates name the same vector type.
pub use glam::DVec3;
