//! The `Engine` trait every particle engine implements.
//!
//! The trait is object-safe so engines can sit behind `dyn Engine` and be
//! swapped at runtime by name.

use crate::error::EngineError;
use serde_json::Value;

/// A per-frame particle engine producing flat render buffers.
///
/// After each [`step`](Engine::step) the position buffer holds `3 * len()`
/// floats (`x, y, z` per sample) and the color buffer `4 * len()` floats
/// (`r, g, b, a` per sample), ready for upload.
pub trait Engine {
    /// Advance by one frame.
    fn step(&mut self) -> Result<(), EngineError>;

    /// Number of samples.
    fn len(&self) -> usize;

    /// True when the engine holds no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interleaved `x, y, z` positions.
    fn positions(&self) -> &[f32];

    /// Interleaved `r, g, b, a` colors.
    fn colors(&self) -> &[f32];

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}
