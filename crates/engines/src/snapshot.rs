//! JSON snapshot of one rendered frame.
//!
//! A snapshot holds exactly what a renderer would upload: the flat position and
//! color buffers, plus the sample count and frame number.

use curlflow_core::error::EngineError;
use curlflow_core::Engine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One frame of render buffers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub count: usize,
    pub frame: u64,
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl Snapshot {
    /// Copies the current buffers out of `engine`.
    pub fn capture(engine: &dyn Engine, frame: u64) -> Self {
        Self {
            count: engine.len(),
            frame,
            positions: engine.positions().to_vec(),
            colors: engine.colors().to_vec(),
        }
    }
}

/// Writes the engine's current frame as pretty JSON.
///
/// Returns `EngineError::Io` on serialization or write failure.
pub fn write_json(engine: &dyn Engine, frame: u64, path: &Path) -> Result<(), EngineError> {
    let snapshot = Snapshot::capture(engine, frame);
    let text =
        serde_json::to_string_pretty(&snapshot).map_err(|e| EngineError::Io(e.to_string()))?;
    fs::write(path, text).map_err(|e| EngineError::Io(e.to_string()))?;
    log::debug!(
        "wrote snapshot of {} samples at frame {frame} to {}",
        snapshot.count,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineKind;
    use serde_json::json;

    #[test]
    fn write_json_round_trip() {
        let mut engine =
            EngineKind::from_name("streamline", 42.0, &json!({"particle_count": 16})).unwrap();
        engine.step().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.json");

        write_json(&engine, engine.frame(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let back: Snapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(back.count, 16);
        assert_eq!(back.frame, 1);
        assert_eq!(back.positions.len(), 48);
        assert_eq!(back.colors.len(), 64);
        assert_eq!(back.positions.as_slice(), engine.positions());
    }

    #[test]
    fn write_json_to_missing_directory_is_io_error() {
        let engine =
            EngineKind::from_name("streamline", 1.0, &json!({"particle_count": 4})).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.json");
        assert!(matches!(
            write_json(&engine, 0, &path),
            Err(EngineError::Io(_))
        ));
    }
}
