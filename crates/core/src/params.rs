//! Typed lookups into a flat `serde_json::Value` params object.
//!
//! Missing keys and wrongly typed values fall back to the supplied default, so
//! partial parameter objects (from the CLI or a saved scene) always produce a
//! complete configuration. Range checks happen later in validation.

use glam::DVec3;
use serde_json::Value;

/// Reads a number; integers are widened to `f64`.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Reads a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Reads a 3-vector written either as `[x, y, z]` or `{"x": .., "y": .., "z": ..}`.
pub fn param_vec3(params: &Value, name: &str, default: DVec3) -> DVec3 {
    params.get(name).and_then(vec3_from_value).unwrap_or(default)
}

fn vec3_from_value(v: &Value) -> Option<DVec3> {
    match v {
        Value::Array(items) if items.len() == 3 => Some(DVec3::new(
            items[0].as_f64()?,
            items[1].as_f64()?,
            items[2].as_f64()?,
        )),
        Value::Object(map) => Some(DVec3::new(
            map.get("x")?.as_f64()?,
            map.get("y")?.as_f64()?,
            map.get("z")?.as_f64()?,
        )),
        _ => None,
    }
}
