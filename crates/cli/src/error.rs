//! CLI failures and their process exit codes.
//!
//! | code | meaning                                               |
//! |------|-------------------------------------------------------|
//! | 0    | success                                               |
//! | 2    | argument parse failure (reported by clap)             |
//! | 10   | engine rejected the configuration or name             |
//! | 11   | snapshot could not be written                         |
//! | 12   | unknown palette or malformed `--params`               |
//! | 13   | JSON output could not be produced                     |

use curlflow_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(EngineError),
    #[error("snapshot failed: {0}")]
    Io(String),
    #[error("{0}")]
    Input(String),
    #[error("could not encode output: {0}")]
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Text written to stderr before exiting, plain or as a JSON object.
    pub fn report(&self, json: bool) -> String {
        if !json {
            return format!("error: {self}");
        }
        let body = serde_json::json!({"error": self.to_string(), "exit_code": self.exit_code()});
        serde_json::to_string_pretty(&body).unwrap_or_else(|_| format!("error: {self}"))
    }
}

/// Palette lookups fail on user input, so they exit as input errors.
impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            unknown @ EngineError::UnknownPalette(_) => CliError::Input(unknown.to_string()),
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            CliError::Engine(EngineError::InvalidParticleCount(0)).exit_code(),
            CliError::Io("x".into()).exit_code(),
            CliError::Input("x".into()).exit_code(),
            CliError::Serialization("x".into()).exit_code(),
        ];
        assert_eq!(codes, [10, 11, 12, 13]);
    }

    #[test]
    fn invalid_config_is_an_engine_failure() {
        let err = CliError::from(EngineError::InvalidSpawnDiameter(-1.0));
        assert_eq!(err.exit_code(), 10);
        assert!(err.to_string().contains("spawn diameter"));
    }

    #[test]
    fn snapshot_io_failure_keeps_message() {
        let err = CliError::from(EngineError::Io("disk full".into()));
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn unknown_palette_is_input_error() {
        let err = CliError::from(EngineError::UnknownPalette("plaid".into()));
        assert_eq!(err.exit_code(), 12);
        assert!(err.to_string().contains("plaid"));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{nope");
        assert_eq!(CliError::from(parse.unwrap_err()).exit_code(), 13);
    }

    #[test]
    fn json_report_carries_exit_code() {
        let report = CliError::from(EngineError::UnknownEngine("warp".into())).report(true);
        let v: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(v["exit_code"], 10);
        assert!(v["error"].as_str().unwrap().contains("warp"));
    }

    #[test]
    fn plain_report_is_prefixed() {
        let report = CliError::Input("bad flag".into()).report(false);
        assert_eq!(report, "error: bad flag");
    }
}
