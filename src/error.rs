//! Error types for printguard

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to run {program}: {source}")]
    SpawnError {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} timed out after {secs}s")]
    CommandTimeout { program: String, secs: u64 },

    #[error("{program} exited with {code}: {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("Invalid pattern: {0}")]
    PatternError(String),

    #[error("Security error: {0}")]
    SecurityError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

pub type Result<T> = std::result::Result<T, GuardError>;
