use thiserror::Error;

/// Top-level error type for graspers-core.
#[derive(Debug, Error)]
pub enum GraspersError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration errors.
///
/// Unreachable poses are not represented here: a pose no configuration can
/// reach is a normal empty/`None` outcome of the solver and resolver, not
/// an error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid speed multiplier: {0} (must be >= 1)")]
    InvalidSpeed(f64),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
