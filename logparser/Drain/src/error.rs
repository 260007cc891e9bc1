use thiserror::Error;

/// Result type for log parsing operations
pub type Result<T> = std::result::Result<T, DrainError>;

/// Errors that can occur while configuring or running a parse
#[derive(Error, Debug)]
pub enum DrainError {
    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Log format string has no usable fields
    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),

    /// Required field missing from the log format
    #[error("Log format has no <{0}> field")]
    MissingField(String),

    /// Regex failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Look-around regex failed to compile or hit a runtime limit
    #[error("Regex error: {0}")]
    FancyRegex(#[from] fancy_regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DrainError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid log format error
    pub fn invalid_log_format(msg: impl Into<String>) -> Self {
        Self::InvalidLogFormat(msg.into())
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }
}
