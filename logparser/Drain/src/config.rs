use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DrainError, Result};

/// Clustering engine parameters, fixed for the lifetime of a [`crate::Drain`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    /// Raw tree depth. The length layer and the leaf layer are counted in,
    /// so the number of token levels walked is `depth - 2` (at least one).
    pub depth: usize,

    /// Minimum fraction of exactly matching tokens for a merge
    pub similarity_threshold: f64,

    /// Maximum number of children per internal node
    pub max_child: usize,

    /// Tokens matching any of these are never generalized away
    pub protected_patterns: Vec<String>,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            similarity_threshold: 0.4,
            max_child: 100,
            protected_patterns: vec![],
        }
    }
}

impl DrainConfig {
    pub fn new(depth: usize, similarity_threshold: f64) -> Self {
        Self {
            depth,
            similarity_threshold,
            ..Default::default()
        }
    }

    pub fn with_max_child(mut self, max_child: usize) -> Self {
        self.max_child = max_child;
        self
    }

    pub fn with_protected_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Number of token levels between the length layer and the leaf buckets
    pub fn effective_depth(&self) -> usize {
        self.depth.saturating_sub(2).max(1)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(DrainError::invalid_config("depth must be >= 1"));
        }

        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(DrainError::invalid_config(format!(
                "similarity_threshold ({}) must be within [0, 1]",
                self.similarity_threshold
            )));
        }

        if self.max_child == 0 {
            return Err(DrainError::invalid_config("max_child must be >= 1"));
        }

        Ok(())
    }
}

/// Settings for a full parse run: input discovery, tokenization and output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Line layout, e.g. `<Date> <Time> <Level> <Component>: <Content>`
    pub log_format: String,

    /// Applied to `Content` before tokenizing; matches become `<*>`
    pub preprocess_patterns: Vec<String>,

    /// Emit the `ParameterList` column in the structured output
    pub keep_parameters: bool,

    pub drain: DrainConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./"),
            output_dir: PathBuf::from("./result/"),
            log_format: String::new(),
            preprocess_patterns: vec![],
            keep_parameters: true,
            drain: DrainConfig::default(),
        }
    }
}

impl ParserConfig {
    pub fn new(log_format: impl Into<String>) -> Self {
        Self {
            log_format: log_format.into(),
            ..Default::default()
        }
    }

    /// Load a config from a TOML file; missing keys fall back to defaults
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_format.trim().is_empty() {
            return Err(DrainError::invalid_config("log_format must be set"));
        }
        self.drain.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(DrainConfig::default().validate().is_ok());
        assert_eq!(DrainConfig::default().effective_depth(), 2);
    }

    #[test]
    fn test_effective_depth_floor() {
        assert_eq!(DrainConfig::new(1, 0.5).effective_depth(), 1);
        assert_eq!(DrainConfig::new(2, 0.5).effective_depth(), 1);
        assert_eq!(DrainConfig::new(3, 0.5).effective_depth(), 1);
        assert_eq!(DrainConfig::new(6, 0.5).effective_depth(), 4);
    }

    #[test]
    fn test_config_validation() {
        assert!(DrainConfig::new(0, 0.5).validate().is_err());
        assert!(DrainConfig::new(4, 1.5).validate().is_err());
        assert!(DrainConfig::new(4, -0.1).validate().is_err());
        assert!(DrainConfig::new(4, f64::NAN).validate().is_err());
        assert!(DrainConfig::new(4, 0.5).with_max_child(0).validate().is_err());

        assert!(DrainConfig::new(4, 0.0).validate().is_ok());
        assert!(DrainConfig::new(4, 1.0).with_max_child(1).validate().is_ok());
    }

    #[test]
    fn test_parser_config_requires_format() {
        assert!(ParserConfig::default().validate().is_err());
        assert!(ParserConfig::new("<Content>").validate().is_ok());
    }

    #[test]
    fn test_parser_config_from_toml() {
        let raw = r#"
            log_format = "<Date> <Time> <Level>: <Content>"
            preprocess_patterns = ["blk_-?\\d+"]
            keep_parameters = false

            [drain]
            depth = 5
            similarity_threshold = 0.6
            protected_patterns = ["^ERR\\d+$"]
        "#;
        let config = ParserConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.log_format, "<Date> <Time> <Level>: <Content>");
        assert_eq!(config.preprocess_patterns, vec![r"blk_-?\d+".to_string()]);
        assert!(!config.keep_parameters);
        assert_eq!(config.input_dir, PathBuf::from("./"));
        assert_eq!(config.drain.depth, 5);
        assert_eq!(config.drain.max_child, 100);
        assert_eq!(config.drain.protected_patterns, vec![r"^ERR\d+$".to_string()]);
    }

    #[test]
    fn test_bundled_hdfs_config() {
        let config = ParserConfig::from_toml_str(include_str!("../config/hdfs.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.preprocess_patterns.len(), 3);
        assert_eq!(config.drain.effective_depth(), 2);
        assert_eq!(config.drain.similarity_threshold, 0.5);
    }
}
