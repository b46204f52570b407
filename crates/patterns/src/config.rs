use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    OutOfRange { name: &'static str, value: f32 },
}

/// Thresholds for [`crate::FuzzyPatternMatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Matches scoring below this are rejected.
    pub min_confidence_threshold: f32,
    /// Minimum similarity for a fixed segment found only approximately.
    pub fuzzy_text_threshold: f32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_confidence_threshold: 0.7,
            fuzzy_text_threshold: 0.75,
        }
    }
}

impl MatcherConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: MatcherConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("min_confidence_threshold", self.min_confidence_threshold),
            ("fuzzy_text_threshold", self.fuzzy_text_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }
        Ok(())
    }
}
