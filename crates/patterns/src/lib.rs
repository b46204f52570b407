pub mod config;
pub mod inference;
pub mod matcher;

pub use config::{ConfigError, MatcherConfig};
pub use inference::{detect_amount_format, PatternInferenceEngine};
pub use matcher::{find_patterns_for_sender, FuzzyPatternMatcher};
