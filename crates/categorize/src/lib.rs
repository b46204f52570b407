pub mod dictionary;
pub mod engine;
pub mod similarity;
pub mod teaching;

pub use dictionary::{DictionaryError, MerchantDictionary};
pub use engine::{CategorizationEngine, RuleMatcher};
pub use similarity::{
    common_text, levenshtein_distance, longest_common_substring, normalize_merchant, similarity,
};
pub use teaching::{derive_sender, CategoryTeachingEngine};
