pub mod amount;
pub mod category;
pub mod money;
pub mod pattern;
pub mod rule;
pub mod transaction;

pub use amount::{AmountFormat, AmountParseError, CurrencyPosition};
pub use category::{Category, CategoryGroup};
pub use money::Money;
pub use pattern::{
    byte_offset, char_slice, ExampleError, FieldSelection, FieldType, InferredPattern,
    LearnedBankPattern, PatternMatchResult, PatternSegment, TeachingExample,
};
pub use rule::{RuleCondition, UserCategorizationRule, DEFAULT_RULE_PRIORITY};
pub use transaction::{clamp_confidence, CategorizedTransaction, MatchType, Transaction, TransactionKind};
