use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::Category;

pub const DEFAULT_RULE_PRIORITY: i32 = 100;

/// A single test a rule applies to a transaction. All conditions of a rule
/// must hold for the rule to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    MerchantEquals { value: String },
    MerchantContains { value: String },
    SenderContains { value: String },
    /// Inclusive bounds; `None` means unbounded on that side.
    AmountRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    AnyKeyword { keywords: Vec<String> },
}

impl RuleCondition {
    pub fn describe(&self) -> String {
        match self {
            RuleCondition::MerchantEquals { value } => format!("Merchant is {value}"),
            RuleCondition::MerchantContains { value } => format!("Merchant contains {value}"),
            RuleCondition::SenderContains { value } => format!("Sender contains {value}"),
            RuleCondition::AmountRange { min, max } => match (min, max) {
                (Some(lo), Some(hi)) => format!("Amount between {lo} and {hi}"),
                (Some(lo), None) => format!("Amount at least {lo}"),
                (None, Some(hi)) => format!("Amount at most {hi}"),
                (None, None) => "Any amount".to_string(),
            },
            RuleCondition::AnyKeyword { keywords } => {
                format!("Merchant mentions {}", keywords.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCategorizationRule {
    pub id: String,
    pub name: String,
    pub conditions: Vec<RuleCondition>,
    pub category: Category,
    pub priority: i32,
    /// Source-message ids of the transactions the rule was learned from.
    pub learned_from: Option<Vec<String>>,
    pub enabled: bool,
}

impl UserCategorizationRule {
    /// New enabled rule with a fresh id and the default priority.
    pub fn new(name: impl Into<String>, conditions: Vec<RuleCondition>, category: Category) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            conditions,
            category,
            priority: DEFAULT_RULE_PRIORITY,
            learned_from: None,
            enabled: true,
        }
    }

    /// Human-readable name derived from the first condition and the target category.
    pub fn describe(conditions: &[RuleCondition], category: Category) -> String {
        match conditions.first() {
            Some(first) => format!("{} ({})", first.describe(), category.display_name()),
            None => format!("Always ({})", category.display_name()),
        }
    }
}
