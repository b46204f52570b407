use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::Category;
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Debit,
    Credit,
    Transfer,
    Withdrawal,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Debit => write!(f, "debit"),
            TransactionKind::Credit => write!(f, "credit"),
            TransactionKind::Transfer => write!(f, "transfer"),
            TransactionKind::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

/// A transaction as produced by the message parsers. Never mutated by the
/// categorization core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier of the SMS the transaction was parsed from.
    pub source_message_id: i64,
    pub kind: TransactionKind,
    pub amount: Money,
    pub merchant: Option<String>,
    pub description: Option<String>,
    pub institution: String,
    pub timestamp: DateTime<Utc>,
    pub raw_message: String,
}

impl Transaction {
    /// Merchant name, treating blank strings as absent.
    pub fn merchant_name(&self) -> Option<&str> {
        self.merchant.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Which categorization layer produced a result.
///
/// Substring hits are reported as `Fuzzy`; there is no separate tag for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Keyword,
    UserPattern,
    UserRule,
    Default,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::Exact => write!(f, "EXACT"),
            MatchType::Fuzzy => write!(f, "FUZZY"),
            MatchType::Keyword => write!(f, "KEYWORD"),
            MatchType::UserPattern => write!(f, "USER_PATTERN"),
            MatchType::UserRule => write!(f, "USER_RULE"),
            MatchType::Default => write!(f, "DEFAULT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    pub transaction: Transaction,
    pub category: Category,
    /// 0.0–1.0, layer specific.
    pub confidence: f32,
    pub match_type: MatchType,
    /// Set only by the review flow when a person overrides the category.
    pub user_corrected: bool,
}

impl CategorizedTransaction {
    pub fn new(
        transaction: Transaction,
        category: Category,
        confidence: f32,
        match_type: MatchType,
    ) -> Self {
        Self {
            transaction,
            category,
            confidence: clamp_confidence(confidence),
            match_type,
            user_corrected: false,
        }
    }

    pub fn uncategorized(transaction: Transaction) -> Self {
        Self::new(transaction, Category::Uncategorized, 0.0, MatchType::Default)
    }

    /// Returns a copy overridden by a person. The match tag is kept so the
    /// original decision stays visible.
    pub fn with_user_correction(&self, category: Category) -> Self {
        Self {
            category,
            confidence: 1.0,
            user_corrected: true,
            ..self.clone()
        }
    }
}

/// Clamp a derived score into [0, 1]; NaN becomes 0.
pub fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
