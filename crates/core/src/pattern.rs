use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::amount::{AmountFormat, AmountParseError};
use super::category::Category;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Amount,
    Merchant,
    Balance,
    CardLast4,
    Date,
    TransactionType,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Amount => write!(f, "amount"),
            FieldType::Merchant => write!(f, "merchant"),
            FieldType::Balance => write!(f, "balance"),
            FieldType::CardLast4 => write!(f, "card_last4"),
            FieldType::Date => write!(f, "date"),
            FieldType::TransactionType => write!(f, "transaction_type"),
        }
    }
}

/// A labeled span of a raw message. Offsets count chars, `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    pub field_type: FieldType,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl FieldSelection {
    /// Builds a selection by cutting `[start, end)` out of `message`.
    pub fn from_message(message: &str, field_type: FieldType, start: usize, end: usize) -> Option<Self> {
        if start >= end {
            return None;
        }
        let text = char_slice(message, start, end)?;
        Some(Self { field_type, start, end, text: text.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExampleError {
    #[error("Example has no field selections")]
    NoSelections,
    #[error("Selection {field} [{start}, {end}) is empty or outside a message of {len} chars")]
    OutOfBounds {
        field: FieldType,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("Selection {field} text '{expected}' does not match message text '{actual}'")]
    TextMismatch {
        field: FieldType,
        expected: String,
        actual: String,
    },
    #[error("Selections {0} and {1} overlap")]
    Overlapping(FieldType, FieldType),
}

/// A message annotated by a person while teaching a new format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachingExample {
    pub id: String,
    pub message: String,
    pub sender: String,
    pub selections: Vec<FieldSelection>,
    pub category: Option<Category>,
    pub created_at: DateTime<Utc>,
}

impl TeachingExample {
    /// Selections ordered by start offset.
    pub fn sorted_selections(&self) -> Vec<FieldSelection> {
        let mut sorted = self.selections.clone();
        sorted.sort_by_key(|s| s.start);
        sorted
    }

    pub fn validate(&self) -> Result<(), ExampleError> {
        if self.selections.is_empty() {
            return Err(ExampleError::NoSelections);
        }
        let len = self.message.chars().count();
        let sorted = self.sorted_selections();
        for sel in &sorted {
            if sel.start >= sel.end || sel.end > len {
                return Err(ExampleError::OutOfBounds {
                    field: sel.field_type,
                    start: sel.start,
                    end: sel.end,
                    len,
                });
            }
            let actual = char_slice(&self.message, sel.start, sel.end).unwrap_or_default();
            if actual != sel.text {
                return Err(ExampleError::TextMismatch {
                    field: sel.field_type,
                    expected: sel.text.clone(),
                    actual: actual.to_string(),
                });
            }
        }
        for pair in sorted.windows(2) {
            if pair[0].end > pair[1].start {
                return Err(ExampleError::Overlapping(pair[0].field_type, pair[1].field_type));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternSegment {
    FixedText { text: String, fuzzy_allowed: bool },
    Variable { field_type: FieldType },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredPattern {
    pub segments: Vec<PatternSegment>,
    pub amount_format: AmountFormat,
    pub confidence: f32,
}

impl InferredPattern {
    /// Field types of the Variable segments, in template order.
    pub fn field_types(&self) -> Vec<FieldType> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                PatternSegment::Variable { field_type } => Some(*field_type),
                PatternSegment::FixedText { .. } => None,
            })
            .collect()
    }
}

/// A message format taught by the user for one bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedBankPattern {
    pub id: String,
    pub bank_name: String,
    pub sender_ids: Vec<String>,
    pub examples: Vec<TeachingExample>,
    pub pattern: InferredPattern,
    pub default_category: Option<Category>,
    pub enabled: bool,
    pub success_count: u32,
    pub fail_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearnedBankPattern {
    pub fn new(
        bank_name: impl Into<String>,
        sender_ids: Vec<String>,
        examples: Vec<TeachingExample>,
        pattern: InferredPattern,
        default_category: Option<Category>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            bank_name: bank_name.into(),
            sender_ids,
            examples,
            pattern,
            default_category,
            enabled: true,
            success_count: 0,
            fail_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn accepts_sender(&self, sender: &str) -> bool {
        let sender = sender.trim();
        self.sender_ids.iter().any(|s| s.trim().eq_ignore_ascii_case(sender))
    }

    /// Returns a copy with the success or failure counter bumped.
    pub fn with_match_outcome(&self, matched: bool, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        if matched {
            next.success_count = next.success_count.saturating_add(1);
        } else {
            next.fail_count = next.fail_count.saturating_add(1);
        }
        next.updated_at = now;
        next
    }

    /// Share of successful match attempts, `None` before the first attempt.
    pub fn success_rate(&self) -> Option<f32> {
        let total = self.success_count as f32 + self.fail_count as f32;
        if total == 0.0 {
            None
        } else {
            Some(self.success_count as f32 / total)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatchResult {
    pub fields: BTreeMap<FieldType, String>,
    pub confidence: f32,
    pub pattern_id: String,
}

impl PatternMatchResult {
    pub fn field(&self, field_type: FieldType) -> Option<&str> {
        self.fields.get(&field_type).map(String::as_str)
    }

    pub fn amount(&self, format: &AmountFormat) -> Option<Result<Decimal, AmountParseError>> {
        self.field(FieldType::Amount).map(|raw| format.parse_amount(raw))
    }

    pub fn balance(&self, format: &AmountFormat) -> Option<Result<Decimal, AmountParseError>> {
        self.field(FieldType::Balance).map(|raw| format.parse_amount(raw))
    }

    /// Digits of the card field, e.g. "*1234" becomes "1234".
    pub fn card_last4(&self) -> Option<String> {
        let digits: String = self
            .field(FieldType::CardLast4)?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        (!digits.is_empty()).then_some(digits)
    }
}

/// Slice `text` by char offsets `[start, end)`.
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let from = byte_offset(text, start)?;
    let to = byte_offset(text, end)?;
    Some(&text[from..to])
}

/// Byte index of the char at offset `chars`; the text length when `chars`
/// equals the char count.
pub fn byte_offset(text: &str, chars: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(chars)
}
