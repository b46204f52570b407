use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyPosition {
    Before,
    After,
    None,
}

/// How amounts are written in a bank's messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountFormat {
    pub thousands_separator: char,
    pub decimal_separator: char,
    pub currency_symbol: Option<String>,
    pub currency_position: CurrencyPosition,
}

impl Default for AmountFormat {
    /// Latin-American convention: `$1.234.567,89`.
    fn default() -> Self {
        Self {
            thousands_separator: '.',
            decimal_separator: ',',
            currency_symbol: Some("$".to_string()),
            currency_position: CurrencyPosition::Before,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("Amount text contains no digits: '{0}'")]
    NoDigits(String),
    #[error("Invalid amount: '{0}'")]
    Invalid(String),
}

impl AmountFormat {
    /// Parse raw extracted text such as `"$1.234,56"` or `"USD 1,234.56"`.
    pub fn parse_amount(&self, raw: &str) -> Result<Decimal, AmountParseError> {
        let mut text = raw.trim();
        if let Some(symbol) = self.currency_symbol.as_deref() {
            text = text.trim_start_matches(symbol).trim_end_matches(symbol).trim();
        }
        if !text.chars().any(|c| c.is_ascii_digit()) {
            return Err(AmountParseError::NoDigits(raw.to_string()));
        }

        let negative = text.starts_with('-');
        let kept: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == self.decimal_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();
        let cleaned = kept
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .trim_end_matches(|c: char| !c.is_ascii_digit());

        let value = Decimal::from_str(cleaned).map_err(|_| AmountParseError::Invalid(raw.to_string()))?;
        Ok(if negative { -value } else { value })
    }
}
