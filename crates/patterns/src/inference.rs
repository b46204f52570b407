//! Infers a message template from a few annotated examples.
//!
//! Text shared by every example between the same pair of selections becomes a
//! fixed segment; each selection becomes a variable segment.

use std::collections::BTreeSet;

use cuentas_categorize::common_text;
use cuentas_core::{
    char_slice, clamp_confidence, AmountFormat, CurrencyPosition, FieldType, InferredPattern,
    PatternSegment, TeachingExample,
};
use tracing::debug;

/// Checked in this order; the first symbol found decides.
const CURRENCY_SYMBOLS: &[&str] = &["$", "USD", "COP", "€", "£", "R$"];

const NO_FIXED_TEXT_CONFIDENCE: f32 = 0.4;

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternInferenceEngine;

impl PatternInferenceEngine {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` for fewer than two examples, invalid selections, or
    /// examples that label different fields.
    pub fn infer_pattern(&self, examples: &[TeachingExample]) -> Option<InferredPattern> {
        if examples.len() < 2 {
            debug!(count = examples.len(), "need at least two examples to infer a pattern");
            return None;
        }
        for example in examples {
            if let Err(e) = example.validate() {
                debug!(example_id = %example.id, error = %e, "invalid teaching example");
                return None;
            }
        }

        let sorted: Vec<_> = examples.iter().map(TeachingExample::sorted_selections).collect();
        let field_sets: Vec<BTreeSet<FieldType>> = sorted
            .iter()
            .map(|sels| sels.iter().map(|s| s.field_type).collect())
            .collect();
        if field_sets.iter().any(|set| *set != field_sets[0]) {
            debug!("examples select different fields");
            return None;
        }
        let field_order = |i: usize| sorted[i].iter().map(|s| s.field_type).collect::<Vec<_>>();
        let first_order = field_order(0);
        if (1..sorted.len()).any(|i| field_order(i) != first_order) {
            debug!("examples select the same fields in a different order");
            return None;
        }

        let mut segments = Vec::new();

        let prefixes: Vec<&str> = examples
            .iter()
            .zip(&sorted)
            .map(|(ex, sels)| char_slice(&ex.message, 0, sels[0].start).unwrap_or_default())
            .collect();
        push_fixed(&mut segments, &prefixes);

        for (i, field_type) in first_order.iter().enumerate() {
            segments.push(PatternSegment::Variable { field_type: *field_type });
            let gaps: Vec<&str> = examples
                .iter()
                .zip(&sorted)
                .map(|(ex, sels)| {
                    let from = sels[i].end;
                    let to = sels
                        .get(i + 1)
                        .map_or_else(|| ex.message.chars().count(), |next| next.start);
                    char_slice(&ex.message, from, to).unwrap_or_default()
                })
                .collect();
            push_fixed(&mut segments, &gaps);
        }

        let amount_format = sorted[0]
            .iter()
            .find(|s| s.field_type == FieldType::Amount)
            .map(|s| detect_amount_format(&s.text))
            .unwrap_or_default();

        let confidence = pattern_confidence(&segments, examples);
        debug!(segments = segments.len(), confidence, "inferred pattern");

        Some(InferredPattern {
            segments,
            amount_format,
            confidence,
        })
    }
}

fn push_fixed(segments: &mut Vec<PatternSegment>, texts: &[&str]) {
    let common = common_text(texts);
    let text = common.trim();
    if !text.is_empty() {
        segments.push(PatternSegment::FixedText {
            text: text.to_string(),
            fuzzy_allowed: true,
        });
    }
}

/// Share of the average message covered by fixed text, plus small bonuses
/// for more examples and more anchors.
fn pattern_confidence(segments: &[PatternSegment], examples: &[TeachingExample]) -> f32 {
    let fixed_lengths: Vec<usize> = segments
        .iter()
        .filter_map(|s| match s {
            PatternSegment::FixedText { text, .. } => Some(text.chars().count()),
            PatternSegment::Variable { .. } => None,
        })
        .collect();
    if fixed_lengths.is_empty() {
        return NO_FIXED_TEXT_CONFIDENCE;
    }

    let total_fixed: usize = fixed_lengths.iter().sum();
    let avg_len = examples
        .iter()
        .map(|e| e.message.chars().count() as f32)
        .sum::<f32>()
        / examples.len() as f32;
    let base = if avg_len > 0.0 {
        clamp_confidence(total_fixed as f32 / avg_len)
    } else {
        0.0
    };

    let example_bonus = match examples.len() {
        n if n >= 3 => 0.1,
        2 => 0.05,
        _ => 0.0,
    };
    let anchor_bonus = match fixed_lengths.len() {
        n if n >= 3 => 0.1,
        2 => 0.05,
        _ => 0.0,
    };
    clamp_confidence(base + example_bonus + anchor_bonus)
}

/// Guess separators and currency from a sample amount such as `"$1.234,56"`.
pub fn detect_amount_format(sample: &str) -> AmountFormat {
    let defaults = AmountFormat::default();
    let (thousands_separator, decimal_separator) = match (sample.rfind(','), sample.rfind('.')) {
        // The separator appearing last is the decimal one.
        (Some(comma), Some(dot)) if comma > dot => ('.', ','),
        (Some(_), Some(_)) => (',', '.'),
        (Some(_), None) => (',', '.'),
        (None, Some(_)) => ('.', ','),
        (None, None) => (defaults.thousands_separator, defaults.decimal_separator),
    };

    let trimmed = sample.trim();
    let (currency_symbol, currency_position) = CURRENCY_SYMBOLS
        .iter()
        .find_map(|symbol| {
            if trimmed.starts_with(symbol) {
                Some((symbol, CurrencyPosition::Before))
            } else if trimmed.ends_with(symbol) {
                Some((symbol, CurrencyPosition::After))
            } else if trimmed.contains(symbol) {
                Some((symbol, CurrencyPosition::None))
            } else {
                None
            }
        })
        .map_or((None, CurrencyPosition::None), |(symbol, position)| {
            (Some(symbol.to_string()), position)
        });

    AmountFormat {
        thousands_separator,
        decimal_separator,
        currency_symbol,
        currency_position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cuentas_core::FieldSelection;

    fn make_example(id: &str, message: &str, selections: &[(FieldType, usize, usize)]) -> TeachingExample {
        TeachingExample {
            id: id.to_string(),
            message: message.to_string(),
            sender: "891333".to_string(),
            selections: selections
                .iter()
                .map(|(f, s, e)| FieldSelection::from_message(message, *f, *s, *e).unwrap())
                .collect(),
            category: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn scenario_c() -> Vec<TeachingExample> {
        vec![
            make_example(
                "e1",
                "Compra por $50.000 en EXITO",
                &[(FieldType::Amount, 11, 18), (FieldType::Merchant, 22, 27)],
            ),
            make_example(
                "e2",
                "Compra por $75.000 en CARULLA",
                &[(FieldType::Amount, 11, 18), (FieldType::Merchant, 22, 29)],
            ),
        ]
    }

    fn fixed(text: &str) -> PatternSegment {
        PatternSegment::FixedText { text: text.to_string(), fuzzy_allowed: true }
    }

    fn var(field_type: FieldType) -> PatternSegment {
        PatternSegment::Variable { field_type }
    }

    #[test]
    fn infers_scenario_c_template() {
        let pattern = PatternInferenceEngine::new().infer_pattern(&scenario_c()).unwrap();
        assert_eq!(
            pattern.segments,
            vec![fixed("Compra por"), var(FieldType::Amount), fixed("en"), var(FieldType::Merchant)]
        );
        let format = &pattern.amount_format;
        assert_eq!(format.thousands_separator, '.');
        assert_eq!(format.decimal_separator, ',');
        assert_eq!(format.currency_symbol.as_deref(), Some("$"));
        assert_eq!(format.currency_position, CurrencyPosition::Before);
    }

    #[test]
    fn scenario_c_confidence() {
        let pattern = PatternInferenceEngine::new().infer_pattern(&scenario_c()).unwrap();
        // 12 fixed chars over an average of 28, plus two 0.05 bonuses.
        let expected = 12.0 / 28.0 + 0.05 + 0.05;
        assert!((pattern.confidence - expected).abs() < 1e-6, "{}", pattern.confidence);
    }

    #[test]
    fn rejects_single_example() {
        let mut examples = scenario_c();
        examples.truncate(1);
        assert!(PatternInferenceEngine::new().infer_pattern(&examples).is_none());
    }

    #[test]
    fn rejects_different_field_sets() {
        let examples = vec![
            make_example(
                "e1",
                "Compra por $50.000 en EXITO",
                &[(FieldType::Amount, 11, 18), (FieldType::Merchant, 22, 27)],
            ),
            make_example("e2", "Compra por $75.000 en CARULLA", &[(FieldType::Amount, 11, 18)]),
        ];
        assert!(PatternInferenceEngine::new().infer_pattern(&examples).is_none());
    }

    #[test]
    fn rejects_different_field_order() {
        let examples = vec![
            make_example(
                "e1",
                "Compra por $50.000 en EXITO",
                &[(FieldType::Amount, 11, 18), (FieldType::Merchant, 22, 27)],
            ),
            make_example(
                "e2",
                "EXITO cobro $75.000",
                &[(FieldType::Merchant, 0, 5), (FieldType::Amount, 12, 19)],
            ),
        ];
        assert!(PatternInferenceEngine::new().infer_pattern(&examples).is_none());
    }

    #[test]
    fn rejects_overlapping_selections() {
        let mut examples = scenario_c();
        let sel = FieldSelection::from_message(&examples[1].message, FieldType::Balance, 15, 20).unwrap();
        examples[1].selections.push(sel);
        let sel = FieldSelection::from_message(&examples[0].message, FieldType::Balance, 19, 21).unwrap();
        examples[0].selections.push(sel);
        assert!(PatternInferenceEngine::new().infer_pattern(&examples).is_none());
    }

    #[test]
    fn unsorted_selections_are_sorted_first() {
        let mut examples = scenario_c();
        examples[0].selections.reverse();
        let pattern = PatternInferenceEngine::new().infer_pattern(&examples).unwrap();
        assert_eq!(pattern.field_types(), vec![FieldType::Amount, FieldType::Merchant]);
    }

    #[test]
    fn no_shared_text_gives_flat_confidence() {
        let examples = vec![
            make_example("e1", "abc 100", &[(FieldType::Amount, 4, 7)]),
            make_example("e2", "xyz 200", &[(FieldType::Amount, 4, 7)]),
        ];
        let pattern = PatternInferenceEngine::new().infer_pattern(&examples).unwrap();
        assert_eq!(pattern.segments, vec![var(FieldType::Amount)]);
        assert_eq!(pattern.confidence, 0.4);
    }

    #[test]
    fn confidence_bonuses_for_three_examples_and_anchors() {
        let messages = [
            ("Bancolombia: Compra $10.000 en EXITO. Saldo $90.000", "$10.000", "EXITO", "$90.000"),
            ("Bancolombia: Compra $20.500 en JUMBO. Saldo $70.000", "$20.500", "JUMBO", "$70.000"),
            ("Bancolombia: Compra $5.000 en D1. Saldo $65.000", "$5.000", "D1", "$65.000"),
        ];
        let examples: Vec<_> = messages
            .iter()
            .enumerate()
            .map(|(i, (msg, amount, merchant, balance))| {
                let pos = |needle: &str| {
                    let byte = msg.find(needle).unwrap();
                    let start = msg[..byte].chars().count();
                    (start, start + needle.chars().count())
                };
                let (a0, a1) = pos(amount);
                let (m0, m1) = pos(merchant);
                let (b0, b1) = pos(balance);
                make_example(
                    &format!("e{i}"),
                    msg,
                    &[(FieldType::Amount, a0, a1), (FieldType::Merchant, m0, m1), (FieldType::Balance, b0, b1)],
                )
            })
            .collect();
        let pattern = PatternInferenceEngine::new().infer_pattern(&examples).unwrap();
        assert_eq!(
            pattern.segments,
            vec![
                fixed("Bancolombia: Compra"),
                var(FieldType::Amount),
                fixed("en"),
                var(FieldType::Merchant),
                fixed(". Saldo"),
                var(FieldType::Balance),
            ]
        );
        let avg = examples.iter().map(|e| e.message.chars().count() as f32).sum::<f32>() / 3.0;
        let expected = (19.0 + 2.0 + 7.0) / avg + 0.1 + 0.1;
        assert!((pattern.confidence - expected.min(1.0)).abs() < 1e-6);
    }

    #[test]
    fn confidence_is_capped_at_one() {
        // Fixed text covers 47 of 50 chars; with both bonuses the raw score exceeds 1.
        let examples: Vec<_> = ["1", "2", "3"]
            .iter()
            .map(|n| {
                let msg = format!("Bancolombia informa retiro aprobado en cajero {n} ok");
                make_example(&format!("e{n}"), &msg, &[(FieldType::Amount, 46, 47)])
            })
            .collect();
        let pattern = PatternInferenceEngine::new().infer_pattern(&examples).unwrap();
        assert_eq!(
            pattern.segments,
            vec![
                fixed("Bancolombia informa retiro aprobado en cajero"),
                var(FieldType::Amount),
                fixed("ok"),
            ]
        );
        assert_eq!(pattern.confidence, 1.0);
    }

    #[test]
    fn detect_latin_american_and_us_formats() {
        let f = detect_amount_format("1.234,56");
        assert_eq!((f.thousands_separator, f.decimal_separator), ('.', ','));
        let f = detect_amount_format("1,234.56");
        assert_eq!((f.thousands_separator, f.decimal_separator), (',', '.'));
    }

    #[test]
    fn detect_single_separator_is_thousands() {
        let f = detect_amount_format("$50.000");
        assert_eq!((f.thousands_separator, f.decimal_separator), ('.', ','));
        let f = detect_amount_format("50,000");
        assert_eq!((f.thousands_separator, f.decimal_separator), (',', '.'));
        let f = detect_amount_format("50000");
        assert_eq!((f.thousands_separator, f.decimal_separator), ('.', ','));
    }

    #[test]
    fn detect_currency_position() {
        let f = detect_amount_format("USD 12.50");
        assert_eq!(f.currency_symbol.as_deref(), Some("USD"));
        assert_eq!(f.currency_position, CurrencyPosition::Before);
        let f = detect_amount_format("12,50 €");
        assert_eq!(f.currency_symbol.as_deref(), Some("€"));
        assert_eq!(f.currency_position, CurrencyPosition::After);
        let f = detect_amount_format("50.000");
        assert_eq!(f.currency_symbol, None);
        assert_eq!(f.currency_position, CurrencyPosition::None);
    }

    #[test]
    fn detect_currency_priority_list_order() {
        // "$" is checked before "R$", and only appears inside the text.
        let f = detect_amount_format("R$ 100,00");
        assert_eq!(f.currency_symbol.as_deref(), Some("$"));
        assert_eq!(f.currency_position, CurrencyPosition::None);
    }

    #[test]
    fn missing_amount_field_uses_default_format() {
        let examples = vec![
            make_example("e1", "Compra en EXITO aprobada", &[(FieldType::Merchant, 10, 15)]),
            make_example("e2", "Compra en JUMBO aprobada", &[(FieldType::Merchant, 10, 15)]),
        ];
        let pattern = PatternInferenceEngine::new().infer_pattern(&examples).unwrap();
        assert_eq!(pattern.amount_format, AmountFormat::default());
        assert_eq!(
            pattern.segments,
            vec![fixed("Compra en"), var(FieldType::Merchant), fixed("aprobada")]
        );
    }
}
