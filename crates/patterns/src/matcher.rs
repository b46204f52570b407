use std::collections::BTreeMap;

use cuentas_categorize::similarity::similarity;
use cuentas_core::{
    clamp_confidence, InferredPattern, LearnedBankPattern, PatternMatchResult, PatternSegment,
};
use tracing::debug;

use crate::config::MatcherConfig;

/// Applies an inferred template to a raw message, left to right, without
/// backtracking over fixed segments already matched.
#[derive(Debug, Clone, Default)]
pub struct FuzzyPatternMatcher {
    config: MatcherConfig,
}

/// Where a fixed segment was found: char range and match confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Anchor {
    start: usize,
    end: usize,
    confidence: f32,
}

/// A message prepared for char-based scanning.
struct Message {
    chars: Vec<char>,
    folded: Vec<char>,
}

impl Message {
    fn new(raw: &str) -> Self {
        let chars: Vec<char> = raw.chars().collect();
        let folded = chars.iter().map(|c| fold(*c)).collect();
        Self { chars, folded }
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}

impl FuzzyPatternMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Extract the pattern's fields from `raw_message`, or `None` when a fixed
    /// segment cannot be located or the overall confidence is too low.
    pub fn match_message(
        &self,
        raw_message: &str,
        pattern: &InferredPattern,
        pattern_id: &str,
    ) -> Option<PatternMatchResult> {
        let message = Message::new(raw_message);
        let mut cursor = 0;
        let mut scores = Vec::with_capacity(pattern.segments.len());
        let mut fields = BTreeMap::new();

        for (idx, segment) in pattern.segments.iter().enumerate() {
            match segment {
                PatternSegment::FixedText { text, fuzzy_allowed } => {
                    let Some(anchor) = self.find_fixed(&message, text, *fuzzy_allowed, cursor) else {
                        debug!(pattern_id, segment = %text, cursor, "fixed segment not found");
                        return None;
                    };
                    cursor = anchor.end;
                    scores.push(anchor.confidence);
                }
                PatternSegment::Variable { field_type } => {
                    let boundary = pattern.segments[idx + 1..]
                        .iter()
                        .find_map(|s| match s {
                            PatternSegment::FixedText { text, fuzzy_allowed } => {
                                Some(self.find_fixed(&message, text, *fuzzy_allowed, cursor))
                            }
                            PatternSegment::Variable { .. } => None,
                        })
                        .flatten()
                        .map_or(message.len(), |anchor| anchor.start);
                    let value = message.text(cursor, boundary);
                    fields.insert(*field_type, value.trim().to_string());
                    cursor = boundary;
                    scores.push(1.0);
                }
            }
        }

        if scores.is_empty() {
            return None;
        }
        let confidence = clamp_confidence(scores.iter().sum::<f32>() / scores.len() as f32);
        if confidence < self.config.min_confidence_threshold {
            debug!(pattern_id, confidence, "match below confidence threshold");
            return None;
        }

        Some(PatternMatchResult {
            fields,
            confidence,
            pattern_id: pattern_id.to_string(),
        })
    }

    /// Try every enabled pattern registered for `sender`; the most confident
    /// match wins, earlier patterns win ties.
    pub fn match_learned(
        &self,
        raw_message: &str,
        sender: &str,
        patterns: &[LearnedBankPattern],
    ) -> Option<PatternMatchResult> {
        find_patterns_for_sender(patterns, sender)
            .filter_map(|p| self.match_message(raw_message, &p.pattern, &p.id))
            .fold(None, |best: Option<PatternMatchResult>, candidate| match best {
                Some(b) if b.confidence >= candidate.confidence => Some(b),
                _ => Some(candidate),
            })
    }

    /// Locate `text` at or after `from`: exact (case-insensitive) first, then,
    /// when allowed, the most similar window of the same length.
    fn find_fixed(&self, message: &Message, text: &str, fuzzy_allowed: bool, from: usize) -> Option<Anchor> {
        let needle: Vec<char> = text.chars().map(fold).collect();
        if needle.is_empty() {
            return Some(Anchor { start: from, end: from, confidence: 1.0 });
        }
        let haystack = message.folded.get(from..)?;

        if let Some(pos) = haystack.windows(needle.len()).position(|w| w == needle.as_slice()) {
            return Some(Anchor {
                start: from + pos,
                end: from + pos + needle.len(),
                confidence: 1.0,
            });
        }
        if !fuzzy_allowed || haystack.is_empty() {
            return None;
        }

        let needle_text: String = needle.iter().collect();
        let width = needle.len().min(haystack.len());
        let mut best: Option<Anchor> = None;
        for (pos, window) in haystack.windows(width).enumerate() {
            let window_text: String = window.iter().collect();
            let score = similarity(&window_text, &needle_text);
            if best.map_or(true, |b| score > b.confidence) {
                best = Some(Anchor {
                    start: from + pos,
                    end: from + pos + width,
                    confidence: score,
                });
            }
        }
        best.filter(|b| b.confidence >= self.config.fuzzy_text_threshold)
    }
}

/// Enabled patterns that accept messages from `sender`, in the given order.
pub fn find_patterns_for_sender<'p>(
    patterns: &'p [LearnedBankPattern],
    sender: &'p str,
) -> impl Iterator<Item = &'p LearnedBankPattern> + 'p {
    patterns
        .iter()
        .filter(move |p| p.enabled && p.accepts_sender(sender))
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
