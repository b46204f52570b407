use cuentas_core::{
    clamp_confidence, CategorizedTransaction, Category, LearnedBankPattern, MatchType,
    Transaction, UserCategorizationRule,
};
use tracing::debug;

use crate::dictionary::MerchantDictionary;
use crate::similarity::{normalize_merchant, similarity};

pub const EXACT_CONFIDENCE: f32 = 0.95;
pub const SUBSTRING_CONFIDENCE: f32 = 0.9;
pub const FUZZY_THRESHOLD: f32 = 0.85;
pub const FUZZY_CONFIDENCE_FACTOR: f32 = 0.9;
pub const KEYWORD_CONFIDENCE: f32 = 0.7;

/// Decides whether a user rule applies to a transaction.
pub trait RuleMatcher: Send + Sync {
    fn matches(&self, transaction: &Transaction, rule: &UserCategorizationRule) -> bool;
}

/// Outcome of a single layer.
type LayerHit = (Category, f32, MatchType);

/// Layered classifier: user rules, exact merchant, substring, fuzzy,
/// keyword, then the uncategorized default. The first layer that answers wins.
pub struct CategorizationEngine<'a> {
    dictionary: &'a MerchantDictionary,
    rules: Vec<UserCategorizationRule>,
    rule_matcher: Option<Box<dyn RuleMatcher + 'a>>,
}

impl Default for CategorizationEngine<'static> {
    fn default() -> Self {
        Self::new(MerchantDictionary::builtin())
    }
}

impl<'a> CategorizationEngine<'a> {
    pub fn new(dictionary: &'a MerchantDictionary) -> Self {
        Self {
            dictionary,
            rules: Vec::new(),
            rule_matcher: None,
        }
    }

    /// Rules are tried in the given order; sort by priority beforehand if needed.
    pub fn with_user_rules(
        mut self,
        rules: Vec<UserCategorizationRule>,
        matcher: impl RuleMatcher + 'a,
    ) -> Self {
        self.rules = rules;
        self.rule_matcher = Some(Box::new(matcher));
        self
    }

    pub fn categorize(&self, tx: &Transaction) -> CategorizedTransaction {
        let merchant = normalized_merchant(tx);
        let hit = merchant
            .as_deref()
            .and_then(|m| self.merchant_layers(tx, m))
            .or_else(|| self.match_keyword(merchant.as_deref(), tx.description.as_deref()));

        match hit {
            Some((category, confidence, match_type)) => {
                CategorizedTransaction::new(tx.clone(), category, confidence, match_type)
            }
            None => {
                debug!(message_id = tx.source_message_id, "no layer matched, uncategorized");
                CategorizedTransaction::uncategorized(tx.clone())
            }
        }
    }

    pub fn categorize_all(&self, transactions: &[Transaction]) -> Vec<CategorizedTransaction> {
        transactions.iter().map(|tx| self.categorize(tx)).collect()
    }

    /// For transactions extracted by a learned bank pattern: user rules still
    /// win, then the pattern's default category, then the regular layers.
    pub fn categorize_with_pattern(
        &self,
        tx: &Transaction,
        pattern: &LearnedBankPattern,
    ) -> CategorizedTransaction {
        if let Some((category, confidence, match_type)) =
            normalized_merchant(tx).and_then(|_| self.match_user_rules(tx))
        {
            return CategorizedTransaction::new(tx.clone(), category, confidence, match_type);
        }
        match pattern.default_category {
            Some(category) if pattern.enabled => {
                debug!(pattern_id = %pattern.id, %category, "pattern default category");
                CategorizedTransaction::new(
                    tx.clone(),
                    category,
                    clamp_confidence(pattern.pattern.confidence),
                    MatchType::UserPattern,
                )
            }
            _ => self.categorize(tx),
        }
    }

    fn merchant_layers(&self, tx: &Transaction, merchant: &str) -> Option<LayerHit> {
        self.match_user_rules(tx)
            .or_else(|| self.match_exact(merchant))
            .or_else(|| self.match_substring(merchant))
            .or_else(|| self.match_fuzzy(merchant))
    }

    // ── Layers ────────────────────────────────────────────────────────────────

    fn match_user_rules(&self, tx: &Transaction) -> Option<LayerHit> {
        let matcher = self.rule_matcher.as_ref()?;
        let rule = self.rules.iter().find(|r| matcher.matches(tx, r))?;
        debug!(rule_id = %rule.id, rule = %rule.name, "user rule matched");
        Some((rule.category, 1.0, MatchType::UserRule))
    }

    fn match_exact(&self, merchant: &str) -> Option<LayerHit> {
        let category = self.dictionary.lookup(merchant)?;
        debug!(merchant, %category, "exact merchant match");
        Some((category, EXACT_CONFIDENCE, MatchType::Exact))
    }

    /// Bidirectional containment; the longest dictionary name wins.
    fn match_substring(&self, merchant: &str) -> Option<LayerHit> {
        let best = self
            .dictionary
            .merchant_names()
            .iter()
            .filter(|name| merchant.contains(name.as_str()) || name.contains(merchant))
            .fold(None::<&String>, |best, name| match best {
                Some(b) if b.chars().count() >= name.chars().count() => Some(b),
                _ => Some(name),
            })?;
        let category = self.dictionary.lookup(best)?;
        debug!(merchant, matched = %best, %category, "substring merchant match");
        Some((category, SUBSTRING_CONFIDENCE, MatchType::Fuzzy))
    }

    fn match_fuzzy(&self, merchant: &str) -> Option<LayerHit> {
        let mut best: Option<(&String, f32)> = None;
        for name in self.dictionary.merchant_names() {
            let score = similarity(merchant, name);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((name, score));
            }
        }
        let (name, score) = best.filter(|(_, s)| *s >= FUZZY_THRESHOLD)?;
        let category = self.dictionary.lookup(name)?;
        debug!(merchant, matched = %name, score, %category, "fuzzy merchant match");
        Some((category, clamp_confidence(score * FUZZY_CONFIDENCE_FACTOR), MatchType::Fuzzy))
    }

    fn match_keyword(&self, merchant: Option<&str>, description: Option<&str>) -> Option<LayerHit> {
        let description = description.map(str::to_uppercase).unwrap_or_default();
        let text = format!("{} {}", merchant.unwrap_or_default(), description);
        if text.trim().is_empty() {
            return None;
        }
        let (keyword, category) = self
            .dictionary
            .keywords()
            .iter()
            .find(|(keyword, _)| text.contains(keyword.as_str()))?;
        debug!(keyword = %keyword, %category, "keyword match");
        Some((*category, KEYWORD_CONFIDENCE, MatchType::Keyword))
    }
}

fn normalized_merchant(tx: &Transaction) -> Option<String> {
    tx.merchant_name()
        .map(normalize_merchant)
        .filter(|m| !m.is_empty())
}
