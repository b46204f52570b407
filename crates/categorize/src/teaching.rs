//! Learns categorization rules from transactions a person grouped together,
//! and evaluates learned rules against new transactions.

use std::collections::HashSet;

use cuentas_core::{Category, RuleCondition, Transaction, UserCategorizationRule};
use tracing::debug;

use crate::engine::RuleMatcher;
use crate::similarity::normalize_merchant;

/// Articles, conjunctions, legal-entity abbreviations and the storefront and
/// payment words banks put in front of merchant names. None of them identify
/// a merchant.
const GENERIC_WORDS: &[&str] = &[
    "THE", "AND", "FOR", "WITH", "FROM", "LOS", "LAS", "DEL", "POR", "PARA", "CON", "UNA",
    "UNO", "SAS", "LTDA", "INC", "LLC", "LTD", "CORP", "CIA", "COMPANY", "SUCURSAL", "SUC",
    "TIENDA", "STORE", "COMPRA", "PAGO",
];

const MIN_KEYWORD_LEN: usize = 3;
const MIN_SENDER_LEN: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryTeachingEngine;

impl CategoryTeachingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Infer a rule shared by `transactions`. Needs at least two examples and
    /// returns `None` when no common condition can be found.
    pub fn learn_rule(
        &self,
        transactions: &[Transaction],
        category: Category,
        name: Option<&str>,
    ) -> Option<UserCategorizationRule> {
        if transactions.len() < 2 {
            debug!(count = transactions.len(), "need at least two transactions to learn a rule");
            return None;
        }

        let merchants: Vec<String> = transactions
            .iter()
            .map(|tx| normalize_merchant(tx.merchant.as_deref().unwrap_or_default()))
            .collect();

        let mut conditions = Vec::new();
        if merchants.iter().all(|m| *m == merchants[0]) && !merchants[0].is_empty() {
            conditions.push(RuleCondition::MerchantEquals {
                value: merchants[0].clone(),
            });
        } else {
            let keywords = shared_tokens(&merchants);
            if !keywords.is_empty() {
                conditions.push(RuleCondition::AnyKeyword { keywords });
            }
        }

        let senders: Vec<Option<String>> = transactions
            .iter()
            .map(|tx| derive_sender(&tx.raw_message))
            .collect();
        if let Some(Some(first)) = senders.first() {
            if senders.iter().all(|s| s.as_ref() == Some(first)) {
                conditions.push(RuleCondition::SenderContains {
                    value: first.clone(),
                });
            }
        }

        if conditions.is_empty() {
            debug!(%category, "no shared merchant or sender, rule not learnable");
            return None;
        }

        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| UserCategorizationRule::describe(&conditions, category));
        let mut rule = UserCategorizationRule::new(name, conditions, category);
        rule.learned_from = Some(
            transactions
                .iter()
                .map(|tx| tx.source_message_id.to_string())
                .collect(),
        );
        debug!(rule = %rule.name, conditions = rule.conditions.len(), "learned rule");
        Some(rule)
    }

    /// A rule matches when it is enabled and every condition holds.
    pub fn matches(&self, tx: &Transaction, rule: &UserCategorizationRule) -> bool {
        if !rule.enabled {
            return false;
        }
        let merchant = normalize_merchant(tx.merchant.as_deref().unwrap_or_default());
        rule.conditions
            .iter()
            .all(|condition| condition_matches(condition, tx, &merchant))
    }
}

impl RuleMatcher for CategoryTeachingEngine {
    fn matches(&self, transaction: &Transaction, rule: &UserCategorizationRule) -> bool {
        CategoryTeachingEngine::matches(self, transaction, rule)
    }
}

fn condition_matches(condition: &RuleCondition, tx: &Transaction, merchant: &str) -> bool {
    match condition {
        RuleCondition::MerchantEquals { value } => {
            !merchant.is_empty() && merchant == normalize_merchant(value)
        }
        RuleCondition::MerchantContains { value } => {
            let value = value.trim().to_uppercase();
            !merchant.is_empty() && merchant.contains(&value)
        }
        RuleCondition::AnyKeyword { keywords } => keywords
            .iter()
            .map(|k| k.trim().to_uppercase())
            .any(|k| !k.is_empty() && merchant.contains(&k)),
        RuleCondition::SenderContains { value } => derive_sender(&tx.raw_message)
            .is_some_and(|sender| sender.contains(&value.trim().to_uppercase())),
        RuleCondition::AmountRange { min, max } => {
            let amount = tx.amount.amount();
            min.map_or(true, |lo| amount >= lo) && max.map_or(true, |hi| amount <= hi)
        }
    }
}

/// First whitespace-delimited token of the message, uppercased, when it is
/// long enough to identify a sender (e.g. "BANCOLOMBIA:" or "891333").
pub fn derive_sender(raw_message: &str) -> Option<String> {
    let token = raw_message.split_whitespace().next()?.to_uppercase();
    (token.chars().count() >= MIN_SENDER_LEN).then_some(token)
}

/// Tokens present in every merchant, in first-merchant order, without
/// short or generic words.
fn shared_tokens(merchants: &[String]) -> Vec<String> {
    let Some((first, rest)) = merchants.split_first() else {
        return Vec::new();
    };
    let others: Vec<HashSet<&str>> = rest.iter().map(|m| m.split_whitespace().collect()).collect();
    let mut seen = HashSet::new();
    first
        .split_whitespace()
        .filter(|token| others.iter().all(|set| set.contains(token)))
        .filter(|token| token.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|token| !GENERIC_WORDS.contains(token))
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}
