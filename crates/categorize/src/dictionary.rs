//! Merchant and keyword lookup tables consumed by the categorization engine.
//!
//! Merchant names are stored normalized (see [`normalize_merchant`]) and kept in
//! insertion order alongside the hash index, so the substring and fuzzy layers
//! scan them deterministically. Keywords are an ordered list: the first keyword
//! found in a transaction wins.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use cuentas_core::Category;
use serde::Deserialize;
use thiserror::Error;

use crate::similarity::normalize_merchant;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unknown category '{category}' for entry '{entry}'")]
    UnknownCategory { entry: String, category: String },
    #[error("Empty {0} entry")]
    EmptyEntry(&'static str),
}

#[derive(Debug, Clone, Default)]
pub struct MerchantDictionary {
    merchants: HashMap<String, Category>,
    merchant_names: Vec<String>,
    keywords: Vec<(String, Category)>,
}

#[derive(Debug, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    merchants: Vec<MerchantEntry>,
    #[serde(default)]
    keywords: Vec<KeywordEntry>,
}

#[derive(Debug, Deserialize)]
struct MerchantEntry {
    name: String,
    category: String,
}

#[derive(Debug, Deserialize)]
struct KeywordEntry {
    keyword: String,
    category: String,
}

impl MerchantDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared built-in dictionary, built on first use and never mutated.
    pub fn builtin() -> &'static MerchantDictionary {
        static DICT: OnceLock<MerchantDictionary> = OnceLock::new();
        DICT.get_or_init(|| {
            let mut dict = MerchantDictionary::new();
            for (name, category) in BUILTIN_MERCHANTS {
                dict.insert_merchant(name, *category);
            }
            for (keyword, category) in BUILTIN_KEYWORDS {
                dict.insert_keyword(keyword, *category);
            }
            dict
        })
    }

    /// Load a dictionary from TOML:
    ///
    /// ```toml
    /// [[merchants]]
    /// name = "EXITO"
    /// category = "groceries"
    ///
    /// [[keywords]]
    /// keyword = "RESTAURANTE"
    /// category = "restaurants"
    /// ```
    pub fn from_toml(toml_content: &str) -> Result<Self, DictionaryError> {
        let file: DictionaryFile = toml::from_str(toml_content)?;
        let mut dict = MerchantDictionary::new();
        for entry in file.merchants {
            let category = parse_category(&entry.name, &entry.category)?;
            if normalize_merchant(&entry.name).is_empty() {
                return Err(DictionaryError::EmptyEntry("merchant"));
            }
            dict.insert_merchant(&entry.name, category);
        }
        for entry in file.keywords {
            let category = parse_category(&entry.keyword, &entry.category)?;
            if entry.keyword.trim().is_empty() {
                return Err(DictionaryError::EmptyEntry("keyword"));
            }
            dict.insert_keyword(&entry.keyword, category);
        }
        Ok(dict)
    }

    pub fn with_merchant(mut self, name: &str, category: Category) -> Self {
        self.insert_merchant(name, category);
        self
    }

    pub fn with_keyword(mut self, keyword: &str, category: Category) -> Self {
        self.insert_keyword(keyword, category);
        self
    }

    /// Re-inserting a name updates its category but keeps its original position.
    pub fn insert_merchant(&mut self, name: &str, category: Category) {
        let key = normalize_merchant(name);
        if key.is_empty() {
            return;
        }
        if self.merchants.insert(key.clone(), category).is_none() {
            self.merchant_names.push(key);
        }
    }

    pub fn insert_keyword(&mut self, keyword: &str, category: Category) {
        let keyword = keyword.trim().to_uppercase();
        if !keyword.is_empty() {
            self.keywords.push((keyword, category));
        }
    }

    /// Exact lookup of an already normalized merchant name.
    pub fn lookup(&self, normalized: &str) -> Option<Category> {
        self.merchants.get(normalized).copied()
    }

    /// Known merchant names, normalized, in insertion order.
    pub fn merchant_names(&self) -> &[String] {
        &self.merchant_names
    }

    pub fn keywords(&self) -> &[(String, Category)] {
        &self.keywords
    }

    pub fn merchant_count(&self) -> usize {
        self.merchant_names.len()
    }

    /// True when there are neither merchants nor keywords.
    pub fn is_empty(&self) -> bool {
        self.merchant_names.is_empty() && self.keywords.is_empty()
    }
}

fn parse_category(entry: &str, category: &str) -> Result<Category, DictionaryError> {
    Category::from_str(category).map_err(|_| DictionaryError::UnknownCategory {
        entry: entry.to_string(),
        category: category.to_string(),
    })
}

// ── Built-in data ─────────────────────────────────────────────────────────────

const BUILTIN_MERCHANTS: &[(&str, Category)] = &[
    // Groceries
    ("EXITO", Category::Groceries),
    ("ALMACENES EXITO", Category::Groceries),
    ("CARULLA", Category::Groceries),
    ("OLIMPICA", Category::Groceries),
    ("JUMBO", Category::Groceries),
    ("MAS POR MENOS", Category::Groceries),
    ("TIENDAS D1", Category::Groceries),
    ("TIENDAS ARA", Category::Groceries),
    ("MAKRO", Category::Groceries),
    ("PRICESMART", Category::Groceries),
    ("SURTIMAX", Category::Groceries),
    // Restaurants
    ("RAPPI", Category::Restaurants),
    ("IFOOD", Category::Restaurants),
    ("CREPES Y WAFFLES", Category::Restaurants),
    ("JUAN VALDEZ", Category::Restaurants),
    ("TOSTAO", Category::Restaurants),
    ("MCDONALDS", Category::Restaurants),
    ("FRISBY", Category::Restaurants),
    ("EL CORRAL", Category::Restaurants),
    ("DOMINOS PIZZA", Category::Restaurants),
    ("STARBUCKS", Category::Restaurants),
    // Transport
    ("UBER", Category::Transport),
    ("CABIFY", Category::Transport),
    ("INDRIVER", Category::Transport),
    ("TRANSMILENIO", Category::Transport),
    ("METRO DE MEDELLIN", Category::Transport),
    // Fuel
    ("TERPEL", Category::Fuel),
    ("PRIMAX", Category::Fuel),
    ("BIOMAX", Category::Fuel),
    ("TEXACO", Category::Fuel),
    // Shopping
    ("FALABELLA", Category::Shopping),
    ("HOMECENTER", Category::Shopping),
    ("MERCADO LIBRE", Category::Shopping),
    ("MERCADOLIBRE", Category::Shopping),
    ("AMAZON", Category::Shopping),
    ("ALKOSTO", Category::Shopping),
    ("KTRONIX", Category::Shopping),
    ("ARTURO CALLE", Category::Shopping),
    // Utilities
    ("EPM", Category::Utilities),
    ("CODENSA", Category::Utilities),
    ("VANTI", Category::Utilities),
    ("ACUEDUCTO DE BOGOTA", Category::Utilities),
    ("CLARO", Category::Utilities),
    ("MOVISTAR", Category::Utilities),
    ("TIGO", Category::Utilities),
    // Subscriptions
    ("NETFLIX", Category::Subscriptions),
    ("SPOTIFY", Category::Subscriptions),
    ("DISNEY PLUS", Category::Subscriptions),
    ("HBO MAX", Category::Subscriptions),
    ("YOUTUBE PREMIUM", Category::Subscriptions),
    ("APPLE.COM/BILL", Category::Subscriptions),
    // Entertainment
    ("CINE COLOMBIA", Category::Entertainment),
    ("CINEMARK", Category::Entertainment),
    ("PROCINAL", Category::Entertainment),
    ("TUBOLETA", Category::Entertainment),
    // Health
    ("CRUZ VERDE", Category::Health),
    ("FARMATODO", Category::Health),
    ("LOCATEL", Category::Health),
    ("COLSANITAS", Category::Health),
    ("DROGUERIAS ALEMANA", Category::Health),
    // Travel
    ("AVIANCA", Category::Travel),
    ("LATAM AIRLINES", Category::Travel),
    ("WINGO", Category::Travel),
    ("DESPEGAR", Category::Travel),
    ("AIRBNB", Category::Travel),
    ("BOOKING.COM", Category::Travel),
];

/// Checked in order; more specific keywords come before the words they contain.
const BUILTIN_KEYWORDS: &[(&str, Category)] = &[
    ("SUPERMERCADO", Category::Groceries),
    ("MINIMERCADO", Category::Groceries),
    ("FRUVER", Category::Groceries),
    ("CARNICERIA", Category::Groceries),
    ("RESTAURANTE", Category::Restaurants),
    ("PANADERIA", Category::Restaurants),
    ("PIZZERIA", Category::Restaurants),
    ("CAFETERIA", Category::Restaurants),
    ("ASADERO", Category::Restaurants),
    ("ESTACION DE SERVICIO", Category::Fuel),
    ("GASOLINA", Category::Fuel),
    ("COMBUSTIBLE", Category::Fuel),
    ("PEAJE", Category::Transport),
    ("PARQUEADERO", Category::Transport),
    ("TAXI", Category::Transport),
    ("DROGUERIA", Category::Health),
    ("FARMACIA", Category::Health),
    ("CLINICA", Category::Health),
    ("HOSPITAL", Category::Health),
    ("ODONTOLOG", Category::Health),
    ("HOTEL", Category::Travel),
    ("HOSTAL", Category::Travel),
    ("AEROLINEA", Category::Travel),
    ("CINE", Category::Entertainment),
    ("TEATRO", Category::Entertainment),
    ("SERVICIOS PUBLICOS", Category::Utilities),
    ("ENERGIA", Category::Utilities),
    ("ACUEDUCTO", Category::Utilities),
    ("SUSCRIPCION", Category::Subscriptions),
    ("NOMINA", Category::Income),
    ("TRANSFERENCIA", Category::Transfers),
    ("TRANSF", Category::Transfers),
    ("ALMACEN", Category::Shopping),
    ("TIENDA", Category::Shopping),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_core_merchants() {
        let dict = MerchantDictionary::builtin();
        assert_eq!(dict.lookup("EXITO"), Some(Category::Groceries));
        assert_eq!(dict.lookup("MAS POR MENOS"), Some(Category::Groceries));
        assert_eq!(dict.lookup("UNKNOWN SHOP"), None);
        assert!(dict.merchant_count() > 50);
    }

    #[test]
    fn builtin_is_shared() {
        assert!(std::ptr::eq(MerchantDictionary::builtin(), MerchantDictionary::builtin()));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let dict = MerchantDictionary::new()
            .with_merchant("zeta", Category::Shopping)
            .with_merchant("alfa", Category::Groceries)
            .with_merchant("Zeta S.A.", Category::Health);
        assert_eq!(dict.merchant_names(), &["ZETA".to_string(), "ALFA".to_string()]);
        assert_eq!(dict.lookup("ZETA"), Some(Category::Health));
    }

    #[test]
    fn keyword_only_dictionary_is_not_empty() {
        let dict = MerchantDictionary::new().with_keyword("peaje", Category::Transport);
        assert_eq!(dict.merchant_count(), 0);
        assert!(!dict.is_empty());
        assert!(MerchantDictionary::new().is_empty());
    }

    #[test]
    fn keywords_keep_declaration_order() {
        let dict = MerchantDictionary::new()
            .with_keyword("supermercado", Category::Groceries)
            .with_keyword("mercado", Category::Shopping);
        let kws: Vec<&str> = dict.keywords().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(kws, vec!["SUPERMERCADO", "MERCADO"]);
    }

    #[test]
    fn from_toml_loads_entries_in_order() {
        let toml = r#"
            [[merchants]]
            name = "Exito"
            category = "groceries"

            [[merchants]]
            name = "Uber"
            category = "transport"

            [[keywords]]
            keyword = "restaurante"
            category = "restaurants"
        "#;
        let dict = MerchantDictionary::from_toml(toml).unwrap();
        assert_eq!(dict.merchant_names(), &["EXITO".to_string(), "UBER".to_string()]);
        assert_eq!(dict.keywords()[0], ("RESTAURANTE".to_string(), Category::Restaurants));
    }

    #[test]
    fn from_toml_rejects_unknown_category() {
        let toml = r#"
            [[merchants]]
            name = "Exito"
            category = "gadgets"
        "#;
        assert!(matches!(
            MerchantDictionary::from_toml(toml),
            Err(DictionaryError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn from_toml_rejects_malformed_input() {
        assert!(matches!(
            MerchantDictionary::from_toml("merchants = 3"),
            Err(DictionaryError::Toml(_))
        ));
    }
}
