use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level grouping used by spending reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    FoodAndDrink,
    Transportation,
    Shopping,
    Housing,
    Lifestyle,
    Health,
    Financial,
    Other,
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryGroup::FoodAndDrink => write!(f, "Food & Drink"),
            CategoryGroup::Transportation => write!(f, "Transportation"),
            CategoryGroup::Shopping => write!(f, "Shopping"),
            CategoryGroup::Housing => write!(f, "Housing & Utilities"),
            CategoryGroup::Lifestyle => write!(f, "Lifestyle"),
            CategoryGroup::Health => write!(f, "Health"),
            CategoryGroup::Financial => write!(f, "Financial"),
            CategoryGroup::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Groceries,
    Restaurants,
    Transport,
    Fuel,
    Shopping,
    Utilities,
    Entertainment,
    Subscriptions,
    Health,
    Travel,
    Transfers,
    Income,
    Uncategorized,
}

/// (category, snake_case name, display name, group, excluded from spending)
static CATEGORY_TABLE: [(Category, &str, &str, CategoryGroup, bool); 13] = [
    (Category::Groceries, "groceries", "Groceries", CategoryGroup::FoodAndDrink, false),
    (Category::Restaurants, "restaurants", "Restaurants", CategoryGroup::FoodAndDrink, false),
    (Category::Transport, "transport", "Transport", CategoryGroup::Transportation, false),
    (Category::Fuel, "fuel", "Fuel", CategoryGroup::Transportation, false),
    (Category::Shopping, "shopping", "Shopping", CategoryGroup::Shopping, false),
    (Category::Utilities, "utilities", "Utilities", CategoryGroup::Housing, false),
    (Category::Entertainment, "entertainment", "Entertainment", CategoryGroup::Lifestyle, false),
    (Category::Subscriptions, "subscriptions", "Subscriptions", CategoryGroup::Lifestyle, false),
    (Category::Health, "health", "Health", CategoryGroup::Health, false),
    (Category::Travel, "travel", "Travel", CategoryGroup::Lifestyle, false),
    (Category::Transfers, "transfers", "Transfers", CategoryGroup::Financial, true),
    (Category::Income, "income", "Income", CategoryGroup::Financial, true),
    (Category::Uncategorized, "uncategorized", "Uncategorized", CategoryGroup::Other, false),
];

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Groceries,
        Category::Restaurants,
        Category::Transport,
        Category::Fuel,
        Category::Shopping,
        Category::Utilities,
        Category::Entertainment,
        Category::Subscriptions,
        Category::Health,
        Category::Travel,
        Category::Transfers,
        Category::Income,
        Category::Uncategorized,
    ];

    fn entry(self) -> &'static (Category, &'static str, &'static str, CategoryGroup, bool) {
        let row = match self {
            Category::Groceries => 0,
            Category::Restaurants => 1,
            Category::Transport => 2,
            Category::Fuel => 3,
            Category::Shopping => 4,
            Category::Utilities => 5,
            Category::Entertainment => 6,
            Category::Subscriptions => 7,
            Category::Health => 8,
            Category::Travel => 9,
            Category::Transfers => 10,
            Category::Income => 11,
            Category::Uncategorized => 12,
        };
        &CATEGORY_TABLE[row]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn display_name(self) -> &'static str {
        self.entry().2
    }

    pub fn group(self) -> CategoryGroup {
        self.entry().3
    }

    /// Transfers between own accounts and income are not spending.
    pub fn exclude_from_spending(self) -> bool {
        self.entry().4
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CATEGORY_TABLE
            .iter()
            .find(|e| e.1 == wanted)
            .map(|e| e.0)
            .ok_or_else(|| format!("Unknown category: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn every_category_has_a_table_entry() {
        for (row, c) in Category::ALL.into_iter().enumerate() {
            assert_eq!(c.entry().0, c);
            assert_eq!(CATEGORY_TABLE[row].0, c);
        }
        assert_eq!(Category::Uncategorized.name(), "uncategorized");
    }

    #[test]
    fn name_roundtrip() {
        for c in Category::ALL {
            assert_eq!(Category::from_str(&c.to_string()).unwrap(), c);
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!(Category::from_str("GROCERIES").unwrap(), Category::Groceries);
        assert!(Category::from_str("gadgets").is_err());
    }

    #[test]
    fn groups_and_spending_flags() {
        assert_eq!(Category::Groceries.group(), CategoryGroup::FoodAndDrink);
        assert_eq!(Category::Fuel.group(), CategoryGroup::Transportation);
        assert!(Category::Transfers.exclude_from_spending());
        assert!(!Category::Restaurants.exclude_from_spending());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Category::Groceries).unwrap();
        assert_eq!(json, "\"groceries\"");
    }
}
