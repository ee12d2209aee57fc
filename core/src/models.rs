use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Storage and wire format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format dates are shown to (and typed by) users.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Barcode for scanned products, negative for locally created ones.
    pub id: i64,
    pub name: String,
    pub add_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub quantity: String,
    pub possible_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notified: Option<NaiveDate>,
}

impl Ingredient {
    #[must_use]
    pub fn new(
        id: i64,
        name: &str,
        add_date: NaiveDate,
        expiration_date: NaiveDate,
        quantity: &str,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            add_date,
            expiration_date,
            quantity: quantity.to_string(),
            possible_names: vec![name.to_string()],
            last_notified: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    #[must_use]
    pub fn with_last_notified(mut self, date: NaiveDate) -> Self {
        self.last_notified = Some(date);
        self
    }

    /// Append an alternate name. Blank and already-known names are ignored.
    pub fn add_possible_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.possible_names.iter().any(|n| n == name) {
            return false;
        }
        self.possible_names.push(name.to_string());
        true
    }

    /// Case-insensitive match against the name and every alternate name.
    #[must_use]
    pub fn matches_name(&self, candidate: &str) -> bool {
        let candidate = normalize_name(candidate);
        if candidate.is_empty() {
            return false;
        }
        normalize_name(&self.name) == candidate
            || self
                .possible_names
                .iter()
                .any(|n| normalize_name(n) == candidate)
    }
}

/// Input for a locally created ingredient; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub name: String,
    pub possible_names: Vec<String>,
    pub add_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub quantity: String,
}

impl NewIngredient {
    #[must_use]
    pub fn into_ingredient(self, id: i64) -> Ingredient {
        let mut ingredient = Ingredient::new(
            id,
            &self.name,
            self.add_date,
            self.expiration_date,
            &self.quantity,
        );
        for alias in &self.possible_names {
            ingredient.add_possible_name(alias);
        }
        ingredient
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientPair {
    pub name: String,
    pub measure: String,
}

impl IngredientPair {
    #[must_use]
    pub fn new(name: &str, measure: &str) -> Self {
        Self {
            name: name.to_string(),
            measure: measure.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFull {
    pub id: i64,
    pub name: String,
    pub thumbnail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub ingredients: Vec<IngredientPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RecipeFull {
    #[must_use]
    pub fn summary(&self) -> Recipe {
        Recipe {
            id: self.id,
            name: self.name.clone(),
            thumbnail: self.thumbnail.clone(),
        }
    }

    /// One "name: measure" line per ingredient.
    #[must_use]
    pub fn formatted_ingredients(&self) -> String {
        self.ingredients
            .iter()
            .map(|p| {
                if p.measure.is_empty() {
                    p.name.clone()
                } else {
                    format!("{}: {}", p.name, p.measure)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Parse `YYYY-MM-DD` or `DD/MM/YYYY`, picking the format by the separator.
pub fn parse_user_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let format = if s.contains('-') {
        DATE_FORMAT
    } else {
        DISPLAY_DATE_FORMAT
    };
    NaiveDate::parse_from_str(s, format)
        .with_context(|| format!("Invalid date '{s}'. Use YYYY-MM-DD or DD/MM/YYYY"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn milk() -> Ingredient {
        Ingredient::new(
            8_715_035_110_106,
            "Milk",
            date(2024, 3, 1),
            date(2024, 3, 8),
            "1",
        )
    }

    #[test]
    fn test_new_defaults_possible_names_to_name() {
        let ing = milk();
        assert_eq!(ing.possible_names, vec!["Milk".to_string()]);
        assert!(ing.last_notified.is_none());
    }

    #[test]
    fn test_add_possible_name() {
        let mut ing = milk();
        assert!(ing.add_possible_name("  semi-skimmed milk "));
        assert_eq!(ing.possible_names, vec!["Milk", "semi-skimmed milk"]);

        // Blank and duplicate names are ignored
        assert!(!ing.add_possible_name("   "));
        assert!(!ing.add_possible_name("Milk"));
        assert_eq!(ing.possible_names.len(), 2);
    }

    #[test]
    fn test_matches_name() {
        let mut ing = milk();
        ing.add_possible_name("dairy");
        assert!(ing.matches_name("milk"));
        assert!(ing.matches_name(" DAIRY "));
        assert!(!ing.matches_name("cheese"));
        assert!(!ing.matches_name(""));
    }

    #[test]
    fn test_new_ingredient_into_ingredient() {
        let new = NewIngredient {
            name: "Eggs".to_string(),
            possible_names: vec!["egg".to_string(), "Eggs".to_string(), String::new()],
            add_date: date(2024, 3, 1),
            expiration_date: date(2024, 3, 20),
            quantity: "6".to_string(),
        };
        let ing = new.into_ingredient(-1);
        assert_eq!(ing.id, -1);
        assert_eq!(ing.possible_names, vec!["Eggs", "egg"]);
    }

    #[test]
    fn test_formatted_ingredients() {
        let recipe = RecipeFull {
            id: 1,
            name: "Toast".to_string(),
            thumbnail: String::new(),
            instructions: None,
            ingredients: vec![
                IngredientPair::new("Bread", "2 slices"),
                IngredientPair::new("Salt", ""),
            ],
            source: None,
        };
        assert_eq!(recipe.formatted_ingredients(), "Bread: 2 slices\nSalt");
        assert_eq!(recipe.summary().name, "Toast");
    }

    #[test]
    fn test_parse_user_date() {
        assert_eq!(parse_user_date("2024-03-02").unwrap(), date(2024, 3, 2));
        assert_eq!(parse_user_date("02/03/2024").unwrap(), date(2024, 3, 2));
        assert!(parse_user_date("March 2nd").is_err());
        assert!(parse_user_date("2024-13-01").is_err());
    }

    #[test]
    fn test_ingredient_json_omits_unset_last_notified() {
        let json = serde_json::to_value(milk()).unwrap();
        assert_eq!(json["expiration_date"], "2024-03-08");
        assert!(json.get("last_notified").is_none());
    }
}
