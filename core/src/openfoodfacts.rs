use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::models::{Ingredient, parse_user_date};

/// Shelf life assumed when the product has no usable expiration date.
pub const DEFAULT_SHELF_LIFE_DAYS: i64 = 7;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    pub code: String,
    #[serde(default = "default_status")]
    pub status: i32,
    pub product: Option<ProductData>,
}

fn default_status() -> i32 {
    1
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductData {
    #[serde(default)]
    pub categories_tags: Vec<String>,
    pub expiration_date: Option<String>,
    pub quantity: Option<String>,
}

/// Normalize a barcode lookup into an ingredient added on `today`.
///
/// Returns `Ok(None)` when the service reports the product as unknown. The
/// barcode itself must be numeric since it becomes the ingredient id.
pub fn product_to_ingredient(resp: ProductResponse, today: NaiveDate) -> Result<Option<Ingredient>> {
    if resp.status != 1 {
        return Ok(None);
    }
    let Some(product) = resp.product else {
        return Ok(None);
    };

    let id: i64 = resp
        .code
        .trim()
        .parse()
        .with_context(|| format!("Barcode '{}' is not numeric", resp.code))?;

    let possible_names = normalize_categories(&product.categories_tags);
    let name = possible_names.first().cloned().unwrap_or_default();

    Ok(Some(Ingredient {
        id,
        name,
        add_date: today,
        expiration_date: expiration_or_default(product.expiration_date.as_deref(), today),
        quantity: first_quantity(product.quantity.as_deref()),
        possible_names,
        last_notified: None,
    }))
}

fn expiration_or_default(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    let fallback = today + Duration::days(DEFAULT_SHELF_LIFE_DAYS);
    match raw.map(str::trim) {
        None | Some("") => fallback,
        Some(s) => parse_user_date(s).unwrap_or_else(|e| {
            warn!(expiration_date = s, error = %e, "unparseable expiration date, using default");
            fallback
        }),
    }
}

/// First run of digits in the product quantity ("150 ml" -> "150").
fn first_quantity(raw: Option<&str>) -> String {
    match raw {
        None | Some("") => "1".to_string(),
        Some(s) => FIRST_NUMBER
            .find(s)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    }
}

/// Turn category tags like `en:soy-sauces` into readable singular names.
#[must_use]
pub fn normalize_categories(tags: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let name = singularize(&strip_language_prefix(tag).replace('-', " "));
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn strip_language_prefix(tag: &str) -> &str {
    if tag.contains(':') {
        tag.get(3..).unwrap_or_default()
    } else {
        tag
    }
}

#[must_use]
pub fn singularize(word: &str) -> String {
    let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| word.ends_with(s));

    if let Some(stem) = word.strip_suffix("ies") {
        format!("{stem}y")
    } else if ends_with_any(&["xes", "sses", "ches", "shes"]) {
        word[..word.len() - 2].to_string()
    } else if let Some(stem) = word.strip_suffix("ves") {
        format!("{stem}f")
    } else if word.ends_with('s') && !ends_with_any(&["ss", "us", "is"]) {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn soy_sauce() -> ProductResponse {
        ProductResponse {
            code: "8715035110106".to_string(),
            status: 1,
            product: Some(ProductData {
                categories_tags: vec![
                    "en:condiments".to_string(),
                    "en:sauces".to_string(),
                    "en:soy-sauces".to_string(),
                ],
                expiration_date: Some("02/03/2024".to_string()),
                quantity: Some("150 ml".to_string()),
            }),
        }
    }

    #[test]
    fn test_product_to_ingredient_complete() {
        let ing = product_to_ingredient(soy_sauce(), today()).unwrap().unwrap();
        assert_eq!(ing.id, 8_715_035_110_106);
        assert_eq!(ing.add_date, today());
        assert_eq!(
            ing.expiration_date,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
        assert_eq!(ing.possible_names, vec!["condiment", "sauce", "soy sauce"]);
        assert_eq!(ing.name, "condiment");
        assert_eq!(ing.quantity, "150");
        assert!(ing.last_notified.is_none());
    }

    #[test]
    fn test_product_to_ingredient_iso_date() {
        let mut resp = soy_sauce();
        resp.product.as_mut().unwrap().expiration_date = Some("2024-05-10".to_string());
        let ing = product_to_ingredient(resp, today()).unwrap().unwrap();
        assert_eq!(
            ing.expiration_date,
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
        );
    }

    #[test]
    fn test_product_to_ingredient_defaults() {
        let resp = ProductResponse {
            code: "123".to_string(),
            status: 1,
            product: Some(ProductData::default()),
        };
        let ing = product_to_ingredient(resp, today()).unwrap().unwrap();
        assert_eq!(ing.expiration_date, today() + Duration::days(7));
        assert_eq!(ing.quantity, "1");
        assert!(ing.possible_names.is_empty());
        assert_eq!(ing.name, "");
    }

    #[test]
    fn test_unparseable_expiration_falls_back() {
        let mut resp = soy_sauce();
        resp.product.as_mut().unwrap().expiration_date = Some("best before spring".to_string());
        let ing = product_to_ingredient(resp, today()).unwrap().unwrap();
        assert_eq!(ing.expiration_date, today() + Duration::days(7));
    }

    #[test]
    fn test_quantity_without_digits() {
        let mut resp = soy_sauce();
        resp.product.as_mut().unwrap().quantity = Some("a pinch".to_string());
        let ing = product_to_ingredient(resp, today()).unwrap().unwrap();
        assert_eq!(ing.quantity, "");
    }

    #[test]
    fn test_not_found() {
        let mut resp = soy_sauce();
        resp.status = 0;
        assert!(product_to_ingredient(resp, today()).unwrap().is_none());

        let mut resp = soy_sauce();
        resp.product = None;
        assert!(product_to_ingredient(resp, today()).unwrap().is_none());
    }

    #[test]
    fn test_non_numeric_barcode_is_error() {
        let mut resp = soy_sauce();
        resp.code = "abc".to_string();
        assert!(product_to_ingredient(resp, today()).is_err());
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let json = r#"{
            "code": "3017620422003",
            "status": 1,
            "status_verbose": "product found",
            "product": {
                "product_name": "Nutella",
                "categories_tags": ["en:spreads", "fr:pates-a-tartiner"],
                "quantity": "400 g"
            }
        }"#;
        let resp: ProductResponse = serde_json::from_str(json).unwrap();
        let ing = product_to_ingredient(resp, today()).unwrap().unwrap();
        assert_eq!(ing.possible_names, vec!["spread", "pates a tartiner"]);
        assert_eq!(ing.quantity, "400");
    }

    #[test]
    fn test_normalize_categories_dedups_and_skips_empty() {
        let tags = vec![
            "en:sauces".to_string(),
            "en:sauce".to_string(),
            "en:".to_string(),
            "plain".to_string(),
        ];
        assert_eq!(normalize_categories(&tags), vec!["sauce", "plain"]);
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("berries"), "berry");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("sauces"), "sauce");
        assert_eq!(singularize("cheeses"), "cheese");
        assert_eq!(singularize("glasses"), "glass");
        assert_eq!(singularize("peaches"), "peach");
        assert_eq!(singularize("radishes"), "radish");
        assert_eq!(singularize("loaves"), "loaf");
        assert_eq!(singularize("beans"), "bean");
        assert_eq!(singularize("grass"), "grass");
        assert_eq!(singularize("couscous"), "couscous");
        assert_eq!(singularize("anis"), "anis");
        assert_eq!(singularize("rice"), "rice");
    }
}
