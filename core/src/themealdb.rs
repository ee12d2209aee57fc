use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::{IngredientPair, Recipe, RecipeFull};

const INGREDIENT_PREFIX: &str = "strIngredient";
const MEASURE_PREFIX: &str = "strMeasure";

/// Envelope of every endpoint. An empty result comes back as `"meals": null`.
#[derive(Debug, Deserialize)]
pub struct MealList<T> {
    pub meals: Option<Vec<T>>,
}

impl<T> MealList<T> {
    #[must_use]
    pub fn into_meals(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }
}

/// Row of `filter.php`, which only carries id, name and thumbnail.
#[derive(Debug, Deserialize)]
pub struct MealSummary {
    #[serde(rename = "idMeal")]
    pub id: Value,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
}

/// Full meal objects have numbered ingredient/measure keys, so they are kept
/// as a raw JSON object and picked apart by [`meal_to_recipe_full`].
pub type MealObject = Map<String, Value>;

pub fn summary_to_recipe(meal: MealSummary) -> Result<Recipe> {
    Ok(Recipe {
        id: parse_meal_id(&meal.id)?,
        name: meal.name,
        thumbnail: meal.thumbnail.unwrap_or_default(),
    })
}

pub fn meal_to_recipe_full(meal: &MealObject) -> Result<RecipeFull> {
    let id = parse_meal_id(meal.get("idMeal").context("Missing 'idMeal'")?)?;
    let name = text_field(meal, "strMeal").context("Missing 'strMeal'")?;

    Ok(RecipeFull {
        id,
        name,
        thumbnail: text_field(meal, "strMealThumb").unwrap_or_default(),
        instructions: text_field(meal, "strInstructions"),
        ingredients: ingredient_pairs(meal),
        source: text_field(meal, "strSource"),
    })
}

/// Match `strIngredientN` with `strMeasureN`, skipping blank ingredients and
/// ordering by `N`.
#[must_use]
pub fn ingredient_pairs(meal: &MealObject) -> Vec<IngredientPair> {
    let mut numbered: Vec<(u32, IngredientPair)> = meal
        .keys()
        .filter_map(|key| {
            let index: u32 = key.strip_prefix(INGREDIENT_PREFIX)?.parse().ok()?;
            let name = text_field(meal, key)?;
            let measure = text_field(meal, &format!("{MEASURE_PREFIX}{index}")).unwrap_or_default();
            Some((index, IngredientPair { name, measure }))
        })
        .collect();
    numbered.sort_by_key(|(index, _)| *index);
    numbered.into_iter().map(|(_, pair)| pair).collect()
}

/// Trimmed, non-empty text of a field. The API uses null, "" and sometimes
/// the literal string "null" for absent values.
fn text_field(meal: &MealObject, key: &str) -> Option<String> {
    let text = match meal.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() || text == "null" {
        None
    } else {
        Some(text)
    }
}

fn parse_meal_id(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64().context("Meal id out of range"),
        Value::String(s) => s
            .trim()
            .parse()
            .with_context(|| format!("Meal id '{s}' is not numeric")),
        other => bail!("Unexpected meal id: {other}"),
    }
}
