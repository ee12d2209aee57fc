//! Ingredient presence/absence checks against recipe ingredient lists.

use serde::Serialize;

use crate::models::{Ingredient, RecipeFull, normalize_name};

/// Drop every recipe that calls for one of `unwanted` (case-insensitive).
#[must_use]
pub fn exclude_unwanted(recipes: Vec<RecipeFull>, unwanted: &[String]) -> Vec<RecipeFull> {
    let unwanted: Vec<String> = unwanted
        .iter()
        .map(|n| normalize_name(n))
        .filter(|n| !n.is_empty())
        .collect();
    if unwanted.is_empty() {
        return recipes;
    }
    recipes
        .into_iter()
        .filter(|recipe| {
            recipe
                .ingredients
                .iter()
                .all(|pair| !unwanted.contains(&normalize_name(&pair.name)))
        })
        .collect()
}

/// Names of the ingredients at `indices` within `ingredients`. Indices past
/// the end are ignored.
#[must_use]
pub fn select_by_index(ingredients: &[Ingredient], indices: &[usize]) -> Vec<String> {
    ingredients
        .iter()
        .enumerate()
        .filter(|(i, _)| indices.contains(i))
        .map(|(_, ing)| ing.name.clone())
        .collect()
}

/// Recipe ingredients not covered by anything in the pantry.
#[must_use]
pub fn missing_ingredients(recipe: &RecipeFull, pantry: &[Ingredient]) -> Vec<String> {
    recipe
        .ingredients
        .iter()
        .filter(|pair| !pantry.iter().any(|ing| ing.matches_name(&pair.name)))
        .map(|pair| pair.name.clone())
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeCoverage {
    pub recipe: RecipeFull,
    pub missing: Vec<String>,
}

/// Recipes ordered by how few ingredients are missing from the pantry. Ties
/// keep their input order.
#[must_use]
pub fn rank_by_coverage(recipes: Vec<RecipeFull>, pantry: &[Ingredient]) -> Vec<RecipeCoverage> {
    let mut ranked: Vec<RecipeCoverage> = recipes
        .into_iter()
        .map(|recipe| {
            let missing = missing_ingredients(&recipe, pantry);
            RecipeCoverage { recipe, missing }
        })
        .collect();
    ranked.sort_by_key(|c| c.missing.len());
    ranked
}
