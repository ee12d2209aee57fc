use anyhow::Result;
use serde::Serialize;
use std::process;

use crate::themealdb::MealDbClient;
use pantry_core::models::RecipeFull;
use pantry_core::service::PantryService;

use super::helpers::{
    print_coverage_table, print_recipe_full_table, print_recipe_table, report_not_found,
};

pub(crate) async fn cmd_recipe_search(
    mealdb: &MealDbClient,
    ingredient: &str,
    json: bool,
) -> Result<()> {
    let recipes = mealdb.search_by_ingredient_async(ingredient).await?;

    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes use '{ingredient}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
    } else {
        print_recipe_table(&recipes);
        eprintln!("Show one with: pantry recipe show <id>");
    }
    Ok(())
}

/// Find recipes by name, dropping those that use any of the pantry
/// ingredients at the `exclude` positions of `pantry list`.
pub(crate) fn cmd_recipe_find(
    svc: &PantryService,
    mealdb: &MealDbClient,
    name: &str,
    exclude: &[usize],
    json: bool,
) -> Result<()> {
    // The service talks to the blocking provider interface.
    let recipes = tokio::task::block_in_place(|| svc.filter(mealdb, name, exclude))?;

    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes found for '{name}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
    } else {
        print_recipe_full_table(&recipes);
    }
    Ok(())
}

pub(crate) async fn cmd_recipe_show(
    svc: &PantryService,
    mealdb: &MealDbClient,
    id: i64,
    json: bool,
) -> Result<()> {
    #[derive(Serialize)]
    struct RecipeDetail<'a> {
        #[serde(flatten)]
        recipe: &'a RecipeFull,
        favourite: bool,
        missing: Vec<String>,
    }

    let saved = svc.recipe_get(id)?;
    let favourite = saved.is_some();
    let recipe = match saved {
        Some(r) => r,
        None => {
            let Some(r) = mealdb.lookup_async(id).await? else {
                report_not_found(&format!("No recipe with id {id}"), json);
                process::exit(2);
            };
            r
        }
    };
    let missing = svc.missing_for(&recipe)?;

    if json {
        let detail = RecipeDetail {
            recipe: &recipe,
            favourite,
            missing,
        };
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let star = if favourite { " *" } else { "" };
    println!("=== {}{star} ===", recipe.name);
    if !recipe.thumbnail.is_empty() {
        println!("  {}", recipe.thumbnail);
    }

    println!("\n  INGREDIENTS:");
    for line in recipe.formatted_ingredients().lines() {
        println!("    {line}");
    }

    if missing.is_empty() {
        println!("\n  You have everything.");
    } else {
        println!("\n  MISSING: {}", missing.join(", "));
    }

    if let Some(instructions) = &recipe.instructions {
        println!("\n  INSTRUCTIONS:");
        for para in instructions.lines().filter(|l| !l.trim().is_empty()) {
            println!("    {}", para.trim());
        }
    }
    if let Some(source) = &recipe.source {
        println!("\n  Source: {source}");
    }
    Ok(())
}

pub(crate) async fn cmd_recipe_save(
    svc: &PantryService,
    mealdb: &MealDbClient,
    id: i64,
    json: bool,
) -> Result<()> {
    if let Some(saved) = svc.recipe_get(id)? {
        if json {
            println!("{}", serde_json::to_string_pretty(&saved)?);
        } else {
            println!("{} is already a favourite", saved.name);
        }
        return Ok(());
    }

    let Some(recipe) = mealdb.lookup_async(id).await? else {
        report_not_found(&format!("No recipe with id {id}"), json);
        process::exit(2);
    };
    svc.recipe_add(&recipe)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        println!("Saved {} (id: {})", recipe.name, recipe.id);
    }
    Ok(())
}

pub(crate) fn cmd_recipe_unsave(svc: &PantryService, id: i64, json: bool) -> Result<()> {
    if svc.recipe_remove(id)? {
        if json {
            println!("{}", serde_json::json!({ "removed": id }));
        } else {
            println!("Removed recipe {id} from favourites");
        }
        Ok(())
    } else {
        report_not_found(&format!("Recipe {id} is not a favourite"), json);
        process::exit(2);
    }
}

pub(crate) fn cmd_recipe_favourites(svc: &PantryService, json: bool) -> Result<()> {
    let recipes = svc.recipe_get_all()?;
    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No favourites yet. Use `pantry recipe save <id>`.");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
    } else {
        print_recipe_full_table(&recipes);
    }
    Ok(())
}

pub(crate) fn cmd_recipe_suggest(svc: &PantryService, json: bool) -> Result<()> {
    let ranked = svc.suggest()?;
    if ranked.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No favourites to suggest from. Use `pantry recipe save <id>`.");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        print_coverage_table(&ranked);
    }
    Ok(())
}
