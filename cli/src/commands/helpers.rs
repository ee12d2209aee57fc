use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use pantry_core::expiry::{ExpiryStatus, Freshness, FreshnessBand, freshness};
use pantry_core::filter::RecipeCoverage;
use pantry_core::models::{DISPLAY_DATE_FORMAT, Ingredient, Recipe, RecipeFull, parse_user_date};

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a date typed on the command line: `YYYY-MM-DD`, `DD/MM/YYYY`, or
/// one of today/tomorrow/yesterday. `None` means today.
pub(crate) fn parse_date(date_str: Option<&str>) -> Result<NaiveDate> {
    let today = today();
    match date_str.map(str::trim) {
        None | Some("today") => Ok(today),
        Some("yesterday") => Ok(today - chrono::Duration::days(1)),
        Some("tomorrow") => Ok(today + chrono::Duration::days(1)),
        Some(s) => parse_user_date(s).with_context(|| {
            format!("Invalid date '{s}'. Use YYYY-MM-DD, DD/MM/YYYY or today/tomorrow")
        }),
    }
}

pub(crate) fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Ingredient plus the derived expiry state, for `--json` output.
#[derive(Serialize)]
pub(crate) struct IngredientView<'a> {
    #[serde(flatten)]
    pub ingredient: &'a Ingredient,
    pub expiry: ExpiryStatus,
    pub freshness: Freshness,
}

impl<'a> IngredientView<'a> {
    pub(crate) fn new(ingredient: &'a Ingredient, today: NaiveDate) -> Self {
        Self {
            ingredient,
            expiry: ExpiryStatus::of(ingredient, today),
            freshness: freshness(ingredient, today),
        }
    }
}

fn freshness_bar(f: Freshness) -> String {
    const WIDTH: usize = 10;
    let filled = usize::from(f.progress).div_ceil(WIDTH).min(WIDTH);
    let marker = match f.band {
        FreshnessBand::Green => '=',
        FreshnessBand::Yellow => '~',
        FreshnessBand::Red => '!',
    };
    format!(
        "[{}{}] {:>3}%",
        marker.to_string().repeat(filled),
        " ".repeat(WIDTH - filled),
        f.progress
    )
}

pub(crate) fn print_ingredient_table(ingredients: &[Ingredient], today: NaiveDate) {
    #[derive(Tabled)]
    struct IngredientRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Qty")]
        quantity: String,
        #[tabled(rename = "Added")]
        added: String,
        #[tabled(rename = "Expires")]
        expires: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Freshness")]
        freshness: String,
    }

    let rows: Vec<IngredientRow> = ingredients
        .iter()
        .enumerate()
        .map(|(i, ing)| IngredientRow {
            idx: i,
            id: ing.id,
            name: truncate(&ing.name, 30),
            quantity: ing.quantity.clone(),
            added: display_date(ing.add_date),
            expires: display_date(ing.expiration_date),
            status: ExpiryStatus::of(ing, today).label(),
            freshness: freshness_bar(freshness(ing, today)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_recipe_table(recipes: &[Recipe]) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id,
            name: truncate(&r.name, 50),
        })
        .collect();

    println!("{}", Table::new(&rows).with(Style::rounded()));
}

pub(crate) fn print_recipe_full_table(recipes: &[RecipeFull]) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id,
            name: truncate(&r.name, 50),
            ingredients: r.ingredients.len(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_coverage_table(ranked: &[RecipeCoverage]) {
    #[derive(Tabled)]
    struct CoverageRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Have")]
        have: String,
        #[tabled(rename = "Missing")]
        missing: String,
    }

    let rows: Vec<CoverageRow> = ranked
        .iter()
        .map(|c| {
            let total = c.recipe.ingredients.len();
            CoverageRow {
                id: c.recipe.id,
                name: truncate(&c.recipe.name, 40),
                have: format!("{}/{total}", total - c.missing.len()),
                missing: truncate(&c.missing.join(", "), 40),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

/// Report a missing item on stdout (`--json`) or stderr.
pub(crate) fn report_not_found(message: &str, json: bool) {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
