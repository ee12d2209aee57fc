mod commands;
mod config;
mod http;
mod openfoodfacts;
mod themealdb;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_add, cmd_clear, cmd_edit, cmd_list, cmd_notify, cmd_recipe_favourites, cmd_recipe_find,
    cmd_recipe_save, cmd_recipe_search, cmd_recipe_show, cmd_recipe_suggest, cmd_recipe_unsave,
    cmd_remove, cmd_scan,
};
use crate::config::Config;
use crate::openfoodfacts::OpenFoodFactsClient;
use crate::themealdb::MealDbClient;
use pantry_core::db::Database;
use pantry_core::service::PantryService;

#[derive(Parser)]
#[command(
    name = "pantry",
    version,
    about = "Track what's in your kitchen, when it expires, and what to cook with it"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a product by barcode and add it to the pantry
    Scan {
        /// Barcode number
        barcode: String,
        /// Name to show instead of the product's first category
        #[arg(long)]
        name: Option<String>,
        /// Expiration date (YYYY-MM-DD, DD/MM/YYYY, today/tomorrow; default: from the product)
        #[arg(long)]
        expires: Option<String>,
        /// Quantity (1-12)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=12))]
        quantity: Option<u8>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an ingredient by hand
    Add {
        /// Ingredient name
        name: String,
        /// Expiration date (YYYY-MM-DD, DD/MM/YYYY, today/tomorrow)
        #[arg(long)]
        expires: String,
        /// Quantity (1-12)
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=12))]
        quantity: u8,
        /// Other names this ingredient goes by in recipes (repeatable)
        #[arg(long = "alias")]
        aliases: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the pantry, soonest to expire first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change an ingredient
    Edit {
        /// Ingredient ID
        id: i64,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// Add another name this ingredient goes by (repeatable)
        #[arg(long = "alias")]
        aliases: Vec<String>,
        /// New expiration date (YYYY-MM-DD, DD/MM/YYYY, today/tomorrow)
        #[arg(long)]
        expires: Option<String>,
        /// New quantity (1-12)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=12))]
        quantity: Option<u8>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an ingredient
    Remove {
        /// Ingredient ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Empty the pantry
    Clear {
        /// Also drop every favourite recipe
        #[arg(long)]
        favourites: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search `TheMealDB` and manage favourite recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Warn about ingredients that are about to expire
    Notify {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Find recipes that use an ingredient
    Search {
        /// Ingredient name (e.g. "chicken_breast")
        ingredient: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find recipes by name
    Find {
        /// Recipe name or part of it
        name: String,
        /// Skip recipes using the pantry ingredient at this `#` of `pantry list` (repeatable)
        #[arg(long)]
        exclude: Vec<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe and what you are missing for it
    Show {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a recipe to favourites
    Save {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a recipe from favourites
    Unsave {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List favourite recipes
    Favourites {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Favourites ranked by how much of them the pantry covers
    Suggest {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = PantryService::from_database(Database::open(&config.db_path)?);
    let off = OpenFoodFactsClient::new(&config.off_base_url)?;
    let mealdb = MealDbClient::new(&config.mealdb_base_url)?;

    match cli.command {
        Commands::Scan {
            barcode,
            name,
            expires,
            quantity,
            json,
        } => {
            cmd_scan(
                &svc,
                &off,
                &barcode,
                name.as_deref(),
                expires.as_deref(),
                quantity,
                json,
            )
            .await
        }
        Commands::Add {
            name,
            expires,
            quantity,
            aliases,
            json,
        } => cmd_add(&svc, &name, &expires, quantity, &aliases, json),
        Commands::List { json } => cmd_list(&svc, json),
        Commands::Edit {
            id,
            name,
            aliases,
            expires,
            quantity,
            json,
        } => cmd_edit(
            &svc,
            id,
            name.as_deref(),
            &aliases,
            expires.as_deref(),
            quantity,
            json,
        ),
        Commands::Remove { id, json } => cmd_remove(&svc, id, json),
        Commands::Clear { favourites, json } => cmd_clear(&svc, favourites, json),
        Commands::Recipe { command } => match command {
            RecipeCommands::Search { ingredient, json } => {
                cmd_recipe_search(&mealdb, &ingredient, json).await
            }
            RecipeCommands::Find {
                name,
                exclude,
                json,
            } => cmd_recipe_find(&svc, &mealdb, &name, &exclude, json),
            RecipeCommands::Show { id, json } => cmd_recipe_show(&svc, &mealdb, id, json).await,
            RecipeCommands::Save { id, json } => cmd_recipe_save(&svc, &mealdb, id, json).await,
            RecipeCommands::Unsave { id, json } => cmd_recipe_unsave(&svc, id, json),
            RecipeCommands::Favourites { json } => cmd_recipe_favourites(&svc, json),
            RecipeCommands::Suggest { json } => cmd_recipe_suggest(&svc, json),
        },
        Commands::Notify { json } => cmd_notify(&svc, json),
    }
}
