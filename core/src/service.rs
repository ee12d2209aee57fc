use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::db::Database;
use crate::expiry::{ExpiryNotice, should_notify};
use crate::filter::{self, RecipeCoverage};
use crate::models::{Ingredient, NewIngredient, Recipe, RecipeFull};

/// Barcode lookup against a product database.
///
/// The CLI implements this with reqwest; a mobile host can bring its own
/// HTTP stack. Called synchronously from Rust, so mobile callers should invoke
/// `PantryService` methods from a background thread.
pub trait ProductLookupProvider: Send + Sync {
    fn lookup_barcode(&self, code: &str) -> Result<Option<Ingredient>>;
}

/// Recipe search and detail lookup.
pub trait RecipeProvider: Send + Sync {
    fn search_by_ingredient(&self, ingredient: &str) -> Result<Vec<Recipe>>;
    fn find_by_name(&self, name: &str) -> Result<Vec<RecipeFull>>;
    fn lookup(&self, id: i64) -> Result<Option<RecipeFull>>;
}

/// Platform alarm/notification facility that fires an [`ExpiryNotice`] at
/// its `fire_at` time.
pub trait NotificationScheduler {
    fn schedule(&self, notice: &ExpiryNotice) -> Result<()>;
}

pub struct PantryService {
    db: Database,
}

impl PantryService {
    pub fn new(db_path: &str) -> Result<Self> {
        let db = Database::open(Path::new(db_path))?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    #[must_use]
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    // --- Remote lookups ---

    pub fn barcode(
        &self,
        provider: &dyn ProductLookupProvider,
        code: &str,
    ) -> Result<Option<Ingredient>> {
        provider.lookup_barcode(code.trim())
    }

    pub fn search(&self, provider: &dyn RecipeProvider, ingredient: &str) -> Result<Vec<Recipe>> {
        provider.search_by_ingredient(ingredient)
    }

    pub fn find(&self, provider: &dyn RecipeProvider, name: &str) -> Result<Vec<RecipeFull>> {
        provider.find_by_name(name)
    }

    /// Fetch the details of a search result.
    pub fn inflate(
        &self,
        provider: &dyn RecipeProvider,
        recipe: &Recipe,
    ) -> Result<Option<RecipeFull>> {
        provider.lookup(recipe.id)
    }

    /// Recipes named like `name` that use none of the pantry ingredients at
    /// `unwanted` (positions in [`Self::ingredient_get_all`]).
    pub fn filter(
        &self,
        provider: &dyn RecipeProvider,
        name: &str,
        unwanted: &[usize],
    ) -> Result<Vec<RecipeFull>> {
        let unwanted_names = filter::select_by_index(&self.db.list_ingredients()?, unwanted);
        let found = provider.find_by_name(name)?;
        debug!(found = found.len(), unwanted = ?unwanted_names, "filtering recipes");
        Ok(filter::exclude_unwanted(found, &unwanted_names))
    }

    // --- Saved recipes ---

    pub fn recipe_get_all(&self) -> Result<Vec<RecipeFull>> {
        self.db.list_recipes()
    }

    pub fn recipe_get(&self, id: i64) -> Result<Option<RecipeFull>> {
        self.db.get_recipe(id)
    }

    pub fn recipe_add(&self, recipe: &RecipeFull) -> Result<bool> {
        self.db.insert_recipe(recipe)
    }

    pub fn recipe_remove(&self, id: i64) -> Result<bool> {
        self.db.delete_recipe(id)
    }

    pub fn is_favourite(&self, id: i64) -> Result<bool> {
        Ok(self.db.get_recipe(id)?.is_some())
    }

    /// Save the recipe if it isn't saved, remove it otherwise. Returns the
    /// new state.
    pub fn toggle_favourite(&self, recipe: &RecipeFull) -> Result<bool> {
        if self.db.delete_recipe(recipe.id)? {
            Ok(false)
        } else {
            self.db.insert_recipe(recipe)?;
            Ok(true)
        }
    }

    // --- Ingredients ---

    pub fn ingredient_get_all(&self) -> Result<Vec<Ingredient>> {
        self.db.list_ingredients()
    }

    pub fn ingredient_get(&self, id: i64) -> Result<Option<Ingredient>> {
        self.db.get_ingredient(id)
    }

    pub fn ingredient_add(&self, ingredient: &Ingredient) -> Result<bool> {
        self.db.insert_ingredient(ingredient)
    }

    pub fn ingredient_remove(&self, id: i64) -> Result<bool> {
        self.db.delete_ingredient(id)
    }

    /// Replace `old` with `new` (remove then insert).
    pub fn ingredient_replace(&self, old: &Ingredient, new: &Ingredient) -> Result<()> {
        self.db.replace_ingredient(old.id, new)
    }

    /// Store a manually entered ingredient under a fresh local id.
    pub fn ingredient_create(&self, new: NewIngredient) -> Result<Ingredient> {
        let ingredient = new.into_ingredient(self.db.next_local_ingredient_id()?);
        self.db.insert_ingredient(&ingredient)?;
        Ok(ingredient)
    }

    /// Empty the pantry. Saved recipes are kept.
    pub fn ingredient_clear(&self) -> Result<usize> {
        self.db.clear_ingredients()
    }

    /// Drop every saved recipe. The pantry is kept.
    pub fn recipe_clear(&self) -> Result<usize> {
        self.db.clear_recipes()
    }

    // --- Pantry-aware recipe queries ---

    pub fn missing_for(&self, recipe: &RecipeFull) -> Result<Vec<String>> {
        Ok(filter::missing_ingredients(recipe, &self.db.list_ingredients()?))
    }

    /// Saved recipes, best pantry coverage first.
    pub fn suggest(&self) -> Result<Vec<RecipeCoverage>> {
        let pantry = self.db.list_ingredients()?;
        Ok(filter::rank_by_coverage(self.db.list_recipes()?, &pantry))
    }

    // --- Notifications ---

    /// Hand every ingredient that needs a warning today to `scheduler` and
    /// record it as notified. Ingredients the scheduler rejects are left
    /// untouched so the next pass retries them.
    pub fn schedule_expiry_notifications(
        &self,
        scheduler: &dyn NotificationScheduler,
        today: NaiveDate,
    ) -> Result<Vec<ExpiryNotice>> {
        let mut scheduled = Vec::new();
        for ingredient in self.db.list_ingredients()? {
            if !should_notify(&ingredient, today) {
                continue;
            }
            let notice = ExpiryNotice::for_ingredient(&ingredient);
            if let Err(e) = scheduler.schedule(&notice) {
                warn!(id = ingredient.id, error = %e, "failed to schedule expiry notice");
                continue;
            }
            let notified = ingredient.clone().with_last_notified(today);
            self.db.replace_ingredient(ingredient.id, &notified)?;
            scheduled.push(notice);
        }
        debug!(count = scheduled.len(), "scheduled expiry notices");
        Ok(scheduled)
    }
}
