use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{DATE_FORMAT, Ingredient, RecipeFull};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            debug!(from = version, to = 1, "migrating database");
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS ingredients (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    add_date TEXT NOT NULL,
                    expiration_date TEXT NOT NULL,
                    quantity TEXT NOT NULL,
                    possible_names TEXT NOT NULL DEFAULT '[]',
                    last_notified TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_ingredients_name ON ingredients(name);
                CREATE INDEX IF NOT EXISTS idx_ingredients_expiration ON ingredients(expiration_date);

                CREATE TABLE IF NOT EXISTS recipes (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    thumbnail TEXT NOT NULL,
                    instructions TEXT,
                    ingredients TEXT NOT NULL DEFAULT '[]',
                    source TEXT,
                    saved_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_recipes_name ON recipes(name);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
        let raw: String = row.get(idx)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    fn json_column<T: DeserializeOwned>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
        let raw: String = row.get(idx)?;
        serde_json::from_str(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    // Expects columns:
    // 0: id, 1: name, 2: add_date, 3: expiration_date, 4: quantity,
    // 5: possible_names, 6: last_notified
    fn ingredient_from_row(row: &rusqlite::Row) -> rusqlite::Result<Ingredient> {
        let last_notified = match row.get::<_, Option<String>>(6)? {
            Some(_) => Some(Self::date_column(row, 6)?),
            None => None,
        };
        Ok(Ingredient {
            id: row.get(0)?,
            name: row.get(1)?,
            add_date: Self::date_column(row, 2)?,
            expiration_date: Self::date_column(row, 3)?,
            quantity: row.get(4)?,
            possible_names: Self::json_column(row, 5)?,
            last_notified,
        })
    }

    // Expects columns:
    // 0: id, 1: name, 2: thumbnail, 3: instructions, 4: ingredients, 5: source
    fn recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<RecipeFull> {
        Ok(RecipeFull {
            id: row.get(0)?,
            name: row.get(1)?,
            thumbnail: row.get(2)?,
            instructions: row.get(3)?,
            ingredients: Self::json_column(row, 4)?,
            source: row.get(5)?,
        })
    }

    // --- Ingredients ---

    /// Insert an ingredient, ignoring it if the id is already taken.
    /// Returns whether a row was written.
    pub fn insert_ingredient(&self, ingredient: &Ingredient) -> Result<bool> {
        let possible_names = serde_json::to_string(&ingredient.possible_names)?;
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO ingredients (id, name, add_date, expiration_date, quantity, possible_names, last_notified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                ingredient.id,
                ingredient.name,
                ingredient.add_date.format(DATE_FORMAT).to_string(),
                ingredient.expiration_date.format(DATE_FORMAT).to_string(),
                ingredient.quantity,
                possible_names,
                ingredient
                    .last_notified
                    .map(|d| d.format(DATE_FORMAT).to_string()),
            ],
        )?;
        debug!(id = ingredient.id, inserted = rows > 0, "insert ingredient");
        Ok(rows > 0)
    }

    pub fn get_ingredient(&self, id: i64) -> Result<Option<Ingredient>> {
        self.conn
            .query_row(
                "SELECT id, name, add_date, expiration_date, quantity, possible_names, last_notified
                 FROM ingredients WHERE id = ?1",
                params![id],
                Self::ingredient_from_row,
            )
            .optional()
            .context("Failed to read ingredient")
    }

    /// All ingredients, soonest expiry first. The order is stable so callers
    /// may refer to ingredients by position.
    pub fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, add_date, expiration_date, quantity, possible_names, last_notified
             FROM ingredients ORDER BY expiration_date, id",
        )?;
        let ingredients = stmt
            .query_map([], Self::ingredient_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    pub fn delete_ingredient(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM ingredients WHERE id = ?1", params![id])?;
        debug!(id, deleted = rows > 0, "delete ingredient");
        Ok(rows > 0)
    }

    /// Swap `old_id` for `ingredient` (remove then insert) atomically.
    pub fn replace_ingredient(&self, old_id: i64, ingredient: &Ingredient) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.delete_ingredient(old_id)?;
        // A stale row under the new id would make the insert a no-op.
        if ingredient.id != old_id {
            self.delete_ingredient(ingredient.id)?;
        }
        self.insert_ingredient(ingredient)?;
        tx.commit()?;
        Ok(())
    }

    pub fn clear_ingredients(&self) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM ingredients", [])?;
        Ok(rows)
    }

    /// Next id for a locally created ingredient: -1, -2, ... Barcodes are
    /// positive, so the two never collide.
    pub fn next_local_ingredient_id(&self) -> Result<i64> {
        let lowest: Option<i64> =
            self.conn
                .query_row("SELECT MIN(id) FROM ingredients WHERE id < 0", [], |row| {
                    row.get(0)
                })?;
        Ok(lowest.map_or(-1, |id| id - 1))
    }

    // --- Recipes ---

    /// Save a recipe, ignoring it if already saved. Returns whether a row
    /// was written.
    pub fn insert_recipe(&self, recipe: &RecipeFull) -> Result<bool> {
        let now = chrono::Local::now().to_rfc3339();
        let ingredients = serde_json::to_string(&recipe.ingredients)?;
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO recipes (id, name, thumbnail, instructions, ingredients, source, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                recipe.id,
                recipe.name,
                recipe.thumbnail,
                recipe.instructions,
                ingredients,
                recipe.source,
                now,
            ],
        )?;
        debug!(id = recipe.id, inserted = rows > 0, "insert recipe");
        Ok(rows > 0)
    }

    pub fn get_recipe(&self, id: i64) -> Result<Option<RecipeFull>> {
        self.conn
            .query_row(
                "SELECT id, name, thumbnail, instructions, ingredients, source
                 FROM recipes WHERE id = ?1",
                params![id],
                Self::recipe_from_row,
            )
            .optional()
            .context("Failed to read recipe")
    }

    pub fn list_recipes(&self) -> Result<Vec<RecipeFull>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, thumbnail, instructions, ingredients, source
             FROM recipes ORDER BY name, id",
        )?;
        let recipes = stmt
            .query_map([], Self::recipe_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    pub fn delete_recipe(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM recipes WHERE id = ?1", params![id])?;
        debug!(id, deleted = rows > 0, "delete recipe");
        Ok(rows > 0)
    }

    pub fn clear_recipes(&self) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM recipes", [])?;
        Ok(rows)
    }
}
