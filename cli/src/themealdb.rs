use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use pantry_core::models::{Recipe, RecipeFull};
use pantry_core::service::RecipeProvider;
use pantry_core::themealdb::{
    MealList, MealObject, MealSummary, meal_to_recipe_full, summary_to_recipe,
};

use crate::http;

pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";

pub struct MealDbClient {
    client: reqwest::Client,
    rt: tokio::runtime::Handle,
    base_url: String,
}

impl MealDbClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            rt: http::runtime_handle()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_meals<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, ?query, "querying TheMealDB");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .context("Failed to reach TheMealDB API")?
            .error_for_status()
            .context("TheMealDB API returned an error")?;

        let data: MealList<T> = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse TheMealDB {endpoint} response"))?;

        Ok(data.into_meals())
    }

    /// Recipes that use `ingredient` (summaries only).
    pub async fn search_by_ingredient_async(&self, ingredient: &str) -> Result<Vec<Recipe>> {
        self.get_meals::<MealSummary>("filter.php", &[("i", ingredient)])
            .await?
            .into_iter()
            .map(summary_to_recipe)
            .collect()
    }

    pub async fn find_by_name_async(&self, name: &str) -> Result<Vec<RecipeFull>> {
        self.get_meals::<MealObject>("search.php", &[("s", name)])
            .await?
            .iter()
            .map(meal_to_recipe_full)
            .collect()
    }

    pub async fn lookup_async(&self, id: i64) -> Result<Option<RecipeFull>> {
        let id = id.to_string();
        let meals = self
            .get_meals::<MealObject>("lookup.php", &[("i", id.as_str())])
            .await?;
        meals.first().map(meal_to_recipe_full).transpose()
    }
}

impl RecipeProvider for MealDbClient {
    fn search_by_ingredient(&self, ingredient: &str) -> Result<Vec<Recipe>> {
        self.rt.block_on(self.search_by_ingredient_async(ingredient))
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<RecipeFull>> {
        self.rt.block_on(self.find_by_name_async(name))
    }

    fn lookup(&self, id: i64) -> Result<Option<RecipeFull>> {
        self.rt.block_on(self.lookup_async(id))
    }
}
