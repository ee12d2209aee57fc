use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use crate::openfoodfacts;
use crate::themealdb;

pub struct Config {
    pub db_path: PathBuf,
    pub off_base_url: String,
    pub mealdb_base_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok(), default_db_path)
    }

    /// Build the config from `var` lookups (`PANTRY_DB`, `PANTRY_OFF_URL`,
    /// `PANTRY_MEALDB_URL`). `default_db` is only called when `PANTRY_DB` is
    /// unset.
    fn resolve(
        var: impl Fn(&str) -> Option<String>,
        default_db: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let db_path = match non_empty("PANTRY_DB") {
            Some(path) => PathBuf::from(path),
            None => default_db()?,
        };

        Ok(Config {
            db_path,
            off_base_url: non_empty("PANTRY_OFF_URL")
                .unwrap_or_else(|| openfoodfacts::DEFAULT_BASE_URL.to_string()),
            mealdb_base_url: non_empty("PANTRY_MEALDB_URL")
                .unwrap_or_else(|| themealdb::DEFAULT_BASE_URL.to_string()),
        })
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs =
        ProjectDirs::from("", "", "pantry").context("Could not determine home directory")?;

    let data_dir = proj_dirs.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    Ok(data_dir.join("pantry.db"))
}
