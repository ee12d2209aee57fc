pub mod db;
pub mod expiry;
pub mod filter;
pub mod models;
pub mod openfoodfacts;
pub mod service;
pub mod themealdb;
