use anyhow::{Context, Result, bail};
use chrono::Local;
use tracing::debug;

use pantry_core::models::Ingredient;
use pantry_core::openfoodfacts::{ProductResponse, product_to_ingredient};
use pantry_core::service::ProductLookupProvider;

use crate::http;

pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.net";

pub struct OpenFoodFactsClient {
    client: reqwest::Client,
    rt: tokio::runtime::Handle,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            rt: http::runtime_handle()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn lookup_barcode_async(&self, barcode: &str) -> Result<Option<Ingredient>> {
        let barcode = barcode.trim();
        if barcode.is_empty() || !barcode.bytes().all(|b| b.is_ascii_digit()) {
            bail!("Invalid barcode '{barcode}'. A barcode is digits only");
        }
        let url = format!("{}/api/v2/product/{barcode}", self.base_url);
        debug!(%url, "looking up barcode");

        // Unknown products come back as 404 with a `status: 0` body, so the
        // body is parsed whatever the HTTP status.
        let resp = self
            .client
            .get(&url)
            .query(&[("product_type", "food")])
            .send()
            .await
            .context("Failed to reach OpenFoodFacts API")?;

        let data: ProductResponse = resp
            .json()
            .await
            .context("Failed to parse OpenFoodFacts product response")?;

        product_to_ingredient(data, Local::now().date_naive())
    }
}

impl ProductLookupProvider for OpenFoodFactsClient {
    fn lookup_barcode(&self, code: &str) -> Result<Option<Ingredient>> {
        self.rt.block_on(self.lookup_barcode_async(code))
    }
}
