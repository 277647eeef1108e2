use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use supabase_client::{SupabaseClient, SupabaseOptions};

use crate::models::{Price, Product, ProductId};

pub const PRODUCTS_TABLE: &str = "products";

/// Row access the updater needs from the backing store.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, with at least `id` and `link` populated.
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn update_price(
        &self,
        id: &ProductId,
        price: Price,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct PriceUpdate {
    price: Price,
    updated_at: DateTime<Utc>,
}

/// `products` table behind Supabase's REST API.
pub struct SupabaseProductStore {
    client: SupabaseClient,
}

impl SupabaseProductStore {
    pub fn new(options: SupabaseOptions) -> Result<Self> {
        let client = SupabaseClient::new(options).context("Failed to create Supabase client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ProductStore for SupabaseProductStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.client
            .select(PRODUCTS_TABLE, "id,link")
            .await
            .context("Failed to load products")
    }

    async fn update_price(
        &self,
        id: &ProductId,
        price: Price,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.client
            .update(
                PRODUCTS_TABLE,
                "id",
                &id.to_string(),
                &PriceUpdate { price, updated_at },
            )
            .await
            .with_context(|| format!("Failed to update price for product {}", id))
    }
}
