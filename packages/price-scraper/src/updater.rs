//! Refreshes every product's price from its source page.
//!
//! Products are processed one at a time. A failure on one product (fetch,
//! extraction, persistence, or a panic inside its processing) is recorded
//! against that product and the run moves on. Only a failure to read the
//! product list aborts the run.

use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::fetcher::{lookup_price, PageFetcher, PriceLookup};
use crate::models::{Price, Product, ProductId};
use crate::store::ProductStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdaterOptions {
    /// Fetch and extract, but do not write prices back.
    ///
    /// Products whose price would have been written are still reported as
    /// successes and counted in `Summary::updated`, so a dry run previews the
    /// summary of a real run. Nothing is persisted.
    pub dry_run: bool,
}

/// Why a single product was not updated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemFailure {
    #[error("Price not found")]
    PriceNotFound,

    #[error("Failed to fetch page")]
    FetchFailed,

    #[error("Failed to update database")]
    PersistFailed,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    pub id: ProductId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemResult {
    fn updated(id: ProductId, price: Price) -> Self {
        Self {
            id,
            success: true,
            price: Some(price),
            error: None,
        }
    }

    fn failed(id: ProductId, failure: ItemFailure) -> Self {
        Self {
            id,
            success: false,
            price: None,
            error: Some(failure.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub updated: usize,
    pub failed: usize,
}

/// The single JSON document a run produces:
/// `{success, results, summary}` or `{success: false, error}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ItemResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateReport {
    pub fn completed(results: Vec<ItemResult>) -> Self {
        let updated = results.iter().filter(|result| result.success).count();
        let summary = Summary {
            total: results.len(),
            updated,
            failed: results.len() - updated,
        };

        Self {
            success: true,
            results: Some(results),
            summary: Some(summary),
            error: None,
        }
    }

    pub fn aborted(error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: None,
            summary: None,
            error: Some(error.into()),
        }
    }
}

pub struct PriceUpdater<S, F> {
    store: S,
    fetcher: F,
    options: UpdaterOptions,
}

impl<S, F> PriceUpdater<S, F>
where
    S: ProductStore,
    F: PageFetcher,
{
    pub fn new(store: S, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            options: UpdaterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: UpdaterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn update_all_prices(&self) -> UpdateReport {
        let products = match self.store.list_products().await {
            Ok(products) => products,
            Err(e) => {
                error!(error = %format!("{:#}", e), "Failed to load products");
                return UpdateReport::aborted(format!("{:#}", e));
            }
        };

        let products: Vec<Product> = products
            .into_iter()
            .filter(|product| product.source_url().is_some())
            .collect();

        if products.is_empty() {
            info!("No products with a source link");
            return UpdateReport::completed(Vec::new());
        }

        info!(
            count = products.len(),
            dry_run = self.options.dry_run,
            "Updating product prices"
        );

        let mut results = Vec::with_capacity(products.len());
        for product in &products {
            let result = match AssertUnwindSafe(self.update_product(product))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(product_id = %product.id, error = %message, "Product update panicked");
                    ItemResult::failed(product.id.clone(), ItemFailure::Unexpected(message))
                }
            };
            results.push(result);
        }

        let report = UpdateReport::completed(results);
        if let Some(summary) = &report.summary {
            info!(
                total = summary.total,
                updated = summary.updated,
                failed = summary.failed,
                "Price update complete"
            );
        }
        report
    }

    async fn update_product(&self, product: &Product) -> ItemResult {
        let id = product.id.clone();
        let Some(url) = product.source_url() else {
            return ItemResult::failed(id, ItemFailure::PriceNotFound);
        };

        let price = match lookup_price(&self.fetcher, url).await {
            PriceLookup::Found(price) => price,
            PriceLookup::NotFound => {
                info!(product_id = %id, url = %url, "Price not found");
                return ItemResult::failed(id, ItemFailure::PriceNotFound);
            }
            PriceLookup::Unreachable => return ItemResult::failed(id, ItemFailure::FetchFailed),
        };

        if self.options.dry_run {
            info!(product_id = %id, price = %price, "Dry run, skipping update");
            return ItemResult::updated(id, price);
        }

        match self.store.update_price(&id, price, Utc::now()).await {
            Ok(()) => {
                info!(product_id = %id, price = %price, "Price updated");
                ItemResult::updated(id, price)
            }
            Err(e) => {
                warn!(product_id = %id, error = %format!("{:#}", e), "Failed to save price");
                ItemResult::failed(id, ItemFailure::PersistFailed)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}
