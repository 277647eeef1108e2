//! Testing utilities including mock implementations.
//!
//! These stand in for the network and the backing store so the updater can
//! be exercised without real requests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::fetcher::{FetchError, PageFetcher};
use crate::models::{Price, Product, ProductId};
use crate::store::ProductStore;

#[derive(Debug, Clone)]
enum MockPage {
    Html(String),
    Timeout,
    Status(u16),
    Panic,
}

/// Mock fetcher with canned pages keyed by URL.
///
/// Unknown URLs answer with HTTP 404.
#[derive(Default, Clone)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, MockPage>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(self, url: &str, page: MockPage) -> Self {
        self.pages.write().unwrap().insert(url.to_string(), page);
        self
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with(url, MockPage::Html(html.to_string()))
    }

    pub fn with_timeout(self, url: &str) -> Self {
        self.with(url, MockPage::Timeout)
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with(url, MockPage::Status(status))
    }

    /// Panic while fetching `url`.
    pub fn with_panic(self, url: &str) -> Self {
        self.with(url, MockPage::Panic)
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.calls.write().unwrap().push(url.to_string());

        let page = self.pages.read().unwrap().get(url).cloned();
        match page {
            Some(MockPage::Html(html)) => Ok(html),
            Some(MockPage::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            Some(MockPage::Status(status)) => Err(FetchError::Status {
                status,
                url: url.to_string(),
            }),
            Some(MockPage::Panic) => panic!("mock fetcher panicked for {}", url),
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

/// In-memory product table.
#[derive(Default, Clone)]
pub struct MemoryStore {
    products: Arc<RwLock<Vec<Product>>>,
    failing_updates: Arc<RwLock<HashSet<ProductId>>>,
    list_error: Arc<RwLock<Option<String>>>,
    updates: Arc<RwLock<Vec<(ProductId, Price)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.products.write().unwrap().extend(products);
        self
    }

    /// Make `update_price` fail for `id`.
    pub fn with_failing_update(self, id: impl Into<ProductId>) -> Self {
        self.failing_updates.write().unwrap().insert(id.into());
        self
    }

    /// Make `list_products` fail with `message`.
    pub fn with_list_error(self, message: &str) -> Self {
        *self.list_error.write().unwrap() = Some(message.to_string());
        self
    }

    pub fn product(&self, id: impl Into<ProductId>) -> Option<Product> {
        let id = id.into();
        self.products
            .read()
            .unwrap()
            .iter()
            .find(|product| product.id == id)
            .cloned()
    }

    /// Successful `update_price` calls, in order.
    pub fn updates(&self) -> Vec<(ProductId, Price)> {
        self.updates.read().unwrap().clone()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        if let Some(message) = self.list_error.read().unwrap().clone() {
            return Err(anyhow!(message));
        }
        Ok(self.products.read().unwrap().clone())
    }

    async fn update_price(
        &self,
        id: &ProductId,
        price: Price,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        if self.failing_updates.read().unwrap().contains(id) {
            return Err(anyhow!("update rejected for product {}", id));
        }

        let mut products = self.products.write().unwrap();
        let product = products
            .iter_mut()
            .find(|product| &product.id == id)
            .ok_or_else(|| anyhow!("no product with id {}", id))?;
        product.price = Some(price.value());
        product.updated_at = Some(updated_at);

        self.updates.write().unwrap().push((id.clone(), price));
        Ok(())
    }
}
