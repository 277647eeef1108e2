//! Retail price updater
//!
//! Fetches product pages from a fixed set of supplement retailers, extracts a
//! price with per-site heuristics, and writes it back to the `products` table.
//!
//! # Usage
//!
//! ```rust,ignore
//! use price_scraper::{Config, HttpFetcher, PriceUpdater, SupabaseProductStore};
//!
//! let config = Config::from_env()?;
//! let store = SupabaseProductStore::new(config.supabase_options())?;
//! let updater = PriceUpdater::new(store, HttpFetcher::new()?);
//!
//! let report = updater.update_all_prices().await;
//! println!("{}", serde_json::to_string(&report)?);
//! ```
//!
//! # Modules
//!
//! - [`extractor`] - Site dispatch and per-site price cascades
//! - [`fetcher`] - HTTP fetching and the fetch-then-extract pipeline
//! - [`store`] - Product table access
//! - [`updater`] - Sequential refresh of every product
//! - [`testing`] - Mock fetcher and in-memory store

pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod store;
pub mod testing;
pub mod updater;

pub use config::Config;
pub use extractor::{extract, Site};
pub use fetcher::{
    fetch_and_extract, lookup_price, FetchError, HttpFetcher, PageFetcher, PriceLookup,
};
pub use models::{PlausibilityBand, Price, Product, ProductId};
pub use store::{ProductStore, SupabaseProductStore};
pub use updater::{ItemFailure, ItemResult, PriceUpdater, Summary, UpdateReport, UpdaterOptions};
