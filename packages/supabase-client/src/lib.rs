//! Pure Supabase PostgREST client.
//!
//! A minimal client for the Supabase REST API. Supports selecting rows from a
//! table and patching rows matched by an equality filter.
//!
//! # Example
//!
//! ```rust,ignore
//! use supabase_client::{SupabaseClient, SupabaseOptions};
//!
//! let client = SupabaseClient::new(SupabaseOptions {
//!     url: "https://project.supabase.co".into(),
//!     service_role_key: key.into(),
//! })?;
//!
//! let rows: Vec<serde_json::Value> = client.select("products", "id,link").await?;
//! client.update("products", "id", "42", &serde_json::json!({ "price": 59.95 })).await?;
//! ```

pub mod error;

pub use error::{Result, SupabaseError};

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

const REST_PATH: &str = "rest/v1/";

#[derive(Debug, Clone)]
pub struct SupabaseOptions {
    pub url: String,
    pub service_role_key: SecretString,
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    rest_url: Url,
    key: SecretString,
}

impl SupabaseClient {
    pub fn new(options: SupabaseOptions) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), options)
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(client: reqwest::Client, options: SupabaseOptions) -> Result<Self> {
        let mut base = options.url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let rest_url = Url::parse(&base)?.join(REST_PATH)?;

        Ok(Self {
            client,
            rest_url,
            key: options.service_role_key,
        })
    }

    /// Select `columns` from every row of `table`.
    pub async fn select<T: DeserializeOwned>(&self, table: &str, columns: &str) -> Result<Vec<T>> {
        let url = self.table_url(table, &[("select", columns)])?;
        tracing::debug!(table, columns, "Selecting rows");

        let resp = self.authorized(self.client.get(url)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let rows: Vec<T> = resp.json().await?;
        Ok(rows)
    }

    /// Patch every row of `table` whose `column` equals `value`.
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        column: &str,
        value: &str,
        body: &B,
    ) -> Result<()> {
        let filter = format!("eq.{}", value);
        let url = self.table_url(table, &[(column, filter.as_str())])?;
        tracing::debug!(table, column, value, "Updating rows");

        let resp = self
            .authorized(self.client.patch(url))
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }

    fn table_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.rest_url.join(table)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.key.expose_secret();
        builder.header("apikey", key).bearer_auth(key)
    }
}
