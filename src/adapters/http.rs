//! REST implementation of the inventory list boundary.
//!
//! Wraps `reqwest` with the configured base URL and request timeout.
//! Non-2xx responses and connection failures both surface as
//! [`SyncError::Refetch`]; the owning view records them as its error
//! state without touching the push channel.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::domain::{Item, Transaction};
use crate::error::SyncError;
use crate::ports::InventoryApi;

/// `reqwest`-backed client for the inventory service's list endpoints.
pub struct RestInventoryApi {
    client: Client,
    base_url: String,
}

impl RestInventoryApi {
    pub fn new(config: &ApiConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SyncError::Refetch(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl InventoryApi for RestInventoryApi {
    async fn list_items(&self) -> Result<Vec<Item>, SyncError> {
        self.get_json("/items/").await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, SyncError> {
        self.get_json("/transactions/").await
    }
}
