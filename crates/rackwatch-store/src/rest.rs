//! PostgREST-style client for the hosted inventory table.
//!
//! All traffic goes to `{endpoint}/rest/v1/servers` with the credential
//! in both the `apikey` and `Authorization: Bearer` headers, matching
//! what the hosted store expects from server-side callers.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::{InventoryStore, UpdateFields};
use crate::types::{ServerId, ServerRecord, SweepSnapshot};

/// Column projection fetched by the sweep.
const SWEEP_COLUMNS: &str = "id,status,ip_data";

/// REST-backed inventory store.
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    config: StoreConfig,
}

impl RestStore {
    /// Build a client from an explicit config.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Build a client from `RACKWATCH_STORE_URL` / `RACKWATCH_SERVICE_KEY`.
    pub fn from_env() -> StoreResult<Self> {
        Ok(Self::new(StoreConfig::from_env()?))
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/servers", self.config.endpoint.trim_end_matches('/'))
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.config.service_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.service_key),
            )
    }

    async fn read_rows<T: serde::de::DeserializeOwned>(
        &self,
        query: &[(&str, String)],
    ) -> StoreResult<Vec<T>> {
        let url = self.table_url();
        let response = self
            .request(reqwest::Method::GET, &url)
            .query(query)
            .send()
            .await
            .map_err(|e| StoreError::Read(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Read(e.to_string()))?;
        if !status.is_success() {
            return Err(StoreError::Read(http_error(status, &body)));
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Deserialize(e.to_string()))
    }

    async fn write<B: serde::Serialize>(
        &self,
        method: reqwest::Method,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> StoreResult<()> {
        let url = self.table_url();
        let mut request = self.request(method, &url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Write(http_error(status, &body)));
        }
        Ok(())
    }
}

/// `id=in.(a,b,c)` filter value for a set of ids.
fn in_filter(ids: &[ServerId]) -> String {
    format!("in.({})", ids.join(","))
}

fn http_error(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    }
}

#[async_trait]
impl InventoryStore for RestStore {
    async fn list(&self) -> StoreResult<Vec<ServerRecord>> {
        self.read_rows(&[("select", "*".to_string())]).await
    }

    async fn select_for_sweep(&self) -> StoreResult<Vec<SweepSnapshot>> {
        debug!(columns = SWEEP_COLUMNS, "fetching sweep projection");
        self.read_rows(&[("select", SWEEP_COLUMNS.to_string())]).await
    }

    async fn insert(&self, records: &[ServerRecord]) -> StoreResult<()> {
        self.write(reqwest::Method::POST, &[], Some(&records)).await
    }

    async fn update(&self, id: &str, fields: UpdateFields) -> StoreResult<()> {
        self.write(
            reqwest::Method::PATCH,
            &[("id", format!("eq.{id}"))],
            Some(&fields),
        )
        .await
    }

    async fn update_many(&self, ids: &[ServerId], fields: UpdateFields) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.write(
            reqwest::Method::PATCH,
            &[("id", in_filter(ids))],
            Some(&fields),
        )
        .await
    }

    async fn delete(&self, ids: &[ServerId]) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.write::<()>(reqwest::Method::DELETE, &[("id", in_filter(ids))], None)
            .await
    }
}
