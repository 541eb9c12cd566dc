//! Remote catalog fetcher
//!
//! One bulk GET per (scope, device) asks the endpoint for everything it has;
//! paging happens locally afterwards.

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::model::{CatalogEntry, CatalogScope, DeviceClass};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, trace};
use url::Url;

/// Anything that can produce the full catalog for a scope and device class
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every entry. An empty catalog is an error.
    async fn fetch(
        &self,
        scope: CatalogScope,
        device: DeviceClass,
    ) -> CatalogResult<Vec<CatalogEntry>>;
}

/// Response body shapes accepted from the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CatalogResponse {
    /// `{"games": [...], "total": n}`; some deployments say `data`
    Current {
        #[serde(alias = "data")]
        games: Vec<CatalogEntry>,
        #[serde(default)]
        total: Option<usize>,
    },
    /// Bare array
    Legacy(Vec<CatalogEntry>),
}

impl CatalogResponse {
    /// Decode a response body
    pub fn parse(body: &[u8]) -> CatalogResult<Self> {
        serde_json::from_slice(body).map_err(|e| CatalogError::Malformed(e.to_string()))
    }

    /// Upstream total, when the body carried one
    pub fn total(&self) -> Option<usize> {
        match self {
            Self::Current { total, .. } => *total,
            Self::Legacy(_) => None,
        }
    }

    pub fn into_games(self) -> Vec<CatalogEntry> {
        match self {
            Self::Current { games, .. } | Self::Legacy(games) => games,
        }
    }
}

/// HTTP catalog source
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: Client,
    endpoint: Url,
    fetch_limit: usize,
}

impl HttpCatalogSource {
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Use a preconfigured client
    pub fn with_client(client: Client, config: &CatalogConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            fetch_limit: config.fetch_limit,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full request URL for a scope and device class
    pub fn request_url(&self, scope: CatalogScope, device: DeviceClass) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("type", scope.as_str())
            .append_pair("device", device.as_str())
            .append_pair("per_page", &self.fetch_limit.to_string())
            .append_pair("page", "1")
            .append_pair("use_cache", "true")
            .append_pair("max_results", "true");
        url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(
        &self,
        scope: CatalogScope,
        device: DeviceClass,
    ) -> CatalogResult<Vec<CatalogEntry>> {
        let url = self.request_url(scope, device);
        debug!("Fetching catalog from {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        trace!("Response status: {status}");
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed = CatalogResponse::parse(&body)?;
        let total = parsed.total();
        let games = parsed.into_games();

        if games.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        info!(
            "Fetched {} {scope} games for {device}{}",
            games.len(),
            total
                .map(|t| format!(" (upstream total {t})"))
                .unwrap_or_default()
        );
        Ok(games)
    }
}
