//! HTTP client for the scraping backend's `/api/health` and `/api/scrape` endpoints

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};

use crate::error::BackendError;
use crate::models::{HealthStatus, ScrapeRequest, ScrapeResponse};
use crate::traits::ScrapeBackend;

const HEALTH_PATH: &str = "/api/health";
const SCRAPE_PATH: &str = "/api/scrape";

/// `ScrapeBackend` speaking the backend's JSON API over HTTP
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("product-scraper-console/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Turns a non-success response into `BackendError::Rejected`, keeping the
/// `detail` field when it is a plain string.
async fn rejected(response: Response) -> BackendError {
    let status = response.status();
    let detail = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("detail")?.as_str().map(str::to_string));

    warn!("Backend returned {}: {:?}", status, detail);
    BackendError::Rejected { status, detail }
}

#[async_trait]
impl ScrapeBackend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health_check(&self) -> Result<Option<HealthStatus>, BackendError> {
        let url = self.endpoint(HEALTH_PATH);
        debug!("Checking backend health at {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        // Any successful answer counts as healthy, whatever the body says
        let status = response.json::<HealthStatus>().await.ok();
        if let Some(ref health) = status {
            info!("Backend health: {}", health.status);
        }
        Ok(status)
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, BackendError> {
        info!(
            "Requesting scrape: query={:?}, pages={}, test_mode={}",
            request.query, request.pages, request.test_mode
        );

        let response = self
            .client
            .post(self.endpoint(SCRAPE_PATH))
            .json(request)
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let body = response
            .json::<ScrapeResponse>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        info!("Backend returned {} products", body.products.len());
        Ok(body)
    }
}

impl Clone for HttpBackend {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
        }
    }
}
