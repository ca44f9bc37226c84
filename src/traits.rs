//! Traits and interfaces for talking to a scraping backend

use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{HealthStatus, ScrapeRequest, ScrapeResponse};

/// Trait for a backend able to run product scrapes
#[async_trait]
pub trait ScrapeBackend: Send + Sync {
    /// Base address the backend is reached at, used in connectivity messages
    fn base_url(&self) -> &str;

    /// Probe the backend's liveness endpoint
    ///
    /// # Returns
    /// * `Result<Option<HealthStatus>, BackendError>` - Parsed status when the
    ///   body had the expected shape, `None` for any other successful body
    async fn health_check(&self) -> Result<Option<HealthStatus>, BackendError>;

    /// Ask the backend to scrape products
    ///
    /// # Arguments
    /// * `request` - Query, page count and test-mode flag
    ///
    /// # Returns
    /// * `Result<ScrapeResponse, BackendError>` - Scraped products or the failure
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, BackendError>;
}
