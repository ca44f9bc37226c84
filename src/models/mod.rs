//! Data models for the scraping backend's JSON API

use serde::{Deserialize, Serialize};

/// A product listing returned by the scraping backend.
///
/// Every field is a display string; price, rating and review counts are
/// shown exactly as the backend formatted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: String,
    pub rating: String,
    pub reviews: String,
    pub url: String,
}

/// Body of `POST /api/scrape`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub query: String,
    pub pages: u8,
    pub test_mode: bool,
}

/// Successful response of `POST /api/scrape`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub products: Vec<Product>,
    /// Number of products the backend reports having scraped
    #[serde(default)]
    pub count: Option<usize>,
    /// Free-form status line, e.g. "Products scraped successfully"
    #[serde(default)]
    pub message: Option<String>,
    /// Name of the CSV export the backend wrote alongside the response
    #[serde(default)]
    pub csv_file: Option<String>,
}

impl ScrapeResponse {
    /// Count to report to the user, falling back to the list length.
    pub fn reported_count(&self) -> usize {
        self.count.unwrap_or(self.products.len())
    }

    /// Secondary line built from the backend's status message and CSV export.
    pub fn backend_note(&self) -> Option<String> {
        match (self.message.as_deref(), self.csv_file.as_deref()) {
            (Some(message), Some(csv_file)) => Some(format!("{message}, saved to {csv_file}")),
            (None, Some(csv_file)) => Some(format!("Saved to {csv_file}")),
            (Some(message), None) => Some(message.to_string()),
            (None, None) => None,
        }
    }
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}
