//! Console client for a product scraping backend.
//!
//! Collects a search query, a page count and a test-mode switch, calls the
//! backend's `/api/health` and `/api/scrape` endpoints, and renders the
//! returned products as a table with error and success notifications.

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod notifications;
pub mod render;
pub mod search;
pub mod traits;

pub use app::ScraperConsole;
pub use backend::HttpBackend;
pub use config::Config;
pub use search::SearchState;
