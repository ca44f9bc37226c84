//! Error types for backend calls and the user-facing failure taxonomy.

use reqwest::StatusCode;
use thiserror::Error;

/// Message shown when the backend answered with an error but gave no detail.
pub const GENERIC_SCRAPE_ERROR: &str = "An error occurred while scraping";

/// Message shown when a submit is attempted without a query outside test mode.
pub const EMPTY_QUERY_ERROR: &str = "Please enter a search query";

/// Errors produced by a [`crate::traits::ScrapeBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// No HTTP response was received (connection refused, DNS, timeout)
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    /// The backend answered with a non-success status
    #[error("backend rejected request with {status}")]
    Rejected {
        status: StatusCode,
        detail: Option<String>,
    },
    /// A response arrived but could not be understood
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Classifies a reqwest error as network-level or not.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.status().is_none() && (err.is_connect() || err.is_timeout() || err.is_request()) {
            Self::Unreachable(err.to_string())
        } else {
            Self::InvalidResponse(err.to_string())
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// Why a submit ended without results. `Display` is the exact text shown
/// in the error notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchFailure {
    #[error("Please enter a search query")]
    EmptyQuery,
    #[error(
        "Cannot connect to the backend server. Please make sure the backend is running on {base_url}"
    )]
    Unreachable { base_url: String },
    #[error("{}", .detail.as_deref().unwrap_or(GENERIC_SCRAPE_ERROR))]
    Backend { detail: Option<String> },
}

impl SearchFailure {
    pub fn from_backend(err: &BackendError, base_url: &str) -> Self {
        match err {
            BackendError::Unreachable(_) => Self::Unreachable {
                base_url: base_url.to_string(),
            },
            BackendError::Rejected { detail, .. } => Self::Backend {
                detail: detail.clone(),
            },
            BackendError::InvalidResponse(_) => Self::Backend { detail: None },
        }
    }
}
