//! Search form state and the submit flow.
//!
//! A submit runs in three steps so callers can render the loading state
//! while the request is in flight:
//!
//! 1. [`SearchState::begin_submit`] validates the form and flips `loading`
//! 2. [`run_search`] performs the health check, then the scrape
//! 3. [`SearchState::finish_submit`] stores the products or the error
//!
//! [`SearchState::submit`] chains the three for callers that do not need to
//! draw in between.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::SearchFailure;
use crate::models::{Product, ScrapeRequest, ScrapeResponse};
use crate::notifications::Notifications;
use crate::traits::ScrapeBackend;

pub const MIN_PAGES: u8 = 1;
pub const MAX_PAGES: u8 = 5;

/// Clamps a page count into `MIN_PAGES..=MAX_PAGES`.
pub fn clamp_pages(value: i64) -> u8 {
    let clamped = value.clamp(i64::from(MIN_PAGES), i64::from(MAX_PAGES));
    u8::try_from(clamped).unwrap_or(MIN_PAGES)
}

/// Coerces free-form page input to a valid page count.
///
/// Fractions are truncated and anything that is not a number becomes
/// `MIN_PAGES`.
pub fn parse_pages(input: &str) -> u8 {
    match input.trim().parse::<f64>() {
        #[allow(clippy::cast_possible_truncation)]
        Ok(value) if value.is_finite() => clamp_pages(value.trunc() as i64),
        _ => MIN_PAGES,
    }
}

/// Returned when a form field is edited while it is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} cannot be changed while test mode is on")]
pub struct FieldLocked {
    pub field: &'static str,
}

/// Where the form is in its `idle -> submitting -> success | error` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Result of trying to start a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The request that should now be sent
    Started(ScrapeRequest),
    /// A request is already in flight; the submit control is disabled
    Busy,
    /// Validation failed; the error notification has been set
    Rejected(SearchFailure),
}

#[derive(Debug, Clone)]
pub struct SearchState {
    query: String,
    pages: u8,
    test_mode: bool,
    products: Vec<Product>,
    loading: bool,
    scraped_at: Option<DateTime<Utc>>,
    notices: Notifications,
}

impl SearchState {
    pub fn new(notice_ttl: Duration) -> Self {
        Self {
            query: String::new(),
            pages: MIN_PAGES,
            test_mode: false,
            products: Vec::new(),
            loading: false,
            scraped_at: None,
            notices: Notifications::new(notice_ttl),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn pages(&self) -> u8 {
        self.pages
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// When the products on screen were received
    pub fn scraped_at(&self) -> Option<DateTime<Utc>> {
        self.scraped_at
    }

    pub fn notices(&self) -> &Notifications {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notifications {
        &mut self.notices
    }

    pub fn error(&self) -> &str {
        self.notices.error()
    }

    pub fn success(&self) -> &str {
        self.notices.success()
    }

    /// Query and pages are disabled in test mode
    pub fn fields_enabled(&self) -> bool {
        !self.test_mode
    }

    pub fn can_submit(&self) -> bool {
        !self.loading
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Submitting
        } else if !self.notices.error().is_empty() {
            Phase::Failed
        } else if !self.notices.success().is_empty() {
            Phase::Succeeded
        } else {
            Phase::Idle
        }
    }

    pub fn set_query(&mut self, query: &str) -> Result<(), FieldLocked> {
        if !self.fields_enabled() {
            return Err(FieldLocked { field: "query" });
        }
        self.query = query.to_string();
        Ok(())
    }

    /// Stores the coerced page count and returns it.
    pub fn set_pages(&mut self, input: &str) -> Result<u8, FieldLocked> {
        if !self.fields_enabled() {
            return Err(FieldLocked { field: "pages" });
        }
        self.pages = parse_pages(input);
        Ok(self.pages)
    }

    pub fn set_test_mode(&mut self, enabled: bool) {
        self.test_mode = enabled;
    }

    /// Validates the form and, when it passes, enters the loading state.
    pub fn begin_submit(&mut self) -> Submission {
        if self.loading {
            return Submission::Busy;
        }

        if !self.test_mode && self.query.trim().is_empty() {
            let failure = SearchFailure::EmptyQuery;
            self.notices.set_error(failure.to_string());
            return Submission::Rejected(failure);
        }

        self.loading = true;
        self.notices.clear();

        Submission::Started(ScrapeRequest {
            query: self.query.clone(),
            pages: clamp_pages(i64::from(self.pages)),
            test_mode: self.test_mode,
        })
    }

    /// Applies the outcome of a request started by `begin_submit`.
    pub fn finish_submit(&mut self, outcome: &Result<ScrapeResponse, SearchFailure>) {
        match outcome {
            Ok(response) => {
                self.products.clone_from(&response.products);
                self.scraped_at = Some(Utc::now());
                self.notices.set_success_with_note(
                    format!("Successfully scraped {} products!", response.reported_count()),
                    response.backend_note(),
                );
            }
            Err(failure) => self.notices.set_error(failure.to_string()),
        }
        self.loading = false;
    }

    /// Runs a whole submit against `backend`.
    ///
    /// # Returns
    /// * `Ok(Some(count))` - products were stored
    /// * `Ok(None)` - a request was already in flight, nothing happened
    /// * `Err(failure)` - validation or backend failure, also shown as a notification
    pub async fn submit<B>(&mut self, backend: &B) -> Result<Option<usize>, SearchFailure>
    where
        B: ScrapeBackend + ?Sized,
    {
        let request = match self.begin_submit() {
            Submission::Started(request) => request,
            Submission::Busy => return Ok(None),
            Submission::Rejected(failure) => return Err(failure),
        };

        let outcome = run_search(backend, &request).await;
        self.finish_submit(&outcome);
        outcome.map(|response| Some(response.reported_count()))
    }
}

/// Health check followed by the scrape, stopping at the first failure.
pub async fn run_search<B>(
    backend: &B,
    request: &ScrapeRequest,
) -> Result<ScrapeResponse, SearchFailure>
where
    B: ScrapeBackend + ?Sized,
{
    if let Err(err) = backend.health_check().await {
        error!("Health check failed: {}", err);
        return Err(SearchFailure::from_backend(&err, backend.base_url()));
    }

    match backend.scrape(request).await {
        Ok(response) => {
            if let Some(ref message) = response.message {
                info!("Backend says: {}", message);
            }
            if let Some(ref csv_file) = response.csv_file {
                info!("Backend saved results to {}", csv_file);
            }
            Ok(response)
        }
        Err(err) => {
            warn!("Scrape failed: {}", err);
            Err(SearchFailure::from_backend(&err, backend.base_url()))
        }
    }
}

#[cfg(test)]
mod tests;
