use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;

use super::*;
use crate::error::{BackendError, GENERIC_SCRAPE_ERROR};
use crate::models::HealthStatus;

const BASE_URL: &str = "http://localhost:8000";
const UNREACHABLE: &str = "Cannot connect to the backend server. Please make sure the backend is running on http://localhost:8000";

#[derive(Clone)]
enum Reply {
    Ok(Vec<Product>),
    Unreachable,
    Rejected(Option<&'static str>),
}

impl Reply {
    fn into_error(self) -> BackendError {
        match self {
            Reply::Ok(_) => unreachable!(),
            Reply::Unreachable => BackendError::Unreachable("connection refused".to_string()),
            Reply::Rejected(detail) => BackendError::Rejected {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: detail.map(str::to_string),
            },
        }
    }
}

struct FakeBackend {
    health: Reply,
    scrape: Reply,
    health_calls: AtomicUsize,
    scrape_calls: AtomicUsize,
    last_request: Mutex<Option<ScrapeRequest>>,
}

impl FakeBackend {
    fn new(health: Reply, scrape: Reply) -> Self {
        Self {
            health,
            scrape,
            health_calls: AtomicUsize::new(0),
            scrape_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    fn healthy(scrape: Reply) -> Self {
        Self::new(Reply::Ok(Vec::new()), scrape)
    }

    fn calls(&self) -> (usize, usize) {
        (
            self.health_calls.load(Ordering::SeqCst),
            self.scrape_calls.load(Ordering::SeqCst),
        )
    }

    fn last_request(&self) -> Option<ScrapeRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScrapeBackend for FakeBackend {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn health_check(&self) -> Result<Option<HealthStatus>, BackendError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        match self.health.clone() {
            Reply::Ok(_) => Ok(Some(HealthStatus {
                status: "healthy".to_string(),
            })),
            other => Err(other.into_error()),
        }
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, BackendError> {
        self.scrape_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match self.scrape.clone() {
            Reply::Ok(products) => Ok(ScrapeResponse {
                count: Some(products.len()),
                products,
                message: Some("Products scraped successfully".to_string()),
                csv_file: None,
            }),
            other => Err(other.into_error()),
        }
    }
}

fn product(name: &str, price: &str) -> Product {
    Product {
        name: name.to_string(),
        price: price.to_string(),
        rating: "4.7".to_string(),
        reviews: "2,345".to_string(),
        url: "https://www.amazon.com/dp/B08N5KWB9H".to_string(),
    }
}

fn three_products() -> Vec<Product> {
    vec![
        product("Apple MacBook Pro 13-inch", "1299.99"),
        product("Dell XPS 13", "999.99"),
        product("Lenovo ThinkPad X1", "1399.00"),
    ]
}

fn state() -> SearchState {
    SearchState::new(Duration::from_secs(6))
}

#[test]
fn defaults_match_a_fresh_form() {
    let state = state();
    assert_eq!(state.query(), "");
    assert_eq!(state.pages(), 1);
    assert!(!state.test_mode());
    assert!(state.products().is_empty());
    assert!(!state.is_loading());
    assert_eq!(state.error(), "");
    assert_eq!(state.success(), "");
    assert_eq!(state.phase(), Phase::Idle);
}

#[test]
fn pages_are_coerced_into_range() {
    assert_eq!(parse_pages("3"), 3);
    assert_eq!(parse_pages("0"), 1);
    assert_eq!(parse_pages("-4"), 1);
    assert_eq!(parse_pages("12"), 5);
    assert_eq!(parse_pages("2.9"), 2);
    assert_eq!(parse_pages(""), 1);
    assert_eq!(parse_pages("many"), 1);
    assert_eq!(parse_pages("NaN"), 1);
    assert_eq!(clamp_pages(i64::MAX), 5);
}

#[test]
fn fields_are_locked_in_test_mode() {
    let mut state = state();
    state.set_test_mode(true);

    assert_eq!(
        state.set_query("laptop"),
        Err(FieldLocked { field: "query" })
    );
    assert_eq!(state.set_pages("3"), Err(FieldLocked { field: "pages" }));
    assert_eq!(state.query(), "");
    assert_eq!(state.pages(), 1);

    state.set_test_mode(false);
    assert_eq!(state.set_pages("3"), Ok(3));
}

#[tokio::test]
async fn empty_query_never_reaches_the_network() {
    let backend = FakeBackend::healthy(Reply::Ok(three_products()));

    for query in ["", "   ", "\t\n"] {
        let mut state = state();
        state.set_query(query).unwrap();

        let result = state.submit(&backend).await;

        assert_eq!(result, Err(SearchFailure::EmptyQuery));
        assert_eq!(state.error(), "Please enter a search query");
        assert!(!state.is_loading());
    }
    assert_eq!(backend.calls(), (0, 0));
}

#[tokio::test]
async fn test_mode_does_not_need_a_query() {
    let backend = FakeBackend::healthy(Reply::Ok(three_products()));
    let mut state = state();
    state.set_test_mode(true);

    let result = state.submit(&backend).await;

    assert_eq!(result, Ok(Some(3)));
    assert_eq!(
        backend.last_request(),
        Some(ScrapeRequest {
            query: String::new(),
            pages: 1,
            test_mode: true,
        })
    );
}

#[tokio::test]
async fn successful_scrape_replaces_products_and_reports_count() {
    let backend = FakeBackend::healthy(Reply::Ok(three_products()));
    let mut state = state();
    state.set_query("laptop").unwrap();
    state.set_pages("2").unwrap();

    let result = state.submit(&backend).await;

    assert_eq!(result, Ok(Some(3)));
    assert_eq!(state.products(), three_products().as_slice());
    assert_eq!(state.success(), "Successfully scraped 3 products!");
    assert_eq!(state.error(), "");
    assert!(!state.is_loading());
    assert_eq!(state.phase(), Phase::Succeeded);
    assert_eq!(
        state.notices().success_note(),
        Some("Products scraped successfully")
    );
    assert!(state.scraped_at().is_some());
    assert_eq!(backend.calls(), (1, 1));
    assert_eq!(
        backend.last_request(),
        Some(ScrapeRequest {
            query: "laptop".to_string(),
            pages: 2,
            test_mode: false,
        })
    );
}

#[tokio::test]
async fn unreachable_health_check_skips_scrape() {
    let backend = FakeBackend::new(Reply::Unreachable, Reply::Ok(three_products()));
    let mut state = state();
    state.set_query("laptop").unwrap();

    let result = state.submit(&backend).await;

    assert!(matches!(result, Err(SearchFailure::Unreachable { .. })));
    assert_eq!(state.error(), UNREACHABLE);
    assert_eq!(backend.calls(), (1, 0));
    assert!(!state.is_loading());
}

#[tokio::test]
async fn unreachable_scrape_shows_the_same_message() {
    let backend = FakeBackend::healthy(Reply::Unreachable);
    let mut state = state();
    state.set_query("laptop").unwrap();

    state.submit(&backend).await.unwrap_err();

    assert_eq!(state.error(), UNREACHABLE);
    assert_eq!(backend.calls(), (1, 1));
}

#[tokio::test]
async fn backend_detail_is_shown_verbatim() {
    let backend = FakeBackend::healthy(Reply::Rejected(Some("No products found")));
    let mut state = state();
    state.set_query("zzzz").unwrap();

    state.submit(&backend).await.unwrap_err();

    assert_eq!(state.error(), "No products found");
    assert_eq!(state.phase(), Phase::Failed);
}

#[tokio::test]
async fn backend_error_without_detail_uses_fallback() {
    let backend = FakeBackend::healthy(Reply::Rejected(None));
    let mut state = state();
    state.set_query("laptop").unwrap();

    state.submit(&backend).await.unwrap_err();

    assert_eq!(state.error(), GENERIC_SCRAPE_ERROR);
}

#[tokio::test]
async fn failed_submit_keeps_previous_products() {
    let mut state = state();
    state.set_query("laptop").unwrap();
    state
        .submit(&FakeBackend::healthy(Reply::Ok(three_products())))
        .await
        .unwrap();

    state
        .submit(&FakeBackend::healthy(Reply::Rejected(None)))
        .await
        .unwrap_err();

    assert_eq!(state.products().len(), 3);
    assert_eq!(state.success(), "");
    assert_eq!(state.notices().success_note(), None);
    assert_eq!(state.error(), GENERIC_SCRAPE_ERROR);
}

#[test]
fn loading_spans_only_the_request() {
    let mut state = state();
    state.set_query("laptop").unwrap();
    state.notices_mut().set_error("stale");

    let request = match state.begin_submit() {
        Submission::Started(request) => request,
        other => panic!("expected a started submission, got {other:?}"),
    };
    assert!(state.is_loading());
    assert!(!state.can_submit());
    assert_eq!(state.phase(), Phase::Submitting);
    assert_eq!(state.error(), "");
    assert_eq!(request.query, "laptop");

    assert_eq!(state.begin_submit(), Submission::Busy);

    state.finish_submit(&Err(SearchFailure::Backend { detail: None }));
    assert!(!state.is_loading());
    assert!(state.can_submit());
}
