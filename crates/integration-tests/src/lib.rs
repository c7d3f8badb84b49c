//! Integration tests for shopcart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopcart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_http` - HTTP client against a local catalog server
//! - `repository_flow` - Repository streams, persistence and checkout end to end
//!
//! [`CatalogServer`] serves the product and discount endpoints on an
//! ephemeral port. Either endpoint can be switched to answer with HTTP 500.
//! `/broken.json` always answers with an empty HTTP 500.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use shopcart_catalog::CatalogError;
use shopcart_catalog::remote::HttpCatalogClient;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Product catalog served by default.
pub const PRODUCTS_JSON: &str = r#"{
  "products": [
    { "code": "VOUCHER", "name": "Cabify Voucher", "price": 5 },
    { "code": "TSHIRT", "name": "Cabify T-Shirt", "price": 20 },
    { "code": "MUG", "name": "Cabify Coffee Mug", "price": 7.5 }
  ]
}"#;

/// Discount table served by default.
pub const DISCOUNTS_JSON: &str = r#"{
  "discounts": {
    "VOUCHER": { "type": "BuyXGetYFree", "x": 2, "y": 1 },
    "TSHIRT": { "type": "BulkDiscount", "threshold": 3, "discountedPrice": 19.00 }
  }
}"#;

const FAILURE_BODY: &str = "upstream exploded";

#[derive(Default)]
struct ServerState {
    fail_products: AtomicBool,
    fail_discounts: AtomicBool,
    product_requests: AtomicUsize,
    discount_requests: AtomicUsize,
}

/// Local catalog server, stopped on drop.
pub struct CatalogServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    handle: JoinHandle<()>,
}

impl CatalogServer {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(ServerState::default());
        let app = Router::new()
            .route("/products.json", get(products))
            .route("/discounts.json", get(discounts))
            .route("/broken.json", get(broken))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// URL of `path` on this server.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not form a valid URL.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}/{}", self.addr, path.trim_start_matches('/')))
            .expect("valid test server URL")
    }

    /// Client pointed at this server's endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn client(&self) -> Result<HttpCatalogClient, CatalogError> {
        HttpCatalogClient::new(
            self.url("products.json"),
            self.url("discounts.json"),
            Duration::from_secs(5),
        )
    }

    /// Make the products endpoint answer with HTTP 500.
    pub fn fail_products(&self, fail: bool) {
        self.state.fail_products.store(fail, Ordering::SeqCst);
    }

    /// Make the discounts endpoint answer with HTTP 500.
    pub fn fail_discounts(&self, fail: bool) {
        self.state.fail_discounts.store(fail, Ordering::SeqCst);
    }

    /// Requests served by the products endpoint so far.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }

    /// Requests served by the discounts endpoint so far.
    #[must_use]
    pub fn discount_requests(&self) -> usize {
        self.state.discount_requests.load(Ordering::SeqCst)
    }
}

impl Drop for CatalogServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn products(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    respond(state.fail_products.load(Ordering::SeqCst), PRODUCTS_JSON)
}

async fn discounts(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    state.discount_requests.fetch_add(1, Ordering::SeqCst);
    respond(state.fail_discounts.load(Ordering::SeqCst), DISCOUNTS_JSON)
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

fn respond(fail: bool, body: &'static str) -> impl IntoResponse {
    if fail {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            FAILURE_BODY,
        )
    } else {
        (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body)
    }
}
