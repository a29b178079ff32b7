//! HTTP surface for heroscope
//!
//! Routes map requests onto the reader (introspection, raw SQL, export) and
//! onto catalog entries (`/report/{id}`, `/chart/{id}`). Store calls are
//! synchronous, so handlers run them on the blocking thread pool.
//!
//! | Route | Response |
//! |---|---|
//! | `GET /` | liveness message |
//! | `GET /tables` | table names |
//! | `GET /tables/{name}?limit=100` | rows of one table |
//! | `POST /query` | rows of arbitrary SQL (body or `?query=`) |
//! | `GET /schema` | columns and foreign keys of every table |
//! | `GET /export/{name}` | CSV written server-side, its path |
//! | `GET /reports` | the report catalog |
//! | `GET /report/{id}` | HTML table |
//! | `GET /chart/{id}` | PNG, or SVG with `?format=svg` |

use crate::reader::DuckDBReader;
use crate::report::ReportCatalog;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod error;
pub mod handlers;

pub use error::{ApiError, ApiErrorResponse, ErrorDetails};

/// Shared application state, created once at startup
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<DuckDBReader>,
    pub catalog: Arc<ReportCatalog>,
    /// Target directory of `/export/{name}`
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(reader: DuckDBReader, catalog: ReportCatalog, export_dir: PathBuf) -> Self {
        Self {
            reader: Arc::new(reader),
            catalog: Arc::new(catalog),
            export_dir,
        }
    }
}

/// Build the router with every route and request tracing
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/tables", get(handlers::list_tables_handler))
        .route("/tables/{name}", get(handlers::table_rows_handler))
        .route("/query", post(handlers::query_handler))
        .route("/schema", get(handlers::schema_handler))
        .route("/export/{name}", get(handlers::export_handler))
        .route("/reports", get(handlers::list_reports_handler))
        .route("/report/{id}", get(handlers::report_handler))
        .route("/chart/{id}", get(handlers::chart_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer for the given origins; `None` allows any origin
pub fn cors_layer(origins: Option<Vec<String>>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(vec![header::CONTENT_TYPE]);

    match origins {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let values: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            layer.allow_origin(values)
        }
    }
}
