/*!
# heroscope - analytical reports over a superhero catalog

heroscope answers aggregate questions about a relational superhero dataset
(popularity rankings, distributions, comparisons) and shapes the answers into
HTML tables or rendered chart images.

## Architecture

A request flows through four layers:
- **reader** → executes SQL against the store (DuckDB) and returns ordered rows
- **report** → the static catalog of named, parameterized analytical queries
- **writer** → HTML table and chart (SVG / PNG) renderers
- **server** → axum routes mapping HTTP requests onto catalog entries

The [`api`] module ties reader, catalog and writers together in a
two-stage `prepare()` → `render_*()` pipeline used by both binaries.
*/

pub mod api;
pub mod config;
pub mod reader;
pub mod report;
pub mod sample;
pub mod server;
pub mod writer;

pub use reader::{DuckDBReader, QueryResult, Reader, Value};
pub use report::{ReportCatalog, ReportDefinition};

// DataFrame abstraction (wraps Polars)
pub use polars::prelude::DataFrame;

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum HeroscopeError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, HeroscopeError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
