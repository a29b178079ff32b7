//! Command-line and environment configuration shared by both binaries
//!
//! Each group is a clap `Args` struct that the binaries flatten into their
//! own `Parser`. Store connection settings live here once, so the server and
//! the CLI resolve candidates and pool options the same way.

use crate::reader::connection::ConnectOptions;
use crate::report::ReportCatalog;
use clap::Args;
use std::path::PathBuf;

/// Store candidates and connection options
#[derive(Debug, Clone, Args)]
pub struct DatabaseArgs {
    /// Database connection string, tried in order until one opens
    #[arg(
        long = "database",
        env = "HEROSCOPE_DATABASE",
        value_delimiter = ',',
        default_values_t = [
            "duckdb://superheroes.duckdb".to_string(),
            "duckdb://data/superheroes.duckdb".to_string(),
        ]
    )]
    pub databases: Vec<String>,

    /// Number of pooled connections
    #[arg(long, env = "HEROSCOPE_POOL_SIZE", default_value_t = 4)]
    pub pool_size: usize,

    /// Open file databases in read-only mode
    #[arg(long)]
    pub read_only: bool,
}

impl DatabaseArgs {
    /// Connection strings in the order they are tried
    pub fn candidates(&self) -> &[String] {
        &self.databases
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            pool_size: self.pool_size.max(1),
            read_only: self.read_only,
        }
    }
}

/// Report parameter limits
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Upper bound for `top`-style parameters
    #[arg(long, env = "HEROSCOPE_MAX_TOP", default_value_t = 100)]
    pub max_top: i64,
}

impl ReportArgs {
    pub fn catalog(&self) -> ReportCatalog {
        ReportCatalog::new().with_max_top(self.max_top)
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind to
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// CORS allowed origins (comma-separated, `*` for any)
    #[arg(long, default_value = "*")]
    pub cors_origin: String,

    /// Directory that `/export/{name}` writes CSV files into
    #[arg(long, default_value = "./exports")]
    pub export_dir: PathBuf,

    /// Load the sample superhero dataset on startup
    #[arg(long)]
    pub load_sample_data: bool,

    /// Load data files into the store (CSV, Parquet, JSON, SQL; repeatable)
    #[arg(long = "load-data")]
    pub load_data_files: Vec<String>,
}

impl ServerArgs {
    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Explicit origins, or `None` when any origin is allowed
    pub fn cors_origins(&self) -> Option<Vec<String>> {
        if self.cors_origin.trim() == "*" {
            return None;
        }
        Some(
            self.cors_origin
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}
