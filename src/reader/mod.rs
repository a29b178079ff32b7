//! Data source abstraction layer for heroscope
//!
//! The reader module executes SQL against the superhero store and returns
//! ordered rows, or typed Polars DataFrames for the chart renderers.
//!
//! # Architecture
//!
//! All readers implement the `Reader` trait, which provides:
//! - SQL execution with positional bound parameters → ordered rows
//! - The same result as a typed DataFrame
//! - Store introspection (tables, rows of a table, schema)
//!
//! # Example
//!
//! ```rust,ignore
//! use heroscope::reader::{Reader, DuckDBReader, Value};
//!
//! let reader = DuckDBReader::from_connection_string("duckdb://memory")?;
//! let rows = reader.execute("SELECT * FROM superhero WHERE id = ?", &[Value::Int(1)])?;
//! ```

use crate::{DataFrame, Result};

pub mod connection;
pub mod duckdb;
pub mod frame;
pub mod pool;
pub mod schema;
pub mod value;

pub use self::duckdb::DuckDBReader;
pub use connection::ConnectOptions;
pub use schema::DatabaseSchema;
pub use value::{QueryResult, Value};

/// Trait for data source readers
///
/// Readers must be safe to share between concurrent requests.
pub trait Reader: Send + Sync {
    /// Execute a SQL statement and return its rows in store order
    ///
    /// # Arguments
    ///
    /// * `sql` - The SQL text, with `?` placeholders for parameters
    /// * `params` - Values bound to the placeholders, in order
    ///
    /// # Errors
    ///
    /// Returns `HeroscopeError::QueryError` if the SQL is invalid or the
    /// store rejects it. The message carries the store's own error text.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Execute a SQL statement and return the result as a typed DataFrame
    fn execute_as_table(&self, sql: &str, params: &[Value]) -> Result<DataFrame> {
        frame::to_dataframe(&self.execute(sql, params)?)
    }

    /// Names of the tables in the store, sorted
    fn table_names(&self) -> Result<Vec<String>>;

    /// Up to `limit` rows of a named table, in store order
    ///
    /// Returns `HeroscopeError::NotFound` for unknown tables.
    fn table_rows(&self, table: &str, limit: usize) -> Result<QueryResult>;

    /// Columns and foreign keys of every table
    fn schema(&self) -> Result<DatabaseSchema>;
}
