//! Connection string parsing for the superhero store
//!
//! Parses URI-style connection strings to determine where the DuckDB
//! database lives.

use crate::{HeroscopeError, Result};

/// Parsed connection information
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionInfo {
    /// DuckDB in-memory database
    DuckDBMemory,
    /// DuckDB file-based database
    DuckDBFile(String),
}

/// Options applied when opening a store
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOptions {
    /// Number of pooled connections (at least 1)
    pub pool_size: usize,
    /// Open file databases in read-only access mode
    pub read_only: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            pool_size: 4,
            read_only: false,
        }
    }
}

/// Parse a connection string into connection information
///
/// # Supported Formats
///
/// - `duckdb://memory` - DuckDB in-memory database
/// - `duckdb:///absolute/path/file.duckdb` - DuckDB file (absolute path)
/// - `duckdb://relative/file.duckdb` - DuckDB file (relative path)
///
/// # Examples
///
/// ```
/// use heroscope::reader::connection::{parse_connection_string, ConnectionInfo};
///
/// let info = parse_connection_string("duckdb://memory").unwrap();
/// assert_eq!(info, ConnectionInfo::DuckDBMemory);
///
/// let info = parse_connection_string("duckdb://heroes.duckdb").unwrap();
/// assert_eq!(info, ConnectionInfo::DuckDBFile("heroes.duckdb".to_string()));
/// ```
pub fn parse_connection_string(uri: &str) -> Result<ConnectionInfo> {
    if uri == "duckdb://memory" {
        return Ok(ConnectionInfo::DuckDBMemory);
    }

    if let Some(path) = uri.strip_prefix("duckdb:///") {
        if path.is_empty() {
            return Err(HeroscopeError::ConnectionError(
                "DuckDB file path cannot be empty".to_string(),
            ));
        }
        return Ok(ConnectionInfo::DuckDBFile(format!("/{}", path)));
    }

    if let Some(path) = uri.strip_prefix("duckdb://") {
        if path.is_empty() {
            return Err(HeroscopeError::ConnectionError(
                "DuckDB file path cannot be empty".to_string(),
            ));
        }
        return Ok(ConnectionInfo::DuckDBFile(path.to_string()));
    }

    Err(HeroscopeError::ConnectionError(format!(
        "Unsupported connection string format: {}. Supported: duckdb://memory, duckdb://<path>",
        uri
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duckdb_memory() {
        let info = parse_connection_string("duckdb://memory").unwrap();
        assert_eq!(info, ConnectionInfo::DuckDBMemory);
    }

    #[test]
    fn test_duckdb_file_relative() {
        let info = parse_connection_string("duckdb://data/superheroes.duckdb").unwrap();
        assert_eq!(
            info,
            ConnectionInfo::DuckDBFile("data/superheroes.duckdb".to_string())
        );
    }

    #[test]
    fn test_duckdb_file_absolute() {
        let info = parse_connection_string("duckdb:///var/lib/heroes.duckdb").unwrap();
        assert_eq!(
            info,
            ConnectionInfo::DuckDBFile("/var/lib/heroes.duckdb".to_string())
        );
    }

    #[test]
    fn test_empty_path() {
        assert!(parse_connection_string("duckdb://").is_err());
        assert!(parse_connection_string("duckdb:///").is_err());
    }

    #[test]
    fn test_unsupported_scheme() {
        let result = parse_connection_string("mysql://root@localhost:3309/superheroes");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unsupported connection string"));
    }
}
