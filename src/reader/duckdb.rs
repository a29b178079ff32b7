//! DuckDB data source implementation
//!
//! Provides a pooled reader for DuckDB databases (in-memory or file-based)
//! that returns ordered rows, typed DataFrames, and store introspection.

use crate::reader::connection::{parse_connection_string, ConnectOptions, ConnectionInfo};
use crate::reader::pool::ConnectionPool;
use crate::reader::schema::{
    parse_foreign_key, quote_identifier, quote_literal, ColumnInfo, DatabaseSchema, TableSchema,
};
use crate::reader::{QueryResult, Reader, Value};
use crate::{HeroscopeError, Result};
use duckdb::{params, params_from_iter, AccessMode, Config, Connection};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Maximum number of rows written by a CSV export
pub const EXPORT_ROW_LIMIT: usize = 1000;

/// DuckDB database reader
///
/// Executes SQL against a pool of connections that share one database.
///
/// # Examples
///
/// ```rust,ignore
/// use heroscope::reader::{Reader, DuckDBReader};
///
/// let reader = DuckDBReader::from_connection_string("duckdb://memory")?;
/// let result = reader.execute("SELECT 1 AS x, 2 AS y", &[])?;
///
/// let reader = DuckDBReader::from_connection_string("duckdb://superheroes.duckdb")?;
/// let heroes = reader.table_rows("superhero", 10)?;
/// ```
pub struct DuckDBReader {
    pool: ConnectionPool,
    uri: String,
}

impl DuckDBReader {
    /// Open a reader with default options
    pub fn from_connection_string(uri: &str) -> Result<Self> {
        Self::open(uri, &ConnectOptions::default())
    }

    /// Open a reader and verify the store answers a trivial query
    ///
    /// # Errors
    ///
    /// Returns `HeroscopeError::ConnectionError` if:
    /// - The connection string format is invalid
    /// - A file database does not exist or cannot be opened
    /// - The store does not answer `SELECT 1`
    pub fn open(uri: &str, options: &ConnectOptions) -> Result<Self> {
        let conn = match parse_connection_string(uri)? {
            ConnectionInfo::DuckDBMemory => Connection::open_in_memory().map_err(|e| {
                HeroscopeError::ConnectionError(format!("Failed to open in-memory DuckDB: {}", e))
            })?,
            ConnectionInfo::DuckDBFile(path) => open_file(&path, options.read_only)?,
        };

        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
            .map_err(|e| {
                HeroscopeError::ConnectionError(format!("Store at '{}' did not answer: {}", uri, e))
            })?;

        let pool = ConnectionPool::new(conn, options.pool_size)?;
        Ok(Self {
            pool,
            uri: uri.to_string(),
        })
    }

    /// Try each candidate connection string once, in order
    ///
    /// The first candidate that opens wins. If every candidate fails the
    /// error of the last one is returned.
    pub fn connect(candidates: &[String], options: &ConnectOptions) -> Result<Self> {
        let mut last_error =
            HeroscopeError::ConnectionError("No connection candidates configured".to_string());

        for uri in candidates {
            match Self::open(uri, options) {
                Ok(reader) => {
                    info!(
                        "Connected to {} ({} pooled connections)",
                        uri,
                        reader.pool.size()
                    );
                    return Ok(reader);
                }
                Err(e) => {
                    warn!("Connection to {} failed: {}", uri, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Connection string this reader was opened with
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Run setup statements (CREATE TABLE, INSERT, etc.) in one batch
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.pool.acquire()?;
        conn.execute_batch(sql)
            .map_err(|e| HeroscopeError::QueryError(format!("Failed to execute batch: {}", e)))
    }

    /// Number of rows in a known table
    pub fn row_count(&self, table: &str) -> Result<i64> {
        self.require_table(table)?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let result = self.execute(&sql, &[])?;
        result
            .rows()
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .ok_or_else(|| HeroscopeError::InternalError(format!("No row count for '{}'", table)))
    }

    /// Write the first rows of a table to `<dir>/<table>.csv` with a header
    pub fn export_csv(&self, table: &str, dir: &Path) -> Result<PathBuf> {
        self.require_table(table)?;
        std::fs::create_dir_all(dir).map_err(|e| {
            HeroscopeError::InternalError(format!(
                "Failed to create export directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let path = dir.join(format!("{}.csv", table));
        let sql = format!(
            "COPY (SELECT * FROM {} LIMIT {}) TO {} (HEADER, DELIMITER ',')",
            quote_identifier(table),
            EXPORT_ROW_LIMIT,
            quote_literal(&path.to_string_lossy())
        );
        self.execute_batch(&sql)?;

        info!("Exported table '{}' to {}", table, path.display());
        Ok(path)
    }

    /// Load a data file into the store
    ///
    /// CSV, Parquet and JSON files become a table named after the file stem;
    /// `.sql` files are executed as a script.
    pub fn load_file(&self, file_path: &Path) -> Result<()> {
        if !file_path.exists() {
            return Err(HeroscopeError::ValidationError(format!(
                "File not found: {}",
                file_path.display()
            )));
        }

        let extension = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        // Derive table name from filename (without extension)
        let table_name = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("data")
            .replace(['-', ' '], "_");
        let source = quote_literal(&file_path.to_string_lossy());

        let sql = match extension.as_str() {
            "csv" => format!(
                "CREATE TABLE {} AS SELECT * FROM read_csv_auto({})",
                quote_identifier(&table_name),
                source
            ),
            "parquet" => format!(
                "CREATE TABLE {} AS SELECT * FROM read_parquet({})",
                quote_identifier(&table_name),
                source
            ),
            "json" | "jsonl" | "ndjson" => format!(
                "CREATE TABLE {} AS SELECT * FROM read_json_auto({})",
                quote_identifier(&table_name),
                source
            ),
            "sql" => std::fs::read_to_string(file_path).map_err(|e| {
                HeroscopeError::ValidationError(format!(
                    "Failed to read {}: {}",
                    file_path.display(),
                    e
                ))
            })?,
            _ => {
                return Err(HeroscopeError::ValidationError(format!(
                    "Unsupported file format: {} (supported: csv, parquet, json, jsonl, ndjson, sql)",
                    extension
                )))
            }
        };

        info!("Loading {}", file_path.display());
        self.execute_batch(&sql)
    }

    fn require_table(&self, table: &str) -> Result<()> {
        if self.table_names()?.iter().any(|t| t == table) {
            Ok(())
        } else {
            Err(HeroscopeError::NotFound(format!(
                "Table '{}' does not exist",
                table
            )))
        }
    }
}

fn open_file(path: &str, read_only: bool) -> Result<Connection> {
    if !Path::new(path).exists() {
        return Err(HeroscopeError::ConnectionError(format!(
            "DuckDB file '{}' does not exist",
            path
        )));
    }

    let result = if read_only {
        let config = Config::default()
            .access_mode(AccessMode::ReadOnly)
            .map_err(|e| HeroscopeError::ConnectionError(format!("Invalid config: {}", e)))?;
        Connection::open_with_flags(path, config)
    } else {
        Connection::open(path)
    };

    result.map_err(|e| {
        HeroscopeError::ConnectionError(format!("Failed to open DuckDB file '{}': {}", path, e))
    })
}

/// Convert one DuckDB cell into a scalar value
fn read_value(row: &duckdb::Row, col_idx: usize) -> Value {
    use duckdb::types::ValueRef;

    match row.get_ref(col_idx) {
        Ok(ValueRef::Null) => Value::Null,
        Ok(ValueRef::Boolean(b)) => Value::Bool(b),
        Ok(ValueRef::TinyInt(i)) => Value::Int(i as i64),
        Ok(ValueRef::SmallInt(i)) => Value::Int(i as i64),
        Ok(ValueRef::Int(i)) => Value::Int(i as i64),
        Ok(ValueRef::BigInt(i)) => Value::Int(i),
        Ok(ValueRef::UTinyInt(i)) => Value::Int(i as i64),
        Ok(ValueRef::USmallInt(i)) => Value::Int(i as i64),
        Ok(ValueRef::UInt(i)) => Value::Int(i as i64),
        Ok(ValueRef::UBigInt(i)) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        Ok(ValueRef::HugeInt(i)) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        Ok(ValueRef::Float(f)) => Value::Float(f as f64),
        Ok(ValueRef::Double(f)) => Value::Float(f),
        Ok(ValueRef::Decimal(d)) => d
            .to_string()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Null),
        Ok(ValueRef::Text(bytes)) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        Ok(ValueRef::Date32(days)) => date_from_days(days),
        Ok(ValueRef::Timestamp(unit, raw)) => timestamp_from_raw(unit, raw),
        Ok(_) => match row.get::<usize, String>(col_idx) {
            Ok(text) => Value::Text(text),
            Err(e) => {
                warn!("Unsupported value in column {}: {}", col_idx, e);
                Value::Null
            }
        },
        Err(e) => {
            warn!("Failed to read column {}: {}", col_idx, e);
            Value::Null
        }
    }
}

fn date_from_days(days: i32) -> Value {
    // 719_163 days separate 0001-01-01 from the Unix epoch
    chrono::NaiveDate::from_num_days_from_ce_opt(days + 719_163)
        .map(|d| Value::Text(d.format("%Y-%m-%d").to_string()))
        .unwrap_or(Value::Null)
}

fn timestamp_from_raw(unit: duckdb::types::TimeUnit, raw: i64) -> Value {
    use duckdb::types::TimeUnit;

    let micros = match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    };
    chrono::DateTime::from_timestamp_micros(micros)
        .map(|dt| {
            Value::Text(
                dt.naive_utc()
                    .format("%Y-%m-%dT%H:%M:%S%.f")
                    .to_string(),
            )
        })
        .unwrap_or(Value::Null)
}

impl Reader for DuckDBReader {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let started = Instant::now();
        let conn = self.pool.acquire()?;

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| HeroscopeError::QueryError(format!("Failed to prepare SQL: {}", e)))?;

        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(|e| HeroscopeError::QueryError(format!("Failed to execute SQL: {}", e)))?;

        let columns: Vec<String> = rows
            .as_ref()
            .map(|stmt| stmt.column_names())
            .unwrap_or_default();
        // Nothing to collect from statements without result columns
        if columns.is_empty() {
            debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Executed statement"
            );
            return Ok(QueryResult::empty());
        }

        let mut collected = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| HeroscopeError::QueryError(format!("Failed to iterate rows: {}", e)))?
        {
            let cells: Vec<Value> = (0..columns.len()).map(|i| read_value(row, i)).collect();
            collected.push(cells);
        }

        debug!(
            rows = collected.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Executed query"
        );
        QueryResult::new(columns, collected)
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let result = self.execute(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
            &[],
        )?;
        Ok(result
            .rows()
            .iter()
            .filter_map(|row| row.first().and_then(Value::as_str).map(str::to_string))
            .collect())
    }

    fn table_rows(&self, table: &str, limit: usize) -> Result<QueryResult> {
        self.require_table(table)?;
        // LIMIT is a BIGINT in DuckDB
        let limit = limit.min(i64::MAX as usize);
        let sql = format!("SELECT * FROM {} LIMIT {}", quote_identifier(table), limit);
        self.execute(&sql, &[])
    }

    fn schema(&self) -> Result<DatabaseSchema> {
        let mut schema = DatabaseSchema::new();

        for table in self.table_names()? {
            let table_param = [Value::from(table.as_str())];

            let columns: Vec<ColumnInfo> = self
                .execute(
                    "SELECT column_name, data_type, is_nullable \
                     FROM information_schema.columns \
                     WHERE table_schema = 'main' AND table_name = ? \
                     ORDER BY ordinal_position",
                    &table_param,
                )?
                .rows()
                .iter()
                .map(|row| ColumnInfo {
                    name: row[0].to_string(),
                    data_type: row[1].to_string(),
                    nullable: row[2].as_str() == Some("YES"),
                })
                .collect();

            let mut foreign_keys = Vec::new();
            let constraints = self.execute(
                "SELECT constraint_text FROM duckdb_constraints() \
                 WHERE table_name = ? AND constraint_type = 'FOREIGN KEY'",
                &table_param,
            )?;
            for row in constraints.rows() {
                let Some(fk) = row[0].as_str().and_then(parse_foreign_key) else {
                    continue;
                };
                // Only keep the side of the constraint that owns the columns
                let owned = fk
                    .constrained_columns
                    .iter()
                    .all(|c| columns.iter().any(|col| &col.name == c));
                if owned && !foreign_keys.contains(&fk) {
                    foreign_keys.push(fk);
                }
            }

            schema.insert(
                table,
                TableSchema {
                    columns,
                    foreign_keys,
                },
            );
        }

        Ok(schema)
    }
}
