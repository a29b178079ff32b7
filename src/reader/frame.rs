//! Conversion of ordered query results into typed Polars DataFrames
//!
//! Each column's type is inferred from its non-null cells, so renderers can
//! tell numeric measures from categorical labels without knowing the query.

use crate::reader::{QueryResult, Value};
use crate::{DataFrame, HeroscopeError, Result};
use polars::prelude::{Column, DataType, IntoColumn, NamedFrom, Series};

/// Helper struct for building typed columns from row cells
enum ColumnBuilder {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

impl ColumnBuilder {
    /// Pick the narrowest type able to hold every non-null cell
    fn infer<'a>(cells: impl Iterator<Item = &'a Value> + Clone) -> Self {
        let non_null = cells.clone().filter(|v| !v.is_null());
        if non_null.clone().all(|v| matches!(v, Value::Int(_))) {
            ColumnBuilder::Int(cells.map(Value::as_i64).collect())
        } else if non_null
            .clone()
            .all(|v| matches!(v, Value::Int(_) | Value::Float(_)))
        {
            ColumnBuilder::Float(cells.map(Value::as_f64).collect())
        } else if non_null.clone().all(|v| matches!(v, Value::Bool(_))) {
            ColumnBuilder::Boolean(
                cells
                    .map(|v| match v {
                        Value::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect(),
            )
        } else {
            ColumnBuilder::Text(
                cells
                    .map(|v| match v {
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect(),
            )
        }
    }

    fn build(self, column_name: &str) -> Series {
        match self {
            ColumnBuilder::Int(values) => Series::new(column_name.into(), values),
            ColumnBuilder::Float(values) => Series::new(column_name.into(), values),
            ColumnBuilder::Boolean(values) => Series::new(column_name.into(), values),
            ColumnBuilder::Text(values) => Series::new(column_name.into(), values),
        }
    }
}

/// Convert a query result into a DataFrame with inferred column types
///
/// An all-null (or empty) column becomes Int64, which every renderer treats
/// as "numeric with no values".
pub fn to_dataframe(result: &QueryResult) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(result.columns().len());
    for (idx, name) in result.columns().iter().enumerate() {
        let cells = result.rows().iter().map(move |row| &row[idx]);
        let series = ColumnBuilder::infer(cells).build(name);
        columns.push(series.into_column());
    }

    DataFrame::new(columns)
        .map_err(|e| HeroscopeError::InternalError(format!("Failed to create DataFrame: {}", e)))
}

/// Whether a column type can be plotted as a measure
pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Read a numeric column as optional f64 values
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| HeroscopeError::RenderError(format!("Column '{}' not found", name)))?;
    if !is_numeric(column.dtype()) {
        return Err(HeroscopeError::RenderError(format!(
            "Column '{}' must be numeric, found {}",
            name,
            column.dtype()
        )));
    }
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| HeroscopeError::RenderError(format!("Cast of '{}' failed: {}", name, e)))?;
    let values = series
        .f64()
        .map_err(|e| HeroscopeError::RenderError(format!("Column '{}': {}", name, e)))?;
    Ok(values.into_iter().collect())
}

/// Read any column as optional display strings
pub fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| HeroscopeError::RenderError(format!("Column '{}' not found", name)))?;
    let series = column
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| HeroscopeError::RenderError(format!("Cast of '{}' failed: {}", name, e)))?;
    let values = series
        .str()
        .map_err(|e| HeroscopeError::RenderError(format!("Column '{}': {}", name, e)))?;
    Ok(values
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(columns: &[&str], rows: Vec<Vec<Value>>) -> QueryResult {
        QueryResult::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_inferred_types() {
        let qr = result(
            &["name", "count", "ratio", "flag"],
            vec![
                vec![
                    Value::from("Batman"),
                    Value::Int(3),
                    Value::Int(1),
                    Value::Bool(true),
                ],
                vec![
                    Value::from("Robin"),
                    Value::Null,
                    Value::Float(0.5),
                    Value::Null,
                ],
            ],
        );
        let df = to_dataframe(&qr).unwrap();

        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("count").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("ratio").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("flag").unwrap().dtype(), &DataType::Boolean);
    }

    #[test]
    fn test_mixed_column_falls_back_to_text() {
        let qr = result(
            &["mixed"],
            vec![vec![Value::Int(1)], vec![Value::from("two")]],
        );
        let df = to_dataframe(&qr).unwrap();
        assert_eq!(df.column("mixed").unwrap().dtype(), &DataType::String);
        assert_eq!(
            text_column(&df, "mixed").unwrap(),
            vec![Some("1".to_string()), Some("two".to_string())]
        );
    }

    #[test]
    fn test_numeric_column_rejects_text() {
        let qr = result(&["label"], vec![vec![Value::from("x")]]);
        let df = to_dataframe(&qr).unwrap();
        assert!(numeric_column(&df, "label").is_err());
        assert!(numeric_column(&df, "missing").is_err());
    }

    #[test]
    fn test_numeric_column_keeps_nulls() {
        let qr = result(&["n"], vec![vec![Value::Int(2)], vec![Value::Null]]);
        let df = to_dataframe(&qr).unwrap();
        assert_eq!(numeric_column(&df, "n").unwrap(), vec![Some(2.0), None]);
    }

    #[test]
    fn test_empty_result_has_columns() {
        let qr = result(&["a", "b"], vec![]);
        let df = to_dataframe(&qr).unwrap();
        assert_eq!(df.shape(), (0, 2));
    }
}
