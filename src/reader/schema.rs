//! Store introspection types and foreign key parsing

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// One column of a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
}

/// A foreign key from `constrained_columns` to `referred_table.referred_columns`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKey {
    pub referred_table: String,
    pub referred_columns: Vec<String>,
    pub constrained_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnInfo>,
    pub foreign_keys: Vec<ForeignKey>,
}

/// Schema of every table, keyed by table name
pub type DatabaseSchema = BTreeMap<String, TableSchema>;

fn foreign_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)FOREIGN\s+KEY\s*\(([^)]*)\)\s*REFERENCES\s+([\w."]+)\s*\(([^)]*)\)"#)
            .expect("Invalid foreign key regex")
    })
}

fn split_identifiers(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a constraint definition such as
/// `FOREIGN KEY (gender_id) REFERENCES gender(id)`
pub fn parse_foreign_key(constraint_text: &str) -> Option<ForeignKey> {
    let caps = foreign_key_regex().captures(constraint_text)?;
    let qualified = &caps[2];
    let table = qualified
        .rsplit('.')
        .next()
        .unwrap_or(qualified)
        .trim_matches('"')
        .to_string();
    Some(ForeignKey {
        referred_table: table,
        referred_columns: split_identifiers(&caps[3]),
        constrained_columns: split_identifiers(&caps[1]),
    })
}

/// Double-quote an identifier for safe use in SQL text
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quote a string literal for safe use in SQL text
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
