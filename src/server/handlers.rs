//! Route handlers

use crate::api;
use crate::reader::schema::DatabaseSchema;
use crate::reader::Reader;
use crate::report::{ParamSpec, Presentation};
use crate::server::{ApiErrorResponse, AppState};
use crate::writer::{PngWriter, SvgWriter, Writer};
use crate::HeroscopeError;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Rows returned by `/tables/{name}` when no limit is given
const DEFAULT_TABLE_LIMIT: usize = 100;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TableRowsQuery {
    #[serde(default = "default_table_limit")]
    limit: usize,
}

fn default_table_limit() -> usize {
    DEFAULT_TABLE_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct SqlQuery {
    query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
pub struct TablesResponse {
    tables: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TableRowsResponse {
    table: String,
    data: Vec<serde_json::Value>,
    count: usize,
}

#[derive(Debug, Serialize)]
pub struct SqlResponse {
    result: Vec<serde_json::Value>,
    count: usize,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    schema: DatabaseSchema,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    message: String,
    path: String,
}

/// One catalog entry as listed by `/reports`
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    parameters: Vec<ParamSpec>,
    columns: Vec<&'static str>,
    presentations: Vec<Presentation>,
}

#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    reports: Vec<ReportSummary>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Run store and render work off the async runtime
async fn blocking<T, F>(task: F) -> Result<T, ApiErrorResponse>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(task).await.map_err(|e| {
        HeroscopeError::InternalError(format!("Background task failed: {}", e))
    })?;
    Ok(outcome?)
}

// ============================================================================
// Handler Functions
// ============================================================================

/// GET / - Liveness check
pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Superhero Database API is running".to_string(),
    })
}

/// GET /tables - Names of the tables in the store
pub async fn list_tables_handler(
    State(state): State<AppState>,
) -> Result<Json<TablesResponse>, ApiErrorResponse> {
    let reader = state.reader.clone();
    let tables = blocking(move || reader.table_names()).await?;
    Ok(Json(TablesResponse { tables }))
}

/// GET /tables/{name}?limit=N - Up to N rows of a table
pub async fn table_rows_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    query: Result<Query<TableRowsQuery>, QueryRejection>,
) -> Result<Json<TableRowsResponse>, ApiErrorResponse> {
    let Query(query) = query?;
    let reader = state.reader.clone();
    let table = name.clone();
    let result = blocking(move || reader.table_rows(&table, query.limit)).await?;

    Ok(Json(TableRowsResponse {
        table: name,
        count: result.len(),
        data: result.to_json_rows(),
    }))
}

/// POST /query - Execute arbitrary SQL
///
/// The SQL comes from the request body, or from `?query=` when the body is
/// empty. Nothing restricts what the statement does: anyone who can reach
/// this route can modify or drop any table.
pub async fn query_handler(
    State(state): State<AppState>,
    query: Result<Query<SqlQuery>, QueryRejection>,
    body: String,
) -> Result<Json<SqlResponse>, ApiErrorResponse> {
    let Query(query) = query?;
    let sql = if body.trim().is_empty() {
        query.query.unwrap_or_default()
    } else {
        body
    };
    if sql.trim().is_empty() {
        return Err(HeroscopeError::ValidationError("No SQL query provided".to_string()).into());
    }

    info!("Executing raw query: {} chars", sql.len());
    let reader = state.reader.clone();
    let result = blocking(move || reader.execute(&sql, &[])).await?;

    Ok(Json(SqlResponse {
        count: result.len(),
        result: result.to_json_rows(),
    }))
}

/// GET /schema - Columns and foreign keys of every table
pub async fn schema_handler(
    State(state): State<AppState>,
) -> Result<Json<SchemaResponse>, ApiErrorResponse> {
    let reader = state.reader.clone();
    let schema = blocking(move || reader.schema()).await?;
    Ok(Json(SchemaResponse { schema }))
}

/// GET /export/{name} - Write a table to CSV on the server
pub async fn export_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ExportResponse>, ApiErrorResponse> {
    let reader = state.reader.clone();
    let dir = state.export_dir.clone();
    let table = name.clone();
    let path = blocking(move || reader.export_csv(&table, &dir)).await?;
    let path = path.display().to_string();

    Ok(Json(ExportResponse {
        message: format!("Tabla {} exportada a {}", name, path),
        path,
    }))
}

/// GET /reports - The report catalog
pub async fn list_reports_handler(State(state): State<AppState>) -> Json<ReportsResponse> {
    let reports = state
        .catalog
        .definitions()
        .iter()
        .map(|definition| ReportSummary {
            id: definition.id,
            title: definition.title,
            description: definition.description,
            parameters: definition.params.clone(),
            columns: definition.columns.clone(),
            presentations: definition.presentations(),
        })
        .collect();
    Json(ReportsResponse { reports })
}

/// GET /report/{id} - A report as an HTML table page
pub async fn report_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiErrorResponse> {
    let reader = state.reader.clone();
    let catalog = state.catalog.clone();
    let page = blocking(move || {
        let prepared = api::prepare(reader.as_ref(), &catalog, &id, &params)?;
        Ok(prepared.render_html())
    })
    .await?;
    Ok(Html(page))
}

/// GET /chart/{id} - A report's chart variant as PNG (or SVG with `?format=svg`)
pub async fn chart_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<Response, ApiErrorResponse> {
    let format = params
        .remove("format")
        .unwrap_or_else(|| "png".to_string())
        .to_lowercase();
    let writer: Box<dyn Writer + Send> = match format.as_str() {
        "png" => Box::new(PngWriter::new()),
        "svg" => Box::new(SvgWriter::new()),
        other => {
            return Err(HeroscopeError::ValidationError(format!(
                "Unsupported chart format '{}' (supported: png, svg)",
                other
            ))
            .into())
        }
    };
    let content_type = writer.content_type();

    let reader = state.reader.clone();
    let catalog = state.catalog.clone();
    let bytes = blocking(move || {
        let prepared = api::prepare_chart(reader.as_ref(), &catalog, &id, &params)?;
        prepared.render_chart(&*writer)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

#[cfg(test)]
mod tests {
    use crate::reader::DuckDBReader;
    use crate::report::ReportCatalog;
    use crate::sample::load_sample_data;
    use crate::server::{build_router, AppState};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn app_with_export_dir(export_dir: PathBuf) -> Router {
        let reader = DuckDBReader::from_connection_string("duckdb://memory").unwrap();
        load_sample_data(&reader).unwrap();
        build_router(AppState::new(reader, ReportCatalog::new(), export_dir))
    }

    fn app() -> Router {
        app_with_export_dir(PathBuf::from("./exports"))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, String, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String, Vec<u8>) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, _, body) = get(app, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_sql(app: Router, uri: &str, sql: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(sql.to_string()))
            .unwrap();
        let (status, _, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_root() {
        let (status, body) = get_json(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Superhero Database API is running");
    }

    #[tokio::test]
    async fn test_list_tables() {
        let (status, body) = get_json(app(), "/tables").await;
        assert_eq!(status, StatusCode::OK);
        let tables = body["tables"].as_array().unwrap();
        assert_eq!(tables.len(), 10);
        assert!(tables.contains(&serde_json::json!("superhero")));
    }

    #[tokio::test]
    async fn test_table_rows_limit() {
        let (status, body) = get_json(app(), "/tables/superhero?limit=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["table"], "superhero");
        assert_eq!(body["count"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);

        let (_, body) = get_json(app(), "/tables/superhero").await;
        assert_eq!(body["count"], 12);
    }

    #[tokio::test]
    async fn test_table_rows_zero_limit() {
        let (status, body) = get_json(app(), "/tables/colour?limit=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_table_rows_huge_limit() {
        let (status, body) = get_json(app(), "/tables/colour?limit=18446744073709551615").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 8);
    }

    #[tokio::test]
    async fn test_table_rows_bad_requests() {
        let (status, body) = get_json(app(), "/tables/villains").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "NotFound");

        let (status, body) = get_json(app(), "/tables/superhero?limit=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_raw_query() {
        let (status, body) = post_sql(app(), "/query", "SELECT 1 AS x, 'a' AS y").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["result"][0]["x"], 1);
        assert_eq!(body["result"][0]["y"], "a");

        let (status, body) = post_sql(app(), "/query?query=SELECT%202%20AS%20x", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"][0]["x"], 2);
    }

    #[tokio::test]
    async fn test_raw_query_errors() {
        let (status, body) = post_sql(app(), "/query", "SELEC * FROM superhero").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "QueryError");
        assert!(!body["error"]["message"].as_str().unwrap().is_empty());

        let (status, _) = post_sql(app(), "/query", "   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_schema() {
        let (status, body) = get_json(app(), "/schema").await;
        assert_eq!(status, StatusCode::OK);

        let hero_power = &body["schema"]["hero_power"];
        assert_eq!(hero_power["foreign_keys"].as_array().unwrap().len(), 2);
        let first_column = &body["schema"]["superhero"]["columns"][0];
        assert_eq!(first_column["name"], "id");
        assert!(first_column["type"].is_string());
        assert!(first_column["nullable"].is_boolean());
    }

    #[tokio::test]
    async fn test_export() {
        let dir = tempfile::tempdir().unwrap();
        let export_dir = dir.path().join("exports");
        let (status, _, body) = get(app_with_export_dir(export_dir.clone()), "/export/publisher").await;
        assert_eq!(status, StatusCode::OK);

        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let path = body["path"].as_str().unwrap();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Tabla publisher exportada a "));
        let csv = std::fs::read_to_string(path).unwrap();
        assert!(csv.contains("Marvel Comics"));
        assert!(export_dir.join("publisher.csv").exists());
    }

    #[tokio::test]
    async fn test_list_reports() {
        let (status, body) = get_json(app(), "/reports").await;
        assert_eq!(status, StatusCode::OK);

        let reports = body["reports"].as_array().unwrap();
        assert_eq!(reports.len(), 17);
        let top_powers = reports.iter().find(|r| r["id"] == "top-powers").unwrap();
        assert_eq!(top_powers["parameters"][0]["name"], "top");
        assert_eq!(
            top_powers["presentations"],
            serde_json::json!(["table", "horizontal-bar"])
        );
    }

    #[tokio::test]
    async fn test_report_html() {
        let (status, content_type, body) = get(app(), "/report/top-powers?top=3").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));

        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("<title>TOP 3 Poderes más Populares</title>"));
        assert_eq!(html.matches("<tr><td>").count(), 3);
    }

    #[tokio::test]
    async fn test_report_errors() {
        let (status, body) = get_json(app(), "/report/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "NotFound");

        let (status, body) = get_json(app(), "/report/heroes-with-power").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "ValidationError");

        let (status, _) = get_json(app(), "/report/top-powers?top=ten").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_report_with_text_parameter() {
        let (status, _, body) =
            get(app(), "/report/similar-heroes?hero=Superman").await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("<td>Batman</td>"));
    }

    #[tokio::test]
    async fn test_chart_png() {
        let (status, content_type, body) = get(app(), "/chart/top-powers?top=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "image/png");
        assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn test_chart_svg() {
        let (status, content_type, body) =
            get(app(), "/chart/gender-distribution?format=svg").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "image/svg+xml");
        assert!(String::from_utf8(body).unwrap().starts_with("<svg"));
    }

    #[tokio::test]
    async fn test_chart_errors() {
        let (status, _) = get_json(app(), "/chart/top-attributes").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get_json(app(), "/chart/top-powers?format=gif").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("gif"));
    }
}
