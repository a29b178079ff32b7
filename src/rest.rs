/*!
heroscope REST API Server

Serves the superhero store, its reports and its charts over HTTP.

## Usage

```bash
heroscope-rest --host 127.0.0.1 --port 8000
heroscope-rest --database duckdb://memory --load-sample-data
heroscope-rest --database duckdb://heroes.duckdb,duckdb:///srv/heroes.duckdb --read-only
```

## Endpoints

- `GET /` - Liveness message
- `GET /tables`, `GET /tables/{name}?limit=100` - Table names and rows
- `POST /query` - Execute raw SQL (unrestricted)
- `GET /schema` - Columns and foreign keys
- `GET /export/{name}` - Write a table to CSV on the server
- `GET /reports` - Report catalog
- `GET /report/{id}` - Report as an HTML table
- `GET /chart/{id}` - Report chart as PNG (`?format=svg` for SVG)
*/

use anyhow::Context;
use clap::Parser;
use heroscope::config::{DatabaseArgs, ReportArgs, ServerArgs};
use heroscope::sample::load_sample_data;
use heroscope::server::{build_router, cors_layer, AppState};
use heroscope::{DuckDBReader, VERSION};
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI arguments for the REST API server
#[derive(Parser)]
#[command(name = "heroscope-rest")]
#[command(about = "REST API server for superhero catalog reports")]
#[command(version = VERSION)]
struct Cli {
    #[command(flatten)]
    database: DatabaseArgs,

    #[command(flatten)]
    reports: ReportArgs,

    #[command(flatten)]
    server: ServerArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heroscope=info,heroscope_rest=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // One attempt per candidate; startup aborts when none opens
    let reader = DuckDBReader::connect(cli.database.candidates(), &cli.database.connect_options())
        .context("Could not connect to any configured database")?;

    if cli.server.load_sample_data {
        info!("Loading sample superhero dataset");
        load_sample_data(&reader)?;
    }

    if !cli.server.load_data_files.is_empty() {
        info!("Loading {} data file(s)", cli.server.load_data_files.len());
        for file in &cli.server.load_data_files {
            reader.load_file(Path::new(file))?;
        }
    }

    let state = AppState::new(
        reader,
        cli.reports.catalog(),
        cli.server.export_dir.clone(),
    );

    let app = build_router(state).layer(cors_layer(cli.server.cors_origins()));

    let addr: SocketAddr = cli
        .server
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid host or port: {}", cli.server.bind_address()))?;

    info!("Starting heroscope REST API server on {}", addr);
    info!("  GET  /reports     - Report catalog");
    info!("  GET  /report/{{id}} - Report as HTML table");
    info!("  GET  /chart/{{id}}  - Report chart as PNG");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolve once the signal fires; never resolve if it cannot be listened for
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Cannot listen for the shutdown signal, running until killed: {}", e);
            std::future::pending::<()>().await
        }
    }
}
