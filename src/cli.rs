/*!
heroscope Command Line Interface

Runs catalog reports against a superhero store and writes HTML tables or
chart images, checks which configured stores are reachable, and seeds new
store files with the sample dataset.
*/

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use heroscope::api;
use heroscope::config::{DatabaseArgs, ReportArgs};
use heroscope::reader::Reader;
use heroscope::sample::seed_database;
use heroscope::writer::{PngWriter, SvgWriter, Writer};
use heroscope::{DuckDBReader, VERSION};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "heroscope")]
#[command(about = "Analytical reports and charts over a superhero catalog")]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the reports in the catalog
    List {
        #[command(flatten)]
        reports: ReportArgs,
    },

    /// Run a report and write it as an HTML table
    Report {
        /// Report id (see `heroscope list`)
        id: String,

        /// Report parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        database: DatabaseArgs,

        #[command(flatten)]
        reports: ReportArgs,
    },

    /// Render a report's chart to an image file
    Chart {
        /// Report id (see `heroscope list`)
        id: String,

        /// Report parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Image format
        #[arg(long, value_enum, default_value_t = ChartFormat::Png)]
        format: ChartFormat,

        #[command(flatten)]
        database: DatabaseArgs,

        #[command(flatten)]
        reports: ReportArgs,
    },

    /// Try every configured database and show its tables
    Verify {
        #[command(flatten)]
        database: DatabaseArgs,
    },

    /// Create a DuckDB file with the superhero schema and sample dataset
    Seed {
        /// Path of the new database file
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum ChartFormat {
    Png,
    Svg,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value: no '=' found in '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("invalid key=value: empty key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("heroscope=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { reports } => cmd_list(reports),
        Commands::Report {
            id,
            params,
            output,
            database,
            reports,
        } => cmd_report(&id, params, output, &database, &reports),
        Commands::Chart {
            id,
            params,
            output,
            format,
            database,
            reports,
        } => cmd_chart(&id, params, output, format, &database, &reports),
        Commands::Verify { database } => cmd_verify(&database),
        Commands::Seed { path } => cmd_seed(path),
    }
}

fn connect(database: &DatabaseArgs) -> anyhow::Result<DuckDBReader> {
    DuckDBReader::connect(database.candidates(), &database.connect_options())
        .context("Could not connect to any configured database")
}

fn cmd_list(reports: ReportArgs) -> anyhow::Result<()> {
    let catalog = reports.catalog();
    for definition in catalog.definitions() {
        let params: Vec<String> = definition
            .params
            .iter()
            .map(|p| {
                if p.is_required() {
                    format!("{}=<text>", p.name)
                } else {
                    format!("[{}]", p.name)
                }
            })
            .collect();
        let kinds: Vec<&str> = definition
            .presentations()
            .iter()
            .map(|k| k.as_str())
            .collect();
        println!(
            "{:<30} {:<24} {}",
            definition.id,
            kinds.join(","),
            params.join(" ")
        );
    }
    Ok(())
}

fn cmd_report(
    id: &str,
    params: Vec<(String, String)>,
    output: Option<PathBuf>,
    database: &DatabaseArgs,
    reports: &ReportArgs,
) -> anyhow::Result<()> {
    let reader = connect(database)?;
    let catalog = reports.catalog();
    let params: HashMap<String, String> = params.into_iter().collect();

    let prepared = api::prepare(&reader, &catalog, id, &params)?;
    let html = prepared.render_html();

    match output {
        None => println!("{}", html),
        Some(path) => {
            std::fs::write(&path, html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} ({} rows) written to {}",
                prepared.title(),
                prepared.result().len(),
                path.display()
            );
        }
    }
    Ok(())
}

fn cmd_chart(
    id: &str,
    params: Vec<(String, String)>,
    output: PathBuf,
    format: ChartFormat,
    database: &DatabaseArgs,
    reports: &ReportArgs,
) -> anyhow::Result<()> {
    let reader = connect(database)?;
    let catalog = reports.catalog();
    let params: HashMap<String, String> = params.into_iter().collect();

    let prepared = api::prepare_chart(&reader, &catalog, id, &params)?;
    let writer: Box<dyn Writer> = match format {
        ChartFormat::Png => Box::new(PngWriter::new()),
        ChartFormat::Svg => Box::new(SvgWriter::new()),
    };
    let bytes = prepared.render_chart(&*writer)?;

    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    eprintln!("{} written to {}", prepared.title(), output.display());
    Ok(())
}

fn cmd_verify(database: &DatabaseArgs) -> anyhow::Result<()> {
    let options = database.connect_options();
    let mut connected = 0;

    for uri in database.candidates() {
        let reader = match DuckDBReader::open(uri, &options) {
            Ok(reader) => reader,
            Err(e) => {
                println!("✗ {}: {}", uri, e);
                continue;
            }
        };
        connected += 1;

        let tables = reader.table_names()?;
        println!("✓ {} ({} tables)", uri, tables.len());
        for table in tables {
            println!("    {:<24} {:>8} rows", table, reader.row_count(&table)?);
        }
    }

    if connected == 0 {
        bail!(
            "None of {} configured database(s) could be opened",
            database.candidates().len()
        );
    }
    Ok(())
}

fn cmd_seed(path: PathBuf) -> anyhow::Result<()> {
    let reader = seed_database(&path)?;
    let tables = reader.table_names()?;
    eprintln!(
        "Created {} with {} tables ({} heroes)",
        path.display(),
        tables.len(),
        reader.row_count("superhero")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("hero=Wonder Woman").unwrap(),
            ("hero".to_string(), "Wonder Woman".to_string())
        );
        assert_eq!(parse_key_val("q=a=b").unwrap().1, "a=b");
        assert!(parse_key_val("top").is_err());
        assert!(parse_key_val("=5").is_err());
    }

    #[test]
    fn test_chart_command_args() {
        let cli = Cli::try_parse_from([
            "heroscope",
            "chart",
            "top-powers",
            "-p",
            "top=5",
            "-o",
            "out.svg",
            "--format",
            "svg",
            "--database",
            "duckdb://memory",
        ])
        .unwrap();

        match cli.command {
            Commands::Chart {
                id,
                params,
                format,
                database,
                ..
            } => {
                assert_eq!(id, "top-powers");
                assert_eq!(params, vec![("top".to_string(), "5".to_string())]);
                assert_eq!(format, ChartFormat::Svg);
                assert_eq!(database.candidates(), &["duckdb://memory".to_string()]);
            }
            _ => panic!("expected chart command"),
        }
    }

    #[test]
    fn test_chart_requires_output() {
        assert!(Cli::try_parse_from(["heroscope", "chart", "top-powers"]).is_err());
    }
}
