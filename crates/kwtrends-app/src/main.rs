//! Main entry point for kwtrends.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kwtrends_app::Session;
use kwtrends_common::{init_logging, LogFormat};
use kwtrends_config::{Config, ConfigLoader, CsvLayout, ExportConfig};
use kwtrends_data::BatchStatus;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "kwtrends",
    version,
    about = "Google Trends interest over time for a spreadsheet of keywords",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, pretty, json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the keywords found in an uploaded file
    Keywords {
        /// CSV or spreadsheet with a "Keywords" column
        file: PathBuf,
    },

    /// Fetch trends for every keyword and write CSV, PNG and chart JSON
    Analyze {
        /// CSV or spreadsheet with a "Keywords" column
        file: PathBuf,

        /// Directory the downloads are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Keywords per provider query (1-5)
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// CSV layout (wide, long)
        #[arg(long)]
        csv_layout: Option<CsvLayout>,

        /// Geography code, e.g. DE or US
        #[arg(long)]
        geo: Option<String>,

        /// Provider timeframe, e.g. "today 3-m"
        #[arg(long)]
        timeframe: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    init_logging(&config.logging).context("failed to initialize logging")?;

    info!("kwtrends {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Keywords { file } => list_keywords(config, &file).await,
        Commands::Analyze {
            file,
            out_dir,
            batch_size,
            csv_layout,
            geo,
            timeframe,
        } => {
            if let Some(size) = batch_size {
                config.batching.batch_size = size;
            }
            if let Some(layout) = csv_layout {
                config.export.csv_layout = layout;
            }
            if let Some(geo) = geo {
                config.provider.geo = geo;
            }
            if let Some(timeframe) = timeframe {
                config.provider.timeframe = timeframe;
            }
            analyze(config, &file, &out_dir).await
        }
    }
}

async fn read_upload(file: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))
}

async fn list_keywords(config: Config, file: &Path) -> Result<()> {
    let bytes = read_upload(file).await?;
    let mut session = Session::new(config)?;
    for keyword in session.upload(&bytes)? {
        println!("{keyword}");
    }
    Ok(())
}

async fn analyze(config: Config, file: &Path, out_dir: &Path) -> Result<()> {
    let bytes = read_upload(file).await?;
    let export = config.export.clone();

    let mut session = Session::new(config)?;
    session.upload(&bytes)?;
    session.run_analysis().await?;

    for path in write_downloads(&session, &export, out_dir).await? {
        println!("wrote {}", path.display());
    }
    print_report(&session);
    Ok(())
}

/// Write the CSV, PNG and chart JSON downloads into `out_dir`.
async fn write_downloads(session: &Session, export: &ExportConfig, out_dir: &Path) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let downloads = [
        (&export.csv_file_name, session.download_csv()?),
        (&export.png_file_name, session.download_png()?),
        (&export.chart_file_name, session.download_chart_json()?),
    ];
    let mut written = Vec::with_capacity(downloads.len());
    for (name, bytes) in downloads {
        let path = out_dir.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn print_report(session: &Session) {
    if let Some(outcome) = session.outcome() {
        for report in &outcome.reports {
            match &report.status {
                BatchStatus::Fetched { rows, cached } => println!(
                    "batch {} {}: {} rows{}",
                    report.number,
                    report.batch,
                    rows,
                    if *cached { " (cached)" } else { "" }
                ),
                BatchStatus::Failed(e) => println!("batch {} {}: {}", report.number, report.batch, e),
            }
        }

        let failed = outcome.failed_keywords();
        if !failed.is_empty() {
            let names: Vec<&str> = failed.iter().map(|k| k.as_str()).collect();
            eprintln!("Failed keywords: {}", names.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwtrends_common::test_utils::{create_temp_dir, trends_fixtures::keyword_csv};
    use kwtrends_common::FetchError;
    use kwtrends_data::testing::ScriptedProvider;
    use std::sync::Arc;

    async fn analyzed(provider: ScriptedProvider, terms: &[&str]) -> Session {
        let mut session = Session::with_provider(Config::default(), Arc::new(provider)).unwrap();
        session.upload(&keyword_csv(terms)).unwrap();
        session.run_analysis().await.unwrap();
        session
    }

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "kwtrends", "analyze", "words.xlsx", "-o", "out", "-b", "3", "--csv-layout", "long",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                out_dir,
                batch_size,
                csv_layout,
                ..
            } => {
                assert_eq!(out_dir, PathBuf::from("out"));
                assert_eq!(batch_size, Some(3));
                assert_eq!(csv_layout, Some(CsvLayout::Long));
            }
            Commands::Keywords { .. } => panic!("expected analyze"),
        }
    }

    #[tokio::test]
    async fn test_downloads_land_in_nested_out_dir() {
        let session = analyzed(ScriptedProvider::new(), &["cats", "dogs"]).await;
        let dir = create_temp_dir();
        let out_dir = dir.path().join("reports").join("today");

        let written = write_downloads(&session, &ExportConfig::default(), &out_dir).await.unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["google_trends_data.csv", "google_trends_plot.png", "google_trends_chart.json"]
        );
        let csv = std::fs::read_to_string(&written[0]).unwrap();
        assert!(csv.starts_with("date,cats,dogs\n"));
        assert!(std::fs::read(&written[1]).unwrap().starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn test_downloads_written_when_every_batch_failed() {
        let provider = ScriptedProvider::new().failing(&["cats"], FetchError::unavailable("offline"));
        let session = analyzed(provider, &["cats"]).await;
        let dir = create_temp_dir();

        let written = write_downloads(&session, &ExportConfig::default(), dir.path()).await.unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "date\n");
    }
}
