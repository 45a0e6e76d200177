//! portfolio-concierge CLI: HTTP server and ingestion commands.
//!
//! Logging: `RUST_LOG` overrides the configured `server.log_level`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use portfolio_concierge::application::handlers::ingestion::{
    BuildTaxonomyCommand, IngestPortfolioCommand, IngestionReport,
};
use portfolio_concierge::bootstrap::Services;
use portfolio_concierge::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "portfolio-concierge", version, about = "Portfolio chat assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve,
    /// Rebuild the knowledge collection from portfolio exports.
    #[command(subcommand)]
    Ingest(IngestCommand),
}

#[derive(Debug, Subcommand)]
enum IngestCommand {
    /// One passage per section chunk.
    Sections {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Also index an LLM summary of each section.
        #[arg(long)]
        summarize: bool,
    },
    /// One evidence passage per master-taxonomy category.
    Taxonomy { file: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    if let Err(err) = config.validate() {
        tracing::error!(error = %err, "invalid configuration");
        return ExitCode::FAILURE;
    }

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "exiting with error");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = if config.is_production() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

async fn run(command: Command, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let services = Services::build(config).await?;

    match command {
        Command::Serve => serve(&services, config).await,
        Command::Ingest(IngestCommand::Sections { files, summarize }) => {
            let report = services
                .ingest_portfolio_handler()
                .handle(IngestPortfolioCommand {
                    sources: files,
                    summarize,
                })
                .await?;
            print_report(&report)
        }
        Command::Ingest(IngestCommand::Taxonomy { file }) => {
            let report = services
                .build_taxonomy_handler()
                .handle(BuildTaxonomyCommand {
                    sources: vec![file],
                })
                .await?;
            print_report(&report)
        }
    }
}

async fn serve(services: &Services, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.server.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "listening (Ctrl+C to stop)");

    axum::serve(listener, services.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn print_report(report: &IngestionReport) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        collection = %report.collection,
        total_passages = report.total_passages,
        "ingestion finished"
    );
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable, waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("shutdown signal received");
}
