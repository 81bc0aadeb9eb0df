// src/main.rs

use std::{process::ExitCode, sync::Arc};

use assessment_export::{
    ExportOutcome, ExportService,
    config::Config,
    error::AppError,
    routes,
    state::AppState,
    store::{PgResultStore, ResultStore},
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "assessment-export", about = "Export completed assessment results to CSV")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the completed-tests CSV for one user and exit.
    Export {
        #[arg(long)]
        user_id: i64,
    },
    /// Serve the export over HTTP.
    Serve,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let result = match cli.command {
        Command::Export { user_id } => run_export(&config, user_id).await,
        Command::Serve => serve(config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Error ({}): {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

async fn connect_store(config: &Config) -> Result<Arc<dyn ResultStore>, AppError> {
    let store = PgResultStore::connect(config.require_database_url()?).await?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

async fn run_export(config: &Config, user_id: i64) -> Result<(), AppError> {
    let store = connect_store(config).await?;
    let export = ExportService::from_config(store, config);

    match export.export_completed_tests(user_id).await? {
        ExportOutcome::NothingToExport => {
            tracing::info!("No completed tests found for the given user ID.");
        }
        ExportOutcome::Written(summary) => {
            tracing::info!(
                "CSV file generated: {} (rows: {}, corrected statuses: {}, failed status updates: {}, filled gaps: {})",
                summary.path.display(),
                summary.rows,
                summary.corrected_statuses,
                summary.failed_status_updates.len(),
                summary.filled_gaps
            );
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<(), AppError> {
    let store = connect_store(&config).await?;

    let state = AppState {
        export: Arc::new(ExportService::from_config(store, &config)),
    };

    let app = routes::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
