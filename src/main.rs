//! Payroll engine HTTP server.

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::{ConfigLoader, ServerSettings};
use payroll_engine::processing::PayrollService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = ServerSettings::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_line_number(true)
        .init();

    let config = ConfigLoader::load(&settings.config_dir).inspect_err(|err| {
        error!(
            config_dir = %settings.config_dir.display(),
            error = %err,
            "Failed to load statutory configuration"
        );
    })?;
    let years: Vec<String> = config
        .financial_years()
        .iter()
        .map(ToString::to_string)
        .collect();

    let shutdown = CancellationToken::new();
    let state = AppState::new(PayrollService::in_memory(config), shutdown.clone());
    let app = create_router(state);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    info!(
        bind_addr = %settings.bind_addr,
        financial_years = ?years,
        "Payroll engine listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
