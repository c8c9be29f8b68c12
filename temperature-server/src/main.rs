use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use temperature_server::config::Settings;
use temperature_server::dataset::{QueryEngine, TableCache};
use temperature_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    let settings = Settings::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.env.default_log_filter().into()),
        )
        .with_target(true)
        .init();

    if !settings.csv_path.exists() {
        tracing::warn!(
            "CSV_PATH {} does not exist yet; data endpoints will fail until it does",
            settings.csv_path.display()
        );
    }

    // One cache for the whole process, shared by every request
    let engine = QueryEngine::new(Arc::new(TableCache::new()));

    let addr = settings.bind_addr;
    info!(
        "{} ({}) serving {} on http://{addr}",
        settings.app_name,
        settings.env,
        settings.csv_path.display()
    );
    info!("API Endpoints:");
    info!("  GET  /api/health");
    info!("  GET  /api/stations");
    info!("  GET  /api/analytics/summary?stations=..&start_year=..&end_year=..");
    info!("  GET  /api/data/range");
    info!("  GET  /api/data/monthly?stations=..&start_year=..&end_year=..");
    info!("  GET  /api/data/annual?stations=..&start_year=..&end_year=..&include_std=..");

    let app = create_router(AppState::new(engine, settings));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
