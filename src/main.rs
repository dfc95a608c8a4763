use anyhow::Context;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use todo_rest::{SharedData, app_env, db, logging, persistence, routes};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let dotenv_loaded = dotenv().is_ok();

    let otel_exporters = logging::exporters_from_env()?;
    let exporting = otel_exporters.is_some();
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters);

    if !dotenv_loaded {
        info!("No .env file found, using the process environment only.");
    }
    if !exporting {
        info!("OpenTelemetry export endpoints not configured, logging to stdout only.");
    }

    let db_url = env::var(app_env::DB_URL).context("reading the database URL from the environment")?;
    let max_connections = match env::var(app_env::DB_MAX_CONNECTIONS) {
        Ok(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("{} must be a positive integer", app_env::DB_MAX_CONNECTIONS))?,
        Err(_) => app_env::DEFAULT_DB_MAX_CONNECTIONS,
    };
    let server_address = env::var(app_env::SERVER_ADDRESS)
        .unwrap_or_else(|_| app_env::DEFAULT_SERVER_ADDRESS.to_owned());

    let db_pool = db::connect_sqlx(&db_url, max_connections).await?;
    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db_pool),
    });
    let router = routes::build_router(shared_data);

    let listener = TcpListener::bind(&server_address)
        .await
        .with_context(|| format!("binding to {server_address}"))?;
    info!(address = %server_address, "Starting server.");

    axum::serve(listener, router)
        .await
        .context("serving HTTP requests")
}
