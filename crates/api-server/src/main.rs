use std::path::Path;
use std::process::ExitCode;

use api_server_lib::{app, AppState, Settings};
use sqlite::{connect, DBType};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("could not read settings from the environment: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let db_file = Path::new(settings.db_path()).join(settings.db_name());
    let pool = match connect(DBType::File(db_file.as_path())).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("could not open database {:?}: {}", db_file, e);
            return ExitCode::FAILURE;
        }
    };

    // Build server and version control integrations are wired per deployment;
    // the default deployment runs without them.
    let state = AppState::from_pool(pool, None, None);

    let addr = format!("0.0.0.0:{}", settings.http_port());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("could not bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("listening on {}", addr);
    if let Err(e) = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        error!("could not install the shutdown handler");
    }
}
