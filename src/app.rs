use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::{add_log, start_server, LogEntry};

pub async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();

    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
    let state = crate::infrastructure::bootstrap::setup(&config, &logs).await?;

    let server = start_server(
        state,
        logs.clone(),
        &config.server.host,
        config.server.port,
    )
    .map_err(|e| AppError::IoError(format!("Failed to start HTTP server: {}", e)))?;

    add_log(
        &logs,
        "INFO",
        "System",
        &format!(
            "HTTP server started on {}:{}",
            config.server.host, config.server.port
        ),
    );

    server.await?;
    Ok(())
}
