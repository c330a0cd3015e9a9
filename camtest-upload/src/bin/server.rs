//! Upload test server for the camera test

use anyhow::{Context, Result};
use camtest_upload::{ServerConfig, UploadServer};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "camtest-server")]
#[command(about = "Receives and stores clips uploaded by the camera test", version)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "CAMTEST_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Directory uploaded clips are written to
    #[arg(long, env = "CAMTEST_STORAGE_DIR", default_value = "test_videos")]
    storage_dir: PathBuf,

    /// Largest accepted upload in megabytes
    #[arg(long, env = "CAMTEST_MAX_UPLOAD_MB", default_value_t = 256)]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("camtest_upload=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig {
        bind_addr: args.bind,
        storage_dir: args.storage_dir,
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
    };

    tracing::info!("🚀 Starting camera test upload server");
    UploadServer::new(config)
        .start(shutdown_signal())
        .await
        .context("upload server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
