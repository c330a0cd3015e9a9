//! Camera test walkthrough
//!
//! Runs the whole flow against the synthetic camera and encoder and uploads
//! to an in-process upload server.
//!
//! Run with: cargo run --example camera_test_demo

use anyhow::Context;
use camtest::{
    logging, Environment, RecordingSession, SessionEvent, SyntheticDeviceGateway,
    SyntheticEncoderBackend,
};
use camtest_upload::{ServerConfig, UploadServer};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    println!("🎥 Camera Test Demo");
    println!("===================");

    // Upload server
    let storage_dir = std::env::temp_dir().join("camtest_demo_videos");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind upload server")?;
    let addr = listener.local_addr()?;
    let server = UploadServer::new(ServerConfig {
        bind_addr: addr,
        storage_dir: storage_dir.clone(),
        ..Default::default()
    });
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server_task = tokio::spawn(async move {
        server
            .serve(listener, async {
                let _ = shutdown_rx.await;
            })
            .await
    });
    println!("📡 Upload server on http://{}", addr);

    // Session
    let mut session = RecordingSession::builder()
        .gateway(Arc::new(SyntheticDeviceGateway::new()))
        .encoder_backend(Arc::new(SyntheticEncoderBackend::new()))
        .upload_url(&format!("http://{}/upload-test", addr))
        .countdown_secs(3)
        .build()
        .context("failed to build session")?;
    let mut events = session.events();

    session
        .initialize(&Environment::localhost())
        .await
        .context("camera initialization failed")?;
    println!(
        "✅ {} device(s), camera switch {}",
        session.devices().len(),
        if session.can_switch_camera() { "available" } else { "hidden" }
    );

    session.switch_camera().await?;
    println!("🔄 Now using the {} camera", session.facing_mode());

    session.toggle_microphone();
    session.toggle_microphone();

    session.start_recording().await?;
    while let Some(remaining) = session.next_tick().await {
        println!("⏱️  {}", remaining);
    }

    if let Some(clip) = session.staged_clip() {
        println!("📺 {}", clip.describe());
    }

    let ack = session.upload().await.context("upload failed")?;
    println!("📤 Server received {} bytes", ack.size_bytes);
    println!("   Status: {}", session.status().message);

    session.retake()?;
    session.shutdown();

    for event in events.drain() {
        if let SessionEvent::StateChanged { from, to } = event {
            info!("state: {} -> {}", from, to);
        }
    }

    let _ = shutdown_tx.send(());
    server_task
        .await
        .context("upload server task panicked")?
        .context("upload server failed")?;
    println!("🗂️  Clips stored in {}", storage_dir.display());

    Ok(())
}
