use anyhow::Context as _;
use dotenvy::dotenv;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod cli;
mod config;
mod logging;
mod shutdown;
mod voice;

use cli::build_cli;
use config::RecorderConfig;
use voice::{
    AudioBackend, BackendError, CpalBackend, SegmentController, SegmentWorker, SEGMENT_DURATION,
};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let matches = build_cli().get_matches();
    let config = RecorderConfig::from_env(&matches);

    let _log_guard = match logging::init(&config.log_path, config.debug) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("rspi-mic-recorder failed to start, exiting");
            return ExitCode::FAILURE;
        }
    };

    info!(
        log_path = %config.log_path.display(),
        debug_mode = config.debug,
        "rspi-mic-recorder started successfully"
    );

    match record(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn record(config: RecorderConfig) -> anyhow::Result<()> {
    let device = config.input_device.clone();
    record_with(config, move || {
        CpalBackend::connect(device.as_deref()).map(|b| Arc::new(b) as Arc<dyn AudioBackend>)
    })
    .await
}

async fn record_with(
    config: RecorderConfig,
    connect: impl FnOnce() -> Result<Arc<dyn AudioBackend>, BackendError>,
) -> anyhow::Result<()> {
    // No audio client means nothing to record; this is not treated as a crash.
    let backend = match connect() {
        Ok(backend) => backend,
        Err(e) => {
            error!("{}", e);
            error!("Failed to create audio client, exiting...");
            return Ok(());
        }
    };

    std::fs::create_dir_all(&config.recordings_dir).with_context(|| {
        format!(
            "Failed to create recordings directory {}",
            config.recordings_dir.display()
        )
    })?;

    let shutdown = CancellationToken::new();
    shutdown::install(shutdown.clone());

    info!(
        recordings_dir = %config.recordings_dir.display(),
        segment_secs = SEGMENT_DURATION.as_secs(),
        "Recording started"
    );

    let worker = SegmentWorker::new(Arc::clone(&backend), &config.recordings_dir);
    let summary = SegmentController::new(worker, shutdown).run().await;

    backend.close();

    info!(
        segments = summary.segments,
        recorded = summary.recorded,
        stream_failures = summary.stream_failures,
        file_failures = summary.file_failures,
        unacknowledged = summary.unacknowledged,
        frames = summary.frames,
        "Main done"
    );

    Ok(())
}
