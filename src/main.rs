use anyhow::Result;
use statsink::*;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// One flush event as delivered by the collector host: epoch seconds plus
/// the raw metrics batch.
#[derive(Debug, serde::Deserialize)]
struct FlushLine {
    timestamp: u64,
    metrics: models::MetricsPayload,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let store = snapshot_repo::FileSnapshotRepo::open(&app_config.sink.file_directory)?;
    let aggregate_repo = aggregate_repo::AggregateRepo::open(&app_config.sink.file_directory)?;

    let startup_secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    let file_pipeline = pipeline::FilePipeline::new(
        store,
        aggregate_repo,
        app_config.sink.retention_ms,
        startup_secs,
    );

    let (tx, rx) = tokio::sync::mpsc::channel(app_config.monitoring.event_queue_capacity);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let dispatcher = pipeline::spawn(
        rx,
        file_pipeline,
        pipeline::DispatcherConfig {
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
        shutdown_rx,
    );

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        directory = %app_config.sink.file_directory,
        retention_ms = app_config.sink.retention_ms,
        "statsink ready; reading flush events from stdin"
    );

    // The collector host boundary: one JSON flush event per line on stdin.
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut interrupted = false;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => match serde_json::from_str::<FlushLine>(&line) {
                        Ok(flush) => {
                            let event = pipeline::SinkEvent::Flush {
                                timestamp_secs: flush.timestamp,
                                metrics: flush.metrics,
                            };
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "discarding unparseable flush line");
                        }
                    },
                    None => break,
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Received shutdown signal");
                interrupted = true;
                break;
            }
        }
    }

    // On EOF, close the channel and let the dispatcher drain queued events;
    // on a signal, stop it immediately.
    drop(tx);
    if interrupted {
        let _ = shutdown_tx.send(());
    }
    let _ = dispatcher.await;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
