//! The long-running `run` command.

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use dropwatch_core::{AppConfig, SiteDirectory};
use dropwatch_monitor::{LoggingTaskSink, ManagerOptions, MonitorManager};

/// Loads the monitors file, starts every fleet, and polls until ctrl-c or
/// SIGTERM. Logs a stats summary every `stats_every` seconds when non-zero.
///
/// # Errors
///
/// Returns an error if the monitors file or targets document cannot be
/// loaded, or if no store could be registered.
pub(crate) async fn run_monitor(
    config: &AppConfig,
    monitors_path: &Path,
    stats_every: u64,
) -> anyhow::Result<()> {
    let monitors = dropwatch_core::load_monitors(monitors_path)?;
    let registry = crate::load_registry(config)?;

    let mut manager = MonitorManager::new(
        Arc::new(RwLock::new(registry)),
        SiteDirectory::builtin(),
        ManagerOptions::from_app_config(config),
    );
    manager.set_task_sink(Arc::new(LoggingTaskSink));
    let stores = manager.configure(&monitors)?;
    if stores == 0 {
        anyhow::bail!(
            "monitors file {} registers no stores",
            monitors_path.display()
        );
    }
    tracing::info!(
        env = %config.env,
        monitors = %monitors_path.display(),
        stores,
        "monitor configured"
    );

    manager.start();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    if stats_every == 0 {
        shutdown.await;
    } else {
        let period = Duration::from_secs(stats_every);
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => log_summary(&manager),
            }
        }
    }

    manager.stop().await;
    println!("{}", serde_json::to_string_pretty(&manager.stats())?);
    Ok(())
}

fn log_summary(manager: &MonitorManager) {
    let stats = manager.stats();
    let (successes, errors): (u64, u64) = stats
        .fleets
        .values()
        .flatten()
        .fold((0, 0), |(ok, err), s| (ok + s.success_count, err + s.error_count));
    tracing::info!(
        events = stats.total_events,
        high_priority = stats.high_priority_events,
        tasks = stats.tasks_triggered,
        polls_ok = successes,
        polls_failed = errors,
        "monitor summary"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping monitors");
}
