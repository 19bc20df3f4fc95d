//! Shared batch execution: run tasks, push the summary, save the log.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use xyb_api::{BatchCoordinator, BatchReport, BatchTask, HttpSessionFactory};
use xyb_core::{AccountConfig, Action};
use xyb_notify::{HttpWebhook, Notifier, render_reports, summarize};

use crate::Config;
use crate::logging::LogCapture;

/// One task per account for `action`, sharing one `overwrite` flag.
pub fn all_accounts(accounts: &[AccountConfig], action: Action, overwrite: bool) -> Vec<BatchTask<'_>> {
    accounts
        .iter()
        .map(|account| BatchTask {
            account,
            action,
            overwrite,
        })
        .collect()
}

/// Runs `tasks` against the platform, then notifies and saves the log.
pub async fn execute(
    config: &Config,
    label: &str,
    tasks: &[BatchTask<'_>],
    capture: &LogCapture,
    started: DateTime<Local>,
) -> Result<BatchReport> {
    tracing::info!(tasks = tasks.len(), "starting {label}");
    let webhook = config
        .webhook_url
        .as_deref()
        .map(HttpWebhook::new)
        .transpose()
        .context("failed to build webhook client")?;
    let coordinator = BatchCoordinator::new(HttpSessionFactory::new(config.api.clone()), webhook);

    let report = coordinator.run_tasks(tasks).await;
    tracing::info!(
        succeeded = report.succeeded,
        total = report.total(),
        elapsed = format!("{:.2}s", report.elapsed.as_secs_f64()),
        "{label} finished"
    );

    notify(config, label, &report, capture, started).await?;
    Ok(report)
}

async fn notify(
    config: &Config,
    label: &str,
    report: &BatchReport,
    capture: &LogCapture,
    started: DateTime<Local>,
) -> Result<()> {
    let notifier = Notifier::from_config(&config.notify).context("failed to build notifier")?;
    if !notifier.is_empty() {
        let message = summarize(label, report, Some(capture.attachment(started)));
        let reports = notifier.send(&message).await;
        tracing::info!("{}", render_reports(&reports));
    }

    if let Some(dir) = &config.log_dir {
        match capture.save(dir, started) {
            Ok(path) => tracing::info!(path = %path.display(), "log saved"),
            Err(err) => tracing::warn!(dir = %dir.display(), "failed to save log: {err}"),
        }
    }
    Ok(())
}
