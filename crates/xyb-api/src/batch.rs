//! Runs one task per configured account and collects the results.
//!
//! Accounts are processed one at a time. Any error while building or using an
//! account's session is logged and counted against that account only; the
//! batch always reaches the last account. Webhook events go out once every
//! account has been processed.

use std::time::{Duration, Instant};

use tracing::Instrument;
use xyb_core::{AccountConfig, Action, ClockRecord, TaskReport, Webhook};

use crate::api::{ApiConfig, HttpTransport, Transport};
use crate::error::ClientError;
use crate::session::{Session, SessionOptions};
use crate::sign::SignatureEngine;

/// Creates an unauthenticated session for an account.
pub trait SessionFactory: Send + Sync {
    type Transport: Transport;

    fn create(&self, account: &AccountConfig) -> Result<Session<Self::Transport>, ClientError>;
}

/// Factory giving every account its own reqwest client and cookie jar.
#[derive(Debug, Clone, Default)]
pub struct HttpSessionFactory {
    api: ApiConfig,
    signer: SignatureEngine,
}

impl HttpSessionFactory {
    pub fn new(api: ApiConfig) -> Self {
        Self {
            api,
            signer: SignatureEngine::default(),
        }
    }
}

impl SessionFactory for HttpSessionFactory {
    type Transport = HttpTransport;

    fn create(&self, account: &AccountConfig) -> Result<Session<HttpTransport>, ClientError> {
        let transport = HttpTransport::new(self.api.clone())?;
        Ok(Session::new(
            account.clone(),
            transport,
            SessionOptions {
                signer: self.signer.clone(),
                report_behavior: self.api.report_behavior,
            },
        ))
    }
}

/// One unit of work in a batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchTask<'a> {
    pub account: &'a AccountConfig,
    pub action: Action,
    pub overwrite: bool,
}

/// Aggregate outcome of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub records: Vec<ClockRecord>,
    /// Webhook events that raised an error.
    pub webhook_failures: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    pub const fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Appends another report, e.g. sign-in and sign-out batches of one run.
    pub fn merge(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.records.extend(other.records);
        self.webhook_failures += other.webhook_failures;
        self.elapsed += other.elapsed;
    }
}

/// Drives sessions for a list of accounts.
#[derive(Debug)]
pub struct BatchCoordinator<F, W> {
    factory: F,
    webhook: W,
}

impl<F: SessionFactory, W: Webhook> BatchCoordinator<F, W> {
    pub const fn new(factory: F, webhook: W) -> Self {
        Self { factory, webhook }
    }

    /// Runs `action` for every account with a shared `overwrite` flag.
    pub async fn run(&self, accounts: &[AccountConfig], action: Action, overwrite: bool) -> BatchReport {
        let tasks: Vec<_> = accounts
            .iter()
            .map(|account| BatchTask {
                account,
                action,
                overwrite,
            })
            .collect();
        self.run_tasks(&tasks).await
    }

    /// Runs each task in order, then emits one webhook event per task.
    pub async fn run_tasks(&self, tasks: &[BatchTask<'_>]) -> BatchReport {
        let started = Instant::now();
        let mut report = BatchReport::default();

        for (index, task) in tasks.iter().enumerate() {
            let record = self.run_task(index, task).await;
            if record.result {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
            report.records.push(record);
        }
        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "batch finished"
        );

        for record in &report.records {
            if let Err(err) = self.webhook.dispatch(record).await {
                report.webhook_failures += 1;
                tracing::warn!(account = %record.account, "webhook failed: {err:#}");
            }
        }

        report.elapsed = started.elapsed();
        report
    }

    async fn run_task(&self, index: usize, task: &BatchTask<'_>) -> ClockRecord {
        let mut record = ClockRecord::new(task.account.label(), task.action);
        let span = tracing::info_span!(
            "account",
            index,
            account = %record.account,
            user = tracing::field::Empty,
        );

        async {
            let mut session = match self.factory.create(task.account) {
                Ok(session) => session,
                Err(err) => {
                    tracing::error!(kind = err.kind(), "could not create session: {err}");
                    record.error = Some(format!("{}: {err}", err.kind()));
                    return;
                }
            };

            let result = execute(&mut session, task.action, task.overwrite).await;
            session.fill_record(&mut record);
            match result {
                Ok(report) => {
                    record.result = report.success;
                    record.outcome = Some(report.outcome);
                }
                Err(err) if err.is_expected() => {
                    tracing::warn!(kind = err.kind(), "{err}");
                    record.error = Some(format!("{}: {err}", err.kind()));
                }
                Err(err) => {
                    tracing::error!(kind = err.kind(), "{} failed: {err}", task.action);
                    record.error = Some(format!("{}: {err}", err.kind()));
                }
            }
        }
        .instrument(span)
        .await;

        record
    }
}

async fn execute<T: Transport>(
    session: &mut Session<T>,
    action: Action,
    overwrite: bool,
) -> Result<TaskReport, ClientError> {
    session.login().await?;
    session.load_profile().await?;
    session.load_clock_plan().await?;
    session.refresh_clock_state().await?;
    match action {
        Action::SignIn => session.sign_in(overwrite).await,
        Action::SignOut => session.sign_out(overwrite).await,
    }
}
