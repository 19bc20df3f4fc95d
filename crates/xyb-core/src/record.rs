//! Per-account batch results and the webhook collaborator that consumes them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clock::{Action, ClockState, Outcome};

/// What a sign-in/sign-out call reports back to its caller.
///
/// `success` collapses skips and refusals into `false`; `outcome` keeps the
/// distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReport {
    pub success: bool,
    pub outcome: Outcome,
}

impl From<Outcome> for TaskReport {
    fn from(outcome: Outcome) -> Self {
        Self {
            success: outcome.is_success(),
            outcome,
        }
    }
}

/// One account's entry in a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockRecord {
    /// Masked account label from the configuration.
    pub account: String,
    pub loginer_id: Option<String>,
    pub user_name: Option<String>,
    pub phone: Option<String>,
    pub train_type: Option<String>,
    pub post_state: Option<String>,
    pub action: Action,
    pub result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// State after the action, when the session got far enough to read it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_state: Option<ClockState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClockRecord {
    /// A record with only the identity and requested action filled in.
    #[must_use]
    pub fn new(account: impl Into<String>, action: Action) -> Self {
        Self {
            account: account.into(),
            loginer_id: None,
            user_name: None,
            phone: None,
            train_type: None,
            post_state: None,
            action,
            result: false,
            outcome: None,
            clock_state: None,
            error: None,
        }
    }

    /// Name to show in summaries.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(&self.account)
    }
}

/// Receives one event per account once a batch has finished.
#[async_trait]
pub trait Webhook: Send + Sync {
    async fn on_sign_in(&self, record: &ClockRecord) -> anyhow::Result<()>;

    async fn on_sign_out(&self, record: &ClockRecord) -> anyhow::Result<()>;

    /// Routes a record by its action.
    async fn dispatch(&self, record: &ClockRecord) -> anyhow::Result<()> {
        match record.action {
            Action::SignIn => self.on_sign_in(record).await,
            Action::SignOut => self.on_sign_out(record).await,
        }
    }
}

#[async_trait]
impl<W: Webhook> Webhook for Option<W> {
    async fn on_sign_in(&self, record: &ClockRecord) -> anyhow::Result<()> {
        match self {
            Some(hook) => hook.on_sign_in(record).await,
            None => Ok(()),
        }
    }

    async fn on_sign_out(&self, record: &ClockRecord) -> anyhow::Result<()> {
        match self {
            Some(hook) => hook.on_sign_out(record).await,
            None => Ok(()),
        }
    }
}
