use async_trait::async_trait;
use serde::Serialize;
use xyb_core::{Action, ClockRecord, Webhook};

use crate::channel::NotifyError;

#[derive(Serialize)]
struct WebhookEvent<'a> {
    event: Action,
    record: &'a ClockRecord,
}

/// Posts every account record as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpWebhook {
    http: reqwest::Client,
    url: String,
}

impl HttpWebhook {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(NotifyError::ClientBuild)?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    async fn post(&self, event: Action, record: &ClockRecord) -> anyhow::Result<()> {
        let response = self
            .http
            .post(&self.url)
            .json(&WebhookEvent { event, record })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("webhook answered {status}");
        }
        tracing::debug!(%event, account = %record.account, "webhook delivered");
        Ok(())
    }
}

#[async_trait]
impl Webhook for HttpWebhook {
    async fn on_sign_in(&self, record: &ClockRecord) -> anyhow::Result<()> {
        self.post(Action::SignIn, record).await
    }

    async fn on_sign_out(&self, record: &ClockRecord) -> anyhow::Result<()> {
        self.post(Action::SignOut, record).await
    }
}
