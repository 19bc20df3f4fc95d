//! Fan-out of one message to every configured channel.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channel::{Channel, Delivery, Message, NotifyError};
use crate::email::{Email, EmailConfig};
use crate::pushplus::{Pushplus, PushplusConfig};
use crate::qmsg::{Qmsg, QmsgConfig};

const PUSH_TIMEOUT: Duration = Duration::from_secs(15);

/// Channel settings. An absent block disables the channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub pushplus: Option<PushplusConfig>,
    pub qmsg: Option<QmsgConfig>,
    pub email: Option<EmailConfig>,
}

/// What one channel did with a message.
#[derive(Debug)]
pub struct ChannelReport {
    pub channel: &'static str,
    pub result: Result<Delivery, NotifyError>,
}

pub struct Notifier {
    channels: Vec<Box<dyn Channel>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.channels.iter().map(|c| c.name()).collect();
        f.debug_struct("Notifier").field("channels", &names).finish()
    }
}

impl Notifier {
    pub fn new(channels: Vec<Box<dyn Channel>>) -> Self {
        Self { channels }
    }

    /// Builds the channels named in `config`, sharing one HTTP client.
    pub fn from_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(PUSH_TIMEOUT)
            .build()
            .map_err(NotifyError::ClientBuild)?;

        let mut channels: Vec<Box<dyn Channel>> = Vec::new();
        if let Some(pushplus) = &config.pushplus {
            channels.push(Box::new(Pushplus::new(http.clone(), pushplus)));
        }
        if let Some(qmsg) = &config.qmsg {
            channels.push(Box::new(Qmsg::new(http, qmsg)));
        }
        if let Some(email) = &config.email {
            channels.push(Box::new(Email::new(email)));
        }
        Ok(Self::new(channels))
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Sends `message` through every channel. One channel failing never
    /// prevents the others from being tried.
    pub async fn send(&self, message: &Message) -> Vec<ChannelReport> {
        let mut reports = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let result = channel.send(message).await;
            match &result {
                Ok(Delivery::Sent) => tracing::info!(channel = channel.name(), "notification sent"),
                Ok(delivery) => tracing::warn!(channel = channel.name(), %delivery, "notification not sent"),
                Err(err) => tracing::warn!(channel = channel.name(), "notification failed: {err}"),
            }
            reports.push(ChannelReport {
                channel: channel.name(),
                result,
            });
        }
        reports
    }
}

/// One `channel|result` line per report.
pub fn render_reports(reports: &[ChannelReport]) -> String {
    let mut out = String::from("push results");
    for report in reports {
        let _ = match &report.result {
            Ok(delivery) => write!(out, "\n{}|{delivery}", report.channel),
            Err(err) => write!(out, "\n{}|error|{err}", report.channel),
        };
    }
    out
}
