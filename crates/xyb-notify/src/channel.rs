use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Notification errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Mail could not be assembled.
    #[error("failed to build mail: {0}")]
    Mail(#[from] lettre::error::Error),
    /// SMTP delivery failed.
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A file carried alongside a message, e.g. the captured run log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub content: String,
}

/// A batch-level notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

/// How a channel handled a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The push service answered with a non-success HTTP status.
    Rejected { status: u16 },
    /// The channel's configuration is incomplete or malformed; nothing was sent.
    InvalidConfig,
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => f.write_str("sent"),
            Self::Rejected { status } => write!(f, "rejected (HTTP {status})"),
            Self::InvalidConfig => f.write_str("invalid config"),
        }
    }
}

/// A push back-end.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Label used in logs and delivery reports.
    fn name(&self) -> &'static str;

    async fn send(&self, message: &Message) -> Result<Delivery, NotifyError>;
}

pub(crate) fn delivery_for(status: reqwest::StatusCode) -> Delivery {
    if status.is_success() {
        Delivery::Sent
    } else {
        Delivery::Rejected {
            status: status.as_u16(),
        }
    }
}
