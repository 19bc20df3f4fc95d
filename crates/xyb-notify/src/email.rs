//! SMTP email.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use serde::{Deserialize, Serialize};

use crate::channel::{Channel, Delivery, Message, NotifyError};

const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP server, reached over implicit TLS on port 465.
    pub host: Option<String>,
    pub user: Option<String>,
    /// Password or provider authorisation code.
    pub key: Option<String>,
    /// Sender address.
    pub sender: Option<String>,
    pub sender_name: Option<String>,
    pub receivers: Vec<String>,
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("sender", &self.sender)
            .field("sender_name", &self.sender_name)
            .field("receivers", &self.receivers)
            .finish()
    }
}

/// Server, login and parsed addresses of a usable configuration.
struct Route<'a> {
    host: &'a str,
    user: &'a str,
    key: &'a str,
    from: Mailbox,
    to: Vec<Mailbox>,
}

/// Empty values and `*` placeholders count as unset.
fn filled(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && !v.contains('*'))
}

impl EmailConfig {
    fn route(&self) -> Option<Route<'_>> {
        let host = filled(self.host.as_deref())?;
        let user = filled(self.user.as_deref())?;
        let key = filled(self.key.as_deref())?;
        let sender: Address = filled(self.sender.as_deref())?.parse().ok()?;
        if self.receivers.is_empty() {
            return None;
        }
        let to = self
            .receivers
            .iter()
            .map(|r| {
                let address: Address = filled(Some(r.as_str()))?.parse().ok()?;
                Some(Mailbox::new(None, address))
            })
            .collect::<Option<Vec<_>>>()?;
        let name = self.sender_name.clone().filter(|n| !n.is_empty());
        Some(Route {
            host,
            user,
            key,
            from: Mailbox::new(name, sender),
            to,
        })
    }
}

/// HTML body with line breaks, plus the attachment as a file part.
fn compose(route: &Route<'_>, message: &Message) -> Result<lettre::Message, NotifyError> {
    let mut builder = lettre::Message::builder()
        .from(route.from.clone())
        .subject(message.title.as_str());
    for to in &route.to {
        builder = builder.to(to.clone());
    }

    let mut parts = MultiPart::mixed().singlepart(SinglePart::html(message.body.replace('\n', "<br>")));
    if let Some(attachment) = &message.attachment {
        parts = parts.singlepart(
            MailAttachment::new(attachment.name.clone())
                .body(attachment.content.clone(), ContentType::TEXT_PLAIN),
        );
    }
    Ok(builder.multipart(parts)?)
}

#[derive(Debug)]
pub struct Email {
    config: EmailConfig,
}

impl Email {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Channel for Email {
    fn name(&self) -> &'static str {
        "Email"
    }

    async fn send(&self, message: &Message) -> Result<Delivery, NotifyError> {
        let Some(route) = self.config.route() else {
            return Ok(Delivery::InvalidConfig);
        };
        let mail = compose(&route, message)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(route.host)?
            .credentials(Credentials::new(route.user.to_string(), route.key.to_string()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        transport.send(mail).await?;
        Ok(Delivery::Sent)
    }
}
