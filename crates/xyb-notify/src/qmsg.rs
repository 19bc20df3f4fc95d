//! Qmsg QQ push.

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::channel::{Channel, Delivery, Message, NotifyError, delivery_for};

const BASE_URL: &str = "https://qmsg.zendee.cn";

static KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-f]{32}$").unwrap());
static QQ_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(,\d+)*$").unwrap());

/// Qmsg filters messages containing plain digits.
const BOLD_DIGITS: [char; 10] = ['𝟎', '𝟏', '𝟐', '𝟑', '𝟒', '𝟓', '𝟔', '𝟕', '𝟖', '𝟗'];

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QmsgConfig {
    pub key: Option<String>,
    /// Comma-separated receiver QQ numbers.
    pub qq: Option<String>,
    pub is_group: bool,
}

impl fmt::Debug for QmsgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QmsgConfig")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("qq", &self.qq)
            .field("is_group", &self.is_group)
            .finish()
    }
}

impl QmsgConfig {
    /// Key and receiver list, when both are well-formed.
    fn credentials(&self) -> Option<(&str, &str)> {
        let key = self.key.as_deref().filter(|k| KEY_RE.is_match(k))?;
        let qq = self.qq.as_deref().filter(|q| QQ_RE.is_match(q))?;
        Some((key, qq))
    }

    #[cfg(test)]
    fn is_valid(&self) -> bool {
        self.credentials().is_some()
    }
}

pub struct Qmsg {
    http: reqwest::Client,
    base_url: String,
    config: QmsgConfig,
}

impl fmt::Debug for Qmsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Qmsg")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish()
    }
}

impl Qmsg {
    pub fn new(http: reqwest::Client, config: &QmsgConfig) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
            config: config.clone(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, key: &str) -> String {
        let kind = if self.config.is_group { "group" } else { "send" };
        format!("{}/{kind}/{key}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Channel for Qmsg {
    fn name(&self) -> &'static str {
        "Qmsg"
    }

    async fn send(&self, message: &Message) -> Result<Delivery, NotifyError> {
        let Some((key, qq)) = self.config.credentials() else {
            return Ok(Delivery::InvalidConfig);
        };
        let text = embolden_digits(&format!("{}\n{}", message.title, message.body));
        let response = self
            .http
            .post(self.url(key))
            .form(&[("msg", text.as_str()), ("qq", qq)])
            .send()
            .await?;
        Ok(delivery_for(response.status()))
    }
}

fn embolden_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => BOLD_DIGITS[d as usize],
            _ => c,
        })
        .collect()
}
