//! Pushplus web push.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};

use crate::channel::{Channel, Delivery, Message, NotifyError, delivery_for};

const NEW_ENDPOINT: &str = "https://www.pushplus.plus/send";
const LEGACY_ENDPOINT: &str = "https://pushplus.hxtrip.com/send";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:92.0) Gecko/20100101 Firefox/92.0";

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushplusConfig {
    /// A bare token, or a query string such as `token=..&topic=..`.
    pub parameters: Option<String>,
    /// Use the current API host instead of the legacy one.
    pub is_new: bool,
}

impl fmt::Debug for PushplusConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushplusConfig")
            .field("parameters", &self.parameters.as_ref().map(|_| "[REDACTED]"))
            .field("is_new", &self.is_new)
            .finish()
    }
}

pub struct Pushplus {
    http: reqwest::Client,
    endpoint: String,
    parameters: Option<String>,
}

impl fmt::Debug for Pushplus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pushplus")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Pushplus {
    pub fn new(http: reqwest::Client, config: &PushplusConfig) -> Self {
        let endpoint = if config.is_new {
            NEW_ENDPOINT
        } else {
            LEGACY_ENDPOINT
        };
        Self {
            http,
            endpoint: endpoint.to_string(),
            parameters: config.parameters.clone().filter(|p| !p.is_empty()),
        }
    }

    /// Sends to `endpoint` instead of the public host.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn query(&self, message: &Message) -> Option<BTreeMap<String, String>> {
        let parameters = self.parameters.as_deref()?;
        let mut query = if parameters.contains('=') {
            parse_query(parameters)
        } else {
            BTreeMap::from([("token".to_string(), parameters.to_string())])
        };
        query.insert("title".to_string(), message.title.clone());
        query.insert("content".to_string(), html_content(message));
        Some(query)
    }
}

#[async_trait]
impl Channel for Pushplus {
    fn name(&self) -> &'static str {
        "Pushplus"
    }

    async fn send(&self, message: &Message) -> Result<Delivery, NotifyError> {
        let Some(query) = self.query(message) else {
            return Ok(Delivery::InvalidConfig);
        };
        let response = self
            .http
            .post(&self.endpoint)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .query(&query)
            .send()
            .await?;
        Ok(delivery_for(response.status()))
    }
}

/// Parses `k=v&k2=v2`, dropping pairs with a blank value.
fn parse_query(raw: &str) -> BTreeMap<String, String> {
    raw.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (decode(key), decode(value)))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .collect()
}

fn decode(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Message body as Pushplus HTML, with the attachment appended.
fn html_content(message: &Message) -> String {
    let mut content = message.body.replace('\n', "</br>");
    if let Some(attachment) = &message.attachment {
        content.push_str("</br></br>");
        content.push_str(&attachment.name);
        content.push_str("</br>");
        content.push_str(&attachment.content.replace('\n', "</br>"));
    }
    content
}
