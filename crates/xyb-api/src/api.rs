//! Remote endpoints, the tagged response type and the HTTP transport.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "https://xcx.xybsyw.com";
pub const DEFAULT_BEHAVIOR_URL: &str = "https://app.xybsyw.com";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Mini-program user agent the platform expects.
pub const CLIENT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/53.0.2785.143 Safari/537.36 MicroMessenger/7.0.9.501 NetType/WIFI MiniProgramEnv/Windows WindowsWechat";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Form-encoded request body, kept sorted by field name.
pub type Form = BTreeMap<String, String>;

/// Builds a [`Form`], coercing every value to its string form.
pub fn form<I, K, V>(pairs: I) -> Form
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.to_string()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// The fixed endpoint set of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    WeChatLogin,
    PasswordLogin,
    AccountInfo,
    IpLookup,
    Plan,
    PlanDetail,
    /// Click-event telemetry. Deprecated by the platform.
    Behavior,
    AutoClock,
    NewClock,
    UpdateClock,
}

impl Endpoint {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::WeChatLogin => "/login/login!wx.action",
            Self::PasswordLogin => "/login/login.action",
            Self::AccountInfo => "/account/LoadAccountInfo.action",
            Self::IpLookup => "/behavior/Duration!getIp.action",
            Self::Plan => "/student/clock/GetPlan!getDefault.action",
            Self::PlanDetail => "/student/clock/GetPlan!detail.action",
            Self::Behavior => "/behavior/Duration.action",
            Self::AutoClock => "/student/clock/Post!autoClock.action",
            Self::NewClock => "/student/clock/PostNew.action",
            Self::UpdateClock => "/student/clock/PostNew!updateClock.action",
        }
    }

    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::AccountInfo | Self::IpLookup | Self::Plan => Method::Get,
            _ => Method::Post,
        }
    }

    /// Short operation name used in errors and logs.
    #[must_use]
    pub const fn operation(self) -> &'static str {
        match self {
            Self::WeChatLogin | Self::PasswordLogin => "login",
            Self::AccountInfo => "load account info",
            Self::IpLookup => "ip lookup",
            Self::Plan => "load plan",
            Self::PlanDetail => "load plan detail",
            Self::Behavior => "behavior report",
            Self::AutoClock => "auto clock",
            Self::NewClock => "new clock",
            Self::UpdateClock => "update clock",
        }
    }
}

/// Connection settings shared by every session of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub behavior_url: String,
    pub timeout_secs: u64,
    /// Send the deprecated behavior report before each submission.
    pub report_behavior: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            behavior_url: DEFAULT_BEHAVIOR_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            report_behavior: false,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn url(&self, endpoint: Endpoint) -> String {
        let base = match endpoint {
            Endpoint::Behavior => &self.behavior_url,
            _ => &self.base_url,
        };
        format!("{}{}", base.trim_end_matches('/'), endpoint.path())
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One outgoing call: endpoint, body and extra headers (the signature).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub form: Form,
    pub headers: Vec<(&'static str, String)>,
}

/// Classified platform response.
///
/// Only a JSON body whose top-level `code` is the string `"200"` is a success.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Success { data: Value },
    Failure { code: Option<String>, raw_body: String },
}

impl ApiResponse {
    pub fn parse(body: &str) -> Self {
        let Ok(json) = serde_json::from_str::<Value>(body) else {
            return Self::Failure {
                code: None,
                raw_body: body.to_string(),
            };
        };
        match json.get("code") {
            Some(Value::String(code)) if code == "200" => Self::Success {
                data: json.get("data").cloned().unwrap_or(Value::Null),
            },
            Some(Value::String(code)) => Self::Failure {
                code: Some(code.clone()),
                raw_body: body.to_string(),
            },
            Some(other) => Self::Failure {
                code: Some(other.to_string()),
                raw_body: body.to_string(),
            },
            None => Self::Failure {
                code: None,
                raw_body: body.to_string(),
            },
        }
    }

    /// Returns `data` on success, or a protocol error naming `endpoint`.
    pub fn into_data(self, endpoint: Endpoint) -> Result<Value, ClientError> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Failure { code, raw_body } => Err(ClientError::Protocol {
                operation: endpoint.operation(),
                code,
                body: raw_body,
            }),
        }
    }
}

/// Sends requests to the platform.
///
/// Each account gets its own transport so cookies never leak between sessions.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// reqwest-backed transport with a per-instance cookie jar.
pub struct HttpTransport {
    http: reqwest::Client,
    config: ApiConfig,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(config.timeout())
            .build()
            .map_err(ClientError::ClientBuild)?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.config.url(request.endpoint);
        tracing::debug!(endpoint = ?request.endpoint, %url, "sending request");

        let mut builder = match request.endpoint.method() {
            Method::Get => self.http.get(&url).query(&request.form),
            Method::Post => self.http.post(&url).form(&request.form),
        };
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::debug!(%status, "non-success HTTP status");
        }
        Ok(ApiResponse::parse(&body))
    }
}
