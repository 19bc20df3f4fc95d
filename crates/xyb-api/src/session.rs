//! One authenticated session per account.
//!
//! A session walks a fixed sequence: [`Session::login`], then
//! [`Session::load_profile`], [`Session::load_clock_plan`] and
//! [`Session::refresh_clock_state`]. Each step needs the previous one's output,
//! so the calls are strictly sequential.

use md5::{Digest, Md5};
use serde_json::Value;
use xyb_core::{AccountConfig, ClockRecord, ClockState, Coordinate, Credentials, LoginerId, TraineeId};

use crate::api::{ApiRequest, ApiResponse, Endpoint, Form, Transport, form};
use crate::error::ClientError;
use crate::sign::SignatureEngine;

/// Identity returned by a successful login. Never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub loginer_id: LoginerId,
    pub session_id: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_name: String,
}

/// The active internship plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub trainee_id: TraineeId,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Per-session settings passed at construction.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub signer: SignatureEngine,
    /// Send the deprecated behavior report before each submission.
    pub report_behavior: bool,
}

/// An account's session with the platform.
pub struct Session<T> {
    transport: T,
    options: SessionOptions,
    account: AccountConfig,
    auth: Option<AuthState>,
    profile: Option<Profile>,
    plan: Option<Plan>,
    location: Option<Coordinate>,
    clock_state: ClockState,
}

impl<T> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("account", &self.account.label())
            .field("auth", &self.auth)
            .field("plan", &self.plan)
            .field("clock_state", &self.clock_state)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Session<T> {
    pub fn new(account: AccountConfig, transport: T, options: SessionOptions) -> Self {
        Self {
            transport,
            options,
            account,
            auth: None,
            profile: None,
            plan: None,
            location: None,
            clock_state: ClockState::default(),
        }
    }

    /// Builds a session and runs login, profile, plan and state loading.
    pub async fn open(
        account: AccountConfig,
        transport: T,
        options: SessionOptions,
    ) -> Result<Self, ClientError> {
        let mut session = Self::new(account, transport, options);
        session.login().await?;
        session.load_profile().await?;
        session.load_clock_plan().await?;
        session.refresh_clock_state().await?;
        Ok(session)
    }

    pub const fn account(&self) -> &AccountConfig {
        &self.account
    }

    pub const fn auth(&self) -> Option<&AuthState> {
        self.auth.as_ref()
    }

    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub const fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub const fn clock_state(&self) -> &ClockState {
        &self.clock_state
    }

    /// Signs `form`, sends it to `endpoint` and unwraps the success payload.
    pub(crate) async fn call(&self, endpoint: Endpoint, form: Form) -> Result<Value, ClientError> {
        let response = self.send(endpoint, form).await?;
        response.into_data(endpoint)
    }

    async fn send(&self, endpoint: Endpoint, form: Form) -> Result<ApiResponse, ClientError> {
        let headers = self
            .options
            .signer
            .sign(&form)
            .pairs()
            .into_iter()
            .map(|(name, value)| (name, value.to_string()))
            .collect();
        self.transport
            .send(ApiRequest {
                endpoint,
                form,
                headers,
            })
            .await
    }

    /// Logs in with the configured credentials.
    ///
    /// The password pair wins when both pairs are configured.
    pub async fn login(&mut self) -> Result<&AuthState, ClientError> {
        let credentials = self.account.credentials()?;
        tracing::debug!(method = credentials.method(), "logging in");

        let (endpoint, body) = match &credentials {
            Credentials::Password { username, password } => (
                Endpoint::PasswordLogin,
                form([
                    ("username", username.clone()),
                    ("password", hex::encode(Md5::digest(password.as_bytes()))),
                    ("openId", String::new()),
                    ("unionId", String::new()),
                    ("model", "microsoft".to_string()),
                    ("brand", "microsoft".to_string()),
                    ("platform", "windows".to_string()),
                    ("system", "Windows 10 x64".to_string()),
                    ("deviceId", String::new()),
                ]),
            ),
            Credentials::WeChat { open_id, union_id } => (
                Endpoint::WeChatLogin,
                form([("openId", open_id.clone()), ("unionId", union_id.clone())]),
            ),
        };

        let data = match self.send(endpoint, body).await? {
            ApiResponse::Success { data } => data,
            ApiResponse::Failure { code, .. } => {
                return Err(ClientError::Authentication {
                    reason: format!(
                        "{} login rejected (code {})",
                        credentials.method(),
                        code.as_deref().unwrap_or("none")
                    ),
                });
            }
        };

        let loginer_id = text(&data, "/loginerId").ok_or(ClientError::UnexpectedPayload {
            operation: "login",
            field: "loginerId",
        })?;
        let auth = AuthState {
            loginer_id: LoginerId::new(loginer_id)?,
            session_id: text(&data, "/sessionId").unwrap_or_default(),
            phone: text(&data, "/phone"),
        };
        tracing::info!(loginer_id = %auth.loginer_id, "login succeeded");
        Ok(self.auth.insert(auth))
    }

    /// Fetches the user's display name.
    pub async fn load_profile(&mut self) -> Result<&Profile, ClientError> {
        let data = self.call(Endpoint::AccountInfo, Form::new()).await?;
        let user_name = text(&data, "/loginer").ok_or(ClientError::UnexpectedPayload {
            operation: "load account info",
            field: "loginer",
        })?;
        tracing::Span::current().record("user", user_name.as_str());
        tracing::info!(user = %user_name, "account loaded");
        Ok(self.profile.insert(Profile { user_name }))
    }

    /// Fetches the active plan.
    ///
    /// A success response without a trainee ID means the account has no
    /// default plan, which is reported as [`ClientError::NoActivePlan`].
    pub async fn load_clock_plan(&mut self) -> Result<&Plan, ClientError> {
        let data = self.call(Endpoint::Plan, Form::new()).await?;
        let Some(trainee_id) = text(&data, "/clockVo/traineeId").and_then(|id| TraineeId::new(id).ok())
        else {
            return Err(ClientError::NoActivePlan);
        };
        let plan = Plan {
            trainee_id,
            name: text(&data, "/clockVo/planName"),
            start_date: text(&data, "/clockVo/startDate"),
            end_date: text(&data, "/clockVo/endDate"),
        };
        tracing::info!(
            plan = plan.name.as_deref().unwrap_or("?"),
            start = plan.start_date.as_deref().unwrap_or("?"),
            end = plan.end_date.as_deref().unwrap_or("?"),
            "loaded train plan"
        );
        Ok(self.plan.insert(plan))
    }

    /// Re-reads today's attendance from the server.
    ///
    /// The first call also fixes the coordinate used for submissions: a
    /// configured non-zero location wins over the plan's post location.
    pub async fn refresh_clock_state(&mut self) -> Result<&ClockState, ClientError> {
        let trainee_id = self.trainee_id()?.to_string();
        let data = self
            .call(Endpoint::PlanDetail, form([("traineeId", trainee_id)]))
            .await?;

        let location = match self.location {
            Some(location) => location,
            None => {
                let from_plan = Coordinate::new(
                    number(&data, "/postInfo/lat").unwrap_or_default(),
                    number(&data, "/postInfo/lng").unwrap_or_default(),
                );
                let resolved = self
                    .account
                    .coordinate_override()
                    .or_else(|| from_plan.is_set().then_some(from_plan))
                    .ok_or(ClientError::MissingLocation)?;
                tracing::debug!(%resolved, "resolved clock location");
                *self.location.insert(resolved)
            }
        };

        self.clock_state = ClockState {
            train_type: text(&data, "/trainType"),
            post_state: text(&data, "/postInfo/state"),
            is_signed_in: truthy(data.pointer("/clockInfo/inTime")),
            is_signed_out: truthy(data.pointer("/clockInfo/outTime")),
            lat: location.lat,
            lng: location.lng,
        };
        tracing::info!(
            sign_in = mark(self.clock_state.is_signed_in),
            sign_out = mark(self.clock_state.is_signed_out),
            "loaded clock state"
        );
        Ok(&self.clock_state)
    }

    /// Public IP as seen by the platform.
    pub async fn client_ip(&self) -> Result<String, ClientError> {
        let data = self.call(Endpoint::IpLookup, Form::new()).await?;
        text(&data, "/ip").ok_or(ClientError::UnexpectedPayload {
            operation: "ip lookup",
            field: "ip",
        })
    }

    /// Sends the click-event telemetry the mini program emits before clocking.
    pub async fn report_behavior(&self) -> Result<(), ClientError> {
        let ip = self.client_ip().await?;
        let user_name = self
            .profile
            .as_ref()
            .map(|p| p.user_name.clone())
            .unwrap_or_default();
        let user_id = self
            .auth
            .as_ref()
            .map(|a| a.loginer_id.to_string())
            .unwrap_or_default();
        let location = &self.account.location;
        let body = form([
            ("login", "1".to_string()),
            ("appVersion", "1.5.75".to_string()),
            ("operatingSystemVersion", "10".to_string()),
            ("deviceModel", "microsoft".to_string()),
            ("operatingSystem", "android".to_string()),
            ("screenWidth", "415".to_string()),
            ("screenHeight", "692".to_string()),
            ("reportSrc", "2".to_string()),
            ("eventTime", chrono::Utc::now().timestamp().to_string()),
            ("eventType", "click".to_string()),
            ("eventName", "clickSignEvent".to_string()),
            ("clientIP", ip),
            ("pageId", "30".to_string()),
            ("itemID", "none".to_string()),
            ("itemType", "其他".to_string()),
            ("stayTime", "none".to_string()),
            ("deviceToken", self.account.openid.clone().unwrap_or_default()),
            ("netType", "WIFI".to_string()),
            ("app", "wx_student".to_string()),
            ("preferName", "成长".to_string()),
            ("pageName", "成长-签到".to_string()),
            ("userName", user_name),
            ("userId", user_id),
            ("province", location.province.clone()),
            ("country", location.country.clone()),
            ("city", location.city.clone()),
        ]);
        self.call(Endpoint::Behavior, body).await?;
        Ok(())
    }

    pub(crate) const fn reports_behavior(&self) -> bool {
        self.options.report_behavior
    }

    pub(crate) fn trainee_id(&self) -> Result<&TraineeId, ClientError> {
        self.plan
            .as_ref()
            .map(|plan| &plan.trainee_id)
            .ok_or(ClientError::NoActivePlan)
    }

    pub(crate) fn location(&self) -> Result<Coordinate, ClientError> {
        self.location.ok_or(ClientError::MissingLocation)
    }

    /// Copies identity and current state into a batch record.
    pub fn fill_record(&self, record: &mut ClockRecord) {
        if let Some(auth) = &self.auth {
            record.loginer_id = Some(auth.loginer_id.to_string());
            record.phone.clone_from(&auth.phone);
        }
        if let Some(profile) = &self.profile {
            record.user_name = Some(profile.user_name.clone());
        }
        if self.location.is_some() {
            record.train_type.clone_from(&self.clock_state.train_type);
            record.post_state.clone_from(&self.clock_state.post_state);
            record.clock_state = Some(self.clock_state.clone());
        }
    }
}

/// Reads a string or number at `pointer` as text.
fn text(data: &Value, pointer: &str) -> Option<String> {
    match data.pointer(pointer)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(data: &Value, pointer: &str) -> Option<f64> {
    match data.pointer(pointer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// JavaScript-style truthiness for the `inTime`/`outTime` fields.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

const fn mark(done: bool) -> &'static str {
    if done { "√" } else { "x" }
}
