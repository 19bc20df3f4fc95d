#![allow(dead_code)]
//! Scripted transport shared by the integration tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use xyb_api::{
    ApiRequest, ApiResponse, ClientError, Endpoint, FixedNonce, Session, SessionOptions,
    SignatureEngine, Transport,
};
use xyb_core::AccountConfig;

/// Replays queued responses per endpoint and records every request.
///
/// The last queued response for an endpoint is repeated once the queue is
/// down to one entry. Unscripted endpoints answer with code 404.
#[derive(Clone, Default)]
pub struct FakeTransport {
    responses: Arc<Mutex<HashMap<Endpoint, VecDeque<ApiResponse>>>>,
    calls: Arc<Mutex<Vec<ApiRequest>>>,
}

impl FakeTransport {
    pub fn respond(&self, endpoint: Endpoint, body: &Value) -> &Self {
        self.respond_raw(endpoint, &body.to_string())
    }

    pub fn respond_raw(&self, endpoint: Endpoint, body: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(ApiResponse::parse(body));
        self
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.endpoint == endpoint)
            .count()
    }

    /// Endpoints of all clock submissions, in order.
    pub fn submissions(&self) -> Vec<Endpoint> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.endpoint)
            .filter(|e| {
                matches!(
                    e,
                    Endpoint::AutoClock | Endpoint::NewClock | Endpoint::UpdateClock
                )
            })
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let endpoint = request.endpoint;
        self.calls.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        let response = match responses.get_mut(&endpoint) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| ApiResponse::Failure {
            code: Some("404".to_string()),
            raw_body: String::new(),
        }))
    }
}

pub fn ok(data: &Value) -> Value {
    json!({"code": "200", "msg": "success", "data": data})
}

pub fn plan_detail(signed_in: bool, signed_out: bool, lat: f64, lng: f64) -> Value {
    ok(&json!({
        "trainType": 1,
        "postInfo": {"lat": lat, "lng": lng, "state": "2"},
        "clockInfo": {
            "inTime": if signed_in { "2026-10-19 08:01:12" } else { "" },
            "outTime": if signed_out { "2026-10-19 18:02:40" } else { "" },
        }
    }))
}

/// Scripts login, account and plan responses for a healthy account.
pub fn healthy_transport() -> FakeTransport {
    let transport = FakeTransport::default();
    transport
        .respond(
            Endpoint::WeChatLogin,
            &ok(&json!({"loginerId": 4242, "sessionId": "sess-1", "phone": "13800000000"})),
        )
        .respond(
            Endpoint::PasswordLogin,
            &ok(&json!({"loginerId": "4242", "sessionId": "sess-1", "phone": "13800000000"})),
        )
        .respond(Endpoint::AccountInfo, &ok(&json!({"loginer": "Li Lei"})))
        .respond(
            Endpoint::Plan,
            &ok(&json!({"clockVo": {
                "traineeId": 88231,
                "planName": "2026 Autumn Internship",
                "startDate": "2026-09-01",
                "endDate": "2026-12-31"
            }})),
        );
    for endpoint in [Endpoint::AutoClock, Endpoint::NewClock, Endpoint::UpdateClock] {
        transport.respond(endpoint, &ok(&Value::Null));
    }
    transport
}

pub fn wechat_account() -> AccountConfig {
    serde_json::from_value(json!({
        "openid": "oWx-openid-0001",
        "unionid": "oUn-unionid-0001",
        "location": {"lat": 0, "lng": 0, "adcode": "310101", "address": "Huangpu, Shanghai"}
    }))
    .unwrap()
}

pub fn account_at(lat: f64, lng: f64) -> AccountConfig {
    let mut account = wechat_account();
    account.location.lat = lat;
    account.location.lng = lng;
    account
}

pub fn options() -> SessionOptions {
    SessionOptions {
        signer: SignatureEngine::new(Arc::new(FixedNonce(vec![4, 8, 15, 16, 23, 42]))),
        report_behavior: false,
    }
}

pub fn session(account: AccountConfig, transport: &FakeTransport) -> Session<FakeTransport> {
    Session::new(account, transport.clone(), options())
}

/// A session that has already loaded its plan and clock state.
///
/// `states` are the successive `(signed_in, signed_out)` answers of the plan
/// detail endpoint: the first is read at open, the rest after submissions.
pub async fn opened(transport: &FakeTransport, states: &[(bool, bool)]) -> Session<FakeTransport> {
    for (signed_in, signed_out) in states {
        transport.respond(
            Endpoint::PlanDetail,
            &plan_detail(*signed_in, *signed_out, 31.23, 121.47),
        );
    }
    Session::open(wechat_account(), transport.clone(), options())
        .await
        .unwrap()
}
