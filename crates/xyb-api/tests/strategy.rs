//! Sign-in/sign-out decisions and the three submission primitives.

mod common;

use common::{FakeTransport, healthy_transport, ok, opened};
use serde_json::json;
use xyb_api::{ClientError, Endpoint};
use xyb_core::{AttendanceState, FailReason, Outcome, SkipReason, SubmitMode};

#[tokio::test]
async fn sign_in_from_not_signed_in_auto_submits_clock_in() {
    for overwrite in [false, true] {
        let transport = healthy_transport();
        let mut session = opened(&transport, &[(false, false), (true, false)]).await;

        let report = session.sign_in(overwrite).await.unwrap();
        assert!(report.success);
        assert_eq!(report.outcome, Outcome::Succeeded(SubmitMode::Auto));
        assert_eq!(transport.submissions(), vec![Endpoint::AutoClock]);

        let submit = transport
            .calls()
            .into_iter()
            .find(|c| c.endpoint == Endpoint::AutoClock)
            .unwrap();
        assert_eq!(submit.form["clockStatus"], "2");
        assert_eq!(submit.form["traineeId"], "88231");
        assert_eq!(submit.form["lat"], "31.23");
        assert_eq!(submit.form["lng"], "121.47");
        assert_eq!(submit.form["adcode"], "310101");
        assert_eq!(submit.form["punchInStatus"], "1");

        // state re-read after the submission
        assert_eq!(
            session.clock_state().attendance(),
            AttendanceState::SignedInOnly
        );
    }
}

#[tokio::test]
async fn sign_in_when_signed_in_only_is_a_skip() {
    for overwrite in [false, true] {
        let transport = healthy_transport();
        let mut session = opened(&transport, &[(true, false)]).await;

        let report = session.sign_in(overwrite).await.unwrap();
        assert!(!report.success);
        assert_eq!(report.outcome, Outcome::Skipped(SkipReason::AlreadySignedIn));
        assert!(transport.submissions().is_empty());
    }
}

#[tokio::test]
async fn sign_in_after_sign_out_with_overwrite_is_refused() {
    let transport = healthy_transport();
    let mut session = opened(&transport, &[(true, true)]).await;

    let report = session.sign_in(true).await.unwrap();
    assert!(!report.success);
    assert_eq!(report.outcome, Outcome::Failed(FailReason::AlreadySignedOut));
    assert!(transport.submissions().is_empty());
}

#[tokio::test]
async fn sign_in_after_sign_out_without_overwrite_is_a_skip() {
    let transport = healthy_transport();
    let mut session = opened(&transport, &[(true, true)]).await;

    let report = session.sign_in(false).await.unwrap();
    assert!(!report.success);
    assert!(matches!(report.outcome, Outcome::Skipped(_)));
    assert!(transport.submissions().is_empty());
}

#[tokio::test]
async fn sign_out_before_sign_in_fails_without_network() {
    for overwrite in [false, true] {
        let transport = healthy_transport();
        let mut session = opened(&transport, &[(false, false)]).await;
        let before = transport.calls().len();

        let report = session.sign_out(overwrite).await.unwrap();
        assert!(!report.success);
        assert_eq!(report.outcome, Outcome::Failed(FailReason::NotSignedIn));
        assert_eq!(transport.calls().len(), before);
    }
}

#[tokio::test]
async fn first_sign_out_appends_clock_out() {
    for overwrite in [false, true] {
        let transport = healthy_transport();
        let mut session = opened(&transport, &[(true, false), (true, true)]).await;

        let report = session.sign_out(overwrite).await.unwrap();
        assert!(report.success);
        assert_eq!(report.outcome, Outcome::Succeeded(SubmitMode::Append));
        assert_eq!(transport.submissions(), vec![Endpoint::NewClock]);
        let submit = transport
            .calls()
            .into_iter()
            .find(|c| c.endpoint == Endpoint::NewClock)
            .unwrap();
        assert_eq!(submit.form["clockStatus"], "1");
        assert!(session.clock_state().is_signed_out);
    }
}

#[tokio::test]
async fn repeated_sign_out_overwrites_only_on_request() {
    let transport = healthy_transport();
    let mut session = opened(&transport, &[(true, true)]).await;
    let report = session.sign_out(false).await.unwrap();
    assert_eq!(report.outcome, Outcome::Skipped(SkipReason::AlreadySignedOut));
    assert!(transport.submissions().is_empty());

    let report = session.sign_out(true).await.unwrap();
    assert!(report.success);
    assert_eq!(report.outcome, Outcome::Succeeded(SubmitMode::Overwrite));
    assert_eq!(transport.submissions(), vec![Endpoint::UpdateClock]);
}

#[tokio::test]
async fn submissions_refresh_clock_state() {
    let transport = healthy_transport();
    let mut session = opened(&transport, &[(false, false), (true, false)]).await;
    let details_before = transport.count(Endpoint::PlanDetail);

    session.auto_submit(2).await.unwrap();
    assert_eq!(transport.count(Endpoint::PlanDetail), details_before + 1);
}

#[tokio::test]
async fn invalid_status_is_rejected_before_any_request() {
    let transport = healthy_transport();
    let mut session = opened(&transport, &[(false, false)]).await;
    let before = transport.calls().len();

    for result in [
        session.auto_submit(3).await,
        session.append_submit(0).await,
        session.overwrite_submit(-1).await,
    ] {
        assert!(matches!(result, Err(ClientError::InvalidStatus { .. })));
    }
    assert_eq!(transport.calls().len(), before);
}

#[tokio::test]
async fn rejected_submission_is_a_protocol_error() {
    let transport = FakeTransport::default();
    transport
        .respond(
            Endpoint::WeChatLogin,
            &ok(&json!({"loginerId": "1", "sessionId": "s"})),
        )
        .respond(Endpoint::AccountInfo, &ok(&json!({"loginer": "Li Lei"})))
        .respond(Endpoint::Plan, &ok(&json!({"clockVo": {"traineeId": "9"}})))
        .respond(
            Endpoint::AutoClock,
            &json!({"code": "403", "msg": "outside clock range"}),
        );
    let mut session = opened(&transport, &[(false, false)]).await;

    let err = session.sign_in(false).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Protocol { operation: "auto clock", code: Some(ref c), .. } if c == "403"
    ));
    assert_eq!(err.kind(), "ProtocolError");
}

#[tokio::test]
async fn behavior_report_precedes_submission_when_enabled() {
    let transport = healthy_transport();
    transport
        .respond(Endpoint::IpLookup, &ok(&json!({"ip": "203.0.113.7"})))
        .respond(Endpoint::Behavior, &ok(&json!(null)))
        .respond(
            Endpoint::PlanDetail,
            &common::plan_detail(false, false, 31.23, 121.47),
        );
    let mut options = common::options();
    options.report_behavior = true;
    let mut session =
        xyb_api::Session::open(common::wechat_account(), transport.clone(), options)
            .await
            .unwrap();

    session.sign_in(false).await.unwrap();
    let order: Vec<Endpoint> = transport.calls().iter().map(|c| c.endpoint).collect();
    let tail = &order[order.len() - 4..];
    assert_eq!(
        tail,
        &[
            Endpoint::IpLookup,
            Endpoint::Behavior,
            Endpoint::AutoClock,
            Endpoint::PlanDetail
        ]
    );
    let behavior = transport
        .calls()
        .into_iter()
        .find(|c| c.endpoint == Endpoint::Behavior)
        .unwrap();
    assert_eq!(behavior.form["clientIP"], "203.0.113.7");
    assert_eq!(behavior.form["userName"], "Li Lei");
}
