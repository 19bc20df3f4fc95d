//! Clock submission primitives and the sign-in/sign-out decision logic.
//!
//! | state             | sign in                         | sign out                          |
//! |-------------------|---------------------------------|-----------------------------------|
//! | not signed in     | auto submit                     | refused                           |
//! | signed in only    | skip                            | append submit                     |
//! | signed in and out | skip, or refused with overwrite | skip, or overwrite with overwrite |
//!
//! Sign-in never appends: the day has one canonical sign-in created through
//! the auto-clock endpoint. The first sign-out is always appended.

use xyb_core::{
    AttendanceState, ClockStatus, FailReason, Outcome, SkipReason, SubmitMode, TaskReport,
};

use crate::api::{Endpoint, Form, Transport, form};
use crate::error::ClientError;
use crate::session::Session;

const fn endpoint_for(mode: SubmitMode) -> Endpoint {
    match mode {
        SubmitMode::Auto => Endpoint::AutoClock,
        SubmitMode::Append => Endpoint::NewClock,
        SubmitMode::Overwrite => Endpoint::UpdateClock,
    }
}

impl<T: Transport> Session<T> {
    /// Records `status` only when no record of it exists yet.
    pub async fn auto_submit(&mut self, status: i64) -> Result<(), ClientError> {
        self.submit(SubmitMode::Auto, status).await
    }

    /// Always creates a new record of `status`.
    pub async fn append_submit(&mut self, status: i64) -> Result<(), ClientError> {
        self.submit(SubmitMode::Append, status).await
    }

    /// Replaces the latest record of `status`.
    ///
    /// The server refuses to overwrite a sign-in once a sign-out exists.
    pub async fn overwrite_submit(&mut self, status: i64) -> Result<(), ClientError> {
        self.submit(SubmitMode::Overwrite, status).await
    }

    /// Validates `status`, posts it through `mode` and re-reads the state.
    pub async fn submit(&mut self, mode: SubmitMode, status: i64) -> Result<(), ClientError> {
        let status = ClockStatus::try_from(status)?;
        let body = self.clock_form(status)?;

        if self.reports_behavior() {
            self.report_behavior().await?;
        }
        tracing::debug!(%mode, %status, "submitting clock event");
        self.call(endpoint_for(mode), body).await?;
        self.refresh_clock_state().await?;
        Ok(())
    }

    fn clock_form(&self, status: ClockStatus) -> Result<Form, ClientError> {
        let trainee_id = self.trainee_id()?.to_string();
        let location = self.location()?;
        let place = &self.account().location;
        Ok(form([
            ("traineeId", trainee_id),
            ("adcode", place.adcode.clone()),
            ("lat", location.lat.to_string()),
            ("lng", location.lng.to_string()),
            ("address", place.address.clone()),
            ("deviceName", "microsoft".to_string()),
            ("punchInStatus", "1".to_string()),
            ("clockStatus", status.code().to_string()),
            ("imgUrl", String::new()),
            ("reason", String::new()),
        ]))
    }

    /// Signs in unless today already has a sign-in.
    pub async fn sign_in(&mut self, overwrite: bool) -> Result<TaskReport, ClientError> {
        let outcome = match self.clock_state().attendance() {
            AttendanceState::NotSignedIn => {
                self.auto_submit(ClockStatus::ClockIn.code()).await?;
                Outcome::Succeeded(SubmitMode::Auto)
            }
            AttendanceState::SignedInOnly => Outcome::Skipped(SkipReason::AlreadySignedIn),
            AttendanceState::SignedInAndOut if overwrite => {
                Outcome::Failed(FailReason::AlreadySignedOut)
            }
            AttendanceState::SignedInAndOut => Outcome::Skipped(SkipReason::AlreadySignedIn),
        };
        log_outcome("sign in", outcome);
        Ok(outcome.into())
    }

    /// Signs out, appending the first sign-out or overwriting on request.
    pub async fn sign_out(&mut self, overwrite: bool) -> Result<TaskReport, ClientError> {
        let outcome = match self.clock_state().attendance() {
            AttendanceState::NotSignedIn => Outcome::Failed(FailReason::NotSignedIn),
            AttendanceState::SignedInOnly => {
                self.append_submit(ClockStatus::ClockOut.code()).await?;
                Outcome::Succeeded(SubmitMode::Append)
            }
            AttendanceState::SignedInAndOut if overwrite => {
                self.overwrite_submit(ClockStatus::ClockOut.code()).await?;
                Outcome::Succeeded(SubmitMode::Overwrite)
            }
            AttendanceState::SignedInAndOut => Outcome::Skipped(SkipReason::AlreadySignedOut),
        };
        log_outcome("sign out", outcome);
        Ok(outcome.into())
    }
}

fn log_outcome(task: &str, outcome: Outcome) {
    match outcome {
        Outcome::Succeeded(mode) => tracing::info!(%mode, "{task} succeeded"),
        Outcome::Skipped(reason) => tracing::warn!(%reason, "{task} skipped"),
        Outcome::Failed(reason) => tracing::error!(%reason, "{task} refused"),
    }
}
