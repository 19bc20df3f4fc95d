//! Attendance state, clock statuses and task outcomes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{Coordinate, ValidationError};

/// The two attendance event types the platform records per day.
///
/// The wire values are fixed by the platform: `1` is clock-out, `2` is clock-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ClockStatus {
    ClockOut,
    ClockIn,
}

impl ClockStatus {
    /// Wire value sent as `clockStatus`.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::ClockOut => 1,
            Self::ClockIn => 2,
        }
    }
}

impl TryFrom<i64> for ClockStatus {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::ClockOut),
            2 => Ok(Self::ClockIn),
            _ => Err(ValidationError::InvalidClockStatus { value }),
        }
    }
}

impl From<ClockStatus> for i64 {
    fn from(status: ClockStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for ClockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ClockOut => "clock-out",
            Self::ClockIn => "clock-in",
        })
    }
}

/// Server-side view of today's attendance for one trainee.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockState {
    pub train_type: Option<String>,
    pub post_state: Option<String>,
    pub is_signed_in: bool,
    pub is_signed_out: bool,
    pub lat: f64,
    pub lng: f64,
}

impl ClockState {
    /// Read-only projection used by the sign-in/sign-out decision logic.
    #[must_use]
    pub const fn attendance(&self) -> AttendanceState {
        match (self.is_signed_in, self.is_signed_out) {
            (false, _) => AttendanceState::NotSignedIn,
            (true, false) => AttendanceState::SignedInOnly,
            (true, true) => AttendanceState::SignedInAndOut,
        }
    }

    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Attendance states derived from [`ClockState`].
///
/// A sign-out record without a sign-in is impossible on the server, so it
/// folds into [`AttendanceState::NotSignedIn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    NotSignedIn,
    SignedInOnly,
    SignedInAndOut,
}

impl fmt::Display for AttendanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotSignedIn => "not signed in",
            Self::SignedInOnly => "signed in",
            Self::SignedInAndOut => "signed in and out",
        })
    }
}

/// Requested task for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    SignIn,
    SignOut,
}

impl Action {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SignIn => "signIn",
            Self::SignOut => "signOut",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signIn" | "sign-in" | "SignIn" => Ok(Self::SignIn),
            "signOut" | "sign-out" | "SignOut" => Ok(Self::SignOut),
            _ => Err(ValidationError::InvalidAction {
                value: s.to_string(),
            }),
        }
    }
}

/// The three remote submission endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    /// Only records the status when no record of it exists yet.
    Auto,
    /// Always creates a new record.
    Append,
    /// Replaces the most recent record of the status.
    Overwrite,
}

impl fmt::Display for SubmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Append => "append",
            Self::Overwrite => "overwrite",
        })
    }
}

/// Why a task intentionally did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadySignedIn,
    AlreadySignedOut,
}

/// Why a task was refused by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// Sign-out requested with no sign-in record.
    NotSignedIn,
    /// Sign-in revision requested after the day was closed by a sign-out.
    AlreadySignedOut,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotSignedIn => "must sign in before signing out",
            Self::AlreadySignedOut => "cannot revise: already signed out",
        })
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadySignedIn => "already signed in",
            Self::AlreadySignedOut => "already signed out",
        })
    }
}

/// Result of one sign-in/sign-out decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded(SubmitMode),
    Skipped(SkipReason),
    Failed(FailReason),
}

impl Outcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded(mode) => write!(f, "succeeded ({mode})"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
