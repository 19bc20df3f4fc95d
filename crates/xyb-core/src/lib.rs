//! Core domain types for the attendance client.
//!
//! This crate contains the fundamental types and logic for:
//! - Account configuration: credentials, location overrides and task schedules
//! - Attendance: clock statuses, server clock state and task outcomes
//! - Batch records handed to the webhook collaborator
//! - Time windows deciding whether a task should run

pub mod account;
pub mod clock;
pub mod record;
pub mod schedule;
pub mod types;

pub use account::{AccountConfig, Credentials, Location, TaskConfig};
pub use clock::{
    Action, AttendanceState, ClockState, ClockStatus, FailReason, Outcome, SkipReason, SubmitMode,
};
pub use record::{ClockRecord, TaskReport, Webhook};
pub use schedule::{ScheduleError, TimeWindow, any_matches, parse_windows};
pub use types::{Coordinate, LoginerId, TraineeId, ValidationError};
