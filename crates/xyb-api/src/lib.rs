//! Client for the internship attendance platform.
//!
//! Provides:
//! - Request signing compatible with the platform's mobile client
//! - Per-account sessions (login, profile, plan and clock state)
//! - Auto/append/overwrite clock submissions and the sign-in/sign-out rules
//! - Sequential batch processing with per-account failure isolation

pub mod api;
pub mod batch;
pub mod error;
pub mod session;
pub mod sign;
mod strategy;

pub use api::{ApiConfig, ApiRequest, ApiResponse, Endpoint, Form, HttpTransport, Method, Transport};
pub use batch::{BatchCoordinator, BatchReport, BatchTask, HttpSessionFactory, SessionFactory};
pub use error::ClientError;
pub use session::{AuthState, Plan, Profile, Session, SessionOptions};
pub use sign::{FixedNonce, NonceSource, SignHeaders, SignatureEngine, ThreadRngNonce};
