//! Delivery of batch results.
//!
//! Provides:
//! - Pushplus, Qmsg and SMTP email channels behind a common [`Channel`] trait
//! - A [`Notifier`] that fans one message out to every configured channel
//! - [`HttpWebhook`], posting each account record as JSON
//! - Rendering of a batch report into a summary message

mod channel;
mod email;
mod notifier;
mod pushplus;
mod qmsg;
mod summary;
mod webhook;

pub use channel::{Attachment, Channel, Delivery, Message, NotifyError};
pub use email::{Email, EmailConfig};
pub use notifier::{ChannelReport, NotifyConfig, Notifier, render_reports};
pub use pushplus::{Pushplus, PushplusConfig};
pub use qmsg::{Qmsg, QmsgConfig};
pub use summary::summarize;
pub use webhook::HttpWebhook;
