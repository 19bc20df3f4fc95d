//! Scheduler trigger entry point.

use anyhow::{Result, bail};
use xyb_core::Action;

/// Maps a trigger name to its action. Unknown names are a configuration error.
pub fn parse(name: &str) -> Result<Action> {
    match name {
        "SignIn" => Ok(Action::SignIn),
        "SignOut" => Ok(Action::SignOut),
        other => bail!("trigger '{other}' is not configured correctly: expected SignIn or SignOut"),
    }
}
