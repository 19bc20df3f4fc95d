//! Standalone mode: run the tasks whose time windows match now.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use xyb_api::BatchTask;
use xyb_core::{AccountConfig, Action, any_matches, parse_windows};

/// Tasks due at `now`, in account order, sign-in before sign-out.
///
/// A malformed window anywhere in the configuration fails the whole run.
pub fn due_tasks(accounts: &[AccountConfig], now: NaiveDateTime) -> Result<Vec<BatchTask<'_>>> {
    let mut tasks = Vec::new();
    for account in accounts {
        for (action, task) in [
            (Action::SignIn, &account.sign_in),
            (Action::SignOut, &account.sign_out),
        ] {
            let Some(task) = task else { continue };
            let windows = parse_windows(task.time.as_slice())
                .with_context(|| format!("invalid {action} window for {}", account.label()))?;
            if any_matches(&windows, now) {
                tasks.push(BatchTask {
                    account,
                    action,
                    overwrite: task.overwrite,
                });
            }
        }
    }
    Ok(tasks)
}
