//! Check command: list accounts and which tasks are due now.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use xyb_core::{AccountConfig, TaskConfig, any_matches, parse_windows};

pub fn run<W: Write>(writer: &mut W, accounts: &[AccountConfig], now: NaiveDateTime) -> Result<()> {
    writeln!(writer, "Attendance accounts")?;
    writeln!(writer, "Now: {}", now.format("%a %Y-%m-%d %H:%M"))?;

    if accounts.is_empty() {
        writeln!(writer, "No accounts configured.")?;
        return Ok(());
    }

    writeln!(writer, "Accounts:")?;
    for account in accounts {
        let login = account
            .credentials()
            .map_or("missing credentials", |c| c.method());
        writeln!(
            writer,
            "- {} [{login}] signIn: {}, signOut: {}",
            account.label(),
            task_status(account.sign_in.as_ref(), now),
            task_status(account.sign_out.as_ref(), now),
        )?;
    }
    Ok(())
}

fn task_status(task: Option<&TaskConfig>, now: NaiveDateTime) -> String {
    let Some(task) = task else {
        return "not scheduled".to_string();
    };
    match parse_windows(task.time.as_slice()) {
        Err(err) => format!("invalid ({err})"),
        Ok(windows) if any_matches(&windows, now) && task.overwrite => "due (overwrite)".to_string(),
        Ok(windows) if any_matches(&windows, now) => "due".to_string(),
        Ok(_) => "not due".to_string(),
    }
}
