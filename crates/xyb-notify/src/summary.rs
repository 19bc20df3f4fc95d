use xyb_api::BatchReport;
use xyb_core::ClockRecord;

use crate::channel::{Attachment, Message};

/// Renders a batch report as a notification.
///
/// The title reads `"<label> <succeeded>/<total>"`; the body has one line per
/// account followed by the elapsed time.
pub fn summarize(label: &str, report: &BatchReport, log: Option<Attachment>) -> Message {
    let mut lines: Vec<String> = report.records.iter().map(record_line).collect();
    lines.push(format!("elapsed {:.2}s", report.elapsed.as_secs_f64()));
    Message {
        title: format!("{label} {}/{}", report.succeeded, report.total()),
        body: lines.join("\n"),
        attachment: log,
    }
}

fn record_line(record: &ClockRecord) -> String {
    let mark = if record.result { "√" } else { "x" };
    let status = match (&record.error, record.outcome) {
        (Some(error), _) => error.clone(),
        (None, Some(outcome)) => outcome.to_string(),
        (None, None) => "no result".to_string(),
    };
    format!(
        "{mark} {} {}: {status}",
        record.display_name(),
        record.action
    )
}
