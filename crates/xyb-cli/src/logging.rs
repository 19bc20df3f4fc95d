//! Console logging plus an in-memory copy of the run log.
//!
//! The captured copy is attached to the batch notification and optionally
//! written to the configured log directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use xyb_notify::Attachment;

/// Shared buffer receiving a plain-text copy of every log line.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// The captured log as a notification attachment.
    pub fn attachment(&self, started: DateTime<Local>) -> Attachment {
        Attachment {
            name: file_name(started),
            content: self.contents(),
        }
    }

    /// Writes the captured log into `dir`, creating it when missing.
    pub fn save(&self, dir: &Path, started: DateTime<Local>) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name(started));
        std::fs::write(&path, self.contents())?;
        Ok(path)
    }
}

/// `io::Write` handle appending to a [`LogCapture`] buffer.
pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

/// Installs the global subscriber and returns the capture handle.
///
/// `verbose` forces the `debug` level; otherwise `RUST_LOG` applies, with
/// `info` as the fallback.
pub fn init(verbose: bool) -> LogCapture {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let capture = LogCapture::default();

    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(capture.clone()),
        )
        .try_init();
    capture
}

fn file_name(started: DateTime<Local>) -> String {
    started.format("LOG#t=%Y-%m-%d--%H-%M-%S##.txt").to_string()
}
