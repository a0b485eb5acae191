//! `tracing` output for the browser console.
//!
//! A `tracing-subscriber` fmt layer formats each event into one line; the
//! [`ConsoleMakeWriter`] buffers that line and hands it to a [`ConsoleSink`]
//! when the writer is dropped, tagged with the event's level so the sink can
//! pick `console.error`, `console.warn`, or `console.log`.
//!
//! The sink is a trait so native tests can record lines without a browser.

use std::io;
use std::sync::Arc;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Console method a line is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Debug,
    Log,
    Warn,
    Error,
}

impl ConsoleLevel {
    #[must_use]
    pub fn from_tracing(level: &Level) -> Self {
        match *level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Log,
            _ => Self::Debug,
        }
    }
}

/// Destination for formatted log lines.
pub trait ConsoleSink: Send + Sync + 'static {
    fn emit(&self, level: ConsoleLevel, line: &str);
}

/// [`MakeWriter`] that produces one buffered writer per event.
#[derive(Debug)]
pub struct ConsoleMakeWriter<S> {
    sink: Arc<S>,
}

impl<S> ConsoleMakeWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }
}

impl<S> Clone for ConsoleMakeWriter<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<'a, S: ConsoleSink> MakeWriter<'a> for ConsoleMakeWriter<S> {
    type Writer = ConsoleWriter<S>;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Arc::clone(&self.sink), ConsoleLevel::Log)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(
            Arc::clone(&self.sink),
            ConsoleLevel::from_tracing(meta.level()),
        )
    }
}

/// Collects one formatted event; flushes to the sink on drop.
#[derive(Debug)]
pub struct ConsoleWriter<S: ConsoleSink> {
    sink: Arc<S>,
    level: ConsoleLevel,
    buf: Vec<u8>,
}

impl<S: ConsoleSink> ConsoleWriter<S> {
    fn new(sink: Arc<S>, level: ConsoleLevel) -> Self {
        Self {
            sink,
            level,
            buf: Vec::with_capacity(128),
        }
    }
}

impl<S: ConsoleSink> io::Write for ConsoleWriter<S> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: ConsoleSink> Drop for ConsoleWriter<S> {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end();
        if !line.is_empty() {
            self.sink.emit(self.level, line);
        }
    }
}

/// Build a subscriber that writes to `sink`, without installing it.
pub fn subscriber<S: ConsoleSink>(
    sink: S,
    max_level: LevelFilter,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter::new(sink))
        .with_max_level(max_level)
        .without_time()
        .with_ansi(false)
        .with_target(true)
        .finish()
}

/// Install the console subscriber globally.
///
/// Returns `false` if a global subscriber was already set; the existing one
/// stays in place, so calling this more than once is harmless.
pub fn try_init<S: ConsoleSink>(sink: S, max_level: LevelFilter) -> bool {
    tracing::subscriber::set_global_default(subscriber(sink, max_level)).is_ok()
}
