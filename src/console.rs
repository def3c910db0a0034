//! Sends `tracing` output to the browser devtools console.
//!
//! Each event is formatted by a plain `fmt` layer into a [`ConsoleWriter`],
//! which hands the finished line to the `console` method matching the event's
//! level when it is dropped.
use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;
use wasm_bindgen::JsValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleMethod {
    Debug,
    Log,
    Warn,
    Error,
}

pub fn console_method(level: &Level) -> ConsoleMethod {
    match *level {
        Level::ERROR => ConsoleMethod::Error,
        Level::WARN => ConsoleMethod::Warn,
        Level::INFO => ConsoleMethod::Log,
        _ => ConsoleMethod::Debug,
    }
}

/// Buffers one formatted event.
#[derive(Debug)]
pub struct ConsoleWriter {
    method: ConsoleMethod,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    pub fn new(method: ConsoleMethod) -> Self {
        Self { method, buf: Vec::new() }
    }

    /// Take the buffered line without emitting it.
    pub fn take_line(&mut self) -> String {
        let buf = std::mem::take(&mut self.buf);
        String::from_utf8_lossy(&buf).trim_end().to_string()
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let msg = JsValue::from_str(&self.take_line());
        match self.method {
            ConsoleMethod::Debug => web_sys::console::debug_1(&msg),
            ConsoleMethod::Log => web_sys::console::log_1(&msg),
            ConsoleMethod::Warn => web_sys::console::warn_1(&msg),
            ConsoleMethod::Error => web_sys::console::error_1(&msg),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(ConsoleMethod::Log)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(console_method(meta.level()))
    }
}

/// Install the console subscriber as the global default. Returns false if a
/// subscriber was already set, e.g. when `wasm_start` runs twice.
pub fn init(max_level: LevelFilter) -> bool {
    // no clock on wasm32-unknown-unknown, and the console shows its own timestamps
    let layer = fmt::layer()
        .without_time()
        .with_writer(MakeConsoleWriter)
        .with_filter(max_level);
    tracing_subscriber::registry().with(layer).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    #[case(Level::ERROR, ConsoleMethod::Error)]
    #[case(Level::WARN, ConsoleMethod::Warn)]
    #[case(Level::INFO, ConsoleMethod::Log)]
    #[case(Level::DEBUG, ConsoleMethod::Debug)]
    #[case(Level::TRACE, ConsoleMethod::Debug)]
    fn levels_map_to_console_methods(#[case] level: Level, #[case] expected: ConsoleMethod) {
        assert_eq!(console_method(&level), expected);
    }

    #[test]
    fn writer_collects_one_line() {
        let mut w = ConsoleWriter::new(ConsoleMethod::Log);
        write!(w, " INFO count_drill::session: new round").unwrap();
        w.write_all(b" prompt=7 + 4 = ?\n").unwrap();
        assert_eq!(w.take_line(), " INFO count_drill::session: new round prompt=7 + 4 = ?");
        // drained, so dropping emits nothing
        assert!(w.buf.is_empty());
    }

    #[test]
    fn default_writer_logs() {
        let mut w = MakeConsoleWriter.make_writer();
        assert_eq!(w.method, ConsoleMethod::Log);
        assert_eq!(w.take_line(), "");
    }
}
