//! Logging through `tracing`, printed to the browser console.
//!
//! `init` installs a `tracing-subscriber` fmt layer without timestamps (there
//! is no wall clock on `wasm32-unknown-unknown`) whose writer buffers one
//! formatted event and hands it to `console.log` / `console.warn` /
//! `console.error` on drop.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wasm_bindgen::JsValue;

/// Install the console subscriber at `level`. Later calls are ignored.
pub fn init(level: Level) {
    let layer = fmt::layer()
        .with_writer(ConsoleWriter)
        .with_target(false)
        .with_level(true)
        .without_time();
    let filter = tracing_subscriber::filter::LevelFilter::from_level(level);
    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("logging already initialised");
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ConsoleWriter;

/// One event's worth of output.
struct ConsoleLine {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let text = text.trim_end();
        if text.is_empty() {
            return;
        }
        let msg = JsValue::from_str(text);
        match self.level {
            Level::ERROR => web_sys::console::error_1(&msg),
            Level::WARN => web_sys::console::warn_1(&msg),
            Level::DEBUG | Level::TRACE => web_sys::console::debug_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}
