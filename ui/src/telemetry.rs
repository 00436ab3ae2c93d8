//! `tracing` setup. In the browser, formatted events go to the devtools console at the
//! matching level; natively they go to stdout.

use tracing::Level;

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;

    use tracing::{Level, Metadata};
    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    /// Buffers one formatted event and hands it to `console.*` when dropped.
    pub struct ConsoleWriter {
        level: Level,
        buf: Vec<u8>,
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
            let text = String::from_utf8_lossy(&self.buf);
            let text = text.trim_end();
            if text.is_empty() {
                return;
            }
            let msg = JsValue::from_str(text);
            if self.level == Level::ERROR {
                web_sys::console::error_1(&msg);
            } else if self.level == Level::WARN {
                web_sys::console::warn_1(&msg);
            } else if self.level == Level::INFO {
                web_sys::console::info_1(&msg);
            } else {
                web_sys::console::debug_1(&msg);
            }
        }
    }

    #[derive(Debug, Clone, Copy, Default)]
    pub struct MakeConsoleWriter;

    impl<'a> MakeWriter<'a> for MakeConsoleWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> ConsoleWriter {
            ConsoleWriter {
                level: Level::INFO,
                buf: Vec::new(),
            }
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> ConsoleWriter {
            ConsoleWriter {
                level: *meta.level(),
                buf: Vec::new(),
            }
        }
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(level: Level) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time();
    #[cfg(target_arch = "wasm32")]
    let result = builder.with_writer(console::MakeConsoleWriter).try_init();
    #[cfg(not(target_arch = "wasm32"))]
    let result = builder.try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
