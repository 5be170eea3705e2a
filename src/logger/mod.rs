//! Levelled console logging
//!
//! Log lines are formatted with `ufmt` into a fixed-size buffer and handed to
//! a sink registered at startup. Until a sink is registered every message is
//! dropped, which is what host tests and early boot see.

use core::cell::Cell;
use core::convert::Infallible;

use critical_section::Mutex;

/// Longest log line; longer messages are truncated.
pub const LINE_LEN: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl Level {
    pub fn tag(self) -> &'static str {
        match self {
            Level::Error => "[ERR] ",
            Level::Warn => "[WRN] ",
            Level::Info => "[INF] ",
            Level::Debug => "[DBG] ",
        }
    }
}

#[cfg(feature = "debug")]
pub const MAX_LEVEL: Level = Level::Debug;
#[cfg(not(feature = "debug"))]
pub const MAX_LEVEL: Level = Level::Info;

pub type Sink = fn(Level, &str);

static SINK: Mutex<Cell<Option<Sink>>> = Mutex::new(Cell::new(None));

/// Route all subsequent log lines to `sink`.
pub fn set_sink(sink: Sink) {
    critical_section::with(|cs| SINK.borrow(cs).set(Some(sink)));
}

pub fn clear_sink() {
    critical_section::with(|cs| SINK.borrow(cs).set(None));
}

/// Fixed-capacity line that log messages are rendered into.
pub struct LogLine {
    buf: [u8; LINE_LEN],
    len: usize,
}

impl LogLine {
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_LEN],
            len: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        // Only whole `&str` chunks are copied in, but truncation may split a
        // multi-byte character; keep the valid prefix.
        match core::str::from_utf8(&self.buf[..self.len]) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&self.buf[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Default for LogLine {
    fn default() -> Self {
        Self::new()
    }
}

impl ufmt::uWrite for LogLine {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        let room = LINE_LEN - self.len;
        let n = s.len().min(room);
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}

/// Render a message and pass it to the sink. Used by the log macros.
pub fn emit(level: Level, render: impl FnOnce(&mut LogLine) -> Result<(), Infallible>) {
    if level > MAX_LEVEL {
        return;
    }
    let sink = critical_section::with(|cs| SINK.borrow(cs).get());
    if let Some(sink) = sink {
        let mut line = LogLine::new();
        let _ = render(&mut line);
        sink(level, line.as_str());
    }
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Level::Error, |w| ufmt::uwrite!(w, $($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Level::Warn, |w| ufmt::uwrite!(w, $($arg)*))
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Level::Info, |w| ufmt::uwrite!(w, $($arg)*))
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Level::Debug, |w| ufmt::uwrite!(w, $($arg)*))
    };
}
