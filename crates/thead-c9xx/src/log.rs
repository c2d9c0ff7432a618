use core::{
    fmt,
    sync::atomic::{AtomicU8, Ordering},
};

use spin::Once;

use crate::hal::Processor;

macro_rules! log {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::log($level, format_args!($($arg)*));
    };
}

#[expect(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        log!($crate::log::LogLevel::Trace, $($arg)*);
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        log!($crate::log::LogLevel::Debug, $($arg)*);
    };
}

macro_rules! info {
    ($($arg:tt)*) => {
        log!($crate::log::LogLevel::Info, $($arg)*);
    };
}

macro_rules! warn {
    ($($arg:tt)*) => {
        log!($crate::log::LogLevel::Warn, $($arg)*);
    };
}

macro_rules! error {
    ($($arg:tt)*) => {
        log!($crate::log::LogLevel::Error, $($arg)*);
    };
}

static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static PROCESSOR: Once<&'static (dyn Processor + Sync)> = Once::new();

/// Installs the processor whose hart id tags each line.
pub fn set_processor(processor: &'static (dyn Processor + Sync)) {
    PROCESSOR.call_once(|| processor);
}

pub fn set_max_level(level: LogLevel) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

#[must_use]
pub fn max_level() -> LogLevel {
    LogLevel::from_raw(MAX_LEVEL.load(Ordering::Relaxed)).unwrap_or(LogLevel::Info)
}

#[must_use]
pub fn enabled(level: LogLevel) -> bool {
    level as u8 >= MAX_LEVEL.load(Ordering::Relaxed)
}

pub fn log(level: LogLevel, message: fmt::Arguments) {
    if !enabled(level) {
        return;
    }
    let processor = PROCESSOR.get().copied();
    println!(
        "{}",
        Line {
            processor,
            level,
            message
        }
    );
}

/// One log line: the calling hart, the level and the message.
struct Line<'a> {
    processor: Option<&'a (dyn Processor + Sync)>,
    level: LogLevel,
    message: fmt::Arguments<'a>,
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.processor {
            Some(processor) => write!(f, "[{}] ", processor.hart_id())?,
            None => f.write_str("[?] ")?,
        }
        write!(f, "{} {}", LevelFormat(self.level), self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    #[must_use]
    pub fn from_raw(raw: u8) -> Option<Self> {
        let level = match raw {
            0 => Self::Trace,
            1 => Self::Debug,
            2 => Self::Info,
            3 => Self::Warn,
            4 => Self::Error,
            _ => return None,
        };
        Some(level)
    }
}

struct LevelFormat(LogLevel);

impl fmt::Display for LevelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = match self.0 {
            LogLevel::Trace => 35,
            LogLevel::Debug => 34,
            LogLevel::Info => 32,
            LogLevel::Warn => 33,
            LogLevel::Error => 31,
        };
        let msg = match self.0 {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => " INFO",
            LogLevel::Warn => " WARN",
            LogLevel::Error => "ERROR",
        };
        write!(f, "\x1B[{color};1m{msg}\x1B[0m")
    }
}

#[cfg(test)]
mod tests {
    use std::string::ToString as _;

    use super::*;
    use crate::testing::FakeHal;

    #[test]
    fn test_level_from_raw() {
        assert_eq!(LogLevel::from_raw(0), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_raw(4), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_raw(5), None);
        assert!(LogLevel::Warn > LogLevel::Info);
    }

    #[test]
    fn test_line_is_tagged_with_hart() {
        let hal = FakeHal::new(3);
        let line = Line {
            processor: Some(&hal),
            level: LogLevel::Warn,
            message: format_args!("hart {} parked", 3),
        }
        .to_string();
        assert!(line.starts_with("[3] "));
        assert!(line.contains("WARN"));
        assert!(line.ends_with(" hart 3 parked"));

        hal.switch_hart(5);
        let line = Line {
            processor: Some(&hal),
            level: LogLevel::Info,
            message: format_args!("up"),
        }
        .to_string();
        assert!(line.starts_with("[5] "));

        let line = Line {
            processor: None,
            level: LogLevel::Error,
            message: format_args!("early"),
        }
        .to_string();
        assert!(line.starts_with("[?] "));
    }
}
