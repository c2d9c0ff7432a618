use core::fmt::{self, Write as _};

use spin::{Mutex, Once};

/// A character device the firmware prints to.
pub trait ConsoleDevice: Sync {
    fn name(&self) -> &'static str;

    /// Transmits one byte, blocking until the device accepts it.
    fn putc(&self, ch: u8);

    /// Receives one byte if one is available.
    fn getc(&self) -> Option<u8>;
}

static CONSOLE: Once<&'static dyn ConsoleDevice> = Once::new();
static WRITE_LOCK: Mutex<()> = Mutex::new(());

/// Installs the console. Only the first call has an effect.
pub fn set_device(device: &'static dyn ConsoleDevice) -> bool {
    let mut installed = false;
    CONSOLE.call_once(|| {
        installed = true;
        device
    });
    installed
}

#[must_use]
pub fn device() -> Option<&'static dyn ConsoleDevice> {
    CONSOLE.get().copied()
}

struct ConsoleWriter<'a>(&'a dyn ConsoleDevice);

impl fmt::Write for ConsoleWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.0.putc(b'\r');
            }
            self.0.putc(byte);
        }
        Ok(())
    }
}

/// Formats `args` onto `device`, translating `\n` into `\r\n`.
pub fn write_to(device: &dyn ConsoleDevice, args: fmt::Arguments) {
    let _ = ConsoleWriter(device).write_fmt(args);
}

pub fn print(args: fmt::Arguments) {
    let Some(device) = device() else {
        return;
    };
    let _guard = WRITE_LOCK.lock();
    write_to(device, args);
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::console::print(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! println {
    () => {
        $crate::print!("\n")
    };
    ($($arg:tt)*) => {
        $crate::print!("{}\n", format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use std::{string::String, vec::Vec};

    use super::*;

    struct Recorder(Mutex<Vec<u8>>);

    impl ConsoleDevice for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn putc(&self, ch: u8) {
            self.0.lock().push(ch);
        }

        fn getc(&self) -> Option<u8> {
            None
        }
    }

    #[test]
    fn test_newline_translation() {
        let recorder = Recorder(Mutex::new(Vec::new()));
        write_to(&recorder, format_args!("hart {}\nready\n", 3));
        let out = String::from_utf8(recorder.0.lock().clone()).unwrap();
        assert_eq!(out, "hart 3\r\nready\r\n");
    }
}
