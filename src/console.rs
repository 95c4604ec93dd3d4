//! Debug console driver, for text output
//!
//! The unit has no console of its own; output goes through a byte sink the
//! startup code may install (SWO, semihosting, a spare UART). Without a
//! sink, printing is a no-op.

use core::fmt::{self, Write};

use spin::Mutex;

static SINK: Mutex<Option<fn(u8)>> = Mutex::new(None);

/// Installs the byte sink behind `print!`; `None` silences output.
pub fn set_sink(sink: Option<fn(u8)>) {
    *SINK.lock() = sink;
}

struct Stdout;

impl Write for Stdout {
    /// write str to the installed sink
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(sink) = *SINK.lock() {
            for byte in s.bytes() {
                sink(byte);
            }
        }
        Ok(())
    }
}

/// Print to the debug console using the format string and arguments.
pub fn print(args: fmt::Arguments) {
    let _ = Stdout.write_fmt(args);
}

/// Print! macro to the debug console using the format string and arguments.
#[macro_export]
macro_rules! print {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!($fmt $(, $($arg)+)?))
    }
}

/// Println! macro to the debug console using the format string and arguments.
#[macro_export]
macro_rules! println {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?))
    }
}
