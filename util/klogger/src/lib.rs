// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! `log` backend for the kernel.
//!
//! With the `std` feature records go to stdout with a wall-clock timestamp.
//! Otherwise they go to whatever sink was installed with [`set_output`];
//! records logged before a sink exists are dropped.
#![cfg_attr(not(any(feature = "std", test)), no_std)]

extern crate alloc;
extern crate log;

use alloc::boxed::Box;
use core::{
    fmt::{self, Write},
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

use log::{Level, LevelFilter, Log, Metadata, Record};
pub use log::{debug, error, info, trace, warn};
use spin::{Mutex, Once};

#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => {
        let _ = $crate::print_fmt(format_args!($($arg)*));
    }
}

#[macro_export]
macro_rules! kprintln {
    () => { $crate::kprint!("\n") };
    ($($arg:tt)*) => {
        let _ = $crate::print_fmt(format_args!("{}\n", format_args!($($arg)*)));
    }
}

macro_rules! color_fmt {
    ($color_code:expr, $($arg:tt)*) => {
        format_args!("\u{1B}[{}m{}\u{1B}[m", $color_code as u8, format_args!($($arg)*))
    };
}

#[repr(u8)]
#[allow(dead_code)]
enum AnsiColor {
    Red         = 31,
    Green       = 32,
    Yellow      = 33,
    Cyan        = 36,
    White       = 37,
    BrightBlack = 90,
}

/// Output sink used when the `std` feature is off.
pub type OutputFn = Box<dyn Fn(&str) + Send + Sync>;

static OUTPUT: Once<OutputFn> = Once::new();
static SEQ: AtomicU64 = AtomicU64::new(0);

/// Installs the console sink. Only the first call has an effect.
pub fn set_output(f: OutputFn) {
    OUTPUT.call_once(|| f);
}

struct KernelLogger;

impl Write for KernelLogger {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        cfg_if::cfg_if! {
            if #[cfg(feature = "std")] {
                std::print!("{s}");
            } else {
                if let Some(out) = OUTPUT.get() {
                    out(s);
                }
            }
        }
        Ok(())
    }
}

impl Log for KernelLogger {
    #[inline]
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = record.level();
        let line = record.line().unwrap_or(0);
        let path = record.target();
        let color = match level {
            Level::Error => AnsiColor::Red,
            Level::Warn => AnsiColor::Yellow,
            Level::Info => AnsiColor::Green,
            Level::Debug => AnsiColor::Cyan,
            Level::Trace => AnsiColor::BrightBlack,
        };
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);

        cfg_if::cfg_if! {
            if #[cfg(feature = "std")] {
                let _ = print_fmt(color_fmt!(
                    AnsiColor::White,
                    "[{time} #{seq} {path}:{line}] {args}\n",
                    time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
                    seq = seq,
                    path = path,
                    line = line,
                    args = color_fmt!(color, "{}", record.args()),
                ));
            } else {
                let _ = print_fmt(color_fmt!(
                    AnsiColor::White,
                    "[#{seq} {path}:{line}] {args}\n",
                    seq = seq,
                    path = path,
                    line = line,
                    args = color_fmt!(color, "{}", record.args()),
                ));
            }
        }
    }

    fn flush(&self) {}
}

/// Writes formatted text to the log sink, serialized across CPUs.
pub fn print_fmt(args: fmt::Arguments) -> fmt::Result {
    static LOCK: Mutex<()> = Mutex::new(());

    let _guard = LOCK.lock();
    KernelLogger.write_fmt(args)
}

/// Installs the kernel logger with a `Warn` filter.
///
/// Calling it again is harmless; the first installed logger stays.
pub fn init_klogger() {
    if log::set_logger(&KernelLogger).is_ok() {
        log::set_max_level(LevelFilter::Warn);
    }
}

/// Sets the maximum level from a string such as `"debug"`; unknown
/// strings turn logging off.
pub fn set_log_level(level: &str) {
    let lf = LevelFilter::from_str(level)
        .ok()
        .unwrap_or(LevelFilter::Off);
    log::set_max_level(lf);
}
