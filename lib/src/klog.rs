use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KlogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl KlogLevel {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => KlogLevel::Error,
            1 => KlogLevel::Warn,
            2 => KlogLevel::Info,
            3 => KlogLevel::Debug,
            _ => KlogLevel::Trace,
        }
    }
}

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(KlogLevel::Info as u8);

#[inline(always)]
fn is_enabled(level: KlogLevel) -> bool {
    level as u8 <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

#[cfg(all(target_os = "none", target_arch = "x86_64"))]
mod sink {
    use crate::init_flag::InitFlag;
    use uart_16550::SerialPort;

    const COM1_BASE: u16 = 0x3F8;

    static SERIAL_READY: InitFlag = InitFlag::new();
    static COM1: spin::Mutex<Option<SerialPort>> = spin::Mutex::new(None);

    pub(super) fn attach() {
        let mut guard = COM1.lock();
        let mut port = unsafe { SerialPort::new(COM1_BASE) };
        port.init();
        *guard = Some(port);
        SERIAL_READY.mark_set();
    }

    pub(super) fn putc(byte: u8) {
        if !SERIAL_READY.is_set_relaxed() {
            return;
        }
        if let Some(port) = COM1.lock().as_mut() {
            port.send(byte);
        }
    }
}

// Hosted builds have no serial port to own; log output is discarded. The
// level gate and call sites compile identically on both targets.
#[cfg(not(all(target_os = "none", target_arch = "x86_64")))]
mod sink {
    pub(super) fn attach() {}

    pub(super) fn putc(_byte: u8) {}
}

fn write_bytes(bytes: &[u8]) {
    for &b in bytes {
        sink::putc(b);
    }
}

pub fn is_enabled_level(level: KlogLevel) -> bool {
    is_enabled(level)
}

pub fn log_args(level: KlogLevel, args: fmt::Arguments<'_>) {
    if !is_enabled(level) {
        return;
    }
    struct KlogWriter;
    impl fmt::Write for KlogWriter {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            write_bytes(s.as_bytes());
            Ok(())
        }
    }
    let _ = fmt::write(&mut KlogWriter, args);
    sink::putc(b'\n');
}

pub fn klog_attach_serial() {
    sink::attach();
}

pub fn klog_set_level(level: KlogLevel) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn klog_get_level() -> KlogLevel {
    KlogLevel::from_raw(CURRENT_LEVEL.load(Ordering::Relaxed))
}

#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {{
        $crate::klog::log_args($level, ::core::format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! klog_error {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Error, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_warn {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Warn, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_info {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Info, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_debug {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Debug, ::core::format_args!($($arg)*))
    };
}
