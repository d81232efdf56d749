//! Non-fatal diagnostics channel.
//!
//! Misuse of the subscription API is reported here instead of returning an error. The default
//! [`ConsoleLogger`] routes to the `log` crate; hosts can plug in their own sink.

use log::{debug, error, info, trace, warn};

/// Log severity levels understood by the host logger.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Sink for diagnostics.
pub trait HostLogger {
    fn log(&self, level: LogLevel, message: &str);
}

/// A `HostLogger` that forwards to the `log` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl HostLogger for ConsoleLogger {
    #[inline]
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => trace!("[{}]: {message}", crate::PACKAGE_NAME),
            LogLevel::Debug => debug!("[{}]: {message}", crate::PACKAGE_NAME),
            LogLevel::Info => info!("[{}]: {message}", crate::PACKAGE_NAME),
            LogLevel::Warn => warn!("[{}]: {message}", crate::PACKAGE_NAME),
            LogLevel::Error => error!("[{}]: {message}", crate::PACKAGE_NAME),
        }
    }
}
