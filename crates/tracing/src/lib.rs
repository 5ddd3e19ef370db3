//! Process-wide tracing setup. Exposes a [`LevelHandle`] so the admin
//! surface (spec §4.12) can change the active log level at runtime without
//! a restart, the same shape the teacher exposes through its own tracing
//! crate.

use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{reload, EnvFilter};

/// The levels the admin log-level endpoint accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    /// "crit" in the wire vocabulary; mapped onto `tracing::Level::ERROR`,
    /// the most severe level `tracing` has.
    Crit,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Crit => "crit",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct UnknownLogLevel(String);

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "crit" => Ok(LogLevel::Crit),
            other => Err(UnknownLogLevel(other.to_string())),
        }
    }
}

impl LogLevel {
    fn as_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Crit => "error",
        }
    }
}

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

impl LogLevel {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Crit,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            LogLevel::Trace => 0,
            LogLevel::Debug => 1,
            LogLevel::Info => 2,
            LogLevel::Warn => 3,
            LogLevel::Error => 4,
            LogLevel::Crit => 5,
        }
    }
}

/// A shared, thread-safe handle to the process's active log level.
#[derive(Clone)]
pub struct LevelHandle {
    handle: ReloadHandle,
    current: std::sync::Arc<std::sync::atomic::AtomicU8>,
}

impl LevelHandle {
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.current.load(std::sync::atomic::Ordering::Relaxed))
    }

    /// Updates the live filter, returning the previous level.
    pub fn set_level(&self, level: LogLevel) -> LogLevel {
        let previous =
            self.current.swap(level.as_u8(), std::sync::atomic::Ordering::Relaxed);
        let _ = self.handle.reload(EnvFilter::new(level.as_filter_directive()));
        LogLevel::from_u8(previous)
    }
}

/// Installs a process-wide `fmt` subscriber with a reloadable `EnvFilter`
/// seeded at `initial`, returning a handle the admin surface can use later.
/// Returns an error if a global subscriber is already installed.
pub fn init(initial: LogLevel) -> Result<LevelHandle, tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::new(initial.as_filter_directive());
    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).try_init()?;

    Ok(LevelHandle {
        handle,
        current: std::sync::Arc::new(std::sync::atomic::AtomicU8::new(initial.as_u8())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_admin_levels() {
        for s in ["trace", "debug", "info", "warn", "error", "crit"] {
            assert!(s.parse::<LogLevel>().is_ok());
        }
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}
