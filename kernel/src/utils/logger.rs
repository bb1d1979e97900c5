/*
 * Simulator Logging Backend
 *
 * The kernel crate logs through the `log` facade and never installs a
 * backend on its own. Drivers call `init` once at start-up to route records
 * to stderr as `[LEVEL] message` lines.
 */

use std::io::Write;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// Custom logger implementation for SimLogger.
struct SimLogger;

impl log::Log for SimLogger {
    /// Checks if the given log level is enabled.
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    /// Logs the record by printing it to stderr.
    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// The SimLogger instance used for logging.
static LOGGER: SimLogger = SimLogger;

/// Installs the logger with the given maximum level.
///
/// # Errors
///
/// Fails if another logger has already been installed in this process.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

/// Parse a level name as used in the `SIMOS_LOG` environment variable.
///
/// Unknown or missing names fall back to `Info`.
pub fn level_from_name(name: Option<&str>) -> LevelFilter {
    name.and_then(|name| name.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse_with_fallback() {
        assert_eq!(level_from_name(Some("debug")), LevelFilter::Debug);
        assert_eq!(level_from_name(Some(" WARN ")), LevelFilter::Warn);
        assert_eq!(level_from_name(Some("chatty")), LevelFilter::Info);
        assert_eq!(level_from_name(None), LevelFilter::Info);
    }
}
