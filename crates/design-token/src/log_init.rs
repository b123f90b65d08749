//! File logging for hosts that own the terminal or screen.
//!
//! ```no_run
//! design_token::log_init::init_logger("/tmp/design-tokens.log", log::LevelFilter::Debug);
//! log::debug!("logging to file");
//! ```

use std::fs::OpenOptions;
use std::io::Write;

use log::{LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;

/// Environment variable naming the log file for [`init_from_env`].
pub const LOG_FILE_ENV: &str = "DESIGN_TOKENS_LOG";
/// Environment variable holding the level for [`init_from_env`] (`debug` if unset).
pub const LOG_LEVEL_ENV: &str = "DESIGN_TOKENS_LOG_LEVEL";

static INSTALLED: OnceCell<()> = OnceCell::new();

struct FileLogger {
    file_path: String,
    level: LevelFilter,
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)
            {
                let _ = writeln!(
                    file,
                    "[{}] {}: {}",
                    record.level(),
                    record.target(),
                    record.args()
                );
            }
        }
    }

    fn flush(&self) {}
}

/// Appends log records at or above `level` to `path`.
///
/// Only the first call in a process installs a logger. Returns `false` if a
/// logger was already installed (by this function or anything else).
pub fn init_logger(path: &str, level: LevelFilter) -> bool {
    let mut installed = false;
    INSTALLED.get_or_init(|| {
        let logger = FileLogger {
            file_path: path.to_string(),
            level,
        };
        if log::set_boxed_logger(Box::new(logger)).is_ok() {
            log::set_max_level(level);
            installed = true;
        }
    });
    installed
}

/// Calls [`init_logger`] if [`LOG_FILE_ENV`] is set.
pub fn init_from_env() -> bool {
    let Ok(path) = std::env::var(LOG_FILE_ENV) else {
        return false;
    };
    let level = std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Debug);
    init_logger(&path, level)
}
