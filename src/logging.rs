/*!
 * Run logger.
 *
 * Lines go to stderr with a colour per level. Once a training run has a
 * scratch directory, the same lines are also appended to the run log file so
 * that the whole run can be inspected afterwards.
 */

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

static RUN_LOG: Lazy<Mutex<Option<(PathBuf, File)>>> = Lazy::new(|| Mutex::new(None));

// @struct: Logger writing to stderr and the run log
pub struct PipelineLogger {
    level: LevelFilter,
}

impl PipelineLogger {
    // @creates: New logger with specified level
    pub fn new(level: LevelFilter) -> Self {
        PipelineLogger { level }
    }

    // @initializes: Global logger
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(PipelineLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

/// Start mirroring log lines into `path`
pub fn attach_run_log<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    let path = path.as_ref();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    *RUN_LOG.lock() = Some((path.to_path_buf(), file));
    Ok(())
}

impl Log for PipelineLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now();
        let mut stderr = std::io::stderr();
        let _ = writeln!(
            stderr,
            "{}{} {:5} {}\x1B[0m",
            Self::color_for_level(record.level()),
            now.format("%H:%M:%S.%3f"),
            record.level(),
            record.args()
        );

        if let Some((_, file)) = RUN_LOG.lock().as_mut() {
            let _ = writeln!(
                file,
                "{} {:5} [{}] {}",
                now.format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some((_, file)) = RUN_LOG.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

/// Detach the run log only if it is the one at `path`
pub fn release_run_log<P: AsRef<Path>>(path: P) -> bool {
    let mut guard = RUN_LOG.lock();
    if guard.as_ref().is_some_and(|(attached, _)| attached == path.as_ref()) {
        if let Some((_, mut file)) = guard.take() {
            let _ = file.flush();
        }
        return true;
    }
    false
}
