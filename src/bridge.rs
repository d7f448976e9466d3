//! `log` crate 桥接：让 `log::info!` 等宏写到 [`Logger`]

use crate::error::{LoggerError, Result};
use crate::field::{Caller, Entry, Field};
use crate::level::Level;
use crate::logger::Logger;

fn from_log_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        Logger::enabled(self, from_log_level(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let level = from_log_level(record.level());
        if !Logger::enabled(self, level) {
            return;
        }

        let mut entry = Entry::new(level, record.args().to_string());
        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            entry.caller = Some(Caller {
                file: file.to_string(),
                line,
            });
        }
        self.write_entry(entry, &[Field::new("target", record.target())]);
    }

    fn flush(&self) {
        let _ = self.sync();
    }
}

/// 把 logger 安装为 `log` crate 的全局后端，每个进程只能安装一次
pub fn install_log_bridge(logger: Logger) -> Result<()> {
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| LoggerError::Config(format!("install log bridge: {}", e)))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
