//! 进程级默认 logger
//!
//! 首次使用时按开发环境预设创建，可以通过 [`init`] 或 [`replace_default`] 替换。

use once_cell::sync::Lazy;
use std::sync::RwLock;

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::field::Field;
use crate::logger::Logger;
use crate::sugar::SugaredLogger;

static DEFAULT_LOGGER: Lazy<RwLock<Logger>> = Lazy::new(|| {
    let logger = LoggerConfig::development()
        .build([])
        .expect("Failed to create default logger");
    RwLock::new(logger)
});

/// 当前默认 logger
pub fn default_logger() -> Logger {
    match DEFAULT_LOGGER.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// 默认 logger 的 sugar 包装
pub fn sugar() -> SugaredLogger {
    default_logger().sugar()
}

/// 替换默认 logger，返回原来的 logger
pub fn replace_default(logger: Logger) -> Logger {
    let mut guard = match DEFAULT_LOGGER.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    std::mem::replace(&mut *guard, logger)
}

/// 按配置构建 logger 并设为默认
pub fn init(config: &LoggerConfig) -> Result<()> {
    let logger = config.build([])?;
    replace_default(logger);
    Ok(())
}

// ========== 默认 logger 的便捷方法 ==========

#[track_caller]
pub fn debug(message: impl Into<String>) {
    default_logger().debug(message)
}

#[track_caller]
pub fn info(message: impl Into<String>) {
    default_logger().info(message)
}

#[track_caller]
pub fn warn(message: impl Into<String>) {
    default_logger().warn(message)
}

#[track_caller]
pub fn error(message: impl Into<String>) {
    default_logger().error(message)
}

#[track_caller]
pub fn infom(message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
    default_logger().infom(message, fields)
}

#[track_caller]
pub fn errorm(message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
    default_logger().errorm(message, fields)
}

/// 刷新默认 logger
pub fn sync() -> Result<()> {
    default_logger().sync()
}
