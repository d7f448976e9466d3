//! 格式化风格的 logger 包装
//!
//! ```ignore
//! let sugar = logger.sugar();
//! sugar.infof(format_args!("user {} logged in", user_id));
//! sugar.warnln(&[&"retry", &attempt, &"of", &max]);
//! ```

use std::fmt;

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::field::Field;
use crate::level::Level;
use crate::logger::Logger;
use crate::options::LoggerOption;

/// 参数按空格连接
fn join_args(args: &[&dyn fmt::Display]) -> String {
    args.iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 在 [`Logger`] 之上提供 `*f`（模板）和 `*ln`（空格连接）形式的方法
///
/// 与底层 logger 共享 core 和级别句柄，调用者位置指向调用 sugar 方法的位置。
#[derive(Clone)]
pub struct SugaredLogger {
    logger: Logger,
}

impl SugaredLogger {
    /// 按开发环境预设创建
    pub fn new(options: impl IntoIterator<Item = LoggerOption>) -> Result<Self> {
        Ok(LoggerConfig::development().build(options)?.sugar())
    }

    /// 取回底层 logger
    pub fn desugar(&self) -> Logger {
        self.logger.clone()
    }

    pub fn with(&self, fields: impl IntoIterator<Item = Field>) -> SugaredLogger {
        self.logger.with(fields).sugar()
    }

    pub fn named(&self, name: &str) -> SugaredLogger {
        self.logger.named(name).sugar()
    }

    pub fn sync(&self) -> Result<()> {
        self.logger.sync()
    }

    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        if level < Level::DPanic && !self.logger.enabled(level) {
            return;
        }
        self.logger.log(level, fmt::format(args));
    }

    #[track_caller]
    pub fn logln(&self, level: Level, args: &[&dyn fmt::Display]) {
        if level < Level::DPanic && !self.logger.enabled(level) {
            return;
        }
        self.logger.log(level, join_args(args));
    }

    /// info 级别
    #[track_caller]
    pub fn print(&self, message: impl Into<String>) {
        self.logger.info(message)
    }

    /// info 级别
    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Info, args)
    }

    /// info 级别
    #[track_caller]
    pub fn println(&self, args: &[&dyn fmt::Display]) {
        self.logln(Level::Info, args)
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Debug, args)
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Info, args)
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Warn, args)
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Error, args)
    }

    #[track_caller]
    pub fn dpanicf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::DPanic, args)
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Panic, args)
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Fatal, args)
    }

    #[track_caller]
    pub fn debugln(&self, args: &[&dyn fmt::Display]) {
        self.logln(Level::Debug, args)
    }

    #[track_caller]
    pub fn infoln(&self, args: &[&dyn fmt::Display]) {
        self.logln(Level::Info, args)
    }

    #[track_caller]
    pub fn warnln(&self, args: &[&dyn fmt::Display]) {
        self.logln(Level::Warn, args)
    }

    #[track_caller]
    pub fn errorln(&self, args: &[&dyn fmt::Display]) {
        self.logln(Level::Error, args)
    }

    #[track_caller]
    pub fn dpanicln(&self, args: &[&dyn fmt::Display]) {
        self.logln(Level::DPanic, args)
    }

    #[track_caller]
    pub fn panicln(&self, args: &[&dyn fmt::Display]) {
        self.logln(Level::Panic, args)
    }

    #[track_caller]
    pub fn fatalln(&self, args: &[&dyn fmt::Display]) {
        self.logln(Level::Fatal, args)
    }
}

impl Logger {
    /// 包装为 [`SugaredLogger`]
    pub fn sugar(&self) -> SugaredLogger {
        SugaredLogger {
            logger: self.clone(),
        }
    }
}
