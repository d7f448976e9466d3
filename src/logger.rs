use chrono::Local;
use std::backtrace::Backtrace;
use std::panic::Location;
use std::sync::Arc;

use crate::error::LoggerError;
use crate::field::{Caller, Entry, Field};
use crate::level::{AtomicLevel, Level};
use crate::logcore::{Core, SamplerCore};
use crate::options::LoggerOption;
use crate::writer::{ConsoleWriter, ConsoleWriterConfig, LogWriter, Target};

const SAMPLING_TICK: std::time::Duration = std::time::Duration::from_secs(1);

/// 结构化日志器
///
/// clone 代价很低，所有 clone 共享同一组 core 和级别句柄。
/// 日志方法不返回错误，写入失败会输出到 error output。
#[derive(Clone)]
pub struct Logger {
    core: Arc<dyn Core>,
    level: AtomicLevel,
    name: Option<String>,
    development: bool,
    add_caller: bool,
    add_stack: Option<Level>,
    error_output: Arc<dyn LogWriter>,
}

impl Logger {
    /// 用给定 core 创建 logger，`level` 为对外暴露的级别句柄
    pub fn new(core: Arc<dyn Core>, level: AtomicLevel) -> Self {
        Self {
            core,
            level,
            name: None,
            development: false,
            add_caller: false,
            add_stack: None,
            error_output: Arc::new(ConsoleWriter::new(ConsoleWriterConfig {
                target: Target::Stderr,
            })),
        }
    }

    /// 依次应用选项，返回新的 logger
    pub fn with_options(&self, options: impl IntoIterator<Item = LoggerOption>) -> Logger {
        let mut logger = self.clone();
        for option in options {
            match option {
                LoggerOption::Development => logger.development = true,
                LoggerOption::WithCaller(enabled) => logger.add_caller = enabled,
                LoggerOption::AddStacktrace(level) => logger.add_stack = Some(level),
                LoggerOption::Fields(fields) => logger.core = logger.core.with(&fields),
                LoggerOption::ErrorOutput(out) => logger.error_output = out,
                LoggerOption::Name(name) => logger = logger.named(&name),
                LoggerOption::Sampling(sampling) => {
                    logger.core = Arc::new(SamplerCore::new(
                        logger.core.clone(),
                        SAMPLING_TICK,
                        sampling.initial,
                        sampling.thereafter,
                    ))
                }
            }
        }
        logger
    }

    /// 附加上下文字段
    pub fn with(&self, fields: impl IntoIterator<Item = Field>) -> Logger {
        let fields: Vec<Field> = fields.into_iter().collect();
        let mut logger = self.clone();
        if !fields.is_empty() {
            logger.core = self.core.with(&fields);
        }
        logger
    }

    /// 追加名称片段，用 `.` 连接
    pub fn named(&self, name: &str) -> Logger {
        let mut logger = self.clone();
        if name.is_empty() {
            return logger;
        }
        logger.name = Some(match &self.name {
            Some(parent) => format!("{}.{}", parent, name),
            None => name.to_string(),
        });
        logger
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// 默认级别句柄的当前值
    pub fn level(&self) -> Level {
        self.level.level()
    }

    /// 默认级别句柄，修改它会影响所有共享它的 sink
    pub fn atomic_level(&self) -> AtomicLevel {
        self.level.clone()
    }

    pub fn set_level(&self, level: Level) {
        self.level.set_level(level)
    }

    /// 是否有 core 会输出该级别
    pub fn enabled(&self, level: Level) -> bool {
        self.core.enabled(level)
    }

    pub fn sync(&self) -> crate::error::Result<()> {
        self.core.sync()
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.emit(level, message.into(), &[], Location::caller());
    }

    #[track_caller]
    pub fn logm(&self, level: Level, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        let fields: Vec<Field> = fields.into_iter().collect();
        self.emit(level, message.into(), &fields, Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.emit(Level::Debug, message.into(), &[], Location::caller());
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Level::Info, message.into(), &[], Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.emit(Level::Warn, message.into(), &[], Location::caller());
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Level::Error, message.into(), &[], Location::caller());
    }

    /// 开发模式下记录后 panic，生产模式下等同 error 以上级别的普通记录
    #[track_caller]
    pub fn dpanic(&self, message: impl Into<String>) {
        self.emit(Level::DPanic, message.into(), &[], Location::caller());
    }

    /// 记录后 panic
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) {
        self.emit(Level::Panic, message.into(), &[], Location::caller());
    }

    /// 记录并刷盘后以状态码 1 退出进程
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.emit(Level::Fatal, message.into(), &[], Location::caller());
    }

    #[track_caller]
    pub fn debugm(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.logm(Level::Debug, message, fields);
    }

    #[track_caller]
    pub fn infom(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.logm(Level::Info, message, fields);
    }

    #[track_caller]
    pub fn warnm(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.logm(Level::Warn, message, fields);
    }

    #[track_caller]
    pub fn errorm(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.logm(Level::Error, message, fields);
    }

    #[track_caller]
    pub fn dpanicm(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.logm(Level::DPanic, message, fields);
    }

    #[track_caller]
    pub fn panicm(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.logm(Level::Panic, message, fields);
    }

    #[track_caller]
    pub fn fatalm(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.logm(Level::Fatal, message, fields);
    }

    /// 写入一条已经带好调用位置的记录，供 `log` 桥接使用
    pub(crate) fn write_entry(&self, mut entry: Entry, fields: &[Field]) {
        if !self.core.enabled(entry.level) {
            return;
        }
        if entry.logger_name.is_none() {
            entry.logger_name = self.name.clone();
        }
        if !self.add_caller {
            entry.caller = None;
        }
        if self.add_stack.map_or(false, |min| entry.level >= min) {
            entry.stack = Some(Backtrace::force_capture().to_string());
        }
        if let Err(e) = self.core.write(&entry, fields) {
            self.report(&e);
        }
    }

    fn emit(&self, level: Level, message: String, fields: &[Field], location: &Location<'_>) {
        let terminal = level >= Level::DPanic;
        if !terminal && !self.core.enabled(level) {
            return;
        }

        let entry = Entry::new(level, message).with_caller(Caller::from(location));
        let message = if terminal { Some(entry.message.clone()) } else { None };
        self.write_entry(entry, fields);

        match (level, message) {
            (Level::DPanic, Some(message)) if self.development => panic!("{}", message),
            (Level::Panic, Some(message)) => panic!("{}", message),
            (Level::Fatal, _) => {
                if let Err(e) = self.sync() {
                    self.report(&e);
                }
                std::process::exit(1);
            }
            _ => {}
        }
    }

    fn report(&self, err: &LoggerError) {
        let line = format!(
            "{} write error: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.6f %z"),
            err
        );
        let _ = self.error_output.write(line.as_bytes());
        let _ = self.error_output.sync();
    }
}
