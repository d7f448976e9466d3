use std::fmt;
use std::sync::Arc;

use crate::config::SamplingConfig;
use crate::field::Field;
use crate::level::Level;
use crate::writer::LogWriter;

/// 构建 logger 时附加的选项
///
/// 配置文件中的 development / disableCaller / sampling 等字段最终都转换成这些选项，
/// 调用方传入的选项在它们之后应用。
#[derive(Clone)]
pub enum LoggerOption {
    /// 开发模式：dpanic 级别的日志会 panic
    Development,
    /// 是否记录调用位置
    WithCaller(bool),
    /// 该级别及以上的日志附带调用栈
    AddStacktrace(Level),
    /// 附加固定字段
    Fields(Vec<Field>),
    /// 写日志失败时的错误输出
    ErrorOutput(Arc<dyn LogWriter>),
    /// logger 名称，多次设置时用 `.` 连接
    Name(String),
    /// 采样
    Sampling(SamplingConfig),
}

impl fmt::Debug for LoggerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerOption::Development => write!(f, "Development"),
            LoggerOption::WithCaller(enabled) => write!(f, "WithCaller({})", enabled),
            LoggerOption::AddStacktrace(level) => write!(f, "AddStacktrace({})", level),
            LoggerOption::Fields(fields) => write!(f, "Fields({:?})", fields),
            LoggerOption::ErrorOutput(_) => write!(f, "ErrorOutput(..)"),
            LoggerOption::Name(name) => write!(f, "Name({})", name),
            LoggerOption::Sampling(sampling) => write!(f, "Sampling({:?})", sampling),
        }
    }
}
