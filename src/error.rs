use thiserror::Error;

/// 日志构建相关错误类型
///
/// 配置错误和资源错误在构建阶段返回给调用方；
/// 单条日志的写入错误不会走到这里，而是输出到 error output。
#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("missing sink name")]
    MissingSinkName,

    #[error("unsupported sink name: {0}")]
    UnsupportedSinkName(String),

    #[error("sink `{name}`: {source}")]
    InvalidSink {
        name: String,
        #[source]
        source: Box<LoggerError>,
    },

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("invalid level: {0}")]
    InvalidLevel(String),

    #[error("failed to open sink `{path}`: {source}")]
    OpenSink {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("json5 error: {0}")]
    Json5(#[from] json5::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoggerError {
    /// 把某个 sink 的解码错误包装上 sink 名称
    pub fn in_sink(self, name: impl Into<String>) -> Self {
        LoggerError::InvalidSink {
            name: name.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoggerError>;
