//! rustx-logger - 配置驱动的多 sink 结构化日志
//!
//! 一份配置（YAML / JSON / JSON5 / TOML）描述文档级默认值和一组具名 sink，
//! 构建出一个把每条日志分发到所有 sink 的 logger。
//!
//! ## 模块
//!
//! - **writer**: 输出目标（console、file-rotate、lumberjack）和具名注册表
//! - **sink**: sink 描述的两阶段解码
//! - **config**: 日志配置、预设和加载
//! - **builder**: 按 sink 组装 core 并合并成一个 logger
//! - **encoder**: json / console 编码器和字段命名
//! - **logcore**: 过滤、编码、输出的核心以及 tee、采样
//! - **global**: 进程级默认 logger
//! - **sugar**: 模板和空格连接风格的 logger 包装
//!
//! ## 示例
//!
//! ```ignore
//! use rustx_logger::LoggerConfig;
//!
//! let config = LoggerConfig::from_yaml(r#"
//! level: info
//! encoding: json
//! outputPaths: [stdout]
//! writes:
//!   - name: file-rotate
//!     level: debug
//!     writer:
//!       pattern: /var/log/app.%Y%m%d.log
//! "#)?;
//! let logger = config.build([])?;
//! rustx_logger::info!(logger, "server started", "port" => 8080);
//! ```

mod macros;

pub mod bridge;
pub mod builder;
pub mod config;
pub mod decode;
pub mod encoder;
pub mod error;
pub mod field;
pub mod global;
pub mod level;
pub mod logcore;
pub mod logger;
pub mod options;
pub mod sink;
pub mod sugar;
pub mod writer;

// 重新导出主要的公共 API
pub use bridge::install_log_bridge;
pub use config::{LoggerConfig, SamplingConfig};
pub use encoder::{new_encoder, register_encoder, Encoder, EncoderConfig};
pub use error::{LoggerError, Result};
pub use field::{Caller, Entry, Field, FieldValue};
pub use level::{AtomicLevel, Level};
pub use logcore::Core;
pub use logger::Logger;
pub use options::LoggerOption;
pub use sink::{decode_sink, decode_sinks, SinkConfig};
pub use sugar::SugaredLogger;
pub use writer::{
    get_writer, global_registry, register_writer, ConsoleWriter, FileRotateConfig, FileRotateWriter,
    LogWriter, RollingFileConfig, RollingFileWriter, WriterRegistry,
};
