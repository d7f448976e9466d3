use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use smart_default::SmartDefault;
use std::path::Path;

use crate::builder::assemble;
use crate::decode::decode_onto;
use crate::encoder::EncoderConfig;
use crate::error::{LoggerError, Result};
use crate::field::{Field, FieldValue};
use crate::level::{AtomicLevel, Level};
use crate::logger::Logger;
use crate::options::LoggerOption;
use crate::sink::{decode_sinks, SinkConfig};
use crate::writer::{global_registry, LogWriter, WriterRegistry};

/// 采样配置：每秒内相同级别和消息的前 `initial` 条全部输出，之后每 `thereafter` 条输出一条
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SmartDefault)]
#[serde(default)]
pub struct SamplingConfig {
    #[default(100)]
    pub initial: u64,
    #[default(100)]
    pub thereafter: u64,
}

/// 日志配置
///
/// 文档级别的默认值加上一组 sink（`writes`）。`writes` 保留原始节点，
/// 构建时才按注册表解码，因此同一份配置可以对不同的注册表构建。
///
/// ```yaml
/// level: info
/// encoding: json
/// outputPaths: [stdout]
/// writes:
///   - name: console
///   - name: file-rotate
///     level: debug
///     writer:
///       pattern: /var/log/app.%Y%m%d.log
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    /// 默认级别，未设置时构建为 info；所有未指定 level 的 sink 共享这个句柄
    pub level: Option<AtomicLevel>,
    pub development: bool,
    pub disable_caller: bool,
    pub disable_stacktrace: bool,
    pub sampling: Option<SamplingConfig>,
    pub encoding: String,
    pub encoder_config: EncoderConfig,
    pub output_paths: Vec<String>,
    pub error_output_paths: Vec<String>,
    pub initial_fields: Map<String, JsonValue>,
    pub writes: Vec<JsonValue>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl LoggerConfig {
    /// 开发环境预设：debug 级别、console 编码、输出到 stderr
    pub fn development() -> Self {
        Self {
            level: Some(AtomicLevel::new(Level::Debug)),
            development: true,
            disable_caller: false,
            disable_stacktrace: false,
            sampling: None,
            encoding: "console".to_string(),
            encoder_config: EncoderConfig::development(),
            output_paths: vec!["stderr".to_string()],
            error_output_paths: vec!["stderr".to_string()],
            initial_fields: Map::new(),
            writes: Vec::new(),
        }
    }

    /// 生产环境预设：info 级别、json 编码、采样 100/100、输出到 stderr
    pub fn production() -> Self {
        Self {
            level: Some(AtomicLevel::new(Level::Info)),
            development: false,
            sampling: Some(SamplingConfig::default()),
            encoding: "json".to_string(),
            encoder_config: EncoderConfig::production(),
            ..Self::development()
        }
    }

    /// 以开发环境预设为底解码配置，出现的字段覆盖预设，null 视为未设置
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        Ok(decode_onto(&Self::development(), value)?)
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json_str)?;
        Self::from_value(&value)
    }

    /// 支持注释、尾随逗号、未引用的键
    pub fn from_json5(json_str: &str) -> Result<Self> {
        let value: JsonValue = json5::from_str(json_str)?;
        Self::from_value(&value)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml_str)?;
        Self::from_value(&value)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let value: JsonValue = toml::from_str(toml_str)?;
        Self::from_value(&value)
    }

    /// 按扩展名选择格式读取配置文件：json、json5、yaml/yml、toml
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("json5") => Self::from_json5(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("toml") => Self::from_toml(&content),
            other => Err(LoggerError::Config(format!(
                "unsupported config file extension: {}",
                other.unwrap_or("")
            ))),
        }
    }

    /// 使用给定注册表解码 `writes`
    pub fn decode_writes(&self, registry: &WriterRegistry) -> Result<Vec<SinkConfig>> {
        decode_sinks(registry, &self.writes)
    }

    /// 使用进程级注册表构建 logger
    pub fn build(&self, options: impl IntoIterator<Item = LoggerOption>) -> Result<Logger> {
        self.build_with(global_registry(), options)
    }

    /// 使用给定注册表构建 logger，任何一步失败都不返回 logger
    pub fn build_with(
        &self,
        registry: &WriterRegistry,
        options: impl IntoIterator<Item = LoggerOption>,
    ) -> Result<Logger> {
        let sinks = self.decode_writes(registry)?;
        assemble(self, &sinks, options)
    }

    /// 配置字段对应的构建选项
    pub(crate) fn build_options(&self, error_output: std::sync::Arc<dyn LogWriter>) -> Vec<LoggerOption> {
        let mut options = vec![LoggerOption::ErrorOutput(error_output)];
        if self.development {
            options.push(LoggerOption::Development);
        }
        if !self.disable_caller {
            options.push(LoggerOption::WithCaller(true));
        }
        if !self.disable_stacktrace {
            let level = if self.development { Level::Warn } else { Level::Error };
            options.push(LoggerOption::AddStacktrace(level));
        }
        if let Some(sampling) = &self.sampling {
            options.push(LoggerOption::Sampling(sampling.clone()));
        }
        if !self.initial_fields.is_empty() {
            let fields = self
                .initial_fields
                .iter()
                .map(|(k, v)| Field::new(k.clone(), FieldValue::from(v.clone())))
                .collect();
            options.push(LoggerOption::Fields(fields));
        }
        options
    }
}
