//! sink 描述及其两阶段解码
//!
//! 一个 sink 描述形如：
//!
//! ```yaml
//! name: file-rotate        # 必填，对应注册表中的 writer
//! level: debug             # 可选，缺省时共享全局级别
//! encoding: json           # 可选，缺省时取全局 encoding
//! encoderConfig: {...}     # 可选，与全局字段命名逐字段合并
//! writer:                  # writer 自己的配置，也可以写在 settings 下或直接平铺
//!   pattern: /var/log/app.%Y%m%d.log
//! ```

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

use crate::decode::{decode_onto, find_key, normalize_key};
use crate::encoder::EncoderConfig;
use crate::error::{LoggerError, Result};
use crate::level::{AtomicLevel, Level};
use crate::writer::{LogWriter, WriterRegistry};

const DEFAULT_ENCODING: &str = "console";

// 不属于 writer 配置的保留字段
const RESERVED_KEYS: [&str; 6] = ["name", "level", "encoding", "encoderConfig", "writer", "settings"];

static NULL: JsonValue = JsonValue::Null;

/// 解码后的 sink
///
/// `writer` 是注册表中的共享实例，同名的多个 sink 拿到的是同一个对象。
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkConfig {
    pub name: String,
    #[serde(skip)]
    pub writer: Arc<dyn LogWriter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<AtomicLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder_config: Option<EncoderConfig>,
}

impl fmt::Debug for SinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkConfig")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("encoding", &self.encoding)
            .field("encoder_config", &self.encoder_config)
            .finish_non_exhaustive()
    }
}

impl SinkConfig {
    /// 生效的级别：自己有则用自己的，否则共享默认级别（同一个句柄）
    pub fn effective_level(&self, default: &AtomicLevel) -> AtomicLevel {
        self.level.clone().unwrap_or_else(|| default.clone())
    }

    /// 生效的编码：自己的 > 默认的 > `console`
    pub fn effective_encoding(&self, default: &str) -> String {
        match self.encoding.as_deref() {
            Some(encoding) if !encoding.is_empty() => encoding.to_string(),
            _ if !default.is_empty() => default.to_string(),
            _ => DEFAULT_ENCODING.to_string(),
        }
    }

    /// 生效的字段命名：与默认配置逐字段合并，自己设置的字段优先
    pub fn effective_encoder_config(&self, default: &EncoderConfig) -> EncoderConfig {
        match &self.encoder_config {
            Some(own) => own.merge(default),
            None => default.clone(),
        }
    }
}

/// 第一阶段：只取出 name
///
/// 字符串原样使用，数字和布尔值转成字符串，其他情况视为缺失
fn sink_name(map: &Map<String, JsonValue>) -> Result<String> {
    match find_key(map, "name").map(|(_, v)| v) {
        Some(JsonValue::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(JsonValue::Number(n)) => Ok(n.to_string()),
        Some(JsonValue::Bool(b)) => Ok(b.to_string()),
        _ => Err(LoggerError::MissingSinkName),
    }
}

fn decode_level(value: &JsonValue) -> Result<Option<AtomicLevel>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) if s.is_empty() => Ok(None),
        JsonValue::String(s) => Ok(Some(AtomicLevel::new(s.parse::<Level>()?))),
        other => Err(LoggerError::InvalidLevel(other.to_string())),
    }
}

fn decode_encoding(value: &JsonValue) -> Result<Option<String>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) if s.is_empty() => Ok(None),
        JsonValue::String(s) => Ok(Some(s.clone())),
        other => Err(LoggerError::Settings(format!(
            "encoding must be a string, found {}",
            other
        ))),
    }
}

fn decode_encoder_config(value: &JsonValue) -> Result<Option<EncoderConfig>> {
    if value.is_null() {
        return Ok(None);
    }
    let config = decode_onto(&EncoderConfig::default(), value)
        .map_err(|e| LoggerError::Settings(format!("encoderConfig: {}", e)))?;
    Ok(Some(config))
}

fn field<'a>(map: &'a Map<String, JsonValue>, key: &str) -> &'a JsonValue {
    find_key(map, key).map(|(_, v)| v).unwrap_or(&NULL)
}

/// 取出 writer 的配置：`writer` 对象 > `settings` 对象 > 平铺在 sink 上的其余字段
fn writer_settings(map: &Map<String, JsonValue>) -> JsonValue {
    for key in ["writer", "settings"] {
        if let Some((_, value)) = find_key(map, key) {
            if value.is_object() {
                return value.clone();
            }
        }
    }

    let reserved: Vec<String> = RESERVED_KEYS.iter().map(|k| normalize_key(k)).collect();
    let inline: Map<String, JsonValue> = map
        .iter()
        .filter(|(k, _)| !reserved.contains(&normalize_key(k)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    JsonValue::Object(inline)
}

/// 第二阶段：解码 sink 自身字段，并把 writer 配置解码到已解析的 writer 上
fn hydrate(
    name: String,
    writer: Arc<dyn LogWriter>,
    map: &Map<String, JsonValue>,
) -> Result<SinkConfig> {
    let level = decode_level(field(map, "level"))?;
    let encoding = decode_encoding(field(map, "encoding"))?;
    let encoder_config = decode_encoder_config(field(map, "encoderConfig"))?;

    writer.configure(&writer_settings(map))?;

    Ok(SinkConfig {
        name,
        writer,
        level,
        encoding,
        encoder_config,
    })
}

/// 把一个原始 sink 节点解码为 [`SinkConfig`]
///
/// 1. 取出 `name`，缺失时返回 [`LoggerError::MissingSinkName`]
/// 2. 在注册表中查找 writer，找不到时返回 [`LoggerError::UnsupportedSinkName`]
/// 3. 解码 level / encoding / encoderConfig，并把 writer 配置解码到该 writer 上
pub fn decode_sink(registry: &WriterRegistry, node: &JsonValue) -> Result<SinkConfig> {
    let map = node.as_object().ok_or(LoggerError::MissingSinkName)?;
    let name = sink_name(map)?;
    let writer = registry
        .lookup(&name)
        .ok_or_else(|| LoggerError::UnsupportedSinkName(name.clone()))?;

    log::debug!("decode sink [{}]", name);
    hydrate(name.clone(), writer, map).map_err(|e| e.in_sink(name))
}

/// 按顺序解码一组 sink 节点，任一失败则整体失败
pub fn decode_sinks(registry: &WriterRegistry, nodes: &[JsonValue]) -> Result<Vec<SinkConfig>> {
    nodes.iter().map(|node| decode_sink(registry, node)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{ConsoleWriter, FileRotateWriter, Target};
    use serde_json::json;
    use std::io;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingWriter {
        settings: Mutex<Vec<JsonValue>>,
    }

    impl LogWriter for RecordingWriter {
        fn write(&self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn configure(&self, settings: &JsonValue) -> Result<()> {
            self.settings.lock().unwrap().push(settings.clone());
            Ok(())
        }
    }

    fn registry_with_recorder() -> (WriterRegistry, Arc<RecordingWriter>) {
        let registry = WriterRegistry::with_defaults();
        let recorder = Arc::new(RecordingWriter::default());
        registry.register("recorder", recorder.clone());
        (registry, recorder)
    }

    #[test]
    fn test_missing_name() {
        let registry = WriterRegistry::with_defaults();
        for node in [json!({}), json!({"name": null}), json!({"name": ""}), json!({"name": []}), json!("console")] {
            let err = decode_sink(&registry, &node).err().unwrap();
            assert!(matches!(err, LoggerError::MissingSinkName), "{}", node);
        }
    }

    #[test]
    fn test_unsupported_name() {
        let registry = WriterRegistry::with_defaults();
        let err = decode_sink(&registry, &json!({"name": "syslog"})).err().unwrap();
        assert_eq!(err.to_string(), "unsupported sink name: syslog");
    }

    #[test]
    fn test_numeric_name_is_stringified() -> anyhow::Result<()> {
        let registry = WriterRegistry::new();
        registry.register("42", Arc::new(ConsoleWriter::default()));
        let sink = decode_sink(&registry, &json!({"name": 42}))?;
        assert_eq!(sink.name, "42");
        Ok(())
    }

    #[test]
    fn test_console_without_settings() -> anyhow::Result<()> {
        let registry = WriterRegistry::with_defaults();
        let sink = decode_sink(&registry, &json!({"name": "console"}))?;
        assert_eq!(sink.name, "console");
        assert!(sink.level.is_none());
        assert!(sink.encoding.is_none());
        assert!(sink.encoder_config.is_none());
        assert!(Arc::ptr_eq(&sink.writer, &registry.lookup("console").unwrap()));
        Ok(())
    }

    #[test]
    fn test_scalar_fields() -> anyhow::Result<()> {
        let registry = WriterRegistry::with_defaults();
        let sink = decode_sink(
            &registry,
            &json!({
                "name": "console",
                "level": "warn",
                "encoding": "json",
                "encoderConfig": {"messageKey": "message", "LevelKey": "severity"},
            }),
        )?;
        assert_eq!(sink.level.as_ref().unwrap().level(), Level::Warn);
        assert_eq!(sink.encoding.as_deref(), Some("json"));
        let encoder_config = sink.encoder_config.unwrap();
        assert_eq!(encoder_config.message_key.as_deref(), Some("message"));
        assert_eq!(encoder_config.level_key.as_deref(), Some("severity"));
        assert!(encoder_config.time_key.is_none());
        Ok(())
    }

    #[test]
    fn test_invalid_level() {
        let registry = WriterRegistry::with_defaults();
        let err = decode_sink(&registry, &json!({"name": "console", "level": "loud"}))
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("sink `console`"));

        assert!(decode_sink(&registry, &json!({"name": "console", "level": 3})).is_err());
    }

    #[test]
    fn test_settings_precedence() -> anyhow::Result<()> {
        let (registry, recorder) = registry_with_recorder();

        decode_sink(&registry, &json!({"name": "recorder", "writer": {"a": 1}, "settings": {"b": 2}}))?;
        decode_sink(&registry, &json!({"name": "recorder", "settings": {"b": 2}, "c": 3}))?;
        decode_sink(&registry, &json!({"name": "recorder", "level": "info", "c": 3, "Encoding": "json"}))?;
        decode_sink(&registry, &json!({"name": "recorder", "writer": "inline-settings", "d": 4}))?;

        let seen = recorder.settings.lock().unwrap().clone();
        assert_eq!(seen, vec![json!({"a": 1}), json!({"b": 2}), json!({"c": 3}), json!({"d": 4})]);
        Ok(())
    }

    #[test]
    fn test_settings_applied_to_writer() -> anyhow::Result<()> {
        let registry = WriterRegistry::with_defaults();
        let sink = decode_sink(&registry, &json!({"name": "console", "writer": {"Target": "stderr"}}))?;
        assert_eq!(sink.name, "console");

        let registry = WriterRegistry::new();
        let console = Arc::new(ConsoleWriter::default());
        registry.register("console", console.clone());
        decode_sink(&registry, &json!({"name": "console", "target": "stderr"}))?;
        assert_eq!(console.target(), Target::Stderr);
        Ok(())
    }

    #[test]
    fn test_settings_type_mismatch_names_sink() {
        let registry = WriterRegistry::new();
        registry.register("file-rotate", Arc::new(FileRotateWriter::default()));
        let err = decode_sink(
            &registry,
            &json!({"name": "file-rotate", "writer": {"pattern": "a.%Y.log", "maxAge": "week"}}),
        )
        .err()
        .unwrap();
        assert!(matches!(err, LoggerError::InvalidSink { ref name, .. } if name == "file-rotate"));
    }

    #[test]
    fn test_empty_pattern() {
        let registry = WriterRegistry::with_defaults();
        let err = decode_sink(&registry, &json!({"name": "file-rotate", "writer": {"pattern": ""}}))
            .err()
            .unwrap();
        assert!(err.to_string().contains("pattern required"), "{}", err);
    }

    #[test]
    fn test_effective_values() {
        let default_level = AtomicLevel::new(Level::Info);
        let default_fields = EncoderConfig::production();
        let inherit = SinkConfig {
            name: "console".to_string(),
            writer: Arc::new(ConsoleWriter::default()),
            level: None,
            encoding: None,
            encoder_config: None,
        };

        assert!(inherit.effective_level(&default_level).ptr_eq(&default_level));
        assert_eq!(inherit.effective_encoding("json"), "json");
        assert_eq!(inherit.effective_encoding(""), "console");
        assert_eq!(inherit.effective_encoder_config(&default_fields), default_fields);

        let own = SinkConfig {
            level: Some(AtomicLevel::new(Level::Debug)),
            encoding: Some("json".to_string()),
            encoder_config: Some(EncoderConfig {
                message_key: Some("message".to_string()),
                level_key: Some(String::new()),
                ..Default::default()
            }),
            ..inherit.clone()
        };
        assert!(!own.effective_level(&default_level).ptr_eq(&default_level));
        assert_eq!(own.effective_encoding("console"), "json");

        let merged = own.effective_encoder_config(&default_fields);
        assert_eq!(merged.message_key.as_deref(), Some("message"));
        assert_eq!(merged.level_key.as_deref(), Some("level"));
        assert_eq!(merged.time_key.as_deref(), Some("ts"));
    }

    #[test]
    fn test_decode_sinks_in_order() -> anyhow::Result<()> {
        let registry = WriterRegistry::with_defaults();
        let sinks = decode_sinks(
            &registry,
            &[json!({"name": "console"}), json!({"name": "lumberjack", "filename": "x.log"})],
        )?;
        let names: Vec<&str> = sinks.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["console", "lumberjack"]);

        assert!(decode_sinks(&registry, &[json!({"name": "console"}), json!({"name": "syslog"})]).is_err());
        Ok(())
    }
}
