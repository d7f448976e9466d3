use serde_json::Value as JsonValue;

use crate::encoder::{Encoder, EncoderConfig};
use crate::error::Result;
use crate::field::{Entry, Field, FieldValue};

/// JSON 编码器
///
/// 每条日志输出一行 JSON 对象，字段顺序：level、time、logger、caller、message、自定义字段、stacktrace
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

/// 字段值转 JSON，时长按配置编码
pub(crate) fn field_value_to_json(config: &EncoderConfig, value: &FieldValue) -> JsonValue {
    match value {
        FieldValue::Duration(d) => config.encode_duration(d),
        other => serde_json::to_value(other).unwrap_or(JsonValue::Null),
    }
}

fn push_entry(out: &mut String, key: &str, value: &JsonValue) -> Result<()> {
    if out.len() > 1 {
        out.push(',');
    }
    out.push_str(&serde_json::to_string(key)?);
    out.push(':');
    out.push_str(&serde_json::to_string(value)?);
    Ok(())
}

impl Encoder for JsonEncoder {
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>> {
        let cfg = &self.config;
        let mut out = String::with_capacity(128 + entry.message.len());
        out.push('{');

        if let Some(key) = EncoderConfig::active_key(&cfg.level_key) {
            push_entry(&mut out, key, &JsonValue::from(cfg.encode_level(entry.level)))?;
        }
        if let Some(key) = EncoderConfig::active_key(&cfg.time_key) {
            push_entry(&mut out, key, &cfg.encode_time(&entry.time))?;
        }
        if let (Some(key), Some(name)) = (EncoderConfig::active_key(&cfg.name_key), &entry.logger_name) {
            push_entry(&mut out, key, &JsonValue::from(name.as_str()))?;
        }
        if let (Some(key), Some(caller)) = (EncoderConfig::active_key(&cfg.caller_key), &entry.caller) {
            push_entry(&mut out, key, &JsonValue::from(cfg.encode_caller(caller)))?;
        }
        if let Some(key) = EncoderConfig::active_key(&cfg.message_key) {
            push_entry(&mut out, key, &JsonValue::from(entry.message.as_str()))?;
        }
        for field in fields {
            push_entry(&mut out, &field.key, &field_value_to_json(cfg, &field.value))?;
        }
        if let (Some(key), Some(stack)) = (EncoderConfig::active_key(&cfg.stacktrace_key), &entry.stack) {
            push_entry(&mut out, key, &JsonValue::from(stack.as_str()))?;
        }

        out.push('}');
        out.push_str(cfg.line_ending_or_default());
        Ok(out.into_bytes())
    }
}

crate::impl_from!(EncoderConfig => JsonEncoder);
crate::impl_box_from!(JsonEncoder => dyn Encoder);
