use serde_json::{Map, Value as JsonValue};

use crate::encoder::json_encoder::field_value_to_json;
use crate::encoder::{Encoder, EncoderConfig};
use crate::error::Result;
use crate::field::{Entry, Field};

/// 控制台编码器
///
/// 时间、级别、logger 名称、调用位置、消息依次用分隔符（默认 tab）拼接，
/// 自定义字段以 JSON 对象追加在末尾，调用栈另起一行
pub struct ConsoleEncoder {
    config: EncoderConfig,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl Encoder for ConsoleEncoder {
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>> {
        let cfg = &self.config;
        let separator = EncoderConfig::active_key(&cfg.console_separator).unwrap_or("\t");
        let mut parts: Vec<String> = Vec::with_capacity(6);

        if EncoderConfig::active_key(&cfg.time_key).is_some() {
            match cfg.encode_time(&entry.time) {
                JsonValue::String(s) => parts.push(s),
                other => parts.push(other.to_string()),
            }
        }
        if EncoderConfig::active_key(&cfg.level_key).is_some() {
            parts.push(cfg.encode_level(entry.level));
        }
        if let (Some(_), Some(name)) = (EncoderConfig::active_key(&cfg.name_key), &entry.logger_name) {
            parts.push(name.clone());
        }
        if let (Some(_), Some(caller)) = (EncoderConfig::active_key(&cfg.caller_key), &entry.caller) {
            parts.push(cfg.encode_caller(caller));
        }
        if EncoderConfig::active_key(&cfg.message_key).is_some() {
            parts.push(entry.message.clone());
        }
        if !fields.is_empty() {
            let object: Map<String, JsonValue> = fields
                .iter()
                .map(|f| (f.key.clone(), field_value_to_json(cfg, &f.value)))
                .collect();
            parts.push(serde_json::to_string(&object)?);
        }

        let mut line = parts.join(separator);
        if let (Some(_), Some(stack)) = (EncoderConfig::active_key(&cfg.stacktrace_key), &entry.stack) {
            line.push('\n');
            line.push_str(stack);
        }
        line.push_str(cfg.line_ending_or_default());
        Ok(line.into_bytes())
    }
}

crate::impl_from!(EncoderConfig => ConsoleEncoder);
crate::impl_box_from!(ConsoleEncoder => dyn Encoder);
