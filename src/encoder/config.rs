use chrono::{DateTime, Local, SecondsFormat};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::field::Caller;
use crate::level::Level;

/// 级别输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LevelEncoder {
    /// `INFO`
    Capital,
    /// 带颜色的 `INFO`
    CapitalColor,
    /// 带颜色的 `info`
    Color,
    /// `info`
    Lowercase,
}

impl From<String> for LevelEncoder {
    // 与原有配置习惯一致：无法识别的取值回退到 lowercase
    fn from(s: String) -> Self {
        match s.as_str() {
            "capital" => LevelEncoder::Capital,
            "capitalColor" | "capitalcolor" => LevelEncoder::CapitalColor,
            "color" => LevelEncoder::Color,
            _ => LevelEncoder::Lowercase,
        }
    }
}

impl From<LevelEncoder> for String {
    fn from(e: LevelEncoder) -> Self {
        match e {
            LevelEncoder::Capital => "capital",
            LevelEncoder::CapitalColor => "capitalColor",
            LevelEncoder::Color => "color",
            LevelEncoder::Lowercase => "lowercase",
        }
        .to_string()
    }
}

impl LevelEncoder {
    pub fn encode(&self, level: Level) -> String {
        match self {
            LevelEncoder::Capital => level.capital_str().to_string(),
            LevelEncoder::Lowercase => level.as_str().to_string(),
            LevelEncoder::CapitalColor => colorize(level, level.capital_str()),
            LevelEncoder::Color => colorize(level, level.as_str()),
        }
    }
}

fn colorize(level: Level, text: &str) -> String {
    match level {
        Level::Debug => text.magenta().to_string(),
        Level::Info => text.blue().to_string(),
        Level::Warn => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

/// 时间输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimeEncoder {
    /// `2006-01-02T15:04:05.000+0800`
    Iso8601,
    /// `2006-01-02T15:04:05+08:00`
    Rfc3339,
    /// `2006-01-02T15:04:05.999999999+08:00`
    Rfc3339Nano,
    /// 浮点秒
    Epoch,
    /// 浮点毫秒
    Millis,
    /// 整数纳秒
    Nanos,
}

impl From<String> for TimeEncoder {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "iso8601" => TimeEncoder::Iso8601,
            "rfc3339" => TimeEncoder::Rfc3339,
            "rfc3339nano" => TimeEncoder::Rfc3339Nano,
            "millis" => TimeEncoder::Millis,
            "nanos" => TimeEncoder::Nanos,
            _ => TimeEncoder::Epoch,
        }
    }
}

impl From<TimeEncoder> for String {
    fn from(e: TimeEncoder) -> Self {
        match e {
            TimeEncoder::Iso8601 => "ISO8601",
            TimeEncoder::Rfc3339 => "RFC3339",
            TimeEncoder::Rfc3339Nano => "RFC3339Nano",
            TimeEncoder::Epoch => "epoch",
            TimeEncoder::Millis => "millis",
            TimeEncoder::Nanos => "nanos",
        }
        .to_string()
    }
}

impl TimeEncoder {
    pub fn encode(&self, time: &DateTime<Local>) -> JsonValue {
        match self {
            TimeEncoder::Iso8601 => {
                JsonValue::from(time.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string())
            }
            TimeEncoder::Rfc3339 => JsonValue::from(time.to_rfc3339_opts(SecondsFormat::Secs, false)),
            TimeEncoder::Rfc3339Nano => {
                JsonValue::from(time.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
            TimeEncoder::Epoch => {
                let nanos = time.timestamp_nanos_opt().unwrap_or_default();
                JsonValue::from(nanos as f64 / 1e9)
            }
            TimeEncoder::Millis => {
                let nanos = time.timestamp_nanos_opt().unwrap_or_default();
                JsonValue::from(nanos as f64 / 1e6)
            }
            TimeEncoder::Nanos => JsonValue::from(time.timestamp_nanos_opt().unwrap_or_default()),
        }
    }
}

/// 时长输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DurationEncoder {
    /// `1.5s`
    String,
    Nanos,
    Ms,
    Secs,
}

impl From<String> for DurationEncoder {
    fn from(s: String) -> Self {
        match s.as_str() {
            "string" => DurationEncoder::String,
            "ms" => DurationEncoder::Ms,
            "secs" => DurationEncoder::Secs,
            _ => DurationEncoder::Nanos,
        }
    }
}

impl From<DurationEncoder> for String {
    fn from(e: DurationEncoder) -> Self {
        match e {
            DurationEncoder::String => "string",
            DurationEncoder::Nanos => "nanos",
            DurationEncoder::Ms => "ms",
            DurationEncoder::Secs => "secs",
        }
        .to_string()
    }
}

impl DurationEncoder {
    pub fn encode(&self, d: &Duration) -> JsonValue {
        match self {
            DurationEncoder::String => JsonValue::from(format!("{:?}", d)),
            DurationEncoder::Nanos => JsonValue::from(d.as_nanos() as u64),
            DurationEncoder::Ms => JsonValue::from(d.as_millis() as u64),
            DurationEncoder::Secs => JsonValue::from(d.as_secs_f64()),
        }
    }
}

/// 调用位置输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CallerEncoder {
    Full,
    Short,
}

impl From<String> for CallerEncoder {
    fn from(s: String) -> Self {
        match s.as_str() {
            "short" => CallerEncoder::Short,
            _ => CallerEncoder::Full,
        }
    }
}

impl From<CallerEncoder> for String {
    fn from(e: CallerEncoder) -> Self {
        match e {
            CallerEncoder::Full => "full",
            CallerEncoder::Short => "short",
        }
        .to_string()
    }
}

impl CallerEncoder {
    pub fn encode(&self, caller: &Caller) -> String {
        match self {
            CallerEncoder::Full => caller.full_path(),
            CallerEncoder::Short => caller.trimmed_path(),
        }
    }
}

/// Encoder 字段命名配置
///
/// 所有字段都是可选的：未设置（或为空字符串）的 key 表示不输出该部分。
/// sink 自己的配置通过 [`EncoderConfig::merge`] 与全局默认合并。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncoderConfig {
    pub message_key: Option<String>,
    pub level_key: Option<String>,
    pub time_key: Option<String>,
    pub name_key: Option<String>,
    pub caller_key: Option<String>,
    pub stacktrace_key: Option<String>,
    pub line_ending: Option<String>,
    pub level_encoder: Option<LevelEncoder>,
    pub time_encoder: Option<TimeEncoder>,
    pub duration_encoder: Option<DurationEncoder>,
    pub caller_encoder: Option<CallerEncoder>,
    pub console_separator: Option<String>,
}

fn key(s: &str) -> Option<String> {
    Some(s.to_string())
}

/// 覆盖值非空时取覆盖值，否则回退到默认值
fn pick(over: &Option<String>, base: &Option<String>) -> Option<String> {
    match over {
        Some(v) if !v.is_empty() => Some(v.clone()),
        _ => base.clone(),
    }
}

impl EncoderConfig {
    /// 开发环境字段命名
    pub fn development() -> Self {
        Self {
            message_key: key("M"),
            level_key: key("L"),
            time_key: key("T"),
            name_key: key("N"),
            caller_key: key("C"),
            stacktrace_key: key("S"),
            line_ending: key("\n"),
            level_encoder: Some(LevelEncoder::Capital),
            time_encoder: Some(TimeEncoder::Iso8601),
            duration_encoder: Some(DurationEncoder::String),
            caller_encoder: Some(CallerEncoder::Short),
            console_separator: None,
        }
    }

    /// 生产环境字段命名
    pub fn production() -> Self {
        Self {
            message_key: key("msg"),
            level_key: key("level"),
            time_key: key("ts"),
            name_key: key("logger"),
            caller_key: key("caller"),
            stacktrace_key: key("stacktrace"),
            line_ending: key("\n"),
            level_encoder: Some(LevelEncoder::Lowercase),
            time_encoder: Some(TimeEncoder::Epoch),
            duration_encoder: Some(DurationEncoder::Secs),
            caller_encoder: Some(CallerEncoder::Short),
            console_separator: None,
        }
    }

    /// 逐字段合并：`self` 中显式设置（非空）的字段优先，其余取 `base`
    ///
    /// 空字符串与未设置等价，不会抹掉 `base` 中已有的字段。
    pub fn merge(&self, base: &EncoderConfig) -> EncoderConfig {
        EncoderConfig {
            message_key: pick(&self.message_key, &base.message_key),
            level_key: pick(&self.level_key, &base.level_key),
            time_key: pick(&self.time_key, &base.time_key),
            name_key: pick(&self.name_key, &base.name_key),
            caller_key: pick(&self.caller_key, &base.caller_key),
            stacktrace_key: pick(&self.stacktrace_key, &base.stacktrace_key),
            line_ending: pick(&self.line_ending, &base.line_ending),
            level_encoder: self.level_encoder.or(base.level_encoder),
            time_encoder: self.time_encoder.or(base.time_encoder),
            duration_encoder: self.duration_encoder.or(base.duration_encoder),
            caller_encoder: self.caller_encoder.or(base.caller_encoder),
            console_separator: pick(&self.console_separator, &base.console_separator),
        }
    }

    pub(crate) fn active_key(key: &Option<String>) -> Option<&str> {
        key.as_deref().filter(|k| !k.is_empty())
    }

    pub(crate) fn line_ending_or_default(&self) -> &str {
        Self::active_key(&self.line_ending).unwrap_or("\n")
    }

    pub(crate) fn encode_level(&self, level: Level) -> String {
        self.level_encoder.unwrap_or(LevelEncoder::Lowercase).encode(level)
    }

    pub(crate) fn encode_time(&self, time: &DateTime<Local>) -> JsonValue {
        self.time_encoder.unwrap_or(TimeEncoder::Epoch).encode(time)
    }

    pub(crate) fn encode_duration(&self, d: &Duration) -> JsonValue {
        self.duration_encoder.unwrap_or(DurationEncoder::Nanos).encode(d)
    }

    pub(crate) fn encode_caller(&self, caller: &Caller) -> String {
        self.caller_encoder.unwrap_or(CallerEncoder::Full).encode(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_override_wins_per_field() {
        let base = EncoderConfig::development();
        let over = EncoderConfig {
            message_key: key("msg"),
            level_encoder: Some(LevelEncoder::Lowercase),
            ..Default::default()
        };

        let merged = over.merge(&base);
        assert_eq!(merged.message_key.as_deref(), Some("msg"));
        assert_eq!(merged.level_key.as_deref(), Some("L"));
        assert_eq!(merged.time_key.as_deref(), Some("T"));
        assert_eq!(merged.level_encoder, Some(LevelEncoder::Lowercase));
        assert_eq!(merged.time_encoder, Some(TimeEncoder::Iso8601));
    }

    #[test]
    fn test_merge_empty_does_not_erase() {
        let base = EncoderConfig::production();
        let over = EncoderConfig {
            message_key: key(""),
            ..Default::default()
        };

        let merged = over.merge(&base);
        assert_eq!(merged.message_key.as_deref(), Some("msg"));
    }

    #[test]
    fn test_merge_with_empty_base() {
        let over = EncoderConfig {
            caller_key: key("where"),
            ..Default::default()
        };

        let merged = over.merge(&EncoderConfig::default());
        assert_eq!(merged.caller_key.as_deref(), Some("where"));
        assert_eq!(merged.message_key, None);
    }

    #[test]
    fn test_encoder_config_from_json() {
        let config: EncoderConfig = serde_json::from_str(
            r#"{"messageKey": "M", "levelEncoder": "capital", "timeEncoder": "iso8601", "durationEncoder": "string", "callerEncoder": null}"#,
        )
        .unwrap();

        assert_eq!(config.message_key.as_deref(), Some("M"));
        assert_eq!(config.level_encoder, Some(LevelEncoder::Capital));
        assert_eq!(config.time_encoder, Some(TimeEncoder::Iso8601));
        assert_eq!(config.duration_encoder, Some(DurationEncoder::String));
        assert_eq!(config.caller_encoder, None);
    }

    #[test]
    fn test_level_encoder_unknown_falls_back() {
        assert_eq!(LevelEncoder::from("weird".to_string()), LevelEncoder::Lowercase);
        assert_eq!(LevelEncoder::Capital.encode(Level::Warn), "WARN");
        assert_eq!(LevelEncoder::Lowercase.encode(Level::DPanic), "dpanic");
    }

    #[test]
    fn test_duration_encoder() {
        let d = Duration::from_millis(1500);
        assert_eq!(DurationEncoder::String.encode(&d), JsonValue::from("1.5s"));
        assert_eq!(DurationEncoder::Ms.encode(&d), JsonValue::from(1500u64));
        assert_eq!(DurationEncoder::Secs.encode(&d), JsonValue::from(1.5));
    }
}
