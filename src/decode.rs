//! 把一段原始配置解码到已有对象上
//!
//! 先把目标对象序列化成 JSON，再把输入按字段覆盖上去，最后反序列化回来。
//! 这样未出现的字段保留原值，未知字段被丢弃，类型不匹配的字段报错。

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// 字段名归一化：忽略大小写以及 `_`、`-` 分隔符
///
/// `maxSize`、`max_size`、`maxsize` 都会匹配到同一个字段。
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// 在对象中按归一化后的字段名查找
pub fn find_key<'a>(map: &'a Map<String, JsonValue>, key: &str) -> Option<(&'a String, &'a JsonValue)> {
    let wanted = normalize_key(key);
    map.iter().find(|(k, _)| normalize_key(k) == wanted)
}

/// 把 `incoming` 合并到 `base` 上
///
/// - 两边都是对象时逐字段合并，字段名按 [`normalize_key`] 匹配，
///   `base` 中不存在的字段被丢弃
/// - `base` 是空对象时（自由格式的 map）直接取 `incoming`
/// - `incoming` 为 null 视为未设置，保留 `base`
/// - 其他情况直接替换
pub fn merge_value(base: &mut JsonValue, incoming: &JsonValue) {
    match (base, incoming) {
        (_, JsonValue::Null) => {}
        (JsonValue::Object(base_map), JsonValue::Object(_)) if base_map.is_empty() => {
            *base_map = incoming.as_object().cloned().unwrap_or_default();
        }
        (JsonValue::Object(base_map), JsonValue::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                let wanted = normalize_key(key);
                let target = base_map
                    .iter_mut()
                    .find(|(k, _)| normalize_key(k) == wanted)
                    .map(|(_, v)| v);
                if let Some(slot) = target {
                    merge_value(slot, value);
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// 以 `target` 为底，解码 `incoming` 得到新的值
pub fn decode_onto<T>(target: &T, incoming: &JsonValue) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    if !incoming.is_object() && !incoming.is_null() {
        return Err(serde::de::Error::custom(format!(
            "expected an object, found {}",
            incoming
        )));
    }

    let mut base = serde_json::to_value(target)?;
    merge_value(&mut base, incoming);
    serde_json::from_value(base)
}
