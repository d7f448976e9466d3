use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::encoder::{ConsoleEncoder, Encoder, EncoderConfig, JsonEncoder};
use crate::error::{LoggerError, Result};

/// Encoder 构造函数类型
pub type EncoderConstructor = Arc<dyn Fn(&EncoderConfig) -> Result<Arc<dyn Encoder>> + Send + Sync>;

// 全局 encoder 注册表，内置 json 和 console
static ENCODERS: Lazy<RwLock<HashMap<String, EncoderConstructor>>> = Lazy::new(|| {
    let mut map: HashMap<String, EncoderConstructor> = HashMap::new();
    map.insert(
        "json".to_string(),
        Arc::new(|config: &EncoderConfig| -> Result<Arc<dyn Encoder>> {
            Ok(Arc::new(JsonEncoder::new(config.clone())))
        }),
    );
    map.insert(
        "console".to_string(),
        Arc::new(|config: &EncoderConfig| -> Result<Arc<dyn Encoder>> {
            Ok(Arc::new(ConsoleEncoder::new(config.clone())))
        }),
    );
    RwLock::new(map)
});

/// 注册自定义 encoder，同名覆盖
pub fn register_encoder<F>(name: &str, constructor: F) -> Result<()>
where
    F: Fn(&EncoderConfig) -> Result<Arc<dyn Encoder>> + Send + Sync + 'static,
{
    let mut encoders = ENCODERS
        .write()
        .map_err(|_| LoggerError::Config("encoder registry lock poisoned".to_string()))?;
    encoders.insert(name.to_string(), Arc::new(constructor));
    Ok(())
}

/// 根据名称和字段配置创建 encoder
pub fn new_encoder(name: &str, config: &EncoderConfig) -> Result<Arc<dyn Encoder>> {
    let constructor = {
        let encoders = ENCODERS
            .read()
            .map_err(|_| LoggerError::Config("encoder registry lock poisoned".to_string()))?;
        encoders
            .get(name)
            .cloned()
            .ok_or_else(|| LoggerError::UnknownEncoding(name.to_string()))?
    };
    constructor(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Entry, Field};
    use crate::level::Level;

    struct UpperEncoder;

    impl Encoder for UpperEncoder {
        fn encode_entry(&self, entry: &Entry, _fields: &[Field]) -> Result<Vec<u8>> {
            Ok(format!("{}\n", entry.message.to_uppercase()).into_bytes())
        }
    }

    #[test]
    fn test_builtin_encoders() -> anyhow::Result<()> {
        let entry = Entry::new(Level::Info, "msg");
        for name in ["json", "console"] {
            let encoder = new_encoder(name, &EncoderConfig::production())?;
            assert!(!encoder.encode_entry(&entry, &[])?.is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_unknown_encoding() {
        let err = new_encoder("xml", &EncoderConfig::default()).err().unwrap();
        assert!(matches!(err, LoggerError::UnknownEncoding(ref name) if name == "xml"));
    }

    #[test]
    fn test_register_custom_encoder() -> anyhow::Result<()> {
        register_encoder("upper", |_| Ok(Arc::new(UpperEncoder) as Arc<dyn Encoder>))?;

        let encoder = new_encoder("upper", &EncoderConfig::default())?;
        let bytes = encoder.encode_entry(&Entry::new(Level::Info, "hello"), &[])?;
        assert_eq!(bytes, b"HELLO\n");
        Ok(())
    }
}
