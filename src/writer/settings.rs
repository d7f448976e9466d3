use garde::Validate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::RwLock;

use crate::decode::decode_onto;
use crate::error::{LoggerError, Result};

/// writer 内部持有的可热更新配置
///
/// `apply` 把一段 settings 解码到当前值上并校验，校验失败时保持原值不变
pub struct Settings<C> {
    inner: RwLock<C>,
}

impl<C> Settings<C>
where
    C: Serialize + DeserializeOwned + Validate + Clone,
    C::Context: Default,
{
    pub fn new(config: C) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// 当前配置的快照
    pub fn get(&self) -> C {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 解码并校验 settings，成功后替换当前配置
    pub fn apply(&self, settings: &JsonValue) -> Result<()> {
        let current = self.get();
        let decoded =
            decode_onto(&current, settings).map_err(|e| LoggerError::Settings(e.to_string()))?;
        decoded
            .validate()
            .map_err(|report| LoggerError::Settings(report.to_string().trim().to_string()))?;

        let mut guard = self
            .inner
            .write()
            .map_err(|_| LoggerError::Settings("settings lock poisoned".to_string()))?;
        *guard = decoded;
        Ok(())
    }
}
