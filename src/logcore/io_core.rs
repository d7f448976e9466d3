use std::sync::Arc;

use crate::encoder::Encoder;
use crate::error::Result;
use crate::field::{Entry, Field};
use crate::level::{AtomicLevel, Level};
use crate::logcore::Core;
use crate::writer::LogWriter;

/// 单一输出的核心：一个 encoder、一个 writer、一个级别
pub struct IoCore {
    encoder: Arc<dyn Encoder>,
    out: Arc<dyn LogWriter>,
    level: AtomicLevel,
    context: Vec<Field>,
}

impl IoCore {
    pub fn new(encoder: Arc<dyn Encoder>, out: Arc<dyn LogWriter>, level: AtomicLevel) -> Self {
        Self {
            encoder,
            out,
            level,
            context: Vec::new(),
        }
    }

    /// 当前使用的级别句柄
    pub fn level(&self) -> &AtomicLevel {
        &self.level
    }
}

impl Core for IoCore {
    fn enabled(&self, level: Level) -> bool {
        self.level.enabled(level)
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Core> {
        let mut context = self.context.clone();
        context.extend_from_slice(fields);
        Arc::new(IoCore {
            encoder: self.encoder.clone(),
            out: self.out.clone(),
            level: self.level.clone(),
            context,
        })
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        let buf = if self.context.is_empty() {
            self.encoder.encode_entry(entry, fields)?
        } else {
            let mut all = Vec::with_capacity(self.context.len() + fields.len());
            all.extend_from_slice(&self.context);
            all.extend_from_slice(fields);
            self.encoder.encode_entry(entry, &all)?
        };
        self.out.write(&buf)?;

        // error 以上级别的日志可能紧接着退出进程，立即刷盘
        if entry.level > Level::Error {
            self.out.sync()?;
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.out.sync()?;
        Ok(())
    }
}
