mod io_core;
mod sampler;
mod tee;

pub use io_core::IoCore;
pub use sampler::SamplerCore;
pub use tee::Tee;

use std::sync::Arc;

use crate::error::Result;
use crate::field::{Entry, Field};
use crate::level::Level;

/// 日志核心：过滤、编码并输出一条记录
///
/// logger 只负责组装 Entry，具体写到哪里、是否写由 Core 决定。
/// 多个 Core 可以通过 [`Tee`] 组合，通过 [`SamplerCore`] 包装。
pub trait Core: Send + Sync {
    /// 该级别是否会被输出
    fn enabled(&self, level: Level) -> bool;

    /// 返回附带上下文字段的新 Core
    fn with(&self, fields: &[Field]) -> Arc<dyn Core>;

    /// 输出一条记录，调用方需要先确认 `enabled`
    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()>;

    /// 刷新底层输出
    fn sync(&self) -> Result<()>;
}
