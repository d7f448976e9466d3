use crate::error::Result;
use crate::field::{Entry, Field};

/// 日志编码器 trait
///
/// 负责把一条 Entry 及其字段编码为写入 sink 的字节
pub trait Encoder: Send + Sync {
    /// 编码日志记录，返回的内容已包含行结束符
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>>;
}
