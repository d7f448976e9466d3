use serde_json::Value as JsonValue;
use std::io;

use crate::error::Result;

/// 日志输出目标 trait
///
/// 负责把编码后的日志字节写到目标介质。实现需要自行处理并发写入，
/// 同一个实例可能被多个 sink 共享。
pub trait LogWriter: Send + Sync {
    /// 写入一段字节，返回写入的长度
    fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// 刷新缓冲区（默认实现为空操作）
    fn sync(&self) -> io::Result<()> {
        Ok(())
    }

    /// 把 sink 的 settings 解码到当前实例上
    ///
    /// 只覆盖出现的字段，未知字段忽略；没有可配置项的 writer 保持默认实现即可
    fn configure(&self, settings: &JsonValue) -> Result<()> {
        let _ = settings;
        Ok(())
    }
}
