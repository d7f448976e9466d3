// 具名 writer 注册表

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::writer::{ConsoleWriter, FileRotateWriter, LogWriter, RollingFileWriter};

/// 名称到 writer 实例的映射
///
/// 克隆得到的是同一张表的句柄。同名重复注册时后注册的覆盖先注册的，
/// 条目不会被单独删除。
#[derive(Clone, Default)]
pub struct WriterRegistry {
    writers: Arc<DashMap<String, Arc<dyn LogWriter>>>,
}

impl WriterRegistry {
    /// 创建一个空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建预置了内置 writer 的注册表：`console`、`lumberjack`、`file-rotate`
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register("console", Arc::new(ConsoleWriter::default()));
        registry.register("lumberjack", Arc::new(RollingFileWriter::default()));
        registry.register("file-rotate", Arc::new(FileRotateWriter::default()));
        registry
    }

    /// 注册 writer，同名覆盖
    pub fn register(&self, name: impl Into<String>, writer: Arc<dyn LogWriter>) {
        let name = name.into();
        log::debug!("register log writer [{}]", name);
        self.writers.insert(name, writer);
    }

    /// 按名称查找 writer，返回共享的实例
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn LogWriter>> {
        self.writers.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.writers.contains_key(name)
    }

    /// 已注册的名称，按字典序排列
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.writers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

// 进程级注册表，首次访问时注册内置 writer
static GLOBAL_REGISTRY: Lazy<WriterRegistry> = Lazy::new(WriterRegistry::with_defaults);

/// 进程级注册表
pub fn global_registry() -> &'static WriterRegistry {
    &GLOBAL_REGISTRY
}

/// 向进程级注册表注册 writer
pub fn register_writer(name: &str, writer: Arc<dyn LogWriter>) {
    GLOBAL_REGISTRY.register(name, writer);
}

/// 从进程级注册表查找 writer
pub fn get_writer(name: &str) -> Option<Arc<dyn LogWriter>> {
    GLOBAL_REGISTRY.lookup(name)
}
