use std::sync::Arc;

use crate::error::Result;
use crate::field::{Entry, Field};
use crate::level::Level;
use crate::logcore::Core;

/// 把一条记录分发给多个 Core
///
/// 每个 Core 独立按自己的级别过滤，某个 Core 写入失败不影响其他 Core，
/// 全部写完后返回第一个错误。
#[derive(Clone, Default)]
pub struct Tee {
    cores: Vec<Arc<dyn Core>>,
}

impl Tee {
    pub fn new(cores: Vec<Arc<dyn Core>>) -> Self {
        Self { cores }
    }

    /// 组合多个 Core，只有一个时直接返回它
    pub fn combine(mut cores: Vec<Arc<dyn Core>>) -> Arc<dyn Core> {
        if cores.len() == 1 {
            if let Some(core) = cores.pop() {
                return core;
            }
        }
        Arc::new(Tee::new(cores))
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }
}

impl Core for Tee {
    fn enabled(&self, level: Level) -> bool {
        self.cores.iter().any(|core| core.enabled(level))
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Core> {
        Arc::new(Tee {
            cores: self.cores.iter().map(|core| core.with(fields)).collect(),
        })
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        let mut first_err = None;
        for core in self.cores.iter().filter(|core| core.enabled(entry.level)) {
            if let Err(e) = core.write(entry, fields) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn sync(&self) -> Result<()> {
        let mut first_err = None;
        for core in &self.cores {
            if let Err(e) = core.sync() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoggerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCore {
        level: Level,
        fail: bool,
        writes: Arc<AtomicUsize>,
    }

    impl Core for CountingCore {
        fn enabled(&self, level: Level) -> bool {
            level >= self.level
        }

        fn with(&self, _fields: &[Field]) -> Arc<dyn Core> {
            Arc::new(CountingCore {
                level: self.level,
                fail: self.fail,
                writes: self.writes.clone(),
            })
        }

        fn write(&self, _entry: &Entry, _fields: &[Field]) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LoggerError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "broken pipe",
                )));
            }
            Ok(())
        }

        fn sync(&self) -> Result<()> {
            Ok(())
        }
    }

    fn counting(level: Level, fail: bool) -> (Arc<dyn Core>, Arc<AtomicUsize>) {
        let writes = Arc::new(AtomicUsize::new(0));
        let core = Arc::new(CountingCore {
            level,
            fail,
            writes: writes.clone(),
        });
        (core, writes)
    }

    #[test]
    fn test_each_core_filters_independently() -> anyhow::Result<()> {
        let (debug_core, debug_writes) = counting(Level::Debug, false);
        let (warn_core, warn_writes) = counting(Level::Warn, false);
        let tee = Tee::new(vec![debug_core, warn_core]);

        assert!(tee.enabled(Level::Debug));
        tee.write(&Entry::new(Level::Debug, "debug"), &[])?;
        tee.write(&Entry::new(Level::Error, "error"), &[])?;

        assert_eq!(debug_writes.load(Ordering::SeqCst), 2);
        assert_eq!(warn_writes.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn test_failing_core_does_not_block_others() {
        let (bad, bad_writes) = counting(Level::Debug, true);
        let (good, good_writes) = counting(Level::Debug, false);
        let tee = Tee::new(vec![bad, good]);

        assert!(tee.write(&Entry::new(Level::Info, "msg"), &[]).is_err());
        assert_eq!(bad_writes.load(Ordering::SeqCst), 1);
        assert_eq!(good_writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_combine_single_core() {
        let (core, _) = counting(Level::Info, false);
        let combined = Tee::combine(vec![core.clone()]);
        assert!(Arc::ptr_eq(&combined, &core));
    }

    #[test]
    fn test_empty_tee() -> anyhow::Result<()> {
        let tee = Tee::default();
        assert!(tee.is_empty());
        assert!(!tee.enabled(Level::Fatal));
        tee.write(&Entry::new(Level::Info, "dropped"), &[])?;
        Ok(())
    }
}
