use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::field::{Entry, Field};
use crate::level::Level;
use crate::logcore::Core;

const LEVEL_COUNT: usize = Level::Fatal as usize + 1;
const COUNTERS_PER_LEVEL: usize = 4096;

/// 单个计数槽；`reset_at` 是相对 `Counters::epoch` 的纳秒数
#[derive(Default)]
struct Counter {
    reset_at: AtomicU64,
    count: AtomicU64,
}

impl Counter {
    fn inc_check_reset(&self, now: u64, tick: u64) -> u64 {
        let reset_at = self.reset_at.load(Ordering::Acquire);
        if reset_at > now {
            return self.count.fetch_add(1, Ordering::AcqRel) + 1;
        }

        self.count.store(1, Ordering::Release);
        let next = now.saturating_add(tick);
        if self
            .reset_at
            .compare_exchange(reset_at, next, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // 其他线程已经完成本轮重置
            return self.count.fetch_add(1, Ordering::AcqRel) + 1;
        }
        1
    }
}

/// 固定大小的计数表，按级别分区，消息按哈希落到槽位
///
/// 不同消息可能共用一个槽位，内存占用与消息数量无关。
struct Counters {
    epoch: Instant,
    slots: Vec<Counter>,
}

impl Counters {
    fn new() -> Self {
        Self {
            epoch: Instant::now(),
            slots: (0..LEVEL_COUNT * COUNTERS_PER_LEVEL)
                .map(|_| Counter::default())
                .collect(),
        }
    }

    fn get(&self, level: Level, message: &str) -> &Counter {
        let index = level as usize * COUNTERS_PER_LEVEL + fnv32a(message) as usize % COUNTERS_PER_LEVEL;
        &self.slots[index]
    }

    fn now(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// FNV-1a 32 位哈希
fn fnv32a(s: &str) -> u32 {
    const OFFSET: u32 = 2166136261;
    const PRIME: u32 = 16777619;
    s.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ byte as u32).wrapping_mul(PRIME))
}

/// 采样核心
///
/// 每个 tick 内，相同级别和消息的记录前 `first` 条全部输出，
/// 之后每 `thereafter` 条输出一条；`thereafter` 为 0 时之后的全部丢弃。
pub struct SamplerCore {
    inner: Arc<dyn Core>,
    tick: Duration,
    first: u64,
    thereafter: u64,
    counts: Arc<Counters>,
}

impl SamplerCore {
    pub fn new(inner: Arc<dyn Core>, tick: Duration, first: u64, thereafter: u64) -> Self {
        Self {
            inner,
            tick,
            first,
            thereafter,
            counts: Arc::new(Counters::new()),
        }
    }

    fn sampled(&self, entry: &Entry) -> bool {
        let tick = u64::try_from(self.tick.as_nanos()).unwrap_or(u64::MAX);
        let n = self
            .counts
            .get(entry.level, &entry.message)
            .inc_check_reset(self.counts.now(), tick);

        if n <= self.first {
            return true;
        }
        self.thereafter > 0 && (n - self.first) % self.thereafter == 0
    }
}

impl Core for SamplerCore {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Core> {
        Arc::new(SamplerCore {
            inner: self.inner.with(fields),
            tick: self.tick,
            first: self.first,
            thereafter: self.thereafter,
            counts: self.counts.clone(),
        })
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        if !self.sampled(entry) {
            return Ok(());
        }
        self.inner.write(entry, fields)
    }

    fn sync(&self) -> Result<()> {
        self.inner.sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCore(Arc<AtomicUsize>);

    impl Core for CountingCore {
        fn enabled(&self, _level: Level) -> bool {
            true
        }

        fn with(&self, _fields: &[Field]) -> Arc<dyn Core> {
            Arc::new(CountingCore(self.0.clone()))
        }

        fn write(&self, _entry: &Entry, _fields: &[Field]) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn sync(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_first_then_every_nth() -> anyhow::Result<()> {
        let writes = Arc::new(AtomicUsize::new(0));
        let sampler = SamplerCore::new(
            Arc::new(CountingCore(writes.clone())),
            Duration::from_secs(60),
            3,
            5,
        );

        let entry = Entry::new(Level::Info, "repeated");
        for _ in 0..23 {
            sampler.write(&entry, &[])?;
        }
        // 前 3 条，之后第 5、10、15、20 条
        assert_eq!(writes.load(Ordering::SeqCst), 3 + 4);
        Ok(())
    }

    #[test]
    fn test_messages_counted_separately() -> anyhow::Result<()> {
        let writes = Arc::new(AtomicUsize::new(0));
        let sampler = SamplerCore::new(
            Arc::new(CountingCore(writes.clone())),
            Duration::from_secs(60),
            1,
            0,
        );

        for _ in 0..5 {
            sampler.write(&Entry::new(Level::Info, "a"), &[])?;
            sampler.write(&Entry::new(Level::Info, "b"), &[])?;
            sampler.write(&Entry::new(Level::Warn, "a"), &[])?;
        }
        assert_eq!(writes.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[test]
    fn test_counter_resets_after_tick() -> anyhow::Result<()> {
        let writes = Arc::new(AtomicUsize::new(0));
        let sampler = SamplerCore::new(
            Arc::new(CountingCore(writes.clone())),
            Duration::from_millis(20),
            1,
            0,
        );

        let entry = Entry::new(Level::Info, "tick");
        sampler.write(&entry, &[])?;
        sampler.write(&entry, &[])?;
        std::thread::sleep(Duration::from_millis(40));
        sampler.write(&entry, &[])?;
        assert_eq!(writes.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[test]
    fn test_counter_table_is_bounded() -> anyhow::Result<()> {
        let writes = Arc::new(AtomicUsize::new(0));
        let sampler = SamplerCore::new(
            Arc::new(CountingCore(writes.clone())),
            Duration::from_millis(1),
            1,
            0,
        );

        for i in 0..50_000 {
            sampler.write(&Entry::new(Level::Info, format!("user {}", i)), &[])?;
        }
        std::thread::sleep(Duration::from_millis(5));
        sampler.write(&Entry::new(Level::Info, "after tick"), &[])?;

        assert_eq!(sampler.counts.slots.len(), LEVEL_COUNT * COUNTERS_PER_LEVEL);
        assert!(writes.load(Ordering::SeqCst) > 0);
        Ok(())
    }

    #[test]
    fn test_fnv32a() {
        assert_eq!(fnv32a(""), 0x811c9dc5);
        assert_eq!(fnv32a("a"), 0xe40c292c);
    }

    #[test]
    fn test_with_shares_counters() -> anyhow::Result<()> {
        let writes = Arc::new(AtomicUsize::new(0));
        let sampler = SamplerCore::new(
            Arc::new(CountingCore(writes.clone())),
            Duration::from_secs(60),
            1,
            0,
        );
        let child = sampler.with(&[Field::new("k", "v")]);

        let entry = Entry::new(Level::Info, "shared");
        sampler.write(&entry, &[])?;
        child.write(&entry, &[])?;
        assert_eq!(writes.load(Ordering::SeqCst), 1);
        Ok(())
    }
}
