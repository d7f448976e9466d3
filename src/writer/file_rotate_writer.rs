use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use garde::Validate;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use smart_default::SmartDefault;
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use crate::error::{LoggerError, Result};
use crate::writer::{LogWriter, Settings};

const DEFAULT_ROTATION_SECS: i64 = 86400;
const DEFAULT_MAX_AGE_DAYS: i64 = 7;
const SECONDS_PER_DAY: u64 = 86400;

/// FileRotateWriter 配置
#[derive(Debug, Clone, Serialize, Deserialize, SmartDefault, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct FileRotateConfig {
    /// 文件名模板，strftime 格式，例如 `/var/log/app.%Y%m%d.log`
    #[garde(custom(validate_pattern))]
    pub pattern: String,

    /// 指向当前日志文件的软链接路径，为空不创建
    #[garde(skip)]
    pub filename: String,

    /// 切分间隔（秒），小于等于 0 时为 86400
    #[garde(skip)]
    pub rotation_time: i64,

    /// 最长保留天数，小于等于 0 时为 7
    #[garde(skip)]
    pub max_age: i64,

    /// 最多保留的文件数，小于等于 0 表示不限制
    #[garde(skip)]
    pub max_backups: i64,

    /// 按本地时间对齐切分边界，默认 UTC
    #[garde(skip)]
    pub local_time: bool,
}

fn validate_pattern(value: &String, _context: &()) -> garde::Result {
    if value.is_empty() {
        return Err(garde::Error::new("pattern required"));
    }
    if StrftimeItems::new(value).any(|item| matches!(item, Item::Error)) {
        return Err(garde::Error::new(format!("invalid strftime pattern `{}`", value)));
    }
    Ok(())
}

/// 把 strftime 模板转成匹配所有历史文件的 glob
fn pattern_to_glob(pattern: &str) -> String {
    let mut glob = String::new();
    let mut literal = String::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        glob.push_str(&glob::Pattern::escape(&literal));
        literal.clear();
        // 跳过修饰符直到转换字符
        for next in chars.by_ref() {
            if next.is_ascii_alphabetic() || next == '%' {
                break;
            }
        }
        if !glob.ends_with('*') {
            glob.push('*');
        }
    }
    glob.push_str(&glob::Pattern::escape(&literal));
    glob
}

struct RotateState {
    current: PathBuf,
    file: File,
}

/// 按时间切分的文件引擎
///
/// 当前时刻按切分间隔向下取整后套用模板得到文件名，文件名变化时打开新文件，
/// 刷新软链接并清理过期文件。
pub struct RotateLogs {
    pattern: String,
    glob: String,
    link_name: Option<PathBuf>,
    rotation_secs: i64,
    max_age: Duration,
    max_backups: usize,
    local_time: bool,
    state: Mutex<RotateState>,
}

impl RotateLogs {
    pub fn new(config: FileRotateConfig) -> Result<Self> {
        validate_pattern(&config.pattern, &()).map_err(|e| LoggerError::Settings(e.to_string()))?;

        let rotation_secs = if config.rotation_time <= 0 {
            DEFAULT_ROTATION_SECS
        } else {
            config.rotation_time
        };
        let max_age_days = if config.max_age <= 0 {
            DEFAULT_MAX_AGE_DAYS
        } else {
            config.max_age
        };

        let current = format_filename(&config.pattern, rotation_secs, config.local_time, Utc::now())?;
        let file = open_append(&current)?;

        let engine = Self {
            glob: pattern_to_glob(&config.pattern),
            link_name: (!config.filename.is_empty()).then(|| PathBuf::from(&config.filename)),
            pattern: config.pattern,
            rotation_secs,
            max_age: Duration::from_secs((max_age_days as u64).saturating_mul(SECONDS_PER_DAY)),
            max_backups: config.max_backups.max(0) as usize,
            local_time: config.local_time,
            state: Mutex::new(RotateState {
                current: current.clone(),
                file,
            }),
        };
        engine.after_open(&current);
        Ok(engine)
    }

    /// 当前写入的文件路径
    pub fn current_filename(&self) -> Option<PathBuf> {
        self.state.lock().ok().map(|state| state.current.clone())
    }

    pub fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let filename = format_filename(&self.pattern, self.rotation_secs, self.local_time, Utc::now())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "rotate logs lock poisoned"))?;
        if state.current != filename {
            let file = open_append(&filename)?;
            state.file = file;
            state.current = filename.clone();
            self.after_open(&filename);
        }
        state.file.write_all(buf)?;
        Ok(buf.len())
    }

    pub fn sync(&self) -> io::Result<()> {
        let state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "rotate logs lock poisoned"))?;
        state.file.sync_all()
    }

    fn after_open(&self, current: &Path) {
        if let Some(link) = &self.link_name {
            if let Err(e) = update_link(current, link) {
                log::debug!("update link [{}] failed: {}", link.display(), e);
            }
        }
        self.purge(current);
    }

    /// 清理超过保留时间或超出保留数量的历史文件
    fn purge(&self, current: &Path) {
        let paths = match glob::glob(&self.glob) {
            Ok(paths) => paths,
            Err(e) => {
                log::debug!("invalid purge glob [{}]: {}", self.glob, e);
                return;
            }
        };

        let cutoff = SystemTime::now()
            .checked_sub(self.max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut kept: Vec<(SystemTime, PathBuf)> = Vec::new();
        for path in paths.flatten() {
            if path == current || Some(&path) == self.link_name.as_ref() {
                continue;
            }
            let Ok(metadata) = std::fs::symlink_metadata(&path) else {
                continue;
            };
            if metadata.file_type().is_symlink() || metadata.is_dir() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            if modified < cutoff {
                std::fs::remove_file(&path).ok();
            } else {
                kept.push((modified, path));
            }
        }

        // 当前文件也计入保留数量
        if self.max_backups > 0 && kept.len() + 1 > self.max_backups {
            kept.sort_by(|a, b| b.0.cmp(&a.0));
            for (_, path) in kept.iter().skip(self.max_backups.saturating_sub(1)) {
                std::fs::remove_file(path).ok();
            }
        }
    }
}

/// 把时刻按切分间隔向下取整后套用模板
fn format_filename(
    pattern: &str,
    rotation_secs: i64,
    local_time: bool,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let ts = now.timestamp();
    let mut name = String::new();
    if local_time {
        let offset = now.with_timezone(&Local).offset().local_minus_utc() as i64;
        let truncated = ts - (ts + offset).rem_euclid(rotation_secs);
        let at = DateTime::<Utc>::from_timestamp(truncated, 0)
            .ok_or_else(|| LoggerError::Settings(format!("timestamp out of range: {}", truncated)))?
            .with_timezone(&Local);
        write!(name, "{}", at.format_with_items(StrftimeItems::new(pattern)))
            .map_err(|_| LoggerError::Settings(format!("invalid strftime pattern `{}`", pattern)))?;
    } else {
        let truncated = ts - ts.rem_euclid(rotation_secs);
        let at = DateTime::<Utc>::from_timestamp(truncated, 0)
            .ok_or_else(|| LoggerError::Settings(format!("timestamp out of range: {}", truncated)))?;
        write!(name, "{}", at.format_with_items(StrftimeItems::new(pattern)))
            .map_err(|_| LoggerError::Settings(format!("invalid strftime pattern `{}`", pattern)))?;
    }
    Ok(PathBuf::from(name))
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(unix)]
fn update_link(target: &Path, link: &Path) -> io::Result<()> {
    let tmp = PathBuf::from(format!("{}_symlink", link.display()));
    std::fs::remove_file(&tmp).ok();
    std::os::unix::fs::symlink(target, &tmp)?;
    std::fs::rename(&tmp, link)
}

#[cfg(not(unix))]
fn update_link(_target: &Path, _link: &Path) -> io::Result<()> {
    Ok(())
}

/// 按时间切分的文件输出器（注册名 `file-rotate`）
///
/// 引擎在第一次写入时构造且只构造一次，并发的首次写入由 `OnceCell` 保证互斥。
/// 构造失败直接 panic。引擎构造后再调用 `configure` 只更新配置快照，不会重建引擎。
pub struct FileRotateWriter {
    settings: Settings<FileRotateConfig>,
    engine: OnceCell<RotateLogs>,
    opened: AtomicUsize,
}

impl FileRotateWriter {
    pub fn new(config: FileRotateConfig) -> Self {
        Self {
            settings: Settings::new(config),
            engine: OnceCell::new(),
            opened: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> FileRotateConfig {
        self.settings.get()
    }

    /// 引擎被构造的次数，构造成功后恒为 1
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.engine.get().is_some()
    }

    /// 当前写入的文件，未打开时为 None
    pub fn current_filename(&self) -> Option<PathBuf> {
        self.engine.get().and_then(|engine| engine.current_filename())
    }

    fn engine(&self) -> &RotateLogs {
        self.engine.get_or_init(|| {
            self.opened.fetch_add(1, Ordering::SeqCst);
            let config = self.settings.get();
            match RotateLogs::new(config) {
                Ok(engine) => engine,
                Err(e) => panic!("file-rotate: failed to open rotate logs: {}", e),
            }
        })
    }
}

impl Default for FileRotateWriter {
    fn default() -> Self {
        Self::new(FileRotateConfig::default())
    }
}

impl LogWriter for FileRotateWriter {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.engine().write(buf)
    }

    fn sync(&self) -> io::Result<()> {
        match self.engine.get() {
            Some(engine) => engine.sync(),
            None => Ok(()),
        }
    }

    fn configure(&self, settings: &JsonValue) -> Result<()> {
        self.settings.apply(settings)
    }
}

crate::impl_from!(FileRotateConfig => FileRotateWriter);
crate::impl_box_from!(FileRotateWriter => dyn LogWriter);
