use chrono::{Local, NaiveDateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use smart_default::SmartDefault;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;
use crate::writer::{LogWriter, Settings};

const MEGABYTE: u64 = 1024 * 1024;
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".gz";

fn default_filename() -> String {
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| "rustx-logger".to_string());
    format!("{}.log", program)
}

/// RollingFileWriter 配置
#[derive(Debug, Clone, Serialize, Deserialize, SmartDefault, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RollingFileConfig {
    /// 日志文件路径，历史文件保存在同一目录
    #[default(default_filename())]
    #[garde(length(min = 1))]
    pub filename: String,

    /// 单个文件最大大小（MB），0 表示 100MB
    #[default(512)]
    #[garde(skip)]
    pub max_size: u64,

    /// 最多保留的历史文件数，0 表示不限制
    #[default(5)]
    #[garde(skip)]
    pub max_backups: usize,

    /// 历史文件最长保留天数，0 表示不限制
    #[default(30)]
    #[garde(skip)]
    pub max_age: u64,

    /// 历史文件名中的时间使用本地时间
    #[default(true)]
    #[garde(skip)]
    pub local_time: bool,

    /// 是否 gzip 压缩历史文件
    #[default(true)]
    #[garde(skip)]
    pub compress: bool,
}

impl RollingFileConfig {
    fn max_bytes(&self) -> u64 {
        if self.max_size == 0 {
            DEFAULT_MAX_SIZE_MB * MEGABYTE
        } else {
            self.max_size.saturating_mul(MEGABYTE)
        }
    }
}

struct CurrentFile {
    file: File,
    size: u64,
}

/// 按大小切分的文件输出器（注册名 `lumberjack`）
///
/// 文件在第一次写入时打开。写入后超过 `max_size` 时把当前文件重命名为
/// `name-<时间>.ext`，再打开新文件，随后按数量和时间清理历史文件并压缩。
pub struct RollingFileWriter {
    settings: Settings<RollingFileConfig>,
    current: Mutex<Option<CurrentFile>>,
}

impl RollingFileWriter {
    pub fn new(config: RollingFileConfig) -> Self {
        Self {
            settings: Settings::new(config),
            current: Mutex::new(None),
        }
    }

    pub fn config(&self) -> RollingFileConfig {
        self.settings.get()
    }

    pub fn is_open(&self) -> bool {
        self.current.lock().map(|c| c.is_some()).unwrap_or(false)
    }

    /// 立即切分：关闭当前文件，重命名为历史文件，打开新文件
    pub fn rotate(&self) -> io::Result<()> {
        let config = self.settings.get();
        let mut current = self.lock_current()?;
        *current = None;
        *current = Some(rotate_file(&config)?);
        Ok(())
    }

    fn lock_current(&self) -> io::Result<std::sync::MutexGuard<'_, Option<CurrentFile>>> {
        self.current
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "rolling file lock poisoned"))
    }
}

impl Default for RollingFileWriter {
    fn default() -> Self {
        Self::new(RollingFileConfig::default())
    }
}

impl LogWriter for RollingFileWriter {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let config = self.settings.get();
        let max_bytes = config.max_bytes();
        let len = buf.len() as u64;
        if len > max_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("write length {} exceeds maximum file size {}", len, max_bytes),
            ));
        }

        let mut current = self.lock_current()?;
        if current.is_none() {
            *current = Some(open_existing_or_new(&config, len)?);
        }
        if let Some(state) = current.as_ref() {
            if state.size.saturating_add(len) > max_bytes {
                *current = None;
                *current = Some(rotate_file(&config)?);
            }
        }

        let state = current
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "rolling file not open"))?;
        state.file.write_all(buf)?;
        state.size += len;
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        let current = self.lock_current()?;
        match current.as_ref() {
            Some(state) => state.file.sync_all(),
            None => Ok(()),
        }
    }

    fn configure(&self, settings: &JsonValue) -> Result<()> {
        self.settings.apply(settings)
    }
}

crate::impl_from!(RollingFileConfig => RollingFileWriter);
crate::impl_box_from!(RollingFileWriter => dyn LogWriter);

fn open_existing_or_new(config: &RollingFileConfig, write_len: u64) -> io::Result<CurrentFile> {
    let path = Path::new(&config.filename);
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.len() + write_len < config.max_bytes() => {
            let file = OpenOptions::new().append(true).open(path)?;
            Ok(CurrentFile {
                file,
                size: metadata.len(),
            })
        }
        Ok(_) => rotate_file(config),
        Err(e) if e.kind() == io::ErrorKind::NotFound => open_new(path),
        Err(e) => Err(e),
    }
}

fn open_new(path: &Path) -> io::Result<CurrentFile> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    Ok(CurrentFile { file, size: 0 })
}

fn rotate_file(config: &RollingFileConfig) -> io::Result<CurrentFile> {
    let path = Path::new(&config.filename);
    if path.exists() {
        let backup = backup_name(path, config.local_time);
        std::fs::rename(path, &backup)?;
    }
    let current = open_new(path)?;
    mill(config);
    Ok(current)
}

/// 拆出文件名前缀和扩展名：`/a/app.log` -> (`app-`, `.log`)
fn prefix_and_ext(path: &Path) -> (String, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stem = name.strip_suffix(&ext).unwrap_or(&name);
    (format!("{}-", stem), ext)
}

fn backup_name(path: &Path, local_time: bool) -> PathBuf {
    let (prefix, ext) = prefix_and_ext(path);
    let timestamp = if local_time {
        Local::now().format(BACKUP_TIME_FORMAT).to_string()
    } else {
        Utc::now().format(BACKUP_TIME_FORMAT).to_string()
    };
    path.with_file_name(format!("{}{}{}", prefix, timestamp, ext))
}

struct Backup {
    path: PathBuf,
    time: NaiveDateTime,
    compressed: bool,
}

/// 列出历史文件，按时间从新到旧排序
fn list_backups(path: &Path) -> io::Result<Vec<Backup>> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let (prefix, ext) = prefix_and_ext(path);

    let mut backups = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let (rest, compressed) = match name.strip_suffix(COMPRESS_SUFFIX) {
            Some(rest) => (rest.to_string(), true),
            None => (name.clone(), false),
        };
        let Some(timestamp) = rest
            .strip_prefix(&prefix)
            .and_then(|r| r.strip_suffix(&ext))
        else {
            continue;
        };
        if let Ok(time) = NaiveDateTime::parse_from_str(timestamp, BACKUP_TIME_FORMAT) {
            backups.push(Backup {
                path: entry.path(),
                time,
                compressed,
            });
        }
    }
    backups.sort_by(|a, b| b.time.cmp(&a.time));
    Ok(backups)
}

/// 按数量和时间清理历史文件，然后压缩剩余未压缩的文件
fn mill(config: &RollingFileConfig) {
    let path = Path::new(&config.filename);
    let backups = match list_backups(path) {
        Ok(backups) => backups,
        Err(e) => {
            log::debug!("list backups of [{}] failed: {}", config.filename, e);
            return;
        }
    };

    let mut remaining = Vec::new();
    let now = if config.local_time {
        Local::now().naive_local()
    } else {
        Utc::now().naive_utc()
    };
    let max_age_secs = i64::try_from(config.max_age.saturating_mul(86400)).unwrap_or(i64::MAX);

    for (i, backup) in backups.into_iter().enumerate() {
        let over_count = config.max_backups > 0 && i >= config.max_backups;
        let too_old =
            config.max_age > 0 && now.signed_duration_since(backup.time).num_seconds() > max_age_secs;
        if over_count || too_old {
            std::fs::remove_file(&backup.path).ok();
        } else {
            remaining.push(backup);
        }
    }

    if config.compress {
        for backup in remaining.iter().filter(|b| !b.compressed) {
            if let Err(e) = compress_file(&backup.path) {
                log::debug!("compress [{}] failed: {}", backup.path.display(), e);
            }
        }
    }
}

fn compress_file(path: &Path) -> io::Result<()> {
    let content = std::fs::read(path)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&content)?;
    let compressed = encoder.finish()?;

    std::fs::write(format!("{}{}", path.display(), COMPRESS_SUFFIX), compressed)?;
    std::fs::remove_file(path)
}
