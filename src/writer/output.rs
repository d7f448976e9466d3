use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::error::{LoggerError, Result};
use crate::writer::{ConsoleWriter, ConsoleWriterConfig, LogWriter, Target};

/// 普通文件输出，追加写入
pub struct FileOutput {
    path: String,
    file: Mutex<File>,
}

impl FileOutput {
    pub fn open(path: &str) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_string(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl LogWriter for FileOutput {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "file lock poisoned"))?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        let file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "file lock poisoned"))?;
        file.sync_all()
    }
}

/// 把一次写入分发到多个 writer
///
/// 每个 writer 都会被写一次，某个失败不影响其他 writer，返回第一个错误
#[derive(Clone, Default)]
pub struct MultiWriter {
    writers: Vec<Arc<dyn LogWriter>>,
}

impl MultiWriter {
    pub fn new(writers: Vec<Arc<dyn LogWriter>>) -> Self {
        Self { writers }
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }
}

impl LogWriter for MultiWriter {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let mut first_err = None;
        for writer in &self.writers {
            if let Err(e) = writer.write(buf) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(buf.len()),
        }
    }

    fn sync(&self) -> io::Result<()> {
        let mut first_err = None;
        for writer in &self.writers {
            if let Err(e) = writer.sync() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// 打开单个输出路径
///
/// 支持 `stdout`、`stderr`、`file://` 前缀以及普通文件路径
pub fn open_output(path: &str) -> Result<Arc<dyn LogWriter>> {
    match path {
        "stdout" => Ok(Arc::new(ConsoleWriter::new(ConsoleWriterConfig {
            target: Target::Stdout,
        }))),
        "stderr" => Ok(Arc::new(ConsoleWriter::new(ConsoleWriterConfig {
            target: Target::Stderr,
        }))),
        _ => {
            let file_path = path.strip_prefix("file://").unwrap_or(path);
            let output = FileOutput::open(file_path).map_err(|source| LoggerError::OpenSink {
                path: path.to_string(),
                source,
            })?;
            Ok(Arc::new(output))
        }
    }
}

/// 打开一组输出路径并合并为一个 writer，任一路径失败则整体失败
pub fn open_outputs(paths: &[String]) -> Result<MultiWriter> {
    let writers = paths
        .iter()
        .map(|p| open_output(p))
        .collect::<Result<Vec<_>>>()?;
    Ok(MultiWriter::new(writers))
}
