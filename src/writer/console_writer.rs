use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use smart_default::SmartDefault;
use std::io::{self, Write};

use crate::error::Result;
use crate::writer::{LogWriter, Settings};

/// 控制台输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SmartDefault)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Target {
    #[default]
    Stdout,
    Stderr,
}

impl TryFrom<String> for Target {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(Target::Stdout),
            "stderr" => Ok(Target::Stderr),
            _ => Err(format!("unknown console target: {}", s)),
        }
    }
}

/// ConsoleWriter 配置
#[derive(Debug, Clone, Serialize, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct ConsoleWriterConfig {
    /// 输出到 stdout 还是 stderr
    #[garde(skip)]
    pub target: Target,
}

/// 终端输出器
///
/// 没有延迟初始化，所有字段都有可用的默认值
pub struct ConsoleWriter {
    settings: Settings<ConsoleWriterConfig>,
}

impl ConsoleWriter {
    pub fn new(config: ConsoleWriterConfig) -> Self {
        Self {
            settings: Settings::new(config),
        }
    }

    pub fn target(&self) -> Target {
        self.settings.get().target
    }
}

impl Default for ConsoleWriter {
    fn default() -> Self {
        Self::new(ConsoleWriterConfig::default())
    }
}

impl LogWriter for ConsoleWriter {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        match self.target() {
            Target::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(buf)?;
            }
            Target::Stderr => {
                let mut stderr = io::stderr().lock();
                stderr.write_all(buf)?;
            }
        }
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        match self.target() {
            Target::Stdout => io::stdout().flush(),
            Target::Stderr => io::stderr().flush(),
        }
    }

    fn configure(&self, settings: &JsonValue) -> Result<()> {
        self.settings.apply(settings)
    }
}

crate::impl_from!(ConsoleWriterConfig => ConsoleWriter);
crate::impl_box_from!(ConsoleWriter => dyn LogWriter);
