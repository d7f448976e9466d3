//! 把配置和解码后的 sink 组装成一个 logger
//!
//! 每个 sink 一个 core：自己的 encoder、自己的级别、输出到 sink 自己的 writer
//! 加上文档级的 outputPaths。所有 core 用 [`Tee`] 组合，最后应用构建选项。

use std::sync::Arc;

use crate::config::LoggerConfig;
use crate::encoder::new_encoder;
use crate::error::Result;
use crate::level::{AtomicLevel, Level};
use crate::logcore::{Core, IoCore, Tee};
use crate::logger::Logger;
use crate::options::LoggerOption;
use crate::sink::SinkConfig;
use crate::writer::{open_outputs, LogWriter, MultiWriter};

fn sink_core(
    config: &LoggerConfig,
    sink: &SinkConfig,
    level: &AtomicLevel,
    baseline: &Arc<dyn LogWriter>,
) -> Result<Arc<dyn Core>> {
    let encoding = sink.effective_encoding(&config.encoding);
    let encoder_config = sink.effective_encoder_config(&config.encoder_config);
    let encoder = new_encoder(&encoding, &encoder_config).map_err(|e| e.in_sink(&sink.name))?;

    // sink 自己的 writer 之外总是附带文档级输出
    let out = MultiWriter::new(vec![sink.writer.clone(), baseline.clone()]);
    let level = sink.effective_level(level);
    log::debug!(
        "build core for sink [{}], encoding [{}], level [{}]",
        sink.name,
        encoding,
        level.level()
    );
    Ok(Arc::new(IoCore::new(encoder, Arc::new(out), level)))
}

/// 组装 logger，任何一步失败都返回错误
pub fn assemble(
    config: &LoggerConfig,
    sinks: &[SinkConfig],
    options: impl IntoIterator<Item = LoggerOption>,
) -> Result<Logger> {
    let level = config
        .level
        .clone()
        .unwrap_or_else(|| AtomicLevel::new(Level::Info));

    let baseline: Arc<dyn LogWriter> = Arc::new(open_outputs(&config.output_paths)?);
    let error_output: Arc<dyn LogWriter> = Arc::new(open_outputs(&config.error_output_paths)?);

    let cores = if sinks.is_empty() {
        let encoding = if config.encoding.is_empty() { "console" } else { config.encoding.as_str() };
        let encoder = new_encoder(encoding, &config.encoder_config)?;
        vec![Arc::new(IoCore::new(encoder, baseline, level.clone())) as Arc<dyn Core>]
    } else {
        sinks
            .iter()
            .map(|sink| sink_core(config, sink, &level, &baseline))
            .collect::<Result<Vec<_>>>()?
    };
    log::debug!("assemble logger with {} core(s)", cores.len());

    let logger = Logger::new(Tee::combine(cores), level).with_options(config.build_options(error_output));
    Ok(logger.with_options(options))
}
