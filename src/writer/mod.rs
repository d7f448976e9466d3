mod console_writer;
mod file_rotate_writer;
mod output;
mod registry;
mod rolling_file_writer;
mod settings;
mod trait_;

pub use console_writer::{ConsoleWriter, ConsoleWriterConfig, Target};
pub use file_rotate_writer::{FileRotateConfig, FileRotateWriter, RotateLogs};
pub use output::{open_output, open_outputs, FileOutput, MultiWriter};
pub use registry::{get_writer, global_registry, register_writer, WriterRegistry};
pub use rolling_file_writer::{RollingFileConfig, RollingFileWriter};
pub use settings::Settings;
pub use trait_::LogWriter;
