mod config;
mod console_encoder;
mod core;
mod json_encoder;
mod registry;

pub use config::{CallerEncoder, DurationEncoder, EncoderConfig, LevelEncoder, TimeEncoder};
pub use console_encoder::ConsoleEncoder;
pub use self::core::Encoder;
pub use json_encoder::JsonEncoder;
pub use registry::{new_encoder, register_encoder, EncoderConstructor};
