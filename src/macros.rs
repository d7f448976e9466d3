//! 宏定义
//!
//! - `impl_from!` / `impl_box_from!`：简化配置到 writer、encoder 的 From 实现
//! - `debug!` / `info!` / `warn!` / `error!`：格式化消息或带 `key => value` 字段的日志宏

/// 为配置类型实现 From trait，调用 `Type::new(config)`
///
/// 用法：`impl_from!(ConfigType => Type)`
#[macro_export]
macro_rules! impl_from {
    ($config_type:ty => $target_type:ty) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                <$target_type>::new(config)
            }
        }
    };
}

/// 为 Box<T> 实现到 Box<dyn Trait> 的转换
///
/// 用法：`impl_box_from!(Type => dyn TraitName)`
#[macro_export]
macro_rules! impl_box_from {
    ($source_type:ty => dyn $trait_name:path) => {
        impl From<Box<$source_type>> for Box<dyn $trait_name> {
            fn from(source: Box<$source_type>) -> Self {
                source as Box<dyn $trait_name>
            }
        }
    };
}

/// 记录 DEBUG 级别日志
///
/// ```ignore
/// debug!(logger, "processing request");
/// debug!(logger, "processing {} of {}", index, total);
/// debug!(logger, "processing", "endpoint" => "/api/users", "method" => "GET");
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $fmt:literal) => {
        $logger.debug(format!($fmt))
    };
    ($logger:expr, $msg:expr) => {
        $logger.debug($msg)
    };
    ($logger:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $logger.debugm($msg, [$($crate::Field::new($key, $value)),+])
    };
    ($logger:expr, $fmt:literal, $($arg:tt)+) => {
        $logger.debug(format!($fmt, $($arg)+))
    };
}

/// 记录 INFO 级别日志
///
/// ```ignore
/// info!(logger, "user logged in", "user_id" => 12345, "username" => "alice");
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $fmt:literal) => {
        $logger.info(format!($fmt))
    };
    ($logger:expr, $msg:expr) => {
        $logger.info($msg)
    };
    ($logger:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $logger.infom($msg, [$($crate::Field::new($key, $value)),+])
    };
    ($logger:expr, $fmt:literal, $($arg:tt)+) => {
        $logger.info(format!($fmt, $($arg)+))
    };
}

/// 记录 WARN 级别日志
#[macro_export]
macro_rules! warn {
    ($logger:expr, $fmt:literal) => {
        $logger.warn(format!($fmt))
    };
    ($logger:expr, $msg:expr) => {
        $logger.warn($msg)
    };
    ($logger:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $logger.warnm($msg, [$($crate::Field::new($key, $value)),+])
    };
    ($logger:expr, $fmt:literal, $($arg:tt)+) => {
        $logger.warn(format!($fmt, $($arg)+))
    };
}

/// 记录 ERROR 级别日志
#[macro_export]
macro_rules! error {
    ($logger:expr, $fmt:literal) => {
        $logger.error(format!($fmt))
    };
    ($logger:expr, $msg:expr) => {
        $logger.error($msg)
    };
    ($logger:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $logger.errorm($msg, [$($crate::Field::new($key, $value)),+])
    };
    ($logger:expr, $fmt:literal, $($arg:tt)+) => {
        $logger.error(format!($fmt, $($arg)+))
    };
}
