//! Logging - 日志初始化
//!
//! 宿主程序（编辑器进程）启动时调用一次；重复调用安全（忽略失败）。

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// 按日志配置初始化 tracing 订阅器
///
/// 环境变量 `RUST_LOG` 优先于配置中的级别
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},novelbox_core={}", config.level, config.level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized, skipping");
    }
}
