//! 日志初始化
//!
//! 默认级别 info，可通过 RUST_LOG 环境变量覆盖

use tracing_subscriber::EnvFilter;

/// 初始化全局 tracing 订阅器
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
