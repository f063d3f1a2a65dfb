//! 日志基础设施

use std::io;

use anyhow::Result;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// 初始化日志系统
///
/// 始终输出到控制台（带颜色）；配置了 `log_dir` 时另外写入按日期分割的
/// 日志文件 `<log_dir>/<file_prefix>.<date>`。
///
/// 返回的 [`WorkerGuard`] 必须在进程运行期间一直持有，丢弃后文件日志不再刷新。
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)?;

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false) // 文件中不使用颜色
                .with_target(false)
                .with_thread_names(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(io::stdout).with_ansi(true))
        .try_init()?;

    Ok(guard)
}
