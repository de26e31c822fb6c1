//! Logging Infrastructure
//!
//! tracing bootstrap: stdout plus an optional daily-rolling file under the
//! work dir. `RUST_LOG` takes precedence over the configured level, so a
//! one-off `RUST_LOG=luoyi_server::store=trace` works without touching
//! the config.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // 日志目录在工作目录结构创建之后才存在；不存在就只打 stdout
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "luoyi-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}
