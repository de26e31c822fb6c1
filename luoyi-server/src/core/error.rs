use thiserror::Error;

/// 服务器生命周期错误
///
/// 请求处理链路的错误统一走 [`crate::utils::AppError`]，
/// 这里只覆盖启动、存储初始化和后台任务。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储初始化失败: {0}")]
    Storage(String),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

/// 生命周期代码的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
