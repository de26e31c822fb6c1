//! 工具模块 - 通用工具函数和类型

pub mod error;
pub mod logger;

pub use error::{AppError, AppResponse, AppResult};
pub use error::{ok, ok_with_message};
