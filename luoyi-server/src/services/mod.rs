//! 后台服务
//!
//! - [`CleanupService`] - 图片孤儿清理 (提交后异步执行)

pub mod cleanup;

pub use cleanup::{CleanupService, ImageCleanupTask};
