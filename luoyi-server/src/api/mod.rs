//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`upload`] - 图片上传 / 直链接口
//! - [`tags`] - 标签定义管理接口
//! - [`clothes`] - 衣物管理接口
//! - [`outfits`] - 搭配管理接口
//! - [`data_transfer`] - 数据导出 / 导入接口

pub mod auth;
pub mod health;
pub mod upload;

// Catalog API
pub mod clothes;
pub mod data_transfer;
pub mod outfits;
pub mod tags;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
