//! 认证授权模块
//!
//! 提供 JWT 认证和两级角色控制：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文 (admin | member)
//! - [`require_auth`] - 认证中间件
//! - [`require_admin`] - 管理员中间件

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
