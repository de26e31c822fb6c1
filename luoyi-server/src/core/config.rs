use crate::auth::JwtConfig;

/// 存储后端选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// 嵌入式文档数据库 (SurrealDB / RocksDB)
    Surreal,
    /// 嵌入式 KV 存储 (redb)
    Redb,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "surreal" | "surrealdb" => Some(Self::Surreal),
            "redb" | "kv" => Some(Self::Redb),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Surreal => "surreal",
            Self::Redb => "redb",
        }
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | LUOYI_WORK_DIR | /var/lib/luoyi | 工作目录 (数据库、图片、日志) |
/// | LUOYI_HTTP_PORT | 3000 | HTTP 服务端口 |
/// | LUOYI_STORAGE | surreal | 存储后端: surreal \| redb |
/// | ADMIN_USERNAME | admin | 管理员账号 (标签管理、数据迁移) |
/// | ADMIN_PASSWORD | - | 管理员密码 (生产环境必须设置) |
/// | MEMBER_USERNAME | - | 家庭成员账号 (可选, 仅衣橱录入) |
/// | MEMBER_PASSWORD | - | 家庭成员密码 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// LUOYI_WORK_DIR=/data/luoyi LUOYI_STORAGE=redb cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库文件、图片和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 存储后端
    pub storage: StorageBackend,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 账号配置 ===
    /// 管理员账号
    pub admin_username: String,
    /// 管理员密码
    pub admin_password: String,
    /// 家庭成员账号 (可选)
    pub member_username: Option<String>,
    /// 家庭成员密码
    pub member_password: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
            if environment == "production" {
                tracing::warn!("⚠️  ADMIN_PASSWORD not set in production!");
            }
            "luoyi-admin".into()
        });

        Self {
            work_dir: std::env::var("LUOYI_WORK_DIR").unwrap_or_else(|_| "/var/lib/luoyi".into()),
            http_port: std::env::var("LUOYI_HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            storage: std::env::var("LUOYI_STORAGE")
                .ok()
                .and_then(|v| StorageBackend::parse(&v))
                .unwrap_or(StorageBackend::Surreal),
            jwt: JwtConfig::default(),
            environment,
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password,
            member_username: std::env::var("MEMBER_USERNAME").ok(),
            member_password: std::env::var("MEMBER_PASSWORD").ok(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
        storage: StorageBackend,
    ) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.storage = storage;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 图片存储目录
    pub fn images_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("images")
    }

    /// 数据库目录
    pub fn database_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("database")
    }

    /// 日志目录
    pub fn logs_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在 (幂等)
    ///
    /// ```text
    /// {work_dir}/
    /// ├── database/   # surreal 目录或 wardrobe.redb 文件
    /// ├── images/     # 上传图片 ({sha256}.jpg)
    /// └── logs/       # 按天滚动的日志
    /// ```
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.images_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parse_accepts_aliases() {
        assert_eq!(StorageBackend::parse("surreal"), Some(StorageBackend::Surreal));
        assert_eq!(StorageBackend::parse("SurrealDB"), Some(StorageBackend::Surreal));
        assert_eq!(StorageBackend::parse("redb"), Some(StorageBackend::Redb));
        assert_eq!(StorageBackend::parse("kv"), Some(StorageBackend::Redb));
        assert_eq!(StorageBackend::parse("mysql"), None);
    }
}
