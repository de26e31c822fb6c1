use luoyi_server::{Config, Server, ServerState, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境变量 (.env 可选)
    dotenv::dotenv().ok();

    // 2. 加载配置
    let config = Config::from_env();

    // 3. 准备工作目录 (日志目录必须先于日志初始化存在)
    config.ensure_work_dir_structure()?;

    // 4. 初始化日志
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if config.is_production() { "info" } else { "debug" }.to_string()
    });
    let logs_dir = config.logs_dir();
    luoyi_server::init_logger_with_file(Some(&log_level), logs_dir.to_str());

    // 打印横幅
    print_banner();

    tracing::info!("👗 Luoyi Wardrobe Server starting...");

    // 5. 初始化服务器状态 (开库 + 首次播种)
    let state = ServerState::initialize(&config).await?;

    // 6. 启动 HTTP 服务器 (Server::run 会自动启动后台任务)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
