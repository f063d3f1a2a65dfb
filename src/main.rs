use anyhow::Context;
use crud_api::{
    build_router,
    infrastructure::logger::init_logging,
    users::{UserStore, UuidV4},
    AppState, Config,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 单线程运行时：请求按到达顺序逐个执行
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("加载配置失败")?;
    let _log_guard = init_logging(&config.logging).context("初始化日志失败")?;

    info!("启动 CRUD API 服务器...");

    let mut store = UserStore::new(Box::new(UuidV4), config.users.merge_policy());
    if config.users.seed_sample_users {
        store.seed_sample_users()?;
    }
    if config.users.preserve_legacy_merge {
        warn!("已启用旧版合并语义：更新时 age 为 0 或 username 为空字符串会被忽略");
    }

    let app = build_router(AppState::new(store), config.http.body_limit);

    let addr = config.http.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法绑定到 {addr}"))?;

    info!("🚀 App running on http://localhost:{}", config.http.port);
    info!("📖 API 端点:");
    info!("   GET    /                  - 欢迎信息");
    info!("   GET    /api/users         - 获取所有用户");
    info!("   POST   /api/users         - 创建新用户");
    info!("   GET    /api/users/:userId - 获取特定用户");
    info!("   PUT    /api/users/:userId - 更新用户");
    info!("   DELETE /api/users/:userId - 删除用户");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务器运行失败")?;

    info!("服务器已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("监听 Ctrl-C 失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("监听 SIGTERM 失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("收到停止信号，正在关闭...");
}
