//! chirpy 服务主入口

use chirpy::{
    config::AppConfig,
    db,
    middleware::AppState,
    repository::{MemoryStore, PgStore},
    routes, telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let mut use_memory_store = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--version" => {
                println!("chirpy {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            "--memory" => use_memory_store = true,
            other => {
                eprintln!("未知参数: {}", other);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境），生产环境直接设置环境变量
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Chirpy starting...");

    // 3. 存储：PostgreSQL（连接池 + 迁移）或内存
    let app_state = if use_memory_store {
        tracing::warn!("Using in-memory store, data is lost on exit");
        AppState::new(config.clone(), Arc::new(MemoryStore::new()))?
    } else {
        let pool = db::create_pool(&config.database).await?;
        db::run_migrations(&pool).await?;
        tracing::info!("Database initialized");
        AppState::new(config.clone(), Arc::new(PgStore::new(pool)))?
    };

    // 4. 构建路由
    let app = routes::create_router(Arc::new(app_state));

    // 5. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, platform = %config.server.platform, "Server listening");

    // 6. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}

/// 打印帮助信息
fn print_help() {
    println!("chirpy {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: chirpy [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!("  --memory      使用内存存储，不连接数据库");
    println!();
    println!("环境变量:");
    println!("  所有配置通过 CHIRPY_ 前缀的环境变量完成，例如:");
    println!("  CHIRPY_DATABASE__URL, CHIRPY_SECURITY__JWT_SECRET,");
    println!("  CHIRPY_SECURITY__POLKA_KEY, CHIRPY_SERVER__PLATFORM");
    println!("  可用选项请参考 .env.example");
}
