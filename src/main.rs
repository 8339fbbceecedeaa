// ==========================================
// 毕业设计项目管理系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 流程追踪与通知核心
// ==========================================

use std::sync::{Arc, Mutex};

use capstone_tracker::api::{NotificationApi, NotificationEventBridge, WorkflowApi};
use capstone_tracker::config::ConfigManager;
use capstone_tracker::engine::{OptionalEventPublisher, WorkflowEngine};
use capstone_tracker::repository::{
    NotificationRepository, ProjectRepository, WorkflowLogRepository,
};

fn main() {
    // 初始化日志系统
    capstone_tracker::logging::init();

    tracing::info!("==================================================");
    tracing::info!("毕业设计项目管理系统 - 流程追踪核心");
    tracing::info!("系统版本: {}", capstone_tracker::VERSION);
    tracing::info!("==================================================");

    // 数据库路径: 第一个命令行参数,默认当前目录
    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "capstone_tracker.db".to_string());
    tracing::info!("使用数据库: {}", db_path);

    // 打开数据库并初始化Schema
    let conn = match capstone_tracker::db::open_sqlite_connection(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("无法打开数据库 {}: {}", db_path, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = capstone_tracker::db::init_schema(&conn) {
        tracing::error!("数据库Schema初始化失败: {}", e);
        std::process::exit(1);
    }

    match capstone_tracker::db::read_schema_version(&conn) {
        Ok(Some(version)) => tracing::info!("数据库Schema版本: {}", version),
        Ok(None) => tracing::warn!("schema_version表不存在"),
        Err(e) => tracing::warn!("无法读取Schema版本: {}", e),
    }

    // 配置层走独立连接,仓储层共享同一连接
    let config = match ConfigManager::new(&db_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("配置管理器初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    match config.get_transition_policy() {
        Ok(policy) => tracing::info!("状态转换策略: {:?}", policy),
        Err(e) => tracing::warn!("无法读取转换策略配置: {}", e),
    }

    // 组装完整接线: 仓储 -> 引擎(带通知适配器) -> API
    let conn = Arc::new(Mutex::new(conn));
    let project_repo = Arc::new(ProjectRepository::new(conn.clone()));
    let log_repo = Arc::new(WorkflowLogRepository::new(conn.clone()));
    let notification_repo = Arc::new(NotificationRepository::new(conn));

    let notification_api = Arc::new(NotificationApi::new(notification_repo, config.clone()));
    let bridge = Arc::new(NotificationEventBridge::new(notification_api));

    let engine = Arc::new(WorkflowEngine::new(
        project_repo.clone(),
        log_repo,
        config,
        OptionalEventPublisher::with_publisher(bridge),
    ));
    let workflow_api = WorkflowApi::new(project_repo, engine);

    match workflow_api.list_projects() {
        Ok(projects) => tracing::info!("核心已就绪, 当前项目数: {}", projects.len()),
        Err(e) => {
            tracing::error!("就绪检查失败: {}", e);
            std::process::exit(1);
        }
    }
}
