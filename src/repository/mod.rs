// ==========================================
// 毕业设计项目管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod notification_repo;
pub mod project_repo;
pub mod workflow_log_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use notification_repo::NotificationRepository;
pub use project_repo::ProjectRepository;
pub use workflow_log_repo::WorkflowLogRepository;
