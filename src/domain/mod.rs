// ==========================================
// 毕业设计项目管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与封闭类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod notification;
pub mod project;
pub mod types;
pub mod workflow_log;

// 重导出核心类型
pub use notification::Notification;
pub use project::{Project, ProjectMember};
pub use types::{NotificationType, ProjectStatus, StatusVariant, TransitionPolicy};
pub use workflow_log::WorkflowLogEntry;
