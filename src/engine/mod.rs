// ==========================================
// 毕业设计项目管理系统 - 引擎层
// ==========================================
// 职责: 业务规则 (状态目录、流程转换、事件发布)
// ==========================================

pub mod events;
pub mod status_catalog;
pub mod workflow;

// 重导出核心类型
pub use events::{
    NoOpEventPublisher, OptionalEventPublisher, WorkflowEventPublisher, WorkflowTransitioned,
};
pub use status_catalog::{CatalogError, StatusCatalog, StatusInfo};
pub use workflow::{TransitionOutcome, WorkflowEngine};
