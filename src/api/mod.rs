// ==========================================
// 毕业设计项目管理系统 - API 模块
// ==========================================
// API层职责:
// 1. 输入校验与状态字符串解析
// 2. 调用引擎/仓库执行业务
// 3. 统一错误映射 (RepositoryError -> ApiError)
// ==========================================

pub mod error;
pub mod event_bridge;
pub mod notification_api;
pub mod workflow_api;

pub use error::{ApiError, ApiResult};
pub use event_bridge::NotificationEventBridge;
pub use notification_api::{ClearReadSummary, NotificationApi, NotificationListResponse};
pub use workflow_api::{ProjectDetail, WorkflowApi};
