// ==========================================
// 毕业设计项目管理系统 - 流程日志领域模型
// ==========================================
// 红线: 所有状态变更必须记录,日志只追加不修改
// 不变量: 按时间升序排列,最新一条的 to_status
//         必须等于所属项目的当前状态
// ==========================================

use crate::domain::types::ProjectStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// WorkflowLogEntry - 状态变更日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowLogEntry {
    pub log_id: String,             // 日志ID (UUID)
    pub project_id: String,         // 所属项目
    pub from_status: ProjectStatus, // 变更前状态
    pub to_status: ProjectStatus,   // 变更后状态
    pub comment: Option<String>,    // 备注 (可选)
    pub actor: String,              // 操作人
    pub created_at: NaiveDateTime,  // 变更时间
}

impl WorkflowLogEntry {
    /// 创建新的流程日志
    ///
    /// # 参数
    /// - `project_id`: 所属项目ID
    /// - `from_status`: 变更前状态
    /// - `to_status`: 变更后状态
    /// - `actor`: 操作人
    /// - `comment`: 备注 (可选)
    pub fn new(
        project_id: String,
        from_status: ProjectStatus,
        to_status: ProjectStatus,
        actor: String,
        comment: Option<String>,
    ) -> Self {
        Self {
            log_id: uuid::Uuid::new_v4().to_string(),
            project_id,
            from_status,
            to_status,
            comment,
            actor,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
