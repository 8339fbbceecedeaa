// ==========================================
// 毕业设计项目管理系统 - 项目领域模型
// ==========================================
// 红线: 项目状态只能通过 WorkflowEngine 提交变更
// 对齐: schema project / project_member 表
// ==========================================

use crate::domain::types::ProjectStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Project - 毕业设计项目
// ==========================================
// revision 为乐观锁字段,每次状态提交自增
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,        // 项目ID (UUID)
    pub title: String,             // 课题名称
    pub status: ProjectStatus,     // 当前状态 (封闭枚举)
    pub revision: i32,             // 乐观锁版本号
    pub created_at: NaiveDateTime, // 创建时间
    pub updated_at: NaiveDateTime, // 最近更新时间
}

impl Project {
    /// 创建新项目 (初始状态 PROPOSED, revision=0)
    pub fn new(project_id: String, title: String) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            project_id,
            title,
            status: ProjectStatus::Proposed,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// ProjectMember - 项目成员
// ==========================================
// 本核心只做展示/通知收件人用途,不做权限判断
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
    pub project_id: String, // 所属项目
    pub user_id: String,    // 用户ID
    pub role: String,       // 角色 (STUDENT / ADVISER / PANELIST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_defaults() {
        let p = Project::new("P001".to_string(), "基于Rust的排课系统".to_string());
        assert_eq!(p.status, ProjectStatus::Proposed);
        assert_eq!(p.revision, 0);
        assert_eq!(p.created_at, p.updated_at);
    }
}
