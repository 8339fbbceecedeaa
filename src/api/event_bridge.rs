// ==========================================
// 毕业设计项目管理系统 - 流程事件通知适配器
// ==========================================
// 职责: 实现引擎层 WorkflowEventPublisher trait,
//       将已提交的状态转换扇出为项目成员的通知
// 说明: Engine 层定义 trait,此处实现适配器 (依赖倒置)
// ==========================================

use crate::api::notification_api::NotificationApi;
use crate::domain::types::{NotificationType, ProjectStatus};
use crate::engine::events::{WorkflowEventPublisher, WorkflowTransitioned};
use crate::engine::status_catalog::StatusCatalog;
use std::error::Error;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// NotificationEventBridge - 通知适配器
// ==========================================
pub struct NotificationEventBridge {
    notification_api: Arc<NotificationApi>,
}

impl NotificationEventBridge {
    /// 创建新的通知适配器
    pub fn new(notification_api: Arc<NotificationApi>) -> Self {
        Self { notification_api }
    }

    /// 目标状态 -> 通知类型映射
    ///
    /// 常规转换为 STATUS_CHANGED,少数里程碑/回退状态映射为
    /// 语义更强的专用类型
    fn notification_type_for(to_status: ProjectStatus) -> NotificationType {
        match to_status {
            ProjectStatus::RevisionRequired | ProjectStatus::ProjectReset => {
                NotificationType::RevisionRequested
            }
            ProjectStatus::Archived => NotificationType::ProjectArchived,
            ProjectStatus::ApprovedForDefense | ProjectStatus::FinalApproved => {
                NotificationType::ProposalApproved
            }
            _ => NotificationType::StatusChanged,
        }
    }
}

impl WorkflowEventPublisher for NotificationEventBridge {
    fn publish(&self, event: &WorkflowTransitioned) -> Result<usize, Box<dyn Error + Send + Sync>> {
        if event.member_ids.is_empty() {
            debug!(project_id = %event.project_id, "项目无成员,跳过通知扇出");
            return Ok(0);
        }

        let from_label = StatusCatalog::entry(event.from_status).label;
        let to_label = StatusCatalog::entry(event.to_status).label;

        let title = format!("项目状态更新: {}", to_label);
        let mut message = format!(
            "课题《{}》状态由「{}」变更为「{}」,操作人: {}。",
            event.project_title, from_label, to_label, event.actor
        );
        if let Some(comment) = &event.comment {
            if !comment.trim().is_empty() {
                message.push_str(&format!("备注: {}", comment));
            }
        }

        let created = self
            .notification_api
            .notify(
                Self::notification_type_for(event.to_status),
                &event.member_ids,
                &title,
                &message,
                Some(event.project_id.clone()),
            )
            .map_err(|e| Box::new(e) as Box<dyn Error + Send + Sync>)?;

        Ok(created.len())
    }
}
