// ==========================================
// 毕业设计项目管理系统 - 通知领域模型
// ==========================================
// 生命周期: 由 NotificationApi 按领域事件创建一次;
//           read_flag 只允许 false -> true 单向翻转;
//           删除为单条删除或按已读批量清理
// ==========================================

use crate::domain::types::NotificationType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Notification - 用户通知
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: String,            // 通知ID (UUID)
    pub recipient_id: String,               // 收件人用户ID
    pub notif_type: NotificationType,       // 通知类型 (封闭枚举)
    pub title: String,                      // 标题
    pub message: String,                    // 正文
    pub read_flag: bool,                    // 是否已读 (默认 false)
    pub related_project_id: Option<String>, // 关联项目 (可选)
    pub created_at: NaiveDateTime,          // 创建时间
}

impl Notification {
    /// 创建新通知 (未读)
    pub fn new(
        recipient_id: String,
        notif_type: NotificationType,
        title: String,
        message: String,
        related_project_id: Option<String>,
    ) -> Self {
        Self {
            notification_id: uuid::Uuid::new_v4().to_string(),
            recipient_id,
            notif_type,
            title,
            message,
            read_flag: false,
            related_project_id,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_unread() {
        let n = Notification::new(
            "student01".to_string(),
            NotificationType::StatusChanged,
            "项目状态更新".to_string(),
            "状态已变更".to_string(),
            Some("P001".to_string()),
        );
        assert!(!n.read_flag);
        assert_eq!(n.notif_type, NotificationType::StatusChanged);
        assert!(!n.notification_id.is_empty());
    }
}
