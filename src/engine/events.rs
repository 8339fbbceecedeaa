// ==========================================
// 毕业设计项目管理系统 - 引擎层事件发布
// ==========================================
// 职责: 定义流程事件发布 trait，实现依赖倒置
// 说明: Engine 层定义 trait，API 层实现通知适配器
// ==========================================

use crate::domain::types::ProjectStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// WorkflowTransitioned - 流程转换事件
// ==========================================

/// 一次已提交的状态转换产生的领域事件
///
/// 只在持久化提交成功后构造发布,不存在部分可见
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTransitioned {
    /// 项目 ID
    pub project_id: String,
    /// 课题名称 (供通知文案)
    pub project_title: String,
    /// 变更前状态
    pub from_status: ProjectStatus,
    /// 变更后状态
    pub to_status: ProjectStatus,
    /// 操作人
    pub actor: String,
    /// 备注 (可选)
    pub comment: Option<String>,
    /// 项目成员用户ID (通知收件人)
    pub member_ids: Vec<String>,
    /// 转换提交时间
    pub occurred_at: NaiveDateTime,
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 流程事件发布者 Trait
///
/// Engine 层定义，API 层实现
/// 通过 trait 实现依赖倒置，解除 Engine -> API 的直接依赖
///
/// # 实现说明
/// - API 层的 `NotificationEventBridge` 实现此 trait
/// - 将 `WorkflowTransitioned` 扇出为每个成员一条通知
pub trait WorkflowEventPublisher: Send + Sync {
    /// 发布流程事件
    ///
    /// # 返回
    /// - `Ok(count)`: 实际送达的收件人数量
    /// - `Err`: 发布失败 (调用方只记录,不回滚已提交的转换)
    fn publish(&self, event: &WorkflowTransitioned) -> Result<usize, Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要通知扇出的场景（如单元测试）
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl WorkflowEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: &WorkflowTransitioned) -> Result<usize, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            project_id = %event.project_id,
            from = %event.from_status,
            to = %event.to_status,
            "NoOpEventPublisher: 跳过事件发布"
        );
        Ok(0)
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn WorkflowEventPublisher>> 的使用
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn WorkflowEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 创建带发布者的实例
    pub fn with_publisher(publisher: Arc<dyn WorkflowEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 创建空实例（不发布事件）
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件（如果有发布者）
    pub fn publish(&self, event: &WorkflowTransitioned) -> Result<usize, Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => {
                tracing::debug!(
                    project_id = %event.project_id,
                    to = %event.to_status,
                    "OptionalEventPublisher: 未配置发布者，跳过事件"
                );
                Ok(0)
            }
        }
    }

    /// 检查是否配置了发布者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> WorkflowTransitioned {
        WorkflowTransitioned {
            project_id: "P001".to_string(),
            project_title: "测试课题".to_string(),
            from_status: ProjectStatus::Proposed,
            to_status: ProjectStatus::AdviserReview,
            actor: "adviser01".to_string(),
            comment: None,
            member_ids: vec!["student01".to_string()],
            occurred_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_noop_publisher() {
        let publisher = NoOpEventPublisher;
        let result = publisher.publish(&sample_event());
        assert_eq!(result.unwrap(), 0);
    }

    #[test]
    fn test_optional_publisher_none() {
        let publisher = OptionalEventPublisher::none();
        assert!(!publisher.is_configured());
        assert!(publisher.publish(&sample_event()).is_ok());
    }

    #[test]
    fn test_optional_publisher_with_noop() {
        let noop = Arc::new(NoOpEventPublisher) as Arc<dyn WorkflowEventPublisher>;
        let publisher = OptionalEventPublisher::with_publisher(noop);
        assert!(publisher.is_configured());
        assert!(publisher.publish(&sample_event()).is_ok());
    }
}
