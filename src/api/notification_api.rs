// ==========================================
// 毕业设计项目管理系统 - 通知 API
// ==========================================
// 职责: 通知创建 (扇出)、收件箱查询与读态管理
// 约束: 扇出为每收件人独立写入,单个失败只记录不中断;
//       未读计数恒等于未读明细条数,由仓储事务保证
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::notification::Notification;
use crate::domain::types::NotificationType;
use crate::repository::notification_repo::NotificationRepository;

// ==========================================
// DTO 类型定义
// ==========================================

/// 收件箱分页查询结果
///
/// success 显式为 true,调用方以此区分"空收件箱"与"请求失败"
/// (失败时调用方约定降级为空收件箱展示)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    /// 请求成功标志
    pub success: bool,
    /// 当前页通知 (时间倒序)
    pub items: Vec<Notification>,
    /// 当前页码 (1 起)
    pub page: i64,
    /// 总页数 (ceil(total / page_size))
    pub pages: i64,
    /// 过滤条件下的总条数
    pub total: i64,
    /// 全局未读数 (不受 unread_only / 分页影响)
    pub unread_count: i64,
}

/// 清理已读通知的结果摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearReadSummary {
    /// 删除条数
    pub removed_count: i64,
    /// 摘要消息
    pub message: String,
}

// ==========================================
// NotificationApi - 通知 API
// ==========================================

/// 通知API
///
/// 职责：
/// 1. 按领域事件创建通知 (多收件人扇出)
/// 2. 收件箱分页查询
/// 3. 读态管理 (单条已读/全部已读/删除/清理已读)
/// 4. 未读计数 (O(1),供前端定时轮询)
pub struct NotificationApi {
    notification_repo: Arc<NotificationRepository>,
    config: Arc<ConfigManager>,
}

impl NotificationApi {
    /// 创建新的NotificationApi实例
    pub fn new(
        notification_repo: Arc<NotificationRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            notification_repo,
            config,
        }
    }

    // ==========================================
    // 创建接口
    // ==========================================

    /// 创建通知 (每收件人一条)
    ///
    /// 扇出不是原子批量: 单个收件人写入失败只记录警告并跳过,
    /// 其余收件人不受影响 (触发方的状态转换已提交,不能回滚)。
    ///
    /// # 参数
    /// - `notif_type`: 通知类型
    /// - `recipient_ids`: 收件人用户ID列表
    /// - `title` / `message`: 通知文案
    /// - `related_project_id`: 关联项目 (可选)
    ///
    /// # 返回
    /// - `Ok(Vec<Notification>)`: 实际创建成功的通知
    pub fn notify(
        &self,
        notif_type: NotificationType,
        recipient_ids: &[String],
        title: &str,
        message: &str,
        related_project_id: Option<String>,
    ) -> ApiResult<Vec<Notification>> {
        if recipient_ids.is_empty() {
            return Err(ApiError::InvalidInput("收件人列表不能为空".to_string()));
        }
        if title.trim().is_empty() {
            return Err(ApiError::InvalidInput("通知标题不能为空".to_string()));
        }

        let mut created = Vec::with_capacity(recipient_ids.len());
        for recipient_id in recipient_ids {
            if recipient_id.trim().is_empty() {
                warn!(notif_type = %notif_type, "收件人ID为空,跳过该收件人");
                continue;
            }

            let notification = Notification::new(
                recipient_id.clone(),
                notif_type,
                title.to_string(),
                message.to_string(),
                related_project_id.clone(),
            );

            match self.notification_repo.insert(&notification) {
                Ok(_) => created.push(notification),
                Err(e) => {
                    // 扇出部分失败: 记录后继续,不使整体调用失败
                    warn!(
                        recipient_id = %recipient_id,
                        notif_type = %notif_type,
                        error = %e,
                        "通知写入失败,跳过该收件人"
                    );
                }
            }
        }

        debug!(
            notif_type = %notif_type,
            requested = recipient_ids.len(),
            created = created.len(),
            "通知扇出完成"
        );

        Ok(created)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 分页查询收件箱
    ///
    /// # 参数
    /// - `page`: 页码 (1 起,小于 1 时按 1 处理)
    /// - `page_size`: 每页条数 (None 取配置默认 20,钳制在 [1, 上限])
    /// - `unread_only`: 只看未读
    ///
    /// # 返回
    /// - `Ok(NotificationListResponse)`: 当前页数据 + 分页信息 + 全局未读数
    pub fn list(
        &self,
        recipient_id: &str,
        page: i64,
        page_size: Option<i64>,
        unread_only: bool,
    ) -> ApiResult<NotificationListResponse> {
        if recipient_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("收件人ID不能为空".to_string()));
        }

        // 配置读取失败回落到内置默认,不阻断查询
        let default_size = self.config.get_default_page_size().unwrap_or_else(|e| {
            warn!(error = %e, "读取默认分页配置失败,使用内置默认值");
            DEFAULT_PAGE_SIZE
        });
        let max_size = self.config.get_max_page_size().unwrap_or_else(|e| {
            warn!(error = %e, "读取分页上限配置失败,使用内置默认值");
            MAX_PAGE_SIZE
        });

        let page = page.max(1);
        let page_size = page_size.unwrap_or(default_size).clamp(1, max_size);

        let total = self.notification_repo.count(recipient_id, unread_only)?;
        let pages = if total == 0 {
            0
        } else {
            (total + page_size - 1) / page_size
        };

        let items = self.notification_repo.list(
            recipient_id,
            unread_only,
            page_size,
            (page - 1) * page_size,
        )?;

        let unread_count = self.notification_repo.unread_count(recipient_id)?;

        Ok(NotificationListResponse {
            success: true,
            items,
            page,
            pages,
            total,
            unread_count,
        })
    }

    /// 查询全局未读数
    ///
    /// 由维护计数器支撑,O(1),可承受前端固定间隔轮询
    pub fn unread_count(&self, recipient_id: &str) -> ApiResult<i64> {
        if recipient_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("收件人ID不能为空".to_string()));
        }

        Ok(self.notification_repo.unread_count(recipient_id)?)
    }

    /// 按明细重算未读数 (一致性校验/修复入口)
    pub fn recount_unread(&self, recipient_id: &str) -> ApiResult<i64> {
        if recipient_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("收件人ID不能为空".to_string()));
        }

        Ok(self.notification_repo.recount_unread(recipient_id)?)
    }

    // ==========================================
    // 读态管理接口
    // ==========================================

    /// 标记单条通知为已读 (幂等)
    ///
    /// 已读通知重复标记直接返回原样,不报错、计数不重复递减
    pub fn mark_read(&self, notification_id: &str, recipient_id: &str) -> ApiResult<Notification> {
        if notification_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("通知ID不能为空".to_string()));
        }
        if recipient_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("收件人ID不能为空".to_string()));
        }

        Ok(self
            .notification_repo
            .mark_read(notification_id, recipient_id)?)
    }

    /// 全部标记为已读
    ///
    /// # 返回
    /// - `Ok(count)`: 实际翻转条数 (无未读时为 0,非错误)
    pub fn mark_all_read(&self, recipient_id: &str) -> ApiResult<i64> {
        if recipient_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("收件人ID不能为空".to_string()));
        }

        Ok(self.notification_repo.mark_all_read(recipient_id)?)
    }

    /// 删除单条通知 (不论已读未读)
    ///
    /// 只允许删除收件人自己的通知,越界按 NotFound 处理
    pub fn delete(&self, notification_id: &str, recipient_id: &str) -> ApiResult<()> {
        if notification_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("通知ID不能为空".to_string()));
        }
        if recipient_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("收件人ID不能为空".to_string()));
        }

        Ok(self.notification_repo.delete(notification_id, recipient_id)?)
    }

    /// 清理全部已读通知
    ///
    /// 未读通知与未读计数不受影响
    pub fn clear_read(&self, recipient_id: &str) -> ApiResult<ClearReadSummary> {
        if recipient_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("收件人ID不能为空".to_string()));
        }

        let removed_count = self.notification_repo.clear_read(recipient_id)?;

        Ok(ClearReadSummary {
            removed_count,
            message: format!("已清理{}条已读通知", removed_count),
        })
    }
}
