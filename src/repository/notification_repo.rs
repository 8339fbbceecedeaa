// ==========================================
// 毕业设计项目管理系统 - 通知仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 并发控制: 未读计数与行变更在同一事务内完成,
//           递减一律钳制在 0 (MAX(unread_count - 1, 0))
// 不变量: notification_counter.unread_count ==
//         count(notification WHERE recipient_id=X AND read_flag=0)
// ==========================================

use crate::domain::notification::Notification;
use crate::domain::types::NotificationType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::project_repo::parse_ts;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// NotificationRepository - 通知仓储
// ==========================================
pub struct NotificationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl NotificationRepository {
    /// 创建新的通知仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入通知并同步未读计数（同一事务）
    ///
    /// # 返回
    /// - `Ok(notification_id)`: 成功插入
    pub fn insert(&self, notification: &Notification) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO notification (
                notification_id, recipient_id, notif_type, title, message,
                read_flag, related_project_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                notification.notification_id,
                notification.recipient_id,
                notification.notif_type.to_db_str(),
                notification.title,
                notification.message,
                notification.read_flag as i32,
                notification.related_project_id,
                notification.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        if !notification.read_flag {
            tx.execute(
                r#"INSERT INTO notification_counter (recipient_id, unread_count)
                   VALUES (?, 1)
                   ON CONFLICT(recipient_id)
                   DO UPDATE SET unread_count = unread_count + 1"#,
                params![notification.recipient_id],
            )?;
        }

        tx.commit()?;
        Ok(notification.notification_id.clone())
    }

    /// 标记单条通知为已读（幂等）
    ///
    /// 仅在 false -> true 翻转时递减计数一次;
    /// 已读通知再次标记不报错、不重复递减。
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: 收件人范围内不存在该通知
    pub fn mark_read(
        &self,
        notification_id: &str,
        recipient_id: &str,
    ) -> RepositoryResult<Notification> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let flipped = tx.execute(
            r#"UPDATE notification SET read_flag = 1
               WHERE notification_id = ? AND recipient_id = ? AND read_flag = 0"#,
            params![notification_id, recipient_id],
        )?;

        if flipped == 1 {
            tx.execute(
                r#"UPDATE notification_counter
                   SET unread_count = MAX(unread_count - 1, 0)
                   WHERE recipient_id = ?"#,
                params![recipient_id],
            )?;
        }

        let notification = match tx.query_row(
            r#"SELECT notification_id, recipient_id, notif_type, title, message,
                      read_flag, related_project_id, created_at
               FROM notification
               WHERE notification_id = ? AND recipient_id = ?"#,
            params![notification_id, recipient_id],
            |row| Self::map_row(row),
        ) {
            Ok(n) => n,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(RepositoryError::NotFound {
                    entity: "Notification".to_string(),
                    id: notification_id.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit()?;
        Ok(notification)
    }

    /// 将收件人的全部未读通知标记为已读，计数归零
    ///
    /// # 返回
    /// - `Ok(count)`: 实际翻转的条数（无未读时为 0）
    pub fn mark_all_read(&self, recipient_id: &str) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE notification SET read_flag = 1 WHERE recipient_id = ? AND read_flag = 0",
            params![recipient_id],
        )?;

        tx.execute(
            r#"INSERT INTO notification_counter (recipient_id, unread_count)
               VALUES (?, 0)
               ON CONFLICT(recipient_id)
               DO UPDATE SET unread_count = 0"#,
            params![recipient_id],
        )?;

        tx.commit()?;
        Ok(changed as i64)
    }

    /// 删除单条通知（不论已读未读）
    ///
    /// 未读通知删除时计数递减（钳制在 0）。
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: 收件人范围内不存在该通知
    pub fn delete(&self, notification_id: &str, recipient_id: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let read_flag: i32 = match tx.query_row(
            "SELECT read_flag FROM notification WHERE notification_id = ? AND recipient_id = ?",
            params![notification_id, recipient_id],
            |row| row.get(0),
        ) {
            Ok(flag) => flag,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(RepositoryError::NotFound {
                    entity: "Notification".to_string(),
                    id: notification_id.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        tx.execute(
            "DELETE FROM notification WHERE notification_id = ? AND recipient_id = ?",
            params![notification_id, recipient_id],
        )?;

        if read_flag == 0 {
            tx.execute(
                r#"UPDATE notification_counter
                   SET unread_count = MAX(unread_count - 1, 0)
                   WHERE recipient_id = ?"#,
                params![recipient_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 删除收件人的全部已读通知
    ///
    /// 未读通知与未读计数均不受影响。
    ///
    /// # 返回
    /// - `Ok(count)`: 删除的条数
    pub fn clear_read(&self, recipient_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let removed = conn.execute(
            "DELETE FROM notification WHERE recipient_id = ? AND read_flag = 1",
            params![recipient_id],
        )?;

        Ok(removed as i64)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 收件人范围内按ID查询通知
    pub fn find_by_id(
        &self,
        notification_id: &str,
        recipient_id: &str,
    ) -> RepositoryResult<Option<Notification>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT notification_id, recipient_id, notif_type, title, message,
                      read_flag, related_project_id, created_at
               FROM notification
               WHERE notification_id = ? AND recipient_id = ?"#,
            params![notification_id, recipient_id],
            |row| Self::map_row(row),
        ) {
            Ok(n) => Ok(Some(n)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 分页查询收件人通知（时间倒序，同时间按notification_id倒序）
    ///
    /// # 参数
    /// - `unread_only`: true 时只返回未读
    /// - `limit` / `offset`: 分页参数
    pub fn list(
        &self,
        recipient_id: &str,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Notification>> {
        let conn = self.get_conn()?;

        let sql = if unread_only {
            r#"SELECT notification_id, recipient_id, notif_type, title, message,
                      read_flag, related_project_id, created_at
               FROM notification
               WHERE recipient_id = ? AND read_flag = 0
               ORDER BY created_at DESC, notification_id DESC
               LIMIT ? OFFSET ?"#
        } else {
            r#"SELECT notification_id, recipient_id, notif_type, title, message,
                      read_flag, related_project_id, created_at
               FROM notification
               WHERE recipient_id = ?
               ORDER BY created_at DESC, notification_id DESC
               LIMIT ? OFFSET ?"#
        };

        let mut stmt = conn.prepare(sql)?;
        let notifications = stmt
            .query_map(params![recipient_id, limit, offset], |row| {
                Self::map_row(row)
            })?
            .collect::<Result<Vec<Notification>, _>>()?;

        Ok(notifications)
    }

    /// 统计收件人通知条数（与 list 使用同一过滤条件）
    pub fn count(&self, recipient_id: &str, unread_only: bool) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let sql = if unread_only {
            "SELECT COUNT(*) FROM notification WHERE recipient_id = ? AND read_flag = 0"
        } else {
            "SELECT COUNT(*) FROM notification WHERE recipient_id = ?"
        };

        let count: i64 = conn.query_row(sql, params![recipient_id], |row| row.get(0))?;
        Ok(count)
    }

    /// 读取维护计数器中的未读数（O(1)，供高频轮询）
    ///
    /// 无计数行时返回 0。
    pub fn unread_count(&self, recipient_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        match conn.query_row(
            "SELECT unread_count FROM notification_counter WHERE recipient_id = ?",
            params![recipient_id],
            |row| row.get::<_, i64>(0),
        ) {
            Ok(count) => Ok(count),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// 按明细重算未读数并回写计数器（一致性校验/修复入口）
    pub fn recount_unread(&self, recipient_id: &str) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let actual: i64 = tx.query_row(
            "SELECT COUNT(*) FROM notification WHERE recipient_id = ? AND read_flag = 0",
            params![recipient_id],
            |row| row.get(0),
        )?;

        tx.execute(
            r#"INSERT INTO notification_counter (recipient_id, unread_count)
               VALUES (?, ?)
               ON CONFLICT(recipient_id)
               DO UPDATE SET unread_count = excluded.unread_count"#,
            params![recipient_id, actual],
        )?;

        tx.commit()?;
        Ok(actual)
    }

    /// 映射数据库行到Notification对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Notification> {
        let type_str: String = row.get(2)?;
        let notif_type = NotificationType::from_str(&type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("非法通知类型: {}", type_str).into(),
            )
        })?;

        Ok(Notification {
            notification_id: row.get(0)?,
            recipient_id: row.get(1)?,
            notif_type,
            title: row.get(3)?,
            message: row.get(4)?,
            read_flag: row.get::<_, i32>(5)? != 0,
            related_project_id: row.get(6)?,
            created_at: parse_ts(row, 7)?,
        })
    }
}
