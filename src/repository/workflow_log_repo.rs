// ==========================================
// 毕业设计项目管理系统 - 流程日志仓储
// ==========================================
// 红线: 日志只追加,不提供更新/删除接口
// ==========================================

use crate::domain::types::ProjectStatus;
use crate::domain::workflow_log::WorkflowLogEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::project_repo::parse_ts;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// WorkflowLogRepository - 流程日志仓储
// ==========================================
pub struct WorkflowLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkflowLogRepository {
    /// 创建新的流程日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入流程日志
    ///
    /// 正常流转路径由 ProjectRepository::commit_transition 在事务内写入;
    /// 此接口供数据迁移/测试铺底使用。
    pub fn insert(&self, log: &WorkflowLogEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO workflow_log (
                log_id, project_id, from_status, to_status, comment, actor, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                log.log_id,
                log.project_id,
                log.from_status.to_db_str(),
                log.to_status.to_db_str(),
                log.comment,
                log.actor,
                log.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(log.log_id.clone())
    }

    /// 查询项目的全部流程日志（按提交顺序升序）
    ///
    /// created_at 为秒级精度,同秒提交的多条日志靠 rowid 区分先后
    /// (本表只追加不删除,rowid 即插入顺序)
    pub fn find_by_project(&self, project_id: &str) -> RepositoryResult<Vec<WorkflowLogEntry>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT log_id, project_id, from_status, to_status, comment, actor, created_at
               FROM workflow_log
               WHERE project_id = ?
               ORDER BY created_at ASC, rowid ASC"#,
        )?;

        let logs = stmt
            .query_map(params![project_id], |row| Self::map_row(row))?
            .collect::<Result<Vec<WorkflowLogEntry>, _>>()?;

        Ok(logs)
    }

    /// 统计项目的日志条数
    pub fn count_by_project(&self, project_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM workflow_log WHERE project_id = ?",
            params![project_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// 映射数据库行到WorkflowLogEntry对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<WorkflowLogEntry> {
        let from_str: String = row.get(2)?;
        let to_str: String = row.get(3)?;
        let from_status = ProjectStatus::from_str(&from_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("非法项目状态: {}", from_str).into(),
            )
        })?;
        let to_status = ProjectStatus::from_str(&to_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("非法项目状态: {}", to_str).into(),
            )
        })?;

        Ok(WorkflowLogEntry {
            log_id: row.get(0)?,
            project_id: row.get(1)?,
            from_status,
            to_status,
            comment: row.get(4)?,
            actor: row.get(5)?,
            created_at: parse_ts(row, 6)?,
        })
    }
}
