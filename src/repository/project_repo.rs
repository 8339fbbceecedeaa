// ==========================================
// 毕业设计项目管理系统 - 项目仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 并发控制: 状态提交使用乐观锁 (revision 字段)
// ==========================================

use crate::domain::project::Project;
use crate::domain::types::ProjectStatus;
use crate::domain::workflow_log::WorkflowLogEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ProjectRepository - 项目仓储
// ==========================================
pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    /// 创建新的项目仓储
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

    /// 创建项目及其成员（同一事务）
    ///
    /// # 参数
    /// - `project`: 项目实体
    /// - `member_ids`: 成员用户ID列表
    ///
    /// # 返回
    /// - `Ok(project_id)`: 成功创建
    pub fn create(&self, project: &Project, member_ids: &[String]) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO project (project_id, title, status, revision, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                project.project_id,
                project.title,
                project.status.to_db_str(),
                project.revision,
                project.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                project.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        for user_id in member_ids {
            tx.execute(
                "INSERT OR IGNORE INTO project_member (project_id, user_id, role) VALUES (?, ?, 'STUDENT')",
                params![project.project_id, user_id],
            )?;
        }

        tx.commit()?;
        Ok(project.project_id.clone())
    }

    /// 提交状态转换（乐观锁 + 日志追加，同一事务）
    ///
    /// # 并发控制
    /// UPDATE 带 revision 条件；0 行命中时区分
    /// "记录不存在" 与 "revision 冲突" 两种失败。
    ///
    /// # 参数
    /// - `project`: 调用方读取到的项目快照（以其 revision 为期望值）
    /// - `to_status`: 目标状态
    /// - `log`: 随本次转换追加的流程日志
    ///
    /// # 返回
    /// - `Ok(Project)`: 提交后的项目（新状态、revision+1）
    ///
    /// # 错误
    /// - `RepositoryError::OptimisticLockFailure`: 其他写入者已抢先提交
    /// - `RepositoryError::NotFound`: project_id 不存在
    pub fn commit_transition(
        &self,
        project: &Project,
        to_status: ProjectStatus,
        log: &WorkflowLogEntry,
    ) -> RepositoryResult<Project> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let updated_at = chrono::Utc::now().naive_utc();
        let rows_affected = tx.execute(
            r#"UPDATE project
               SET status = ?, revision = revision + 1, updated_at = ?
               WHERE project_id = ? AND revision = ?"#,
            params![
                to_status.to_db_str(),
                updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                project.project_id,
                project.revision,
            ],
        )?;

        if rows_affected == 0 {
            // 判断是记录不存在还是revision冲突
            let exists: Result<i32, _> = tx.query_row(
                "SELECT revision FROM project WHERE project_id = ?",
                params![project.project_id],
                |row| row.get(0),
            );

            return match exists {
                Ok(actual_revision) => Err(RepositoryError::OptimisticLockFailure {
                    project_id: project.project_id.clone(),
                    expected: project.revision,
                    actual: actual_revision,
                }),
                Err(_) => Err(RepositoryError::NotFound {
                    entity: "Project".to_string(),
                    id: project.project_id.clone(),
                }),
            };
        }

        tx.execute(
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

        tx.commit()?;

        let mut committed = project.clone();
        committed.status = to_status;
        committed.revision = project.revision + 1;
        committed.updated_at = updated_at;
        Ok(committed)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询项目
    pub fn find_by_id(&self, project_id: &str) -> RepositoryResult<Option<Project>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT project_id, title, status, revision, created_at, updated_at
               FROM project WHERE project_id = ?"#,
            params![project_id],
            |row| Self::map_row(row),
        ) {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询全部项目（创建时间倒序，最新在前）
    pub fn list_all(&self) -> RepositoryResult<Vec<Project>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT project_id, title, status, revision, created_at, updated_at
               FROM project
               ORDER BY created_at DESC, project_id DESC"#,
        )?;

        let projects = stmt
            .query_map([], |row| Self::map_row(row))?
            .collect::<Result<Vec<Project>, _>>()?;

        Ok(projects)
    }

    /// 查询项目成员用户ID列表
    pub fn find_members(&self, project_id: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT user_id FROM project_member WHERE project_id = ? ORDER BY user_id",
        )?;

        let members = stmt
            .query_map(params![project_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(members)
    }

    /// 映射数据库行到Project对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Project> {
        let status_str: String = row.get(2)?;
        let status = ProjectStatus::from_str(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("非法项目状态: {}", status_str).into(),
            )
        })?;

        Ok(Project {
            project_id: row.get(0)?,
            title: row.get(1)?,
            status,
            revision: row.get(3)?,
            created_at: parse_ts(row, 4)?,
            updated_at: parse_ts(row, 5)?,
        })
    }
}

/// 解析文本时间戳列
pub(crate) fn parse_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
