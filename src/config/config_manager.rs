// ==========================================
// 毕业设计项目管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 配置项:
// - workflow/transition_policy: PERMISSIVE (默认) | STRICT
// - notification/default_page_size: 默认 20
// - notification/max_page_size: 默认 100
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::TransitionPolicy;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 默认分页大小
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// 分页大小上限
pub const MAX_PAGE_SIZE: i64 = 100;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（upsert）
    pub fn set_config(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key)
               DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
            params![key, value],
        )?;

        Ok(())
    }

    // ==========================================
    // 类型化配置读取
    // ==========================================

    /// 读取状态转换策略（默认 PERMISSIVE）
    pub fn get_transition_policy(&self) -> Result<TransitionPolicy, Box<dyn Error>> {
        let raw = self.get_config_or_default("workflow/transition_policy", "PERMISSIVE")?;
        Ok(TransitionPolicy::from_str(&raw))
    }

    /// 读取默认分页大小（默认 20，非法值回落默认）
    pub fn get_default_page_size(&self) -> Result<i64, Box<dyn Error>> {
        let raw = self.get_config_or_default(
            "notification/default_page_size",
            &DEFAULT_PAGE_SIZE.to_string(),
        )?;
        let parsed = raw.parse::<i64>().unwrap_or(DEFAULT_PAGE_SIZE);
        Ok(if parsed > 0 { parsed } else { DEFAULT_PAGE_SIZE })
    }

    /// 读取分页大小上限（默认 100，非法值回落默认）
    pub fn get_max_page_size(&self) -> Result<i64, Box<dyn Error>> {
        let raw =
            self.get_config_or_default("notification/max_page_size", &MAX_PAGE_SIZE.to_string())?;
        let parsed = raw.parse::<i64>().unwrap_or(MAX_PAGE_SIZE);
        Ok(if parsed > 0 { parsed } else { MAX_PAGE_SIZE })
    }
}
