// ==========================================
// 毕业设计项目管理系统 - 配置层
// ==========================================
// 职责: 系统配置的存取
// ==========================================

pub mod config_manager;

pub use config_manager::{ConfigManager, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
