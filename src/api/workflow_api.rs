// ==========================================
// 毕业设计项目管理系统 - 流程 API
// ==========================================
// 职责: 项目创建、状态转换、流程日志与进度查询
// 约束: 本核心不做权限判断,假定调用方已完成鉴权,
//       只校验转换的"形状"是否合法
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::project::Project;
use crate::domain::workflow_log::WorkflowLogEntry;
use crate::engine::status_catalog::StatusCatalog;
use crate::engine::workflow::{TransitionOutcome, WorkflowEngine};
use crate::repository::project_repo::ProjectRepository;

// ==========================================
// DTO 类型定义
// ==========================================

/// 项目详情（主数据 + 目录派生字段）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    pub project: Project,
    /// 成员用户ID列表
    pub members: Vec<String>,
    /// 当前状态展示标签
    pub status_label: String,
    /// 当前状态展示分类
    pub status_variant: String,
    /// 完成进度 [0,100]
    pub progress_percent: i32,
}

// ==========================================
// WorkflowApi - 流程 API
// ==========================================

/// 流程API
///
/// 职责：
/// 1. 项目创建（含成员）
/// 2. 状态转换（含策略校验、日志、通知扇出）
/// 3. 流程日志与进度查询
pub struct WorkflowApi {
    project_repo: Arc<ProjectRepository>,
    engine: Arc<WorkflowEngine>,
}

impl WorkflowApi {
    /// 创建新的WorkflowApi实例
    pub fn new(project_repo: Arc<ProjectRepository>, engine: Arc<WorkflowEngine>) -> Self {
        Self {
            project_repo,
            engine,
        }
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 创建项目（初始状态 PROPOSED）
    ///
    /// # 参数
    /// - `title`: 课题名称
    /// - `member_ids`: 成员用户ID列表（通知收件人）
    ///
    /// # 返回
    /// - `Ok(Project)`: 新建的项目
    pub fn create_project(&self, title: &str, member_ids: &[String]) -> ApiResult<Project> {
        if title.trim().is_empty() {
            return Err(ApiError::InvalidInput("课题名称不能为空".to_string()));
        }

        let project = Project::new(uuid::Uuid::new_v4().to_string(), title.trim().to_string());
        self.project_repo.create(&project, member_ids)?;

        info!(
            project_id = %project.project_id,
            member_count = member_ids.len(),
            "项目已创建"
        );

        Ok(project)
    }

    /// 转换项目状态
    ///
    /// # 参数
    /// - `project_id`: 项目ID
    /// - `new_status`: 目标状态字符串（按状态目录解析）
    /// - `actor`: 操作人
    /// - `comment`: 备注（可选）
    ///
    /// # 返回
    /// - `Ok(TransitionOutcome)`: 提交后的项目 + 日志 + 事件
    ///
    /// # 错误
    /// - `ApiError::UnknownStatus`: 目标状态不在封闭枚举内
    /// - `ApiError::NotFound`: 项目不存在
    /// - `ApiError::OptimisticLockFailure`: 并发冲突，调用方需重读后重试
    /// - `ApiError::InvalidStateTransition`: STRICT 策略下的非法转换
    pub fn transition_status(
        &self,
        project_id: &str,
        new_status: &str,
        actor: &str,
        comment: Option<String>,
    ) -> ApiResult<TransitionOutcome> {
        if project_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("项目ID不能为空".to_string()));
        }
        if actor.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }

        // 状态目录校验: 未知状态显式报错,不静默兜底
        let info = StatusCatalog::lookup(new_status)?;

        let outcome = self
            .engine
            .transition(project_id, info.status, actor, comment)?;

        Ok(outcome)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询全部项目（创建时间倒序）
    pub fn list_projects(&self) -> ApiResult<Vec<Project>> {
        Ok(self.project_repo.list_all()?)
    }

    /// 查询项目详情（主数据 + 成员 + 目录派生字段）
    pub fn get_project_detail(&self, project_id: &str) -> ApiResult<ProjectDetail> {
        if project_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("项目ID不能为空".to_string()));
        }

        let project = self
            .project_repo
            .find_by_id(project_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Project(id={})不存在", project_id)))?;

        let members = self.project_repo.find_members(project_id)?;
        let info = StatusCatalog::entry(project.status);

        Ok(ProjectDetail {
            status_label: info.label.to_string(),
            status_variant: info.variant.to_string(),
            progress_percent: info.progress_percent,
            members,
            project,
        })
    }

    /// 查询项目流程日志（时间升序）
    pub fn get_project_logs(&self, project_id: &str) -> ApiResult<Vec<WorkflowLogEntry>> {
        if project_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("项目ID不能为空".to_string()));
        }

        // 区分"项目不存在"与"项目存在但无日志"
        if self.project_repo.find_by_id(project_id)?.is_none() {
            return Err(ApiError::NotFound(format!(
                "Project(id={})不存在",
                project_id
            )));
        }

        Ok(self.engine.logs_of(project_id)?)
    }

    /// 查询项目当前进度百分比
    pub fn get_project_progress(&self, project_id: &str) -> ApiResult<i32> {
        if project_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("项目ID不能为空".to_string()));
        }

        let project = self
            .project_repo
            .find_by_id(project_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Project(id={})不存在", project_id)))?;

        Ok(self.engine.progress_of(&project))
    }
}
