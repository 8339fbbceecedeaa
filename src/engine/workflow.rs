// ==========================================
// 毕业设计项目管理系统 - 流程引擎
// ==========================================
// 职责: 状态转换的校验、原子提交与事件发布
// 红线: 状态更新与日志追加必须同一事务;
//       事件只在提交成功后发布,发布失败不回滚
// 并发控制: 乐观锁 (project.revision),落败写入者
//           收到 OptimisticLockFailure,由调用方重试
// ==========================================

use crate::config::ConfigManager;
use crate::domain::project::Project;
use crate::domain::types::{ProjectStatus, TransitionPolicy};
use crate::domain::workflow_log::WorkflowLogEntry;
use crate::engine::events::{OptionalEventPublisher, WorkflowTransitioned};
use crate::engine::status_catalog::StatusCatalog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::project_repo::ProjectRepository;
use crate::repository::workflow_log_repo::WorkflowLogRepository;
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// TransitionOutcome - 转换结果
// ==========================================
/// 一次成功转换返回给调用方的完整结果
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// 提交后的项目 (新状态、revision+1)
    pub project: Project,
    /// 本次追加的流程日志
    pub log_entry: WorkflowLogEntry,
    /// 已发布的领域事件
    pub event: WorkflowTransitioned,
}

// ==========================================
// WorkflowEngine - 流程引擎
// ==========================================
pub struct WorkflowEngine {
    project_repo: Arc<ProjectRepository>,
    log_repo: Arc<WorkflowLogRepository>,
    config: Arc<ConfigManager>,
    publisher: OptionalEventPublisher,
}

impl WorkflowEngine {
    /// 创建新的流程引擎
    ///
    /// # 参数
    /// - `project_repo`: 项目仓储
    /// - `log_repo`: 流程日志仓储
    /// - `config`: 配置管理器 (转换策略)
    /// - `publisher`: 事件发布者 (测试环境可传 OptionalEventPublisher::none())
    pub fn new(
        project_repo: Arc<ProjectRepository>,
        log_repo: Arc<WorkflowLogRepository>,
        config: Arc<ConfigManager>,
        publisher: OptionalEventPublisher,
    ) -> Self {
        Self {
            project_repo,
            log_repo,
            config,
            publisher,
        }
    }

    // ==========================================
    // 状态转换
    // ==========================================

    /// 提交一次状态转换
    ///
    /// 流程: 读取项目 -> 策略校验 -> 事务内 CAS 更新 + 日志追加
    ///       -> 构造并发布事件
    ///
    /// # 参数
    /// - `project_id`: 项目ID
    /// - `to_status`: 目标状态 (调用方已完成字符串解析)
    /// - `actor`: 操作人
    /// - `comment`: 备注 (可选)
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: 项目不存在
    /// - `RepositoryError::InvalidStateTransition`: STRICT 策略下的非法转换
    /// - `RepositoryError::OptimisticLockFailure`: 并发写入冲突,调用方需重读重试
    pub fn transition(
        &self,
        project_id: &str,
        to_status: ProjectStatus,
        actor: &str,
        comment: Option<String>,
    ) -> RepositoryResult<TransitionOutcome> {
        let project = self
            .project_repo
            .find_by_id(project_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Project".to_string(),
                id: project_id.to_string(),
            })?;

        let policy = self
            .config
            .get_transition_policy()
            .map_err(|e| RepositoryError::InternalError(format!("读取转换策略失败: {}", e)))?;

        if !Self::is_transition_allowed(policy, project.status, to_status) {
            return Err(RepositoryError::InvalidStateTransition {
                from: project.status.to_string(),
                to: to_status.to_string(),
            });
        }

        let log_entry = WorkflowLogEntry::new(
            project.project_id.clone(),
            project.status,
            to_status,
            actor.to_string(),
            comment.clone(),
        );

        let committed = self
            .project_repo
            .commit_transition(&project, to_status, &log_entry)?;

        info!(
            project_id = %committed.project_id,
            from = %log_entry.from_status,
            to = %log_entry.to_status,
            actor = %actor,
            "状态转换已提交"
        );

        // 成员查询失败不影响已提交的转换,只影响通知收件人
        let member_ids = match self.project_repo.find_members(project_id) {
            Ok(members) => members,
            Err(e) => {
                warn!(project_id = %project_id, error = %e, "查询项目成员失败,本次转换不发送通知");
                Vec::new()
            }
        };

        let event = WorkflowTransitioned {
            project_id: committed.project_id.clone(),
            project_title: committed.title.clone(),
            from_status: log_entry.from_status,
            to_status: log_entry.to_status,
            actor: actor.to_string(),
            comment,
            member_ids,
            occurred_at: log_entry.created_at,
        };

        // 通知扇出为尽力而为,失败只记录,不回滚转换
        if let Err(e) = self.publisher.publish(&event) {
            warn!(project_id = %project_id, error = %e, "流程事件发布失败");
        }

        Ok(TransitionOutcome {
            project: committed,
            log_entry,
            event,
        })
    }

    /// 转换策略判定
    ///
    /// PERMISSIVE: 任意目标状态合法 (含回退,与源系统一致)
    /// STRICT: 仅允许
    ///   1. 任意状态 -> 回退状态
    ///   2. 回退状态 -> 任意前进状态 (重入)
    ///   3. 前进状态 -> 名义流程的下一个前进状态
    fn is_transition_allowed(
        policy: TransitionPolicy,
        from: ProjectStatus,
        to: ProjectStatus,
    ) -> bool {
        match policy {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => {
                if to.is_regression() {
                    return true;
                }
                if from.is_regression() {
                    return true;
                }
                match (from.nominal_ordinal(), to.nominal_ordinal()) {
                    (Some(f), Some(t)) => t == f + 1,
                    _ => false,
                }
            }
        }
    }

    // ==========================================
    // 派生读取
    // ==========================================

    /// 项目当前进度百分比（由状态目录派生,不入库）
    pub fn progress_of(&self, project: &Project) -> i32 {
        StatusCatalog::entry(project.status).progress_percent
    }

    /// 查询项目的全部流程日志（时间升序）
    pub fn logs_of(&self, project_id: &str) -> RepositoryResult<Vec<WorkflowLogEntry>> {
        self.log_repo.find_by_project(project_id)
    }
}
