// ==========================================
// 流程引擎测试
// ==========================================
// 职责: 验证项目创建、状态转换、日志追加与进度派生
// ==========================================


#[cfg(test)]
mod workflow_engine_test {
    use capstone_tracker::api::{ApiError, WorkflowApi};
    use capstone_tracker::config::ConfigManager;
    use capstone_tracker::domain::types::ProjectStatus;
    use capstone_tracker::engine::{OptionalEventPublisher, WorkflowEngine};
    use capstone_tracker::repository::{ProjectRepository, WorkflowLogRepository};
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    use crate::test_helpers::{create_test_db, open_test_conn};

    // ==========================================
    // 测试辅助函数
    // ==========================================

    /// 创建测试环境
    fn setup_test_env() -> (
        NamedTempFile,
        String,
        Arc<WorkflowApi>,
        Arc<WorkflowLogRepository>,
        Arc<ConfigManager>,
    ) {
        let (temp_file, db_path) = create_test_db().unwrap();

        let conn = Arc::new(Mutex::new(open_test_conn(&db_path).unwrap()));
        let project_repo = Arc::new(ProjectRepository::new(conn.clone()));
        let log_repo = Arc::new(WorkflowLogRepository::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::new(&db_path).unwrap());

        let engine = Arc::new(WorkflowEngine::new(
            project_repo.clone(),
            log_repo.clone(),
            config_manager.clone(),
            OptionalEventPublisher::none(), // 测试环境不需要事件发布
        ));

        let workflow_api = Arc::new(WorkflowApi::new(project_repo, engine));

        (temp_file, db_path, workflow_api, log_repo, config_manager)
    }

    fn members(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    // ==========================================
    // 测试1: 项目创建
    // ==========================================

    #[test]
    fn test_create_project_initial_state() {
        let (_temp_file, _db_path, api, _log_repo, _config) = setup_test_env();

        let project = api
            .create_project("基于规则引擎的排课系统", &members(&["s001", "t001"]))
            .unwrap();

        assert_eq!(project.status, ProjectStatus::Proposed);
        assert_eq!(project.revision, 0);

        let detail = api.get_project_detail(&project.project_id).unwrap();
        assert_eq!(detail.project.project_id, project.project_id);
        assert_eq!(detail.members, vec!["s001".to_string(), "t001".to_string()]);
        assert_eq!(detail.status_label, "课题已提交");
        assert_eq!(detail.progress_percent, 5);
    }

    #[test]
    fn test_list_projects_newest_first() {
        let (_temp_file, _db_path, api, _log_repo, _config) = setup_test_env();

        let first = api.create_project("课题一", &members(&["s001"])).unwrap();
        let second = api.create_project("课题二", &members(&["s002"])).unwrap();

        let projects = api.list_projects().unwrap();
        assert_eq!(projects.len(), 2);

        let ids: Vec<&str> = projects.iter().map(|p| p.project_id.as_str()).collect();
        assert!(ids.contains(&first.project_id.as_str()));
        assert!(ids.contains(&second.project_id.as_str()));
    }

    #[test]
    fn test_create_project_empty_title_rejected() {
        let (_temp_file, _db_path, api, _log_repo, _config) = setup_test_env();

        let result = api.create_project("   ", &members(&["s001"]));
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    // ==========================================
    // 测试2: 状态转换与日志追加
    // ==========================================

    #[test]
    fn test_transition_appends_log_and_bumps_revision() {
        let (_temp_file, _db_path, api, log_repo, _config) = setup_test_env();

        let project = api.create_project("测试课题", &members(&["s001"])).unwrap();

        let outcome = api
            .transition_status(
                &project.project_id,
                "TOPIC_SELECTION",
                "t001",
                Some("选题已确认".to_string()),
            )
            .unwrap();

        assert_eq!(outcome.project.status, ProjectStatus::TopicSelection);
        assert_eq!(outcome.project.revision, 1);
        assert_eq!(outcome.log_entry.from_status, ProjectStatus::Proposed);
        assert_eq!(outcome.log_entry.to_status, ProjectStatus::TopicSelection);
        assert_eq!(outcome.log_entry.actor, "t001");
        assert_eq!(outcome.log_entry.comment.as_deref(), Some("选题已确认"));

        let count = log_repo.count_by_project(&project.project_id).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_log_order_ascending_and_last_entry_matches_status() {
        let (_temp_file, _db_path, api, _log_repo, _config) = setup_test_env();

        let project = api.create_project("测试课题", &members(&["s001"])).unwrap();

        let chain = [
            "TOPIC_SELECTION",
            "CHAPTER_1_DRAFT",
            "CHAPTER_1_REVIEW",
            "CHAPTER_1_APPROVED",
        ];
        for status in &chain {
            api.transition_status(&project.project_id, status, "t001", None)
                .unwrap();
        }

        let logs = api.get_project_logs(&project.project_id).unwrap();
        assert_eq!(logs.len(), chain.len());

        // 日志时间升序,且相邻日志首尾相接
        for pair in logs.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
            assert_eq!(pair[0].to_status, pair[1].from_status);
        }

        // 末条日志的目标状态 == 项目当前状态
        let detail = api.get_project_detail(&project.project_id).unwrap();
        assert_eq!(logs.last().unwrap().to_status, detail.project.status);
        assert_eq!(detail.project.revision, chain.len() as i32);
    }

    #[test]
    fn test_same_second_transitions_keep_commit_order() {
        let (_temp_file, _db_path, api, _log_repo, _config) = setup_test_env();

        let project = api.create_project("快速流转课题", &members(&["s001"])).unwrap();

        // 连续提交,全部落在同一秒的时间戳内也必须保持提交顺序
        let chain = [
            "TOPIC_SELECTION",
            "CHAPTER_1_DRAFT",
            "CHAPTER_1_REVIEW",
            "REVISION_REQUIRED",
            "CHAPTER_1_DRAFT",
        ];
        for status in &chain {
            api.transition_status(&project.project_id, status, "t001", None)
                .unwrap();
        }

        let logs = api.get_project_logs(&project.project_id).unwrap();
        assert_eq!(logs.len(), chain.len());

        // 相邻日志首尾相接,与目标状态序列逐条一致
        for (entry, expected) in logs.iter().zip(chain.iter()) {
            assert_eq!(entry.to_status.to_db_str(), *expected);
        }
        for pair in logs.windows(2) {
            assert_eq!(pair[0].to_status, pair[1].from_status);
        }

        // 末条日志的目标状态 == 项目当前状态
        let detail = api.get_project_detail(&project.project_id).unwrap();
        assert_eq!(logs.last().unwrap().to_status, detail.project.status);
    }

    // ==========================================
    // 测试3: 非法输入
    // ==========================================

    #[test]
    fn test_unknown_status_rejected() {
        let (_temp_file, _db_path, api, log_repo, _config) = setup_test_env();

        let project = api.create_project("测试课题", &members(&["s001"])).unwrap();

        let result = api.transition_status(&project.project_id, "CHAPTER_9_DRAFT", "t001", None);
        assert!(matches!(result, Err(ApiError::UnknownStatus(_))));

        // 拒绝的转换不落日志
        assert_eq!(log_repo.count_by_project(&project.project_id).unwrap(), 0);

        let detail = api.get_project_detail(&project.project_id).unwrap();
        assert_eq!(detail.project.status, ProjectStatus::Proposed);
    }

    #[test]
    fn test_transition_project_not_found() {
        let (_temp_file, _db_path, api, _log_repo, _config) = setup_test_env();

        let result = api.transition_status("no-such-project", "TOPIC_SELECTION", "t001", None);
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        let result = api.get_project_logs("no-such-project");
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    // ==========================================
    // 测试4: 转换策略
    // ==========================================

    #[test]
    fn test_permissive_policy_allows_any_jump() {
        let (_temp_file, _db_path, api, _log_repo, _config) = setup_test_env();

        let project = api.create_project("测试课题", &members(&["s001"])).unwrap();

        // 默认 PERMISSIVE: 直接跳到归档也允许
        let outcome = api
            .transition_status(&project.project_id, "ARCHIVED", "admin", None)
            .unwrap();
        assert_eq!(outcome.project.status, ProjectStatus::Archived);
        assert_eq!(
            api.get_project_progress(&project.project_id).unwrap(),
            100
        );
    }

    #[test]
    fn test_strict_policy_blocks_skip_but_allows_regression() {
        let (_temp_file, _db_path, api, _log_repo, config) = setup_test_env();

        config
            .set_config("workflow/transition_policy", "STRICT")
            .unwrap();

        let project = api.create_project("测试课题", &members(&["s001"])).unwrap();

        // 跳级被拒
        let result = api.transition_status(&project.project_id, "CHAPTER_1_DRAFT", "t001", None);
        assert!(matches!(result, Err(ApiError::InvalidStateTransition { .. })));

        // 顺序推进允许
        api.transition_status(&project.project_id, "TOPIC_SELECTION", "t001", None)
            .unwrap();

        // 回退状态可从任意状态进入
        api.transition_status(
            &project.project_id,
            "REVISION_REQUIRED",
            "t001",
            Some("选题方向需调整".to_string()),
        )
        .unwrap();

        // 从回退状态可跳回任意状态
        let outcome = api
            .transition_status(&project.project_id, "CHAPTER_2_DRAFT", "t001", None)
            .unwrap();
        assert_eq!(outcome.project.status, ProjectStatus::Chapter2Draft);
    }

    // ==========================================
    // 测试5: 进度派生
    // ==========================================

    #[test]
    fn test_progress_follows_catalog() {
        let (_temp_file, _db_path, api, _log_repo, _config) = setup_test_env();

        let project = api.create_project("测试课题", &members(&["s001"])).unwrap();
        assert_eq!(api.get_project_progress(&project.project_id).unwrap(), 5);

        api.transition_status(&project.project_id, "ADVISER_REVIEW", "t001", None)
            .unwrap();
        assert_eq!(api.get_project_progress(&project.project_id).unwrap(), 40);

        // 回退状态: 进度回落而非单调
        api.transition_status(&project.project_id, "REVISION_REQUIRED", "t001", None)
            .unwrap();
        assert_eq!(api.get_project_progress(&project.project_id).unwrap(), 35);

        let detail = api.get_project_detail(&project.project_id).unwrap();
        assert_eq!(detail.status_variant, "destructive");
    }
}
