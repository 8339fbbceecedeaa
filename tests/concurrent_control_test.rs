// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证系统的并发控制机制
// ==========================================


#[cfg(test)]
mod concurrent_control_test {
    use capstone_tracker::api::NotificationApi;
    use capstone_tracker::config::ConfigManager;
    use capstone_tracker::domain::project::Project;
    use capstone_tracker::domain::types::{NotificationType, ProjectStatus};
    use capstone_tracker::domain::workflow_log::WorkflowLogEntry;
    use capstone_tracker::engine::{OptionalEventPublisher, WorkflowEngine};
    use capstone_tracker::repository::{
        NotificationRepository, ProjectRepository, RepositoryError, WorkflowLogRepository,
    };
    use std::sync::{Arc, Mutex};
    use std::thread;
    use tempfile::NamedTempFile;

    use crate::test_helpers::{create_test_db, open_test_conn};

    // ==========================================
    // 测试辅助函数
    // ==========================================

    /// 创建测试环境
    fn setup_test_env() -> (
        NamedTempFile,
        String,
        Arc<ProjectRepository>,
        Arc<WorkflowLogRepository>,
        Arc<WorkflowEngine>,
    ) {
        let (temp_file, db_path) = create_test_db().unwrap();

        let conn = Arc::new(Mutex::new(open_test_conn(&db_path).unwrap()));
        let project_repo = Arc::new(ProjectRepository::new(conn.clone()));
        let log_repo = Arc::new(WorkflowLogRepository::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::new(&db_path).unwrap());

        let engine = Arc::new(WorkflowEngine::new(
            project_repo.clone(),
            log_repo.clone(),
            config_manager,
            OptionalEventPublisher::none(), // 测试环境不需要事件发布
        ));

        (temp_file, db_path, project_repo, log_repo, engine)
    }

    fn seed_project(project_repo: &ProjectRepository) -> Project {
        let project = Project::new(
            uuid::Uuid::new_v4().to_string(),
            "并发测试课题".to_string(),
        );
        project_repo
            .create(&project, &["s001".to_string()])
            .unwrap();
        project
    }

    // ==========================================
    // 测试1: 乐观锁冲突 (确定性双快照)
    // ==========================================

    #[test]
    fn test_optimistic_lock_conflict() {
        let (_temp_file, _db_path, project_repo, log_repo, _engine) = setup_test_env();

        let project = seed_project(&project_repo);

        // 两个调用方各持有 revision=0 的快照
        let snapshot_a = project_repo.find_by_id(&project.project_id).unwrap().unwrap();
        let snapshot_b = project_repo.find_by_id(&project.project_id).unwrap().unwrap();
        assert_eq!(snapshot_a.revision, 0);
        assert_eq!(snapshot_b.revision, 0);

        // 第一次提交成功, revision -> 1
        let log_a = WorkflowLogEntry::new(
            project.project_id.clone(),
            snapshot_a.status,
            ProjectStatus::TopicSelection,
            "t001".to_string(),
            None,
        );
        let updated = project_repo
            .commit_transition(&snapshot_a, ProjectStatus::TopicSelection, &log_a)
            .unwrap();
        assert_eq!(updated.revision, 1);

        // 第二次使用过期快照提交, 必须失败
        let log_b = WorkflowLogEntry::new(
            project.project_id.clone(),
            snapshot_b.status,
            ProjectStatus::AdviserReview,
            "t002".to_string(),
            None,
        );
        let result =
            project_repo.commit_transition(&snapshot_b, ProjectStatus::AdviserReview, &log_b);
        match result {
            Err(RepositoryError::OptimisticLockFailure {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("预期乐观锁冲突, 实际: {:?}", other),
        }

        // 失败的提交不落日志
        assert_eq!(log_repo.count_by_project(&project.project_id).unwrap(), 1);

        // 冲突后重读重试成功
        let fresh = project_repo.find_by_id(&project.project_id).unwrap().unwrap();
        assert_eq!(fresh.revision, 1);
        let log_retry = WorkflowLogEntry::new(
            project.project_id.clone(),
            fresh.status,
            ProjectStatus::AdviserReview,
            "t002".to_string(),
            None,
        );
        let updated = project_repo
            .commit_transition(&fresh, ProjectStatus::AdviserReview, &log_retry)
            .unwrap();
        assert_eq!(updated.revision, 2);
    }

    // ==========================================
    // 测试2: 多线程并发转换
    // ==========================================

    #[test]
    fn test_concurrent_transitions_invariants() {
        let (_temp_file, _db_path, project_repo, log_repo, engine) = setup_test_env();

        let project = seed_project(&project_repo);
        let thread_count = 8;

        let mut handles = Vec::new();
        for i in 0..thread_count {
            let engine = engine.clone();
            let project_id = project.project_id.clone();
            handles.push(thread::spawn(move || {
                // 各线程交替提交两个目标状态
                let target = if i % 2 == 0 {
                    ProjectStatus::TopicSelection
                } else {
                    ProjectStatus::AdviserReview
                };
                engine.transition(&project_id, target, &format!("user{}", i), None)
            }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(_) => successes += 1,
                Err(RepositoryError::OptimisticLockFailure { .. }) => conflicts += 1,
                Err(e) => panic!("预期成功或乐观锁冲突, 实际: {:?}", e),
            }
        }

        // 所有提交要么成功要么冲突, 不允许第三种结局
        assert_eq!(successes + conflicts, thread_count);
        assert!(successes >= 1);

        // revision 与日志条数都等于成功次数
        let final_project = project_repo.find_by_id(&project.project_id).unwrap().unwrap();
        assert_eq!(final_project.revision, successes as i32);
        assert_eq!(
            log_repo.count_by_project(&project.project_id).unwrap(),
            successes as i64
        );

        // 末条日志与当前状态一致
        let logs = log_repo.find_by_project(&project.project_id).unwrap();
        assert_eq!(logs.last().unwrap().to_status, final_project.status);
    }

    // ==========================================
    // 测试3: 未读计数并发一致性
    // ==========================================

    #[test]
    fn test_concurrent_mark_read_counter_consistency() {
        let (temp_file, db_path, _project_repo, _log_repo, _engine) = setup_test_env();
        let _keep_alive = temp_file;

        let conn = Arc::new(Mutex::new(open_test_conn(&db_path).unwrap()));
        let notification_repo = Arc::new(NotificationRepository::new(conn));
        let config_manager = Arc::new(ConfigManager::new(&db_path).unwrap());
        let api = Arc::new(NotificationApi::new(notification_repo, config_manager));

        // 先写入 10 条未读
        for i in 0..10 {
            api.notify(
                NotificationType::StatusChanged,
                &["u1".to_string()],
                &format!("并发测试{}", i),
                "测试消息",
                None,
            )
            .unwrap();
        }
        assert_eq!(api.unread_count("u1").unwrap(), 10);

        // 每个线程标记一条不同的通知已读
        let ids: Vec<String> = api
            .list("u1", 1, Some(100), false)
            .unwrap()
            .items
            .iter()
            .map(|n| n.notification_id.clone())
            .collect();
        assert_eq!(ids.len(), 10);

        let mut handles = Vec::new();
        for id in ids {
            let api = api.clone();
            handles.push(thread::spawn(move || api.mark_read(&id, "u1").unwrap()));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // 计数器与明细重算结果一致, 且都为 0
        assert_eq!(api.unread_count("u1").unwrap(), 0);
        assert_eq!(api.recount_unread("u1").unwrap(), 0);
    }
}
