// ==========================================
// 毕业设计项目管理系统 - 状态目录
// ==========================================
// 职责: 状态 -> {展示标签, 展示分类, 进度百分比} 的静态查表
// 红线: 进程级常量配置,不是可变状态;
//       禁止在调用点散落魔法字符串匹配
// 说明: 进度沿名义流程单调递增;
//       REVISION_REQUIRED / PROJECT_RESET 两个回退状态
//       的进度刻意低于其前驱,属于有意设计而非缺陷
// ==========================================

use crate::domain::types::{ProjectStatus, StatusVariant};
use serde::Serialize;
use thiserror::Error;

// ==========================================
// StatusInfo - 单条目录项
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub status: ProjectStatus,    // 状态键
    pub label: &'static str,      // 展示标签
    pub variant: StatusVariant,   // 展示分类 (仅供前端)
    pub progress_percent: i32,    // 完成进度 [0,100]
}

/// 状态目录查询错误
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("未知的项目状态: {0}")]
    UnknownStatus(String),
}

// ==========================================
// StatusCatalog - 状态目录
// ==========================================
pub struct StatusCatalog;

impl StatusCatalog {
    /// 按枚举值查表（封闭枚举内必定命中，不会失败）
    pub fn entry(status: ProjectStatus) -> StatusInfo {
        use ProjectStatus::*;
        use StatusVariant as V;

        let (label, variant, progress_percent) = match status {
            Proposed => ("课题已提交", V::Secondary, 5),
            TopicSelection => ("选题确认中", V::Secondary, 8),
            Chapter1Draft => ("第一章撰写中", V::Secondary, 12),
            Chapter1Review => ("第一章评审中", V::Outline, 15),
            Chapter1Approved => ("第一章已通过", V::Default, 18),
            Chapter2Draft => ("第二章撰写中", V::Secondary, 21),
            Chapter2Review => ("第二章评审中", V::Outline, 24),
            Chapter2Approved => ("第二章已通过", V::Default, 27),
            Chapter3Draft => ("第三章撰写中", V::Secondary, 30),
            Chapter3Review => ("第三章评审中", V::Outline, 33),
            Chapter3Approved => ("第三章已通过", V::Default, 36),
            ProposalConsolidation => ("开题报告整合中", V::Secondary, 38),
            AdviserReview => ("指导教师评审中", V::Outline, 40),
            RevisionRequired => ("需要修改", V::Destructive, 35),
            ProposalDefense => ("开题答辩中", V::Outline, 45),
            ProposalDefended => ("开题答辩通过", V::Default, 50),
            ApprovedForDefense => ("批准继续推进", V::Default, 55),
            Capstone2InProgress => ("毕设二进行中", V::Secondary, 60),
            Capstone2Review => ("毕设二评审中", V::Outline, 63),
            Capstone2Approved => ("毕设二已通过", V::Default, 66),
            Capstone3InProgress => ("毕设三进行中", V::Secondary, 70),
            Capstone3Review => ("毕设三评审中", V::Outline, 73),
            Capstone3Approved => ("毕设三已通过", V::Default, 76),
            FinalCompilation => ("终稿整合中", V::Secondary, 80),
            PlagiarismCheck => ("查重检测中", V::Outline, 84),
            FinalDefense => ("最终答辩中", V::Outline, 88),
            FinalApproved => ("最终成果已通过", V::Default, 92),
            FinalSubmitted => ("终稿已提交", V::Default, 95),
            CredentialUpload => ("归档材料上传中", V::Secondary, 98),
            Archived => ("已归档", V::Secondary, 100),
            ProjectReset => ("项目已重置", V::Destructive, 0),
        };

        StatusInfo {
            status,
            label,
            variant,
            progress_percent,
        }
    }

    /// 按字符串查表
    ///
    /// # 错误
    /// - `CatalogError::UnknownStatus`: 不在封闭枚举内,不做静默兜底
    pub fn lookup(status_str: &str) -> Result<StatusInfo, CatalogError> {
        ProjectStatus::from_str(status_str)
            .map(Self::entry)
            .ok_or_else(|| CatalogError::UnknownStatus(status_str.to_string()))
    }

    /// 读取进度百分比（未知输入返回 0,不失败）
    pub fn progress_of(status_str: &str) -> i32 {
        Self::lookup(status_str)
            .map(|info| info.progress_percent)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_in_range() {
        for status in ProjectStatus::ALL {
            let info = StatusCatalog::entry(status);
            assert!(
                (0..=100).contains(&info.progress_percent),
                "{} 进度越界: {}",
                status,
                info.progress_percent
            );
            assert!(!info.label.is_empty());
        }
    }

    #[test]
    fn test_lookup_unknown_status() {
        let result = StatusCatalog::lookup("NOT_A_STATUS");
        assert!(matches!(result, Err(CatalogError::UnknownStatus(_))));
    }

    #[test]
    fn test_lookup_known_status() {
        let info = StatusCatalog::lookup("ADVISER_REVIEW").unwrap();
        assert_eq!(info.status, ProjectStatus::AdviserReview);
        assert_eq!(info.label, "指导教师评审中");
        assert_eq!(info.progress_percent, 40);
    }

    #[test]
    fn test_progress_monotone_along_nominal_chain() {
        // 非回退状态按名义顺序进度严格递增
        let mut prev = -1;
        for status in ProjectStatus::ALL.iter().filter(|s| !s.is_regression()) {
            let progress = StatusCatalog::entry(*status).progress_percent;
            assert!(
                progress > prev,
                "{} 进度 {} 未递增 (前值 {})",
                status,
                progress,
                prev
            );
            prev = progress;
        }
        assert_eq!(prev, 100);
    }

    #[test]
    fn test_regression_statuses_lower_progress() {
        // 回退状态进度低于可到达它们的前进状态
        let revision = StatusCatalog::entry(ProjectStatus::RevisionRequired).progress_percent;
        let adviser = StatusCatalog::entry(ProjectStatus::AdviserReview).progress_percent;
        assert!(revision < adviser);

        let reset = StatusCatalog::entry(ProjectStatus::ProjectReset).progress_percent;
        assert_eq!(reset, 0);
    }

    #[test]
    fn test_progress_of_unknown_fallback() {
        assert_eq!(StatusCatalog::progress_of("GHOST_STATUS"), 0);
        assert_eq!(StatusCatalog::progress_of("ARCHIVED"), 100);
    }
}
