// ==========================================
// 毕业设计项目管理系统 - 领域类型定义
// ==========================================
// 职责: 定义项目状态、通知类型等封闭枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 项目状态 (Project Status)
// ==========================================
// 覆盖从课题提交到归档的全流程
// REVISION_REQUIRED / PROJECT_RESET 为回退状态,
// 可从多数前进状态到达,进度百分比刻意低于其前驱
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Proposed,              // 课题已提交
    TopicSelection,        // 选题确认中
    #[serde(rename = "CHAPTER_1_DRAFT")]
    Chapter1Draft,         // 第一章撰写中
    #[serde(rename = "CHAPTER_1_REVIEW")]
    Chapter1Review,        // 第一章评审中
    #[serde(rename = "CHAPTER_1_APPROVED")]
    Chapter1Approved,      // 第一章已通过
    #[serde(rename = "CHAPTER_2_DRAFT")]
    Chapter2Draft,         // 第二章撰写中
    #[serde(rename = "CHAPTER_2_REVIEW")]
    Chapter2Review,        // 第二章评审中
    #[serde(rename = "CHAPTER_2_APPROVED")]
    Chapter2Approved,      // 第二章已通过
    #[serde(rename = "CHAPTER_3_DRAFT")]
    Chapter3Draft,         // 第三章撰写中
    #[serde(rename = "CHAPTER_3_REVIEW")]
    Chapter3Review,        // 第三章评审中
    #[serde(rename = "CHAPTER_3_APPROVED")]
    Chapter3Approved,      // 第三章已通过
    ProposalConsolidation, // 开题报告整合中
    AdviserReview,         // 指导教师评审中
    RevisionRequired,      // 需要修改 (回退状态)
    ProposalDefense,       // 开题答辩中
    ProposalDefended,      // 开题答辩通过
    ApprovedForDefense,    // 批准继续推进
    Capstone2InProgress,   // 毕设二进行中
    Capstone2Review,       // 毕设二评审中
    Capstone2Approved,     // 毕设二已通过
    Capstone3InProgress,   // 毕设三进行中
    Capstone3Review,       // 毕设三评审中
    Capstone3Approved,     // 毕设三已通过
    FinalCompilation,      // 终稿整合中
    PlagiarismCheck,       // 查重检测中
    FinalDefense,          // 最终答辩中
    FinalApproved,         // 最终成果已通过
    FinalSubmitted,        // 终稿已提交
    CredentialUpload,      // 归档材料上传中
    Archived,              // 已归档
    ProjectReset,          // 项目已重置 (回退状态)
}

impl ProjectStatus {
    /// 全部状态,按名义流程顺序排列
    pub const ALL: [ProjectStatus; 31] = [
        ProjectStatus::Proposed,
        ProjectStatus::TopicSelection,
        ProjectStatus::Chapter1Draft,
        ProjectStatus::Chapter1Review,
        ProjectStatus::Chapter1Approved,
        ProjectStatus::Chapter2Draft,
        ProjectStatus::Chapter2Review,
        ProjectStatus::Chapter2Approved,
        ProjectStatus::Chapter3Draft,
        ProjectStatus::Chapter3Review,
        ProjectStatus::Chapter3Approved,
        ProjectStatus::ProposalConsolidation,
        ProjectStatus::AdviserReview,
        ProjectStatus::RevisionRequired,
        ProjectStatus::ProposalDefense,
        ProjectStatus::ProposalDefended,
        ProjectStatus::ApprovedForDefense,
        ProjectStatus::Capstone2InProgress,
        ProjectStatus::Capstone2Review,
        ProjectStatus::Capstone2Approved,
        ProjectStatus::Capstone3InProgress,
        ProjectStatus::Capstone3Review,
        ProjectStatus::Capstone3Approved,
        ProjectStatus::FinalCompilation,
        ProjectStatus::PlagiarismCheck,
        ProjectStatus::FinalDefense,
        ProjectStatus::FinalApproved,
        ProjectStatus::FinalSubmitted,
        ProjectStatus::CredentialUpload,
        ProjectStatus::Archived,
        ProjectStatus::ProjectReset,
    ];

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProjectStatus::Proposed => "PROPOSED",
            ProjectStatus::TopicSelection => "TOPIC_SELECTION",
            ProjectStatus::Chapter1Draft => "CHAPTER_1_DRAFT",
            ProjectStatus::Chapter1Review => "CHAPTER_1_REVIEW",
            ProjectStatus::Chapter1Approved => "CHAPTER_1_APPROVED",
            ProjectStatus::Chapter2Draft => "CHAPTER_2_DRAFT",
            ProjectStatus::Chapter2Review => "CHAPTER_2_REVIEW",
            ProjectStatus::Chapter2Approved => "CHAPTER_2_APPROVED",
            ProjectStatus::Chapter3Draft => "CHAPTER_3_DRAFT",
            ProjectStatus::Chapter3Review => "CHAPTER_3_REVIEW",
            ProjectStatus::Chapter3Approved => "CHAPTER_3_APPROVED",
            ProjectStatus::ProposalConsolidation => "PROPOSAL_CONSOLIDATION",
            ProjectStatus::AdviserReview => "ADVISER_REVIEW",
            ProjectStatus::RevisionRequired => "REVISION_REQUIRED",
            ProjectStatus::ProposalDefense => "PROPOSAL_DEFENSE",
            ProjectStatus::ProposalDefended => "PROPOSAL_DEFENDED",
            ProjectStatus::ApprovedForDefense => "APPROVED_FOR_DEFENSE",
            ProjectStatus::Capstone2InProgress => "CAPSTONE2_IN_PROGRESS",
            ProjectStatus::Capstone2Review => "CAPSTONE2_REVIEW",
            ProjectStatus::Capstone2Approved => "CAPSTONE2_APPROVED",
            ProjectStatus::Capstone3InProgress => "CAPSTONE3_IN_PROGRESS",
            ProjectStatus::Capstone3Review => "CAPSTONE3_REVIEW",
            ProjectStatus::Capstone3Approved => "CAPSTONE3_APPROVED",
            ProjectStatus::FinalCompilation => "FINAL_COMPILATION",
            ProjectStatus::PlagiarismCheck => "PLAGIARISM_CHECK",
            ProjectStatus::FinalDefense => "FINAL_DEFENSE",
            ProjectStatus::FinalApproved => "FINAL_APPROVED",
            ProjectStatus::FinalSubmitted => "FINAL_SUBMITTED",
            ProjectStatus::CredentialUpload => "CREDENTIAL_UPLOAD",
            ProjectStatus::Archived => "ARCHIVED",
            ProjectStatus::ProjectReset => "PROJECT_RESET",
        }
    }

    /// 从字符串解析状态
    ///
    /// # 返回
    /// - Some(status): 合法状态
    /// - None: 不在封闭枚举内
    pub fn from_str(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        ProjectStatus::ALL
            .iter()
            .find(|st| st.to_db_str() == upper)
            .copied()
    }

    /// 是否为回退状态
    pub fn is_regression(&self) -> bool {
        matches!(
            self,
            ProjectStatus::RevisionRequired | ProjectStatus::ProjectReset
        )
    }

    /// 名义流程序号 (回退状态无序号)
    ///
    /// 用于 STRICT 转换策略判断"相邻前进一步"
    pub fn nominal_ordinal(&self) -> Option<usize> {
        if self.is_regression() {
            return None;
        }
        ProjectStatus::ALL
            .iter()
            .filter(|st| !st.is_regression())
            .position(|st| st == self)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 状态展示分类 (Status Variant)
// ==========================================
// 仅作为前端展示提示,本核心不消费
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusVariant {
    Default,     // 已通过/里程碑
    Secondary,   // 进行中
    Destructive, // 回退
    Outline,     // 评审/答辩/检测中
}

impl StatusVariant {
    /// 转换为前端约定的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusVariant::Default => "default",
            StatusVariant::Secondary => "secondary",
            StatusVariant::Destructive => "destructive",
            StatusVariant::Outline => "outline",
        }
    }
}

impl fmt::Display for StatusVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 通知类型 (Notification Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    ProposalSubmitted, // 课题提交
    RevisionRequested, // 要求修改
    ProposalApproved,  // 课题/成果通过
    StatusChanged,     // 状态变更
    CommentAdded,      // 新增评语
    DocumentUploaded,  // 文档上传
    DeadlineReminder,  // 截止提醒
    AdviserAssigned,   // 指导教师分配
    ProjectArchived,   // 项目归档
    DefenseScheduled,  // 答辩安排
}

impl NotificationType {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            NotificationType::ProposalSubmitted => "PROPOSAL_SUBMITTED",
            NotificationType::RevisionRequested => "REVISION_REQUESTED",
            NotificationType::ProposalApproved => "PROPOSAL_APPROVED",
            NotificationType::StatusChanged => "STATUS_CHANGED",
            NotificationType::CommentAdded => "COMMENT_ADDED",
            NotificationType::DocumentUploaded => "DOCUMENT_UPLOADED",
            NotificationType::DeadlineReminder => "DEADLINE_REMINDER",
            NotificationType::AdviserAssigned => "ADVISER_ASSIGNED",
            NotificationType::ProjectArchived => "PROJECT_ARCHIVED",
            NotificationType::DefenseScheduled => "DEFENSE_SCHEDULED",
        }
    }

    /// 从字符串解析通知类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PROPOSAL_SUBMITTED" => Some(NotificationType::ProposalSubmitted),
            "REVISION_REQUESTED" => Some(NotificationType::RevisionRequested),
            "PROPOSAL_APPROVED" => Some(NotificationType::ProposalApproved),
            "STATUS_CHANGED" => Some(NotificationType::StatusChanged),
            "COMMENT_ADDED" => Some(NotificationType::CommentAdded),
            "DOCUMENT_UPLOADED" => Some(NotificationType::DocumentUploaded),
            "DEADLINE_REMINDER" => Some(NotificationType::DeadlineReminder),
            "ADVISER_ASSIGNED" => Some(NotificationType::AdviserAssigned),
            "PROJECT_ARCHIVED" => Some(NotificationType::ProjectArchived),
            "DEFENSE_SCHEDULED" => Some(NotificationType::DefenseScheduled),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 状态转换策略 (Transition Policy)
// ==========================================
// 默认 PERMISSIVE: 任意状态可转换到任意目标状态 (含回退)
// STRICT 为可选的更严格策略,通过配置开启
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionPolicy {
    Permissive, // 任意目标状态均合法
    Strict,     // 仅允许名义流程相邻前进 + 回退/回退后重入
}

impl TransitionPolicy {
    /// 从字符串解析 (非法输入回落到默认 PERMISSIVE)
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "STRICT" => TransitionPolicy::Strict,
            _ => TransitionPolicy::Permissive,
        }
    }

    /// 转换为配置存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TransitionPolicy::Permissive => "PERMISSIVE",
            TransitionPolicy::Strict => "STRICT",
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
