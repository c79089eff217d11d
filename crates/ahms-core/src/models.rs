//! 核心数据模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 跟踪任务频率
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskFrequency {
    Once,       // 一次性
    Daily,      // 每日
    TwiceDaily, // 每日两次
    Weekly,     // 每周
    Custom,     // 自定义
}

/// 任务完成状态
///
/// "overdue"不属于该枚举：过期是读取时根据截止时间计算的派生标签，
/// 永远不会写回存储。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Pending,    // 待开始
    InProgress, // 进行中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

/// 任务优先级
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Low,    // 低
    Medium, // 中
    High,   // 高
    Urgent, // 紧急
}

/// 跟踪任务类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    HealthMonitoring,         // 健康监测
    MedicationAdministration, // 用药管理
    WoundCare,                // 伤口护理
    WeightTracking,           // 体重跟踪
    BehaviorObservation,      // 行为观察
}

/// 观察记录中的状况评估
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConditionAssessment {
    Improved, // 好转
    Same,     // 不变
    Worse,    // 恶化
    Resolved, // 痊愈
}

/// 观察记录审核状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,  // 待审核
    Reviewed, // 已审核
    Flagged,  // 已标记
}

/// 任务结案结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Resolved, // 痊愈
    Improved, // 好转
    Ongoing,  // 持续观察
}

/// 告警类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    TaskAssigned,     // 任务分配
    EscalationNeeded, // 需要升级
    TaskCompleted,    // 任务完成
}

/// 健康记录状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HealthRecordStatus {
    Active,         // 活跃
    UnderTreatment, // 治疗中
    Monitoring,     // 观察中
    Resolved,       // 已解决
}

/// 跟踪任务
///
/// 针对某只动物/健康记录分配给学生的限时健康监测任务。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpTask {
    pub id: Uuid,
    pub health_record_id: Uuid,
    pub animal_id: Uuid,
    pub student_id: Uuid,
    pub assigned_by: Option<Uuid>, // 分配任务的教师ID
    pub task_type: TaskType,
    pub task_title: String,
    pub description: Option<String>,
    pub created_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub frequency: TaskFrequency,
    pub duration_days: u32,
    pub completion_status: CompletionStatus,
    pub progress_percentage: f64, // [0, 100]
    pub priority_level: PriorityLevel,
    pub escalation_triggered: bool, // 一旦为true永不重置
    pub escalation_date: Option<DateTime<Utc>>,
    pub competency_standards: Vec<String>,
    pub learning_objectives: Vec<String>,
    pub completed_date: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,
    pub outcome_status: Option<OutcomeStatus>,
}

impl FollowUpTask {
    /// 任务是否处于活跃状态（待开始或进行中）
    pub fn is_active(&self) -> bool {
        matches!(
            self.completion_status,
            CompletionStatus::Pending | CompletionStatus::InProgress
        )
    }

    /// 任务是否过期
    ///
    /// 派生标签：只在读取时根据截止时间计算，永不持久化。
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && now > self.due_date
    }
}

/// 观察记录
///
/// 学生针对跟踪任务提交的观察，追加后不可变更。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpUpdate {
    pub id: Uuid,
    pub follow_up_task_id: Uuid,
    pub student_id: Uuid,
    pub update_date: DateTime<Utc>,
    pub observations: String,
    pub student_notes: Option<String>,
    pub measurements: HashMap<String, f64>, // 指标名 -> 数值
    pub photos: Vec<String>,                // 照片存储路径
    pub condition_assessment: ConditionAssessment,
    pub concern_level: u8,    // [1, 5]
    pub confidence_level: u8, // [1, 5]
    pub update_completeness_score: f64, // [0, 1]，由引擎派生
    pub review_status: ReviewStatus,
}

/// 健康告警
///
/// 面向学生或教师的通知记录，具有确认/解决生命周期。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthAlert {
    pub id: Uuid,
    pub alert_type: AlertType,
    pub priority_level: PriorityLevel,
    pub title: String,
    pub message: String,
    pub student_id: Option<Uuid>,
    pub educator_id: Option<Uuid>,
    pub follow_up_task_id: Option<Uuid>,
    pub push_notification_sent: bool, // 推送通知决策标志，发送机制不在本系统内
    pub created_date: DateTime<Utc>,  // 创建后不可变更
    pub acknowledged_date: Option<DateTime<Utc>>, // 仅可设置一次
    pub resolved_date: Option<DateTime<Utc>>,     // 仅可设置一次
    pub action_taken: Option<String>,
    pub action_description: Option<String>,
}

impl HealthAlert {
    /// 告警是否尚未解决
    pub fn is_unresolved(&self) -> bool {
        self.resolved_date.is_none()
    }
}

/// 健康记录（只读引用，归外部健康档案模块所有）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub student_id: Uuid,
    pub condition: String,
    pub status: HealthRecordStatus,
    pub recorded_date: DateTime<Utc>,
}

/// 动物信息（只读引用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub id: Uuid,
    pub name: String,
    pub species: String,
    pub tag_number: Option<String>, // 耳标号
    pub student_id: Uuid,
    pub chapter_id: String,
}

/// 日志条目（只读引用，用于能力标准评分）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub student_id: Uuid,
    pub entry_date: DateTime<Utc>,
    pub categories: Vec<String>, // 涉及的能力标准标签
    pub reflection_notes: Option<String>,
}

/// 教师监管档案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducatorProfile {
    pub id: Uuid,
    pub name: String,
    pub chapter_id: String,
    pub students_supervised: Vec<Uuid>,
}

/// 学生档案（只读引用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: Uuid,
    pub name: String,
    pub chapter_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_task(status: CompletionStatus, due_in_days: i64) -> FollowUpTask {
        let now = Utc::now();
        FollowUpTask {
            id: Uuid::new_v4(),
            health_record_id: Uuid::new_v4(),
            animal_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            assigned_by: None,
            task_type: TaskType::HealthMonitoring,
            task_title: "Health Monitoring Task".to_string(),
            description: None,
            created_date: now,
            due_date: now + Duration::days(due_in_days),
            frequency: TaskFrequency::Daily,
            duration_days: 5,
            completion_status: status,
            progress_percentage: 0.0,
            priority_level: PriorityLevel::Medium,
            escalation_triggered: false,
            escalation_date: None,
            competency_standards: Vec::new(),
            learning_objectives: Vec::new(),
            completed_date: None,
            resolution_notes: None,
            outcome_status: None,
        }
    }

    #[test]
    fn test_overdue_is_derived_from_due_date() {
        let now = Utc::now();

        // 活跃且已过截止时间 -> 过期
        let task = sample_task(CompletionStatus::Pending, -1);
        assert!(task.is_overdue(now));

        // 未到截止时间 -> 不过期
        let task = sample_task(CompletionStatus::InProgress, 3);
        assert!(!task.is_overdue(now));

        // 已完成的任务永不过期
        let task = sample_task(CompletionStatus::Completed, -10);
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn test_status_serializes_as_snake_case() {
        let json = serde_json::to_string(&CompletionStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let json = serde_json::to_string(&TaskFrequency::TwiceDaily).unwrap();
        assert_eq!(json, "\"twice_daily\"");

        let json = serde_json::to_string(&AlertType::EscalationNeeded).unwrap();
        assert_eq!(json, "\"escalation_needed\"");
    }
}
