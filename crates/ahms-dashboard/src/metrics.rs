//! 绩效指标计算
//!
//! 看板使用的确定性公式：响应率、及时完成率、参与度、
//! 告警汇总和能力标准进度

use ahms_core::{CompletionStatus, FollowUpTask, FollowUpUpdate, HealthAlert, JournalEntry, PriorityLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 日志反思笔记计入能力完成的最小长度
const REFLECTION_COMPLETION_CHARS: usize = 50;

/// 告警汇总（按优先级计数）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total: usize,
    pub unacknowledged: usize,
    pub unresolved: usize,
    pub by_priority: HashMap<PriorityLevel, usize>,
}

/// 单项能力标准的进度
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetencyProgress {
    pub attempted: u32,
    pub completed: u32,
    pub progress_percentage: f64,
}

/// 任务是否按时完成（结案时间不晚于截止时间）
fn is_on_time_completion(task: &FollowUpTask) -> bool {
    task.completion_status == CompletionStatus::Completed
        && task
            .completed_date
            .map(|completed| completed <= task.due_date)
            .unwrap_or(false)
}

/// 响应率: 按时完成数 / 任务总数
///
/// 零任务时显式定义为1.0。
pub fn calculate_response_rate(tasks: &[FollowUpTask]) -> f64 {
    if tasks.is_empty() {
        return 1.0;
    }
    let on_time = tasks.iter().filter(|t| is_on_time_completion(t)).count();
    on_time as f64 / tasks.len() as f64
}

/// 及时完成率: 按时完成数 / 已完成数，无已完成任务时为1.0
pub fn calculate_timely_completion_rate(tasks: &[FollowUpTask]) -> f64 {
    let completed = tasks
        .iter()
        .filter(|t| t.completion_status == CompletionStatus::Completed)
        .count();
    if completed == 0 {
        return 1.0;
    }
    let on_time = tasks.iter().filter(|t| is_on_time_completion(t)).count();
    on_time as f64 / completed as f64
}

/// 观察记录平均完整度，无记录时采用与零任务响应率相同的默认值1.0
pub fn average_update_quality(updates: &[FollowUpUpdate]) -> f64 {
    if updates.is_empty() {
        return 1.0;
    }
    let sum: f64 = updates.iter().map(|u| u.update_completeness_score).sum();
    sum / updates.len() as f64
}

/// 参与度评分: 100 × (0.5 × 响应率 + 0.5 × 平均记录完整度)
pub fn calculate_engagement_score(response_rate: f64, avg_update_quality: f64) -> f64 {
    100.0 * (0.5 * response_rate + 0.5 * avg_update_quality)
}

/// 按优先级汇总告警
pub fn count_alerts(alerts: &[HealthAlert]) -> AlertSummary {
    let mut summary = AlertSummary {
        total: alerts.len(),
        ..Default::default()
    };

    for alert in alerts {
        if alert.acknowledged_date.is_none() {
            summary.unacknowledged += 1;
        }
        if alert.is_unresolved() {
            summary.unresolved += 1;
        }
        *summary.by_priority.entry(alert.priority_level).or_insert(0) += 1;
    }

    summary
}

/// 能力标准进度
///
/// 能力标签出现在日志条目的类别或任务的能力标准中即计一次尝试；
/// 日志反思笔记超过50字符、或所属任务已完成时计一次完成。
/// progress% = completed / attempted × 100，无尝试时为0。
pub fn calculate_competency_progress(
    journal_entries: &[JournalEntry],
    tasks: &[FollowUpTask],
) -> HashMap<String, CompetencyProgress> {
    let mut progress: HashMap<String, CompetencyProgress> = HashMap::new();

    for entry in journal_entries {
        let reflective = entry
            .reflection_notes
            .as_ref()
            .map(|notes| notes.chars().count() > REFLECTION_COMPLETION_CHARS)
            .unwrap_or(false);
        for category in &entry.categories {
            let item = progress.entry(category.clone()).or_default();
            item.attempted += 1;
            if reflective {
                item.completed += 1;
            }
        }
    }

    for task in tasks {
        let completed = task.completion_status == CompletionStatus::Completed;
        for standard in &task.competency_standards {
            let item = progress.entry(standard.clone()).or_default();
            item.attempted += 1;
            if completed {
                item.completed += 1;
            }
        }
    }

    for item in progress.values_mut() {
        item.progress_percentage = if item.attempted == 0 {
            0.0
        } else {
            item.completed as f64 / item.attempted as f64 * 100.0
        };
    }

    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahms_core::{PriorityLevel, TaskFrequency, TaskType};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn completed_task(on_time: bool, standards: Vec<String>) -> FollowUpTask {
        let now = Utc::now();
        let mut task = pending_task(standards);
        task.completion_status = CompletionStatus::Completed;
        task.due_date = now;
        task.completed_date = Some(if on_time {
            now - Duration::hours(2)
        } else {
            now + Duration::days(1)
        });
        task
    }

    fn pending_task(standards: Vec<String>) -> FollowUpTask {
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
            due_date: now + Duration::days(5),
            frequency: TaskFrequency::Daily,
            duration_days: 5,
            completion_status: CompletionStatus::Pending,
            progress_percentage: 0.0,
            priority_level: PriorityLevel::Medium,
            escalation_triggered: false,
            escalation_date: None,
            competency_standards: standards,
            learning_objectives: Vec::new(),
            completed_date: None,
            resolution_notes: None,
            outcome_status: None,
        }
    }

    fn alert(priority: PriorityLevel, resolved: bool) -> HealthAlert {
        HealthAlert {
            id: Uuid::new_v4(),
            alert_type: ahms_core::AlertType::EscalationNeeded,
            priority_level: priority,
            title: "alert".to_string(),
            message: "alert".to_string(),
            student_id: None,
            educator_id: None,
            follow_up_task_id: None,
            push_notification_sent: false,
            created_date: Utc::now(),
            acknowledged_date: None,
            resolved_date: resolved.then(Utc::now),
            action_taken: None,
            action_description: None,
        }
    }

    #[test]
    fn test_response_rate_for_zero_tasks_is_one() {
        // 零任务时显式默认1.0
        assert_eq!(calculate_response_rate(&[]), 1.0);
    }

    #[test]
    fn test_response_rate_counts_on_time_completions() {
        let tasks = vec![
            completed_task(true, Vec::new()),
            completed_task(false, Vec::new()),
            pending_task(Vec::new()),
            pending_task(Vec::new()),
        ];
        assert_eq!(calculate_response_rate(&tasks), 0.25);
    }

    #[test]
    fn test_timely_completion_rate_over_completed_only() {
        let tasks = vec![
            completed_task(true, Vec::new()),
            completed_task(false, Vec::new()),
            pending_task(Vec::new()),
        ];
        assert_eq!(calculate_timely_completion_rate(&tasks), 0.5);
        assert_eq!(calculate_timely_completion_rate(&[pending_task(Vec::new())]), 1.0);
    }

    #[test]
    fn test_competency_progress_follows_task_completion() {
        // 单个未完成任务 -> 0%
        let tasks = vec![pending_task(vec!["AS.01".to_string()])];
        let progress = calculate_competency_progress(&[], &tasks);
        assert_eq!(progress["AS.01"].attempted, 1);
        assert_eq!(progress["AS.01"].progress_percentage, 0.0);

        // 已完成任务 -> 100%
        let tasks = vec![completed_task(true, vec!["AS.01".to_string()])];
        let progress = calculate_competency_progress(&[], &tasks);
        assert_eq!(progress["AS.01"].progress_percentage, 100.0);
    }

    #[test]
    fn test_competency_progress_counts_reflective_journal_entries() {
        let short = JournalEntry {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            entry_date: Utc::now(),
            categories: vec!["AS.02".to_string()],
            reflection_notes: Some("short note".to_string()),
        };
        let long = JournalEntry {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            entry_date: Utc::now(),
            categories: vec!["AS.02".to_string()],
            reflection_notes: Some(
                "Today I learned how important consistent observation is when \
                 an animal is recovering from illness."
                    .to_string(),
            ),
        };

        let progress = calculate_competency_progress(&[short, long], &[]);
        assert_eq!(progress["AS.02"].attempted, 2);
        assert_eq!(progress["AS.02"].completed, 1);
        assert_eq!(progress["AS.02"].progress_percentage, 50.0);
    }

    #[test]
    fn test_count_alerts_by_priority() {
        let alerts = vec![
            alert(PriorityLevel::Urgent, false),
            alert(PriorityLevel::Urgent, true),
            alert(PriorityLevel::Medium, false),
        ];
        let summary = count_alerts(&alerts);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unresolved, 2);
        assert_eq!(summary.unacknowledged, 3);
        assert_eq!(summary.by_priority[&PriorityLevel::Urgent], 2);
        assert_eq!(summary.by_priority[&PriorityLevel::Medium], 1);
    }

    #[test]
    fn test_engagement_score_formula() {
        assert_eq!(calculate_engagement_score(1.0, 1.0), 100.0);
        assert!((calculate_engagement_score(0.5, 0.7) - 60.0).abs() < 1e-9);
    }
}
