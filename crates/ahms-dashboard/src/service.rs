//! 看板聚合服务
//!
//! 在引擎集合和只读引用数据之上派生每学生/每章节的汇总视图。
//! 纯读取：任何错误都不会传播给调用方，最坏结果是空的默认视图。

use crate::metrics::{
    self, AlertSummary, CompetencyProgress,
};
use ahms_core::{
    Animal, EducatorProfile, FollowUpTask, FollowUpUpdate, HealthAlert, HealthRecord,
    HealthRecordStatus, JournalEntry, PriorityLevel, Result, StudentProfile,
};
use ahms_storage::{keys, DataStore};
use chrono::{Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// 学生绩效指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub response_rate: f64,
    pub average_update_quality: f64,
    pub timely_completion_rate: f64,
    pub engagement_score: f64,
}

/// 当前健康问题（健康记录加动物显示名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentIssue {
    pub record: HealthRecord,
    pub animal_name: Option<String>,
}

/// 学生健康概览（计算视图，不持久化）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentHealthOverview {
    pub student_id: Uuid,
    pub active_tasks: Vec<FollowUpTask>,
    pub recent_completed: Vec<FollowUpTask>,
    pub current_issues: Vec<CurrentIssue>,
    pub performance: PerformanceMetrics,
    pub upcoming_deadlines: Vec<FollowUpTask>,
    pub recommendations: Vec<String>,
    pub alert_summary: AlertSummary,
}

impl StudentHealthOverview {
    /// 持久化失败时的安全默认视图
    fn empty(student_id: Uuid) -> Self {
        Self {
            student_id,
            active_tasks: Vec::new(),
            recent_completed: Vec::new(),
            current_issues: Vec::new(),
            performance: PerformanceMetrics {
                response_rate: 1.0,
                average_update_quality: 1.0,
                timely_completion_rate: 1.0,
                engagement_score: 100.0,
            },
            upcoming_deadlines: Vec::new(),
            recommendations: Vec::new(),
            alert_summary: AlertSummary::default(),
        }
    }
}

/// 章节健康指标（计算视图，不持久化）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterHealthMetrics {
    pub chapter_id: String,
    pub active_health_cases: usize,
    pub urgent_attention_needed: usize,
    pub overdue_tasks: usize,
    pub completed_this_month: usize,
    pub total_students: usize,
    pub average_competency_progress: f64,
}

impl ChapterHealthMetrics {
    fn empty(chapter_id: String) -> Self {
        Self {
            chapter_id,
            active_health_cases: 0,
            urgent_attention_needed: 0,
            overdue_tasks: 0,
            completed_this_month: 0,
            total_students: 0,
            average_competency_progress: 0.0,
        }
    }
}

/// 看板聚合服务
///
/// 通过注入的存储句柄构造；对引擎集合只读。
#[derive(Debug)]
pub struct DashboardService {
    store: DataStore,
}

impl DashboardService {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// 学生健康概览
    pub async fn get_student_health_overview(&self, student_id: Uuid) -> StudentHealthOverview {
        match self.try_student_overview(student_id).await {
            Ok(overview) => overview,
            Err(e) => {
                tracing::error!(
                    "Failed to build health overview for student {}: {}",
                    student_id,
                    e
                );
                StudentHealthOverview::empty(student_id)
            }
        }
    }

    async fn try_student_overview(&self, student_id: Uuid) -> Result<StudentHealthOverview> {
        let now = Utc::now();

        let tasks: Vec<FollowUpTask> = self
            .store
            .load_collection::<FollowUpTask>(keys::FOLLOW_UP_TASKS)
            .await?
            .into_iter()
            .filter(|t| t.student_id == student_id)
            .collect();
        let updates: Vec<FollowUpUpdate> = self
            .store
            .load_collection::<FollowUpUpdate>(keys::FOLLOW_UP_UPDATES)
            .await?
            .into_iter()
            .filter(|u| u.student_id == student_id)
            .collect();
        let alerts: Vec<HealthAlert> = self
            .store
            .load_collection::<HealthAlert>(keys::HEALTH_ALERTS)
            .await?
            .into_iter()
            .filter(|a| a.student_id == Some(student_id))
            .collect();
        let animals: Vec<Animal> = self.store.load_collection(keys::ANIMALS).await?;
        let current_issues: Vec<CurrentIssue> = self
            .store
            .load_collection::<HealthRecord>(keys::HEALTH_RECORDS)
            .await?
            .into_iter()
            .filter(|r| r.student_id == student_id && r.status != HealthRecordStatus::Resolved)
            .map(|record| {
                let animal_name = animals
                    .iter()
                    .find(|a| a.id == record.animal_id)
                    .map(|a| a.name.clone());
                CurrentIssue {
                    record,
                    animal_name,
                }
            })
            .collect();

        let active_tasks: Vec<FollowUpTask> =
            tasks.iter().filter(|t| t.is_active()).cloned().collect();

        let recent_cutoff = now - Duration::days(30);
        let recent_completed: Vec<FollowUpTask> = tasks
            .iter()
            .filter(|t| {
                t.completed_date
                    .map(|d| d >= recent_cutoff)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        // 7天内到期的活跃任务，按截止时间升序
        let deadline_cutoff = now + Duration::days(7);
        let mut upcoming_deadlines: Vec<FollowUpTask> = active_tasks
            .iter()
            .filter(|t| t.due_date > now && t.due_date <= deadline_cutoff)
            .cloned()
            .collect();
        upcoming_deadlines.sort_by_key(|t| t.due_date);

        let response_rate = metrics::calculate_response_rate(&tasks);
        let average_update_quality = metrics::average_update_quality(&updates);
        let timely_completion_rate = metrics::calculate_timely_completion_rate(&tasks);
        let engagement_score =
            metrics::calculate_engagement_score(response_rate, average_update_quality);

        let mut recommendations = Vec::new();
        if response_rate < 0.8 {
            recommendations.push(
                "Submit observations on time to improve your response rate".to_string(),
            );
        }
        if average_update_quality < 0.7 {
            recommendations.push(
                "Add more detail, measurements, or photos to your observations".to_string(),
            );
        }

        Ok(StudentHealthOverview {
            student_id,
            active_tasks,
            recent_completed,
            current_issues,
            performance: PerformanceMetrics {
                response_rate,
                average_update_quality,
                timely_completion_rate,
                engagement_score,
            },
            upcoming_deadlines,
            recommendations,
            alert_summary: metrics::count_alerts(&alerts),
        })
    }

    /// 章节健康指标
    ///
    /// 聚合运行在存储中的全部任务/告警上，不按章节过滤；
    /// chapter_id仅保留在输出契约中。
    pub async fn get_chapter_health_metrics(&self, chapter_id: &str) -> ChapterHealthMetrics {
        match self.try_chapter_metrics(chapter_id).await {
            Ok(chapter_metrics) => chapter_metrics,
            Err(e) => {
                tracing::error!("Failed to build chapter metrics for {}: {}", chapter_id, e);
                ChapterHealthMetrics::empty(chapter_id.to_string())
            }
        }
    }

    async fn try_chapter_metrics(&self, chapter_id: &str) -> Result<ChapterHealthMetrics> {
        let now = Utc::now();

        let tasks: Vec<FollowUpTask> = self.store.load_collection(keys::FOLLOW_UP_TASKS).await?;
        let alerts: Vec<HealthAlert> = self.store.load_collection(keys::HEALTH_ALERTS).await?;
        let journal_entries: Vec<JournalEntry> =
            self.store.load_collection(keys::JOURNAL_ENTRIES).await?;

        let active_health_cases = tasks.iter().filter(|t| t.is_active()).count();
        let urgent_attention_needed = alerts
            .iter()
            .filter(|a| a.is_unresolved() && a.priority_level == PriorityLevel::Urgent)
            .count();
        // 过期是读取时的派生比较，不是存储字段
        let overdue_tasks = tasks.iter().filter(|t| t.is_overdue(now)).count();
        let completed_this_month = tasks
            .iter()
            .filter(|t| {
                t.completed_date
                    .map(|d| d.year() == now.year() && d.month() == now.month())
                    .unwrap_or(false)
            })
            .count();
        let total_students = tasks
            .iter()
            .map(|t| t.student_id)
            .collect::<HashSet<_>>()
            .len();

        let competency = metrics::calculate_competency_progress(&journal_entries, &tasks);
        let average_competency_progress = average_progress(&competency);

        Ok(ChapterHealthMetrics {
            chapter_id: chapter_id.to_string(),
            active_health_cases,
            urgent_attention_needed,
            overdue_tasks,
            completed_this_month,
            total_students,
            average_competency_progress,
        })
    }

    /// 学生档案访问（授权门）
    ///
    /// 在该学生的任何其他读取之前执行：学生必须出现在教师的
    /// 监管名单中，或与教师同属一个章节。未授权与学生不存在
    /// 返回同样的None，两种情况对调用方不可区分。
    pub async fn get_student_record(
        &self,
        student_id: Uuid,
        educator_id: Uuid,
    ) -> Option<StudentHealthOverview> {
        match self.try_student_record(student_id, educator_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(
                    "Failed to read student record {} for educator {}: {}",
                    student_id,
                    educator_id,
                    e
                );
                None
            }
        }
    }

    async fn try_student_record(
        &self,
        student_id: Uuid,
        educator_id: Uuid,
    ) -> Result<Option<StudentHealthOverview>> {
        let educators: Vec<EducatorProfile> =
            self.store.load_collection(keys::EDUCATOR_MONITORING).await?;
        let Some(educator) = educators.iter().find(|e| e.id == educator_id) else {
            tracing::warn!("Educator {} not found", educator_id);
            return Ok(None);
        };

        let supervised = educator.students_supervised.contains(&student_id);
        let same_chapter = if supervised {
            true
        } else {
            let students: Vec<StudentProfile> =
                self.store.load_collection(keys::STUDENT_PROFILES).await?;
            students
                .iter()
                .any(|s| s.id == student_id && s.chapter_id == educator.chapter_id)
        };

        if !supervised && !same_chapter {
            return Ok(None);
        }

        Ok(Some(self.get_student_health_overview(student_id).await))
    }

    /// 能力标准进度（对外公开的纯聚合）
    pub fn calculate_competency_progress(
        journal_entries: &[JournalEntry],
        tasks: &[FollowUpTask],
    ) -> std::collections::HashMap<String, CompetencyProgress> {
        metrics::calculate_competency_progress(journal_entries, tasks)
    }
}

fn average_progress(
    competency: &std::collections::HashMap<String, CompetencyProgress>,
) -> f64 {
    if competency.is_empty() {
        return 0.0;
    }
    let sum: f64 = competency.values().map(|c| c.progress_percentage).sum();
    sum / competency.len() as f64
}
