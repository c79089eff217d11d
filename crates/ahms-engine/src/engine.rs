//! 跟踪任务引擎
//!
//! 拥有跟踪任务/观察记录/健康告警的完整生命周期，
//! 协调状态机、进度计算和升级检测

use crate::escalation;
use crate::progress;
use crate::state_machine::{TaskEvent, TaskStateMachine};
use ahms_core::{
    utils::generate_entity_id, AhmsError, AlertType, CompletionStatus, ConditionAssessment,
    FollowUpTask, FollowUpUpdate, HealthAlert, OutcomeStatus, PriorityLevel, Result, ReviewStatus,
    TaskFrequency, TaskType,
};
use ahms_storage::{keys, DataStore};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// 缺省任务标题
const DEFAULT_TASK_TITLE: &str = "Health Monitoring Task";

/// 新建任务请求
///
/// 缺失的可选字段静默采用默认值，创建路径上没有校验拒绝。
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub health_record_id: Uuid,
    pub animal_id: Uuid,
    pub student_id: Uuid,
    pub assigned_by: Option<Uuid>,
    pub task_type: TaskType,
    pub task_title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub frequency: TaskFrequency,
    pub duration_days: u32,
    pub priority_level: Option<PriorityLevel>,
    pub competency_standards: Vec<String>,
    pub learning_objectives: Vec<String>,
}

/// 新建观察记录请求
#[derive(Debug, Clone)]
pub struct UpdateDraft {
    pub follow_up_task_id: Uuid,
    pub student_id: Uuid,
    pub observations: String,
    pub student_notes: Option<String>,
    pub measurements: HashMap<String, f64>,
    pub photos: Vec<String>,
    pub condition_assessment: ConditionAssessment,
    pub concern_level: u8,
    pub confidence_level: u8,
}

/// 新建告警请求
#[derive(Debug, Clone)]
pub struct AlertDraft {
    pub alert_type: AlertType,
    pub priority_level: PriorityLevel,
    pub title: String,
    pub message: String,
    pub student_id: Option<Uuid>,
    pub educator_id: Option<Uuid>,
    pub follow_up_task_id: Option<Uuid>,
    pub push_notification: bool,
}

/// 跟踪任务引擎
///
/// 通过注入的存储句柄构造，不使用模块级单例，便于测试隔离。
/// 所有持久化失败在该边界被捕获并降级为安全默认值
/// （空列表 / None / false），引擎内部不做重试。
#[derive(Debug)]
pub struct FollowUpEngine {
    store: DataStore,
    state_machine: TaskStateMachine,
}

impl FollowUpEngine {
    /// 创建新的引擎实例
    pub fn new(store: DataStore) -> Self {
        Self {
            store,
            state_machine: TaskStateMachine::new(),
        }
    }

    /// 创建跟踪任务
    ///
    /// 填充默认值并持久化，同时向学生发出任务分配告警。
    pub async fn create_follow_up_task(&self, draft: TaskDraft) -> Option<FollowUpTask> {
        match self.try_create_task(draft).await {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::error!("Failed to create follow-up task: {}", e);
                None
            }
        }
    }

    async fn try_create_task(&self, draft: TaskDraft) -> Result<FollowUpTask> {
        let now = Utc::now();
        let task_title = draft
            .task_title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TASK_TITLE.to_string());

        let task = FollowUpTask {
            id: generate_entity_id(),
            health_record_id: draft.health_record_id,
            animal_id: draft.animal_id,
            student_id: draft.student_id,
            assigned_by: draft.assigned_by,
            task_type: draft.task_type,
            task_title,
            description: draft.description,
            created_date: now,
            due_date: draft
                .due_date
                .unwrap_or_else(|| now + Duration::days(draft.duration_days as i64)),
            frequency: draft.frequency,
            duration_days: draft.duration_days,
            completion_status: CompletionStatus::Pending,
            progress_percentage: 0.0,
            priority_level: draft.priority_level.unwrap_or(PriorityLevel::Medium),
            escalation_triggered: false,
            escalation_date: None,
            competency_standards: draft.competency_standards,
            learning_objectives: draft.learning_objectives,
            completed_date: None,
            resolution_notes: None,
            outcome_status: None,
        };

        let mut tasks: Vec<FollowUpTask> =
            self.store.load_collection(keys::FOLLOW_UP_TASKS).await?;
        tasks.push(task.clone());
        self.store.save(keys::FOLLOW_UP_TASKS, &tasks).await?;

        tracing::info!(
            "Created follow-up task {} for student {}",
            task.id,
            task.student_id
        );

        // 任务分配告警（信息性，无推送决策）
        self.try_create_alert(AlertDraft {
            alert_type: AlertType::TaskAssigned,
            priority_level: task.priority_level,
            title: "New follow-up task assigned".to_string(),
            message: format!("You have been assigned: {}", task.task_title),
            student_id: Some(task.student_id),
            educator_id: None,
            follow_up_task_id: Some(task.id),
            push_notification: false,
        })
        .await?;

        Ok(task)
    }

    /// 追加观察记录
    ///
    /// 派生完整度评分后追加记录，重算任务进度并推进状态，
    /// 最后执行升级检测。
    pub async fn add_task_update(&self, draft: UpdateDraft) -> Option<FollowUpUpdate> {
        match self.try_add_update(draft).await {
            Ok(update) => Some(update),
            Err(e) => {
                tracing::error!("Failed to add task update: {}", e);
                None
            }
        }
    }

    async fn try_add_update(&self, draft: UpdateDraft) -> Result<FollowUpUpdate> {
        let mut tasks: Vec<FollowUpTask> =
            self.store.load_collection(keys::FOLLOW_UP_TASKS).await?;
        let position = tasks
            .iter()
            .position(|t| t.id == draft.follow_up_task_id)
            .ok_or_else(|| {
                AhmsError::NotFound(format!(
                    "Follow-up task {} not found",
                    draft.follow_up_task_id
                ))
            })?;

        let update = FollowUpUpdate {
            id: generate_entity_id(),
            follow_up_task_id: draft.follow_up_task_id,
            student_id: draft.student_id,
            update_date: Utc::now(),
            update_completeness_score: progress::completeness_score(
                &draft.observations,
                draft.student_notes.as_deref(),
                &draft.measurements,
                &draft.photos,
            ),
            observations: draft.observations,
            student_notes: draft.student_notes,
            measurements: draft.measurements,
            photos: draft.photos,
            condition_assessment: draft.condition_assessment,
            concern_level: draft.concern_level.clamp(1, 5),
            confidence_level: draft.confidence_level.clamp(1, 5),
            review_status: ReviewStatus::Pending,
        };

        // 只追加：已有记录不可变更
        let mut updates: Vec<FollowUpUpdate> =
            self.store.load_collection(keys::FOLLOW_UP_UPDATES).await?;
        updates.push(update.clone());
        let update_count = updates
            .iter()
            .filter(|u| u.follow_up_task_id == draft.follow_up_task_id)
            .count();
        self.store.save(keys::FOLLOW_UP_UPDATES, &updates).await?;

        // 重算进度并推进状态
        let mut escalation_alert = None;
        {
            let task = &mut tasks[position];
            let expected = progress::expected_updates(task.frequency, task.duration_days);
            task.progress_percentage = progress::progress_percentage(update_count, expected);

            if task.completion_status == CompletionStatus::Pending {
                task.completion_status = self
                    .state_machine
                    .transition(CompletionStatus::Pending, &TaskEvent::FirstUpdate)?;
            }
            if task.progress_percentage >= 100.0
                && self
                    .state_machine
                    .can_transition(task.completion_status, &TaskEvent::ProgressComplete)
            {
                // 进度满额只改变状态标签，不设置结案时间
                task.completion_status = self
                    .state_machine
                    .transition(task.completion_status, &TaskEvent::ProgressComplete)?;
            }

            // 升级检测：已升级的任务不再评估
            if !task.escalation_triggered {
                if let Some(reason) = escalation::check_escalation_triggers(&update) {
                    task.escalation_triggered = true; // 不可逆
                    task.escalation_date = Some(Utc::now());
                    task.priority_level = PriorityLevel::Urgent;

                    tracing::warn!("Escalation triggered for task {}: {}", task.id, reason);

                    // 紧急告警同时送达学生和分配任务的教师
                    escalation_alert = Some(AlertDraft {
                        alert_type: AlertType::EscalationNeeded,
                        priority_level: PriorityLevel::Urgent,
                        title: "Health case needs urgent attention".to_string(),
                        message: format!("Task '{}' escalated: {}", task.task_title, reason),
                        student_id: Some(task.student_id),
                        educator_id: task.assigned_by,
                        follow_up_task_id: Some(task.id),
                        push_notification: true,
                    });
                }
            }
        }

        self.store.save(keys::FOLLOW_UP_TASKS, &tasks).await?;

        if let Some(alert) = escalation_alert {
            self.try_create_alert(alert).await?;
        }

        Ok(update)
    }

    /// 结案跟踪任务
    ///
    /// 无条件置为完成并写入结案字段，追加一条合成的结案观察记录；
    /// 若任务由教师分配则向教师发出完成告警。
    pub async fn complete_task(
        &self,
        task_id: Uuid,
        resolution_notes: String,
        outcome_status: OutcomeStatus,
        reflection: Option<String>,
    ) -> Option<FollowUpTask> {
        match self
            .try_complete_task(task_id, resolution_notes, outcome_status, reflection)
            .await
        {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::error!("Failed to complete task {}: {}", task_id, e);
                None
            }
        }
    }

    async fn try_complete_task(
        &self,
        task_id: Uuid,
        resolution_notes: String,
        outcome_status: OutcomeStatus,
        reflection: Option<String>,
    ) -> Result<FollowUpTask> {
        let mut tasks: Vec<FollowUpTask> =
            self.store.load_collection(keys::FOLLOW_UP_TASKS).await?;
        let position = tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| AhmsError::NotFound(format!("Follow-up task {} not found", task_id)))?;

        let now = Utc::now();
        {
            let task = &mut tasks[position];
            if self
                .state_machine
                .can_transition(task.completion_status, &TaskEvent::Completed)
            {
                task.completion_status = self
                    .state_machine
                    .transition(task.completion_status, &TaskEvent::Completed)?;
            } else {
                // 已处于完成状态时结案字段仍无条件写入
                task.completion_status = CompletionStatus::Completed;
            }
            task.completed_date = Some(now);
            task.progress_percentage = 100.0;
            task.resolution_notes = Some(resolution_notes.clone());
            task.outcome_status = Some(outcome_status);
        }
        let task = tasks[position].clone();
        self.store.save(keys::FOLLOW_UP_TASKS, &tasks).await?;

        // 合成的结案观察记录
        let final_assessment = if outcome_status == OutcomeStatus::Resolved {
            ConditionAssessment::Resolved
        } else {
            ConditionAssessment::Improved
        };
        let final_update = FollowUpUpdate {
            id: generate_entity_id(),
            follow_up_task_id: task.id,
            student_id: task.student_id,
            update_date: now,
            update_completeness_score: progress::completeness_score(
                &resolution_notes,
                reflection.as_deref(),
                &HashMap::new(),
                &[],
            ),
            observations: resolution_notes,
            student_notes: reflection,
            measurements: HashMap::new(),
            photos: Vec::new(),
            condition_assessment: final_assessment,
            concern_level: 1,
            confidence_level: 4,
            review_status: ReviewStatus::Pending,
        };
        let mut updates: Vec<FollowUpUpdate> =
            self.store.load_collection(keys::FOLLOW_UP_UPDATES).await?;
        updates.push(final_update);
        self.store.save(keys::FOLLOW_UP_UPDATES, &updates).await?;

        tracing::info!("Completed follow-up task {}", task.id);

        if let Some(educator_id) = task.assigned_by {
            self.try_create_alert(AlertDraft {
                alert_type: AlertType::TaskCompleted,
                priority_level: PriorityLevel::Medium,
                title: "Follow-up task completed".to_string(),
                message: format!(
                    "Task '{}' was completed with outcome {:?}",
                    task.task_title, outcome_status
                ),
                student_id: None,
                educator_id: Some(educator_id),
                follow_up_task_id: Some(task.id),
                push_notification: false,
            })
            .await?;
        }

        Ok(task)
    }

    /// 创建健康告警
    pub async fn create_alert(&self, draft: AlertDraft) -> Option<HealthAlert> {
        match self.try_create_alert(draft).await {
            Ok(alert) => Some(alert),
            Err(e) => {
                tracing::error!("Failed to create alert: {}", e);
                None
            }
        }
    }

    async fn try_create_alert(&self, draft: AlertDraft) -> Result<HealthAlert> {
        let alert = HealthAlert {
            id: generate_entity_id(),
            alert_type: draft.alert_type,
            priority_level: draft.priority_level,
            title: draft.title,
            message: draft.message,
            student_id: draft.student_id,
            educator_id: draft.educator_id,
            follow_up_task_id: draft.follow_up_task_id,
            push_notification_sent: draft.push_notification,
            created_date: Utc::now(),
            acknowledged_date: None,
            resolved_date: None,
            action_taken: None,
            action_description: None,
        };

        let mut alerts: Vec<HealthAlert> = self.store.load_collection(keys::HEALTH_ALERTS).await?;
        alerts.push(alert.clone());
        self.store.save(keys::HEALTH_ALERTS, &alerts).await?;

        tracing::info!("Created {:?} alert {}", alert.alert_type, alert.id);
        Ok(alert)
    }

    /// 确认告警
    ///
    /// acknowledged_date仅可设置一次；重复确认返回false。
    pub async fn acknowledge_alert(&self, alert_id: Uuid) -> bool {
        match self.try_acknowledge_alert(alert_id).await {
            Ok(acknowledged) => acknowledged,
            Err(e) => {
                tracing::error!("Failed to acknowledge alert {}: {}", alert_id, e);
                false
            }
        }
    }

    async fn try_acknowledge_alert(&self, alert_id: Uuid) -> Result<bool> {
        let mut alerts: Vec<HealthAlert> = self.store.load_collection(keys::HEALTH_ALERTS).await?;
        let Some(alert) = alerts.iter_mut().find(|a| a.id == alert_id) else {
            tracing::warn!("Alert {} not found", alert_id);
            return Ok(false);
        };
        if alert.acknowledged_date.is_some() {
            return Ok(false);
        }
        alert.acknowledged_date = Some(Utc::now());
        self.store.save(keys::HEALTH_ALERTS, &alerts).await?;
        Ok(true)
    }

    /// 解决告警
    ///
    /// 记录采取的措施，resolved_date仅可设置一次。
    pub async fn resolve_alert(
        &self,
        alert_id: Uuid,
        action_taken: String,
        action_description: Option<String>,
    ) -> bool {
        match self
            .try_resolve_alert(alert_id, action_taken, action_description)
            .await
        {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::error!("Failed to resolve alert {}: {}", alert_id, e);
                false
            }
        }
    }

    async fn try_resolve_alert(
        &self,
        alert_id: Uuid,
        action_taken: String,
        action_description: Option<String>,
    ) -> Result<bool> {
        let mut alerts: Vec<HealthAlert> = self.store.load_collection(keys::HEALTH_ALERTS).await?;
        let Some(alert) = alerts.iter_mut().find(|a| a.id == alert_id) else {
            tracing::warn!("Alert {} not found", alert_id);
            return Ok(false);
        };
        if alert.resolved_date.is_some() {
            return Ok(false);
        }
        alert.action_taken = Some(action_taken);
        alert.action_description = action_description;
        alert.resolved_date = Some(Utc::now());
        self.store.save(keys::HEALTH_ALERTS, &alerts).await?;
        Ok(true)
    }

    /// 获取单个任务
    pub async fn get_task(&self, task_id: Uuid) -> Option<FollowUpTask> {
        self.get_all_tasks()
            .await
            .into_iter()
            .find(|t| t.id == task_id)
    }

    /// 获取所有任务
    pub async fn get_all_tasks(&self) -> Vec<FollowUpTask> {
        match self.store.load_collection(keys::FOLLOW_UP_TASKS).await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::error!("Failed to load follow-up tasks: {}", e);
                Vec::new()
            }
        }
    }

    /// 获取学生的所有任务
    pub async fn get_student_tasks(&self, student_id: Uuid) -> Vec<FollowUpTask> {
        self.get_all_tasks()
            .await
            .into_iter()
            .filter(|t| t.student_id == student_id)
            .collect()
    }

    /// 获取任务的观察记录
    pub async fn get_task_updates(&self, task_id: Uuid) -> Vec<FollowUpUpdate> {
        match self.store.load_collection::<FollowUpUpdate>(keys::FOLLOW_UP_UPDATES).await {
            Ok(updates) => updates
                .into_iter()
                .filter(|u| u.follow_up_task_id == task_id)
                .collect(),
            Err(e) => {
                tracing::error!("Failed to load follow-up updates: {}", e);
                Vec::new()
            }
        }
    }

    /// 获取所有告警
    pub async fn get_all_alerts(&self) -> Vec<HealthAlert> {
        match self.store.load_collection(keys::HEALTH_ALERTS).await {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::error!("Failed to load health alerts: {}", e);
                Vec::new()
            }
        }
    }

    /// 获取学生的告警
    pub async fn get_student_alerts(&self, student_id: Uuid) -> Vec<HealthAlert> {
        self.get_all_alerts()
            .await
            .into_iter()
            .filter(|a| a.student_id == Some(student_id))
            .collect()
    }

    /// 获取教师的告警
    pub async fn get_educator_alerts(&self, educator_id: Uuid) -> Vec<HealthAlert> {
        self.get_all_alerts()
            .await
            .into_iter()
            .filter(|a| a.educator_id == Some(educator_id))
            .collect()
    }
}
