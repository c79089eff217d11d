//! 跟踪任务引擎演示程序
//!
//! 展示跟踪任务引擎的核心功能，包括任务创建、观察记录、进度计算、升级检测和结案

use std::collections::HashMap;
use uuid::Uuid;

use ahms_core::{ConditionAssessment, OutcomeStatus, TaskFrequency, TaskType};
use ahms_engine::{FollowUpEngine, TaskDraft, UpdateDraft};
use ahms_storage::DataStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    // 创建引擎实例（内存存储）
    let engine = FollowUpEngine::new(DataStore::in_memory());

    println!("🚀 AHMS 跟踪任务引擎演示\n");

    let student_id = Uuid::new_v4();
    let educator_id = Uuid::new_v4();

    // 1. 教师创建跟踪任务
    let task = engine
        .create_follow_up_task(TaskDraft {
            health_record_id: Uuid::new_v4(),
            animal_id: Uuid::new_v4(),
            student_id,
            assigned_by: Some(educator_id),
            task_type: TaskType::WoundCare,
            task_title: Some("Monitor heifer leg wound".to_string()),
            description: Some("Check the wound twice a day after cleaning".to_string()),
            due_date: None,
            frequency: TaskFrequency::Daily,
            duration_days: 3,
            priority_level: None,
            competency_standards: vec!["AS.07.01".to_string()],
            learning_objectives: vec!["Recognize signs of infection".to_string()],
        })
        .await
        .ok_or("task creation failed")?;
    println!("✅ 创建跟踪任务: {} ({})", task.task_title, task.id);

    // 2. 学生提交正常观察记录
    let mut measurements = HashMap::new();
    measurements.insert("temperature_c".to_string(), 38.6);
    engine
        .add_task_update(UpdateDraft {
            follow_up_task_id: task.id,
            student_id,
            observations: "Wound edges clean, no discharge".to_string(),
            student_notes: Some("Cleaned with saline as instructed".to_string()),
            measurements,
            photos: vec!["photos/wound_day1.jpg".to_string()],
            condition_assessment: ConditionAssessment::Same,
            concern_level: 2,
            confidence_level: 4,
        })
        .await
        .ok_or("update failed")?;
    let current = engine.get_task(task.id).await.ok_or("task missing")?;
    println!(
        "📋 第1次观察记录: 进度 {:.1}%, 状态 {:?}",
        current.progress_percentage, current.completion_status
    );

    // 3. 提交触发升级的观察记录
    engine
        .add_task_update(UpdateDraft {
            follow_up_task_id: task.id,
            student_id,
            observations: "Severe swelling and heat around the wound".to_string(),
            student_notes: None,
            measurements: HashMap::new(),
            photos: Vec::new(),
            condition_assessment: ConditionAssessment::Worse,
            concern_level: 5,
            confidence_level: 4,
        })
        .await
        .ok_or("update failed")?;
    let escalated = engine.get_task(task.id).await.ok_or("task missing")?;
    println!(
        "🚨 升级触发: escalation_triggered={}, 优先级 {:?}",
        escalated.escalation_triggered, escalated.priority_level
    );

    // 4. 查看产生的告警
    let alerts = engine.get_all_alerts().await;
    println!("\n📣 当前告警 ({}):", alerts.len());
    for alert in &alerts {
        println!(
            "   - {:?} ({:?}) 推送: {}",
            alert.alert_type, alert.priority_level, alert.push_notification_sent
        );
    }

    // 5. 结案任务
    let completed = engine
        .complete_task(
            task.id,
            "Vet treated the infection, wound healing".to_string(),
            OutcomeStatus::Resolved,
            Some("Learned to spot early infection signs".to_string()),
        )
        .await
        .ok_or("completion failed")?;
    println!(
        "\n✅ 任务结案: 进度 {:.0}%, 状态 {:?}, 结果 {:?}",
        completed.progress_percentage,
        completed.completion_status,
        completed.outcome_status
    );

    let updates = engine.get_task_updates(task.id).await;
    println!("📚 观察记录总数（含合成结案记录）: {}", updates.len());

    Ok(())
}
