//! 看板聚合演示程序
//!
//! 展示在引擎数据之上派生的学生健康概览和章节健康指标

use std::collections::HashMap;
use uuid::Uuid;

use ahms_core::{ConditionAssessment, TaskFrequency, TaskType};
use ahms_dashboard::DashboardService;
use ahms_engine::{FollowUpEngine, TaskDraft, UpdateDraft};
use ahms_storage::DataStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let store = DataStore::in_memory();
    let engine = FollowUpEngine::new(store.clone());
    let dashboard = DashboardService::new(store);

    println!("🚀 AHMS 看板聚合演示\n");

    let student_id = Uuid::new_v4();
    let educator_id = Uuid::new_v4();

    // 准备两个任务，其中一个收到触发升级的观察记录
    for (title, concern) in [("Daily lamb weight check", 2), ("Goat hoof infection watch", 5)] {
        let task = engine
            .create_follow_up_task(TaskDraft {
                health_record_id: Uuid::new_v4(),
                animal_id: Uuid::new_v4(),
                student_id,
                assigned_by: Some(educator_id),
                task_type: TaskType::HealthMonitoring,
                task_title: Some(title.to_string()),
                description: None,
                due_date: None,
                frequency: TaskFrequency::Daily,
                duration_days: 5,
                priority_level: None,
                competency_standards: vec!["AS.07.01".to_string()],
                learning_objectives: Vec::new(),
            })
            .await
            .ok_or("task creation failed")?;

        engine
            .add_task_update(UpdateDraft {
                follow_up_task_id: task.id,
                student_id,
                observations: "Checked this morning".to_string(),
                student_notes: None,
                measurements: HashMap::new(),
                photos: Vec::new(),
                condition_assessment: ConditionAssessment::Same,
                concern_level: concern,
                confidence_level: 3,
            })
            .await
            .ok_or("update failed")?;
    }

    // 学生健康概览
    let overview = dashboard.get_student_health_overview(student_id).await;
    println!("📊 学生健康概览:");
    println!("   活跃任务: {}", overview.active_tasks.len());
    println!("   响应率: {:.2}", overview.performance.response_rate);
    println!(
        "   平均记录完整度: {:.2}",
        overview.performance.average_update_quality
    );
    println!("   参与度: {:.1}", overview.performance.engagement_score);
    for recommendation in &overview.recommendations {
        println!("   💡 {}", recommendation);
    }
    println!(
        "   告警: 共{} (未解决 {})",
        overview.alert_summary.total, overview.alert_summary.unresolved
    );

    // 章节健康指标
    let chapter_metrics = dashboard.get_chapter_health_metrics("chapter-12").await;
    println!("\n🏫 章节健康指标:");
    println!("   活跃病例: {}", chapter_metrics.active_health_cases);
    println!("   需要紧急关注: {}", chapter_metrics.urgent_attention_needed);
    println!("   过期任务: {}", chapter_metrics.overdue_tasks);
    println!("   本月完成: {}", chapter_metrics.completed_this_month);
    println!("   学生数: {}", chapter_metrics.total_students);

    Ok(())
}
