//! AHMS服务主程序

mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use ahms_dashboard::DashboardService;
use ahms_engine::FollowUpEngine;
use ahms_storage::{DataStore, FileBackend};
use config::ServerConfig;

/// AHMS服务命令行参数
#[derive(Parser, Debug)]
#[command(name = "ahms-server")]
#[command(about = "AHMS (Animal Health Monitoring System) 动物健康跟踪服务")]
struct Args {
    /// 数据目录（覆盖配置文件）
    #[arg(short, long)]
    data_dir: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// 服务子命令
#[derive(Subcommand, Debug)]
enum Command {
    /// 输出学生健康概览
    Overview {
        /// 学生ID
        #[arg(long)]
        student_id: Uuid,
    },
    /// 输出章节健康指标
    Chapter {
        /// 章节ID
        #[arg(long)]
        chapter_id: String,
    },
    /// 列出学生的跟踪任务
    Tasks {
        /// 学生ID
        #[arg(long)]
        student_id: Uuid,
    },
    /// 确认告警
    Acknowledge {
        /// 告警ID
        #[arg(long)]
        alert_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    if let Some(data_dir) = args.data_dir {
        server_config.data_dir = data_dir;
    }
    if let Some(log_level) = args.log_level {
        server_config.log_level = log_level;
    }

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(server_config.log_level.as_str())
        .init();

    info!("启动AHMS服务...");
    info!("  数据目录: {}", server_config.data_dir);

    let store = DataStore::new(Arc::new(FileBackend::new(&server_config.data_dir)));
    let engine = FollowUpEngine::new(store.clone());
    let dashboard = DashboardService::new(store);

    match args.command {
        Command::Overview { student_id } => {
            let overview = dashboard.get_student_health_overview(student_id).await;
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
        Command::Chapter { chapter_id } => {
            let chapter_metrics = dashboard.get_chapter_health_metrics(&chapter_id).await;
            println!("{}", serde_json::to_string_pretty(&chapter_metrics)?);
        }
        Command::Tasks { student_id } => {
            let tasks = engine.get_student_tasks(student_id).await;
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        Command::Acknowledge { alert_id } => {
            let acknowledged = engine.acknowledge_alert(alert_id).await;
            if acknowledged {
                info!("告警已确认: {}", alert_id);
            } else {
                info!("告警不存在或已确认过: {}", alert_id);
            }
        }
    }

    Ok(())
}
