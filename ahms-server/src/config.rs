//! 服务配置
//!
//! 支持配置文件和环境变量（AHMS_前缀）两种来源

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// AHMS服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 集合JSON文件所在的数据目录
    pub data_dir: String,
    /// 日志级别
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data/ahms".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// 加载配置：默认值 < 配置文件 < 环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = ServerConfig::default();

        let mut builder = Config::builder()
            .set_default("data_dir", defaults.data_dir)?
            .set_default("log_level", defaults.log_level)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }
        builder = builder.add_source(Environment::with_prefix("AHMS"));

        let config = builder.build().context("Failed to build configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_config_file() {
        let config = ServerConfig::load(None).unwrap();
        assert_eq!(config.data_dir, "./data/ahms");
        assert_eq!(config.log_level, "info");
    }
}
