use drift_core::{config::AppConfig, error::Result};
use std::path::{Path, PathBuf};

use crate::cli::Commands;
use crate::commands;
use tracing::info;

#[derive(Debug, Clone)]
pub struct CliApp {
    pub config: AppConfig,
    pub config_path: PathBuf,
}

impl CliApp {
    /// 加载配置初始化CLI应用
    ///
    /// 指定的配置文件存在时直接使用，否则按默认顺序查找
    pub fn new_with_config(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            info!("使用配置文件: {}", config_path.display());
            AppConfig::load_from_file(config_path)?
        } else {
            AppConfig::find_and_load_config()?
        };

        Ok(Self {
            config,
            config_path: config_path.to_path_buf(),
        })
    }

    /// 运行需要配置的命令
    pub async fn run_command(&mut self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Status => commands::run_status(self),
            Commands::Scan {
                category,
                prod,
                all,
                database,
            } => commands::run_scan(self, &category, prod, all, database).await?,
            Commands::Report {
                category,
                untracked_only,
                json,
            } => commands::run_report(self, &category, untracked_only, json)?,
            Commands::Track { key, ticket } => {
                commands::run_track(self, &key, ticket.as_deref().unwrap_or_default())?
            }
            // 以下命令不需要配置，已经在 main.rs 中处理
            Commands::Init { .. } | Commands::CheckTable { .. } | Commands::Abstract { .. } => {
                anyhow::bail!("该命令不需要加载配置，应在加载配置之前执行")
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_free_commands_are_rejected() {
        let mut app = CliApp {
            config: AppConfig::default(),
            config_path: PathBuf::from("config.toml"),
        };

        let result = app.run_command(Commands::Init { force: false }).await;
        assert!(result.is_err());
    }
}
