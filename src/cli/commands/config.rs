//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::SyncResult;
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    config_path: Option<PathBuf>,
) -> SyncResult<()> {
    let manager = config_path.map_or_else(ConfigManager::new, ConfigManager::with_path);

    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(&manager),
        Some(ConfigAction::Init { force }) => init_config(&manager, force).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> SyncResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> SyncResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn init_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("syncstate").join("config.toml");

        execute(
            ConfigArgs {
                action: Some(ConfigAction::Init { force: false }),
            },
            &Config::default(),
            Some(path.clone()),
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[sync]"));
    }

    #[tokio::test]
    async fn init_keeps_existing_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[general]\nlog_format = \"json\"\n").unwrap();

        execute(
            ConfigArgs {
                action: Some(ConfigAction::Init { force: false }),
            },
            &Config::default(),
            Some(path.clone()),
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("json"));
    }
}
