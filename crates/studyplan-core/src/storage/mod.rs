mod config;
pub mod migrations;
pub mod store;
pub mod task_db;

pub use config::{Config, DigestConfig, PlannerConfig};
pub use store::{TaskFilter, TaskPatch, TaskStore};
pub use task_db::TaskDb;

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `STUDYPLAN_HOME` wins when set. Otherwise `~/.config/studyplan[-dev]/`,
/// with the `-dev` suffix when `STUDYPLAN_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("STUDYPLAN_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyplan-dev")
            } else {
                base_dir.join("studyplan")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
