//! Layered configuration loading using figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`KANBAN_*` prefix, `__` as separator)
//! 2. `kanban.toml` in the working directory, or an explicit file
//! 3. Built-in defaults
//!
//! `KANBAN_STORAGE__BACKEND=memory` maps to `storage.backend`,
//! `KANBAN_LIMITS__CARD_TITLE_MAX=80` to `limits.card_title_max`.

use crate::{error::Result, validation::Limits};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Which persistence adapter to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory the file and sqlite backends keep their data under
    pub path: PathBuf,
    /// Simulated latency for the memory backend
    pub latency_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: PathBuf::from("."),
            latency_ms: 0,
        }
    }
}

impl StorageConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardDefaults {
    /// Columns seeded into a new board when the draft names none
    pub default_columns: Vec<String>,
    /// How many recently opened boards to remember
    pub recent_boards_max: usize,
}

impl Default for BoardDefaults {
    fn default() -> Self {
        Self {
            default_columns: vec![
                "To Do".to_string(),
                "In Progress".to_string(),
                "Done".to_string(),
            ],
            recent_boards_max: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanConfig {
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub board: BoardDefaults,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for KanbanConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            storage: StorageConfig::default(),
            board: BoardDefaults::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl KanbanConfig {
    pub const FILE_NAME: &'static str = "kanban.toml";
    pub const ENV_PREFIX: &'static str = "KANBAN_";

    /// Loads defaults, then `kanban.toml` if present, then the environment
    pub fn load() -> Result<Self> {
        Ok(Self::figment(Path::new(Self::FILE_NAME)).extract()?)
    }

    /// Same as [`KanbanConfig::load`] with an explicit TOML file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::figment(path.as_ref()).extract()?)
    }

    /// The provider chain, exposed so callers can layer more on top
    pub fn figment(file: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config = KanbanConfig::load().expect("defaults load");
            assert_eq!(config, KanbanConfig::default());
            assert_eq!(config.storage.backend, StorageBackend::File);
            assert_eq!(config.board.default_columns.len(), 3);
            assert_eq!(config.log_filter, "warn");
            Ok(())
        });
    }

    #[test]
    fn test_toml_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "kanban.toml",
                r#"
                log_filter = "debug"

                [limits]
                card_title_max = 80

                [storage]
                backend = "memory"
                latency_ms = 300

                [board]
                default_columns = ["Backlog", "Doing"]
                "#,
            )?;

            let config = KanbanConfig::load().expect("config loads");
            assert_eq!(config.log_filter, "debug");
            assert_eq!(config.limits.card_title_max, 80);
            assert_eq!(config.limits.card_description_max, 500);
            assert_eq!(config.storage.backend, StorageBackend::Memory);
            assert_eq!(config.storage.latency(), Duration::from_millis(300));
            assert_eq!(config.board.default_columns, ["Backlog", "Doing"]);
            assert_eq!(config.board.recent_boards_max, 5);
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_toml() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[storage]\nbackend = \"file\"\n")?;
            jail.set_env("KANBAN_STORAGE__BACKEND", "sqlite");
            jail.set_env("KANBAN_BOARD__RECENT_BOARDS_MAX", "8");

            let config = KanbanConfig::load_from("custom.toml").expect("config loads");
            assert_eq!(config.storage.backend, StorageBackend::Sqlite);
            assert_eq!(config.board.recent_boards_max, 8);
            Ok(())
        });
    }

    #[test]
    fn test_bad_value_is_config_error() {
        Jail::expect_with(|jail| {
            jail.set_env("KANBAN_STORAGE__BACKEND", "floppy");

            let err = KanbanConfig::load().unwrap_err();
            assert!(matches!(err, crate::error::KanbanError::Config(_)));
            Ok(())
        });
    }
}
