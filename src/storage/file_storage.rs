use crate::{
    error::{KanbanError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File-based storage keeping one JSON document per key
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const KANBAN_DIR: &'static str = ".kanban";
    const EXTENSION: &'static str = "json";

    /// Creates a new FileStorage under `<data_root>/.kanban`
    pub fn new(data_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: data_root.as_ref().join(Self::KANBAN_DIR),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Maps a key to its file, rejecting anything that could escape the root
    fn key_file(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(KanbanError::Persistence(format!(
                "Invalid storage key '{}'",
                key
            )));
        }
        Ok(self
            .root_path
            .join(format!("{}.{}", key, Self::EXTENSION)))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let gitignore_path = self.root_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "# Partial writes\n*.tmp\n").await?;
        }

        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.is_dir()
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.key_file(key)?;

        if !file_path.exists() {
            return Ok(None);
        }

        Ok(Some(fs::read_to_string(&file_path).await?))
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        let file_path = self.key_file(key)?;
        self.ensure_directory_exists(&self.root_path).await?;

        // Write beside the target and rename so readers never see half a document
        let tmp_path = file_path.with_extension("tmp");
        fs::write(&tmp_path, value).await?;
        fs::rename(&tmp_path, &file_path).await?;
        debug!(key, path = %file_path.display(), "wrote key");
        Ok(())
    }

    async fn remove_raw(&self, key: &str) -> Result<bool> {
        let file_path = self.key_file(key)?;

        if !file_path.exists() {
            return Ok(false);
        }

        fs::remove_file(&file_path).await?;
        debug!(key, path = %file_path.display(), "removed key");
        Ok(true)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        if !self.root_path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.root_path).await?;
        let mut keys = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(Self::EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem.starts_with(prefix) {
                    keys.push(stem.to_string());
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}
