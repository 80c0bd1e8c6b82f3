use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Create `<base>/<YYYYmmdd_HHMMSS>` and store everything there.
    pub fn timestamped(base: impl AsRef<Path>) -> Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let dir = base.as_ref().join(timestamp);
        fs::create_dir_all(&dir)?;
        tracing::debug!("Created output directory {}", dir.display());
        Ok(Self::new(dir))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    fn location(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_path.display().to_string()
        } else {
            self.base_path.join(path).display().to_string()
        }
    }
}
