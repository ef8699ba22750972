use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }

    fn display_path(&self, path: &str) -> String {
        Path::new(&self.base_path).join(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("out");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        storage.write_file("2025_camps.csv", b"Name\n").await.unwrap();

        let written = fs::read(base.join("2025_camps.csv")).unwrap();
        assert_eq!(written, b"Name\n");
    }

    #[test]
    fn test_display_path_joins_base() {
        let storage = LocalStorage::new("out".to_string());
        let shown = storage.display_path("2025_emails.csv");

        assert!(shown.starts_with("out"));
        assert!(shown.ends_with("2025_emails.csv"));
    }
}
