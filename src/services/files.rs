//! File storage collaborator: opaque blobs addressable by locator.
//!
//! The contract is deliberately narrow: `store(bytes, suggested name)` hands
//! back a locator, `exists(locator)` answers whether it still resolves.
//! Locators are relative paths under the uploads root and can never escape
//! it.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `bytes` under `category`, deriving a unique locator from the
    /// suggested name. Returns the locator.
    pub async fn store(
        &self,
        category: &str,
        suggested_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let name = sanitize_file_name(suggested_name);
        let locator = format!(
            "{category}/{}_{name}",
            chrono::Utc::now().timestamp_millis()
        );

        let path = self
            .resolve(&locator)
            .ok_or_else(|| anyhow::anyhow!("Invalid locator: {locator}"))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create upload directory")?;
        }

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write upload: {}", path.display()))?;

        Ok(locator)
    }

    /// Whether `locator` resolves to a stored file. Traversal attempts
    /// resolve to nothing and answer false.
    pub async fn exists(&self, locator: &str) -> bool {
        match self.resolve(locator) {
            Some(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Map a locator to a path under the root. Absolute locators and any
    /// `..` component are rejected.
    fn resolve(&self, locator: &str) -> Option<PathBuf> {
        let relative = Path::new(locator);

        if relative.is_absolute() {
            return None;
        }

        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                _ => return None,
            }
        }

        Some(self.root.join(relative))
    }
}

/// Keep a conservative character set so locators are safe in URLs and on
/// every filesystem.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_suspect_names() {
        assert_eq!(sanitize_file_name("report 2024.pdf"), "report_2024.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("///"), "file");
    }

    #[tokio::test]
    async fn stores_and_finds_files() {
        let dir = std::env::temp_dir().join(format!("kbase-files-{}", uuid::Uuid::new_v4()));
        let store = FileStore::new(&dir);

        let locator = store.store("chat", "hello.txt", b"hi").await.unwrap();
        assert!(locator.starts_with("chat/"));
        assert!(locator.ends_with("_hello.txt"));
        assert!(store.exists(&locator).await);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_traversal_locators() {
        let store = FileStore::new("uploads");
        assert!(!store.exists("../Cargo.toml").await);
        assert!(!store.exists("/etc/passwd").await);
    }
}
