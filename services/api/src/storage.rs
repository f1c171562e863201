//! Image storage for recipe pictures
//!
//! Files are written under a configurable media root with a generated
//! collision-resistant name; the client-supplied filename only
//! contributes its extension.

use anyhow::Result;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem-backed image store
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a new image store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a new ImageStore from environment variables
    ///
    /// # Environment Variables
    /// - `MEDIA_ROOT`: Directory for uploaded images (default: `media`)
    pub fn from_env() -> Self {
        let root = std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());
        Self::new(root)
    }

    /// Store image bytes and return the generated filename
    pub async fn save(&self, original_filename: Option<&str>, bytes: &[u8]) -> Result<String> {
        let filename = generate_filename(original_filename);
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&filename), bytes).await?;

        Ok(filename)
    }

    /// Absolute path of a stored image
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Directory the images live under
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Generate a random filename, keeping the original extension
fn generate_filename(original_filename: Option<&str>) -> String {
    let extension = original_filename
        .map(Path::new)
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str());

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_keeps_extension_and_drops_client_name() {
        let name = generate_filename(Some("photo.jpg"));
        assert!(name.ends_with(".jpg"));
        assert!(!name.contains("photo"));
    }

    #[test]
    fn filename_without_extension_is_bare_uuid() {
        let name = generate_filename(None);
        assert!(Uuid::parse_str(&name).is_ok());
    }

    #[test]
    fn filenames_do_not_collide() {
        assert_ne!(
            generate_filename(Some("a.png")),
            generate_filename(Some("a.png"))
        );
    }

    #[tokio::test]
    async fn save_writes_file_under_root() {
        let root = std::env::temp_dir().join(format!("recipe-api-test-{}", Uuid::new_v4()));
        let store = ImageStore::new(&root);

        let filename = store
            .save(Some("dish.png"), b"not really a png")
            .await
            .expect("save");

        let stored = store.path_of(&filename);
        assert_eq!(
            tokio::fs::read(&stored).await.expect("read back"),
            b"not really a png"
        );

        tokio::fs::remove_dir_all(&root).await.expect("cleanup");
    }
}
