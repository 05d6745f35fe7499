use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::error::LoadError;

/// Filesystem side of a page load, rooted at the output directory.
#[derive(Clone)]
pub struct FileManager {
    base_dir: PathBuf,
}

impl FileManager {
    /// Fails with [`LoadError::OutputDirectoryNotFound`] unless `base_dir`
    /// is an existing directory. Nothing is created here.
    pub async fn new(base_dir: &Path) -> Result<Self, LoadError> {
        let not_found = || LoadError::OutputDirectoryNotFound {
            path: base_dir.to_path_buf(),
        };

        let metadata = fs::metadata(base_dir).await.map_err(|_| not_found())?;
        if !metadata.is_dir() {
            return Err(not_found());
        }

        let base_dir = std::path::absolute(base_dir).map_err(|e| LoadError::filesystem(base_dir, e))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Creates `<base>/<name>`; an existing directory is fine.
    pub async fn create_resources_dir(&self, name: &str) -> Result<PathBuf, LoadError> {
        let path = self.base_dir.join(name);
        fs::create_dir_all(&path)
            .await
            .map_err(|e| LoadError::filesystem(&path, e))?;

        Ok(path)
    }

    /// Writes the page through a temporary sibling and renames it into place,
    /// so the final name only ever holds a complete document.
    pub async fn save_page(&self, filename: &str, content: &[u8]) -> Result<PathBuf, LoadError> {
        let path = self.base_dir.join(filename);
        let partial = self.base_dir.join(format!(".{filename}.part"));

        if let Err(e) = fs::write(&partial, content).await {
            let _ = fs::remove_file(&partial).await;
            return Err(LoadError::filesystem(&path, e));
        }

        fs::rename(&partial, &path)
            .await
            .map_err(|e| LoadError::filesystem(&path, e))?;

        Ok(path)
    }

    /// Reference to `file_path` as written into the saved page, relative to
    /// the output directory and always `/`-separated. Fails for paths that
    /// would need `..` or are not valid UTF-8.
    pub fn get_relative_reference(&self, file_path: &Path) -> Result<String, LoadError> {
        let outside = || LoadError::OutsideOutputDirectory {
            path: file_path.to_path_buf(),
        };
        let relative = pathdiff::diff_paths(file_path, &self.base_dir).ok_or_else(outside)?;

        let segments: Vec<_> = relative
            .components()
            .map(|component| match component {
                Component::Normal(segment) => segment.to_str(),
                _ => None,
            })
            .collect::<Option<_>>()
            .ok_or_else(outside)?;

        Ok(segments.join("/"))
    }
}
