//! File mutation engine
//!
//! Read, write, rename, delete and create page sources under the docs
//! root. Every operation resolves its path first and converts filesystem
//! failures into [`EditError`] values; nothing here panics or escapes to
//! tear down a session.

use crate::error::EditError;
use crate::paths::{self, SiteUrls};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::sync::Arc;

/// Outcome of a successful rename.
#[derive(Debug, Clone)]
pub struct RenamedFile {
    pub old_abs: Utf8PathBuf,
    pub new_abs: Utf8PathBuf,
    /// Site-relative path of the file after the rename.
    pub new_rel: Utf8PathBuf,
    /// Canonical URL of the renamed page, when the builder maps it to one.
    pub new_url: Option<String>,
}

/// Performs all filesystem mutations for editing sessions.
pub struct MutationEngine {
    root: Utf8PathBuf,
    urls: Arc<dyn SiteUrls>,
}

impl MutationEngine {
    pub fn new(root: Utf8PathBuf, urls: Arc<dyn SiteUrls>) -> Self {
        Self { root, urls }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Read the full contents of a page source.
    pub fn read(&self, path: &str) -> Result<String, EditError> {
        let abs = paths::resolve(&self.root, path)?;
        fs::read_to_string(&abs).map_err(|e| EditError::from_io(path, e))
    }

    /// Overwrite the full contents of a page source.
    ///
    /// Parent directories are not created here; a missing parent fails the
    /// same way a missing file would. The write is a plain truncate-and-write.
    pub fn write(&self, path: &str, contents: &str) -> Result<(), EditError> {
        let abs = paths::resolve(&self.root, path)?;
        fs::write(&abs, contents).map_err(|e| EditError::from_io(path, e))
    }

    /// Rename a page source within its parent directory.
    ///
    /// `new_filename` must be a bare filename; anything that could change
    /// the parent directory is rejected before touching the filesystem.
    pub fn rename(&self, path: &str, new_filename: &str) -> Result<RenamedFile, EditError> {
        if new_filename.is_empty()
            || new_filename == "."
            || new_filename == ".."
            || new_filename.contains(['/', '\\'])
        {
            return Err(EditError::invalid_path(new_filename));
        }

        let old_abs = paths::resolve(&self.root, path)?;
        let parent = old_abs
            .parent()
            .ok_or_else(|| EditError::invalid_path(path))?;
        let new_abs = parent.join(new_filename);

        fs::rename(&old_abs, &new_abs).map_err(|e| EditError::from_io(path, e))?;

        let new_rel = match Utf8Path::new(path).parent() {
            Some(p) if !p.as_str().is_empty() => p.join(new_filename),
            _ => Utf8PathBuf::from(new_filename),
        };
        let new_url = self.urls.url_for(&new_abs);

        Ok(RenamedFile {
            old_abs,
            new_abs,
            new_rel,
            new_url,
        })
    }

    /// Delete a single page source. No recursion, no trash.
    pub fn delete(&self, path: &str) -> Result<(), EditError> {
        let abs = paths::resolve(&self.root, path)?;
        fs::remove_file(&abs).map_err(|e| EditError::from_io(path, e))
    }

    /// Create a page source with a templated title, creating any missing
    /// parent directories.
    ///
    /// There is no existence pre-check: creating over an existing file
    /// overwrites it (last write wins). Returns the absolute path of the
    /// created file so the caller can track the pending navigation.
    pub fn create(&self, path: &str, title: &str) -> Result<Utf8PathBuf, EditError> {
        let abs = paths::resolve(&self.root, path)?;
        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent).map_err(|e| EditError::from_io(path, e))?;
        }
        let body = format!("# {title}\n\nThis page was created by live-edit.");
        fs::write(&abs, body).map_err(|e| EditError::from_io(path, e))?;
        Ok(abs)
    }
}
