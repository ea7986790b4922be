//! Path resolution between site-relative page paths and the docs root
//!
//! Every mutation goes through [`resolve`] first, so a client can never
//! reach a file outside the configured docs directory. [`SiteUrls`] is the
//! seam to the site builder's path-to-URL mapping; [`DirectoryUrls`] is the
//! directory-URL convention most docs builders use.

use crate::error::EditError;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Resolve a site-relative, forward-slash page path against the docs root.
///
/// The result is lexically normalized. Absolute inputs and `..` segments
/// that would climb above `root` fail with `InvalidPath`.
pub fn resolve(root: &Utf8Path, relative: &str) -> Result<Utf8PathBuf, EditError> {
    let rel = Utf8Path::new(relative);
    if relative.is_empty() || rel.is_absolute() || relative.starts_with('/') {
        return Err(EditError::invalid_path(relative));
    }

    let mut resolved = root.to_owned();
    let mut depth = 0usize;
    for component in rel.components() {
        match component {
            Utf8Component::Normal(segment) => {
                resolved.push(segment);
                depth += 1;
            }
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if depth == 0 {
                    return Err(EditError::invalid_path(relative));
                }
                depth -= 1;
                resolved.pop();
            }
            // RootDir / Prefix cannot appear in a relative path, but a
            // crafted frame could still smuggle one in on Windows.
            _ => return Err(EditError::invalid_path(relative)),
        }
    }

    if depth == 0 {
        // Normalized away to the root itself ("." or "a/..")
        return Err(EditError::invalid_path(relative));
    }

    Ok(resolved)
}

/// The site builder's source-path-to-canonical-URL mapping.
///
/// The builder itself is an external collaborator; the editing core only
/// needs to ask it where a source file ends up in the rendered site.
pub trait SiteUrls: Send + Sync {
    /// Canonical URL for a source file, or `None` if it does not render
    /// to a page.
    fn url_for(&self, source: &Utf8Path) -> Option<String>;
}

/// Directory-style URLs: `index.md` becomes `/`, `guide/intro.md` becomes
/// `/guide/intro/`, `guide/index.md` becomes `/guide/`.
pub struct DirectoryUrls {
    root: Utf8PathBuf,
}

impl DirectoryUrls {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }
}

impl SiteUrls for DirectoryUrls {
    fn url_for(&self, source: &Utf8Path) -> Option<String> {
        let relative = source.strip_prefix(&self.root).ok()?;
        if relative.extension() != Some("md") {
            return None;
        }

        let stem = relative.with_extension("");
        let mut segments: Vec<&str> = stem
            .components()
            .filter_map(|c| match c {
                Utf8Component::Normal(s) => Some(s),
                _ => None,
            })
            .collect();

        if segments.last() == Some(&"index") {
            segments.pop();
        }

        if segments.is_empty() {
            Some("/".to_string())
        } else {
            Some(format!("/{}/", segments.join("/")))
        }
    }
}
