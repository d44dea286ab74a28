// Concrete asset resolvers used by the binary.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::engine::selector::AssetResolver;

/// Treats every image as available. Used when no asset directory is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl AssetResolver for AcceptAll {
    fn resolve<'a>(&'a self, _image_ref: &'a str) -> BoxFuture<'a, bool> {
        futures::future::ready(true).boxed()
    }
}

/// Resolves an image ref to a file in a local mirror of the image CDN,
/// keyed by the last path segment of the ref.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path for an image ref, or None if the ref has no usable file name.
    pub fn local_path(&self, image_ref: &str) -> Option<PathBuf> {
        let without_query = image_ref.split(['?', '#']).next().unwrap_or_default();
        let file_name = without_query.rsplit('/').next().unwrap_or_default();
        if file_name.is_empty() || file_name == "." || file_name == ".." {
            return None;
        }
        Some(self.root.join(file_name))
    }
}

impl AssetResolver for DirectoryResolver {
    fn resolve<'a>(&'a self, image_ref: &'a str) -> BoxFuture<'a, bool> {
        async move {
            let Some(path) = self.local_path(image_ref) else {
                return false;
            };
            match tokio::fs::try_exists(&path).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::debug!("Could not probe {}: {e}", path.display());
                    false
                }
            }
        }
        .boxed()
    }
}
