//! Plain YAML manifest loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::document::Document;
use crate::error::{ManifestError, ManifestResult};
use crate::manifest::Manifest;

/// Deployment configuration file kept next to the manifests. Never loaded
/// as a manifest.
pub const DEPLOYMENT_CONFIG_FILE_NAME: &str = ".pipe.yaml";

/// Extensions recognised as manifest files during discovery.
pub const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Separator between documents in a multi-document file.
pub const DOCUMENT_SEPARATOR: &str = "\n---";

/// Loads manifests from an application directory.
pub struct ManifestLoader {
    app_dir: PathBuf,
    files: Vec<String>,
}

impl ManifestLoader {
    /// Create a loader that discovers manifest files in `app_dir`.
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            files: Vec::new(),
        }
    }

    /// Load exactly these files, in this order, instead of discovering.
    ///
    /// An empty list keeps discovery enabled.
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// The file names that [`ManifestLoader::load`] will read, in order.
    pub fn file_names(&self) -> ManifestResult<Vec<String>> {
        if self.files.is_empty() {
            self.discover()
        } else {
            Ok(self.files.clone())
        }
    }

    /// List manifest files directly inside the application directory.
    ///
    /// Subdirectories are not descended into and the deployment
    /// configuration file is skipped. Names are sorted so the result does
    /// not depend on filesystem listing order.
    pub fn discover(&self) -> ManifestResult<Vec<String>> {
        let mut names = Vec::new();

        for entry in WalkDir::new(&self.app_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == DEPLOYMENT_CONFIG_FILE_NAME || !is_manifest_file(entry.path()) {
                continue;
            }
            names.push(name);
        }

        debug!("Discovered {} manifest file(s) in {:?}", names.len(), self.app_dir);
        Ok(names)
    }

    /// Load every manifest from every file.
    ///
    /// Manifests are returned in file order, then document order within a
    /// file. The first failure aborts the load.
    pub fn load(&self) -> ManifestResult<Vec<Manifest>> {
        let names = self.file_names()?;
        let mut manifests = Vec::with_capacity(names.len());

        for name in &names {
            let path = self.app_dir.join(name);
            let loaded =
                load_manifests_from_file(&path).map_err(|e| ManifestError::at_path(&path, e))?;
            manifests.extend(loaded);
        }

        info!(
            "Loaded {} manifest(s) from {} file(s) in {:?}",
            manifests.len(),
            names.len(),
            self.app_dir
        );
        Ok(manifests)
    }
}

fn is_manifest_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| MANIFEST_EXTENSIONS.contains(&ext))
}

/// Read one file and parse every document in it.
pub fn load_manifests_from_file(path: impl AsRef<Path>) -> ManifestResult<Vec<Manifest>> {
    let path = path.as_ref();
    debug!("Loading manifests from {:?}", path);

    let bytes = fs::read(path)?;
    let content = String::from_utf8(bytes)
        .map_err(|e| ManifestError::Parse(format!("content is not valid UTF-8: {}", e)))?;
    parse_manifests(&content)
}

/// Parse every document of a multi-document YAML text.
pub fn parse_manifests(content: &str) -> ManifestResult<Vec<Manifest>> {
    split_documents(content)
        .map(|chunk| Manifest::from_document(Document::from_yaml(chunk)?))
        .collect()
}

/// Split multi-document text on [`DOCUMENT_SEPARATOR`].
///
/// Chunks are trimmed and empty ones dropped. A separator on the very first
/// line has no preceding newline and is therefore not recognised.
pub fn split_documents(content: &str) -> impl Iterator<Item = &str> {
    content
        .split(DOCUMENT_SEPARATOR)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_split_documents() {
        let text = "a: 1\n---\nb: 2\n---\n\n---\nc: 3\n---\n";
        let chunks: Vec<_> = split_documents(text).collect();
        assert_eq!(chunks, vec!["a: 1", "b: 2", "c: 3"]);
    }

    #[test]
    fn test_split_only_separators() {
        assert_eq!(split_documents("\n---\n---\n").count(), 0);
        assert_eq!(split_documents("").count(), 0);
        assert_eq!(split_documents("   \n\t").count(), 0);
    }

    #[test]
    fn test_leading_separator_is_kept_in_first_chunk() {
        // No newline before the first "---", so it is not split off.
        let chunks: Vec<_> = split_documents("---\nkind: A\n---\nkind: B").collect();
        assert_eq!(chunks, vec!["---\nkind: A", "kind: B"]);
    }

    #[test]
    fn test_parse_two_documents() {
        let text = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: a\n---\napiVersion: v1\nkind: Service\nmetadata:\n  name: b\n";
        let manifests = parse_manifests(text).unwrap();
        assert_eq!(manifests.len(), 2);
        assert_eq!((manifests[0].kind(), manifests[0].name()), ("Deployment", "a"));
        assert_eq!((manifests[1].kind(), manifests[1].name()), ("Service", "b"));
    }

    #[test]
    fn test_loader_empty_dir() {
        let temp = tempdir().unwrap();
        let loader = ManifestLoader::new(temp.path());
        assert!(loader.load().unwrap().is_empty());
    }

    #[test]
    fn test_loader_missing_dir_is_io_error() {
        let temp = tempdir().unwrap();
        let loader = ManifestLoader::new(temp.path().join("missing"));
        let err = loader.load().unwrap_err();
        assert!(err.is_io(), "unexpected error: {err:?}");
    }

    #[test]
    fn test_is_manifest_file() {
        assert!(is_manifest_file(Path::new("a.yaml")));
        assert!(is_manifest_file(Path::new("dir/a.yml")));
        assert!(!is_manifest_file(Path::new("a.json")));
        assert!(!is_manifest_file(Path::new("README")));
    }
}
