//! Manifest providers.

use std::path::Path;

use tracing::debug;

use piped_manifest::{Manifest, ManifestLoader};

use crate::config::KubernetesDeploymentInput;
use crate::error::TemplatingResult;
use crate::method::TemplatingMethod;

/// Produces the manifests of an application.
///
/// Helm and Kustomize backends live outside this crate and plug in through
/// this trait; [`PlainYamlProvider`] is the built-in implementation.
#[cfg_attr(test, mockall::automock)]
pub trait ManifestProvider: Send + Sync {
    /// The method this provider implements.
    fn method(&self) -> TemplatingMethod;

    /// Produce the ordered manifest list for the application in `app_dir`.
    fn load_manifests(
        &self,
        app_dir: &Path,
        input: &KubernetesDeploymentInput,
    ) -> TemplatingResult<Vec<Manifest>>;
}

/// Reads plain YAML manifests from the application directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainYamlProvider;

impl PlainYamlProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestProvider for PlainYamlProvider {
    fn method(&self) -> TemplatingMethod {
        TemplatingMethod::Plain
    }

    fn load_manifests(
        &self,
        app_dir: &Path,
        input: &KubernetesDeploymentInput,
    ) -> TemplatingResult<Vec<Manifest>> {
        debug!(
            "Loading plain manifests from {:?} ({} listed file(s))",
            app_dir,
            input.manifests.len()
        );
        let manifests = ManifestLoader::new(app_dir)
            .with_files(input.manifests.iter().cloned())
            .load()?;
        Ok(manifests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_plain_provider_uses_listed_files() {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join("a.yaml"),
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n",
        )
        .unwrap();
        std::fs::write(
            temp.path().join("b.yaml"),
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: b\n",
        )
        .unwrap();

        let input = KubernetesDeploymentInput {
            manifests: vec!["b.yaml".to_string()],
            ..Default::default()
        };
        let manifests = PlainYamlProvider::new()
            .load_manifests(temp.path(), &input)
            .unwrap();

        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].name(), "b");
    }
}
