//! Templating dispatch.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use piped_manifest::Manifest;

use crate::config::{DeploymentConfig, KubernetesDeploymentInput};
use crate::error::{TemplatingError, TemplatingResult};
use crate::method::TemplatingMethod;
use crate::provider::{ManifestProvider, PlainYamlProvider};

/// Routes manifest loading to the provider for a templating method.
///
/// Plain YAML is always available. Helm and Kustomize only work once a
/// backend has been registered with [`TemplatingDispatcher::with_backend`].
pub struct TemplatingDispatcher {
    backends: HashMap<TemplatingMethod, Arc<dyn ManifestProvider>>,
}

impl Default for TemplatingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplatingDispatcher {
    pub fn new() -> Self {
        let mut backends: HashMap<TemplatingMethod, Arc<dyn ManifestProvider>> = HashMap::new();
        backends.insert(TemplatingMethod::Plain, Arc::new(PlainYamlProvider::new()));
        Self { backends }
    }

    /// Register (or replace) the provider for the method it reports.
    pub fn with_backend(mut self, provider: Arc<dyn ManifestProvider>) -> Self {
        self.backends.insert(provider.method(), provider);
        self
    }

    /// Whether a provider is registered for `method`.
    pub fn supports(&self, method: TemplatingMethod) -> bool {
        self.backends.contains_key(&method)
    }

    /// Load manifests with an already resolved method.
    pub fn load_manifests(
        &self,
        method: TemplatingMethod,
        app_dir: &Path,
        input: &KubernetesDeploymentInput,
    ) -> TemplatingResult<Vec<Manifest>> {
        let provider = self
            .backends
            .get(&method)
            .ok_or(TemplatingError::BackendUnavailable(method))?;

        info!("Loading manifests for {:?} using {}", app_dir, method);
        provider.load_manifests(app_dir, input)
    }

    /// Resolve the method from `config` once, then load.
    pub fn load_for_config(
        &self,
        app_dir: &Path,
        config: &DeploymentConfig,
    ) -> TemplatingResult<(TemplatingMethod, Vec<Manifest>)> {
        let method = TemplatingMethod::determine(config.input(), app_dir);
        let manifests = self.load_manifests(method, app_dir, config.input())?;
        Ok((method, manifests))
    }
}
