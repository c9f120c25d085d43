//! Deployment configuration for Kubernetes applications.
//!
//! The configuration lives in [`DEPLOYMENT_CONFIG_FILE_NAME`] inside the
//! application directory:
//!
//! ```yaml
//! apiVersion: pipecd.dev/v1beta1
//! kind: KubernetesApp
//! spec:
//!   input:
//!     manifests:
//!       - deployment.yaml
//!       - service.yaml
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use piped_manifest::DEPLOYMENT_CONFIG_FILE_NAME;

use crate::error::{TemplatingError, TemplatingResult};
use crate::method::TemplatingMethod;

/// Kind accepted in the deployment configuration file.
pub const KIND_KUBERNETES_APP: &str = "KubernetesApp";

/// Top-level deployment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub spec: KubernetesAppSpec,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            api_version: "pipecd.dev/v1beta1".to_string(),
            kind: KIND_KUBERNETES_APP.to_string(),
            spec: KubernetesAppSpec::default(),
        }
    }
}

impl DeploymentConfig {
    /// Parse and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> TemplatingResult<Self> {
        let path = path.as_ref();
        debug!("Reading deployment configuration from {:?}", path);

        let content = fs::read_to_string(path)?;
        let config: DeploymentConfig =
            serde_yaml::from_str(&content).map_err(|e| TemplatingError::InvalidConfig {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if config.kind != KIND_KUBERNETES_APP {
            return Err(TemplatingError::InvalidConfig {
                path: path.to_path_buf(),
                message: format!(
                    "unsupported kind {:?}, expected {:?}",
                    config.kind, KIND_KUBERNETES_APP
                ),
            });
        }
        Ok(config)
    }

    /// Read the configuration from `app_dir`, or use defaults when the
    /// application has none.
    pub fn load_or_default(app_dir: impl AsRef<Path>) -> TemplatingResult<Self> {
        let path = app_dir.as_ref().join(DEPLOYMENT_CONFIG_FILE_NAME);
        if !path.exists() {
            debug!("No deployment configuration at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn input(&self) -> &KubernetesDeploymentInput {
        &self.spec.input
    }

    pub fn with_manifests<I, S>(mut self, manifests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.input.manifests = manifests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_templating_method(mut self, method: TemplatingMethod) -> Self {
        self.spec.input.templating_method = Some(method);
        self
    }
}

/// Application spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesAppSpec {
    #[serde(default)]
    pub input: KubernetesDeploymentInput,
}

/// Where the manifests of an application come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesDeploymentInput {
    /// Manifest files to load, in order. Empty means discover.
    #[serde(default)]
    pub manifests: Vec<String>,
    /// Explicit templating method, overriding detection.
    #[serde(default)]
    pub templating_method: Option<TemplatingMethod>,
    /// Helm chart to render.
    #[serde(default)]
    pub helm_chart: Option<HelmChart>,
    /// Kustomize version used by the overlay backend.
    #[serde(default)]
    pub kustomize_version: Option<String>,
    /// Namespace applied to resources without one.
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Helm chart location, from git, a repository, or a local path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmChart {
    #[serde(default)]
    pub git_remote: Option<String>,
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(DEPLOYMENT_CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
apiVersion: pipecd.dev/v1beta1
kind: KubernetesApp
spec:
  input:
    manifests:
      - deployment.yaml
      - service.yaml
    templatingMethod: none
    namespace: shop
"#,
        )
        .unwrap();

        let config = DeploymentConfig::from_file(&path).unwrap();
        assert_eq!(config.input().manifests, vec!["deployment.yaml", "service.yaml"]);
        assert_eq!(config.input().templating_method, Some(TemplatingMethod::Plain));
        assert_eq!(config.input().namespace.as_deref(), Some("shop"));
    }

    #[test]
    fn test_parse_helm_chart() {
        let config: DeploymentConfig = serde_yaml::from_str(
            r#"
apiVersion: pipecd.dev/v1beta1
kind: KubernetesApp
spec:
  input:
    helmChart:
      gitRemote: git@github.com:org/charts.git
      ref: v1.2.0
      path: charts/web
"#,
        )
        .unwrap();

        let chart = config.input().helm_chart.as_ref().unwrap();
        assert_eq!(chart.git_ref.as_deref(), Some("v1.2.0"));
        assert_eq!(chart.path.as_deref(), Some("charts/web"));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(DEPLOYMENT_CONFIG_FILE_NAME);
        fs::write(&path, "apiVersion: pipecd.dev/v1beta1\nkind: TerraformApp\n").unwrap();

        let err = DeploymentConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, TemplatingError::InvalidConfig { .. }));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = tempdir().unwrap();
        let config = DeploymentConfig::load_or_default(temp.path()).unwrap();
        assert_eq!(config.kind, KIND_KUBERNETES_APP);
        assert!(config.input().manifests.is_empty());
        assert!(config.input().templating_method.is_none());
    }

    #[test]
    fn test_builder() {
        let config = DeploymentConfig::default()
            .with_manifests(["a.yaml"])
            .with_templating_method(TemplatingMethod::Kustomize);
        assert_eq!(config.input().manifests, vec!["a.yaml"]);
        assert_eq!(
            config.input().templating_method,
            Some(TemplatingMethod::Kustomize)
        );
    }
}
