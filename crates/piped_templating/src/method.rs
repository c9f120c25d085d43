//! Templating method selection.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::KubernetesDeploymentInput;

/// File names that mark an application directory as a Kustomize overlay.
pub const KUSTOMIZATION_FILE_NAMES: &[&str] =
    &["kustomization.yaml", "kustomization.yml", "Kustomization"];

/// How the manifests of an application are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplatingMethod {
    /// Plain YAML files read as they are.
    #[default]
    #[serde(alias = "none")]
    Plain,
    /// Rendered from a Helm chart.
    Helm,
    /// Composed by Kustomize.
    Kustomize,
}

impl TemplatingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplatingMethod::Plain => "plain",
            TemplatingMethod::Helm => "helm",
            TemplatingMethod::Kustomize => "kustomize",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "none" => Some(TemplatingMethod::Plain),
            "helm" => Some(TemplatingMethod::Helm),
            "kustomize" => Some(TemplatingMethod::Kustomize),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            TemplatingMethod::Plain,
            TemplatingMethod::Helm,
            TemplatingMethod::Kustomize,
        ]
    }

    /// Resolve the method for one deployment round.
    ///
    /// An explicit `templatingMethod` wins. Otherwise a configured Helm chart
    /// selects Helm, a kustomization file in `app_dir` selects Kustomize, and
    /// anything else is plain YAML.
    pub fn determine(input: &KubernetesDeploymentInput, app_dir: &Path) -> Self {
        if let Some(method) = input.templating_method {
            return method;
        }
        if input.helm_chart.is_some() {
            return TemplatingMethod::Helm;
        }
        if KUSTOMIZATION_FILE_NAMES
            .iter()
            .any(|name| app_dir.join(name).is_file())
        {
            return TemplatingMethod::Kustomize;
        }
        TemplatingMethod::Plain
    }
}

impl std::fmt::Display for TemplatingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
