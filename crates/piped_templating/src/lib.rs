//! # piped_templating
//!
//! Templating dispatch for piped's Kubernetes applications.
//!
//! The manifests of an application are produced by one of three methods:
//! plain YAML files, a Helm chart, or a Kustomize overlay. The method is
//! resolved once per deployment round from the application's deployment
//! configuration and passed explicitly to the dispatcher.
//!
//! ## Features
//!
//! - Deployment configuration (`.pipe.yaml`) model
//! - Templating method resolution
//! - Pluggable [`ManifestProvider`] backends, with plain YAML built in
//!
//! ## Example
//!
//! ```rust,no_run
//! use piped_templating::{DeploymentConfig, TemplatingDispatcher};
//! use std::path::Path;
//!
//! let app_dir = Path::new("app");
//! let config = DeploymentConfig::load_or_default(app_dir).unwrap();
//!
//! let (method, manifests) = TemplatingDispatcher::new()
//!     .load_for_config(app_dir, &config)
//!     .unwrap();
//! println!("{} manifest(s) via {}", manifests.len(), method);
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod method;
pub mod provider;

pub use config::{
    DeploymentConfig, HelmChart, KubernetesAppSpec, KubernetesDeploymentInput,
    KIND_KUBERNETES_APP,
};
pub use dispatch::TemplatingDispatcher;
pub use error::{TemplatingError, TemplatingResult};
pub use method::TemplatingMethod;
pub use provider::{ManifestProvider, PlainYamlProvider};
