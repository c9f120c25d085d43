//! # piped_manifest
//!
//! Kubernetes manifest model for piped.
//!
//! This crate loads resource documents from an application directory, gives
//! each a canonical identity, and mutates them safely for progressive rollout:
//!
//! - Schema-less document trees with path-based access
//! - Manifests with cached `apiVersion`/`kind`/`namespace`/`name` identity
//! - Resource keys for diffing and deduplication
//! - Deep-copy duplication and variant labeling (primary, canary, baseline)
//!
//! ## Example
//!
//! ```rust,no_run
//! use piped_manifest::{ManifestLoader, Variant, VariantLabeler};
//!
//! let manifests = ManifestLoader::new("app").load().unwrap();
//!
//! for manifest in manifests.iter().filter(|m| m.is_workload()) {
//!     let mut canary = manifest.duplicate(format!("{}-canary", manifest.name())).unwrap();
//!     VariantLabeler::new(Variant::Canary).apply(&mut canary).unwrap();
//!     canary.set_replicas(1).unwrap();
//!     println!("{}", canary.to_yaml().unwrap());
//! }
//! ```

pub mod document;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod resource_key;
pub mod variant;

pub use document::{Document, PathSegment};
pub use error::{ManifestError, ManifestResult};
pub use loader::{
    load_manifests_from_file, parse_manifests, split_documents, ManifestLoader,
    DEPLOYMENT_CONFIG_FILE_NAME,
};
pub use manifest::{Manifest, WORKLOAD_KINDS};
pub use resource_key::ResourceKey;
pub use variant::{generate_variant_manifests, Variant, VariantLabeler, LABEL_VARIANT};
