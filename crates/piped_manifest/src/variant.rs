//! Workload variants for progressive rollout.
//!
//! Primary, canary and baseline copies of a workload run side by side. Each
//! copy carries the variant label on its pod selector and pod template so
//! that the copy only selects its own pods and routing resources can target
//! one variant at a time.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ManifestResult;
use crate::manifest::Manifest;

/// Label key that identifies the variant of a workload.
pub const LABEL_VARIANT: &str = "pipecd.dev/variant";

/// Annotation recording the variant a manifest was generated for.
pub const ANNOTATION_VARIANT: &str = "pipecd.dev/variant";
/// Annotation naming the component that owns a generated manifest.
pub const ANNOTATION_MANAGED_BY: &str = "pipecd.dev/managed-by";
/// Annotation holding the encoded key of the source manifest.
pub const ANNOTATION_RESOURCE_KEY: &str = "pipecd.dev/resource-key";

/// Value of [`ANNOTATION_MANAGED_BY`] on generated manifests.
pub const MANAGED_BY_PIPED: &str = "piped";

/// A simultaneously deployed instance of a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Primary,
    Canary,
    Baseline,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Primary => "primary",
            Variant::Canary => "canary",
            Variant::Baseline => "baseline",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "primary" => Some(Variant::Primary),
            "canary" => Some(Variant::Canary),
            "baseline" => Some(Variant::Baseline),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Variant::Primary, Variant::Canary, Variant::Baseline]
    }

    /// Name of this variant's copy of a resource called `base`.
    ///
    /// The primary keeps the original name.
    pub fn resource_name(&self, base: &str) -> String {
        match self {
            Variant::Primary => base.to_string(),
            other => format!("{}-{}", base, other.as_str()),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Applies one variant consistently to manifests.
#[derive(Debug, Clone, Copy)]
pub struct VariantLabeler {
    variant: Variant,
}

impl VariantLabeler {
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Label selector and template, and record the variant as an annotation.
    ///
    /// Either every change is applied or the manifest is left as it was.
    pub fn apply(&self, manifest: &mut Manifest) -> ManifestResult<()> {
        let mut staged = manifest.clone();
        staged.add_variant_label(self.variant.as_str())?;
        staged.add_annotations([(ANNOTATION_VARIANT, self.variant.as_str())])?;
        *manifest = staged;
        Ok(())
    }
}

/// Build this variant's copies of every workload in `manifests`.
///
/// Each workload is duplicated under [`Variant::resource_name`], labeled,
/// optionally rescaled, and annotated with its own resource key. Other kinds
/// are skipped. The inputs are not modified.
pub fn generate_variant_manifests(
    manifests: &[Manifest],
    variant: Variant,
    replicas: Option<u32>,
) -> ManifestResult<Vec<Manifest>> {
    let labeler = VariantLabeler::new(variant);
    let mut generated = Vec::new();

    for manifest in manifests.iter().filter(|m| m.is_workload()) {
        let mut copy = manifest.duplicate(variant.resource_name(manifest.name()))?;
        labeler.apply(&mut copy)?;
        if let Some(replicas) = replicas {
            copy.set_replicas(replicas)?;
        }
        let key = copy.resource_key().encode();
        copy.add_annotations([
            (ANNOTATION_MANAGED_BY, MANAGED_BY_PIPED.to_string()),
            (ANNOTATION_RESOURCE_KEY, key),
        ])?;
        debug!("Generated {} manifest {}", variant, copy.resource_key());
        generated.push(copy);
    }

    info!(
        "Generated {} {} manifest(s) from {} input(s)",
        generated.len(),
        variant,
        manifests.len()
    );
    Ok(generated)
}
