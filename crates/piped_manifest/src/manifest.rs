//! Kubernetes manifest wrapper.
//!
//! A [`Manifest`] exclusively owns one [`Document`] and caches the four
//! identity fields read from it at construction time. The cache is refreshed
//! only by [`Manifest::duplicate`]; edits made through
//! [`Manifest::document_mut`] that touch `apiVersion`, `kind`,
//! `metadata.namespace` or `metadata.name` leave it stale.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::document::{Document, PathSegment};
use crate::error::{ManifestError, ManifestResult};
use crate::resource_key::ResourceKey;
use crate::variant::LABEL_VARIANT;

const API_VERSION: &[PathSegment<'static>] = &[PathSegment::Key("apiVersion")];
const KIND: &[PathSegment<'static>] = &[PathSegment::Key("kind")];
const NAMESPACE: &[PathSegment<'static>] =
    &[PathSegment::Key("metadata"), PathSegment::Key("namespace")];
const NAME: &[PathSegment<'static>] = &[PathSegment::Key("metadata"), PathSegment::Key("name")];
const LABELS: &[PathSegment<'static>] =
    &[PathSegment::Key("metadata"), PathSegment::Key("labels")];
const ANNOTATIONS: &[PathSegment<'static>] =
    &[PathSegment::Key("metadata"), PathSegment::Key("annotations")];
const REPLICAS: &[PathSegment<'static>] = &[PathSegment::Key("spec"), PathSegment::Key("replicas")];
const MATCH_LABELS: &[PathSegment<'static>] = &[
    PathSegment::Key("spec"),
    PathSegment::Key("selector"),
    PathSegment::Key("matchLabels"),
];
const TEMPLATE_LABELS: &[PathSegment<'static>] = &[
    PathSegment::Key("spec"),
    PathSegment::Key("template"),
    PathSegment::Key("metadata"),
    PathSegment::Key("labels"),
];

/// Kinds that run pods from a template and carry a replica count.
pub const WORKLOAD_KINDS: &[&str] = &["Deployment", "StatefulSet", "ReplicaSet", "DaemonSet"];

/// One resource document plus its cached identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    api_version: String,
    kind: String,
    namespace: String,
    name: String,
    document: Document,
}

impl Manifest {
    /// Build a manifest from a parsed document.
    ///
    /// The root must be a mapping with a non-empty `kind`. Missing
    /// `apiVersion`, `metadata.namespace` or `metadata.name` become empty
    /// strings.
    pub fn from_document(document: Document) -> ManifestResult<Self> {
        if !document.as_value().is_mapping() {
            return Err(ManifestError::Parse(
                "document root must be a mapping".to_string(),
            ));
        }
        let kind = document.get_str(KIND)?.unwrap_or_default().to_string();
        if kind.is_empty() {
            return Err(ManifestError::Parse("object 'kind' is missing".to_string()));
        }

        Ok(Self {
            api_version: document.get_str(API_VERSION)?.unwrap_or_default().to_string(),
            namespace: document.get_str(NAMESPACE)?.unwrap_or_default().to_string(),
            name: document.get_str(NAME)?.unwrap_or_default().to_string(),
            kind,
            document,
        })
    }

    /// Parse a single YAML document into a manifest.
    pub fn from_yaml(text: &str) -> ManifestResult<Self> {
        Self::from_document(Document::from_yaml(text)?)
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Empty for cluster-scoped resources.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the underlying tree.
    ///
    /// Identity fields changed through this handle are not reflected in
    /// [`Manifest::resource_key`].
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Whether this kind runs pods from a template.
    pub fn is_workload(&self) -> bool {
        WORKLOAD_KINDS.contains(&self.kind.as_str())
    }

    /// The identity built from the cached fields.
    pub fn resource_key(&self) -> ResourceKey {
        ResourceKey::new(&self.api_version, &self.kind, &self.namespace, &self.name)
    }

    /// Deep-copy this manifest under a new name.
    ///
    /// Namespace and kind are kept. The original is never modified, and the
    /// copy shares no structure with it.
    pub fn duplicate(&self, name: impl Into<String>) -> ManifestResult<Manifest> {
        let name = name.into();
        let mut document = self.document.deep_copy();
        document.set(NAME, Value::String(name.clone()))?;
        debug!("Duplicated {} as {}", self.resource_key(), name);

        Ok(Manifest {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            namespace: self.namespace.clone(),
            name,
            document,
        })
    }

    /// Merge `entries` into `metadata.annotations`.
    ///
    /// Does nothing when `entries` is empty. New values replace existing
    /// ones with the same key; other keys are kept.
    pub fn add_annotations<I, K, V>(&mut self, entries: I) -> ManifestResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            return Ok(());
        }

        let mut annotations = self
            .document
            .get_mapping(ANNOTATIONS)?
            .cloned()
            .unwrap_or_default();
        for (key, value) in entries {
            annotations.insert(Value::String(key.into()), Value::String(value.into()));
        }
        self.document.set(ANNOTATIONS, Value::Mapping(annotations))
    }

    /// Write `spec.replicas`.
    ///
    /// Applies to any kind, including ones where the field means nothing;
    /// use [`Manifest::is_workload`] to guard if that matters.
    pub fn set_replicas(&mut self, replicas: u32) -> ManifestResult<()> {
        self.document
            .set(REPLICAS, Value::Number(u64::from(replicas).into()))
    }

    /// Add the variant label to both the pod selector and the pod template.
    ///
    /// Existing labels at both locations are preserved. If either location
    /// holds something other than a mapping, nothing is written.
    pub fn add_variant_label(&mut self, variant: &str) -> ManifestResult<()> {
        let mut match_labels = self.mapping_or_empty(MATCH_LABELS)?;
        let mut template_labels = self.mapping_or_empty(TEMPLATE_LABELS)?;
        self.document.check_writable(MATCH_LABELS)?;
        self.document.check_writable(TEMPLATE_LABELS)?;

        let key = Value::String(LABEL_VARIANT.to_string());
        let value = Value::String(variant.to_string());
        match_labels.insert(key.clone(), value.clone());
        template_labels.insert(key, value);

        self.document.set(MATCH_LABELS, Value::Mapping(match_labels))?;
        self.document
            .set(TEMPLATE_LABELS, Value::Mapping(template_labels))
    }

    fn mapping_or_empty(&self, path: &[PathSegment<'_>]) -> ManifestResult<Mapping> {
        Ok(self.document.get_mapping(path)?.cloned().unwrap_or_default())
    }

    pub fn labels(&self) -> ManifestResult<BTreeMap<String, String>> {
        self.document.get_string_map(LABELS)
    }

    pub fn annotations(&self) -> ManifestResult<BTreeMap<String, String>> {
        self.document.get_string_map(ANNOTATIONS)
    }

    /// Labels under `spec.selector.matchLabels`.
    pub fn match_labels(&self) -> ManifestResult<BTreeMap<String, String>> {
        self.document.get_string_map(MATCH_LABELS)
    }

    /// Labels under `spec.template.metadata.labels`.
    pub fn template_labels(&self) -> ManifestResult<BTreeMap<String, String>> {
        self.document.get_string_map(TEMPLATE_LABELS)
    }

    pub fn replicas(&self) -> ManifestResult<Option<i64>> {
        self.document.get_i64(REPLICAS)
    }

    /// Serialize the owned document as YAML.
    pub fn to_yaml(&self) -> ManifestResult<String> {
        self.document.to_yaml()
    }

    /// Serialize the owned document as JSON.
    pub fn to_json(&self) -> ManifestResult<String> {
        self.document.to_json()
    }
}
