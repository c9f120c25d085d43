//! Integration tests for manifest loading and variant generation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use piped_manifest::{
    generate_variant_manifests, ManifestError, ManifestLoader, ResourceKey, Variant,
    DEPLOYMENT_CONFIG_FILE_NAME, LABEL_VARIANT,
};
use tempfile::tempdir;

const DEPLOYMENT_AND_SERVICE: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: a
  namespace: shop
spec:
  replicas: 2
  selector:
    matchLabels:
      app: x
  template:
    metadata:
      labels:
        app: x
        tier: web
    spec:
      containers:
        - name: web
          image: nginx:1.25
---
apiVersion: v1
kind: Service
metadata:
  name: b
  namespace: shop
spec:
  selector:
    app: x
  ports:
    - port: 80
"#;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn kinds_and_names(manifests: &[piped_manifest::Manifest]) -> Vec<(String, String)> {
    manifests
        .iter()
        .map(|m| (m.kind().to_string(), m.name().to_string()))
        .collect()
}

/// Two documents in one file come back in order with their identities.
#[test]
fn test_load_two_document_file() {
    let temp = tempdir().unwrap();
    write(temp.path(), "app.yaml", DEPLOYMENT_AND_SERVICE);

    let manifests = ManifestLoader::new(temp.path()).load().unwrap();

    assert_eq!(
        kinds_and_names(&manifests),
        vec![
            ("Deployment".to_string(), "a".to_string()),
            ("Service".to_string(), "b".to_string()),
        ]
    );
    assert_eq!(
        manifests[0].resource_key(),
        ResourceKey::new("apps/v1", "Deployment", "shop", "a")
    );
}

/// Discovery is flat, filtered by extension, skips the config file and is sorted.
#[test]
fn test_discovery_rules() {
    let temp = tempdir().unwrap();
    write(temp.path(), "b-service.yml", "apiVersion: v1\nkind: Service\nmetadata:\n  name: b\n");
    write(temp.path(), "a-deploy.yaml", "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: a\n");
    write(temp.path(), "c-config.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: c\n");
    write(temp.path(), DEPLOYMENT_CONFIG_FILE_NAME, "apiVersion: pipecd.dev/v1beta1\nkind: KubernetesApp\n");
    write(temp.path(), "notes.txt", "not a manifest");
    fs::create_dir(temp.path().join("nested")).unwrap();
    write(
        &temp.path().join("nested"),
        "ignored.yaml",
        "apiVersion: v1\nkind: Secret\nmetadata:\n  name: hidden\n",
    );

    let loader = ManifestLoader::new(temp.path());
    assert_eq!(
        loader.discover().unwrap(),
        vec!["a-deploy.yaml", "b-service.yml", "c-config.yaml"]
    );

    let names: Vec<_> = loader
        .load()
        .unwrap()
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

/// An explicit file list is used as given, in its own order, without discovery.
#[test]
fn test_explicit_file_list() {
    let temp = tempdir().unwrap();
    write(temp.path(), "first.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: first\n");
    write(temp.path(), "second.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: second\n");
    write(temp.path(), "unlisted.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: unlisted\n");

    let manifests = ManifestLoader::new(temp.path())
        .with_files(["second.yaml", "first.yaml"])
        .load()
        .unwrap();

    let names: Vec<_> = manifests.iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["second", "first"]);
}

/// Empty segments between separators yield nothing.
#[test]
fn test_consecutive_separators() {
    let temp = tempdir().unwrap();
    write(temp.path(), "empty.yaml", "\n---\n---\n");
    write(
        temp.path(),
        "gaps.yaml",
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: one\n---\n---\n\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: two\n---\n",
    );

    let manifests = ManifestLoader::new(temp.path()).load().unwrap();
    let names: Vec<_> = manifests.iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["one", "two"]);
}

/// A single malformed chunk fails the whole load and names the file.
#[test]
fn test_parse_failure_aborts_load() {
    let temp = tempdir().unwrap();
    write(temp.path(), "a-good.yaml", DEPLOYMENT_AND_SERVICE);
    write(
        temp.path(),
        "b-bad.yaml",
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: ok\n---\nkind: [unterminated\n",
    );

    let err = ManifestLoader::new(temp.path()).load().unwrap_err();
    match &err {
        ManifestError::Load { path, .. } => assert!(path.ends_with("b-bad.yaml")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_parse());
    assert!(err.to_string().contains("b-bad.yaml"));
}

/// A listed file that does not exist is an IO failure naming the file.
#[test]
fn test_missing_listed_file() {
    let temp = tempdir().unwrap();
    let err = ManifestLoader::new(temp.path())
        .with_files(["missing.yaml"])
        .load()
        .unwrap_err();

    assert!(err.is_io());
    assert!(err.to_string().contains("missing.yaml"));
}

/// A readable file with bytes that are not UTF-8 is malformed content.
#[test]
fn test_non_utf8_file_is_parse_error() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("a.yaml"), [0xff, 0xfe]).unwrap();

    let err = ManifestLoader::new(temp.path()).load().unwrap_err();
    match &err {
        ManifestError::Load { path, .. } => assert!(path.ends_with("a.yaml")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_parse());
    assert!(!err.is_io());
}

/// Canary generation from loaded manifests leaves the loaded set untouched.
#[test]
fn test_canary_round() {
    let temp = tempdir().unwrap();
    write(temp.path(), "app.yaml", DEPLOYMENT_AND_SERVICE);

    let manifests = ManifestLoader::new(temp.path()).load().unwrap();
    let canaries = generate_variant_manifests(&manifests, Variant::Canary, Some(1)).unwrap();

    assert_eq!(canaries.len(), 1);
    let canary = &canaries[0];
    assert_eq!(canary.name(), "a-canary");

    let mut expected_match = BTreeMap::new();
    expected_match.insert("app".to_string(), "x".to_string());
    expected_match.insert(LABEL_VARIANT.to_string(), "canary".to_string());
    assert_eq!(canary.match_labels().unwrap(), expected_match);

    let mut expected_template = expected_match.clone();
    expected_template.insert("tier".to_string(), "web".to_string());
    assert_eq!(canary.template_labels().unwrap(), expected_template);

    // The loaded primary is unchanged.
    assert_eq!(manifests[0].name(), "a");
    assert!(!manifests[0].match_labels().unwrap().contains_key(LABEL_VARIANT));
    assert_eq!(manifests[0].replicas().unwrap(), Some(2));

    // Serialized output reloads to the same manifest.
    let text = canary.to_yaml().unwrap();
    let reloaded = piped_manifest::parse_manifests(&text).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(&reloaded[0], canary);
}
