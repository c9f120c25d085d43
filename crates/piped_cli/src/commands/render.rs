//! Render command - Load an application's manifests and print them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use piped_manifest::{generate_variant_manifests, Manifest, Variant};
use piped_templating::{DeploymentConfig, TemplatingDispatcher, TemplatingMethod};

#[derive(Args)]
pub struct RenderArgs {
    /// Application directory holding the manifests and .pipe.yaml
    #[arg(short, long, default_value = ".")]
    app_dir: PathBuf,

    /// Manifest file to load, relative to the application directory (repeatable)
    #[arg(short, long = "file")]
    files: Vec<String>,

    /// Templating method (plain, helm, kustomize); detected when omitted
    #[arg(long, value_parser = parse_templating_method)]
    templating: Option<TemplatingMethod>,

    /// Print this variant's copies of the workloads instead of the manifests
    #[arg(long, value_parser = parse_variant)]
    variant: Option<Variant>,

    /// Replica count for the generated variant
    #[arg(long, requires = "variant")]
    replicas: Option<u32>,

    /// Annotation added to every printed manifest (KEY=VALUE, repeatable)
    #[arg(long = "annotation", value_parser = parse_annotation)]
    annotations: Vec<(String, String)>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

fn parse_templating_method(s: &str) -> Result<TemplatingMethod, String> {
    TemplatingMethod::from_str(s)
        .ok_or_else(|| format!("unknown templating method {:?} (plain, helm, kustomize)", s))
}

fn parse_variant(s: &str) -> Result<Variant, String> {
    Variant::from_str(s).ok_or_else(|| format!("unknown variant {:?} (primary, canary, baseline)", s))
}

fn parse_annotation(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {:?}", s)),
    }
}

pub fn execute(args: RenderArgs) -> Result<()> {
    let output = render(&args)?;
    print!("{}", output);
    Ok(())
}

/// Load, transform and serialize according to `args`.
pub fn render(args: &RenderArgs) -> Result<String> {
    let mut config = DeploymentConfig::load_or_default(&args.app_dir)
        .with_context(|| format!("Failed to read deployment configuration in {:?}", args.app_dir))?;
    if !args.files.is_empty() {
        config = config.with_manifests(args.files.iter().cloned());
    }
    if let Some(method) = args.templating {
        config = config.with_templating_method(method);
    }

    let (method, manifests) = TemplatingDispatcher::new()
        .load_for_config(&args.app_dir, &config)
        .with_context(|| format!("Failed to load manifests from {:?}", args.app_dir))?;
    info!("Loaded {} manifest(s) using {}", manifests.len(), method);

    let mut manifests = match args.variant {
        Some(variant) => generate_variant_manifests(&manifests, variant, args.replicas)?,
        None => manifests,
    };
    for manifest in &mut manifests {
        manifest
            .add_annotations(args.annotations.iter().cloned())
            .with_context(|| format!("Failed to annotate {}", manifest.resource_key()))?;
    }

    match args.format {
        OutputFormat::Yaml => to_yaml_stream(&manifests),
        OutputFormat::Json => {
            let values: Vec<_> = manifests.iter().map(|m| m.document().as_value()).collect();
            Ok(serde_json::to_string_pretty(&values)? + "\n")
        }
    }
}

fn to_yaml_stream(manifests: &[Manifest]) -> Result<String> {
    let mut out = String::new();
    for (i, manifest) in manifests.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n");
        }
        out.push_str(&manifest.to_yaml()?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use piped_manifest::{parse_manifests, LABEL_VARIANT};
    use tempfile::tempdir;

    const APP: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  replicas: 3
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
---
apiVersion: v1
kind: Service
metadata:
  name: web
"#;

    fn args(app_dir: PathBuf) -> RenderArgs {
        RenderArgs {
            app_dir,
            files: Vec::new(),
            templating: None,
            variant: None,
            replicas: None,
            annotations: Vec::new(),
            format: OutputFormat::Yaml,
        }
    }

    #[test]
    fn test_render_plain() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("app.yaml"), APP).unwrap();

        let output = render(&args(temp.path().to_path_buf())).unwrap();
        let manifests = parse_manifests(&output).unwrap();
        assert_eq!(manifests.len(), 2);
        assert_eq!(manifests[1].kind(), "Service");
    }

    #[test]
    fn test_render_canary_with_annotation() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("app.yaml"), APP).unwrap();

        let mut render_args = args(temp.path().to_path_buf());
        render_args.variant = Some(Variant::Canary);
        render_args.replicas = Some(1);
        render_args.annotations = vec![("commit".to_string(), "abc123".to_string())];

        let output = render(&render_args).unwrap();
        let manifests = parse_manifests(&output).unwrap();
        assert_eq!(manifests.len(), 1);

        let canary = &manifests[0];
        assert_eq!(canary.name(), "web-canary");
        assert_eq!(canary.replicas().unwrap(), Some(1));
        assert_eq!(canary.match_labels().unwrap()[LABEL_VARIANT], "canary");
        assert_eq!(canary.annotations().unwrap()["commit"], "abc123");
    }

    #[test]
    fn test_render_json() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("app.yaml"), APP).unwrap();

        let mut render_args = args(temp.path().to_path_buf());
        render_args.format = OutputFormat::Json;

        let output = render(&render_args).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["metadata"]["name"], "web");
    }

    #[test]
    fn test_parse_annotation() {
        assert_eq!(
            parse_annotation("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_annotation("novalue").is_err());
        assert!(parse_annotation("=x").is_err());
    }
}
