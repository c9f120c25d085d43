//! CLI command definitions.
//!
//! This module defines the command structure for the piped manifest CLI.

use clap::{Parser, Subcommand};

pub mod key;
pub mod render;

/// piped-manifest - render Kubernetes manifests and rollout variants
#[derive(Parser)]
#[command(name = "piped-manifest")]
#[command(version, about = "Render Kubernetes manifests and rollout variants")]
#[command(long_about = r#"
Loads the Kubernetes manifests of an application directory the way piped does
during a deployment round, and prints them, optionally as the primary, canary
or baseline variant of every workload.

COMMANDS:
  render   → Load manifests and print them (optionally as a variant)
  key      → Encode or decode resource keys

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Manifest load or parse error
  4 - Templating error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load an application's manifests and print them
    Render(render::RenderArgs),

    /// Encode or decode a resource key
    Key(key::KeyArgs),
}
