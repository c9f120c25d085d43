//! Key command - Encode or decode resource keys.

use anyhow::Result;
use clap::{Args, Subcommand};

use piped_manifest::ResourceKey;

#[derive(Args)]
pub struct KeyArgs {
    #[command(subcommand)]
    command: KeyCommand,
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Print the encoded key for a resource
    Encode {
        api_version: String,
        kind: String,
        /// Empty string for cluster-scoped resources
        namespace: String,
        name: String,
    },

    /// Split an encoded key into its fields
    Decode { key: String },
}

pub fn execute(args: KeyArgs) -> Result<()> {
    match args.command {
        KeyCommand::Encode {
            api_version,
            kind,
            namespace,
            name,
        } => {
            let key = ResourceKey::new(api_version, kind, namespace, name);
            if !key.is_round_trippable() {
                tracing::warn!("Key {} contains ':' inside a field and will not decode", key);
            }
            println!("{}", key.encode());
        }
        KeyCommand::Decode { key } => {
            let key = ResourceKey::decode(&key)?;
            println!("apiVersion: {}", key.api_version);
            println!("kind:       {}", key.kind);
            println!("namespace:  {}", key.namespace);
            println!("name:       {}", key.name);
        }
    }
    Ok(())
}
