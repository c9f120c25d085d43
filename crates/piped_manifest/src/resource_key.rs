//! Canonical resource identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, ManifestResult};

/// Separator between the fields of an encoded [`ResourceKey`].
pub const KEY_SEPARATOR: char = ':';

/// The 4-part identity of a deployable resource.
///
/// The text form is `apiVersion:kind:namespace:name`. Fields are not escaped,
/// so a key whose fields contain `:` does not decode back to itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKey {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Encode as `apiVersion:kind:namespace:name`.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode a key produced by [`ResourceKey::encode`].
    pub fn decode(text: &str) -> ManifestResult<Self> {
        let parts: Vec<&str> = text.split(KEY_SEPARATOR).collect();
        let [api_version, kind, namespace, name] = parts.as_slice() else {
            return Err(ManifestError::MalformedKey(format!(
                "{:?} has {} parts, expected 4",
                text,
                parts.len()
            )));
        };
        Ok(Self::new(*api_version, *kind, *namespace, *name))
    }

    /// Whether the encoded form of this key decodes back to an equal key.
    pub fn is_round_trippable(&self) -> bool {
        [&self.api_version, &self.kind, &self.namespace, &self.name]
            .iter()
            .all(|field| !field.contains(KEY_SEPARATOR))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.api_version,
            self.kind,
            self.namespace,
            self.name,
            sep = KEY_SEPARATOR
        )
    }
}

impl FromStr for ResourceKey {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
