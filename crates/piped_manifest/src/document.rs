//! Schema-less structured documents.
//!
//! A [`Document`] owns one YAML tree of mappings, sequences and scalars and
//! exposes path-based accessors over it. Nothing about the shape of the tree
//! is assumed: every read and write names the exact path it touches and gets
//! back either a typed value or a traversal error. Values are never coerced
//! from one type to another.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use serde_yaml::{Mapping, Value};

use crate::error::{ManifestError, ManifestResult};

/// One step of a path into a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathSegment<'a> {
    /// Look up a key in a mapping.
    Key(&'a str),
    /// Look up an element of a sequence.
    Index(usize),
}

impl<'a> From<&'a str> for PathSegment<'a> {
    fn from(key: &'a str) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment<'_> {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Build a key-only path, e.g. `path(&["spec", "replicas"])`.
pub fn path<'a>(keys: &[&'a str]) -> Vec<PathSegment<'a>> {
    keys.iter().copied().map(PathSegment::Key).collect()
}

/// Render a path as `spec.containers[0].image`.
pub fn display_path(path: &[PathSegment<'_>]) -> String {
    if path.is_empty() {
        return "<root>".to_string();
    }
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(index) => {
                let _ = write!(out, "[{}]", index);
            }
        }
    }
    out
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn traversal(path: &[PathSegment<'_>], message: impl Into<String>) -> ManifestError {
    ManifestError::Traversal {
        path: display_path(path),
        message: message.into(),
    }
}

fn expected(path: &[PathSegment<'_>], expected: &str, found: &Value) -> ManifestError {
    traversal(
        path,
        format!("expected a {}, found a {}", expected, kind_of(found)),
    )
}

fn container_for(segment: &PathSegment<'_>) -> &'static str {
    match segment {
        PathSegment::Key(_) => "mapping",
        PathSegment::Index(_) => "sequence",
    }
}

/// A mutable, schema-less document tree.
///
/// Cloning a `Document` is a deep copy: the tree owns all of its nodes and
/// shares nothing with the source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Wrap an existing value tree.
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a single YAML document.
    pub fn from_yaml(text: &str) -> ManifestResult<Self> {
        let root: Value = serde_yaml::from_str(text)?;
        Ok(Self { root })
    }

    /// The root of the tree.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Deep copy of the whole tree.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// Read the value at `path`.
    ///
    /// Returns `Ok(None)` when any step of the path is absent or `null`, and a
    /// traversal error when an intermediate node is a container of the wrong
    /// kind or a scalar.
    pub fn get(&self, path: &[PathSegment<'_>]) -> ManifestResult<Option<&Value>> {
        let mut current = &self.root;
        for (depth, segment) in path.iter().enumerate() {
            let next = match (segment, current) {
                (_, Value::Null) => return Ok(None),
                (PathSegment::Key(key), Value::Mapping(map)) => map.get(*key),
                (PathSegment::Index(index), Value::Sequence(seq)) => seq.get(*index),
                (segment, other) => {
                    return Err(expected(&path[..depth], container_for(segment), other))
                }
            };
            match next {
                Some(value) => current = value,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Read a mapping at `path`; absent or `null` yields `None`.
    pub fn get_mapping(&self, path: &[PathSegment<'_>]) -> ManifestResult<Option<&Mapping>> {
        match self.get(path)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Mapping(map)) => Ok(Some(map)),
            Some(other) => Err(expected(path, "mapping", other)),
        }
    }

    /// Read a string at `path`; absent or `null` yields `None`.
    pub fn get_str(&self, path: &[PathSegment<'_>]) -> ManifestResult<Option<&str>> {
        match self.get(path)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(expected(path, "string", other)),
        }
    }

    /// Read an integer at `path`; absent or `null` yields `None`.
    pub fn get_i64(&self, path: &[PathSegment<'_>]) -> ManifestResult<Option<i64>> {
        match self.get(path)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| traversal(path, format!("{} is not an integer", n))),
            Some(other) => Err(expected(path, "number", other)),
        }
    }

    /// Read a mapping of string keys to string values at `path`.
    ///
    /// Absent yields an empty map. Any non-string key or value is a
    /// traversal error.
    pub fn get_string_map(
        &self,
        path: &[PathSegment<'_>],
    ) -> ManifestResult<BTreeMap<String, String>> {
        let mut out = BTreeMap::new();
        let Some(map) = self.get_mapping(path)? else {
            return Ok(out);
        };
        for (key, value) in map {
            match (key, value) {
                (Value::String(k), Value::String(v)) => {
                    out.insert(k.clone(), v.clone());
                }
                (Value::String(k), other) => {
                    return Err(traversal(
                        path,
                        format!("value of {:?} is a {}, expected a string", k, kind_of(other)),
                    ))
                }
                (other, _) => {
                    return Err(traversal(
                        path,
                        format!("found a {} key, expected a string", kind_of(other)),
                    ))
                }
            }
        }
        Ok(out)
    }

    /// Write `value` at `path`, creating intermediate mappings as needed.
    ///
    /// Fails without modifying the tree when an existing intermediate node
    /// is not the container the path requires, or when an index segment
    /// points past the end of a sequence or into a node that would have to
    /// be created.
    pub fn set(&mut self, path: &[PathSegment<'_>], value: Value) -> ManifestResult<()> {
        self.check_writable(path)?;
        write_at(&mut self.root, path, path, value)
    }

    /// Verify that [`Document::set`] on `path` would succeed.
    pub fn check_writable(&self, path: &[PathSegment<'_>]) -> ManifestResult<()> {
        let mut current = Some(&self.root);
        for (depth, segment) in path.iter().enumerate() {
            match (current, segment) {
                (None | Some(Value::Null), _) => {
                    // Everything from here down is created as mappings.
                    return match path[depth..]
                        .iter()
                        .position(|s| matches!(s, PathSegment::Index(_)))
                    {
                        Some(offset) => Err(traversal(
                            &path[..depth + offset],
                            "cannot index into a node that does not exist",
                        )),
                        None => Ok(()),
                    };
                }
                (Some(Value::Mapping(map)), PathSegment::Key(key)) => current = map.get(*key),
                (Some(Value::Sequence(seq)), PathSegment::Index(index)) => {
                    if *index >= seq.len() {
                        return Err(traversal(
                            &path[..depth],
                            format!("index {} out of range for length {}", index, seq.len()),
                        ));
                    }
                    current = seq.get(*index);
                }
                (Some(other), segment) => {
                    return Err(expected(&path[..depth], container_for(segment), other))
                }
            }
        }
        Ok(())
    }

    /// Serialize the tree as YAML. Output is deterministic for a given tree.
    pub fn to_yaml(&self) -> ManifestResult<String> {
        Ok(serde_yaml::to_string(&self.root)?)
    }

    /// Serialize the tree as pretty-printed JSON.
    pub fn to_json(&self) -> ManifestResult<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

fn write_at(
    node: &mut Value,
    full: &[PathSegment<'_>],
    rest: &[PathSegment<'_>],
    value: Value,
) -> ManifestResult<()> {
    let Some((first, remaining)) = rest.split_first() else {
        *node = value;
        return Ok(());
    };
    if node.is_null() {
        *node = Value::Mapping(Mapping::new());
    }
    let depth = full.len() - rest.len();
    let child = match (first, node) {
        (PathSegment::Key(key), Value::Mapping(map)) => map
            .entry(Value::String((*key).to_string()))
            .or_insert(Value::Null),
        (PathSegment::Index(index), Value::Sequence(seq)) => match seq.get_mut(*index) {
            Some(element) => element,
            None => return Err(traversal(&full[..depth], "index out of range")),
        },
        (segment, other) => return Err(expected(&full[..depth], container_for(segment), other)),
    };
    write_at(child, full, remaining, value)
}

impl From<Value> for Document {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}
