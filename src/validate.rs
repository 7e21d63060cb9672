//! Runtime conformance check of a configuration value against a shape.
//!
//! The walker reports every mismatch it finds rather than stopping at the
//! first, each tagged with the dotted key path of the offending entry
//! (`api.<resource>.GraphQLAPIIdOutput`). A conforming value is handed back
//! untouched.

use crate::shape::{CategorySpec, ConfigurationShape, ResourcePolicy};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Label used for the path of the document root.
pub const ROOT_PATH: &str = "<root>";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MismatchKind {
    MissingKey,
    NotAString { found: &'static str },
    NotAnObject { found: &'static str },
    UnexpectedKey,
    ResourceCount { policy: ResourcePolicy, found: usize },
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchKind::MissingKey => write!(f, "missing key"),
            MismatchKind::NotAString { found } => write!(f, "expected string, found {found}"),
            MismatchKind::NotAnObject { found } => write!(f, "expected object, found {found}"),
            MismatchKind::UnexpectedKey => write!(f, "undeclared key"),
            MismatchKind::ResourceCount { policy, found } => write!(
                f,
                "resource policy '{}' does not admit {found} resource(s)",
                policy.as_str()
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One place where the value departs from the shape.
pub struct Mismatch {
    pub path: String,
    pub kind: MismatchKind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// A configuration value does not conform to its declared shape.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("configuration does not match shape:\n{}", render(.mismatches))]
pub struct ShapeMismatch {
    mismatches: Vec<Mismatch>,
}

impl ShapeMismatch {
    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    /// Dotted key paths of every mismatch, in report order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.mismatches.iter().map(|m| m.path.as_str())
    }

    pub fn contains(&self, path: &str, kind: &MismatchKind) -> bool {
        self.mismatches
            .iter()
            .any(|m| m.path == path && &m.kind == kind)
    }
}

fn render(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(|m| format!("  {m}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check `value` against `shape`, returning the same value when it conforms.
pub fn validate<'v>(
    value: &'v Value,
    shape: &ConfigurationShape,
) -> Result<&'v Value, ShapeMismatch> {
    let mut walker = Walker {
        shape,
        mismatches: Vec::new(),
    };
    walker.root(value);
    if walker.mismatches.is_empty() {
        Ok(value)
    } else {
        Err(ShapeMismatch {
            mismatches: walker.mismatches,
        })
    }
}

/// Owned variant of [`validate`].
pub fn conform(value: Value, shape: &ConfigurationShape) -> Result<Value, ShapeMismatch> {
    validate(&value, shape)?;
    Ok(value)
}

struct Walker<'s> {
    shape: &'s ConfigurationShape,
    mismatches: Vec<Mismatch>,
}

impl Walker<'_> {
    fn push(&mut self, path: String, kind: MismatchKind) {
        self.mismatches.push(Mismatch { path, kind });
    }

    fn root(&mut self, value: &Value) {
        let Some(root) = value.as_object() else {
            self.push(
                ROOT_PATH.to_string(),
                MismatchKind::NotAnObject {
                    found: kind_of(value),
                },
            );
            return;
        };

        let shape = self.shape;
        for (name, spec) in shape.categories() {
            match root.get(name) {
                None => self.push(name.clone(), MismatchKind::MissingKey),
                Some(block) => self.category(name, spec, block),
            }
        }

        for key in root.keys() {
            if shape.category(key).is_none() {
                self.undeclared(key.clone());
            }
        }
    }

    fn category(&mut self, name: &str, spec: &CategorySpec, block: &Value) {
        let Some(resources) = block.as_object() else {
            self.push(
                name.to_string(),
                MismatchKind::NotAnObject {
                    found: kind_of(block),
                },
            );
            return;
        };
        tracing::debug!(category = name, resources = resources.len(), "checking category");

        if !spec.resources.admits(resources.len()) {
            self.push(
                name.to_string(),
                MismatchKind::ResourceCount {
                    policy: spec.resources,
                    found: resources.len(),
                },
            );
        }

        for (resource, attributes) in resources {
            let path = format!("{name}.{resource}");
            match attributes.as_object() {
                Some(attributes) => self.resource(&path, spec, attributes),
                None => self.push(
                    path,
                    MismatchKind::NotAnObject {
                        found: kind_of(attributes),
                    },
                ),
            }
        }
    }

    fn resource(&mut self, path: &str, spec: &CategorySpec, attributes: &Map<String, Value>) {
        for attribute in &spec.attributes {
            let leaf = format!("{path}.{attribute}");
            match attributes.get(attribute) {
                None => self.push(leaf, MismatchKind::MissingKey),
                Some(Value::String(_)) => {}
                Some(other) => self.push(
                    leaf,
                    MismatchKind::NotAString {
                        found: kind_of(other),
                    },
                ),
            }
        }

        // Resource blocks carry exactly the declared attributes, whatever the strictness.
        for key in attributes.keys() {
            if !spec.declares(key) {
                self.push(format!("{path}.{key}"), MismatchKind::UnexpectedKey);
            }
        }
    }

    fn undeclared(&mut self, path: String) {
        if self.shape.strictness().allows_extra() {
            tracing::warn!(path = %path, "ignoring undeclared key");
        } else {
            self.push(path, MismatchKind::UnexpectedKey);
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
