//! Versioned shape descriptors stored under `shapes/`.
//!
//! Descriptors are strict about their version marker so a consumer cannot
//! silently validate against a shape written for a different layout. The
//! accepted set can be widened through `OUTPUTS_ALLOWED_SHAPE_VERSIONS`.

use super::model::{ConfigurationShape, ResourcePolicy, Strictness};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Version marker of the descriptor layout this crate understands.
pub const SHAPE_DESCRIPTOR_VERSION: &str = "backend_outputs_shape_v1";
const ENV_ALLOWED_SHAPE_VERSIONS: &str = "OUTPUTS_ALLOWED_SHAPE_VERSIONS";

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeDescriptor {
    pub schema_version: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub shape: ShapeBody,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeBody {
    #[serde(default)]
    pub strictness: Strictness,
    pub categories: BTreeMap<String, CategoryBody>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryBody {
    #[serde(default)]
    pub resources: ResourcePolicy,
    // Kept as a list so duplicates can be reported instead of collapsed.
    pub attributes: Vec<String>,
}

impl ShapeDescriptor {
    /// Parse a descriptor from disk and verify its version marker.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading shape descriptor {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("parsing shape descriptor {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        let descriptor: ShapeDescriptor = serde_json::from_str(data)?;
        validate_schema_version(&descriptor.schema_version)?;
        Ok(descriptor)
    }

    /// Convert into a runtime shape, rejecting blank or duplicated names.
    pub fn to_shape(&self) -> Result<ConfigurationShape> {
        let mut builder = ConfigurationShape::builder().strictness(self.shape.strictness);
        for (name, body) in &self.shape.categories {
            builder = builder.category(name, body.resources, body.attributes.iter().cloned());
        }
        builder.build()
    }
}

/// Load a descriptor and build its shape in one step.
pub fn load_shape_from_path(path: &Path) -> Result<ConfigurationShape> {
    ShapeDescriptor::load(path)?
        .to_shape()
        .with_context(|| format!("building shape from {}", path.display()))
}

fn validate_schema_version(schema_version: &str) -> Result<()> {
    if schema_version.is_empty() {
        bail!("schema_version must not be empty");
    }

    if !schema_version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        bail!(
            "schema_version must match ^[A-Za-z0-9_.-]+$, got {}",
            schema_version
        );
    }

    let allowed = allowed_shape_versions();
    if !allowed.contains(schema_version) {
        bail!(
            "schema_version '{}' not in allowed set {:?}",
            schema_version,
            allowed
        );
    }

    Ok(())
}

/// Accepted descriptor versions: the built-in one plus any listed in the env.
pub fn allowed_shape_versions() -> BTreeSet<String> {
    let raw = std::env::var(ENV_ALLOWED_SHAPE_VERSIONS).ok();
    allowed_shape_versions_from(raw.as_deref())
}

/// Accepted descriptor versions given the raw comma-separated widening list.
pub fn allowed_shape_versions_from(raw: Option<&str>) -> BTreeSet<String> {
    let mut versions: BTreeSet<String> = BTreeSet::new();
    versions.insert(SHAPE_DESCRIPTOR_VERSION.to_string());
    if let Some(raw) = raw {
        for v in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            versions.insert(v.to_string());
        }
    }
    versions
}
