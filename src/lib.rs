//! Runtime shape contract for generated backend outputs.
//!
//! The configuration tool writes an object keyed by category (`api`,
//! `auth`), then by resource name, then by attribute. This crate declares
//! that layout as a [`ConfigurationShape`], validates JSON values against it,
//! renders it as JSON Schema, and offers a typed [`BackendOutputs`] view.

use anyhow::Result;
use std::path::{Path, PathBuf};

pub mod input;
pub mod json_schema;
pub mod outputs;
pub mod shape;
pub mod validate;

pub use input::{parse_documents, read_documents};
pub use json_schema::CompiledShapeSchema;
pub use outputs::{ApiOutputs, AuthOutputs, BackendOutputs};
pub use shape::{
    CategorySpec, ConfigurationShape, DEFAULT_SHAPE_PATH, ResourcePolicy, SHAPE_DESCRIPTOR_VERSION,
    ShapeDescriptor, Strictness, load_shape_from_path,
};
pub use validate::{Mismatch, MismatchKind, ShapeMismatch, conform, validate};

/// Load the shape from a descriptor when given, otherwise use the built-in one.
pub fn resolve_shape(descriptor: Option<&Path>) -> Result<ConfigurationShape> {
    match descriptor {
        Some(path) => load_shape_from_path(path),
        None => Ok(ConfigurationShape::backend_outputs()),
    }
}

/// Default location of the bundled descriptor relative to `root`.
pub fn default_shape_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_SHAPE_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_without_descriptor_is_builtin() {
        let shape = resolve_shape(None).unwrap();
        assert_eq!(shape, ConfigurationShape::backend_outputs());
    }

    #[test]
    fn resolve_reports_missing_descriptor() {
        let err = resolve_shape(Some(Path::new("/nonexistent/shape.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("reading shape descriptor"));
    }
}
