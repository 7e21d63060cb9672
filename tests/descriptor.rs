// Shape descriptor guard rails: the bundled descriptor mirrors the built-in
// shape and version markers are enforced.
mod support;

use anyhow::Result;
use backend_outputs::{
    ConfigurationShape, ResourcePolicy, SHAPE_DESCRIPTOR_VERSION, ShapeDescriptor, Strictness,
    default_shape_path, load_shape_from_path, resolve_shape, validate,
};
use serde_json::json;
use support::{crate_root, sample_outputs, write_json};
use tempfile::TempDir;

#[test]
fn bundled_descriptor_matches_builtin_shape() -> Result<()> {
    let path = default_shape_path(&crate_root());
    let descriptor = ShapeDescriptor::load(&path)?;
    assert_eq!(descriptor.schema_version, SHAPE_DESCRIPTOR_VERSION);
    assert_eq!(descriptor.to_shape()?, ConfigurationShape::backend_outputs());
    Ok(())
}

#[test]
fn custom_descriptor_drives_validation() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_json(
        dir.path(),
        "shape.json",
        &json!({
            "schema_version": SHAPE_DESCRIPTOR_VERSION,
            "shape": {
                "strictness": "exact",
                "categories": {
                    "api": {
                        "resources": "single",
                        "attributes": ["GraphQLAPIEndpointOutput", "GraphQLAPIIdOutput"]
                    }
                }
            }
        }),
    )?;

    let shape = resolve_shape(Some(&path))?;
    assert_eq!(shape.strictness(), Strictness::Exact);
    assert_eq!(
        shape.category("api").map(|spec| spec.resources),
        Some(ResourcePolicy::Single)
    );

    // The sample also carries `auth`, which this descriptor does not declare.
    let err = validate(&sample_outputs(), &shape).unwrap_err();
    let paths: Vec<_> = err.paths().collect();
    assert_eq!(paths, vec!["auth"]);
    Ok(())
}

#[test]
fn duplicate_attributes_are_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_json(
        dir.path(),
        "dup.json",
        &json!({
            "schema_version": SHAPE_DESCRIPTOR_VERSION,
            "shape": {
                "categories": {
                    "auth": { "attributes": ["UserPoolId", "UserPoolId"] }
                }
            }
        }),
    )?;
    let err = load_shape_from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("twice"));
    Ok(())
}

#[test]
fn unknown_version_is_rejected_by_default() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_json(
        dir.path(),
        "v9.json",
        &json!({
            "schema_version": "backend_outputs_shape_v9_test",
            "shape": {
                "categories": {
                    "api": { "attributes": ["GraphQLAPIIdOutput"] }
                }
            }
        }),
    )?;

    let err = ShapeDescriptor::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("not in allowed set"));
    Ok(())
}
