//! JSON Schema rendering of a shape.
//!
//! The rendered document lets non-Rust tooling share the same contract. It is
//! compiled with `jsonschema` so the CLI can cross-check a configuration
//! through either path.

use crate::shape::{CategorySpec, ConfigurationShape, ResourcePolicy};
use anyhow::{Result, anyhow, bail};
use jsonschema::JSONSchema;
use jsonschema::paths::{JSONPointer, PathChunk};
use serde_json::{Map, Value, json};

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Render `shape` as a draft-07 JSON Schema document.
pub fn render(shape: &ConfigurationShape) -> Value {
    let allow_extra = shape.strictness().allows_extra();
    let mut properties = Map::new();
    for (name, spec) in shape.categories() {
        properties.insert(name.clone(), category_schema(spec));
    }
    let required: Vec<&String> = shape.categories().keys().collect();

    json!({
        "$schema": DRAFT_07,
        "title": "backend outputs",
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": allow_extra,
    })
}

// Strictness only governs top-level categories; resource blocks are always closed.
fn category_schema(spec: &CategorySpec) -> Value {
    let mut leaves = Map::new();
    for attribute in &spec.attributes {
        leaves.insert(attribute.clone(), json!({ "type": "string" }));
    }
    let resource = json!({
        "type": "object",
        "properties": leaves,
        "required": spec.attributes,
        "additionalProperties": false,
    });

    let mut category = json!({
        "type": "object",
        "additionalProperties": resource,
    });
    if spec.resources == ResourcePolicy::Single {
        category["minProperties"] = json!(1);
        category["maxProperties"] = json!(1);
    }
    category
}

/// Compiled JSON Schema form of a shape.
pub struct CompiledShapeSchema {
    raw: Value,
    compiled: JSONSchema,
}

impl CompiledShapeSchema {
    pub fn compile(shape: &ConfigurationShape) -> Result<Self> {
        Self::from_value(render(shape))
    }

    /// Compile an already-rendered (or externally supplied) schema document.
    pub fn from_value(raw: Value) -> Result<Self> {
        let compiled =
            JSONSchema::compile(&raw).map_err(|err| anyhow!("compiling shape schema: {err}"))?;
        Ok(Self { raw, compiled })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Validate `value`, listing every schema error with its instance path.
    pub fn validate(&self, value: &Value) -> Result<()> {
        if let Err(errors) = self.compiled.validate(value) {
            let details = errors
                .map(|err| {
                    let path = dotted_path(&err.instance_path);
                    format!("  {path}: {err}")
                })
                .collect::<Vec<_>>()
                .join("\n");
            bail!("configuration failed schema validation:\n{}", details);
        }
        Ok(())
    }
}

// Reports use the same dotted form as the native walker, built from raw chunks.
fn dotted_path(pointer: &JSONPointer) -> String {
    let segments: Vec<String> = pointer
        .iter()
        .map(|chunk| match chunk {
            PathChunk::Property(name) => name.to_string(),
            PathChunk::Index(idx) => idx.to_string(),
            PathChunk::Keyword(keyword) => (*keyword).to_string(),
        })
        .collect();
    if segments.is_empty() {
        return crate::validate::ROOT_PATH.to_string();
    }
    segments.join(".")
}
