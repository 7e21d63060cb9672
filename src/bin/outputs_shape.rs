//! Validate generated backend outputs against their shape.
//!
//! Usage:
//!   outputs-shape validate --file aws-outputs.json
//!   outputs-shape validate --strict --single-resource < aws-outputs.json
//!   outputs-shape schema --shape shapes/backend_outputs_v1.json
//!   outputs-shape describe --file aws-outputs.json

use anyhow::{Context, Result, bail};
use backend_outputs::{
    BackendOutputs, CompiledShapeSchema, ConfigurationShape, ResourcePolicy, Strictness,
    read_documents, resolve_shape, validate,
};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "outputs-shape")]
#[command(about = "Check generated API/Auth outputs against their declared shape")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate one or more configuration documents.
    Validate {
        #[command(flatten)]
        shape: ShapeArgs,
        /// Optional input file; reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Validate through the rendered JSON Schema instead of the native walker.
        #[arg(long)]
        json_schema: bool,
    },
    /// Print the shape as a JSON Schema document.
    Schema {
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// Validate, then list the resources found per category.
    Describe {
        #[command(flatten)]
        shape: ShapeArgs,
        /// Optional input file; reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ShapeArgs {
    /// Shape descriptor; the built-in API/Auth shape is used when omitted.
    #[arg(long)]
    shape: Option<PathBuf>,
    /// Reject keys the shape does not declare.
    #[arg(long)]
    strict: bool,
    /// Require exactly one resource per category.
    #[arg(long)]
    single_resource: bool,
}

impl ShapeArgs {
    fn resolve(&self) -> Result<ConfigurationShape> {
        let mut shape = resolve_shape(self.shape.as_deref())?;
        if self.strict {
            shape = shape.with_strictness(Strictness::Exact);
        }
        if self.single_resource {
            shape = shape.with_resource_policy(ResourcePolicy::Single);
        }
        debug!(
            strictness = shape.strictness().as_str(),
            categories = shape.categories().len(),
            "resolved shape"
        );
        Ok(shape)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Validate {
            shape,
            file,
            json_schema,
        } => {
            let shape = shape.resolve()?;
            let documents = read_documents(file.as_deref())?;
            validate_documents(&documents, &shape, json_schema)
        }
        Command::Schema { shape } => {
            let shape = shape.resolve()?;
            let schema = backend_outputs::json_schema::render(&shape);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Command::Describe { shape, file } => {
            let shape = shape.resolve()?;
            let documents = read_documents(file.as_deref())?;
            for (idx, document) in documents.iter().enumerate() {
                let outputs = BackendOutputs::from_value(document, &shape)
                    .with_context(|| document_label(idx, documents.len()))?;
                print_summary(&outputs);
            }
            Ok(())
        }
    }
}

fn validate_documents(
    documents: &[Value],
    shape: &ConfigurationShape,
    json_schema: bool,
) -> Result<()> {
    let compiled = if json_schema {
        Some(CompiledShapeSchema::compile(shape)?)
    } else {
        None
    };

    let mut failures = Vec::new();
    for (idx, document) in documents.iter().enumerate() {
        let outcome = match &compiled {
            Some(schema) => schema.validate(document),
            None => validate(document, shape).map(|_| ()).map_err(Into::into),
        };
        if let Err(err) = outcome {
            failures.push(format!("{}: {err}", document_label(idx, documents.len())));
        }
    }

    if !failures.is_empty() {
        bail!("{}", failures.join("\n"));
    }
    info!(documents = documents.len(), "all documents conform");
    Ok(())
}

fn document_label(idx: usize, total: usize) -> String {
    if total == 1 {
        "document".to_string()
    } else {
        format!("document {}", idx + 1)
    }
}

fn print_summary(outputs: &BackendOutputs) {
    for (name, api) in &outputs.api {
        println!("api\t{name}\t{}", api.graphql_api_endpoint);
    }
    for (name, auth) in &outputs.auth {
        println!("auth\t{name}\t{}\t{}", auth.user_pool_id, auth.identity_pool_id);
    }
}
