//! Runtime shape of the backend outputs object.
//!
//! A shape lists the categories a generated configuration must contain, the
//! attributes every resource block in a category must carry, and how many
//! resource instances a category may hold. Shapes are built in code
//! (`ConfigurationShape::backend_outputs`) or loaded from a versioned
//! descriptor under `shapes/`.

pub mod descriptor;
pub mod model;

pub use descriptor::{
    SHAPE_DESCRIPTOR_VERSION, ShapeDescriptor, allowed_shape_versions, allowed_shape_versions_from,
    load_shape_from_path,
};
pub use model::{CategorySpec, ConfigurationShape, ResourcePolicy, ShapeBuilder, Strictness};

/// Default relative path to the bundled shape descriptor.
pub const DEFAULT_SHAPE_PATH: &str = "shapes/backend_outputs_v1.json";

/// Category holding the GraphQL API outputs.
pub const API_CATEGORY: &str = "api";
/// Category holding the user pool / identity pool outputs.
pub const AUTH_CATEGORY: &str = "auth";

/// Attributes every `api` resource exposes.
pub const API_ATTRIBUTES: [&str; 2] = ["GraphQLAPIEndpointOutput", "GraphQLAPIIdOutput"];

/// Attributes every `auth` resource exposes.
pub const AUTH_ATTRIBUTES: [&str; 7] = [
    "AppClientID",
    "AppClientIDWeb",
    "IdentityPoolId",
    "IdentityPoolName",
    "UserPoolArn",
    "UserPoolId",
    "UserPoolName",
];
