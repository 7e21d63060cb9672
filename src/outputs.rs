//! Typed view of a validated backend outputs object.
//!
//! Field names keep the exact spelling the configuration tool emits.

use crate::shape::{API_CATEGORY, AUTH_CATEGORY, ConfigurationShape};
use crate::validate::validate;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Outputs of a GraphQL API resource.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiOutputs {
    #[serde(rename = "GraphQLAPIEndpointOutput")]
    pub graphql_api_endpoint: String,
    #[serde(rename = "GraphQLAPIIdOutput")]
    pub graphql_api_id: String,
}

/// Outputs of a user pool / identity pool auth resource.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthOutputs {
    #[serde(rename = "AppClientID")]
    pub app_client_id: String,
    #[serde(rename = "AppClientIDWeb")]
    pub app_client_id_web: String,
    #[serde(rename = "IdentityPoolId")]
    pub identity_pool_id: String,
    #[serde(rename = "IdentityPoolName")]
    pub identity_pool_name: String,
    #[serde(rename = "UserPoolArn")]
    pub user_pool_arn: String,
    #[serde(rename = "UserPoolId")]
    pub user_pool_id: String,
    #[serde(rename = "UserPoolName")]
    pub user_pool_name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendOutputs {
    #[serde(default)]
    pub api: BTreeMap<String, ApiOutputs>,
    #[serde(default)]
    pub auth: BTreeMap<String, AuthOutputs>,
}

impl BackendOutputs {
    /// Validate `value` against `shape`, then deserialize the API and Auth blocks.
    ///
    /// Extra categories tolerated by the shape are dropped from the typed view.
    pub fn from_value(value: &Value, shape: &ConfigurationShape) -> Result<Self> {
        validate(value, shape)?;
        let api = typed_category(value, API_CATEGORY)?;
        let auth = typed_category(value, AUTH_CATEGORY)?;
        Ok(Self { api, auth })
    }

    pub fn api(&self, resource: &str) -> Option<&ApiOutputs> {
        self.api.get(resource)
    }

    pub fn auth(&self, resource: &str) -> Option<&AuthOutputs> {
        self.auth.get(resource)
    }

    /// The only API resource, failing when there are none or several.
    pub fn single_api(&self) -> Result<(&str, &ApiOutputs)> {
        single(&self.api, API_CATEGORY)
    }

    /// The only Auth resource, failing when there are none or several.
    pub fn single_auth(&self) -> Result<(&str, &AuthOutputs)> {
        single(&self.auth, AUTH_CATEGORY)
    }
}

fn typed_category<T>(value: &Value, category: &str) -> Result<BTreeMap<String, T>>
where
    T: for<'de> Deserialize<'de>,
{
    let Some(block) = value.get(category) else {
        return Ok(BTreeMap::new());
    };
    let mut resources = BTreeMap::new();
    if let Some(map) = block.as_object() {
        for (name, attributes) in map {
            let parsed = T::deserialize(attributes)
                .with_context(|| format!("deserializing {category}.{name}"))?;
            resources.insert(name.clone(), parsed);
        }
    }
    Ok(resources)
}

fn single<'a, T>(resources: &'a BTreeMap<String, T>, category: &str) -> Result<(&'a str, &'a T)> {
    let mut iter = resources.iter();
    match (iter.next(), iter.next()) {
        (Some((name, outputs)), None) => Ok((name.as_str(), outputs)),
        (None, _) => bail!("no {category} resource present"),
        (Some(_), Some(_)) => bail!(
            "expected one {category} resource, found {}",
            resources.len()
        ),
    }
}
