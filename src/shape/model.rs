use super::{API_ATTRIBUTES, API_CATEGORY, AUTH_ATTRIBUTES, AUTH_CATEGORY};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Whether top-level keys the shape does not declare are tolerated.
///
/// Resource blocks are always checked for exactly the declared attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Declared categories are required; undeclared top-level keys are an error.
    Exact,
    /// Declared categories are required; undeclared top-level keys pass through.
    #[default]
    AllowExtra,
}

impl Strictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::Exact => "exact",
            Strictness::AllowExtra => "allow_extra",
        }
    }

    pub fn allows_extra(&self) -> bool {
        matches!(self, Strictness::AllowExtra)
    }
}

/// How many resource instances a category may hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourcePolicy {
    /// Any number of named instances, including none.
    #[default]
    Open,
    /// Exactly one named instance.
    Single,
}

impl ResourcePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourcePolicy::Open => "open",
            ResourcePolicy::Single => "single",
        }
    }

    /// Returns true when `count` instances satisfy the policy.
    pub fn admits(&self, count: usize) -> bool {
        match self {
            ResourcePolicy::Open => true,
            ResourcePolicy::Single => count == 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Expected contents of one category block.
pub struct CategorySpec {
    #[serde(default)]
    pub resources: ResourcePolicy,
    pub attributes: BTreeSet<String>,
}

impl CategorySpec {
    fn from_names(resources: ResourcePolicy, names: &[&str]) -> Self {
        Self {
            resources,
            attributes: names.iter().map(|name| (*name).to_string()).collect(),
        }
    }

    pub fn declares(&self, attribute: &str) -> bool {
        self.attributes.contains(attribute)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Runtime schema for a generated backend outputs object.
///
/// Keys are compared case-sensitively; map iteration is sorted so reports and
/// rendered schemas are deterministic.
pub struct ConfigurationShape {
    #[serde(default)]
    strictness: Strictness,
    categories: BTreeMap<String, CategorySpec>,
}

impl ConfigurationShape {
    /// The API + Auth outputs shape emitted by the configuration tool.
    pub fn backend_outputs() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            API_CATEGORY.to_string(),
            CategorySpec::from_names(ResourcePolicy::Open, &API_ATTRIBUTES),
        );
        categories.insert(
            AUTH_CATEGORY.to_string(),
            CategorySpec::from_names(ResourcePolicy::Open, &AUTH_ATTRIBUTES),
        );
        Self {
            strictness: Strictness::default(),
            categories,
        }
    }

    pub fn builder() -> ShapeBuilder {
        ShapeBuilder::default()
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    pub fn categories(&self) -> &BTreeMap<String, CategorySpec> {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&CategorySpec> {
        self.categories.get(name)
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Applies `policy` to every category.
    pub fn with_resource_policy(mut self, policy: ResourcePolicy) -> Self {
        for spec in self.categories.values_mut() {
            spec.resources = policy;
        }
        self
    }
}

impl Default for ConfigurationShape {
    fn default() -> Self {
        Self::backend_outputs()
    }
}

#[derive(Debug, Default)]
/// Incremental constructor for custom shapes.
pub struct ShapeBuilder {
    strictness: Strictness,
    categories: Vec<(String, ResourcePolicy, Vec<String>)>,
}

impl ShapeBuilder {
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn category<I, S>(mut self, name: &str, resources: ResourcePolicy, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.push((
            name.to_string(),
            resources,
            attributes.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Finish the shape, rejecting blank or duplicated names.
    pub fn build(self) -> Result<ConfigurationShape> {
        let mut categories = BTreeMap::new();
        for (name, resources, attributes) in self.categories {
            validate_name(&name, "category name")?;
            if categories.contains_key(&name) {
                bail!("duplicate category '{}'", name);
            }
            if attributes.is_empty() {
                bail!("category '{}' declares no attributes", name);
            }
            let mut declared = BTreeSet::new();
            for attribute in attributes {
                validate_name(&attribute, "attribute name")?;
                if !declared.insert(attribute.clone()) {
                    bail!("category '{}' declares attribute '{}' twice", name, attribute);
                }
            }
            categories.insert(
                name,
                CategorySpec {
                    resources,
                    attributes: declared,
                },
            );
        }
        if categories.is_empty() {
            bail!("shape must declare at least one category");
        }
        Ok(ConfigurationShape {
            strictness: self.strictness,
            categories,
        })
    }
}

pub(crate) fn validate_name(name: &str, what: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("{what} must not be empty");
    }
    if name.contains('.') {
        bail!("{what} must not contain '.', got {name}");
    }
    Ok(())
}
