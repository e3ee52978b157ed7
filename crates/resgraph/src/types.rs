//! Core types for snapshot resources

use crate::error::ProviderParseError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Prefix shared by every well-formed URN
const URN_PREFIX: &str = "urn:pulumi:";

/// Separator between URN components and between a provider URN and its id
const NAME_DELIMITER: &str = "::";

/// Separator between the types of a qualified (parent-chained) type
const TYPE_DELIMITER: char = '$';

/// Type prefix identifying provider resources
const PROVIDER_TYPE_PREFIX: &str = "pulumi:providers:";

/// Hierarchical unique identifier of a resource within a stack
///
/// Format: `urn:pulumi:<stack>::<project>::<qualified type>::<name>`.
/// The qualified type chains parent types with `$`; the resource's own type
/// is the last segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Urn(String);

impl Urn {
    /// Wrap a raw URN string
    pub fn new(urn: impl Into<String>) -> Self {
        Self(urn.into())
    }

    /// Get the raw URN string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into (stack, project, qualified type, name)
    fn components(&self) -> Option<(&str, &str, &str, &str)> {
        let rest = self.0.strip_prefix(URN_PREFIX)?;
        let mut parts = rest.splitn(4, NAME_DELIMITER);
        let stack = parts.next()?;
        let project = parts.next()?;
        let qualified_type = parts.next()?;
        let name = parts.next()?;
        Some((stack, project, qualified_type, name))
    }

    /// Check that the URN has all four components
    pub fn is_valid(&self) -> bool {
        self.components().is_some()
    }

    /// Stack component
    pub fn stack(&self) -> Option<&str> {
        self.components().map(|(stack, ..)| stack)
    }

    /// Project component
    pub fn project(&self) -> Option<&str> {
        self.components().map(|(_, project, ..)| project)
    }

    /// Full `$`-separated type chain, including parent types
    pub fn qualified_type(&self) -> Option<&str> {
        self.components().map(|(_, _, qualified, _)| qualified)
    }

    /// The resource's own type (last segment of the qualified type)
    pub fn resource_type(&self) -> Option<&str> {
        self.qualified_type()
            .and_then(|q| q.rsplit(TYPE_DELIMITER).next())
    }

    /// Name component
    pub fn name(&self) -> Option<&str> {
        self.components().map(|(.., name)| name)
    }

    /// Whether this URN names a provider instance
    pub fn is_provider(&self) -> bool {
        self.resource_type()
            .is_some_and(|t| t.starts_with(PROVIDER_TYPE_PREFIX))
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Urn {
    fn from(urn: &str) -> Self {
        Self::new(urn)
    }
}

impl From<String> for Urn {
    fn from(urn: String) -> Self {
        Self(urn)
    }
}

/// Reference to a specific provider instance: `providerURN::providerID`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderReference {
    urn: Urn,
    id: String,
}

impl ProviderReference {
    /// Parse an encoded provider reference
    ///
    /// The URN itself contains `::`, so the id is everything after the
    /// last delimiter.
    pub fn parse(reference: &str) -> Result<Self, ProviderParseError> {
        let (urn, id) = reference
            .rsplit_once(NAME_DELIMITER)
            .ok_or(ProviderParseError::MissingDelimiter)?;

        let urn = Urn::new(urn);
        if !urn.is_provider() {
            return Err(ProviderParseError::NotAProvider(urn));
        }

        Ok(Self {
            urn,
            id: id.to_string(),
        })
    }

    /// URN of the provider resource
    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    /// Provider-assigned id of the provider instance
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ProviderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.urn, NAME_DELIMITER, self.id)
    }
}

/// A resource record as persisted in a stack snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    /// Unique identifier within the snapshot
    pub urn: Urn,

    /// Resource type token, informational only
    #[serde(rename = "type", default)]
    pub resource_type: String,

    /// True for provider-managed resources, false for components
    #[serde(default)]
    pub custom: bool,

    /// Provider-assigned id (absent for components)
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Enclosing component resource
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<Urn>,

    /// Resources this one explicitly depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Urn>,

    /// Encoded provider reference (`providerURN::providerID`)
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider: Option<String>,

    /// Prevents destruction
    #[serde(default)]
    pub protect: bool,
}

impl ResourceState {
    /// Create a custom resource with no edges
    pub fn new(urn: impl Into<Urn>) -> Self {
        let urn = urn.into();
        Self {
            resource_type: urn.resource_type().unwrap_or_default().to_string(),
            urn,
            custom: true,
            id: None,
            parent: None,
            dependencies: Vec::new(),
            provider: None,
            protect: false,
        }
    }

    /// Identity of this resource when it acts as a provider: `urn::id`
    pub fn provider_identity(&self) -> String {
        format!(
            "{}{}{}",
            self.urn,
            NAME_DELIMITER,
            self.id.as_deref().unwrap_or_default()
        )
    }

    /// Parse this resource's provider reference, if it has one
    pub fn provider_reference(&self) -> Option<Result<ProviderReference, ProviderParseError>> {
        self.provider.as_deref().map(ProviderReference::parse)
    }

    /// Whether this is a component (non-custom) resource
    pub fn is_component(&self) -> bool {
        !self.custom
    }
}

/// A stack snapshot: resources in topological order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub resources: Vec<ResourceState>,
}

/// Read empty strings as absent values
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(T::from))
}
