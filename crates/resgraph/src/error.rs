//! Error types for graph queries and destroy planning
//!
//! Two classes of failure exist. [`GraphError`] signals a snapshot that
//! breaks the graph's assumptions; it aborts the planning pass and always
//! names the offending resource. [`PlanError`] covers requests the operator
//! can fix by changing their input.

use crate::types::Urn;
use thiserror::Error;

/// Why a provider reference could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderParseError {
    /// No `::` separating provider URN and id
    #[error("expected '::' between provider URN and id")]
    MissingDelimiter,

    /// The URN part does not name a provider resource
    #[error("{0} is not a provider URN")]
    NotAProvider(Urn),
}

/// Invariant violations detected while querying a dependency graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The queried resource is not part of the graph's snapshot
    #[error("resource {urn} is not present in the dependency graph")]
    UnknownResource { urn: Urn },

    /// A handle that was not issued by this graph
    #[error("resource handle #{0} is out of range for this dependency graph")]
    InvalidHandle(usize),

    /// A resource carries a provider reference that cannot be decoded
    #[error("resource {urn} has malformed provider reference '{reference}': {source}")]
    MalformedProvider {
        urn: Urn,
        reference: String,
        #[source]
        source: ProviderParseError,
    },
}

/// Errors that reject a destroy request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Explicit targets combined with protected-resource exclusion
    #[error("cannot specify --target and --exclude-protected together")]
    ConflictingOptions,

    /// A requested target does not exist in the snapshot
    #[error("target {0} does not exist in the stack snapshot")]
    UnknownTarget(Urn),

    /// Destroying a target would orphan a resource that was not targeted
    #[error(
        "cannot destroy {target}: {dependent} depends on it and is not targeted \
         (pass --target-dependents to destroy it as well)"
    )]
    UntargetedDependent { target: Urn, dependent: Urn },

    /// The destroy set contains a resource marked for protection
    #[error(
        "unable to destroy {0}: it is marked as protected \
         (unprotect it first, or pass --exclude-protected)"
    )]
    ProtectedResource(Urn),

    /// The snapshot violated a graph invariant
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result type for graph queries
pub type Result<T> = std::result::Result<T, GraphError>;
