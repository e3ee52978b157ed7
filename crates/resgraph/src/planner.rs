//! Destroy planner - resolves a destroy request into an ordered delete set

use crate::error::{GraphError, PlanError};
use crate::graph::{DependencyGraph, ResourceHandle};
use crate::protect::separate_protected;
use crate::types::{ResourceState, Urn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// What the operator asked to destroy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestroyRequest {
    /// Explicit target URNs (empty = the whole stack)
    pub targets: Vec<Urn>,
    /// Also destroy resources that depend on a target
    pub target_dependents: bool,
    /// Destroy everything except protected resources
    pub exclude_protected: bool,
}

impl DestroyRequest {
    /// Request destruction of specific targets
    pub fn targeted(targets: impl IntoIterator<Item = Urn>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Request destruction of every unprotected resource
    pub fn excluding_protected() -> Self {
        Self {
            exclude_protected: true,
            ..Self::default()
        }
    }

    /// Reject combinations of options that cannot be honored together
    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.targets.is_empty() && self.exclude_protected {
            return Err(PlanError::ConflictingOptions);
        }
        Ok(())
    }

    /// How the destroy set will be chosen
    pub fn mode(&self) -> PlanMode {
        if self.exclude_protected {
            PlanMode::ExcludeProtected
        } else if self.targets.is_empty() {
            PlanMode::All
        } else {
            PlanMode::Targeted
        }
    }
}

/// How a destroy plan selected its resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    /// Every resource in the stack
    All,
    /// Explicit targets, optionally with their dependents
    Targeted,
    /// Everything not protected
    ExcludeProtected,
}

/// A resolved destroy plan
#[derive(Debug, Clone, Serialize)]
pub struct DestroyPlan<'a> {
    pub mode: PlanMode,
    /// Resources to delete, each before anything it depends on
    pub deletes: Vec<&'a ResourceState>,
    /// Protected resources that stay in the stack
    pub kept: Vec<&'a ResourceState>,
}

impl DestroyPlan<'_> {
    /// Check if there is nothing to delete
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty()
    }

    /// URNs to delete, in deletion order
    pub fn delete_urns(&self) -> Vec<&Urn> {
        self.deletes.iter().map(|r| &r.urn).collect()
    }
}

/// Resolve a destroy request against a topologically sorted snapshot
///
/// The request is validated before any graph work happens.
pub fn plan_destroy<'a>(
    resources: &'a [ResourceState],
    request: &DestroyRequest,
) -> Result<DestroyPlan<'a>, PlanError> {
    request.validate()?;

    let mode = request.mode();
    let (selected, kept): (BTreeSet<usize>, Vec<&ResourceState>) = match mode {
        PlanMode::All => ((0..resources.len()).collect(), Vec::new()),
        PlanMode::ExcludeProtected => {
            let partition = separate_protected(resources);
            let protected: HashSet<&Urn> = partition.protected.iter().map(|r| &r.urn).collect();
            let selected = resources
                .iter()
                .enumerate()
                .filter(|(_, r)| !protected.contains(&r.urn))
                .map(|(idx, _)| idx)
                .collect();
            (selected, partition.protected)
        }
        PlanMode::Targeted => (select_targets(resources, request)?, Vec::new()),
    };

    // Protected resources never survive into a delete set
    if let Some(&idx) = selected.iter().find(|&&idx| resources[idx].protect) {
        return Err(PlanError::ProtectedResource(resources[idx].urn.clone()));
    }

    let deletes: Vec<&ResourceState> = selected.iter().rev().map(|&idx| &resources[idx]).collect();

    log::info!(
        "Planned destroy of {} resources ({:?}), keeping {} protected",
        deletes.len(),
        mode,
        kept.len()
    );

    Ok(DestroyPlan {
        mode,
        deletes,
        kept,
    })
}

/// Positions of the targets, expanded by their dependents when allowed
fn select_targets(
    resources: &[ResourceState],
    request: &DestroyRequest,
) -> Result<BTreeSet<usize>, PlanError> {
    let graph = DependencyGraph::new(resources);

    let handles: Vec<ResourceHandle> = request
        .targets
        .iter()
        .map(|target| {
            graph
                .handle_of(target)
                .ok_or_else(|| PlanError::UnknownTarget(target.clone()))
        })
        .collect::<Result<_, _>>()?;

    // The graph is read-only once built, so targets expand independently
    let ignore = HashSet::new();
    let expansions: Vec<(ResourceHandle, Vec<&ResourceState>)> = handles
        .par_iter()
        .map(|&handle| {
            graph
                .depending_on(handle, &ignore, true)
                .map(|dependents| (handle, dependents))
        })
        .collect::<Result<_, GraphError>>()?;

    let targeted: HashSet<&Urn> = request.targets.iter().collect();
    let mut selected: BTreeSet<usize> = handles.iter().map(|h| h.index()).collect();

    for (handle, dependents) in expansions {
        for dependent in dependents {
            if !request.target_dependents && !targeted.contains(&dependent.urn) {
                return Err(PlanError::UntargetedDependent {
                    target: graph.resource(handle)?.urn.clone(),
                    dependent: dependent.urn.clone(),
                });
            }

            let position = graph
                .handle_of(&dependent.urn)
                .ok_or_else(|| GraphError::UnknownResource {
                    urn: dependent.urn.clone(),
                })?;
            selected.insert(position.index());
        }
    }

    log::debug!(
        "Expanded {} targets to {} resources",
        request.targets.len(),
        selected.len()
    );
    Ok(selected)
}
