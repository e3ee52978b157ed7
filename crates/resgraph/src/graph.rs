//! Dependency graph encoded within a resource snapshot
//!
//! The snapshot already stores edges from each resource to the resources it
//! depends on, and it is stored in topological order. Both queries below are
//! single linear scans over that order instead of a general graph traversal,
//! so they are only correct for snapshots where parents and dependencies
//! precede the resources that reference them.

use crate::error::{GraphError, Result};
use crate::types::{ProviderReference, ResourceState, Urn};
use std::collections::btree_map::{self, BTreeMap};
use std::collections::{HashMap, HashSet};

/// Stable ordinal of a resource within one [`DependencyGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(usize);

impl ResourceHandle {
    /// Position of the resource in the snapshot
    pub fn index(self) -> usize {
        self.0
    }
}

/// Dependency graph over a topologically sorted snapshot
///
/// Built once per planning pass and read-only afterwards, so a single graph
/// can serve any number of concurrent queries.
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    resources: &'a [ResourceState],
    by_urn: HashMap<&'a Urn, ResourceHandle>,
    /// Transitive descendants of every ancestor, in snapshot order
    children_of: HashMap<&'a Urn, Vec<ResourceHandle>>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph from resources in topological order
    ///
    /// Every resource is recorded as a child of each of its ancestors, since
    /// dependencies on a component may name only the component itself.
    pub fn new(resources: &'a [ResourceState]) -> Self {
        let mut by_urn: HashMap<&Urn, ResourceHandle> = HashMap::with_capacity(resources.len());
        let mut children_of: HashMap<&Urn, Vec<ResourceHandle>> = HashMap::new();

        for (idx, res) in resources.iter().enumerate() {
            let handle = ResourceHandle(idx);

            // Only climb to ancestors positioned before the current link, so a
            // malformed parent chain cannot loop.
            let mut bound = idx;
            let mut parent = res.parent.as_ref();
            while let Some(urn) = parent {
                children_of.entry(urn).or_default().push(handle);
                parent = match by_urn.get(urn) {
                    Some(ancestor) if ancestor.0 < bound => {
                        bound = ancestor.0;
                        resources[ancestor.0].parent.as_ref()
                    }
                    _ => None,
                };
            }

            by_urn.insert(&res.urn, handle);
        }

        log::debug!(
            "Built dependency graph over {} resources ({} ancestors)",
            resources.len(),
            children_of.len()
        );

        Self {
            resources,
            by_urn,
            children_of,
        }
    }

    /// Number of resources in the graph
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if the graph has no resources
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// The snapshot this graph was built from
    pub fn resources(&self) -> &'a [ResourceState] {
        self.resources
    }

    /// Look up the handle of a resource by URN
    pub fn handle_of(&self, urn: &Urn) -> Option<ResourceHandle> {
        self.by_urn.get(urn).copied()
    }

    /// Resolve a handle to its resource
    pub fn resource(&self, handle: ResourceHandle) -> Result<&'a ResourceState> {
        self.resources
            .get(handle.0)
            .ok_or(GraphError::InvalidHandle(handle.0))
    }

    /// Handles of every transitive descendant of `urn`, in snapshot order
    pub fn children_of(&self, urn: &Urn) -> &[ResourceHandle] {
        self.children_of
            .get(urn)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn require(&self, urn: &Urn) -> Result<ResourceHandle> {
        self.handle_of(urn)
            .ok_or_else(|| GraphError::UnknownResource { urn: urn.clone() })
    }

    /// All resources that directly or indirectly depend on the given one
    ///
    /// The result is in snapshot (topological) order and never contains the
    /// resource itself or anything positioned before it. Resources in
    /// `ignore` are never reported, and nothing is reached through them.
    /// With `include_children`, direct children count as dependents too.
    ///
    /// Runs in time linear in the number of resources.
    pub fn depending_on(
        &self,
        handle: ResourceHandle,
        ignore: &HashSet<Urn>,
        include_children: bool,
    ) -> Result<Vec<&'a ResourceState>> {
        let resources = self.resources;
        let res = self.resource(handle)?;

        let mut dependent_set: HashSet<&Urn> = HashSet::new();
        dependent_set.insert(&res.urn);

        let mut dependents = Vec::new();
        for candidate in &resources[handle.0 + 1..] {
            if ignore.contains(&candidate.urn) {
                continue;
            }

            let is_dependent = (include_children && candidate.parent.as_ref() == Some(&res.urn))
                || candidate
                    .dependencies
                    .iter()
                    .any(|dep| dependent_set.contains(dep))
                || resolve_provider(candidate)?
                    .is_some_and(|provider| dependent_set.contains(provider.urn()));

            if is_dependent {
                dependents.push(candidate);
                dependent_set.insert(&candidate.urn);
            }
        }

        log::trace!("{} has {} dependents", res.urn, dependents.len());
        Ok(dependents)
    }

    /// [`depending_on`](Self::depending_on), looking the resource up by URN
    pub fn depending_on_urn(
        &self,
        urn: &Urn,
        ignore: &HashSet<Urn>,
        include_children: bool,
    ) -> Result<Vec<&'a ResourceState>> {
        self.depending_on(self.require(urn)?, ignore, include_children)
    }

    /// Resources the given one depends on, including its parent and provider
    ///
    /// When a dependency is a component, its transitive children that sit
    /// before the resource in the snapshot are included as well. Children
    /// positioned after it are left out, since they cannot be dependencies
    /// without creating a cycle.
    pub fn dependencies_of(&self, handle: ResourceHandle) -> Result<ResourceSet<'a>> {
        let resources = self.resources;
        let res = self.resource(handle)?;

        let provider = resolve_provider(res)?;
        let mut direct: HashSet<&Urn> = res.dependencies.iter().collect();
        if let Some(provider) = &provider {
            direct.insert(provider.urn());
        }

        let mut set = ResourceSet::default();
        for idx in (0..handle.0).rev() {
            let candidate = &resources[idx];

            if direct.contains(&candidate.urn) {
                set.insert(ResourceHandle(idx), candidate);

                if candidate.is_component() {
                    for &child in self.children_of(&candidate.urn) {
                        if child.0 < handle.0 {
                            set.insert(child, &resources[child.0]);
                        }
                    }
                }
            }

            if res.parent.as_ref() == Some(&candidate.urn) {
                set.insert(ResourceHandle(idx), candidate);
            }
        }

        Ok(set)
    }

    /// [`dependencies_of`](Self::dependencies_of), looking the resource up by URN
    pub fn dependencies_of_urn(&self, urn: &Urn) -> Result<ResourceSet<'a>> {
        self.dependencies_of(self.require(urn)?)
    }
}

/// Parse a resource's provider reference, treating failure as corruption
fn resolve_provider(res: &ResourceState) -> Result<Option<ProviderReference>> {
    res.provider_reference()
        .transpose()
        .map_err(|source| GraphError::MalformedProvider {
            urn: res.urn.clone(),
            reference: res.provider.clone().unwrap_or_default(),
            source,
        })
}

/// An unordered set of snapshot resources
///
/// Iteration happens to follow snapshot order, but callers should only rely
/// on membership.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet<'a> {
    entries: BTreeMap<ResourceHandle, &'a ResourceState>,
}

impl<'a> ResourceSet<'a> {
    fn insert(&mut self, handle: ResourceHandle, res: &'a ResourceState) {
        self.entries.insert(handle, res);
    }

    /// Number of resources in the set
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check membership by handle
    pub fn contains(&self, handle: ResourceHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Check membership by URN
    pub fn contains_urn(&self, urn: &Urn) -> bool {
        self.entries.values().any(|res| &res.urn == urn)
    }

    /// Iterate over the resources in the set
    pub fn iter(&self) -> impl Iterator<Item = &'a ResourceState> + '_ {
        self.entries.values().copied()
    }

    /// URNs of the resources in the set
    pub fn urns(&self) -> HashSet<&'a Urn> {
        self.entries.values().map(|res| &res.urn).collect()
    }
}

impl<'a> IntoIterator for ResourceSet<'a> {
    type Item = &'a ResourceState;
    type IntoIter = btree_map::IntoValues<ResourceHandle, &'a ResourceState>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}
