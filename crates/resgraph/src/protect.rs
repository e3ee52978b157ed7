//! Protection partitioning
//!
//! Splits a snapshot into resources that can be destroyed and resources that
//! must be kept, such that nothing destroyed is needed by anything kept.
//! Protection is contravariant: it flows from a protected resource up to
//! what it needs.
//!
//! ```text
//! A
//! B: Parent = A
//! C: Parent = A, Protect = true
//!
//! Unprotected: B
//! Protected:   A, C
//! ```
//!
//! A protected resource protects its ancestors, its dependencies (and
//! theirs), the provider instance servicing it, and every other resource
//! serviced by that same provider instance.

use crate::types::{ResourceState, Urn};
use std::collections::{HashMap, HashSet};

/// Result of [`separate_protected`]
///
/// Both lists are sets; their order carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    /// Safe to destroy
    pub unprotected: Vec<&'a ResourceState>,
    /// Must be preserved
    pub protected: Vec<&'a ResourceState>,
}

impl Partition<'_> {
    /// Check if the resource with this URN must be preserved
    pub fn is_protected(&self, urn: &Urn) -> bool {
        self.protected.iter().any(|r| &r.urn == urn)
    }

    /// Total number of resources partitioned
    pub fn len(&self) -> usize {
        self.unprotected.len() + self.protected.len()
    }

    /// Check if the partitioned snapshot was empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split resources into (unprotected, protected)
///
/// `resources` must be topologically sorted. Parent and dependency URNs that
/// are not part of the snapshot are skipped rather than rejected.
pub fn separate_protected(resources: &[ResourceState]) -> Partition<'_> {
    let mut marker = Marker::new(resources);

    for (idx, res) in resources.iter().enumerate() {
        if res.protect {
            marker.propagate(idx);
        }
    }

    // A provider may only be found to be protected after some of its clients
    // were scanned, and a provider can itself be serviced by another
    // provider. Re-scan until nothing new gets marked.
    let mut rounds = 0;
    loop {
        let pending = marker.pending_provider_links();
        if pending.is_empty() {
            break;
        }
        rounds += 1;
        log::trace!(
            "Provider re-scan {}: {} newly protected resources",
            rounds,
            pending.len()
        );
        for idx in pending {
            marker.propagate(idx);
        }
    }

    let partition = marker.into_partition();
    log::debug!(
        "Partitioned {} resources: {} protected, {} unprotected ({} provider re-scans)",
        partition.len(),
        partition.protected.len(),
        partition.unprotected.len(),
        rounds
    );
    partition
}

/// Working wrapper so the snapshot itself is never mutated
#[derive(Debug, Clone, Copy)]
struct Node<'a> {
    protected: bool,
    /// Already propagated; everything it protects is marked too
    visited: bool,
    resource: &'a ResourceState,
}

struct Marker<'a> {
    nodes: Vec<Node<'a>>,
    by_urn: HashMap<&'a Urn, usize>,
    /// Provider references of every protected resource
    protected_providers: HashSet<&'a str>,
}

impl<'a> Marker<'a> {
    fn new(resources: &'a [ResourceState]) -> Self {
        let nodes = resources
            .iter()
            .map(|resource| Node {
                protected: resource.protect,
                visited: false,
                resource,
            })
            .collect();

        let by_urn = resources
            .iter()
            .enumerate()
            .map(|(idx, res)| (&res.urn, idx))
            .collect();

        Self {
            nodes,
            by_urn,
            protected_providers: HashSet::new(),
        }
    }

    /// Mark a resource protected along with everything it needs
    ///
    /// Visiting stops at nodes already propagated: everything above them
    /// was marked when they were.
    fn propagate(&mut self, start: usize) {
        let mut stack = vec![start];

        while let Some(idx) = stack.pop() {
            let node = &mut self.nodes[idx];
            if node.visited {
                continue;
            }
            node.visited = true;
            node.protected = true;

            let res = node.resource;
            if let Some(provider) = res.provider.as_deref() {
                self.protected_providers.insert(provider);
            }

            stack.extend(
                res.dependencies
                    .iter()
                    .filter_map(|dep| self.by_urn.get(dep).copied()),
            );

            if let Some(&parent) = res.parent.as_ref().and_then(|p| self.by_urn.get(p)) {
                stack.push(parent);
            }
        }
    }

    /// Unvisited resources that are, or are serviced by, a protected provider
    fn pending_provider_links(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.visited)
            .filter(|(_, node)| {
                let res = node.resource;
                self.protected_providers
                    .contains(res.provider_identity().as_str())
                    || res
                        .provider
                        .as_deref()
                        .is_some_and(|p| self.protected_providers.contains(p))
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    fn into_partition(self) -> Partition<'a> {
        let mut partition = Partition::default();
        for node in self.nodes {
            if node.protected {
                partition.protected.push(node.resource);
            } else {
                partition.unprotected.push(node.resource);
            }
        }
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urn(name: &str) -> Urn {
        Urn::new(format!("urn:pulumi:test::test::test:index:Resource::{name}"))
    }

    fn provider_urn(name: &str) -> Urn {
        Urn::new(format!("urn:pulumi:test::test::pulumi:providers:test::{name}"))
    }

    fn resource(name: &str) -> ResourceState {
        ResourceState::new(urn(name))
    }

    fn provider(name: &str, id: &str) -> ResourceState {
        let mut res = ResourceState::new(provider_urn(name));
        res.id = Some(id.to_string());
        res
    }

    fn serviced_by(mut res: ResourceState, provider: &ResourceState) -> ResourceState {
        res.provider = Some(provider.provider_identity());
        res
    }

    fn protected(mut res: ResourceState) -> ResourceState {
        res.protect = true;
        res
    }

    fn with_parent(mut res: ResourceState, parent: &str) -> ResourceState {
        res.parent = Some(urn(parent));
        res
    }

    fn with_deps(mut res: ResourceState, deps: &[&str]) -> ResourceState {
        res.dependencies = deps.iter().map(|d| urn(d)).collect();
        res
    }

    fn urn_set<'a>(resources: &[&'a ResourceState]) -> HashSet<&'a Urn> {
        resources.iter().map(|r| &r.urn).collect()
    }

    #[test]
    fn test_protected_child_protects_parent_only() {
        let resources = vec![
            resource("a"),
            protected(with_parent(resource("b"), "a")),
            with_parent(resource("c"), "a"),
        ];

        let partition = separate_protected(&resources);
        assert_eq!(
            urn_set(&partition.protected),
            [&urn("a"), &urn("b")].into_iter().collect()
        );
        assert_eq!(
            urn_set(&partition.unprotected),
            [&urn("c")].into_iter().collect()
        );
    }

    #[test]
    fn test_shared_provider_protects_all_clients() {
        let p = provider("aws", "p-1");
        let resources = vec![
            p.clone(),
            protected(serviced_by(resource("r1"), &p)),
            serviced_by(resource("r2"), &p),
        ];

        let partition = separate_protected(&resources);
        assert!(partition.is_protected(&provider_urn("aws")));
        assert!(partition.is_protected(&urn("r1")));
        assert!(partition.is_protected(&urn("r2")));
        assert!(partition.unprotected.is_empty());
    }

    #[test]
    fn test_client_scanned_before_protected_client_is_caught() {
        let p = provider("aws", "p-1");
        let other = provider("gcp", "p-2");
        let resources = vec![
            p.clone(),
            other.clone(),
            serviced_by(resource("early"), &p),
            serviced_by(resource("elsewhere"), &other),
            protected(serviced_by(resource("late"), &p)),
        ];

        let partition = separate_protected(&resources);
        assert!(partition.is_protected(&urn("early")));
        assert!(partition.is_protected(&urn("late")));
        assert!(!partition.is_protected(&urn("elsewhere")));
        assert!(!partition.is_protected(&provider_urn("gcp")));
    }

    #[test]
    fn test_dependencies_protected_transitively() {
        let resources = vec![
            resource("root"),
            resource("w"),
            with_parent(with_deps(resource("y"), &["w"]), "root"),
            resource("bystander"),
            protected(with_deps(resource("x"), &["y"])),
        ];

        let partition = separate_protected(&resources);
        for name in ["x", "y", "w", "root"] {
            assert!(partition.is_protected(&urn(name)), "{name} should be protected");
        }
        assert!(!partition.is_protected(&urn("bystander")));
    }

    #[test]
    fn test_dependency_provider_clients_are_protected() {
        let p = provider("aws", "p-1");
        let resources = vec![
            p.clone(),
            serviced_by(resource("bucket"), &p),
            serviced_by(resource("queue"), &p),
            protected(with_deps(resource("app"), &["bucket"])),
        ];

        let partition = separate_protected(&resources);
        assert!(partition.is_protected(&urn("queue")));
        assert!(partition.is_protected(&provider_urn("aws")));
    }

    #[test]
    fn test_provider_of_provider_converges() {
        let outer = provider("outer", "p-0");
        let inner = serviced_by(provider("inner", "p-1"), &outer);
        let resources = vec![
            outer.clone(),
            inner.clone(),
            protected(serviced_by(resource("r"), &inner)),
            resource("free"),
        ];

        let partition = separate_protected(&resources);
        assert!(partition.is_protected(&provider_urn("inner")));
        assert!(partition.is_protected(&provider_urn("outer")));
        assert_eq!(
            urn_set(&partition.unprotected),
            [&urn("free")].into_iter().collect()
        );
    }

    #[test]
    fn test_protected_chain_protects_all_ancestors() {
        let resources = vec![
            resource("stack"),
            with_parent(resource("component"), "stack"),
            with_parent(resource("nested"), "component"),
            protected(with_parent(resource("leaf"), "nested")),
            with_parent(resource("sibling"), "component"),
        ];

        let partition = separate_protected(&resources);
        for name in ["stack", "component", "nested", "leaf"] {
            assert!(partition.is_protected(&urn(name)), "{name} should be protected");
        }
        assert!(!partition.is_protected(&urn("sibling")));
    }

    #[test]
    fn test_dangling_urns_are_skipped() {
        let resources = vec![
            protected(with_deps(with_parent(resource("a"), "ghost"), &["phantom"])),
            resource("b"),
        ];

        let partition = separate_protected(&resources);
        assert_eq!(partition.len(), 2);
        assert!(partition.is_protected(&urn("a")));
        assert!(!partition.is_protected(&urn("b")));
    }

    #[test]
    fn test_nothing_protected() {
        let resources = vec![resource("a"), with_deps(resource("b"), &["a"])];

        let partition = separate_protected(&resources);
        assert!(partition.protected.is_empty());
        assert_eq!(partition.unprotected.len(), 2);
    }

    #[test]
    fn test_partition_is_complete_disjoint_and_idempotent() {
        let p = provider("aws", "p-1");
        let resources = vec![
            p.clone(),
            resource("stack"),
            with_parent(resource("a"), "stack"),
            with_parent(with_deps(resource("b"), &["a"]), "stack"),
            protected(with_parent(serviced_by(resource("c"), &p), "stack")),
            with_deps(resource("d"), &["b"]),
            resource("e"),
        ];

        let first = separate_protected(&resources);
        let second = separate_protected(&resources);

        let unprotected = urn_set(&first.unprotected);
        let protected = urn_set(&first.protected);
        assert!(unprotected.is_disjoint(&protected));
        assert_eq!(unprotected.len() + protected.len(), resources.len());
        assert!(resources.iter().all(|r| unprotected.contains(&r.urn) || protected.contains(&r.urn)));

        assert_eq!(unprotected, urn_set(&second.unprotected));
        assert_eq!(protected, urn_set(&second.protected));
    }

    #[test]
    fn test_snapshot_is_not_mutated() {
        let resources = vec![resource("a"), protected(with_parent(resource("b"), "a"))];
        let before = resources.clone();

        let _ = separate_protected(&resources);
        assert_eq!(resources, before);
    }
}
