//! # resgraph
//!
//! Dependency graph queries and protection partitioning over stack
//! snapshots, used to plan which resources a destroy may remove.
//!
//! ## Core Concepts
//!
//! - **Snapshot**: resources in topological order (parents and dependencies
//!   always come first)
//! - **DependencyGraph**: index built once per planning pass, answering
//!   "what depends on X" and "what does X depend on"
//! - **Partition**: the split of a snapshot into destroyable and protected
//!   resources
//! - **DestroyPlan**: the final delete set, in deletion order
//!
//! ## Example
//!
//! ```
//! use resgraph::{DependencyGraph, DestroyRequest, ResourceState, plan_destroy};
//! use std::collections::HashSet;
//!
//! let db = ResourceState::new("urn:pulumi:dev::app::aws:rds/instance:Instance::db");
//! let mut app = ResourceState::new("urn:pulumi:dev::app::aws:ecs/service:Service::app");
//! app.dependencies.push(db.urn.clone());
//! let resources = vec![db, app];
//!
//! let graph = DependencyGraph::new(&resources);
//! let dependents = graph
//!     .depending_on_urn(&resources[0].urn, &HashSet::new(), false)
//!     .unwrap();
//! assert_eq!(dependents.len(), 1);
//!
//! let request = DestroyRequest {
//!     target_dependents: true,
//!     ..DestroyRequest::targeted([resources[0].urn.clone()])
//! };
//! let plan = plan_destroy(&resources, &request).unwrap();
//! assert_eq!(plan.deletes[0].urn, resources[1].urn);
//! ```
//!
//! Query errors ([`GraphError`]) mean the snapshot is inconsistent and the
//! planning pass must stop. Planning errors ([`PlanError`]) describe a
//! request the operator has to change.

pub mod error;
pub mod graph;
pub mod planner;
pub mod protect;
pub mod types;

// Re-export main types at crate root
pub use error::{GraphError, PlanError, ProviderParseError};
pub use graph::{DependencyGraph, ResourceHandle, ResourceSet};
pub use planner::{DestroyPlan, DestroyRequest, PlanMode, plan_destroy};
pub use protect::{Partition, separate_protected};
pub use types::{ProviderReference, ResourceState, Snapshot, Urn};
