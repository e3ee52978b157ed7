//! Loading stack snapshots from disk

use anyhow::{Context, Result};
use resgraph::Snapshot;
use std::fs;
use std::path::Path;

/// Load a snapshot document (`{"resources": [...]}`)
///
/// Resources are taken in file order, which must already be topological.
pub fn load(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

    let snapshot: Snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;

    log::debug!(
        "Loaded {} resources from {}",
        snapshot.resources.len(),
        path.display()
    );
    Ok(snapshot)
}

/// Name of the stack the snapshot belongs to, taken from its first URN
pub fn stack_name(snapshot: &Snapshot) -> Option<&str> {
    snapshot.resources.first().and_then(|r| r.urn.stack())
}
