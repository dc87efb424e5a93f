use crate::classify::classify;
use crate::tag::{TypeTag, VALID_TAGS};
use opc_ua_client::{NodeHandle, SessionResult, UaSession};
use std::future::Future;
use std::pin::Pin;

/// Type-grouped snapshot of discovered variable nodes.
///
/// One bucket per tag in [`VALID_TAGS`] order; within a bucket, handles keep
/// discovery order (pre-order tree walk). Built wholesale by
/// [`build_inventory`] and published as an immutable snapshot, never mutated
/// incrementally after that.
#[derive(Debug, Default)]
pub struct Inventory {
    buckets: [Vec<NodeHandle>; VALID_TAGS.len()],
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handle` to the bucket for `tag`.
    ///
    /// Returns `false` (and stores nothing) for tags outside the valid
    /// grouping set: array forms and `Unknown` are computed by the
    /// classifier but never surfaced.
    pub fn insert(&mut self, tag: &TypeTag, handle: NodeHandle) -> bool {
        match tag.bucket_index() {
            Some(index) => {
                self.buckets[index].push(handle);
                true
            }
            None => false,
        }
    }

    /// Tags with at least one node, in the fixed bucket order.
    pub fn tags(&self) -> Vec<TypeTag> {
        VALID_TAGS
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.buckets[*index].is_empty())
            .map(|(_, tag)| tag.clone())
            .collect()
    }

    /// Handles grouped under `tag`, in discovery order. Empty for tags that
    /// are not grouping keys or have no nodes.
    pub fn nodes_for(&self, tag: &TypeTag) -> &[NodeHandle] {
        tag.bucket_index()
            .map_or(&[][..], |index| &self.buckets[index])
    }

    /// All handles across buckets, bucket order first, discovery order
    /// within. This is the lookup order used by the locator.
    pub fn handles(&self) -> impl Iterator<Item = &NodeHandle> {
        self.buckets.iter().flatten()
    }

    /// Total number of grouped nodes.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}

#[derive(Debug, Default)]
struct WalkStats {
    visited: usize,
    skipped_reads: usize,
    filtered: usize,
    browse_failures: usize,
}

/// Build a fresh inventory by walking the tree under `root` depth-first in
/// pre-order.
///
/// Per-node read failures and absent values are logged and skipped; a browse
/// failure below the root isolates that subtree and traversal continues with
/// its siblings. Node-level failures never escalate.
///
/// # Errors
/// Returns `Err` only when the root itself cannot be browsed; then nothing
/// was discovered and the caller keeps its previous snapshot.
pub async fn build_inventory(
    session: &dyn UaSession,
    root: &NodeHandle,
) -> SessionResult<Inventory> {
    let mut inventory = Inventory::new();
    let mut stats = WalkStats::default();

    record_variable(session, root, &mut inventory, &mut stats).await;
    let children = session.browse_children(&root.node_id).await?;
    for child in children {
        walk(session, child, &mut inventory, &mut stats).await;
    }

    tracing::info!(
        visited = stats.visited,
        grouped = inventory.len(),
        skipped_reads = stats.skipped_reads,
        filtered = stats.filtered,
        browse_failures = stats.browse_failures,
        "inventory rebuild completed"
    );
    Ok(inventory)
}

/// Visit one node, then recurse into its children. Boxed because async
/// recursion needs an indirection.
fn walk<'a>(
    session: &'a dyn UaSession,
    node: NodeHandle,
    inventory: &'a mut Inventory,
    stats: &'a mut WalkStats,
) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
    Box::pin(async move {
        record_variable(session, &node, inventory, stats).await;

        // A node may hold a value and still have children; always descend.
        match session.browse_children(&node.node_id).await {
            Ok(children) => {
                for child in children {
                    walk(session, child, inventory, stats).await;
                }
            }
            Err(error) => {
                stats.browse_failures += 1;
                tracing::warn!(
                    node = %node.node_id,
                    name = %node.display_name,
                    error = %error,
                    "browse failed, skipping subtree"
                );
            }
        }
    })
}

/// Read and classify one node if it is a variable; group it when its tag is
/// a valid key. Failures and absent values skip the node without touching
/// the rest of the walk.
async fn record_variable(
    session: &dyn UaSession,
    node: &NodeHandle,
    inventory: &mut Inventory,
    stats: &mut WalkStats,
) {
    stats.visited += 1;
    if !node.is_variable() {
        return;
    }

    let value = match session.read_value(&node.node_id).await {
        Ok(Some(value)) => value,
        Ok(None) => {
            stats.skipped_reads += 1;
            tracing::debug!(node = %node.node_id, "no value available, node skipped");
            return;
        }
        Err(error) => {
            stats.skipped_reads += 1;
            tracing::warn!(
                node = %node.node_id,
                name = %node.display_name,
                error = %error,
                "read failed, node skipped"
            );
            return;
        }
    };

    let tag = classify(&value);
    if !inventory.insert(&tag, node.clone()) {
        stats.filtered += 1;
        tracing::trace!(node = %node.node_id, tag = %tag, "tag outside valid set, filtered");
    }
}
