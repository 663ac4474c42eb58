// 🏁 Rank Sorter
// Canonical ordering: ascending declared rank, ties keep input order

use crate::snapshot::{Entity, Snapshot};

/// Stable sort by declared rank
///
/// Ranks are trusted verbatim: gaps and duplicates survive, nothing is renumbered.
pub fn sort_by_rank(entities: &mut [Entity]) {
    // slice::sort_by_key is stable
    entities.sort_by_key(|e| e.rank);
}

/// Sort and wrap as a snapshot
pub fn rank_snapshot(mut entities: Vec<Entity>) -> Snapshot {
    sort_by_rank(&mut entities);
    Snapshot::new(entities)
}

// ============================================================================
// TESTS
// ============================================================================
