// ↕️ Movement Resolver
// Rank delta of each current entity against the previous snapshot
//
// Lookup is first-match by exact name. When `previous` holds the same name
// twice only the first entry is consulted; movement for duplicated names is
// therefore not meaningful. This is a known limitation, not an error.

use crate::snapshot::{Entity, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Direction of an entity's rank since the last refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    /// Smaller rank than before (moved up)
    Risen,
    /// Larger rank than before (moved down)
    Fallen,
    /// Same rank, or no previous entry to compare against
    None,
}

impl Movement {
    /// Classify a current rank against a previous one
    pub fn between(current_rank: i64, previous_rank: i64) -> Self {
        use std::cmp::Ordering;
        match current_rank.cmp(&previous_rank) {
            Ordering::Less => Movement::Risen,
            Ordering::Greater => Movement::Fallen,
            Ordering::Equal => Movement::None,
        }
    }

    /// Arrow for text tables
    pub fn arrow(&self) -> &'static str {
        match self {
            Movement::Risen => "▲",
            Movement::Fallen => "▼",
            Movement::None => "–",
        }
    }
}

/// Movement of one current entity, with the rank it is compared against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankChange {
    pub name: String,
    pub movement: Movement,
    /// `None` for new entrants
    pub previous_rank: Option<i64>,
}

impl RankChange {
    /// Positions gained (positive) or lost (negative); `None` for new entrants
    pub fn positions(&self, current_rank: i64) -> Option<i64> {
        self.previous_rank.map(|prev| prev - current_rank)
    }

    pub fn is_new_entrant(&self) -> bool {
        self.previous_rank.is_none()
    }
}

/// Movements for a whole snapshot, aligned with `current` order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movements {
    changes: Vec<RankChange>,
}

impl Movements {
    /// One entry per current entity, same order
    pub fn changes(&self) -> &[RankChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Movement for a name (first match)
    pub fn get(&self, name: &str) -> Option<Movement> {
        self.changes
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.movement)
    }

    /// Name → movement; the first occurrence of a duplicated name wins
    pub fn by_name(&self) -> HashMap<String, Movement> {
        let mut map = HashMap::with_capacity(self.changes.len());
        for change in &self.changes {
            map.entry(change.name.clone()).or_insert(change.movement);
        }
        map
    }

    pub fn count(&self, movement: Movement) -> usize {
        self.changes.iter().filter(|c| c.movement == movement).count()
    }
}

/// Classify one entity against the previous snapshot
pub fn resolve_one(entity: &Entity, previous: &Snapshot) -> RankChange {
    match previous.find_by_name(&entity.name) {
        Some(prev) => RankChange {
            name: entity.name.clone(),
            movement: Movement::between(entity.rank, prev.rank),
            previous_rank: Some(prev.rank),
        },
        None => RankChange {
            name: entity.name.clone(),
            movement: Movement::None,
            previous_rank: None,
        },
    }
}

/// Movement for every entity of `current`
pub fn resolve_movements(current: &Snapshot, previous: &Snapshot) -> Movements {
    Movements {
        changes: current.iter().map(|e| resolve_one(e, previous)).collect(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
