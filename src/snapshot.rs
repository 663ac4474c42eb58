// 📸 Snapshot Model
// One refresh cycle's ranked entities, ordered ascending by declared rank
//
// Only two generations ever exist: `previous` (loaded at the start of a
// cycle, read-only) and `current` (computed, then persisted to become the
// next cycle's `previous`).

use serde::{Deserialize, Serialize};

// ============================================================================
// ENTITY
// ============================================================================

/// Canonical ranked record
///
/// `name` is the identity key across snapshots. `rank` is the position
/// declared by the feed; it is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub percentage: f64,
    pub rank: i64,
}

impl Entity {
    pub fn new(name: &str, percentage: f64, rank: i64) -> Self {
        Entity {
            name: name.to_string(),
            percentage,
            rank,
        }
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Ordered sequence of entities
///
/// Persisted as a bare JSON array, so the stored blob is exactly the
/// ordered sequence of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entities: Vec<Entity>,
}

impl Snapshot {
    /// Wrap entities that are already in rank order
    pub fn new(entities: Vec<Entity>) -> Self {
        Snapshot { entities }
    }

    pub fn empty() -> Self {
        Snapshot::default()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// First entity with this exact name
    ///
    /// Duplicate names are not an error; later duplicates are never seen.
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes_as_plain_array() {
        let snapshot = Snapshot::new(vec![Entity::new("Alice", 12.5, 1)]);
        let json = serde_json::to_string(&snapshot).unwrap();

        assert_eq!(json, r#"[{"name":"Alice","percentage":12.5,"rank":1}]"#);

        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_find_by_name_first_match() {
        let snapshot = Snapshot::new(vec![
            Entity::new("Dup", 1.0, 1),
            Entity::new("Other", 2.0, 2),
            Entity::new("Dup", 3.0, 7),
        ]);

        assert_eq!(snapshot.find_by_name("Dup").map(|e| e.rank), Some(1));
        assert!(snapshot.find_by_name("dup").is_none());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
        assert_eq!(serde_json::to_string(&snapshot).unwrap(), "[]");
    }
}
