// 🏆 Leaderboard View Model
// Presentation-ready rows: top N, medals, formatted percentages, movement

use crate::movement::{Movement, Movements};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// Podium marker for the first three displayed rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// By display position (1-based), not by declared rank
    pub fn for_position(position: usize) -> Option<Medal> {
        match position {
            1 => Some(Medal::Gold),
            2 => Some(Medal::Silver),
            3 => Some(Medal::Bronze),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Medal::Gold => "🥇",
            Medal::Silver => "🥈",
            Medal::Bronze => "🥉",
        }
    }
}

/// One displayed row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// 1-based display position
    pub position: usize,
    pub rank: i64,
    pub name: String,
    pub percentage: f64,
    /// e.g. "12.50%"
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medal: Option<Medal>,
    pub movement: Movement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_rank: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub rows: Vec<LeaderboardRow>,
    /// Entities in the snapshot, including those beyond the top N
    pub total_entities: usize,
}

/// Two decimals plus percent sign
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

impl Leaderboard {
    /// Take the first `top_n` entities of a snapshot with their movement
    ///
    /// `movements` must be aligned with `snapshot` (as produced by a refresh);
    /// rows without a matching entry show no movement.
    pub fn build(snapshot: &Snapshot, movements: &Movements, top_n: usize) -> Self {
        let changes = movements.changes();

        let rows = snapshot
            .iter()
            .take(top_n)
            .enumerate()
            .map(|(index, entity)| {
                let change = changes.get(index).filter(|c| c.name == entity.name);
                LeaderboardRow {
                    position: index + 1,
                    rank: entity.rank,
                    name: entity.name.clone(),
                    percentage: entity.percentage,
                    label: format_percentage(entity.percentage),
                    medal: Medal::for_position(index + 1),
                    movement: change.map(|c| c.movement).unwrap_or(Movement::None),
                    previous_rank: change.and_then(|c| c.previous_rank),
                }
            })
            .collect();

        Leaderboard {
            rows,
            total_entities: snapshot.len(),
        }
    }

    /// Snapshot without movement data (e.g. showing what is stored)
    pub fn without_movement(snapshot: &Snapshot, top_n: usize) -> Self {
        Leaderboard::build(snapshot, &Movements::default(), top_n)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain-text table for terminals
    pub fn render_text(&self) -> String {
        if self.is_empty() {
            return "No data available\n".to_string();
        }

        let name_width = self
            .rows
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(4)
            .max(4);

        let mut out = format!(
            "{:>5}  {:<width$}  {:>10}  {}\n",
            "Orden",
            "Name",
            "Gain",
            "Move",
            width = name_width
        );

        for row in &self.rows {
            let marker = match row.medal {
                Some(medal) => medal.emoji().to_string(),
                None => row.rank.to_string(),
            };
            out.push_str(&format!(
                "{:>5}  {:<width$}  {:>10}  {}\n",
                marker,
                row.name,
                row.label,
                row.movement.arrow(),
                width = name_width
            ));
        }

        if self.total_entities > self.rows.len() {
            out.push_str(&format!(
                "... {} more not shown\n",
                self.total_entities - self.rows.len()
            ));
        }

        out
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::resolve_movements;
    use crate::snapshot::Entity;

    fn snapshot(n: usize) -> Snapshot {
        Snapshot::new(
            (1..=n)
                .map(|i| Entity::new(&format!("P{}", i), i as f64 * 1.5, i as i64))
                .collect(),
        )
    }

    #[test]
    fn test_top_n_cut() {
        let snap = snapshot(25);
        let board = Leaderboard::without_movement(&snap, 20);

        assert_eq!(board.rows.len(), 20);
        assert_eq!(board.total_entities, 25);
        assert_eq!(board.rows[19].name, "P20");
        assert!(board.render_text().contains("5 more not shown"));
    }

    #[test]
    fn test_medals_by_position() {
        // Tied ranks: medals still follow display order
        let snap = Snapshot::new(vec![
            Entity::new("A", 1.0, 1),
            Entity::new("B", 1.0, 1),
            Entity::new("C", 1.0, 4),
            Entity::new("D", 1.0, 9),
        ]);
        let board = Leaderboard::without_movement(&snap, 20);

        let medals: Vec<Option<Medal>> = board.rows.iter().map(|r| r.medal).collect();
        assert_eq!(
            medals,
            vec![Some(Medal::Gold), Some(Medal::Silver), Some(Medal::Bronze), None]
        );
    }

    #[test]
    fn test_label_formatting() {
        assert_eq!(format_percentage(12.5), "12.50%");
        assert_eq!(format_percentage(8.333), "8.33%");
        assert_eq!(format_percentage(-0.5), "-0.50%");
    }

    #[test]
    fn test_movement_attached() {
        let previous = Snapshot::new(vec![Entity::new("P2", 1.0, 1), Entity::new("P1", 1.0, 2)]);
        let current = snapshot(3);
        let movements = resolve_movements(&current, &previous);

        let board = Leaderboard::build(&current, &movements, 20);
        assert_eq!(board.rows[0].movement, Movement::Risen);
        assert_eq!(board.rows[1].movement, Movement::Fallen);
        assert_eq!(board.rows[2].movement, Movement::None);
        assert_eq!(board.rows[2].previous_rank, None);
        assert!(board.render_text().contains("▲"));
    }

    #[test]
    fn test_empty_board() {
        let board = Leaderboard::without_movement(&Snapshot::empty(), 20);
        assert!(board.is_empty());
        assert_eq!(board.render_text(), "No data available\n");
    }

    #[test]
    fn test_row_json_shape() {
        let board = Leaderboard::without_movement(&snapshot(4), 20);
        let json = serde_json::to_value(&board.rows[3]).unwrap();

        assert_eq!(json["label"], "6.00%");
        assert_eq!(json["movement"], "none");
        assert!(json.get("medal").is_none());
    }
}
