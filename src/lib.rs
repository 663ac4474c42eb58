// Gain Ranking - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod leaderboard;
pub mod movement;
pub mod normalize;
pub mod ranking;
pub mod snapshot;
pub mod store;
pub mod validate;

// Re-export commonly used types
pub use config::{ColumnConfig, RankingConfig};
pub use engine::{compute, parse_feed, Computation, RankingEngine, RefreshOutcome};
pub use error::{RankingError, Result, RowRejection};
pub use feed::{FeedSource, FileFeed, StaticFeed};
pub use leaderboard::{Leaderboard, LeaderboardRow, Medal};
pub use movement::{resolve_movements, Movement, Movements, RankChange};
pub use normalize::{normalize_row, parse_percentage, parse_rank, RawRow};
pub use ranking::{rank_snapshot, sort_by_rank};
pub use snapshot::{Entity, Snapshot};
pub use store::{KeyValueStore, MemoryStore, SnapshotSlot, SnapshotStore, SqliteStore};
pub use validate::{filter_valid, FilterReport, FilterSummary, RejectedRow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
