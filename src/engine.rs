// ⚙️ Ranking Engine - Refresh cycle orchestration
//
// One cycle: decode CSV → normalize/filter → sort → load previous →
// resolve movement → save current.
//
// Ordering matters: movement is resolved against the snapshot loaded at the
// start of the cycle, and the save happens only after movement is complete,
// so a cycle never compares against its own output.

use crate::config::ColumnConfig;
use crate::error::Result;
use crate::feed::FeedSource;
use crate::movement::{resolve_movements, Movement, Movements};
use crate::normalize::RawRow;
use crate::ranking::rank_snapshot;
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;
use crate::validate::{filter_valid, reject_malformed, FilterReport};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use tracing::{info, info_span, warn};
use uuid::Uuid;

// ============================================================================
// PURE COMPUTATION
// ============================================================================

/// Result of the pure part of a cycle
#[derive(Debug, Clone)]
pub struct Computation {
    /// Ranked entities; also the snapshot to persist
    pub current: Snapshot,
    pub movements: Movements,
    pub report: FilterReport,
}

/// Decode header-keyed CSV into entities, dropping rows that fail
///
/// First line is the header row. Empty lines are skipped, short or long
/// records are tolerated, and records the reader cannot decode are
/// counted as rejected.
pub fn parse_feed(raw_csv: &str, columns: &ColumnConfig) -> (Snapshot, FilterReport) {
    // Spreadsheet exports often start with a UTF-8 BOM
    let raw_csv = raw_csv.strip_prefix('\u{feff}').unwrap_or(raw_csv);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(raw_csv.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            warn!(error = %e, "feed header unreadable, no rows decoded");
            return (Snapshot::empty(), FilterReport::default());
        }
    };

    let missing = columns.missing_from(headers.iter());
    if !missing.is_empty() && !headers.is_empty() {
        warn!(?missing, "feed header lacks required columns, every row will be dropped");
    }

    let mut rows = Vec::new();
    let mut malformed = Vec::new();

    for (index, result) in reader.records().enumerate() {
        // +2 because: 1-indexed + header row
        let fallback_line = index + 2;
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                rows.push(RawRow::from_record(line, headers.iter(), record.iter()));
            }
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                malformed.push((line, e.to_string()));
            }
        }
    }

    let (entities, mut report) = filter_valid(rows, columns);
    for (line, detail) in malformed {
        reject_malformed(&mut report, line, detail);
    }
    report.rejected.sort_by_key(|r| r.line);

    (rank_snapshot(entities), report)
}

/// The whole cycle as a pure function of feed text and previous snapshot
pub fn compute(raw_csv: &str, previous: &Snapshot, columns: &ColumnConfig) -> Computation {
    let (current, report) = parse_feed(raw_csv, columns);
    let movements = resolve_movements(&current, previous);

    Computation {
        current,
        movements,
        report,
    }
}

// ============================================================================
// REFRESH OUTCOME
// ============================================================================

/// What a refresh hands to the presentation layer
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub cycle_id: Uuid,
    pub refreshed_at: DateTime<Utc>,
    pub current: Snapshot,
    pub movements: Movements,
    pub report: FilterReport,
    /// False when the snapshot could not be written back
    pub persisted: bool,
}

impl RefreshOutcome {
    /// "No data available": every row was dropped or the feed had none
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Orchestrates refresh cycles against an injected snapshot store
///
/// Overlapping cycles on the same store are not serialized here; the
/// second save wins. Wrap the engine in a lock to serialize.
pub struct RankingEngine<S: SnapshotStore> {
    columns: ColumnConfig,
    store: S,
}

impl<S: SnapshotStore> RankingEngine<S> {
    pub fn new(columns: ColumnConfig, store: S) -> Self {
        RankingEngine { columns, store }
    }

    pub fn columns(&self) -> &ColumnConfig {
        &self.columns
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Run one cycle over already-retrieved feed text
    ///
    /// Never fails: an empty result is returned as an empty snapshot, and a
    /// failed save is reported through `persisted`.
    pub fn refresh(&mut self, raw_csv: &str) -> RefreshOutcome {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("refresh", cycle = %cycle_id);
        let _guard = span.enter();

        let previous = self.store.load_previous();
        let Computation {
            current,
            movements,
            report,
        } = compute(raw_csv, &previous, &self.columns);

        let persisted = match self.store.save_previous(&current) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to persist snapshot, next cycle compares against the older one");
                false
            }
        };

        info!(
            accepted = report.accepted,
            rejected = report.rejected_count(),
            previous = previous.len(),
            risen = movements.count(Movement::Risen),
            fallen = movements.count(Movement::Fallen),
            persisted,
            "refresh complete"
        );
        if current.is_empty() {
            info!("no data available in feed");
        }

        RefreshOutcome {
            cycle_id,
            refreshed_at: Utc::now(),
            current,
            movements,
            report,
            persisted,
        }
    }

    /// Fetch then refresh
    ///
    /// A fetch failure is returned as-is and the stored snapshot is left untouched.
    pub fn refresh_from(&mut self, feed: &dyn FeedSource) -> Result<RefreshOutcome> {
        let raw_csv = feed.fetch().map_err(|e| {
            warn!(feed = %feed.describe(), error = %e, "feed retrieval failed, skipping refresh");
            e
        })?;
        Ok(self.refresh(&raw_csv))
    }

    /// Snapshot currently stored as `previous`
    pub fn stored_snapshot(&self) -> Snapshot {
        self.store.load_previous()
    }

    /// Forget history: the next refresh sees every entity as new
    pub fn reset(&mut self) -> Result<()> {
        self.store.save_previous(&Snapshot::empty())
    }
}

// ============================================================================
// TESTS
// ============================================================================
