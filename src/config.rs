// ⚙️ Configuration - Columns and storage as data
// Loaded from JSON; every field has a default so "{}" is a valid config

use crate::error::{RankingError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default storage key for the previous snapshot slot
pub const DEFAULT_STORAGE_KEY: &str = "ranking_previous_snapshot";

/// Default leaderboard size (the original board shows the top 20)
pub const DEFAULT_TOP_N: usize = 20;

// ============================================================================
// COLUMN CONFIG
// ============================================================================

/// Header names of the three recognized feed columns
///
/// Matched by exact header text. Order in the feed does not matter and
/// extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "default_name_column")]
    pub name: String,

    #[serde(default = "default_percentage_column")]
    pub percentage: String,

    #[serde(default = "default_rank_column")]
    pub rank: String,
}

fn default_name_column() -> String {
    "Personas con Buenos Nombres".to_string()
}

fn default_percentage_column() -> String {
    "% de Ganancia".to_string()
}

fn default_rank_column() -> String {
    "Orden".to_string()
}

impl ColumnConfig {
    pub fn new(name: &str, percentage: &str, rank: &str) -> Self {
        ColumnConfig {
            name: name.to_string(),
            percentage: percentage.to_string(),
            rank: rank.to_string(),
        }
    }

    /// Required columns absent from a header row
    pub fn missing_from<'a, I>(&self, headers: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: Vec<&str> = headers.into_iter().collect();
        [&self.name, &self.percentage, &self.rank]
            .into_iter()
            .filter(|col| !present.contains(&col.as_str()))
            .cloned()
            .collect()
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig {
            name: default_name_column(),
            percentage: default_percentage_column(),
            rank: default_rank_column(),
        }
    }
}

// ============================================================================
// RANKING CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Key of the single storage slot holding the previous snapshot
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Number of rows shown on the leaderboard
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// SQLite file backing the snapshot slot
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Feed file used when none is given on the command line
    #[serde(default)]
    pub feed_path: Option<PathBuf>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_database_path() -> PathBuf {
    PathBuf::from("ranking.db")
}

impl RankingConfig {
    /// Load config from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RankingError::Config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let config: RankingConfig = serde_json::from_str(&content)
            .map_err(|e| RankingError::Config(format!("Failed to parse config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let cols = &self.columns;
        for (label, value) in [
            ("name", &cols.name),
            ("percentage", &cols.percentage),
            ("rank", &cols.rank),
        ] {
            if value.trim().is_empty() {
                return Err(RankingError::Config(format!(
                    "column '{}' must not be blank",
                    label
                )));
            }
        }

        if cols.name == cols.percentage || cols.name == cols.rank || cols.percentage == cols.rank {
            return Err(RankingError::Config(
                "name, percentage and rank columns must be distinct".to_string(),
            ));
        }

        if self.storage_key.trim().is_empty() {
            return Err(RankingError::Config("storage_key must not be blank".to_string()));
        }

        Ok(())
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            columns: ColumnConfig::default(),
            storage_key: default_storage_key(),
            top_n: default_top_n(),
            database_path: default_database_path(),
            feed_path: None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: RankingConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.columns, ColumnConfig::default());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.top_n, 20);
        assert_eq!(config.database_path, PathBuf::from("ranking.db"));
        assert!(config.feed_path.is_none());
    }

    #[test]
    fn test_partial_columns_override() {
        let config: RankingConfig =
            serde_json::from_str(r#"{"columns": {"name": "Trader"}, "top_n": 5}"#).unwrap();

        assert_eq!(config.columns.name, "Trader");
        assert_eq!(config.columns.percentage, "% de Ganancia");
        assert_eq!(config.top_n, 5);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"columns": {{"name": "Name", "percentage": "Gain", "rank": "Rank"}}, "storage_key": "board"}}"#
        )
        .unwrap();

        let config = RankingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.columns, ColumnConfig::new("Name", "Gain", "Rank"));
        assert_eq!(config.storage_key, "board");
    }

    #[test]
    fn test_from_file_missing() {
        let result = RankingConfig::from_file("/nonexistent/ranking.json");
        assert!(matches!(result, Err(RankingError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_columns() {
        let mut config = RankingConfig::default();
        config.columns = ColumnConfig::new("Name", "Name", "Rank");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_from_headers() {
        let columns = ColumnConfig::new("Name", "Gain", "Rank");
        let missing = columns.missing_from(["Rank", "Name", "Extra"]);
        assert_eq!(missing, vec!["Gain".to_string()]);
    }
}
