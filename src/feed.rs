// 📥 Feed Sources
// Where raw CSV text comes from. Retrieval failures surface as
// FeedUnavailable and stop the cycle before any storage write.

use crate::error::{RankingError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub trait FeedSource: Send + Sync {
    /// Full feed text for one refresh
    fn fetch(&self) -> Result<String>;

    /// Short label for logs
    fn describe(&self) -> String;
}

/// CSV feed read from a local file
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileFeed {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl FeedSource for FileFeed {
    fn fetch(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| {
            RankingError::FeedUnavailable(format!("{}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Feed text held in memory
pub struct StaticFeed {
    text: String,
}

impl StaticFeed {
    pub fn new(text: &str) -> Self {
        StaticFeed {
            text: text.to_string(),
        }
    }
}

impl FeedSource for StaticFeed {
    fn fetch(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_feed_reads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Name,Gain,Rank\nAlice,1%,1\n").unwrap();

        let feed = FileFeed::new(file.path());
        assert_eq!(feed.fetch().unwrap(), "Name,Gain,Rank\nAlice,1%,1\n");
        assert!(feed.describe().starts_with("file:"));
    }

    #[test]
    fn test_missing_file_is_feed_unavailable() {
        let feed = FileFeed::new("/nonexistent/feed.csv");
        assert!(matches!(feed.fetch(), Err(RankingError::FeedUnavailable(_))));
    }

    #[test]
    fn test_static_feed() {
        let feed = StaticFeed::new("a,b\n");
        assert_eq!(feed.fetch().unwrap(), "a,b\n");
    }
}
