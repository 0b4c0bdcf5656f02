//! # Content Catalog
//!
//! Read-only content side of the pipeline. Records come in a "raw" wire shape
//! whose `tags` field is a single pipe-delimited string (the storage format);
//! they are split into `ContentItem` before any scoring happens.
//!
//! The catalog loads from `content.json` at the repo root and falls back to a
//! built-in seed, so the service always has something to rank.

use std::{fs, path::Path};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Delimiter used by the content table for the joined `tags` column.
pub const TAG_DELIMITER: char = '|';

/// A record as stored in the content table. `tags` is still joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawContentRecord {
    pub title: String,
    pub url: String,
    /// Publisher name; also the engagement-history key.
    pub source: String,
    pub media_type: String,
    /// Pipe-joined topic tags, e.g. `"tech|news"`.
    pub tags: String,
    /// ISO `YYYY-MM-DD`; may be malformed, the scorer tolerates that.
    pub publish_date: String,
}

/// A content item ready for scoring and for the wire.
/// `score` is computed per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub media_type: String,
    pub tags: Vec<String>,
    pub publish_date: String,
    #[serde(default)]
    pub score: f32,
}

impl From<RawContentRecord> for ContentItem {
    fn from(raw: RawContentRecord) -> Self {
        Self {
            title: raw.title,
            url: raw.url,
            source: raw.source,
            media_type: raw.media_type,
            tags: split_tags(&raw.tags),
            publish_date: raw.publish_date,
            score: 0.0,
        }
    }
}

/// Split a joined tags column into clean tag strings.
/// Whitespace is trimmed and empty segments dropped, so `""` and `"|"` both
/// yield an empty vec (the scorer treats that as zero interest, not an error).
pub fn split_tags(joined: &str) -> Vec<String> {
    joined
        .split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Content lookup seam consumed by the feed pipeline.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch up to `limit` raw records. Must not mutate anything; the same
    /// call may run concurrently from many requests.
    async fn fetch_content(&self, limit: usize) -> Result<Vec<RawContentRecord>>;
    fn name(&self) -> &'static str;
}

/// JSON-file backed catalog with a built-in seed fallback.
#[derive(Debug, Clone)]
pub struct ContentCatalog {
    records: Vec<RawContentRecord>,
}

impl ContentCatalog {
    /// Load the catalog from a JSON array of raw records.
    /// Falls back to `default_seed()` on any read or parse error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let records = match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        };
        Self { records }
    }

    pub fn new(records: Vec<RawContentRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Built-in seed used when no `content.json` is present.
    pub fn default_seed() -> Vec<RawContentRecord> {
        vec![
            RawContentRecord {
                title: "The Psychology of Focus".to_string(),
                url: "https://www.theatlantic.com/psychology-focus".to_string(),
                source: "The Atlantic".to_string(),
                media_type: "article".to_string(),
                tags: "psychology".to_string(),
                publish_date: "2025-07-10".to_string(),
            },
            RawContentRecord {
                title: "How AI Is Changing the World".to_string(),
                url: "https://www.bbc.com/ai-world".to_string(),
                source: "BBC".to_string(),
                media_type: "video".to_string(),
                tags: "tech|news".to_string(),
                publish_date: "2025-07-13".to_string(),
            },
            RawContentRecord {
                title: "Deep Dive: Future of Work".to_string(),
                url: "https://podcasts.example.com/future-work".to_string(),
                source: "FuturePod".to_string(),
                media_type: "podcast".to_string(),
                tags: "tech".to_string(),
                publish_date: "2025-07-11".to_string(),
            },
        ]
    }
}

#[async_trait::async_trait]
impl ContentSource for ContentCatalog {
    async fn fetch_content(&self, limit: usize) -> Result<Vec<RawContentRecord>> {
        Ok(self.records.iter().take(limit).cloned().collect())
    }

    fn name(&self) -> &'static str {
        "catalog"
    }
}
