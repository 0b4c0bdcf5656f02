//! # Query Interpreter
//! Rule-table interpretation of free-text queries: config types, regex
//! compilation, entity extraction, media-type and freshness classification.
//!
//! Rules are an ordered list of independent `(pattern, label)` checks; each
//! media group can fire on its own, so a query may carry several media
//! labels. No parser, no state machine.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::info;

// --- env defaults & names ---
pub const DEFAULT_QUERY_RULES_PATH: &str = "config/query_rules.toml";

pub const ENV_QUERY_RULES_PATH: &str = "QUERY_RULES_PATH";
pub const ENV_QUERY_HOT_RELOAD: &str = "QUERY_RULES_HOT_RELOAD";
pub const ENV_QUERY_DEV_LOG: &str = "QUERY_DEV_LOG";

/// Seed rule table compiled into the binary; used when no config file exists.
const SEED_RULES_TOML: &str = include_str!("../config/query_rules.toml");

/// Seed engine, compiled once. Backs `QueryEngine::seed()` clones and the
/// poisoned-lock fallback in the handle.
static SEED_ENGINE: Lazy<QueryEngine> = Lazy::new(|| {
    QueryEngine::from_toml_str(SEED_RULES_TOML).expect("embedded seed rules must compile")
});

/// True in debug builds, or when APP_ENV says this is a local/dev deploy.
/// Both opt-in dev facilities below (logging, hot reload) require this on
/// top of their own env flag, so neither can be switched on in production.
fn dev_environment() -> bool {
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

pub(crate) fn dev_logging_enabled() -> bool {
    std::env::var(ENV_QUERY_DEV_LOG).ok().as_deref() == Some("1") && dev_environment()
}

/// 12-hex-char SHA-256 prefix. Enough to correlate log lines for one query
/// without ever storing what the user typed.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Minimal, anonymized dev logger for interpreted queries.
/// Never logs the raw query text; only a hashed id and derived labels.
fn dev_log_query(result: &QueryInterpretation) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(&result.original_query);
    info!(
        target: "query",
        %id,
        user_id = result.user_id,
        entities = result.topics.len().saturating_sub(1),
        media = ?result.media_types,
        freshness = ?result.freshness,
    );
}

/// What the interpreter hands back for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryInterpretation {
    pub user_id: u64,
    pub original_query: String,
    /// Domain tag first, then entity mentions in order of appearance.
    /// Duplicates are kept on purpose: repetition is a signal upstream
    /// consumers may want.
    pub topics: Vec<String>,
    pub intent: Intent,
    pub media_types: Vec<String>,
    pub freshness: Freshness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    High,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    #[serde(rename = "stay updated")]
    StayUpdated,
    #[serde(rename = "general interest")]
    GeneralInterest,
}

impl Intent {
    /// Intent carries no independent signal today; it is derived entirely
    /// from freshness. Kept as its own field so a richer derivation can be
    /// added without changing the response shape.
    pub fn from_freshness(freshness: Freshness) -> Self {
        match freshness {
            Freshness::High => Intent::StayUpdated,
            Freshness::Flexible => Intent::GeneralInterest,
        }
    }
}

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRulesRoot {
    pub topics: TopicsCfg,
    #[serde(default)]
    pub media_rules: Vec<MediaRuleCfg>,
    pub defaults: DefaultsCfg,
    pub freshness: FreshnessCfg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicsCfg {
    /// Fixed tag that prefixes every topic list.
    pub domain_tag: String,
    /// Recognized entity names, matched case-insensitively as literals.
    pub entities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaRuleCfg {
    pub label: String,
    pub pattern: String, // regex (already escaped in TOML)
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsCfg {
    /// Labels used when no media rule matches. Must be non-empty.
    pub media_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FreshnessCfg {
    /// Any match → high freshness, else flexible.
    pub pattern: String,
}

/* ----------------------------
Compiled engine
---------------------------- */

/// The engine holds compiled regexes built once from the rule table.
#[derive(Debug)]
pub struct QueryEngine {
    pub cfg: QueryRulesRoot,
    entity_re: Regex,
    media: Vec<(String, Regex)>,
    freshness_re: Regex,
}

impl QueryEngine {
    /// Load rules from a TOML file. Resolution order:
    /// 1. `$QUERY_RULES_PATH`
    /// 2. `config/query_rules.toml`
    /// 3. the seed table embedded in the binary
    pub fn from_toml() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_QUERY_RULES_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_QUERY_RULES_PATH));

        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(_) => Self::from_toml_str(SEED_RULES_TOML),
        }
    }

    /// Build an engine from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let cfg: QueryRulesRoot = toml::from_str(toml_str)?;

        if cfg.defaults.media_types.is_empty() {
            anyhow::bail!("defaults.media_types must not be empty");
        }

        // One alternation over all entity literals, longest first so
        // multi-word names win over any prefix they contain.
        let mut entities = cfg.topics.entities.clone();
        entities.sort_by_key(|e| std::cmp::Reverse(e.len()));
        let alternation = entities
            .iter()
            .map(|e| regex::escape(e))
            .collect::<Vec<_>>()
            .join("|");
        // Plain substring semantics (no word boundaries): the vocabulary is
        // proper names, and partial words like "Ohtani's" should still hit.
        let entity_re = Regex::new(&format!(r"(?i)({alternation})"))
            .map_err(|e| anyhow::anyhow!("entity regex error: {}", e))?;

        let media = cfg
            .media_rules
            .iter()
            .map(|r| {
                let re = Regex::new(&r.pattern)
                    .map_err(|e| anyhow::anyhow!("media rule `{}` regex error: {}", r.label, e))?;
                Ok((r.label.clone(), re))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let freshness_re = Regex::new(&cfg.freshness.pattern)
            .map_err(|e| anyhow::anyhow!("freshness regex error: {}", e))?;

        Ok(Self {
            cfg,
            entity_re,
            media,
            freshness_re,
        })
    }

    /// Engine built from the embedded seed table. Infallible because the
    /// seed is compiled in and covered by tests.
    pub fn seed() -> Self {
        Self::from_toml_str(SEED_RULES_TOML).expect("embedded seed rules must compile")
    }

    /// Entity mentions in order of first appearance, duplicates kept,
    /// matched text as typed (case preserved from the input).
    pub fn extract_entities(&self, text: &str) -> Vec<String> {
        if self.cfg.topics.entities.is_empty() {
            return Vec::new();
        }
        self.entity_re
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// All media labels whose rule matches anywhere in the text, in rule
    /// order; the configured default pair when none do.
    pub fn detect_media_types(&self, text: &str) -> Vec<String> {
        let hits = self
            .media
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(label, _)| label.clone())
            .collect::<Vec<_>>();
        if hits.is_empty() {
            self.cfg.defaults.media_types.clone()
        } else {
            hits
        }
    }

    pub fn detect_freshness(&self, text: &str) -> Freshness {
        if self.freshness_re.is_match(text) {
            Freshness::High
        } else {
            Freshness::Flexible
        }
    }

    /// Interpret one query end to end.
    pub fn interpret(&self, user_id: u64, query: &str) -> QueryInterpretation {
        let mut topics = Vec::with_capacity(4);
        topics.push(self.cfg.topics.domain_tag.clone());
        topics.extend(self.extract_entities(query));

        let media_types = self.detect_media_types(query);
        let freshness = self.detect_freshness(query);

        let result = QueryInterpretation {
            user_id,
            original_query: query.to_string(),
            topics,
            intent: Intent::from_freshness(freshness),
            media_types,
            freshness,
        };
        dev_log_query(&result);
        result
    }
}

/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

/// Shared, clonable view of the engine. Request handlers read through it;
/// in dev, the watcher thread (QUERY_RULES_HOT_RELOAD=1) writes through it.
#[derive(Clone)]
pub struct QueryRulesHandle {
    inner: Arc<RwLock<QueryEngine>>,
}

impl QueryRulesHandle {
    pub fn new(engine: QueryEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn interpret(&self, user_id: u64, query: &str) -> QueryInterpretation {
        match self.inner.read() {
            Ok(eng) => eng.interpret(user_id, query),
            // Poisoned lock: fall back to the seed table rather than panic
            // inside a request handler.
            Err(_) => SEED_ENGINE.interpret(user_id, query),
        }
    }
}

fn hot_reload_enabled() -> bool {
    std::env::var(ENV_QUERY_HOT_RELOAD).ok().as_deref() == Some("1") && dev_environment()
}

/// Watch `path` and swap a freshly compiled engine into `handle` whenever
/// the file's mtime moves forward. A 2-second std-thread poll is plenty for
/// a config edited by hand; no file-watcher crate needed.
pub fn start_hot_reload_thread(handle: QueryRulesHandle, path: PathBuf) {
    if !hot_reload_enabled() {
        return;
    }

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            // Errors here mean the file is mid-save or temporarily gone;
            // keep the current engine and look again next tick.
            if let Ok(mtime) = fs::metadata(&path).and_then(|m| m.modified()) {
                let changed = match last_mtime.replace(mtime) {
                    Some(prev) => mtime > prev,
                    // First observation only records the baseline.
                    None => false,
                };
                if changed {
                    reload_into(&handle, &path);
                }
            }
            thread::sleep(poll);
        }
    });
}

/// Compile first, swap second: a broken edit leaves the running engine
/// untouched instead of replacing it with nothing.
fn reload_into(handle: &QueryRulesHandle, path: &std::path::Path) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    match QueryEngine::from_toml_str(&content) {
        Ok(new_engine) => {
            if let Ok(mut guard) = handle.inner.write() {
                *guard = new_engine;
                info!(target: "query", path = %path.display(), "rule table reloaded");
            }
        }
        Err(e) => {
            tracing::warn!(target: "query", path = %path.display(), error = %e, "rule reload rejected");
        }
    }
}

/* ----------------------------
Tests
---------------------------- */
