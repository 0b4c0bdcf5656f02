//! # User Profiles
//!
//! This module provides the profile side of the feed pipeline:
//!
//! - `UserProfile`: interest weights, media-type preferences, and engagement
//!   history used by the scorer.
//! - `ProfileSource`: the lookup seam. The scorer and ranker only ever see a
//!   `UserProfile`, so a real per-user backend can replace the stub without
//!   touching either.
//! - `StubProfileSource`: loads a single profile from JSON (or falls back to
//!   a built-in seed) and returns it for every user id.
//!
//! All map lookups default on miss (0 weight / 0 count). A missing key is a
//! normal condition, never an error.

use std::collections::HashMap;
use std::{fs, path::Path};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A user's scoring inputs. Weights are expected in `[0.0, 1.0]` but are not
/// re-validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Topic → interest weight.
    #[serde(default)]
    pub interests: HashMap<String, f32>,
    /// Media type ("article", "video", ...) → preference weight.
    #[serde(default)]
    pub preferred_media_types: HashMap<String, f32>,
    /// Reserved; the scorer does not read it yet.
    #[serde(default)]
    pub depth_preference: String,
    /// Publisher name → historical interaction count.
    #[serde(default)]
    pub engagement_history: HashMap<String, u32>,
}

impl UserProfile {
    /// Interest weight for a topic tag; 0.0 when the tag is unknown.
    pub fn interest_weight(&self, tag: &str) -> f32 {
        self.interests.get(tag).copied().unwrap_or(0.0)
    }

    /// Preference weight for a media type; 0.0 when unknown. The media-type
    /// set is open, so an unrecognized value is simply an unpreferred one.
    pub fn media_weight(&self, media_type: &str) -> f32 {
        self.preferred_media_types
            .get(media_type)
            .copied()
            .unwrap_or(0.0)
    }

    /// Interaction count for a publisher; 0 when the source was never seen.
    pub fn engagement_count(&self, source: &str) -> u32 {
        self.engagement_history.get(source).copied().unwrap_or(0)
    }
}

/// Profile lookup seam consumed by the feed pipeline.
#[async_trait::async_trait]
pub trait ProfileSource: Send + Sync {
    /// Returns the profile for `user_id`, or `None` if the user is unknown.
    async fn get_profile(&self, user_id: u64) -> Option<UserProfile>;
    fn name(&self) -> &'static str;
}

/// Static stub: one profile for everyone, regardless of the requested id.
///
/// Loads from `profile.json` at the repo root when present; otherwise uses
/// `default_seed()`. A real recommender backend would implement
/// `ProfileSource` instead.
#[derive(Debug, Clone)]
pub struct StubProfileSource {
    profile: UserProfile,
}

impl StubProfileSource {
    /// Load the stub profile from a JSON file.
    /// Falls back to `default_seed()` on any read or parse error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let profile = match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        };
        Self { profile }
    }

    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }

    /// Built-in seed profile: a reader with a psychology/tech lean and some
    /// history with mainstream publishers.
    pub fn default_seed() -> UserProfile {
        let mut interests = HashMap::new();
        for (k, v) in [("psychology", 0.9), ("tech", 0.7), ("news", 0.4)] {
            interests.insert(k.to_string(), v);
        }

        let mut preferred_media_types = HashMap::new();
        for (k, v) in [("article", 1.0), ("podcast", 0.7), ("video", 0.5)] {
            preferred_media_types.insert(k.to_string(), v);
        }

        let mut engagement_history = HashMap::new();
        for (k, v) in [("The Atlantic", 5), ("BBC", 3), ("YouTube", 1)] {
            engagement_history.insert(k.to_string(), v);
        }

        UserProfile {
            interests,
            preferred_media_types,
            depth_preference: "short".to_string(),
            engagement_history,
        }
    }
}

#[async_trait::async_trait]
impl ProfileSource for StubProfileSource {
    async fn get_profile(&self, _user_id: u64) -> Option<UserProfile> {
        // Stub: same profile for every id. The Option is part of the trait
        // contract so real backends can report unknown users.
        Some(self.profile.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Test helper that knows no users at all. Lets the NotFound path be
/// exercised without a real backend.
#[derive(Debug, Clone, Default)]
pub struct EmptyProfileSource;

#[async_trait::async_trait]
impl ProfileSource for EmptyProfileSource {
    async fn get_profile(&self, _user_id: u64) -> Option<UserProfile> {
        None
    }

    fn name(&self) -> &'static str {
        "empty"
    }
}

/// Parse a profile from a JSON string (used by tests and by callers that
/// manage their own IO).
pub fn profile_from_json(s: &str) -> Result<UserProfile> {
    Ok(serde_json::from_str(s)?)
}
