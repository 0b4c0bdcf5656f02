//! # Relevance Scorer
//! Pure, testable logic that maps `(profile, item)` → relevance score.
//! No I/O, no mutation, suitable for unit tests and offline evaluation.
//!
//! The score is a weighted sum of four independently normalized factors:
//! interest match (0.40), media-type preference (0.25), engagement boost
//! (0.20), and recency (0.15). Results are rounded to 3 decimals, half away
//! from zero, and that rounding is the only place precision is dropped.

use chrono::{NaiveDate, Utc};

use crate::content::ContentItem;
use crate::profile::UserProfile;

pub const WEIGHT_INTEREST: f32 = 0.40;
pub const WEIGHT_MEDIA: f32 = 0.25;
pub const WEIGHT_ENGAGEMENT: f32 = 0.20;
pub const WEIGHT_FRESHNESS: f32 = 0.15;

/// Interaction count at which the engagement factor reaches 1.0.
/// The factor is deliberately not capped above that.
pub const ENGAGEMENT_SATURATION: f32 = 5.0;

/// Linear freshness decay window, in days.
pub const FRESHNESS_WINDOW_DAYS: f32 = 30.0;

/// Score an item against a profile using today's date for freshness.
pub fn score_content(profile: &UserProfile, item: &ContentItem) -> f32 {
    score_content_at(profile, item, Utc::now().date_naive())
}

/// Deterministic variant: freshness is computed relative to `today`.
///
/// Bounded in `[0, 1]` for well-formed inputs; an engagement count above
/// `ENGAGEMENT_SATURATION` or a future publish date can push it higher,
/// and neither is clamped.
pub fn score_content_at(profile: &UserProfile, item: &ContentItem, today: NaiveDate) -> f32 {
    let score = interest_factor(profile, &item.tags) * WEIGHT_INTEREST
        + profile.media_weight(&item.media_type) * WEIGHT_MEDIA
        + engagement_factor(profile, &item.source) * WEIGHT_ENGAGEMENT
        + freshness_factor(&item.publish_date, today) * WEIGHT_FRESHNESS;
    round3(score)
}

/// Mean interest weight over the item's tags, 0.0 per unknown tag.
/// The denominator is forced to at least 1 so an empty tag list yields 0.0
/// instead of a division by zero.
fn interest_factor(profile: &UserProfile, tags: &[String]) -> f32 {
    let sum: f32 = tags.iter().map(|t| profile.interest_weight(t)).sum();
    sum / (tags.len().max(1) as f32)
}

/// Historical interaction count scaled by the saturation point. Unknown
/// sources contribute 0; heavy history (> 5 interactions) exceeds 1.0.
fn engagement_factor(profile: &UserProfile, source: &str) -> f32 {
    profile.engagement_count(source) as f32 / ENGAGEMENT_SATURATION
}

/// Linear decay from 1.0 (published today) to 0.0 (30+ days old).
///
/// An unparsable date counts as published today. That is a deliberate
/// fallback: a record with a broken date gets full freshness credit rather
/// than failing the request. Future dates give a negative age and a factor
/// above 1.0, matching the uncapped engagement policy.
fn freshness_factor(publish_date: &str, today: NaiveDate) -> f32 {
    let days_old = NaiveDate::parse_from_str(publish_date, "%Y-%m-%d")
        .map(|d| (today - d).num_days())
        .unwrap_or(0);
    (1.0 - days_old as f32 / FRESHNESS_WINDOW_DAYS).max(0.0)
}

/// Round to 3 decimal places, half away from zero.
fn round3(x: f32) -> f32 {
    (x * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn profile(
        interests: &[(&str, f32)],
        media: &[(&str, f32)],
        engagement: &[(&str, u32)],
    ) -> UserProfile {
        UserProfile {
            interests: interests
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
            preferred_media_types: media
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
            depth_preference: String::new(),
            engagement_history: engagement
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn item(tags: &[&str], media_type: &str, source: &str, publish_date: &str) -> ContentItem {
        ContentItem {
            title: "t".to_string(),
            url: "u".to_string(),
            source: source.to_string(),
            media_type: media_type.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            publish_date: publish_date.to_string(),
            score: 0.0,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
    }

    #[test]
    fn handpicked_weighted_sum() {
        // 0.7*0.4 + 1.0*0.25 + (3/5)*0.2 + 1*0.15 = 0.80
        let p = profile(&[("tech", 0.7)], &[("article", 1.0)], &[("BBC", 3)]);
        let it = item(&["tech"], "article", "BBC", "2025-07-15");
        let s = score_content_at(&p, &it, day("2025-07-15"));
        assert!((s - 0.80).abs() < 1e-6, "expected 0.80, got {s}");
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let p = profile(&[("tech", 0.7), ("news", 0.4)], &[("video", 0.5)], &[("BBC", 3)]);
        let it = item(&["tech", "news"], "video", "BBC", "2025-07-10");
        let a = score_content_at(&p, &it, day("2025-07-20"));
        let b = score_content_at(&p, &it, day("2025-07-20"));
        assert_eq!(a, b);
    }

    #[test]
    fn interest_is_mean_over_tags() {
        let p = profile(&[("tech", 0.8)], &[], &[]);
        // One known tag out of two → mean 0.4 → contribution 0.16,
        // plus full freshness 0.15.
        let it = item(&["tech", "gardening"], "article", "X", "2025-07-15");
        let s = score_content_at(&p, &it, day("2025-07-15"));
        assert!((s - (0.4 * 0.4 + 0.15)).abs() < 1e-3, "got {s}");
    }

    #[test]
    fn empty_tags_yield_zero_interest_not_an_error() {
        let p = profile(&[("tech", 0.9)], &[], &[]);
        let it = item(&[], "article", "X", "2025-07-15");
        let s = score_content_at(&p, &it, day("2025-07-15"));
        // Only freshness contributes.
        assert!((s - 0.15).abs() < 1e-6, "got {s}");
    }

    #[test]
    fn unknown_media_and_source_contribute_zero() {
        let p = profile(&[], &[("article", 1.0)], &[("BBC", 5)]);
        let it = item(&[], "hologram", "Nobody Weekly", "2025-07-15");
        let s = score_content_at(&p, &it, day("2025-07-15"));
        assert!((s - 0.15).abs() < 1e-6, "got {s}");
    }

    #[test]
    fn malformed_date_gets_full_freshness() {
        let p = profile(&[], &[], &[]);
        let bad = item(&[], "article", "X", "not-a-date");
        let fresh = item(&[], "article", "X", "2025-07-15");
        let today = day("2025-07-15");
        assert_eq!(
            score_content_at(&p, &bad, today),
            score_content_at(&p, &fresh, today)
        );
    }

    #[test]
    fn freshness_decays_linearly_and_floors_at_zero() {
        let p = profile(&[], &[], &[]);
        let today = day("2025-08-14");
        // 15 days old → factor 0.5 → contribution 0.075.
        let mid = item(&[], "article", "X", "2025-07-30");
        assert!((score_content_at(&p, &mid, today) - 0.075).abs() < 1e-3);
        // 60 days old → factor floored at 0.
        let old = item(&[], "article", "X", "2025-06-15");
        assert_eq!(score_content_at(&p, &old, today), 0.0);
    }

    #[test]
    fn engagement_is_not_capped() {
        let p = profile(&[], &[], &[("Firehose", 50)]);
        let it = item(&[], "article", "Firehose", "2025-07-15");
        // 50/5 * 0.2 = 2.0, plus freshness 0.15.
        let s = score_content_at(&p, &it, day("2025-07-15"));
        assert!((s - 2.15).abs() < 1e-6, "got {s}");
    }

    #[test]
    fn rounds_to_three_decimals() {
        // 1/3 interest weight exercises the rounding path.
        let p = profile(&[("a", 1.0)], &[], &[]);
        let it = item(&["a", "b", "c"], "article", "X", "2024-01-01");
        let s = score_content_at(&p, &it, day("2025-08-14"));
        // mean 1/3 → 0.13333… * 1 → rounds to 0.133.
        assert!((s - 0.133).abs() < 1e-6, "got {s}");
    }
}
