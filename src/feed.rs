//! # Feed Ranker
//! Scores a bounded pool of content against one profile, sorts descending,
//! and truncates. The sort is stable: equal-score items keep the order the
//! content source gave them, and tests rely on that.

use std::cmp::Ordering;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::content::{ContentItem, ContentSource};
use crate::error::FeedError;
use crate::profile::{ProfileSource, UserProfile};
use crate::scoring::score_content_at;

/// Default number of items returned when the caller does not ask for a limit.
pub const DEFAULT_FEED_LIMIT: usize = 20;

/// Upper bound on how many raw records are pulled from the content source
/// per request. The pool is small by design; this is a safety valve, not
/// pagination.
pub const CONTENT_FETCH_LIMIT: usize = 500;

/// Rank `items` for `profile`: attach a freshly computed score to every item,
/// stable-sort descending, keep the first `limit`.
///
/// A `limit` beyond the pool size returns the whole pool; there is no error
/// for over-asking.
pub fn rank(profile: &UserProfile, items: Vec<ContentItem>, limit: usize) -> Vec<ContentItem> {
    rank_at(profile, items, limit, Utc::now().date_naive())
}

/// Deterministic variant of [`rank`] with an explicit freshness reference day.
pub fn rank_at(
    profile: &UserProfile,
    mut items: Vec<ContentItem>,
    limit: usize,
    today: NaiveDate,
) -> Vec<ContentItem> {
    for item in &mut items {
        item.score = score_content_at(profile, item, today);
    }
    // Vec::sort_by is stable, which is exactly what the tie rule needs.
    items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    items.truncate(limit);
    items
}

/// Full feed request: profile lookup → content fetch → rank.
///
/// Fails with `UserNotFound` when the profile source has no profile for the
/// id; that is the only client-visible failure of the pipeline.
pub async fn personalized_feed(
    profiles: &dyn ProfileSource,
    content: &dyn ContentSource,
    user_id: u64,
    limit: usize,
) -> Result<Vec<ContentItem>, FeedError> {
    let profile = profiles
        .get_profile(user_id)
        .await
        .ok_or(FeedError::UserNotFound(user_id))?;

    let raw = content.fetch_content(CONTENT_FETCH_LIMIT).await?;
    let items = raw.into_iter().map(ContentItem::from).collect::<Vec<_>>();
    debug!(user_id, pool = items.len(), limit, "ranking feed");

    Ok(rank(&profile, items, limit))
}
