//! Synthetic ranking suite: a seeded random pool of content items, ranked
//! against the stub profile, asserting the ordering invariants that the
//! hand-picked tests can't cover at scale.
//!
//! Deterministic: the RNG is seeded, so failures reproduce.

use chrono::NaiveDate;
use rand::{rngs::StdRng, Rng, SeedableRng};

use scroll_focus_feed::content::ContentItem;
use scroll_focus_feed::feed::rank_at;
use scroll_focus_feed::profile::StubProfileSource;

const POOL: usize = 120;

fn today() -> NaiveDate {
    NaiveDate::parse_from_str("2025-07-15", "%Y-%m-%d").expect("fixed test day")
}

fn synthetic_pool(rng: &mut StdRng) -> Vec<ContentItem> {
    let tags = ["psychology", "tech", "news", "sports", "finance"];
    let media = ["article", "video", "podcast", "newsletter"];
    let sources = ["The Atlantic", "BBC", "YouTube", "FuturePod", "Obscure Blog"];

    (0..POOL)
        .map(|i| {
            let tag_count = rng.random_range(0..=3);
            let item_tags = (0..tag_count)
                .map(|_| tags[rng.random_range(0..tags.len())].to_string())
                .collect::<Vec<_>>();

            // Some dates are deliberately broken to exercise the fallback.
            let publish_date = if rng.random_range(0..10) == 0 {
                "not-a-date".to_string()
            } else {
                let day = rng.random_range(1..=28);
                format!("2025-{:02}-{:02}", rng.random_range(5..=7), day)
            };

            ContentItem {
                title: format!("item-{i}"),
                url: format!("https://example.com/{i}"),
                source: sources[rng.random_range(0..sources.len())].to_string(),
                media_type: media[rng.random_range(0..media.len())].to_string(),
                tags: item_tags,
                publish_date,
                score: 0.0,
            }
        })
        .collect()
}

#[test]
fn synthetic_pool_ranks_non_increasing() {
    let mut rng = StdRng::seed_from_u64(42);
    let profile = StubProfileSource::default_seed();
    let items = synthetic_pool(&mut rng);

    let ranked = rank_at(&profile, items, POOL, today());
    assert_eq!(ranked.len(), POOL);

    for pair in ranked.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "order violated: {} ({}) before {} ({})",
            pair[0].title,
            pair[0].score,
            pair[1].title,
            pair[1].score
        );
    }
}

#[test]
fn equal_scores_preserve_catalog_order_at_scale() {
    let profile = StubProfileSource::default_seed();

    // A block of identically scored items sandwiched between distinct ones.
    let mut items = vec![ContentItem {
        title: "top".to_string(),
        url: "https://example.com/top".to_string(),
        source: "The Atlantic".to_string(),
        media_type: "article".to_string(),
        tags: vec!["psychology".to_string()],
        publish_date: "2025-07-14".to_string(),
        score: 0.0,
    }];
    for i in 0..20 {
        items.push(ContentItem {
            title: format!("tie-{i}"),
            url: format!("https://example.com/tie-{i}"),
            source: "Obscure Blog".to_string(),
            media_type: "newsletter".to_string(),
            tags: vec![],
            publish_date: "2025-06-01".to_string(),
            score: 0.0,
        });
    }

    let ranked = rank_at(&profile, items, 50, today());
    assert_eq!(ranked[0].title, "top");
    for (i, item) in ranked[1..].iter().enumerate() {
        assert_eq!(item.title, format!("tie-{i}"), "tie block must keep input order");
    }
}

#[test]
fn truncation_keeps_the_best_items() {
    let mut rng = StdRng::seed_from_u64(7);
    let profile = StubProfileSource::default_seed();
    let items = synthetic_pool(&mut rng);

    let full = rank_at(&profile, items.clone(), POOL, today());
    let short = rank_at(&profile, items, 10, today());

    assert_eq!(short.len(), 10);
    for (a, b) in full.iter().zip(short.iter()) {
        assert_eq!(a.title, b.title, "truncation must be a prefix of the full ranking");
    }
}

#[test]
fn ranking_is_deterministic_across_runs() {
    let profile = StubProfileSource::default_seed();
    let mut pools = Vec::new();
    for _ in 0..2 {
        let mut rng = StdRng::seed_from_u64(1234);
        pools.push(rank_at(&profile, synthetic_pool(&mut rng), POOL, today()));
    }
    assert_eq!(pools[0], pools[1]);
}
