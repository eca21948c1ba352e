//! End-to-end core flow without the network: normalize fake Notion
//! pages, pick a study session, apply outcomes, and write the results
//! back through the schema mapper the way the tools do.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use lingon::config::SchedulerConfig;
use lingon::model::{MasteryLevel, VocabularyItem};
use lingon::review::{apply_outcome, compose, is_due, ReviewOutcome};
use lingon::schema::{vocab_from_page, vocab_properties, vocab_review_properties};

fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 8, 0, 0).unwrap()
}

fn vocab_page(
    id: &str,
    word: &str,
    mastery: &str,
    last_reviewed: Option<DateTime<Utc>>,
    review_count: u32,
    success_rate: f64,
) -> Value {
    let last = match last_reviewed {
        Some(t) => json!({ "date": { "start": t.to_rfc3339() } }),
        None => json!({ "date": null }),
    };
    json!({
        "id": id,
        "properties": {
            "Word/Phrase": { "title": [{ "plain_text": word }] },
            "English Translation": { "rich_text": [{ "plain_text": "translation" }] },
            "Part of Speech": { "select": { "name": "Noun" } },
            "Date Added": { "date": { "start": "2024-01-01" } },
            "Mastery Level": { "select": { "name": mastery } },
            "Difficulty": { "select": { "name": "Medium" } },
            "Last Reviewed": last,
            "Review Count": { "number": review_count },
            "Success Rate": { "number": success_rate },
        }
    })
}

/// Apply a partial property update to a page the way Notion would:
/// listed properties replace, the rest stay.
fn patched(mut page: Value, update: Value) -> Value {
    let props = page["properties"].as_object_mut().unwrap();
    for (key, value) in update.as_object().unwrap() {
        props.insert(key.clone(), value.clone());
    }
    page
}

#[test]
fn session_selection_prefers_stale_and_unreviewed_words() {
    let now = at(3, 1);
    let pages = vec![
        vocab_page("w-recent", "nyligen", "Learning", Some(at(2, 28)), 2, 0.5),
        vocab_page("w-stale", "gammal", "Learning", Some(at(1, 10)), 3, 0.6),
        vocab_page("w-never", "aldrig", "New", None, 0, 0.0),
    ];

    let cfg = SchedulerConfig::default();
    let pool: Vec<VocabularyItem> = pages
        .iter()
        .map(|p| vocab_from_page(p).unwrap())
        .filter(|item| is_due(item, &cfg, now))
        .collect();

    // The word reviewed yesterday is inside its 3-day interval.
    assert_eq!(pool.len(), 2);

    let session = compose(pool, vec![], 2, 0, now).unwrap();
    let ids: Vec<&str> = session.vocabulary.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["w-never", "w-stale"]);
}

#[test]
fn outcome_update_round_trips_through_the_store_schema() {
    let cfg = SchedulerConfig::default();
    let now = at(3, 5);

    let page = vocab_page("w-1", "fjäril", "New", None, 0, 0.0);
    let item = vocab_from_page(&page).unwrap();

    let updated = apply_outcome(&item, ReviewOutcome::new(9, 10).unwrap(), &cfg, now);
    assert_eq!(updated.mastery_level, MasteryLevel::Learning);
    assert_eq!(updated.review_count, 1);
    assert!((updated.success_rate - 0.9).abs() < 1e-9);

    // Persist only the scheduler-evolved fields, then read the page back.
    let stored = patched(page, vocab_review_properties(&updated));
    let reread = vocab_from_page(&stored).unwrap();
    assert_eq!(reread, updated);
}

#[test]
fn repeated_failures_walk_mastery_down_one_level_at_a_time() {
    let cfg = SchedulerConfig::default();
    let page = vocab_page("w-2", "paraply", "Mastered", Some(at(1, 1)), 8, 0.9);
    let mut item = vocab_from_page(&page).unwrap();

    let mut seen = Vec::new();
    for day in [5u32, 12, 19] {
        item = apply_outcome(&item, ReviewOutcome::new(1, 10).unwrap(), &cfg, at(3, day));
        seen.push(item.mastery_level);
    }
    assert_eq!(
        seen,
        [MasteryLevel::Familiar, MasteryLevel::Learning, MasteryLevel::New]
    );
}

#[test]
fn full_item_round_trip_matches_request_schema() {
    let page = vocab_page("w-3", "förståelse", "Familiar", Some(at(2, 14)), 5, 0.72);
    let item = vocab_from_page(&page).unwrap();

    let rebuilt = vocab_from_page(&json!({
        "id": item.id,
        "properties": vocab_properties(&item),
    }))
    .unwrap();
    assert_eq!(rebuilt, item);
}
