//! Study session composition
//!
//! Selects a bounded mixed set from pools of due items. Vocabulary is
//! ordered by staleness (never-reviewed first), then by how little the
//! word is mastered, then by id so identical inputs always produce the
//! same session. Grammar concepts have no review history, so they order
//! by mastery status, then id.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{GrammarConcept, VocabularyItem};
use crate::review::scheduler::staleness;

/// A composed study set. May be smaller than requested when the pools
/// run short; callers report the degraded size upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct StudySession {
    pub vocabulary: Vec<VocabularyItem>,
    pub grammar: Vec<GrammarConcept>,
}

impl StudySession {
    pub fn total(&self) -> usize {
        self.vocabulary.len() + self.grammar.len()
    }
}

/// Select up to `vocab_count` vocabulary items and `grammar_count`
/// grammar concepts from the given pools.
///
/// Counts arrive as signed integers straight from tool arguments;
/// negative values are an `InvalidRequest`. Requesting more than a pool
/// holds returns the whole pool.
pub fn compose(
    vocab_pool: Vec<VocabularyItem>,
    grammar_pool: Vec<GrammarConcept>,
    vocab_count: i64,
    grammar_count: i64,
    now: DateTime<Utc>,
) -> Result<StudySession> {
    if vocab_count < 0 {
        return Err(Error::InvalidRequest(format!(
            "vocab_count must not be negative, got {}",
            vocab_count
        )));
    }
    if grammar_count < 0 {
        return Err(Error::InvalidRequest(format!(
            "grammar_count must not be negative, got {}",
            grammar_count
        )));
    }

    let mut vocabulary = vocab_pool;
    vocabulary.sort_by(|a, b| {
        stale_key(b, now)
            .cmp(&stale_key(a, now))
            .then_with(|| a.mastery_level.cmp(&b.mastery_level))
            .then_with(|| a.id.cmp(&b.id))
    });
    vocabulary.truncate(vocab_count as usize);

    let mut grammar = grammar_pool;
    grammar.sort_by(|a, b| {
        a.mastery_status
            .cmp(&b.mastery_status)
            .then_with(|| a.id.cmp(&b.id))
    });
    grammar.truncate(grammar_count as usize);

    Ok(StudySession { vocabulary, grammar })
}

/// Seconds since last review; never-reviewed items sort above everything.
fn stale_key(item: &VocabularyItem, now: DateTime<Utc>) -> i64 {
    staleness(item, now).map_or(i64::MAX, |d| d.num_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MasteryLevel, MasteryStatus};
    use crate::model::{DifficultyLevel, GrammarCategory};
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()
    }

    fn word(id: &str, last_reviewed: Option<DateTime<Utc>>, mastery: MasteryLevel) -> VocabularyItem {
        let mut item = VocabularyItem::new(id.to_string(), "x".into(), at(1));
        item.id = id.to_string();
        item.last_reviewed = last_reviewed;
        item.mastery_level = mastery;
        item
    }

    fn concept(id: &str, status: MasteryStatus) -> GrammarConcept {
        let mut c = GrammarConcept::new(
            id.to_string(),
            GrammarCategory::Syntax,
            DifficultyLevel::Beginner,
            at(1),
        );
        c.id = id.to_string();
        c.mastery_status = status;
        c
    }

    #[test]
    fn stalest_items_come_first() {
        let pool = vec![
            word("a", Some(at(10)), MasteryLevel::Learning),
            word("b", Some(at(2)), MasteryLevel::Learning),
            word("c", Some(at(6)), MasteryLevel::Learning),
        ];
        let session = compose(pool, vec![], 3, 0, at(12)).unwrap();
        let ids: Vec<&str> = session.vocabulary.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn never_reviewed_outranks_everything() {
        let pool = vec![
            word("old", Some(at(1)), MasteryLevel::Learning),
            word("fresh", None, MasteryLevel::Mastered),
        ];
        let session = compose(pool, vec![], 1, 0, at(20)).unwrap();
        assert_eq!(session.vocabulary[0].id, "fresh");
    }

    #[test]
    fn staleness_ties_break_on_mastery_then_id() {
        let t = at(3);
        let pool = vec![
            word("b", Some(t), MasteryLevel::Familiar),
            word("a", Some(t), MasteryLevel::New),
            word("c", Some(t), MasteryLevel::New),
        ];
        let session = compose(pool, vec![], 3, 0, at(9)).unwrap();
        let ids: Vec<&str> = session.vocabulary.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "b"]);
    }

    #[test]
    fn composition_is_deterministic() {
        let pool = vec![
            word("a", None, MasteryLevel::New),
            word("b", Some(at(4)), MasteryLevel::Learning),
            word("c", Some(at(2)), MasteryLevel::Familiar),
            word("d", None, MasteryLevel::Learning),
        ];
        let first = compose(pool.clone(), vec![], 3, 0, at(10)).unwrap();
        let second = compose(pool, vec![], 3, 0, at(10)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn partial_pool_is_returned_whole() {
        let pool = vec![
            word("a", None, MasteryLevel::New),
            word("b", Some(at(2)), MasteryLevel::Learning),
        ];
        let session = compose(pool, vec![], 5, 0, at(10)).unwrap();
        assert_eq!(session.vocabulary.len(), 2);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let err = compose(vec![], vec![], -1, 0, at(10)).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(err.to_string().contains("vocab_count"));

        let err = compose(vec![], vec![], 0, -3, at(10)).unwrap_err();
        assert!(err.to_string().contains("grammar_count"));
    }

    #[test]
    fn grammar_orders_by_status_then_id() {
        let pool = vec![
            concept("g2", MasteryStatus::Comfortable),
            concept("g1", MasteryStatus::Learning),
            concept("g3", MasteryStatus::Learning),
        ];
        let session = compose(vec![], pool, 0, 2, at(10)).unwrap();
        let ids: Vec<&str> = session.grammar.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["g1", "g3"]);
    }

    #[test]
    fn zero_counts_give_empty_session() {
        let pool = vec![word("a", None, MasteryLevel::New)];
        let session = compose(pool, vec![], 0, 0, at(10)).unwrap();
        assert_eq!(session.total(), 0);
    }
}
