//! Review scheduling policy
//!
//! An item is due when it has never been reviewed, or when the time since
//! its last review reaches the interval for its mastery level. Outcomes
//! fold into a count-weighted running success rate and move mastery at
//! most one level per session.

use chrono::{DateTime, Duration, Utc};

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::model::{MasteryLevel, VocabularyItem};

/// Observed result of one study session for one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    correct: u32,
    total: u32,
}

impl ReviewOutcome {
    /// Validates the counts. `total` must be positive and `correct` must
    /// not exceed it.
    pub fn new(correct: u32, total: u32) -> Result<Self> {
        if total == 0 {
            return Err(Error::InvalidOutcome(
                "total answer count must be greater than zero".to_string(),
            ));
        }
        if correct > total {
            return Err(Error::InvalidOutcome(format!(
                "correct count ({}) exceeds total count ({})",
                correct, total
            )));
        }
        Ok(ReviewOutcome { correct, total })
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Fraction of this session answered correctly, in [0, 1].
    pub fn observed_rate(&self) -> f64 {
        f64::from(self.correct) / f64::from(self.total)
    }
}

/// Time since the last review, or `None` for never-reviewed items.
/// `None` sorts as infinitely stale in the session composer.
pub fn staleness(item: &VocabularyItem, now: DateTime<Utc>) -> Option<Duration> {
    item.last_reviewed.map(|last| now - last)
}

/// Whether the item is eligible for review at `now`.
pub fn is_due(item: &VocabularyItem, config: &SchedulerConfig, now: DateTime<Utc>) -> bool {
    match item.last_reviewed {
        None => true,
        Some(last) => now - last >= config.intervals.for_level(item.mastery_level),
    }
}

/// Whole days the item is past its review interval. Zero when not yet
/// due, saturated high for never-reviewed items so they sort first.
pub fn days_overdue(item: &VocabularyItem, config: &SchedulerConfig, now: DateTime<Utc>) -> i64 {
    match item.last_reviewed {
        None => 999,
        Some(last) => {
            let interval = config.intervals.for_level(item.mastery_level);
            ((now - last) - interval).num_days().max(0)
        }
    }
}

/// Fold one session outcome into the item's review state.
///
/// Returns the updated record; the input is untouched and nothing is
/// persisted here. Mastery moves at most one level: up when the session
/// rate clears the promote threshold and the item has enough reviews
/// behind it, down when the session rate falls below the demote
/// threshold.
pub fn apply_outcome(
    item: &VocabularyItem,
    outcome: ReviewOutcome,
    config: &SchedulerConfig,
    now: DateTime<Utc>,
) -> VocabularyItem {
    let observed = outcome.observed_rate();
    let prior_count = item.review_count;

    let success_rate = if prior_count == 0 {
        observed
    } else {
        (item.success_rate * f64::from(prior_count) + observed) / f64::from(prior_count + 1)
    };
    let review_count = prior_count + 1;

    let mastery_level = next_level(item.mastery_level, observed, review_count, config);

    VocabularyItem {
        mastery_level,
        review_count,
        success_rate,
        last_reviewed: Some(now),
        ..item.clone()
    }
}

fn next_level(
    current: MasteryLevel,
    observed: f64,
    review_count: u32,
    config: &SchedulerConfig,
) -> MasteryLevel {
    if observed >= config.promote_threshold && review_count >= config.min_reviews.for_level(current)
    {
        current.promoted()
    } else if observed < config.demote_threshold && current != MasteryLevel::New {
        current.demoted()
    } else {
        current
    }
}
