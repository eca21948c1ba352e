//! Spaced-repetition core
//!
//! Pure policy logic: the scheduler decides when items are due and how
//! mastery evolves after a study attempt; the composer selects a bounded
//! mixed study set. Nothing in this module performs I/O — persistence is
//! the caller's job through the Notion gateway.

mod scheduler;
mod session;

pub use scheduler::{apply_outcome, days_overdue, is_due, staleness, ReviewOutcome};
pub use session::{compose, StudySession};
