//! Mixed study session tools

use chrono::Utc;
use serde::Deserialize;
use std::fmt::Write as _;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{MasteryStatus, VocabularyItem};
use crate::review;
use crate::schema;
use crate::tools::vocabulary::outcome_from_counts;
use crate::tools::{grammar, parse_choice, ToolContext};

#[derive(Debug, Deserialize)]
pub struct SessionArgs {
    #[serde(default = "default_vocab_count")]
    pub vocab_count: i64,
    #[serde(default = "default_grammar_count")]
    pub grammar_count: i64,
}

fn default_vocab_count() -> i64 {
    10
}

fn default_grammar_count() -> i64 {
    5
}

pub async fn session_data(ctx: &ToolContext, args: SessionArgs) -> Result<String> {
    let now = Utc::now();

    let vocab_pool: Vec<VocabularyItem> = super::vocabulary::due_pool(ctx, now).await?;
    let grammar_pool =
        grammar::fetch_all(ctx, Some(schema::grammar_study_filter())).await?;

    let pool_sizes = (vocab_pool.len(), grammar_pool.len());
    let session = review::compose(vocab_pool, grammar_pool, args.vocab_count, args.grammar_count, now)?;

    if session.total() == 0 {
        return Ok("Nothing is due for study right now.".to_string());
    }
    if (session.vocabulary.len() as i64) < args.vocab_count && pool_sizes.0 == session.vocabulary.len()
    {
        info!(
            "Vocabulary pool smaller than requested: {} of {}",
            session.vocabulary.len(),
            args.vocab_count
        );
    }

    let mut out = String::from("**Study Session Prepared**\n\n");
    if !session.vocabulary.is_empty() {
        let _ = writeln!(out, "**Vocabulary ({} words):**", session.vocabulary.len());
        for item in &session.vocabulary {
            let _ = writeln!(out, "- {} - {}", item.word, item.translation);
        }
        out.push('\n');
    }
    if !session.grammar.is_empty() {
        let _ = writeln!(out, "**Grammar ({} concepts):**", session.grammar.len());
        for concept in &session.grammar {
            let _ = writeln!(out, "- {} ({})", concept.concept_name, concept.category);
        }
        out.push('\n');
    }
    let _ = write!(out, "Total items for review: {}", session.total());
    Ok(out)
}

/// Per-item result reported back after a study session.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEntry {
    Vocabulary { id: String, correct: i64, total: i64 },
    Grammar {
        id: String,
        new_mastery: String,
        #[serde(default)]
        notes: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct ProgressArgs {
    pub results: Vec<ProgressEntry>,
}

pub async fn update_progress(ctx: &ToolContext, args: ProgressArgs) -> Result<String> {
    if args.results.is_empty() {
        return Err(Error::InvalidRequest("results must not be empty".to_string()));
    }

    let now = Utc::now();
    let mut vocab_lines = Vec::new();
    let mut grammar_lines = Vec::new();

    for entry in args.results {
        match entry {
            ProgressEntry::Vocabulary { id, correct, total } => {
                let outcome = outcome_from_counts(correct, total)?;
                let page = ctx.gateway.retrieve_page(&id).await?;
                let item = schema::vocab_from_page(&page)?;
                let updated = review::apply_outcome(&item, outcome, &ctx.scheduler, now);
                ctx.gateway
                    .update_page(&updated.id, schema::vocab_review_properties(&updated))
                    .await?;
                vocab_lines.push(format!(
                    "- {}: {} ({:.1}%)",
                    updated.word,
                    updated.mastery_level,
                    updated.success_rate * 100.0
                ));
            }
            ProgressEntry::Grammar { id, new_mastery, notes } => {
                let status = parse_choice(
                    &new_mastery,
                    "new_mastery",
                    MasteryStatus::parse,
                    "Learning, Practicing, Comfortable, Mastered",
                )?;
                let page = ctx.gateway.retrieve_page(&id).await?;
                let concept = schema::grammar_from_page(&page)?;
                ctx.gateway
                    .update_page(&id, schema::grammar_mastery_properties(status, notes.as_deref()))
                    .await?;
                grammar_lines.push(format!("- {}: {}", concept.concept_name, status));
            }
        }
    }

    let mut out = String::from("**Study Session Progress Updated**\n\n");
    if !vocab_lines.is_empty() {
        let _ = writeln!(out, "**Vocabulary ({} words updated):**", vocab_lines.len());
        for line in &vocab_lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    if !grammar_lines.is_empty() {
        let _ = writeln!(out, "**Grammar ({} concepts updated):**", grammar_lines.len());
        for line in &grammar_lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    Ok(out)
}
