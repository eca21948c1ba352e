//! Vocabulary tools

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write as _;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::extract::extract_candidates;
use crate::model::{Difficulty, PartOfSpeech, VocabularyItem};
use crate::notion::Database;
use crate::review;
use crate::schema;
use crate::tools::{parse_choice, ToolContext};

/// Query the whole vocabulary database and normalize it. Pages that do
/// not fit the schema (for example rows added by hand with a bad select
/// option) are logged and skipped rather than failing the whole listing.
async fn fetch_all(ctx: &ToolContext, filter: Option<Value>) -> Result<Vec<VocabularyItem>> {
    let pages = ctx.gateway.query_database(Database::Vocabulary, filter).await?;
    let mut items = Vec::with_capacity(pages.len());
    for page in &pages {
        match schema::vocab_from_page(page) {
            Ok(item) => items.push(item),
            Err(e) => warn!("Skipping unmappable vocabulary page: {}", e),
        }
    }
    Ok(items)
}

/// All vocabulary currently eligible for review.
pub(crate) async fn due_pool(
    ctx: &ToolContext,
    now: chrono::DateTime<Utc>,
) -> Result<Vec<VocabularyItem>> {
    Ok(fetch_all(ctx, None)
        .await?
        .into_iter()
        .filter(|item| review::is_due(item, &ctx.scheduler, now))
        .collect())
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

#[derive(Debug, Deserialize)]
pub struct AddWordArgs {
    pub word: String,
    pub translation: String,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub example_sentence: Option<String>,
    #[serde(default)]
    pub example_translation: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub source_text: Option<String>,
}

pub async fn add_word(ctx: &ToolContext, args: AddWordArgs) -> Result<String> {
    if args.word.trim().is_empty() {
        return Err(Error::InvalidRequest("word must not be empty".to_string()));
    }

    let mut item = VocabularyItem::new(args.word, args.translation, Utc::now());
    if let Some(pos) = args.part_of_speech.as_deref() {
        item.part_of_speech = parse_choice(
            pos,
            "part_of_speech",
            PartOfSpeech::parse,
            "Noun, Verb, Adjective, Adverb, Phrase, Preposition, Conjunction, Pronoun, Other",
        )?;
    }
    if let Some(difficulty) = args.difficulty.as_deref() {
        item.difficulty =
            parse_choice(difficulty, "difficulty", Difficulty::parse, "Easy, Medium, Hard")?;
    }
    item.definition = args.definition;
    item.example_sentence = args.example_sentence;
    item.example_translation = args.example_translation;
    item.source_text = args.source_text;

    let page = ctx
        .gateway
        .create_page(Database::Vocabulary, schema::vocab_properties(&item))
        .await?;
    let created = schema::vocab_from_page(&page)?;
    info!("Added vocabulary word '{}' as {}", created.word, created.id);

    Ok(format!(
        "Successfully added '{}' to the vocabulary database. ID: {}",
        created.word, created.id
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReviewArgs {
    #[serde(default = "default_review_limit")]
    pub limit: i64,
}

fn default_review_limit() -> i64 {
    20
}

pub async fn words_for_review(ctx: &ToolContext, args: ReviewArgs) -> Result<String> {
    let now = Utc::now();
    let pool = due_pool(ctx, now).await?;

    // The composer handles ordering (stalest first) and the limit;
    // a negative limit surfaces as InvalidRequest.
    let session = review::compose(pool, vec![], args.limit, 0, now)?;

    if session.vocabulary.is_empty() {
        return Ok("No vocabulary words are currently due for review.".to_string());
    }

    let mut out = format!("Found {} words due for review:\n\n", session.vocabulary.len());
    for item in &session.vocabulary {
        let overdue = review::days_overdue(item, &ctx.scheduler, now);
        let _ = writeln!(out, "- **{}** ({})", item.word, item.translation);
        let _ = writeln!(
            out,
            "  - Mastery: {}, Difficulty: {}, Days overdue: {}",
            item.mastery_level, item.difficulty, overdue
        );
        if let Some(example) = &item.example_sentence {
            let _ = writeln!(out, "  - Example: {}", example);
        }
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
pub struct UpdateMasteryArgs {
    pub word_id: String,
    pub correct_answers: i64,
    pub total_answers: i64,
}

pub async fn update_mastery(ctx: &ToolContext, args: UpdateMasteryArgs) -> Result<String> {
    let outcome = outcome_from_counts(args.correct_answers, args.total_answers)?;

    let page = ctx.gateway.retrieve_page(&args.word_id).await?;
    let item = schema::vocab_from_page(&page)?;

    let updated = review::apply_outcome(&item, outcome, &ctx.scheduler, Utc::now());
    ctx.gateway
        .update_page(&updated.id, schema::vocab_review_properties(&updated))
        .await?;
    info!(
        "Reviewed '{}': {} -> {}",
        updated.word, item.mastery_level, updated.mastery_level
    );

    Ok(format!(
        "Updated mastery for '{}':\n\
         - New mastery level: {}\n\
         - Overall success rate: {}\n\
         - Session success rate: {}\n\
         - Total reviews: {}",
        updated.word,
        updated.mastery_level,
        percent(updated.success_rate),
        percent(outcome.observed_rate()),
        updated.review_count
    ))
}

/// Signed counts straight from the wire; negatives and inverted counts
/// are rejected before touching the scheduler.
pub(crate) fn outcome_from_counts(correct: i64, total: i64) -> Result<review::ReviewOutcome> {
    if correct < 0 || total < 0 {
        return Err(Error::InvalidOutcome(format!(
            "answer counts must not be negative (correct {}, total {})",
            correct, total
        )));
    }
    review::ReviewOutcome::new(correct as u32, total as u32)
}

#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub query: String,
}

pub async fn search(ctx: &ToolContext, args: SearchArgs) -> Result<String> {
    let needle = args.query.to_lowercase();
    let matches: Vec<VocabularyItem> = fetch_all(ctx, None)
        .await?
        .into_iter()
        .filter(|item| {
            item.word.to_lowercase().contains(&needle)
                || item.translation.to_lowercase().contains(&needle)
                || item
                    .definition
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect();

    if matches.is_empty() {
        return Ok(format!("No vocabulary entries found matching '{}'", args.query));
    }

    let mut out = format!("Found {} vocabulary entries:\n\n", matches.len());
    for item in &matches {
        let _ = writeln!(out, "- **{}** - {}", item.word, item.translation);
        if let Some(definition) = &item.definition {
            let _ = writeln!(out, "  - Definition: {}", definition);
        }
        let _ = writeln!(
            out,
            "  - Mastery: {}, Success rate: {}",
            item.mastery_level,
            percent(item.success_rate)
        );
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
pub struct ExtractArgs {
    pub text: String,
    #[serde(default)]
    pub add_to_database: bool,
}

pub async fn extract_from_text(ctx: &ToolContext, args: ExtractArgs) -> Result<String> {
    let candidates = extract_candidates(&args.text);
    if candidates.is_empty() {
        return Ok("No challenging words identified in the text.".to_string());
    }

    let mut out = format!(
        "Identified {} potentially challenging words:\n\n",
        candidates.len()
    );

    if !args.add_to_database {
        let _ = writeln!(out, "**Words identified:** {}", candidates.join(", "));
        return Ok(out);
    }

    let existing: Vec<String> = fetch_all(ctx, None)
        .await?
        .into_iter()
        .map(|item| item.word.to_lowercase())
        .collect();

    let excerpt: String = if args.text.chars().count() > 100 {
        args.text.chars().take(100).collect::<String>() + "..."
    } else {
        args.text.clone()
    };

    let mut added = Vec::new();
    let mut already_known = Vec::new();
    for word in candidates {
        if existing.contains(&word) {
            already_known.push(word);
            continue;
        }
        let mut item = VocabularyItem::new(word.clone(), "[Translation needed]".into(), Utc::now());
        item.source_text = Some(excerpt.clone());
        ctx.gateway
            .create_page(Database::Vocabulary, schema::vocab_properties(&item))
            .await?;
        added.push(word);
    }
    info!("Extraction added {} new words", added.len());

    if !already_known.is_empty() {
        let _ = writeln!(out, "**Already in database:** {}\n", already_known.join(", "));
    }
    if !added.is_empty() {
        let _ = writeln!(out, "**Added to database:** {}", added.join(", "));
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
pub struct DetailsArgs {
    pub word_id: String,
}

pub async fn word_details(ctx: &ToolContext, args: DetailsArgs) -> Result<String> {
    let page = ctx.gateway.retrieve_page(&args.word_id).await?;
    let item = schema::vocab_from_page(&page)?;

    let mut out = format!("**{}**\n\n", item.word);
    let _ = writeln!(out, "- **Translation:** {}", item.translation);
    let _ = writeln!(out, "- **Part of Speech:** {}", item.part_of_speech);
    if let Some(definition) = &item.definition {
        let _ = writeln!(out, "- **Definition:** {}", definition);
    }
    let _ = writeln!(out, "- **Difficulty:** {}", item.difficulty);
    let _ = writeln!(out, "- **Mastery Level:** {}", item.mastery_level);

    if let Some(example) = &item.example_sentence {
        let _ = writeln!(out, "\n**Example:**");
        let _ = writeln!(out, "- Swedish: {}", example);
        if let Some(translation) = &item.example_translation {
            let _ = writeln!(out, "- English: {}", translation);
        }
    }

    let _ = writeln!(out, "\n**Statistics:**");
    let _ = writeln!(out, "- Review Count: {}", item.review_count);
    let _ = writeln!(out, "- Success Rate: {}", percent(item.success_rate));
    if let Some(last) = item.last_reviewed {
        let _ = writeln!(out, "- Last Reviewed: {}", last.format("%Y-%m-%d"));
    }
    if let Some(source) = &item.source_text {
        let _ = writeln!(out, "\n**Source:** {}", source);
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
pub struct MarkArgs {
    pub word_ids: Vec<String>,
}

pub async fn mark_for_review(ctx: &ToolContext, args: MarkArgs) -> Result<String> {
    let mut updated = Vec::new();
    let mut failed = Vec::new();

    for word_id in &args.word_ids {
        let result = async {
            let page = ctx.gateway.retrieve_page(word_id).await?;
            let item = schema::vocab_from_page(&page)?;
            ctx.gateway
                .update_page(word_id, schema::mark_for_review_properties())
                .await?;
            Ok::<String, Error>(item.word)
        }
        .await;

        match result {
            Ok(word) => updated.push(word),
            Err(e) => failed.push((word_id.clone(), e.to_string())),
        }
    }

    let mut out = format!("Marked {} words for review.\n", updated.len());
    if !updated.is_empty() {
        let _ = writeln!(out, "\n**Successfully updated:**");
        for word in &updated {
            let _ = writeln!(out, "- {}", word);
        }
    }
    if !failed.is_empty() {
        let _ = writeln!(out, "\n**Failed to update:**");
        for (id, error) in &failed {
            let _ = writeln!(out, "- ID: {} - {}", id, error);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_counts_reject_negatives() {
        assert!(matches!(outcome_from_counts(-1, 10), Err(Error::InvalidOutcome(_))));
        assert!(matches!(outcome_from_counts(5, -10), Err(Error::InvalidOutcome(_))));
        assert!(matches!(outcome_from_counts(11, 10), Err(Error::InvalidOutcome(_))));
        assert!(outcome_from_counts(8, 10).is_ok());
    }

    #[test]
    fn percent_formats_stored_rates() {
        assert_eq!(percent(0.875), "87.5%");
        assert_eq!(percent(0.0), "0.0%");
        assert_eq!(percent(1.0), "100.0%");
    }
}
