//! Grammar tools

use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::{DifficultyLevel, GrammarCategory, GrammarConcept, MasteryStatus};
use crate::notion::Database;
use crate::schema;
use crate::tools::{parse_choice, ToolContext};

const CATEGORIES: &str = "Verbs, Nouns, Adjectives, Pronouns, Syntax, Word Order, Cases, Other";
const DIFFICULTY_LEVELS: &str = "Beginner, Intermediate, Advanced";
const MASTERY_STATUSES: &str = "Learning, Practicing, Comfortable, Mastered";

pub(crate) async fn fetch_all(
    ctx: &ToolContext,
    filter: Option<serde_json::Value>,
) -> Result<Vec<GrammarConcept>> {
    let pages = ctx.gateway.query_database(Database::Grammar, filter).await?;
    let mut concepts = Vec::with_capacity(pages.len());
    for page in &pages {
        match schema::grammar_from_page(page) {
            Ok(concept) => concepts.push(concept),
            Err(e) => warn!("Skipping unmappable grammar page: {}", e),
        }
    }
    Ok(concepts)
}

#[derive(Debug, Deserialize)]
pub struct AddConceptArgs {
    pub concept_name: String,
    pub category: String,
    pub difficulty_level: String,
    pub description: String,
    pub examples: String,
    #[serde(default)]
    pub practice_notes: Option<String>,
}

pub async fn add_concept(ctx: &ToolContext, args: AddConceptArgs) -> Result<String> {
    if args.concept_name.trim().is_empty() {
        return Err(Error::InvalidRequest("concept_name must not be empty".to_string()));
    }
    let category = parse_choice(&args.category, "category", GrammarCategory::parse, CATEGORIES)?;
    let difficulty_level = parse_choice(
        &args.difficulty_level,
        "difficulty_level",
        DifficultyLevel::parse,
        DIFFICULTY_LEVELS,
    )?;

    let mut concept =
        GrammarConcept::new(args.concept_name, category, difficulty_level, Utc::now());
    concept.description = Some(args.description);
    concept.examples = Some(args.examples);
    concept.practice_notes = args.practice_notes;

    let page = ctx
        .gateway
        .create_page(Database::Grammar, schema::grammar_properties(&concept))
        .await?;
    let created = schema::grammar_from_page(&page)?;
    info!("Added grammar concept '{}' as {}", created.concept_name, created.id);

    Ok(format!(
        "Successfully added grammar concept '{}'. ID: {}",
        created.concept_name, created.id
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListConceptsArgs {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub mastery_status: Option<String>,
}

pub async fn list_concepts(ctx: &ToolContext, args: ListConceptsArgs) -> Result<String> {
    let category = args
        .category
        .as_deref()
        .map(|c| parse_choice(c, "category", GrammarCategory::parse, CATEGORIES))
        .transpose()?;
    let difficulty = args
        .difficulty
        .as_deref()
        .map(|d| parse_choice(d, "difficulty", DifficultyLevel::parse, DIFFICULTY_LEVELS))
        .transpose()?;
    let mastery = args
        .mastery_status
        .as_deref()
        .map(|m| parse_choice(m, "mastery_status", MasteryStatus::parse, MASTERY_STATUSES))
        .transpose()?;

    let filter = schema::grammar_filter(category, difficulty, mastery);
    let concepts = fetch_all(ctx, filter).await?;

    if concepts.is_empty() {
        return Ok("No grammar concepts found matching the criteria.".to_string());
    }

    // Group by category for readability
    let mut by_category: BTreeMap<&str, Vec<&GrammarConcept>> = BTreeMap::new();
    for concept in &concepts {
        by_category.entry(concept.category.as_str()).or_default().push(concept);
    }

    let mut out = format!("Found {} grammar concepts:\n\n", concepts.len());
    for (category, items) in by_category {
        let _ = writeln!(out, "**{}:**", category);
        for concept in items {
            let _ = writeln!(
                out,
                "- {} ({}, {})",
                concept.concept_name, concept.difficulty_level, concept.mastery_status
            );
        }
        out.push('\n');
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
pub struct UpdateGrammarArgs {
    pub concept_id: String,
    pub mastery_status: String,
    #[serde(default)]
    pub practice_notes: Option<String>,
}

pub async fn update_mastery(ctx: &ToolContext, args: UpdateGrammarArgs) -> Result<String> {
    let status = parse_choice(
        &args.mastery_status,
        "mastery_status",
        MasteryStatus::parse,
        MASTERY_STATUSES,
    )?;

    let page = ctx.gateway.retrieve_page(&args.concept_id).await?;
    let concept = schema::grammar_from_page(&page)?;

    let properties = schema::grammar_mastery_properties(status, args.practice_notes.as_deref());
    ctx.gateway.update_page(&args.concept_id, properties).await?;
    info!(
        "Grammar concept '{}': {} -> {}",
        concept.concept_name, concept.mastery_status, status
    );

    let mut out = format!("Updated grammar concept '{}':\n", concept.concept_name);
    let _ = writeln!(out, "- New mastery status: {}", status);
    if args.practice_notes.is_some() {
        let _ = writeln!(out, "- Practice notes updated");
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub query: String,
}

pub async fn search(ctx: &ToolContext, args: SearchArgs) -> Result<String> {
    let needle = args.query.to_lowercase();
    let matches: Vec<GrammarConcept> = fetch_all(ctx, None)
        .await?
        .into_iter()
        .filter(|concept| {
            concept.concept_name.to_lowercase().contains(&needle)
                || concept.category.as_str().to_lowercase().contains(&needle)
                || concept
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
                || concept
                    .examples
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
        })
        .collect();

    if matches.is_empty() {
        return Ok(format!("No grammar concepts found matching '{}'", args.query));
    }

    let mut out = format!("Found {} grammar concepts:\n\n", matches.len());
    for concept in &matches {
        let _ = writeln!(out, "**{}**", concept.concept_name);
        let _ = writeln!(out, "- Category: {}", concept.category);
        let _ = writeln!(out, "- Difficulty: {}", concept.difficulty_level);
        let _ = writeln!(out, "- Mastery: {}", concept.mastery_status);
        if let Some(description) = &concept.description {
            let preview: String = if description.chars().count() > 100 {
                description.chars().take(100).collect::<String>() + "..."
            } else {
                description.clone()
            };
            let _ = writeln!(out, "- Description: {}", preview);
        }
        out.push('\n');
    }
    Ok(out)
}
