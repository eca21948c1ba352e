//! MCP tool surface
//!
//! One handler per tool, grouped the way the databases are: vocabulary,
//! grammar, and mixed study sessions. This layer validates argument
//! shapes, orchestrates gateway + schema + scheduler, and renders
//! Markdown summaries for the assistant. No policy decisions live here.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::notion::NotionGateway;

pub mod grammar;
pub mod study;
pub mod vocabulary;

/// Shared state for all tool calls.
pub struct ToolContext {
    pub gateway: NotionGateway,
    pub scheduler: SchedulerConfig,
}

/// Dispatch a named tool call. Unknown names are an `InvalidRequest`
/// so the server can answer with a proper method-level error.
pub async fn call_tool(ctx: &ToolContext, name: &str, args: Value) -> Result<String> {
    match name {
        "add_vocabulary_word" => vocabulary::add_word(ctx, parse_args(name, args)?).await,
        "get_vocabulary_for_review" => {
            vocabulary::words_for_review(ctx, parse_args(name, args)?).await
        }
        "update_word_mastery" => vocabulary::update_mastery(ctx, parse_args(name, args)?).await,
        "search_vocabulary" => vocabulary::search(ctx, parse_args(name, args)?).await,
        "extract_vocabulary_from_text" => {
            vocabulary::extract_from_text(ctx, parse_args(name, args)?).await
        }
        "get_word_details" => vocabulary::word_details(ctx, parse_args(name, args)?).await,
        "mark_words_for_review" => vocabulary::mark_for_review(ctx, parse_args(name, args)?).await,
        "add_grammar_concept" => grammar::add_concept(ctx, parse_args(name, args)?).await,
        "get_grammar_concepts" => grammar::list_concepts(ctx, parse_args(name, args)?).await,
        "update_grammar_mastery" => grammar::update_mastery(ctx, parse_args(name, args)?).await,
        "search_grammar" => grammar::search(ctx, parse_args(name, args)?).await,
        "get_study_session_data" => study::session_data(ctx, parse_args(name, args)?).await,
        "update_study_progress" => study::update_progress(ctx, parse_args(name, args)?).await,
        _ => Err(Error::InvalidRequest(format!("unknown tool '{}'", name))),
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| Error::InvalidRequest(format!("invalid arguments for {}: {}", tool, e)))
}

/// Parse an enum-valued string argument, naming the argument and the
/// accepted values on failure.
fn parse_choice<T>(
    value: &str,
    argument: &str,
    parse: fn(&str) -> Option<T>,
    allowed: &str,
) -> Result<T> {
    parse(value).ok_or_else(|| {
        Error::InvalidRequest(format!(
            "{} '{}' is not recognized (expected one of: {})",
            argument, value, allowed
        ))
    })
}

/// Tool catalog for `tools/list`.
pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "add_vocabulary_word",
            "description": "Add a new word to the vocabulary database",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "word": { "type": "string", "description": "The Swedish word or phrase" },
                    "translation": { "type": "string", "description": "English translation" },
                    "part_of_speech": {
                        "type": "string",
                        "enum": ["Noun", "Verb", "Adjective", "Adverb", "Phrase",
                                 "Preposition", "Conjunction", "Pronoun", "Other"]
                    },
                    "definition": { "type": "string" },
                    "example_sentence": { "type": "string" },
                    "example_translation": { "type": "string" },
                    "difficulty": { "type": "string", "enum": ["Easy", "Medium", "Hard"] },
                    "source_text": { "type": "string" }
                },
                "required": ["word", "translation"]
            }
        }),
        json!({
            "name": "get_vocabulary_for_review",
            "description": "Get vocabulary words due for review based on spaced repetition",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "description": "Maximum words to return" }
                }
            }
        }),
        json!({
            "name": "update_word_mastery",
            "description": "Update mastery level and statistics after studying a word",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "word_id": { "type": "string" },
                    "correct_answers": { "type": "integer" },
                    "total_answers": { "type": "integer" }
                },
                "required": ["word_id", "correct_answers", "total_answers"]
            }
        }),
        json!({
            "name": "search_vocabulary",
            "description": "Search vocabulary by word, translation, or definition",
            "inputSchema": {
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }
        }),
        json!({
            "name": "extract_vocabulary_from_text",
            "description": "Identify potentially challenging Swedish words in a text",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "text": { "type": "string" },
                    "add_to_database": {
                        "type": "boolean",
                        "description": "Add new candidates with a placeholder translation"
                    }
                },
                "required": ["text"]
            }
        }),
        json!({
            "name": "get_word_details",
            "description": "Get full details for a specific vocabulary entry",
            "inputSchema": {
                "type": "object",
                "properties": { "word_id": { "type": "string" } },
                "required": ["word_id"]
            }
        }),
        json!({
            "name": "mark_words_for_review",
            "description": "Mark words for immediate review by clearing their last reviewed date",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "word_ids": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["word_ids"]
            }
        }),
        json!({
            "name": "add_grammar_concept",
            "description": "Add a new grammar concept to the database",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "concept_name": { "type": "string" },
                    "category": {
                        "type": "string",
                        "enum": ["Verbs", "Nouns", "Adjectives", "Pronouns",
                                 "Syntax", "Word Order", "Cases", "Other"]
                    },
                    "difficulty_level": {
                        "type": "string",
                        "enum": ["Beginner", "Intermediate", "Advanced"]
                    },
                    "description": { "type": "string" },
                    "examples": { "type": "string" },
                    "practice_notes": { "type": "string" }
                },
                "required": ["concept_name", "category", "difficulty_level",
                             "description", "examples"]
            }
        }),
        json!({
            "name": "get_grammar_concepts",
            "description": "List grammar concepts with optional filtering",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "category": { "type": "string" },
                    "difficulty": { "type": "string" },
                    "mastery_status": { "type": "string" }
                }
            }
        }),
        json!({
            "name": "update_grammar_mastery",
            "description": "Update mastery status and notes for a grammar concept",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "concept_id": { "type": "string" },
                    "mastery_status": {
                        "type": "string",
                        "enum": ["Learning", "Practicing", "Comfortable", "Mastered"]
                    },
                    "practice_notes": { "type": "string" }
                },
                "required": ["concept_id", "mastery_status"]
            }
        }),
        json!({
            "name": "search_grammar",
            "description": "Search grammar concepts by name, category, or content",
            "inputSchema": {
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }
        }),
        json!({
            "name": "get_study_session_data",
            "description": "Prepare a mixed study session with vocabulary and grammar",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "vocab_count": { "type": "integer" },
                    "grammar_count": { "type": "integer" }
                }
            }
        }),
        json!({
            "name": "update_study_progress",
            "description": "Update progress after completing a study session",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "results": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "type": { "type": "string", "enum": ["vocabulary", "grammar"] },
                                "id": { "type": "string" },
                                "correct": { "type": "integer" },
                                "total": { "type": "integer" },
                                "new_mastery": { "type": "string" },
                                "notes": { "type": "string" }
                            },
                            "required": ["type", "id"]
                        }
                    }
                },
                "required": ["results"]
            }
        }),
    ]
}
