//! Normalized record types for vocabulary and grammar entries
//!
//! These are the only shapes the scheduler and composer ever see.
//! Raw Notion property bags are converted to and from these records at
//! the schema boundary, so invalid enum values cannot reach core logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mastery progression for vocabulary, driven by the review scheduler.
///
/// Variant order matters: `Ord` is used for promotion/demotion and for
/// tie-breaking in session composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MasteryLevel {
    New,
    Learning,
    Familiar,
    Mastered,
}

impl MasteryLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MasteryLevel::New => "New",
            MasteryLevel::Learning => "Learning",
            MasteryLevel::Familiar => "Familiar",
            MasteryLevel::Mastered => "Mastered",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "New" => Some(MasteryLevel::New),
            "Learning" => Some(MasteryLevel::Learning),
            "Familiar" => Some(MasteryLevel::Familiar),
            "Mastered" => Some(MasteryLevel::Mastered),
            _ => None,
        }
    }

    /// Next level up, saturating at `Mastered`.
    pub fn promoted(self) -> Self {
        match self {
            MasteryLevel::New => MasteryLevel::Learning,
            MasteryLevel::Learning => MasteryLevel::Familiar,
            MasteryLevel::Familiar | MasteryLevel::Mastered => MasteryLevel::Mastered,
        }
    }

    /// Next level down, saturating at `New`.
    pub fn demoted(self) -> Self {
        match self {
            MasteryLevel::New | MasteryLevel::Learning => MasteryLevel::New,
            MasteryLevel::Familiar => MasteryLevel::Learning,
            MasteryLevel::Mastered => MasteryLevel::Familiar,
        }
    }
}

impl fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-set difficulty rating. Never changed by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Easy" => Some(Difficulty::Easy),
            "Medium" => Some(Difficulty::Medium),
            "Hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Phrase,
    Preposition,
    Conjunction,
    Pronoun,
    Other,
}

impl PartOfSpeech {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "Noun",
            PartOfSpeech::Verb => "Verb",
            PartOfSpeech::Adjective => "Adjective",
            PartOfSpeech::Adverb => "Adverb",
            PartOfSpeech::Phrase => "Phrase",
            PartOfSpeech::Preposition => "Preposition",
            PartOfSpeech::Conjunction => "Conjunction",
            PartOfSpeech::Pronoun => "Pronoun",
            PartOfSpeech::Other => "Other",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Noun" => Some(PartOfSpeech::Noun),
            "Verb" => Some(PartOfSpeech::Verb),
            "Adjective" => Some(PartOfSpeech::Adjective),
            "Adverb" => Some(PartOfSpeech::Adverb),
            "Phrase" => Some(PartOfSpeech::Phrase),
            "Preposition" => Some(PartOfSpeech::Preposition),
            "Conjunction" => Some(PartOfSpeech::Conjunction),
            "Pronoun" => Some(PartOfSpeech::Pronoun),
            "Other" => Some(PartOfSpeech::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vocabulary entry normalized from the Notion vocabulary database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// Notion page id. Empty for records not yet persisted.
    pub id: String,
    pub word: String,
    pub translation: String,
    pub part_of_speech: PartOfSpeech,
    pub definition: Option<String>,
    pub example_sentence: Option<String>,
    pub example_translation: Option<String>,
    pub source_text: Option<String>,
    pub date_added: DateTime<Utc>,
    pub mastery_level: MasteryLevel,
    pub difficulty: Difficulty,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub review_count: u32,
    /// Running success rate in [0, 1]. Meaningful only when review_count > 0.
    pub success_rate: f64,
}

impl VocabularyItem {
    /// Fresh record for a word being added now. Gets its id from Notion
    /// on insert.
    pub fn new(word: String, translation: String, now: DateTime<Utc>) -> Self {
        VocabularyItem {
            id: String::new(),
            word,
            translation,
            part_of_speech: PartOfSpeech::Noun,
            definition: None,
            example_sentence: None,
            example_translation: None,
            source_text: None,
            date_added: now,
            mastery_level: MasteryLevel::New,
            difficulty: Difficulty::Medium,
            last_reviewed: None,
            review_count: 0,
            success_rate: 0.0,
        }
    }
}

/// Mastery progression for grammar concepts. Set directly by the user or
/// the study tools; there is no success-rate-driven transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MasteryStatus {
    Learning,
    Practicing,
    Comfortable,
    Mastered,
}

impl MasteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MasteryStatus::Learning => "Learning",
            MasteryStatus::Practicing => "Practicing",
            MasteryStatus::Comfortable => "Comfortable",
            MasteryStatus::Mastered => "Mastered",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Learning" => Some(MasteryStatus::Learning),
            "Practicing" => Some(MasteryStatus::Practicing),
            "Comfortable" => Some(MasteryStatus::Comfortable),
            "Mastered" => Some(MasteryStatus::Mastered),
            _ => None,
        }
    }
}

impl fmt::Display for MasteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrammarCategory {
    Verbs,
    Nouns,
    Adjectives,
    Pronouns,
    Syntax,
    WordOrder,
    Cases,
    Other,
}

impl GrammarCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarCategory::Verbs => "Verbs",
            GrammarCategory::Nouns => "Nouns",
            GrammarCategory::Adjectives => "Adjectives",
            GrammarCategory::Pronouns => "Pronouns",
            GrammarCategory::Syntax => "Syntax",
            GrammarCategory::WordOrder => "Word Order",
            GrammarCategory::Cases => "Cases",
            GrammarCategory::Other => "Other",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Verbs" => Some(GrammarCategory::Verbs),
            "Nouns" => Some(GrammarCategory::Nouns),
            "Adjectives" => Some(GrammarCategory::Adjectives),
            "Pronouns" => Some(GrammarCategory::Pronouns),
            "Syntax" => Some(GrammarCategory::Syntax),
            "Word Order" => Some(GrammarCategory::WordOrder),
            "Cases" => Some(GrammarCategory::Cases),
            "Other" => Some(GrammarCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for GrammarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "Beginner",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Beginner" => Some(DifficultyLevel::Beginner),
            "Intermediate" => Some(DifficultyLevel::Intermediate),
            "Advanced" => Some(DifficultyLevel::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grammar concept normalized from the Notion grammar database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarConcept {
    /// Notion page id. Empty for records not yet persisted.
    pub id: String,
    pub concept_name: String,
    pub category: GrammarCategory,
    pub difficulty_level: DifficultyLevel,
    pub description: Option<String>,
    pub examples: Option<String>,
    pub practice_notes: Option<String>,
    pub date_added: DateTime<Utc>,
    pub mastery_status: MasteryStatus,
}

impl GrammarConcept {
    pub fn new(
        concept_name: String,
        category: GrammarCategory,
        difficulty_level: DifficultyLevel,
        now: DateTime<Utc>,
    ) -> Self {
        GrammarConcept {
            id: String::new(),
            concept_name,
            category,
            difficulty_level,
            description: None,
            examples: None,
            practice_notes: None,
            date_added: now,
            mastery_status: MasteryStatus::Learning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastery_level_order_follows_progression() {
        assert!(MasteryLevel::New < MasteryLevel::Learning);
        assert!(MasteryLevel::Learning < MasteryLevel::Familiar);
        assert!(MasteryLevel::Familiar < MasteryLevel::Mastered);
    }

    #[test]
    fn promotion_and_demotion_saturate() {
        assert_eq!(MasteryLevel::Mastered.promoted(), MasteryLevel::Mastered);
        assert_eq!(MasteryLevel::New.demoted(), MasteryLevel::New);
        assert_eq!(MasteryLevel::Learning.promoted(), MasteryLevel::Familiar);
        assert_eq!(MasteryLevel::Familiar.demoted(), MasteryLevel::Learning);
    }

    #[test]
    fn enum_names_round_trip_through_parse() {
        for level in [
            MasteryLevel::New,
            MasteryLevel::Learning,
            MasteryLevel::Familiar,
            MasteryLevel::Mastered,
        ] {
            assert_eq!(MasteryLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(GrammarCategory::parse("Word Order"), Some(GrammarCategory::WordOrder));
        assert_eq!(MasteryLevel::parse("Fluent"), None);
    }
}
