//! Notion property schema mapping
//!
//! Converts between normalized records and the property bags the Notion
//! API uses, in both directions. Property names are case-sensitive and
//! must match the database schema exactly. All functions here are pure;
//! reading fails with a `Schema` error naming the offending property,
//! writing is total.
//!
//! Readers accept both API page payloads (which carry `plain_text`) and
//! the request shapes this module writes (which carry `text.content`),
//! so `vocab_from_page(page_with(vocab_properties(x))) == x`.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::model::{
    Difficulty, DifficultyLevel, GrammarCategory, GrammarConcept, MasteryLevel, MasteryStatus,
    PartOfSpeech, VocabularyItem,
};

// Vocabulary database property names.
const PROP_WORD: &str = "Word/Phrase";
const PROP_TRANSLATION: &str = "English Translation";
const PROP_PART_OF_SPEECH: &str = "Part of Speech";
const PROP_DEFINITION: &str = "Definition";
const PROP_EXAMPLE: &str = "Example Sentence";
const PROP_EXAMPLE_TRANSLATION: &str = "Example Translation";
const PROP_DATE_ADDED: &str = "Date Added";
const PROP_MASTERY_LEVEL: &str = "Mastery Level";
const PROP_DIFFICULTY: &str = "Difficulty";
const PROP_LAST_REVIEWED: &str = "Last Reviewed";
const PROP_REVIEW_COUNT: &str = "Review Count";
const PROP_SUCCESS_RATE: &str = "Success Rate";
const PROP_SOURCE_TEXT: &str = "Source Text";

// Grammar database property names.
const PROP_CONCEPT_NAME: &str = "Concept Name";
const PROP_CATEGORY: &str = "Category";
const PROP_DIFFICULTY_LEVEL: &str = "Difficulty Level";
const PROP_DESCRIPTION: &str = "Description";
const PROP_EXAMPLES: &str = "Examples";
const PROP_PRACTICE_NOTES: &str = "Practice Notes";
const PROP_MASTERY_STATUS: &str = "Mastery Status";

/// Normalize a vocabulary page into a record.
///
/// The title is the only hard-required text; optional text properties
/// normalize to `None` when absent or empty.
pub fn vocab_from_page(page: &Value) -> Result<VocabularyItem> {
    let id = page_id(page)?;
    let props = properties(page)?;

    let word = text_prop(props, PROP_WORD, "title");
    if word.is_empty() {
        return Err(Error::schema(PROP_WORD, "is missing or empty".to_string()));
    }

    Ok(VocabularyItem {
        id,
        word,
        translation: text_prop(props, PROP_TRANSLATION, "rich_text"),
        part_of_speech: select_prop(props, PROP_PART_OF_SPEECH, PartOfSpeech::parse)?
            .unwrap_or(PartOfSpeech::Other),
        definition: optional_text_prop(props, PROP_DEFINITION),
        example_sentence: optional_text_prop(props, PROP_EXAMPLE),
        example_translation: optional_text_prop(props, PROP_EXAMPLE_TRANSLATION),
        source_text: optional_text_prop(props, PROP_SOURCE_TEXT),
        date_added: date_prop(props, PROP_DATE_ADDED)?
            .ok_or_else(|| Error::schema(PROP_DATE_ADDED, "is missing".to_string()))?,
        mastery_level: select_prop(props, PROP_MASTERY_LEVEL, MasteryLevel::parse)?
            .unwrap_or(MasteryLevel::New),
        difficulty: select_prop(props, PROP_DIFFICULTY, Difficulty::parse)?
            .unwrap_or(Difficulty::Medium),
        last_reviewed: date_prop(props, PROP_LAST_REVIEWED)?,
        review_count: count_prop(props, PROP_REVIEW_COUNT)?,
        success_rate: rate_prop(props, PROP_SUCCESS_RATE)?,
    })
}

/// Full property bag for a vocabulary record. Total: every managed
/// property is written, absent optionals as empty values.
pub fn vocab_properties(item: &VocabularyItem) -> Value {
    json!({
        PROP_WORD: title_value(&item.word),
        PROP_TRANSLATION: rich_text_value(&item.translation),
        PROP_PART_OF_SPEECH: select_value(item.part_of_speech.as_str()),
        PROP_DEFINITION: rich_text_value(item.definition.as_deref().unwrap_or("")),
        PROP_EXAMPLE: rich_text_value(item.example_sentence.as_deref().unwrap_or("")),
        PROP_EXAMPLE_TRANSLATION:
            rich_text_value(item.example_translation.as_deref().unwrap_or("")),
        PROP_SOURCE_TEXT: rich_text_value(item.source_text.as_deref().unwrap_or("")),
        PROP_DATE_ADDED: date_value(Some(item.date_added)),
        PROP_MASTERY_LEVEL: select_value(item.mastery_level.as_str()),
        PROP_DIFFICULTY: select_value(item.difficulty.as_str()),
        PROP_LAST_REVIEWED: date_value(item.last_reviewed),
        PROP_REVIEW_COUNT: json!({ "number": item.review_count }),
        PROP_SUCCESS_RATE: json!({ "number": item.success_rate }),
    })
}

/// Partial update written after a review outcome: only the fields the
/// scheduler evolves.
pub fn vocab_review_properties(item: &VocabularyItem) -> Value {
    json!({
        PROP_MASTERY_LEVEL: select_value(item.mastery_level.as_str()),
        PROP_REVIEW_COUNT: json!({ "number": item.review_count }),
        PROP_SUCCESS_RATE: json!({ "number": item.success_rate }),
        PROP_LAST_REVIEWED: date_value(item.last_reviewed),
    })
}

/// Clearing the last-reviewed date makes the word unconditionally due.
pub fn mark_for_review_properties() -> Value {
    json!({ PROP_LAST_REVIEWED: { "date": null } })
}

/// Normalize a grammar page into a record.
pub fn grammar_from_page(page: &Value) -> Result<GrammarConcept> {
    let id = page_id(page)?;
    let props = properties(page)?;

    let concept_name = text_prop(props, PROP_CONCEPT_NAME, "title");
    if concept_name.is_empty() {
        return Err(Error::schema(PROP_CONCEPT_NAME, "is missing or empty".to_string()));
    }

    Ok(GrammarConcept {
        id,
        concept_name,
        category: select_prop(props, PROP_CATEGORY, GrammarCategory::parse)?
            .unwrap_or(GrammarCategory::Other),
        difficulty_level: select_prop(props, PROP_DIFFICULTY_LEVEL, DifficultyLevel::parse)?
            .unwrap_or(DifficultyLevel::Beginner),
        description: optional_text_prop(props, PROP_DESCRIPTION),
        examples: optional_text_prop(props, PROP_EXAMPLES),
        practice_notes: optional_text_prop(props, PROP_PRACTICE_NOTES),
        date_added: date_prop(props, PROP_DATE_ADDED)?
            .ok_or_else(|| Error::schema(PROP_DATE_ADDED, "is missing".to_string()))?,
        mastery_status: select_prop(props, PROP_MASTERY_STATUS, MasteryStatus::parse)?
            .unwrap_or(MasteryStatus::Learning),
    })
}

/// Full property bag for a grammar record.
pub fn grammar_properties(concept: &GrammarConcept) -> Value {
    json!({
        PROP_CONCEPT_NAME: title_value(&concept.concept_name),
        PROP_CATEGORY: select_value(concept.category.as_str()),
        PROP_DIFFICULTY_LEVEL: select_value(concept.difficulty_level.as_str()),
        PROP_DESCRIPTION: rich_text_value(concept.description.as_deref().unwrap_or("")),
        PROP_EXAMPLES: rich_text_value(concept.examples.as_deref().unwrap_or("")),
        PROP_PRACTICE_NOTES: rich_text_value(concept.practice_notes.as_deref().unwrap_or("")),
        PROP_DATE_ADDED: date_value(Some(concept.date_added)),
        PROP_MASTERY_STATUS: select_value(concept.mastery_status.as_str()),
    })
}

/// Partial update for a mastery status change, optionally replacing the
/// practice notes.
pub fn grammar_mastery_properties(status: MasteryStatus, notes: Option<&str>) -> Value {
    let mut props = Map::new();
    props.insert(PROP_MASTERY_STATUS.to_string(), select_value(status.as_str()));
    if let Some(notes) = notes {
        props.insert(PROP_PRACTICE_NOTES.to_string(), rich_text_value(notes));
    }
    Value::Object(props)
}

/// Server-side filter for `get_grammar_concepts`. `None` when no
/// criteria are given (query the whole database).
pub fn grammar_filter(
    category: Option<GrammarCategory>,
    difficulty: Option<DifficultyLevel>,
    mastery: Option<MasteryStatus>,
) -> Option<Value> {
    let mut conditions = Vec::new();
    if let Some(category) = category {
        conditions.push(json!({
            "property": PROP_CATEGORY,
            "select": { "equals": category.as_str() }
        }));
    }
    if let Some(difficulty) = difficulty {
        conditions.push(json!({
            "property": PROP_DIFFICULTY_LEVEL,
            "select": { "equals": difficulty.as_str() }
        }));
    }
    if let Some(mastery) = mastery {
        conditions.push(json!({
            "property": PROP_MASTERY_STATUS,
            "select": { "equals": mastery.as_str() }
        }));
    }

    match conditions.len() {
        0 => None,
        1 => conditions.pop(),
        _ => Some(json!({ "and": conditions })),
    }
}

/// Filter for the study-session grammar pool: everything that is not
/// yet mastered.
pub fn grammar_study_filter() -> Value {
    json!({
        "property": PROP_MASTERY_STATUS,
        "select": { "does_not_equal": MasteryStatus::Mastered.as_str() }
    })
}

fn page_id(page: &Value) -> Result<String> {
    page.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::schema("id", "is missing from the page object".to_string()))
}

fn properties(page: &Value) -> Result<&Map<String, Value>> {
    page.get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::schema("properties", "is missing from the page object".to_string()))
}

/// Concatenated plain text of a title or rich_text property. Missing
/// properties read as the empty string.
fn text_prop(props: &Map<String, Value>, name: &str, kind: &str) -> String {
    let Some(fragments) = props.get(name).and_then(|p| p.get(kind)).and_then(Value::as_array)
    else {
        return String::new();
    };
    fragments
        .iter()
        .map(|fragment| {
            fragment
                .get("plain_text")
                .or_else(|| fragment.get("text").and_then(|t| t.get("content")))
                .and_then(Value::as_str)
                .unwrap_or("")
        })
        .collect()
}

fn optional_text_prop(props: &Map<String, Value>, name: &str) -> Option<String> {
    let text = text_prop(props, name, "rich_text");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parse a select property through the given enum parser. Absent selects
/// are `None` (callers choose the default); unknown names are an error
/// so invalid states never reach the scheduler.
fn select_prop<T>(
    props: &Map<String, Value>,
    name: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    let Some(selected) = props
        .get(name)
        .and_then(|p| p.get("select"))
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
    else {
        return Ok(None);
    };
    parse(selected)
        .map(Some)
        .ok_or_else(|| Error::schema(name, format!("has unknown option '{}'", selected)))
}

fn date_prop(props: &Map<String, Value>, name: &'static str) -> Result<Option<DateTime<Utc>>> {
    let Some(start) = props
        .get(name)
        .and_then(|p| p.get("date"))
        .and_then(|d| d.get("start"))
        .and_then(Value::as_str)
    else {
        return Ok(None);
    };
    parse_date(start)
        .map(Some)
        .ok_or_else(|| Error::schema(name, format!("has unparsable date '{}'", start)))
}

/// Notion returns either a full RFC 3339 timestamp or a bare date.
fn parse_date(start: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(start) {
        return Some(dt.with_timezone(&Utc));
    }
    start
        .parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn count_prop(props: &Map<String, Value>, name: &'static str) -> Result<u32> {
    let Some(number) = props.get(name).and_then(|p| p.get("number")).and_then(Value::as_f64)
    else {
        return Ok(0);
    };
    if number < 0.0 || number.fract() != 0.0 || number > f64::from(u32::MAX) {
        return Err(Error::schema(name, format!("must be a non-negative integer, got {}", number)));
    }
    Ok(number as u32)
}

fn rate_prop(props: &Map<String, Value>, name: &'static str) -> Result<f64> {
    let Some(number) = props.get(name).and_then(|p| p.get("number")).and_then(Value::as_f64)
    else {
        return Ok(0.0);
    };
    if !(0.0..=1.0).contains(&number) {
        return Err(Error::schema(name, format!("must be in [0, 1], got {}", number)));
    }
    Ok(number)
}

fn title_value(text: &str) -> Value {
    json!({ "title": [{ "text": { "content": text } }] })
}

fn rich_text_value(text: &str) -> Value {
    if text.is_empty() {
        json!({ "rich_text": [] })
    } else {
        json!({ "rich_text": [{ "text": { "content": text } }] })
    }
}

fn select_value(name: &str) -> Value {
    json!({ "select": { "name": name } })
}

fn date_value(date: Option<DateTime<Utc>>) -> Value {
    match date {
        Some(date) => json!({ "date": { "start": date.to_rfc3339() } }),
        None => json!({ "date": null }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page_with(id: &str, properties: Value) -> Value {
        json!({ "id": id, "properties": properties })
    }

    fn sample_item() -> VocabularyItem {
        VocabularyItem {
            id: "page-123".into(),
            word: "smörgås".into(),
            translation: "sandwich".into(),
            part_of_speech: PartOfSpeech::Noun,
            definition: Some("an open-faced sandwich".into()),
            example_sentence: Some("Jag åt en smörgås.".into()),
            example_translation: Some("I ate a sandwich.".into()),
            source_text: None,
            date_added: Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap(),
            mastery_level: MasteryLevel::Familiar,
            difficulty: Difficulty::Easy,
            last_reviewed: Some(Utc.with_ymd_and_hms(2024, 2, 1, 19, 0, 0).unwrap()),
            review_count: 4,
            success_rate: 0.75,
        }
    }

    fn sample_concept() -> GrammarConcept {
        GrammarConcept {
            id: "page-456".into(),
            concept_name: "V2 word order".into(),
            category: GrammarCategory::WordOrder,
            difficulty_level: DifficultyLevel::Intermediate,
            description: Some("The finite verb comes second in main clauses.".into()),
            examples: Some("Igår åt jag fisk.".into()),
            practice_notes: None,
            date_added: Utc.with_ymd_and_hms(2024, 1, 20, 10, 0, 0).unwrap(),
            mastery_status: MasteryStatus::Practicing,
        }
    }

    #[test]
    fn vocabulary_round_trips() {
        let item = sample_item();
        let page = page_with(&item.id, vocab_properties(&item));
        let back = vocab_from_page(&page).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn grammar_round_trips() {
        let concept = sample_concept();
        let page = page_with(&concept.id, grammar_properties(&concept));
        let back = grammar_from_page(&page).unwrap();
        assert_eq!(back, concept);
    }

    #[test]
    fn never_reviewed_round_trips_null_date() {
        let mut item = sample_item();
        item.last_reviewed = None;
        let page = page_with(&item.id, vocab_properties(&item));
        assert_eq!(vocab_from_page(&page).unwrap().last_reviewed, None);
    }

    #[test]
    fn missing_title_is_a_schema_error() {
        let page = page_with("page-1", json!({ "English Translation": { "rich_text": [] } }));
        let err = vocab_from_page(&page).unwrap_err();
        assert!(err.to_string().contains("Word/Phrase"));
    }

    #[test]
    fn unknown_select_option_is_a_schema_error() {
        let mut item = sample_item();
        item.last_reviewed = None;
        let mut props = vocab_properties(&item);
        props["Mastery Level"] = json!({ "select": { "name": "Expert" } });
        let err = vocab_from_page(&page_with("p", props)).unwrap_err();
        assert!(err.to_string().contains("Mastery Level"));
        assert!(err.to_string().contains("Expert"));
    }

    #[test]
    fn missing_date_added_is_a_schema_error() {
        let page = page_with(
            "page-1",
            json!({ "Word/Phrase": { "title": [{ "text": { "content": "hej" } }] } }),
        );
        let err = vocab_from_page(&page).unwrap_err();
        assert!(err.to_string().contains("Date Added"));
    }

    #[test]
    fn absent_selects_take_defaults() {
        let page = page_with(
            "page-1",
            json!({
                "Word/Phrase": { "title": [{ "text": { "content": "hej" } }] },
                "Date Added": { "date": { "start": "2024-01-01" } },
            }),
        );
        let item = vocab_from_page(&page).unwrap();
        assert_eq!(item.mastery_level, MasteryLevel::New);
        assert_eq!(item.difficulty, Difficulty::Medium);
        assert_eq!(item.part_of_speech, PartOfSpeech::Other);
        assert_eq!(item.review_count, 0);
        assert_eq!(item.translation, "");
        assert_eq!(item.definition, None);
    }

    #[test]
    fn reads_api_style_plain_text() {
        let page = page_with(
            "page-1",
            json!({
                "Word/Phrase": { "title": [
                    { "plain_text": "tack " },
                    { "plain_text": "så mycket" },
                ]},
                "Date Added": { "date": { "start": "2024-03-05T10:00:00+01:00" } },
            }),
        );
        let item = vocab_from_page(&page).unwrap();
        assert_eq!(item.word, "tack så mycket");
        assert_eq!(
            item.date_added,
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn out_of_range_success_rate_is_rejected() {
        let mut props = vocab_properties(&sample_item());
        props["Success Rate"] = json!({ "number": 87.5 });
        let err = vocab_from_page(&page_with("p", props)).unwrap_err();
        assert!(err.to_string().contains("Success Rate"));
    }

    #[test]
    fn negative_review_count_is_rejected() {
        let mut props = vocab_properties(&sample_item());
        props["Review Count"] = json!({ "number": -2 });
        let err = vocab_from_page(&page_with("p", props)).unwrap_err();
        assert!(err.to_string().contains("Review Count"));
    }

    #[test]
    fn grammar_filter_combines_conditions_with_and() {
        assert_eq!(grammar_filter(None, None, None), None);

        let single = grammar_filter(Some(GrammarCategory::Verbs), None, None).unwrap();
        assert_eq!(single["property"], "Category");

        let double =
            grammar_filter(Some(GrammarCategory::Verbs), None, Some(MasteryStatus::Learning))
                .unwrap();
        assert_eq!(double["and"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn mark_for_review_clears_the_date() {
        let props = mark_for_review_properties();
        assert!(props["Last Reviewed"]["date"].is_null());
    }
}
