use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::store::DataStore;
use crate::{SkillArgs, SkillDefinition, SkillError, SkillOutput};

pub const SAVE_NAME: &str = "save_note";
pub const GET_NAME: &str = "get_note";
pub const LIST_NAME: &str = "list_notes";

const NOTES_FILE: &str = "notes.json";
const DERIVED_TITLE_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Note {
    title: String,
    content: String,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

type Notes = BTreeMap<String, Note>;

pub fn save_definition() -> SkillDefinition {
    SkillDefinition::new(
        SAVE_NAME,
        "Save a note. Saving under an existing title replaces its content.",
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "description": "Note title. Defaults to the first line of the content."},
                "content": {"type": "string", "description": "Note content"}
            },
            "required": ["content"]
        }),
    )
}

pub fn get_definition() -> SkillDefinition {
    SkillDefinition::new(
        GET_NAME,
        "Retrieve a saved note by title",
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "description": "Title of the note to retrieve"}
            },
            "required": ["title"]
        }),
    )
}

pub fn list_definition() -> SkillDefinition {
    SkillDefinition::without_parameters(LIST_NAME, "List all saved notes")
}

pub fn save(store: &DataStore, args: &SkillArgs) -> Result<SkillOutput, SkillError> {
    save_at(store, args, Utc::now())
}

pub(crate) fn save_at(
    store: &DataStore,
    args: &SkillArgs,
    now: DateTime<Utc>,
) -> Result<SkillOutput, SkillError> {
    let content = args.required_str("content")?;
    let title = match args.optional_str("title") {
        Some(title) => title.to_string(),
        None => derive_title(content),
    };
    if title.is_empty() {
        return Err(SkillError::invalid_arguments("note title must not be empty")
            .with_hint("Provide a title or start the content with a non-blank line.")
            .with_context("field", "title"));
    }

    let _guard = store.lock();
    let mut notes: Notes = store.load(NOTES_FILE)?;
    notes
        .entry(title.clone())
        .and_modify(|note| {
            note.content = content.to_string();
            note.updated = now;
        })
        .or_insert_with(|| Note {
            title: title.clone(),
            content: content.to_string(),
            created: now,
            updated: now,
        });
    store.save(NOTES_FILE, &notes)?;

    tracing::debug!(event = "note_saved", title = %title);
    Ok(SkillOutput::Json(json!({ "title": title, "success": true })))
}

pub fn get(store: &DataStore, args: &SkillArgs) -> Result<SkillOutput, SkillError> {
    let title = args.required_str("title")?;
    let notes: Notes = {
        let _guard = store.lock();
        store.load(NOTES_FILE)?
    };
    let note = notes.get(title).ok_or_else(|| {
        SkillError::not_found(format!("note not found: {title}"))
            .with_hint("Use list_notes to see saved titles.")
            .with_context("title", title)
    })?;

    Ok(SkillOutput::Json(json!({
        "title": note.title,
        "content": note.content,
        "created": timestamp(note.created),
        "updated": timestamp(note.updated),
    })))
}

pub fn list(store: &DataStore) -> Result<SkillOutput, SkillError> {
    let notes: Notes = {
        let _guard = store.lock();
        store.load(NOTES_FILE)?
    };
    let listed = notes
        .values()
        .map(|note| {
            json!({
                "title": note.title,
                "created": timestamp(note.created),
                "updated": timestamp(note.updated),
            })
        })
        .collect::<Vec<_>>();

    Ok(SkillOutput::Json(json!({ "count": listed.len(), "notes": listed })))
}

fn derive_title(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > DERIVED_TITLE_CHARS {
        let mut title = first_line.chars().take(DERIVED_TITLE_CHARS).collect::<String>();
        title.push_str("...");
        title
    } else {
        first_line.to_string()
    }
}

pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
