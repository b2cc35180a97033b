//! Note records, their lenient JSON form and list summaries.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::geometry::MapPercent;

pub const UNTITLED: &str = "Untitled";
pub const NO_DESCRIPTION: &str = "No description";
const PREVIEW_MAX_CHARS: usize = 80;
const PREVIEW_TRUNCATED_CHARS: usize = 77;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteKind {
    #[default]
    Pin,
    Link,
    Text,
}

impl NoteKind {
    /// Unknown or missing tags fall back to a pin.
    pub fn from_type_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("link") => Self::Link,
            Some("text") => Self::Text,
            _ => Self::Pin,
        }
    }

    pub const fn type_tag(self) -> &'static str {
        match self {
            Self::Pin => "marker",
            Self::Link => "link",
            Self::Text => "text",
        }
    }

    pub const fn requires_position(self) -> bool {
        !matches!(self, Self::Text)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub description: String,
    pub position: Option<MapPercent>,
    pub kind: NoteKind,
    pub images: Vec<String>,
    pub thumb: Option<String>,
    pub target_project_id: Option<String>,
}

impl Note {
    /// Build a note from one persisted record. Returns `None` for records that
    /// are not objects or carry no string id; every other field is repaired.
    pub fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        let id = record.get("id")?.as_str()?.to_string();

        let text_field = |key: &str| {
            record
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let optional_string = |key: &str| {
            record
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let kind = NoteKind::from_type_tag(record.get("type").and_then(Value::as_str));
        let x = record.get("x").and_then(Value::as_f64);
        let y = record.get("y").and_then(Value::as_f64);
        let position = match (kind.requires_position(), x, y) {
            (true, Some(x), Some(y)) => Some(MapPercent::new(x, y)),
            _ => None,
        };
        let images = record
            .get("images")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let target_project_id = match kind {
            NoteKind::Link => optional_string("targetProjectId"),
            NoteKind::Pin | NoteKind::Text => None,
        };

        Some(Self {
            id,
            title: text_field("title"),
            description: text_field("description"),
            position,
            kind,
            images,
            thumb: optional_string("thumb"),
            target_project_id,
        })
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }

    pub fn summary(&self) -> NoteSummary {
        NoteSummary::from_note(self)
    }
}

/// Decode a persisted note list, skipping records that cannot be repaired.
pub fn decode_notes(records: &[Value]) -> Vec<Note> {
    let notes = records
        .iter()
        .filter_map(Note::from_value)
        .collect::<Vec<_>>();
    let skipped = records.len() - notes.len();
    if skipped > 0 {
        tracing::warn!(skipped, "skipped malformed note records");
    }
    notes
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteRecord<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    images: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    thumb: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_project_id: Option<&'a str>,
}

impl Serialize for Note {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NoteRecord {
            id: &self.id,
            title: &self.title,
            description: &self.description,
            x: self.position.map(|position| position.x),
            y: self.position.map(|position| position.y),
            images: &self.images,
            thumb: self.thumb.as_deref(),
            kind: self.kind.type_tag(),
            target_project_id: self.target_project_id.as_deref(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Note::from_value(&value).ok_or_else(|| D::Error::custom("note record without a string id"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteBadge {
    Thumbnail(String),
    Map,
    Text,
    Images,
}

/// What a notes list row shows for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub coordinates: Option<String>,
    pub badge: Option<NoteBadge>,
}

impl NoteSummary {
    pub fn from_note(note: &Note) -> Self {
        let title = if note.title.is_empty() {
            UNTITLED.to_string()
        } else {
            note.title.clone()
        };
        let coordinates = note
            .position
            .map(|position| format!("{:.1}%, {:.1}%", position.x, position.y));

        Self {
            id: note.id.clone(),
            title,
            preview: preview_text(&note.description),
            coordinates,
            badge: badge_for(note),
        }
    }
}

fn badge_for(note: &Note) -> Option<NoteBadge> {
    if let Some(thumb) = &note.thumb {
        return Some(NoteBadge::Thumbnail(thumb.clone()));
    }
    match note.kind {
        NoteKind::Link if note.target_project_id.is_some() => Some(NoteBadge::Map),
        NoteKind::Text => Some(NoteBadge::Text),
        _ if !note.images.is_empty() => Some(NoteBadge::Images),
        _ => None,
    }
}

pub fn preview_text(description: &str) -> String {
    let collapsed = description.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return NO_DESCRIPTION.to_string();
    }
    if collapsed.chars().count() > PREVIEW_MAX_CHARS {
        let mut truncated = collapsed
            .chars()
            .take(PREVIEW_TRUNCATED_CHARS)
            .collect::<String>();
        truncated.push('…');
        return truncated;
    }
    collapsed
}
