//! Note editor draft and form submission.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use uuid::Uuid;

use crate::geometry::MapPercent;
use crate::notes::{Note, NoteKind, UNTITLED};

/// Position given to new pin/link notes that were not placed by a click.
pub const DEFAULT_NOTE_POSITION: MapPercent = MapPercent::new(50.0, 50.0);
const NOTE_ID_SUFFIX_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("link notes need a target map")]
    MissingLinkTarget,
    #[error("a link cannot point at its own map {project_id}")]
    SelfLinkTarget { project_id: String },
    #[error("note {note_id} no longer exists")]
    NoteNotFound { note_id: String },
}

pub type EditorResult<T> = std::result::Result<T, EditorError>;

/// In-progress contents of the editor window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorDraft {
    pub kind: NoteKind,
    pub editing_note_id: Option<String>,
    pub position: Option<MapPercent>,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub thumb: Option<String>,
    pub target_project_id: Option<String>,
}

impl EditorDraft {
    pub fn new_note(kind: NoteKind, position: Option<MapPercent>) -> Self {
        Self {
            kind,
            position: position.filter(|_| kind.requires_position()),
            ..Self::default()
        }
    }

    pub fn for_note(note: &Note) -> Self {
        Self {
            kind: note.kind,
            editing_note_id: Some(note.id.clone()),
            position: note.position,
            title: note.title.clone(),
            description: note.description.clone(),
            images: note.images.clone(),
            thumb: note.thumb.clone(),
            target_project_id: note.target_project_id.clone(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_note_id.is_some()
    }

    /// The kind can only change while creating; returns whether it changed.
    pub fn set_kind(&mut self, kind: NoteKind) -> bool {
        if self.is_editing() || self.kind == kind {
            return false;
        }
        self.kind = kind;
        true
    }
}

/// Values read from the editor form on submit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoteForm {
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub thumb: Option<String>,
    pub target_project_id: Option<String>,
}

impl NoteForm {
    pub fn from_draft(draft: &EditorDraft) -> Self {
        Self {
            title: draft.title.clone(),
            description: draft.description.clone(),
            images: draft.images.clone(),
            thumb: draft.thumb.clone(),
            target_project_id: draft.target_project_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Created(Note),
    Updated(Note),
}

impl Submission {
    pub fn note(&self) -> &Note {
        match self {
            Self::Created(note) | Self::Updated(note) => note,
        }
    }

    pub fn into_note(self) -> Note {
        match self {
            Self::Created(note) | Self::Updated(note) => note,
        }
    }
}

fn validate_link_target(
    kind: NoteKind,
    target: Option<&str>,
    project_id: &str,
) -> EditorResult<Option<String>> {
    if kind != NoteKind::Link {
        return Ok(None);
    }
    let target = target
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .ok_or(EditorError::MissingLinkTarget)?;
    if target == project_id {
        return Err(EditorError::SelfLinkTarget {
            project_id: project_id.to_string(),
        });
    }
    Ok(Some(target.to_string()))
}

/// Validate `form` against `draft` and produce the note to store.
///
/// Nothing is mutated here; the caller applies the returned note.
pub fn submit(
    draft: &EditorDraft,
    form: NoteForm,
    project_id: &str,
    notes: &[Note],
) -> EditorResult<Submission> {
    let target_project_id =
        validate_link_target(draft.kind, form.target_project_id.as_deref(), project_id)?;

    let title = match form.title.trim() {
        "" => UNTITLED.to_string(),
        trimmed => trimmed.to_string(),
    };
    let description = form.description.trim().to_string();

    if let Some(note_id) = &draft.editing_note_id {
        let existing = notes
            .iter()
            .find(|note| &note.id == note_id)
            .ok_or_else(|| EditorError::NoteNotFound {
                note_id: note_id.clone(),
            })?;
        return Ok(Submission::Updated(Note {
            id: existing.id.clone(),
            title,
            description,
            position: existing.position,
            kind: existing.kind,
            images: form.images,
            thumb: form.thumb.or_else(|| existing.thumb.clone()),
            target_project_id,
        }));
    }

    let position = draft
        .kind
        .requires_position()
        .then(|| draft.position.unwrap_or(DEFAULT_NOTE_POSITION));

    Ok(Submission::Created(Note {
        id: new_note_id(),
        title,
        description,
        position,
        kind: draft.kind,
        images: form.images,
        thumb: form.thumb,
        target_project_id,
    }))
}

pub fn new_note_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("note_{millis}_{}", &suffix[..NOTE_ID_SUFFIX_LEN])
}
