use crate::editor::EditorError;
use crate::geometry::TransformError;
use crate::media::MediaError;
use crate::state::StateError;
use crate::storage::StorageError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("project name is empty")]
    MissingProjectName,
    #[error("note {note_id} is not a link to another map")]
    NotALink { note_id: String },
}
