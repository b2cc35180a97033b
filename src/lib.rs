mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod media;
pub mod notes;
pub mod project;
pub mod state;
pub mod storage;
pub mod viewport;
pub mod windows;
pub mod workspace;
pub use error::{AppError, AppResult};

use geometry::Rect;
use storage::{FileStore, StorageError};
use workspace::Workspace;

/// Entrypoint used by front-ends: open the project named by a page query
/// string (`?project=<id>`) on the local data directory.
pub fn open_workspace(query: &str, container: Rect) -> AppResult<Workspace<FileStore>> {
    logging::init();

    let config = config::load_app_config();
    let data_dir = config
        .resolved_data_dir()
        .ok_or(StorageError::MissingHomeDirectory)?;
    let project_id = project::requested_project_id(query)
        .or(config.default_project.filter(|id| !id.is_empty()))
        .unwrap_or_else(|| project::DEFAULT_PROJECT_ID.to_string());

    tracing::info!(%project_id, data_dir = %data_dir.display(), "starting mapnotes");
    Workspace::open(FileStore::with_root(data_dir), project_id, container)
}
