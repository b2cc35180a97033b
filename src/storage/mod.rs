use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::geometry::ScreenPoint;
use crate::notes::{decode_notes, Note};
use crate::project::{decode_projects, Project};

const MAPS_SUBDIR: &str = "maps";
const NOTES_SUBDIR: &str = "notes";
const WINDOWS_SUBDIR: &str = "windows";
const PROJECTS_INDEX_FILE: &str = "projects.json";
const MAP_EXTENSION: &str = "bin";
const RECORD_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("project id is empty")]
    MissingProjectId,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Per-project persistence of map images, notes, window memory and the
/// project index.
///
/// Reads return `Ok(None)` for records that were never written or that no
/// longer parse.
pub trait MapStore {
    fn get_image(&self, project_id: &str) -> StorageResult<Option<Vec<u8>>>;
    fn put_image(&self, project_id: &str, bytes: &[u8]) -> StorageResult<()>;
    fn get_notes(&self, project_id: &str) -> StorageResult<Option<Vec<Note>>>;
    fn put_notes(&self, project_id: &str, notes: &[Note]) -> StorageResult<()>;
    fn list_projects(&self) -> StorageResult<Vec<Project>>;
    fn upsert_project(&self, project: &Project) -> StorageResult<()>;
    fn delete_project(&self, project_id: &str) -> StorageResult<()>;
    fn get_editor_position(&self, project_id: &str) -> StorageResult<Option<ScreenPoint>>;
    fn put_editor_position(&self, project_id: &str, position: ScreenPoint) -> StorageResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotesRecord<'a> {
    project_id: &'a str,
    notes: &'a [Note],
}

#[derive(Debug, Serialize, Deserialize)]
struct EditorPositionRecord {
    left: f64,
    top: f64,
}

/// [`MapStore`] backed by plain files under one data root.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub const fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn with_default_root() -> StorageResult<Self> {
        let root = crate::config::default_data_dir().ok_or(StorageError::MissingHomeDirectory)?;
        Ok(Self::with_root(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn validate_project_id(project_id: &str) -> StorageResult<()> {
        if project_id.is_empty() {
            return Err(StorageError::MissingProjectId);
        }
        Ok(())
    }

    fn record_path(&self, subdir: &str, project_id: &str, extension: &str) -> StorageResult<PathBuf> {
        Self::validate_project_id(project_id)?;
        let mut path = self.root.clone();
        path.push(subdir);
        path.push(format!("{}.{extension}", project_key(project_id)));
        Ok(path)
    }

    pub fn map_path(&self, project_id: &str) -> StorageResult<PathBuf> {
        self.record_path(MAPS_SUBDIR, project_id, MAP_EXTENSION)
    }

    pub fn notes_path(&self, project_id: &str) -> StorageResult<PathBuf> {
        self.record_path(NOTES_SUBDIR, project_id, RECORD_EXTENSION)
    }

    pub fn editor_position_path(&self, project_id: &str) -> StorageResult<PathBuf> {
        self.record_path(WINDOWS_SUBDIR, project_id, RECORD_EXTENSION)
    }

    pub fn projects_index_path(&self) -> PathBuf {
        self.root.join(PROJECTS_INDEX_FILE)
    }

    fn read_projects_index(&self) -> StorageResult<Vec<Project>> {
        let path = self.projects_index_path();
        let Some(value) = read_json(&path)? else {
            return Ok(Vec::new());
        };
        match value.as_array() {
            Some(records) => Ok(decode_projects(records)),
            None => {
                tracing::warn!(path = %path.display(), "project index is not a list; ignoring");
                Ok(Vec::new())
            }
        }
    }
}

impl MapStore for FileStore {
    fn get_image(&self, project_id: &str) -> StorageResult<Option<Vec<u8>>> {
        read_optional(&self.map_path(project_id)?)
    }

    fn put_image(&self, project_id: &str, bytes: &[u8]) -> StorageResult<()> {
        write_replacing(&self.map_path(project_id)?, bytes)
    }

    fn get_notes(&self, project_id: &str) -> StorageResult<Option<Vec<Note>>> {
        let path = self.notes_path(project_id)?;
        let Some(value) = read_json(&path)? else {
            return Ok(None);
        };
        match value.get("notes").and_then(Value::as_array) {
            Some(records) => Ok(Some(decode_notes(records))),
            None => {
                tracing::warn!(path = %path.display(), "notes record has no note list; ignoring");
                Ok(None)
            }
        }
    }

    fn put_notes(&self, project_id: &str, notes: &[Note]) -> StorageResult<()> {
        let path = self.notes_path(project_id)?;
        let encoded = serde_json::to_vec(&NotesRecord { project_id, notes })?;
        write_replacing(&path, &encoded)
    }

    fn list_projects(&self) -> StorageResult<Vec<Project>> {
        self.read_projects_index()
    }

    fn upsert_project(&self, project: &Project) -> StorageResult<()> {
        Self::validate_project_id(&project.id)?;
        let mut projects = self.read_projects_index()?;
        match projects.iter_mut().find(|entry| entry.id == project.id) {
            Some(entry) => *entry = project.clone(),
            None => projects.push(project.clone()),
        }
        let encoded = serde_json::to_vec_pretty(&projects)?;
        write_replacing(&self.projects_index_path(), &encoded)
    }

    fn delete_project(&self, project_id: &str) -> StorageResult<()> {
        Self::validate_project_id(project_id)?;
        let mut projects = self.read_projects_index()?;
        projects.retain(|entry| entry.id != project_id);
        let encoded = serde_json::to_vec_pretty(&projects)?;
        write_replacing(&self.projects_index_path(), &encoded)?;

        for path in [
            self.map_path(project_id)?,
            self.notes_path(project_id)?,
            self.editor_position_path(project_id)?,
        ] {
            remove_if_present(&path)?;
        }
        tracing::info!(project_id, "deleted project data");
        Ok(())
    }

    fn get_editor_position(&self, project_id: &str) -> StorageResult<Option<ScreenPoint>> {
        let path = self.editor_position_path(project_id)?;
        let Some(value) = read_json(&path)? else {
            return Ok(None);
        };
        match serde_json::from_value::<EditorPositionRecord>(value) {
            Ok(record) => Ok(Some(ScreenPoint::new(record.left, record.top))),
            Err(err) => {
                tracing::warn!(?err, path = %path.display(), "ignoring malformed editor position");
                Ok(None)
            }
        }
    }

    fn put_editor_position(&self, project_id: &str, position: ScreenPoint) -> StorageResult<()> {
        let path = self.editor_position_path(project_id)?;
        let encoded = serde_json::to_vec(&EditorPositionRecord {
            left: position.x,
            top: position.y,
        })?;
        write_replacing(&path, &encoded)
    }
}

/// File-name-safe key for a project id.
pub fn project_key(project_id: &str) -> String {
    project_id
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn read_optional(path: &Path) -> StorageResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StorageError::Io(err)),
    }
}

fn read_json(path: &Path) -> StorageResult<Option<Value>> {
    let Some(bytes) = read_optional(path)? else {
        return Ok(None);
    };
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(?err, path = %path.display(), "ignoring malformed json record");
            Ok(None)
        }
    }
}

/// Write through a sibling temp file so readers never see a partial record.
fn write_replacing(destination: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut staging = destination.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    fs::write(&staging, bytes)?;
    if let Err(err) = fs::rename(&staging, destination) {
        let _ = fs::remove_file(&staging);
        return Err(StorageError::Io(err));
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> StorageResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(StorageError::Io(err)),
    }
}
