//! The map workspace: one project's notes, viewport, windows and editor.
//!
//! Mutations are applied in memory first and then written through the
//! [`MapStore`]. A failed write keeps the in-memory state and queues an
//! [`Alert`] for the front-end.

use crate::editor::{self, EditorDraft, NoteForm, Submission};
use crate::error::{AppError, AppResult};
use crate::geometry::{MapPercent, Rect, ScreenPoint, Size};
use crate::input::{
    resolve_shortcut, InputContext, PointerButton, ShortcutAction, ShortcutKey, ShortcutModifiers,
};
use crate::media::MapImage;
use crate::notes::{Note, NoteKind, NoteSummary};
use crate::project::{link_targets, new_project_id, now_millis, NavigationStack, Project};
use crate::state::{AppEvent, AppState, StateError, StateMachine, StateResult, StateTransition};
use crate::storage::{MapStore, StorageError};
use crate::viewport::ViewportController;
use crate::windows::{ResizeDirection, WindowGesture, WindowId, WindowManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// A write to the store failed; the change only lives in memory.
    StorageUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOutcome {
    ClosedEditor,
    ClosedNoteWindow,
    Nothing,
}

/// A positioned note as drawn on the map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub note_id: String,
    pub kind: NoteKind,
    pub position: MapPercent,
    pub screen: ScreenPoint,
}

pub struct Workspace<S: MapStore> {
    store: S,
    project_id: String,
    notes: Vec<Note>,
    viewport: ViewportController,
    windows: WindowManager,
    window_area: Size,
    state: StateMachine,
    placing_kind: NoteKind,
    draft: Option<EditorDraft>,
    search_query: String,
    navigation: NavigationStack,
    alerts: Vec<Alert>,
}

impl<S: MapStore> Workspace<S> {
    /// Load `project_id` from `store` into a map surface occupying `container`.
    ///
    /// Missing or unreadable notes start an empty project and an undecodable
    /// map leaves the surface blank.
    pub fn open(store: S, project_id: impl Into<String>, container: Rect) -> AppResult<Self> {
        let project_id = project_id.into();
        if project_id.is_empty() {
            return Err(StorageError::MissingProjectId.into());
        }

        let mut alerts = Vec::new();
        let notes = match store.get_notes(&project_id) {
            Ok(notes) => notes.unwrap_or_default(),
            Err(err) => {
                tracing::error!(?err, %project_id, "failed to load notes");
                alerts.push(Alert::StorageUnavailable);
                Vec::new()
            }
        };

        let mut viewport = ViewportController::new(container);
        match store.get_image(&project_id) {
            Ok(Some(bytes)) => match MapImage::decode(bytes) {
                Ok(image) => viewport.load_image(image.natural_size()),
                Err(err) => tracing::warn!(?err, %project_id, "stored map image is unreadable"),
            },
            Ok(None) => {}
            Err(err) => {
                tracing::error!(?err, %project_id, "failed to load map image");
                if !alerts.contains(&Alert::StorageUnavailable) {
                    alerts.push(Alert::StorageUnavailable);
                }
            }
        }

        let editor_position = store
            .get_editor_position(&project_id)
            .unwrap_or_else(|err| {
                tracing::warn!(?err, %project_id, "failed to load editor position");
                None
            });

        tracing::info!(%project_id, notes = notes.len(), "opened workspace");
        Ok(Self {
            store,
            project_id,
            notes,
            viewport,
            windows: WindowManager::with_editor_position(editor_position),
            window_area: Size::new(container.x + container.width, container.y + container.height),
            state: StateMachine::new(),
            placing_kind: NoteKind::Pin,
            draft: None,
            search_query: String::new(),
            navigation: NavigationStack::new(),
            alerts,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, note_id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == note_id)
    }

    pub const fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub const fn windows(&self) -> &WindowManager {
        &self.windows
    }

    pub const fn mode(&self) -> AppState {
        self.state.state()
    }

    /// Mode changes since the workspace was opened, oldest first.
    pub fn mode_history(&self) -> &[StateTransition] {
        self.state.history()
    }

    pub const fn placing_kind(&self) -> NoteKind {
        self.placing_kind
    }

    pub fn draft(&self) -> Option<&EditorDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut EditorDraft> {
        self.draft.as_mut()
    }

    pub fn has_map(&self) -> bool {
        self.viewport.image_size().is_some()
    }

    pub const fn navigation(&self) -> &NavigationStack {
        &self.navigation
    }

    pub fn set_navigation(&mut self, navigation: NavigationStack) {
        self.navigation = navigation;
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    fn apply(&mut self, event: AppEvent) -> StateResult<AppState> {
        let mode = self.state.transition(event)?;
        if let Some(transition) = self.state.last_transition() {
            tracing::debug!(?transition, project_id = %self.project_id, "workspace mode changed");
        }
        Ok(mode)
    }

    fn raise_alert(&mut self, alert: Alert) {
        if !self.alerts.contains(&alert) {
            self.alerts.push(alert);
        }
    }

    fn persist_notes(&mut self) {
        if let Err(err) = self.store.put_notes(&self.project_id, &self.notes) {
            tracing::error!(?err, project_id = %self.project_id, "failed to save notes");
            self.raise_alert(Alert::StorageUnavailable);
        }
    }

    fn persist_editor_position(&mut self) {
        let Some(position) = self.windows.take_editor_position_change() else {
            return;
        };
        if let Err(err) = self.store.put_editor_position(&self.project_id, position) {
            tracing::warn!(?err, project_id = %self.project_id, "failed to remember editor position");
        }
    }

    /// Container moved or the host window changed size.
    pub fn resize(&mut self, container: Rect, window_area: Size) {
        self.viewport.set_container(container);
        self.window_area = window_area;
    }

    pub fn upload_map(&mut self, bytes: Vec<u8>) -> AppResult<()> {
        let image = MapImage::decode(bytes)?;
        self.viewport.load_image(image.natural_size());
        tracing::info!(project_id = %self.project_id, dimensions = ?image.dimensions(), "map uploaded");

        if let Err(err) = self.store.put_image(&self.project_id, image.bytes()) {
            tracing::error!(?err, project_id = %self.project_id, "failed to save map image");
            self.raise_alert(Alert::StorageUnavailable);
            return Ok(());
        }
        self.touch_project_index();
        Ok(())
    }

    fn touch_project_index(&mut self) {
        let projects = match self.store.list_projects() {
            Ok(projects) => projects,
            Err(err) => {
                tracing::warn!(?err, "failed to read project index");
                return;
            }
        };
        let now = now_millis();
        let project = match projects.into_iter().find(|project| project.id == self.project_id) {
            Some(mut project) => {
                project.touch(now);
                project
            }
            None => Project::new(self.project_id.clone(), self.project_id.clone(), now),
        };
        if let Err(err) = self.store.upsert_project(&project) {
            tracing::warn!(?err, project_id = %self.project_id, "failed to update project index");
        }
    }

    /// Start adding a note. Text notes open the editor at once, replacing any
    /// open draft; pins and links close the editor and wait for a click on
    /// the map.
    pub fn begin_placement(&mut self, kind: NoteKind) -> AppResult<()> {
        if !kind.requires_position() {
            self.apply(AppEvent::OpenEditor)?;
            self.open_editor_with(EditorDraft::new_note(kind, None));
            return Ok(());
        }

        self.apply(AppEvent::BeginPlacement)?;
        self.dismiss_editor();
        self.placing_kind = kind;
        self.viewport.clear_click_suppression();
        Ok(())
    }

    pub fn cancel_placement(&mut self) -> bool {
        self.apply(AppEvent::CancelPlacement).is_ok()
    }

    /// Primary click on the map surface. Returns whether a new note draft
    /// was opened.
    pub fn click_map(&mut self, screen: ScreenPoint) -> bool {
        if !self.state.state().is_placing() {
            return false;
        }
        if !self.viewport.accept_placement_click() {
            tracing::debug!("placement click swallowed after pan");
            return false;
        }
        let position = match self.viewport.screen_to_map_percent(screen) {
            Ok(position) => position,
            Err(err) => {
                tracing::debug!(%err, "placement click outside the map");
                return false;
            }
        };
        if self.apply(AppEvent::PlaceNote).is_err() {
            return false;
        }

        self.open_editor_with(EditorDraft::new_note(self.placing_kind, Some(position)));
        true
    }

    /// Opens the editor on `draft`, or retargets and raises it when already open.
    fn open_editor_with(&mut self, draft: EditorDraft) {
        self.draft = Some(draft);
        self.windows.open_editor(self.window_area);
    }

    /// Open the editor on an existing note, replacing any open draft. Unknown
    /// ids are ignored.
    pub fn edit_note(&mut self, note_id: &str) -> AppResult<bool> {
        let Some(draft) = self.note(note_id).map(EditorDraft::for_note) else {
            return Ok(false);
        };
        self.apply(AppEvent::OpenEditor)?;
        self.open_editor_with(draft);
        Ok(true)
    }

    pub fn submit_editor(&mut self, form: NoteForm) -> AppResult<Note> {
        let Some(draft) = self.draft.as_ref().filter(|_| self.state.state().is_editing()) else {
            return Err(StateError::InvalidStateTransition {
                from: self.state.state(),
                event: AppEvent::CloseEditor,
            }
            .into());
        };

        let submission = editor::submit(draft, form, &self.project_id, &self.notes)?;
        let note = match submission {
            Submission::Created(note) => {
                tracing::info!(note_id = %note.id, kind = ?note.kind, "note created");
                self.notes.push(note.clone());
                note
            }
            Submission::Updated(note) => {
                tracing::info!(note_id = %note.id, "note updated");
                if let Some(slot) = self.notes.iter_mut().find(|slot| slot.id == note.id) {
                    *slot = note.clone();
                }
                note
            }
        };

        self.persist_notes();
        self.close_editor();
        Ok(note)
    }

    fn dismiss_editor(&mut self) {
        if self.windows.close_editor() {
            self.persist_editor_position();
        }
        self.draft = None;
    }

    fn close_editor(&mut self) {
        self.dismiss_editor();
        if let Err(err) = self.apply(AppEvent::CloseEditor) {
            tracing::debug!(%err, "editor was not open");
        }
    }

    pub fn cancel_editor(&mut self) -> bool {
        if self.draft.is_none() && !self.state.state().is_editing() {
            return false;
        }
        self.close_editor();
        true
    }

    pub fn open_note(&mut self, note_id: &str) -> Option<WindowId> {
        self.note(note_id)?;
        Some(self.windows.open_note(note_id, self.window_area))
    }

    pub fn close_window(&mut self, id: WindowId) {
        let is_editor = self
            .windows
            .get(id)
            .is_some_and(|window| window.kind.is_editor());
        if is_editor {
            self.cancel_editor();
        } else {
            self.windows.close(id);
        }
    }

    fn editing_note_removed(&self) -> bool {
        self.draft
            .as_ref()
            .and_then(|draft| draft.editing_note_id.as_deref())
            .is_some_and(|note_id| self.note(note_id).is_none())
    }

    pub fn delete_note(&mut self, note_id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != note_id);
        if self.notes.len() == before {
            return false;
        }

        self.windows.close_note_windows(note_id);
        if self.editing_note_removed() {
            self.close_editor();
        }
        tracing::info!(note_id, "note deleted");
        self.persist_notes();
        true
    }

    pub fn clear_notes(&mut self) {
        self.notes.clear();
        self.windows.close_all_note_windows();
        if self.editing_note_removed() {
            self.close_editor();
        }
        tracing::info!(project_id = %self.project_id, "all notes cleared");
        self.persist_notes();
    }

    pub fn escape(&mut self) -> EscapeOutcome {
        if self.cancel_editor() {
            EscapeOutcome::ClosedEditor
        } else if self.windows.close_topmost_note() {
            EscapeOutcome::ClosedNoteWindow
        } else {
            EscapeOutcome::Nothing
        }
    }

    pub fn handle_shortcut(
        &mut self,
        key: ShortcutKey,
        modifiers: ShortcutModifiers,
        text_input_active: bool,
    ) -> Option<ShortcutAction> {
        let context = InputContext {
            editor_open: self.state.state().is_editing(),
            text_input_active,
            note_window_open: self.windows.note_window_count() > 0,
            placing: self.state.state().is_placing(),
        };
        let action = resolve_shortcut(key, modifiers, context)?;
        match action {
            ShortcutAction::EditorSubmit => {
                let form = self.draft.as_ref().map(NoteForm::from_draft)?;
                if let Err(err) = self.submit_editor(form) {
                    tracing::debug!(%err, "editor submit rejected");
                }
            }
            ShortcutAction::EditorClose => {
                self.cancel_editor();
            }
            ShortcutAction::CloseTopmostNote => {
                self.windows.close_topmost_note();
            }
            ShortcutAction::CancelPlacement => {
                self.cancel_placement();
            }
            ShortcutAction::ZoomIn => self.viewport.zoom_in(),
            ShortcutAction::ZoomOut => self.viewport.zoom_out(),
            ShortcutAction::ZoomReset => self.viewport.reset(),
        }
        Some(action)
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn wheel(&mut self, cursor: ScreenPoint, delta_y: f64) -> bool {
        self.viewport.wheel_zoom(cursor, delta_y)
    }

    /// Pointer press on the map surface.
    pub fn pointer_down(&mut self, button: PointerButton, cursor: ScreenPoint) -> bool {
        self.viewport.begin_pan(button, cursor)
    }

    pub fn start_window_drag(&mut self, id: WindowId, cursor: ScreenPoint) {
        self.windows.start_drag(id, cursor);
    }

    pub fn start_window_resize(&mut self, id: WindowId, direction: ResizeDirection, cursor: ScreenPoint) {
        self.windows.start_resize(id, direction, cursor);
    }

    pub fn pointer_move(&mut self, cursor: ScreenPoint) {
        if self.viewport.is_panning() {
            self.viewport.pan_move(cursor);
            return;
        }
        match self.windows.gesture() {
            WindowGesture::Dragging { .. } => self.windows.drag_move(cursor, self.window_area),
            WindowGesture::Resizing { .. } => self.windows.resize_move(cursor, self.window_area),
            WindowGesture::Idle => {}
        }
    }

    pub fn pointer_up(&mut self) {
        if self.viewport.is_panning() {
            self.viewport.end_pan();
            return;
        }
        match self.windows.gesture() {
            WindowGesture::Dragging { .. } => {
                self.windows.stop_drag();
            }
            WindowGesture::Resizing { .. } => {
                self.windows.stop_resize();
            }
            WindowGesture::Idle => return,
        }
        self.persist_editor_position();
    }

    /// Pointer left the surface or was captured elsewhere: finish any pan,
    /// window drag or resize in progress.
    pub fn pointer_leave(&mut self) {
        if self.viewport.is_panning() {
            self.viewport.end_pan();
        }
        let finished = match self.windows.gesture() {
            WindowGesture::Dragging { .. } => self.windows.stop_drag(),
            WindowGesture::Resizing { .. } => self.windows.stop_resize(),
            WindowGesture::Idle => None,
        };
        if finished.is_some() {
            self.persist_editor_position();
        }
    }

    /// Target project of a link note; the current project is pushed on the
    /// back stack.
    pub fn follow_link(&mut self, note_id: &str) -> AppResult<String> {
        let target = self
            .note(note_id)
            .filter(|note| note.kind == NoteKind::Link)
            .and_then(|note| note.target_project_id.clone())
            .ok_or_else(|| AppError::NotALink {
                note_id: note_id.to_string(),
            })?;
        self.navigation.push(self.project_id.clone());
        tracing::info!(from = %self.project_id, to = %target, "following map link");
        Ok(target)
    }

    pub fn navigate_back(&mut self) -> Option<String> {
        self.navigation.back()
    }

    /// Create a new project with `map_bytes` as its map, for use as a link
    /// target. A link draft in the editor is pointed at it.
    pub fn create_linked_project(&mut self, name: &str, map_bytes: Vec<u8>) -> AppResult<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::MissingProjectName);
        }
        let image = MapImage::decode(map_bytes)?;

        let project = Project::new(new_project_id(), name, now_millis());
        let stored = self
            .store
            .put_image(&project.id, image.bytes())
            .and_then(|()| self.store.upsert_project(&project));
        if let Err(err) = stored {
            tracing::error!(?err, project_id = %project.id, "failed to store linked project");
            self.raise_alert(Alert::StorageUnavailable);
        }

        if let Some(draft) = self
            .draft
            .as_mut()
            .filter(|draft| draft.kind == NoteKind::Link)
        {
            draft.target_project_id = Some(project.id.clone());
        }
        tracing::info!(project_id = %project.id, name, "created linked project");
        Ok(project)
    }

    /// Projects other than this one, most recently updated first.
    pub fn link_targets(&mut self) -> Vec<Project> {
        match self.store.list_projects() {
            Ok(projects) => link_targets(&projects, &self.project_id)
                .into_iter()
                .cloned()
                .collect(),
            Err(err) => {
                tracing::error!(?err, "failed to list projects");
                self.raise_alert(Alert::StorageUnavailable);
                Vec::new()
            }
        }
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn visible_notes(&self) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|note| note.matches_query(&self.search_query))
            .collect()
    }

    pub fn note_summaries(&self) -> Vec<NoteSummary> {
        self.visible_notes()
            .into_iter()
            .map(NoteSummary::from_note)
            .collect()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.notes
            .iter()
            .filter(|note| note.kind.requires_position())
            .filter_map(|note| {
                let position = note.position?;
                Some(Marker {
                    note_id: note.id.clone(),
                    kind: note.kind,
                    position,
                    screen: self.viewport.map_percent_to_screen(position),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorError;
    use crate::media::encoded_png;
    use crate::storage::StorageResult;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::io;

    const CONTAINER: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    #[derive(Default)]
    struct MockStore {
        images: RefCell<HashMap<String, Vec<u8>>>,
        notes: RefCell<HashMap<String, Vec<Note>>>,
        projects: RefCell<Vec<Project>>,
        positions: RefCell<HashMap<String, ScreenPoint>>,
        fail_writes: Cell<bool>,
        note_writes: Cell<usize>,
    }

    impl MockStore {
        fn check_writable(&self) -> StorageResult<()> {
            if self.fail_writes.get() {
                return Err(StorageError::Io(io::Error::other("disk full")));
            }
            Ok(())
        }
    }

    impl MapStore for MockStore {
        fn get_image(&self, project_id: &str) -> StorageResult<Option<Vec<u8>>> {
            Ok(self.images.borrow().get(project_id).cloned())
        }

        fn put_image(&self, project_id: &str, bytes: &[u8]) -> StorageResult<()> {
            self.check_writable()?;
            self.images
                .borrow_mut()
                .insert(project_id.to_string(), bytes.to_vec());
            Ok(())
        }

        fn get_notes(&self, project_id: &str) -> StorageResult<Option<Vec<Note>>> {
            Ok(self.notes.borrow().get(project_id).cloned())
        }

        fn put_notes(&self, project_id: &str, notes: &[Note]) -> StorageResult<()> {
            self.check_writable()?;
            self.note_writes.set(self.note_writes.get() + 1);
            self.notes
                .borrow_mut()
                .insert(project_id.to_string(), notes.to_vec());
            Ok(())
        }

        fn list_projects(&self) -> StorageResult<Vec<Project>> {
            let mut projects = self.projects.borrow().clone();
            crate::project::sort_recent_first(&mut projects);
            Ok(projects)
        }

        fn upsert_project(&self, project: &Project) -> StorageResult<()> {
            self.check_writable()?;
            let mut projects = self.projects.borrow_mut();
            projects.retain(|entry| entry.id != project.id);
            projects.push(project.clone());
            Ok(())
        }

        fn delete_project(&self, project_id: &str) -> StorageResult<()> {
            self.projects
                .borrow_mut()
                .retain(|entry| entry.id != project_id);
            Ok(())
        }

        fn get_editor_position(&self, project_id: &str) -> StorageResult<Option<ScreenPoint>> {
            Ok(self.positions.borrow().get(project_id).copied())
        }

        fn put_editor_position(&self, project_id: &str, position: ScreenPoint) -> StorageResult<()> {
            self.check_writable()?;
            self.positions
                .borrow_mut()
                .insert(project_id.to_string(), position);
            Ok(())
        }
    }

    fn pin(id: &str, title: &str, x: f64, y: f64) -> Note {
        Note {
            id: id.to_string(),
            title: title.to_string(),
            position: Some(MapPercent::new(x, y)),
            ..Note::default()
        }
    }

    fn workspace_with_map() -> Workspace<MockStore> {
        let store = MockStore::default();
        store
            .images
            .borrow_mut()
            .insert("world".to_string(), encoded_png(1600, 1200));
        Workspace::open(store, "world", CONTAINER).expect("open workspace")
    }

    fn form(title: &str) -> NoteForm {
        NoteForm {
            title: title.to_string(),
            ..NoteForm::default()
        }
    }

    #[test]
    fn open_fits_stored_map_and_loads_notes() {
        let store = MockStore::default();
        store
            .images
            .borrow_mut()
            .insert("world".to_string(), encoded_png(1600, 1200));
        store
            .notes
            .borrow_mut()
            .insert("world".to_string(), vec![pin("a", "Well", 10.0, 10.0)]);

        let workspace = Workspace::open(store, "world", CONTAINER).expect("open workspace");
        assert!(workspace.has_map());
        assert_eq!(workspace.viewport().scale(), 0.5);
        assert_eq!(workspace.notes().len(), 1);
        assert_eq!(workspace.mode(), AppState::Browsing);
    }

    #[test]
    fn open_tolerates_missing_data_and_rejects_empty_id() {
        let mut workspace =
            Workspace::open(MockStore::default(), "fresh", CONTAINER).expect("open workspace");
        assert!(!workspace.has_map());
        assert!(workspace.notes().is_empty());
        assert!(workspace.take_alerts().is_empty());

        assert!(matches!(
            Workspace::open(MockStore::default(), "", CONTAINER),
            Err(AppError::Storage(StorageError::MissingProjectId))
        ));
    }

    #[test]
    fn open_ignores_undecodable_stored_map() {
        let store = MockStore::default();
        store
            .images
            .borrow_mut()
            .insert("world".to_string(), b"garbage".to_vec());
        let workspace = Workspace::open(store, "world", CONTAINER).expect("open workspace");
        assert!(!workspace.has_map());
    }

    #[test]
    fn placement_click_opens_editor_and_submit_creates_note() {
        let mut workspace = workspace_with_map();
        workspace.begin_placement(NoteKind::Pin).expect("begin placement");
        assert_eq!(workspace.mode(), AppState::Placing);

        assert!(workspace.click_map(ScreenPoint::new(400.0, 300.0)));
        assert_eq!(workspace.mode(), AppState::Editing);
        assert!(workspace.windows().editor_window().is_some());
        assert_eq!(
            workspace.draft().and_then(|draft| draft.position),
            Some(MapPercent::new(50.0, 50.0))
        );

        let note = workspace.submit_editor(form("  Camp ")).expect("submit");
        assert_eq!(note.title, "Camp");
        assert_eq!(note.position, Some(MapPercent::new(50.0, 50.0)));
        assert_eq!(workspace.mode(), AppState::Browsing);
        assert!(workspace.windows().editor_window().is_none());
        assert_eq!(
            workspace.store().notes.borrow().get("world").map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn click_outside_map_keeps_placing() {
        let mut workspace = Workspace::open(MockStore::default(), "world", CONTAINER)
            .expect("open workspace");
        workspace
            .upload_map(encoded_png(400, 300))
            .expect("valid map");
        workspace.begin_placement(NoteKind::Pin).expect("begin placement");

        // 400x300 map centered at (200, 150) in an 800x600 container.
        assert!(!workspace.click_map(ScreenPoint::new(50.0, 50.0)));
        assert_eq!(workspace.mode(), AppState::Placing);
        assert!(workspace.click_map(ScreenPoint::new(250.0, 200.0)));
    }

    #[test]
    fn click_after_pan_is_suppressed_until_next_click() {
        let mut workspace = workspace_with_map();
        workspace.zoom_in();
        workspace.begin_placement(NoteKind::Pin).expect("begin placement");

        assert!(workspace.pointer_down(PointerButton::Middle, ScreenPoint::new(300.0, 300.0)));
        workspace.pointer_move(ScreenPoint::new(340.0, 320.0));
        workspace.pointer_up();

        assert!(!workspace.click_map(ScreenPoint::new(400.0, 300.0)));
        assert_eq!(workspace.mode(), AppState::Placing);
        assert!(workspace.click_map(ScreenPoint::new(400.0, 300.0)));
    }

    #[test]
    fn clicks_outside_placement_mode_do_nothing() {
        let mut workspace = workspace_with_map();
        assert!(!workspace.click_map(ScreenPoint::new(400.0, 300.0)));
        assert!(workspace.draft().is_none());
    }

    #[test]
    fn text_notes_open_editor_without_placement() {
        let mut workspace = workspace_with_map();
        workspace.begin_placement(NoteKind::Text).expect("text note");
        assert_eq!(workspace.mode(), AppState::Editing);

        let note = workspace.submit_editor(form("Lore")).expect("submit");
        assert_eq!(note.kind, NoteKind::Text);
        assert_eq!(note.position, None);
        assert!(workspace.markers().is_empty());
    }

    #[test]
    fn invalid_link_submit_keeps_editor_open_and_notes_untouched() {
        let mut workspace = workspace_with_map();
        workspace.begin_placement(NoteKind::Link).expect("begin placement");
        workspace.click_map(ScreenPoint::new(400.0, 300.0));

        let err = workspace.submit_editor(form("Gate")).expect_err("needs target");
        assert!(matches!(err, AppError::Editor(EditorError::MissingLinkTarget)));

        let self_link = NoteForm {
            target_project_id: Some("world".to_string()),
            ..form("Gate")
        };
        let err = workspace.submit_editor(self_link).expect_err("self link");
        assert!(matches!(err, AppError::Editor(EditorError::SelfLinkTarget { .. })));

        assert!(workspace.notes().is_empty());
        assert_eq!(workspace.mode(), AppState::Editing);
        assert_eq!(workspace.store().note_writes.get(), 0);
    }

    #[test]
    fn submit_without_open_editor_is_a_state_error() {
        let mut workspace = workspace_with_map();
        assert!(matches!(
            workspace.submit_editor(form("x")),
            Err(AppError::State(StateError::InvalidStateTransition { .. }))
        ));
    }

    #[test]
    fn editing_updates_note_in_place() {
        let store = MockStore::default();
        store
            .notes
            .borrow_mut()
            .insert("world".to_string(), vec![pin("a", "Well", 10.0, 20.0)]);
        let mut workspace = Workspace::open(store, "world", CONTAINER).expect("open workspace");

        assert_eq!(workspace.edit_note("missing").ok(), Some(false));
        assert_eq!(workspace.edit_note("a").ok(), Some(true));
        let note = workspace.submit_editor(form("Deep well")).expect("submit");

        assert_eq!(note.id, "a");
        assert_eq!(note.position, Some(MapPercent::new(10.0, 20.0)));
        assert_eq!(workspace.notes().len(), 1);
        assert_eq!(workspace.notes()[0].title, "Deep well");
    }

    #[test]
    fn storage_failure_keeps_memory_state_and_alerts_once() {
        let mut workspace = workspace_with_map();
        workspace.store().fail_writes.set(true);

        workspace.begin_placement(NoteKind::Text).expect("text note");
        workspace.submit_editor(form("First")).expect("submit");
        workspace.begin_placement(NoteKind::Text).expect("text note");
        workspace.submit_editor(form("Second")).expect("submit");

        assert_eq!(workspace.notes().len(), 2);
        assert_eq!(workspace.take_alerts(), vec![Alert::StorageUnavailable]);
        assert!(workspace.take_alerts().is_empty());
    }

    #[test]
    fn delete_note_closes_its_windows_and_persists() {
        let mut workspace = workspace_with_map();
        workspace.begin_placement(NoteKind::Text).expect("text note");
        let note = workspace.submit_editor(form("Gone soon")).expect("submit");

        assert!(workspace.open_note(&note.id).is_some());
        assert!(workspace.open_note("unknown").is_none());
        assert!(workspace.delete_note(&note.id));
        assert!(!workspace.delete_note(&note.id));
        assert_eq!(workspace.windows().note_window_count(), 0);
        assert_eq!(
            workspace.store().notes.borrow().get("world").map(Vec::len),
            Some(0)
        );
    }

    #[test]
    fn deleting_the_note_under_edit_closes_the_editor() {
        let store = MockStore::default();
        store
            .notes
            .borrow_mut()
            .insert("world".to_string(), vec![pin("a", "Well", 10.0, 20.0)]);
        let mut workspace = Workspace::open(store, "world", CONTAINER).expect("open workspace");
        workspace.edit_note("a").expect("edit");

        workspace.clear_notes();
        assert!(workspace.notes().is_empty());
        assert_eq!(workspace.mode(), AppState::Browsing);
        assert!(workspace.draft().is_none());
    }

    #[test]
    fn escape_unwinds_editor_then_note_windows() {
        let mut workspace = workspace_with_map();
        workspace.begin_placement(NoteKind::Text).expect("text note");
        let first = workspace.submit_editor(form("One")).expect("submit");
        workspace.begin_placement(NoteKind::Text).expect("text note");
        let second = workspace.submit_editor(form("Two")).expect("submit");

        workspace.open_note(&first.id);
        workspace.open_note(&second.id);
        workspace.edit_note(&first.id).expect("edit");

        assert_eq!(workspace.escape(), EscapeOutcome::ClosedEditor);
        assert_eq!(workspace.escape(), EscapeOutcome::ClosedNoteWindow);
        assert!(workspace.windows().window_for_note(&second.id).is_none());
        assert_eq!(workspace.escape(), EscapeOutcome::ClosedNoteWindow);
        assert_eq!(workspace.escape(), EscapeOutcome::Nothing);
    }

    #[test]
    fn escape_shortcut_cancels_placement_when_nothing_is_open() {
        let mut workspace = workspace_with_map();
        workspace.begin_placement(NoteKind::Pin).expect("begin placement");

        let action =
            workspace.handle_shortcut(ShortcutKey::Escape, ShortcutModifiers::default(), false);
        assert_eq!(action, Some(ShortcutAction::CancelPlacement));
        assert_eq!(workspace.mode(), AppState::Browsing);
    }

    #[test]
    fn zoom_shortcuts_drive_the_viewport() {
        let mut workspace = workspace_with_map();
        workspace.handle_shortcut(ShortcutKey::Character('+'), ShortcutModifiers::default(), false);
        assert!((workspace.viewport().scale() - 0.6).abs() < 1e-12);

        workspace.handle_shortcut(ShortcutKey::Character('0'), ShortcutModifiers::default(), false);
        assert_eq!(workspace.viewport().scale(), 0.5);
    }

    #[test]
    fn upload_rejects_undecodable_bytes_without_changes() {
        let mut workspace = workspace_with_map();
        let before = workspace.viewport().transform();

        assert!(matches!(
            workspace.upload_map(b"not an image".to_vec()),
            Err(AppError::Media(_))
        ));
        assert_eq!(workspace.viewport().transform(), before);
    }

    #[test]
    fn upload_refits_viewport_and_indexes_project() {
        let mut workspace = workspace_with_map();
        workspace.zoom_in();
        workspace
            .upload_map(encoded_png(400, 300))
            .expect("valid map");

        assert_eq!(workspace.viewport().scale(), 1.0);
        assert_eq!(workspace.viewport().translate(), (200.0, 150.0));
        assert!(workspace.store().images.borrow().contains_key("world"));
        assert_eq!(workspace.store().projects.borrow().len(), 1);
    }

    #[test]
    fn follow_link_pushes_current_project() {
        let mut workspace = workspace_with_map();
        workspace.begin_placement(NoteKind::Link).expect("begin placement");
        workspace.click_map(ScreenPoint::new(400.0, 300.0));
        let note = workspace
            .submit_editor(NoteForm {
                target_project_id: Some("city".to_string()),
                ..form("Gate")
            })
            .expect("submit");

        assert_eq!(workspace.follow_link(&note.id).ok().as_deref(), Some("city"));
        assert_eq!(workspace.navigation().peek(), Some("world"));
        assert_eq!(workspace.navigate_back().as_deref(), Some("world"));

        workspace.begin_placement(NoteKind::Text).expect("text note");
        let text = workspace.submit_editor(form("Lore")).expect("submit");
        assert!(matches!(
            workspace.follow_link(&text.id),
            Err(AppError::NotALink { .. })
        ));
    }

    #[test]
    fn create_linked_project_stores_map_and_targets_link_draft() {
        let mut workspace = workspace_with_map();
        workspace.begin_placement(NoteKind::Link).expect("begin placement");
        workspace.click_map(ScreenPoint::new(400.0, 300.0));

        assert!(matches!(
            workspace.create_linked_project("   ", encoded_png(10, 10)),
            Err(AppError::MissingProjectName)
        ));
        assert!(matches!(
            workspace.create_linked_project("City", b"nope".to_vec()),
            Err(AppError::Media(_))
        ));

        let project = workspace
            .create_linked_project(" City ", encoded_png(10, 10))
            .expect("valid project");
        assert_eq!(project.name, "City");
        assert_eq!(
            workspace.draft().and_then(|draft| draft.target_project_id.clone()),
            Some(project.id.clone())
        );
        assert!(workspace.store().images.borrow().contains_key(&project.id));

        let targets = workspace.link_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, project.id);
    }

    #[test]
    fn visible_notes_follow_search_query() {
        let store = MockStore::default();
        store.notes.borrow_mut().insert(
            "world".to_string(),
            vec![
                pin("a", "Harbor", 10.0, 10.0),
                pin("b", "Mill", 20.0, 20.0),
            ],
        );
        let mut workspace = Workspace::open(store, "world", CONTAINER).expect("open workspace");

        workspace.set_search_query("HARB");
        let visible = workspace.visible_notes();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "a");
        assert_eq!(workspace.note_summaries()[0].title, "Harbor");

        workspace.set_search_query("");
        assert_eq!(workspace.visible_notes().len(), 2);
    }

    #[test]
    fn markers_project_positions_onto_the_screen() {
        let store = MockStore::default();
        store
            .images
            .borrow_mut()
            .insert("world".to_string(), encoded_png(1600, 1200));
        store
            .notes
            .borrow_mut()
            .insert("world".to_string(), vec![pin("a", "Center", 50.0, 50.0)]);
        let workspace = Workspace::open(store, "world", CONTAINER).expect("open workspace");

        let markers = workspace.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].screen, ScreenPoint::new(400.0, 300.0));
    }

    #[test]
    fn editor_position_survives_reopening_the_workspace() {
        let mut workspace = workspace_with_map();
        workspace.begin_placement(NoteKind::Text).expect("text note");
        let editor = workspace
            .windows()
            .editor_window()
            .map(|window| window.id)
            .expect("editor window");

        workspace.start_window_drag(editor, ScreenPoint::new(300.0, 100.0));
        workspace.pointer_move(ScreenPoint::new(250.0, 60.0));
        workspace.pointer_up();
        let moved = workspace
            .windows()
            .get(editor)
            .map(|window| window.bounds.origin())
            .expect("editor still open");
        assert_eq!(
            workspace.store().positions.borrow().get("world").copied(),
            Some(moved)
        );
    }

    #[test]
    fn editing_another_note_retargets_the_open_editor() {
        let store = MockStore::default();
        store.notes.borrow_mut().insert(
            "world".to_string(),
            vec![pin("a", "Well", 10.0, 20.0), pin("b", "Mill", 30.0, 40.0)],
        );
        let mut workspace = Workspace::open(store, "world", CONTAINER).expect("open workspace");

        assert_eq!(workspace.edit_note("a").ok(), Some(true));
        let editor = workspace.windows().editor_window().map(|window| window.id);
        assert_eq!(workspace.edit_note("b").ok(), Some(true));

        assert_eq!(workspace.mode(), AppState::Editing);
        assert_eq!(
            workspace.draft().and_then(|draft| draft.editing_note_id.as_deref()),
            Some("b")
        );
        assert_eq!(workspace.windows().editor_window().map(|window| window.id), editor);
        let editors = workspace
            .windows()
            .windows_in_z_order()
            .into_iter()
            .filter(|window| window.kind.is_editor())
            .count();
        assert_eq!(editors, 1);

        let note = workspace.submit_editor(form("Windmill")).expect("submit");
        assert_eq!(note.id, "b");
        assert_eq!(workspace.note("a").map(|note| note.title.as_str()), Some("Well"));
    }

    #[test]
    fn new_notes_can_start_while_the_editor_is_open() {
        let store = MockStore::default();
        store
            .notes
            .borrow_mut()
            .insert("world".to_string(), vec![pin("a", "Well", 10.0, 20.0)]);
        let mut workspace = Workspace::open(store, "world", CONTAINER).expect("open workspace");

        workspace.edit_note("a").expect("edit");
        workspace.begin_placement(NoteKind::Text).expect("text note replaces draft");
        assert_eq!(workspace.mode(), AppState::Editing);
        let draft = workspace.draft().expect("blank text draft");
        assert_eq!(draft.kind, NoteKind::Text);
        assert!(!draft.is_editing());

        workspace.begin_placement(NoteKind::Pin).expect("placement closes editor");
        assert_eq!(workspace.mode(), AppState::Placing);
        assert!(workspace.draft().is_none());
        assert!(workspace.windows().editor_window().is_none());
        assert_eq!(
            workspace.mode_history().last(),
            Some(&StateTransition::new(
                Some(AppState::Editing),
                AppEvent::BeginPlacement,
                AppState::Placing
            ))
        );
    }

    #[test]
    fn pointer_leave_finishes_pans_and_window_drags() {
        let mut workspace = workspace_with_map();
        workspace.zoom_in();
        workspace.begin_placement(NoteKind::Pin).expect("begin placement");

        workspace.pointer_down(PointerButton::Middle, ScreenPoint::new(300.0, 300.0));
        workspace.pointer_move(ScreenPoint::new(340.0, 320.0));
        workspace.pointer_leave();
        assert!(!workspace.viewport().is_panning());
        assert!(!workspace.click_map(ScreenPoint::new(400.0, 300.0)));

        assert!(workspace.click_map(ScreenPoint::new(400.0, 300.0)));
        let editor = workspace
            .windows()
            .editor_window()
            .map(|window| window.id)
            .expect("editor window");
        workspace.start_window_drag(editor, ScreenPoint::new(300.0, 100.0));
        workspace.pointer_move(ScreenPoint::new(280.0, 90.0));
        workspace.pointer_leave();

        assert_eq!(workspace.windows().gesture(), WindowGesture::Idle);
        assert!(workspace.store().positions.borrow().contains_key("world"));
    }
}
