//! Floating note and editor windows: stacking, cascade placement, drag and resize.

mod geometry;

use crate::geometry::{Rect, ScreenPoint, Size};

pub use geometry::{
    cascade_offset, clamp_origin, clamp_window_size, resize_bounds, ResizeDirection,
    CASCADE_SLOTS, CASCADE_STEP_PX, MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH, VIEWPORT_MARGIN_PX,
};

/// Counter value before the first window is raised; the first window gets 111.
pub const BASE_Z_INDEX: u32 = 110;
pub const DEFAULT_NOTE_WINDOW_SIZE: Size = Size::new(520.0, 420.0);
pub const DEFAULT_EDITOR_WINDOW_SIZE: Size = Size::new(560.0, 520.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowKind {
    Note(String),
    Editor,
}

impl WindowKind {
    pub fn note_id(&self) -> Option<&str> {
        match self {
            Self::Note(note_id) => Some(note_id),
            Self::Editor => None,
        }
    }

    pub const fn is_editor(&self) -> bool {
        matches!(self, Self::Editor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatingWindow {
    pub id: WindowId,
    pub kind: WindowKind,
    pub bounds: Rect,
    pub z_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowGesture {
    Idle,
    Dragging {
        window: WindowId,
        start_cursor: ScreenPoint,
        start_origin: ScreenPoint,
    },
    Resizing {
        window: WindowId,
        direction: ResizeDirection,
        start_cursor: ScreenPoint,
        start_bounds: Rect,
    },
}

#[derive(Debug, Clone)]
pub struct WindowManager {
    windows: Vec<FloatingWindow>,
    next_id: u64,
    top_z: u32,
    gesture: WindowGesture,
    editor_position: Option<ScreenPoint>,
    editor_position_dirty: bool,
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowManager {
    pub const fn new() -> Self {
        Self {
            windows: Vec::new(),
            next_id: 1,
            top_z: BASE_Z_INDEX,
            gesture: WindowGesture::Idle,
            editor_position: None,
            editor_position_dirty: false,
        }
    }

    pub fn with_editor_position(position: Option<ScreenPoint>) -> Self {
        Self {
            editor_position: position,
            ..Self::new()
        }
    }

    pub fn get(&self, id: WindowId) -> Option<&FloatingWindow> {
        self.windows.iter().find(|window| window.id == id)
    }

    fn get_mut(&mut self, id: WindowId) -> Option<&mut FloatingWindow> {
        self.windows.iter_mut().find(|window| window.id == id)
    }

    pub fn window_for_note(&self, note_id: &str) -> Option<&FloatingWindow> {
        self.windows
            .iter()
            .find(|window| window.kind.note_id() == Some(note_id))
    }

    pub fn editor_window(&self) -> Option<&FloatingWindow> {
        self.windows.iter().find(|window| window.kind.is_editor())
    }

    pub fn note_window_count(&self) -> usize {
        self.windows
            .iter()
            .filter(|window| !window.kind.is_editor())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub const fn gesture(&self) -> WindowGesture {
        self.gesture
    }

    pub const fn top_z_index(&self) -> u32 {
        self.top_z
    }

    pub const fn editor_position(&self) -> Option<ScreenPoint> {
        self.editor_position
    }

    /// Returns the remembered editor position once after it changed.
    pub fn take_editor_position_change(&mut self) -> Option<ScreenPoint> {
        if !self.editor_position_dirty {
            return None;
        }
        self.editor_position_dirty = false;
        self.editor_position
    }

    fn next_z(&mut self) -> u32 {
        self.top_z += 1;
        self.top_z
    }

    fn allocate_id(&mut self) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Open (or raise) the viewer window for `note_id`.
    pub fn open_note(&mut self, note_id: &str, viewport: Size) -> WindowId {
        let mut existing = self
            .windows
            .iter()
            .filter(|window| window.kind.note_id() == Some(note_id))
            .map(|window| window.id);
        if let Some(id) = existing.next() {
            let duplicates = existing.collect::<Vec<_>>();
            if !duplicates.is_empty() {
                tracing::debug!(note_id, count = duplicates.len(), "dropping duplicate note windows");
                self.windows.retain(|window| !duplicates.contains(&window.id));
            }
            self.bring_to_front(id);
            return id;
        }

        let size = clamp_window_size(DEFAULT_NOTE_WINDOW_SIZE, viewport);
        let offset = cascade_offset(self.note_window_count());
        let centered = ScreenPoint::new(
            (viewport.width - size.width) / 2.0 + offset,
            (viewport.height - size.height) / 2.0 + offset,
        );
        let origin = clamp_origin(centered, size, viewport);

        let id = self.allocate_id();
        let z_index = self.next_z();
        self.windows.push(FloatingWindow {
            id,
            kind: WindowKind::Note(note_id.to_string()),
            bounds: Rect::new(origin.x, origin.y, size.width, size.height),
            z_index,
        });
        tracing::debug!(note_id, window = id.get(), z_index, "opened note window");
        id
    }

    /// Open (or raise) the single editor window.
    pub fn open_editor(&mut self, viewport: Size) -> WindowId {
        if let Some(id) = self.editor_window().map(|window| window.id) {
            self.bring_to_front(id);
            return id;
        }

        let size = clamp_window_size(DEFAULT_EDITOR_WINDOW_SIZE, viewport);
        let preferred = self.editor_position.unwrap_or_else(|| {
            ScreenPoint::new(
                (viewport.width - size.width) / 2.0,
                (viewport.height - size.height) / 2.0,
            )
        });
        let origin = clamp_origin(preferred, size, viewport);

        let id = self.allocate_id();
        let z_index = self.next_z();
        self.windows.push(FloatingWindow {
            id,
            kind: WindowKind::Editor,
            bounds: Rect::new(origin.x, origin.y, size.width, size.height),
            z_index,
        });
        tracing::debug!(window = id.get(), z_index, "opened editor window");
        id
    }

    pub fn bring_to_front(&mut self, id: WindowId) {
        if self.get(id).is_none() {
            return;
        }
        let z_index = self.next_z();
        if let Some(window) = self.get_mut(id) {
            window.z_index = z_index;
        }
    }

    pub fn start_drag(&mut self, id: WindowId, cursor: ScreenPoint) {
        let Some(origin) = self.get(id).map(|window| window.bounds.origin()) else {
            return;
        };
        self.bring_to_front(id);
        self.gesture = WindowGesture::Dragging {
            window: id,
            start_cursor: cursor,
            start_origin: origin,
        };
    }

    pub fn drag_move(&mut self, cursor: ScreenPoint, viewport: Size) {
        let WindowGesture::Dragging {
            window,
            start_cursor,
            start_origin,
        } = self.gesture
        else {
            return;
        };
        let Some(target) = self.get_mut(window) else {
            return;
        };

        let moved = ScreenPoint::new(
            start_origin.x + (cursor.x - start_cursor.x),
            start_origin.y + (cursor.y - start_cursor.y),
        );
        let origin = clamp_origin(moved, target.bounds.size(), viewport);
        target.bounds.x = origin.x;
        target.bounds.y = origin.y;
    }

    /// Ends a drag; returns the window that was being dragged.
    pub fn stop_drag(&mut self) -> Option<WindowId> {
        let WindowGesture::Dragging { window, .. } = self.gesture else {
            return None;
        };
        self.gesture = WindowGesture::Idle;
        self.remember_if_editor(window);
        Some(window)
    }

    pub fn start_resize(&mut self, id: WindowId, direction: ResizeDirection, cursor: ScreenPoint) {
        let Some(bounds) = self.get(id).map(|window| window.bounds) else {
            return;
        };
        self.bring_to_front(id);
        self.gesture = WindowGesture::Resizing {
            window: id,
            direction,
            start_cursor: cursor,
            start_bounds: bounds,
        };
    }

    pub fn resize_move(&mut self, cursor: ScreenPoint, viewport: Size) {
        let WindowGesture::Resizing {
            window,
            direction,
            start_cursor,
            start_bounds,
        } = self.gesture
        else {
            return;
        };
        let Some(target) = self.get_mut(window) else {
            return;
        };

        let delta = ScreenPoint::new(cursor.x - start_cursor.x, cursor.y - start_cursor.y);
        target.bounds = resize_bounds(start_bounds, direction, delta, viewport);
    }

    pub fn stop_resize(&mut self) -> Option<WindowId> {
        let WindowGesture::Resizing { window, .. } = self.gesture else {
            return None;
        };
        self.gesture = WindowGesture::Idle;
        self.remember_if_editor(window);
        Some(window)
    }

    fn remember_if_editor(&mut self, id: WindowId) {
        let Some(window) = self.get(id) else {
            return;
        };
        if window.kind.is_editor() {
            self.editor_position = Some(window.bounds.origin());
            self.editor_position_dirty = true;
        }
    }

    fn end_gesture_for(&mut self, id: WindowId) {
        let active = match self.gesture {
            WindowGesture::Dragging { window, .. } | WindowGesture::Resizing { window, .. } => {
                Some(window)
            }
            WindowGesture::Idle => None,
        };
        if active == Some(id) {
            self.gesture = WindowGesture::Idle;
        }
    }

    pub fn close(&mut self, id: WindowId) -> Option<FloatingWindow> {
        self.remember_if_editor(id);
        self.end_gesture_for(id);
        let index = self.windows.iter().position(|window| window.id == id)?;
        let window = self.windows.remove(index);
        tracing::debug!(window = id.get(), kind = ?window.kind, "closed window");
        Some(window)
    }

    pub fn close_editor(&mut self) -> bool {
        match self.editor_window().map(|window| window.id) {
            Some(id) => self.close(id).is_some(),
            None => false,
        }
    }

    /// Close every viewer window showing `note_id`; returns how many closed.
    pub fn close_note_windows(&mut self, note_id: &str) -> usize {
        let ids = self
            .windows
            .iter()
            .filter(|window| window.kind.note_id() == Some(note_id))
            .map(|window| window.id)
            .collect::<Vec<_>>();
        for id in &ids {
            self.close(*id);
        }
        ids.len()
    }

    pub fn close_all_note_windows(&mut self) -> usize {
        let ids = self
            .windows
            .iter()
            .filter(|window| !window.kind.is_editor())
            .map(|window| window.id)
            .collect::<Vec<_>>();
        for id in &ids {
            self.close(*id);
        }
        ids.len()
    }

    pub fn close_topmost_note(&mut self) -> bool {
        let topmost = self
            .windows
            .iter()
            .filter(|window| !window.kind.is_editor())
            .max_by_key(|window| window.z_index)
            .map(|window| window.id);
        match topmost {
            Some(id) => self.close(id).is_some(),
            None => false,
        }
    }

    /// Windows from bottom to top.
    pub fn windows_in_z_order(&self) -> Vec<&FloatingWindow> {
        let mut ordered = self.windows.iter().collect::<Vec<_>>();
        ordered.sort_by_key(|window| window.z_index);
        ordered
    }

    pub fn topmost(&self) -> Option<&FloatingWindow> {
        self.windows.iter().max_by_key(|window| window.z_index)
    }
}
