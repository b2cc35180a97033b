#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Character(char),
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, shift: bool) -> Self {
        Self { ctrl, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    pub editor_open: bool,
    pub text_input_active: bool,
    pub note_window_open: bool,
    pub placing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    EditorSubmit,
    EditorClose,
    CloseTopmostNote,
    CancelPlacement,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

fn resolve_editor_shortcut(key: ShortcutKey, modifiers: ShortcutModifiers) -> Option<ShortcutAction> {
    match (key, modifiers.ctrl) {
        (ShortcutKey::Escape, _) => Some(ShortcutAction::EditorClose),
        (ShortcutKey::Enter, true) => Some(ShortcutAction::EditorSubmit),
        _ => None,
    }
}

fn resolve_escape(context: InputContext) -> Option<ShortcutAction> {
    if context.note_window_open {
        Some(ShortcutAction::CloseTopmostNote)
    } else if context.placing {
        Some(ShortcutAction::CancelPlacement)
    } else {
        None
    }
}

fn resolve_map_shortcut(key: ShortcutKey, modifiers: ShortcutModifiers) -> Option<ShortcutAction> {
    if modifiers.ctrl {
        return None;
    }
    match key {
        ShortcutKey::Character('+') | ShortcutKey::Character('=') => Some(ShortcutAction::ZoomIn),
        ShortcutKey::Character('-') => Some(ShortcutAction::ZoomOut),
        ShortcutKey::Character('0') => Some(ShortcutAction::ZoomReset),
        _ => None,
    }
}

/// Escape unwinds the innermost surface first: editor, then the topmost
/// note window, then placement mode.
pub fn resolve_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    if context.editor_open {
        return resolve_editor_shortcut(key, modifiers);
    }

    if key == ShortcutKey::Escape {
        return resolve_escape(context);
    }

    if context.text_input_active {
        return None;
    }

    resolve_map_shortcut(key, modifiers)
}
