mod pointer;
mod shortcut;

pub use pointer::PointerButton;
pub use shortcut::{
    resolve_shortcut, InputContext, ShortcutAction, ShortcutKey, ShortcutModifiers,
};
