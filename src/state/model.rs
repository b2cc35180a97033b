/// Interaction mode of the map workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Browsing,
    Placing,
    Editing,
}

impl AppState {
    pub const fn is_placing(self) -> bool {
        matches!(self, Self::Placing)
    }

    pub const fn is_editing(self) -> bool {
        matches!(self, Self::Editing)
    }
}
