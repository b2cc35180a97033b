#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other(u16),
}

impl PointerButton {
    /// Map a toolkit button index (0 primary, 1 middle, 2 secondary).
    pub const fn from_index(index: u16) -> Self {
        match index {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }

    pub const fn pans_map(self) -> bool {
        matches!(self, Self::Middle)
    }
}
