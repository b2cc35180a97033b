/// How many previous projects the back stack keeps.
pub const NAVIGATION_DEPTH: usize = 20;

/// Breadcrumb of projects left by following link notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationStack {
    entries: Vec<String>,
}

impl NavigationStack {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_entries(entries: Vec<String>) -> Self {
        let mut stack = Self { entries };
        stack.trim();
        stack
    }

    fn trim(&mut self) {
        if self.entries.len() > NAVIGATION_DEPTH {
            let excess = self.entries.len() - NAVIGATION_DEPTH;
            self.entries.drain(..excess);
        }
    }

    pub fn push(&mut self, project_id: impl Into<String>) {
        self.entries.push(project_id.into());
        self.trim();
    }

    pub fn back(&mut self) -> Option<String> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
