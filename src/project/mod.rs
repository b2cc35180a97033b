//! Project index entries, ids and navigation between linked maps.

mod navigation;
mod query;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use navigation::{NavigationStack, NAVIGATION_DEPTH};
pub use query::{
    project_id_from_query, project_query, requested_project_id, DEFAULT_PROJECT_ID,
    PROJECT_QUERY_KEY,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>, now_ms: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Index entries need a string id and name; timestamps default to 0.
    pub fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        let timestamp = |key: &str| record.get(key).and_then(Value::as_u64).unwrap_or_default();
        Some(Self {
            id: record.get("id")?.as_str()?.to_string(),
            name: record.get("name")?.as_str()?.to_string(),
            created_at: timestamp("createdAt"),
            updated_at: timestamp("updatedAt"),
        })
    }

    pub fn touch(&mut self, now_ms: u64) {
        self.updated_at = now_ms;
    }
}

/// Decode the project index, skipping malformed entries, most recently
/// updated first.
pub fn decode_projects(records: &[Value]) -> Vec<Project> {
    let mut projects = records
        .iter()
        .filter_map(Project::from_value)
        .collect::<Vec<_>>();
    if projects.len() < records.len() {
        tracing::warn!(
            skipped = records.len() - projects.len(),
            "skipped malformed project index entries"
        );
    }
    sort_recent_first(&mut projects);
    projects
}

pub fn sort_recent_first(projects: &mut [Project]) {
    projects.sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
}

/// Display name for `id`, or the id itself when the index has no entry.
pub fn project_name(projects: &[Project], id: &str) -> String {
    projects
        .iter()
        .find(|project| project.id == id)
        .map(|project| project.name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Projects a link note may point at: everything except `current`.
pub fn link_targets<'a>(projects: &'a [Project], current: &str) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|project| project.id != current)
        .collect()
}

pub fn new_project_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
