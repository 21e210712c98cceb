//! Wire DTOs of the mock platform.
//!
//! These are defined independently from the client crate: integration tests
//! catch any drift between the two.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "_creationTs", default)]
    pub creation_ts: Option<i64>,
    #[serde(rename = "_lastUpdateTs", default)]
    pub last_update_ts: Option<i64>,
    pub task_type_id: String,
    pub requester_id: String,
    pub app_id: String,
    pub goal: Goal,
    #[serde(default)]
    pub start_ts: Option<i64>,
    #[serde(default)]
    pub end_ts: Option<i64>,
    #[serde(default)]
    pub deadline_ts: Option<i64>,
    #[serde(default)]
    pub norms: Vec<Value>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub close_ts: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTransaction {
    #[serde(default)]
    pub id: Option<String>,
    pub task_id: String,
    pub label: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub actioneer_id: Option<String>,
    #[serde(rename = "_creationTs", default)]
    pub creation_ts: Option<i64>,
    #[serde(rename = "_lastUpdateTs", default)]
    pub last_update_ts: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub app_id: String,
    pub name: Option<String>,
    pub message_callback_url: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(rename = "_creationTs", default)]
    pub creation_ts: Option<i64>,
    #[serde(rename = "_lastUpdateTs", default)]
    pub last_update_ts: Option<i64>,
    #[serde(skip)]
    pub users: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    pub profile_id: Option<String>,
    pub app_id: String,
    pub scopes: Vec<String>,
}

/// Query accepted by both task listings. Filters the mock does not model
/// (time ranges, order) are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub app_id: Option<String>,
    pub requester_id: Option<String>,
    pub task_type_id: Option<String>,
    pub goal_name: Option<String>,
    pub has_close_ts: Option<bool>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        fn eq(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().map_or(true, |f| f == value)
        }
        eq(&self.app_id, &task.app_id)
            && eq(&self.requester_id, &task.requester_id)
            && eq(&self.task_type_id, &task.task_type_id)
            && eq(&self.goal_name, &task.goal.name)
            && self.has_close_ts.map_or(true, |closed| closed == task.close_ts.is_some())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub app_id: Option<String>,
    pub task_id: Option<String>,
    pub id: Option<String>,
    pub label: Option<String>,
    pub actioneer_id: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Profile sections with their own endpoints.
pub const PROFILE_SECTIONS: [&str; 3] = ["competences", "materials", "meanings"];

/// Collection keys every stored profile carries.
pub const PROFILE_COLLECTIONS: [&str; 8] = [
    "norms",
    "plannedActivities",
    "relevantLocations",
    "relationships",
    "personalBehaviors",
    "materials",
    "competences",
    "meanings",
];

/// A fresh profile holding only its id, timestamps and empty collections.
pub fn empty_profile(id: &str, now: i64) -> Map<String, Value> {
    let mut profile = Map::new();
    profile.insert("id".to_string(), Value::from(id));
    profile.insert("_creationTs".to_string(), Value::from(now));
    profile.insert("_lastUpdateTs".to_string(), Value::from(now));
    for key in PROFILE_COLLECTIONS {
        profile.insert(key.to_string(), Value::Array(Vec::new()));
    }
    profile
}
