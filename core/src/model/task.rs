//! Tasks and their goals.
//!
//! Task timestamps travel as integer epoch seconds.

use serde_json::{json, Map, Value};

use crate::codec::{list_to_repr, opt, Fields, Repr};
use crate::error::DecodeError;
use crate::model::norm::Norm;

/// What a task is trying to achieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGoal {
    pub name: String,
    pub description: String,
}

impl TaskGoal {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl Repr for TaskGoal {
    fn to_repr(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
        })
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("task goal", raw)?;
        Ok(Self {
            name: fields.str("name")?,
            description: fields.opt_str("description")?.unwrap_or_default(),
        })
    }
}

/// A task as stored by the task manager.
///
/// `task_id` is `None` until the server assigns one.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub task_id: Option<String>,
    pub creation_ts: Option<i64>,
    pub last_update_ts: Option<i64>,
    pub task_type_id: String,
    pub requester_id: String,
    pub app_id: String,
    pub goal: TaskGoal,
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
    pub deadline_ts: Option<i64>,
    pub norms: Vec<Norm>,
    pub attributes: Map<String, Value>,
    pub close_ts: Option<i64>,
}

impl Task {
    /// A task not yet known to the server.
    pub fn new(
        task_type_id: impl Into<String>,
        requester_id: impl Into<String>,
        app_id: impl Into<String>,
        goal: TaskGoal,
    ) -> Self {
        Self {
            task_id: None,
            creation_ts: None,
            last_update_ts: None,
            task_type_id: task_type_id.into(),
            requester_id: requester_id.into(),
            app_id: app_id.into(),
            goal,
            start_ts: None,
            end_ts: None,
            deadline_ts: None,
            norms: Vec::new(),
            attributes: Map::new(),
            close_ts: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.close_ts.is_some()
    }

    /// Body for a create call: the server assigns the id, so none is sent.
    pub fn to_create_repr(&self) -> Value {
        let mut repr = self.to_repr();
        if let Value::Object(map) = &mut repr {
            map.remove("id");
        }
        repr
    }

    /// Decode a fetched task, forcing its id to the one that was requested.
    pub fn from_repr_with_id(raw: &Value, task_id: &str) -> Result<Self, DecodeError> {
        let mut task = Self::from_repr(raw)?;
        task.task_id = Some(task_id.to_string());
        Ok(task)
    }
}

impl Repr for Task {
    fn to_repr(&self) -> Value {
        json!({
            "id": opt(&self.task_id),
            "_creationTs": opt(&self.creation_ts),
            "_lastUpdateTs": opt(&self.last_update_ts),
            "taskTypeId": self.task_type_id,
            "requesterId": self.requester_id,
            "appId": self.app_id,
            "goal": self.goal.to_repr(),
            "startTs": opt(&self.start_ts),
            "endTs": opt(&self.end_ts),
            "deadlineTs": opt(&self.deadline_ts),
            "norms": list_to_repr(&self.norms),
            "attributes": self.attributes,
            "closeTs": opt(&self.close_ts),
        })
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("task", raw)?;
        Ok(Self {
            task_id: fields.opt_str("id")?,
            creation_ts: fields.opt_i64("_creationTs")?,
            last_update_ts: fields.opt_i64("_lastUpdateTs")?,
            task_type_id: fields.str("taskTypeId")?,
            requester_id: fields.str("requesterId")?,
            app_id: fields.str("appId")?,
            goal: fields.entity("goal")?,
            start_ts: fields.opt_i64("startTs")?,
            end_ts: fields.opt_i64("endTs")?,
            deadline_ts: fields.opt_i64("deadlineTs")?,
            norms: fields.list("norms")?,
            attributes: fields.object("attributes")?,
            close_ts: fields.opt_i64("closeTs")?,
        })
    }
}
