//! Task transactions: the actions performed on a task.

use serde_json::{json, Map, Value};

use crate::codec::{opt, Fields, Repr};
use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq)]
pub struct TaskTransaction {
    pub transaction_id: Option<String>,
    pub task_id: String,
    pub label: String,
    pub attributes: Map<String, Value>,
    pub actioneer_id: Option<String>,
    pub creation_ts: Option<i64>,
    pub last_update_ts: Option<i64>,
}

impl TaskTransaction {
    pub fn new(task_id: impl Into<String>, label: impl Into<String>, actioneer_id: Option<String>) -> Self {
        Self {
            transaction_id: None,
            task_id: task_id.into(),
            label: label.into(),
            attributes: Map::new(),
            actioneer_id,
            creation_ts: None,
            last_update_ts: None,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl Repr for TaskTransaction {
    fn to_repr(&self) -> Value {
        json!({
            "id": opt(&self.transaction_id),
            "taskId": self.task_id,
            "label": self.label,
            "attributes": self.attributes,
            "actioneerId": opt(&self.actioneer_id),
            "_creationTs": opt(&self.creation_ts),
            "_lastUpdateTs": opt(&self.last_update_ts),
        })
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("task transaction", raw)?;
        Ok(Self {
            transaction_id: fields.opt_str("id")?,
            task_id: fields.str("taskId")?,
            label: fields.str("label")?,
            attributes: fields.object("attributes")?,
            actioneer_id: fields.opt_str("actioneerId")?,
            creation_ts: fields.opt_i64("_creationTs")?,
            last_update_ts: fields.opt_i64("_lastUpdateTs")?,
        })
    }
}
