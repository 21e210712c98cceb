//! Listing filters for the task and transaction endpoints.
//!
//! Every filter renders into [`QueryParams`] with only the fields that are
//! set. `offset` and `limit` are not part of a filter: the interfaces add
//! them per page.

use chrono::{DateTime, Utc};

use crate::query::{Order, QueryParams};

/// Filter for the task manager's `GET /tasks`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub app_id: String,
    pub requester_id: Option<String>,
    pub task_type_id: Option<String>,
    pub goal_name: Option<String>,
    pub goal_description: Option<String>,
    pub creation_from: Option<DateTime<Utc>>,
    pub creation_to: Option<DateTime<Utc>>,
    pub update_from: Option<DateTime<Utc>>,
    pub update_to: Option<DateTime<Utc>>,
    pub has_close_ts: Option<bool>,
    pub close_from: Option<DateTime<Utc>>,
    pub close_to: Option<DateTime<Utc>>,
    pub order: Option<Order>,
}

impl TaskFilter {
    /// All tasks of one application.
    pub fn for_app(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Self::default()
        }
    }

    pub fn requester(mut self, requester_id: impl Into<String>) -> Self {
        self.requester_id = Some(requester_id.into());
        self
    }

    pub fn task_type(mut self, task_type_id: impl Into<String>) -> Self {
        self.task_type_id = Some(task_type_id.into());
        self
    }

    pub fn closed(mut self, has_close_ts: bool) -> Self {
        self.has_close_ts = Some(has_close_ts);
        self
    }

    pub fn ordered_by(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .push("appId", &self.app_id)
            .push_str("requesterId", self.requester_id.as_deref())
            .push_str("taskTypeId", self.task_type_id.as_deref())
            .push_str("goalName", self.goal_name.as_deref())
            .push_str("goalDescription", self.goal_description.as_deref())
            .push_ts("creationFrom", self.creation_from)
            .push_ts("creationTo", self.creation_to)
            .push_ts("updateFrom", self.update_from)
            .push_ts("updateTo", self.update_to)
            .push_opt("hasCloseTs", self.has_close_ts)
            .push_ts("closeFrom", self.close_from)
            .push_ts("closeTo", self.close_to)
            .push_opt("order", self.order.as_ref().filter(|o| !o.is_empty()));
        query
    }
}

/// Filter for the task manager's `GET /taskTransactions`.
///
/// The `task_*` ranges and goal fields select the owning tasks; the rest
/// select the transactions themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub app_id: String,
    pub requester_id: Option<String>,
    pub task_type_id: Option<String>,
    pub goal_name: Option<String>,
    pub goal_description: Option<String>,
    pub goal_keywords: Option<String>,
    pub task_creation_from: Option<DateTime<Utc>>,
    pub task_creation_to: Option<DateTime<Utc>>,
    pub task_update_from: Option<DateTime<Utc>>,
    pub task_update_to: Option<DateTime<Utc>>,
    pub has_close_ts: Option<bool>,
    pub close_from: Option<DateTime<Utc>>,
    pub close_to: Option<DateTime<Utc>>,
    pub task_id: Option<String>,
    pub transaction_id: Option<String>,
    pub label: Option<String>,
    pub actioneer_id: Option<String>,
    pub creation_from: Option<DateTime<Utc>>,
    pub creation_to: Option<DateTime<Utc>>,
    pub update_from: Option<DateTime<Utc>>,
    pub update_to: Option<DateTime<Utc>>,
    pub order: Option<Order>,
}

impl TransactionFilter {
    pub fn for_app(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Self::default()
        }
    }

    pub fn task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn actioneer(mut self, actioneer_id: impl Into<String>) -> Self {
        self.actioneer_id = Some(actioneer_id.into());
        self
    }

    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .push("appId", &self.app_id)
            .push_str("requesterId", self.requester_id.as_deref())
            .push_str("taskTypeId", self.task_type_id.as_deref())
            .push_str("goalName", self.goal_name.as_deref())
            .push_str("goalDescription", self.goal_description.as_deref())
            .push_str("goalKeywords", self.goal_keywords.as_deref())
            .push_ts("taskCreationFrom", self.task_creation_from)
            .push_ts("taskCreationTo", self.task_creation_to)
            .push_ts("taskUpdateFrom", self.task_update_from)
            .push_ts("taskUpdateTo", self.task_update_to)
            .push_opt("hasCloseTs", self.has_close_ts)
            .push_ts("closeFrom", self.close_from)
            .push_ts("closeTo", self.close_to)
            .push_str("taskId", self.task_id.as_deref())
            .push_str("id", self.transaction_id.as_deref())
            .push_str("label", self.label.as_deref())
            .push_str("actioneerId", self.actioneer_id.as_deref())
            .push_ts("creationFrom", self.creation_from)
            .push_ts("creationTo", self.creation_to)
            .push_ts("updateFrom", self.update_from)
            .push_ts("updateTo", self.update_to)
            .push_opt("order", self.order.as_ref().filter(|o| !o.is_empty()));
        query
    }
}

/// Filter for the service API's `GET /tasks`. Unlike the task manager, the
/// application is optional here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceTaskFilter {
    pub app_id: Option<String>,
    pub requester_id: Option<String>,
    pub task_type_id: Option<String>,
    pub goal_name: Option<String>,
    pub goal_description: Option<String>,
    pub start_from: Option<DateTime<Utc>>,
    pub start_to: Option<DateTime<Utc>>,
    pub end_from: Option<DateTime<Utc>>,
    pub end_to: Option<DateTime<Utc>>,
    pub has_close_ts: Option<bool>,
    pub deadline_from: Option<DateTime<Utc>>,
    pub deadline_to: Option<DateTime<Utc>>,
}

impl ServiceTaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn requester(mut self, requester_id: impl Into<String>) -> Self {
        self.requester_id = Some(requester_id.into());
        self
    }

    pub fn closed(mut self, has_close_ts: bool) -> Self {
        self.has_close_ts = Some(has_close_ts);
        self
    }

    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .push_str("appId", self.app_id.as_deref())
            .push_str("requesterId", self.requester_id.as_deref())
            .push_str("taskTypeId", self.task_type_id.as_deref())
            .push_str("goalName", self.goal_name.as_deref())
            .push_str("goalDescription", self.goal_description.as_deref())
            .push_ts("startFrom", self.start_from)
            .push_ts("startTo", self.start_to)
            .push_ts("endFrom", self.end_from)
            .push_ts("endTo", self.end_to)
            .push_opt("hasCloseTs", self.has_close_ts)
            .push_ts("deadlineFrom", self.deadline_from)
            .push_ts("deadlineTo", self.deadline_to);
        query
    }
}
