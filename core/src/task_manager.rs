//! Interface to the task manager component.
//!
//! Listing operations return a single page when given a `limit`; with
//! `limit: None` they walk every page of the result set, 100 items at a time,
//! until a short page comes back.

use tracing::info;

use crate::client::{decode, ComponentClient, Outcome};
use crate::codec::Repr;
use crate::config::TaskManagerConfig;
use crate::error::ApiError;
use crate::filter::{TaskFilter, TransactionFilter};
use crate::http::{Headers, RestClient};
use crate::model::{Page, PageItem, Task, TaskPage, TaskTransaction, TaskTransactionPage};
use crate::pagination::{collect_all, PageRequest, Strategy};
use crate::query::QueryParams;

const COMPONENT: &str = "task manager";
const ACCEPTED_WRITES: &[u16] = &[200, 201, 202];

pub struct TaskManagerInterface<C> {
    client: ComponentClient<C>,
}

impl<C: RestClient> TaskManagerInterface<C> {
    pub fn new(rest: C, config: &TaskManagerConfig) -> Self {
        Self {
            client: ComponentClient::new(rest, COMPONENT, &config.base_url(), config.base_headers.clone()),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Tasks matching `filter`, from `offset` on.
    pub fn get_tasks(
        &self,
        filter: &TaskFilter,
        offset: u64,
        limit: Option<u32>,
        headers: Option<&Headers>,
    ) -> Result<Vec<Task>, ApiError> {
        match limit {
            Some(limit) => Ok(self.get_task_page(filter, offset, limit, headers)?.items),
            None => collect_all(Strategy::default(), offset, |page| {
                self.fetch_page("/tasks", filter.to_query(), page, headers)
            }),
        }
    }

    pub fn get_task_page(
        &self,
        filter: &TaskFilter,
        offset: u64,
        limit: u32,
        headers: Option<&Headers>,
    ) -> Result<TaskPage, ApiError> {
        let page = PageRequest {
            offset,
            limit: Some(limit),
        };
        self.fetch_page("/tasks", filter.to_query(), page, headers)
    }

    /// Transactions matching `filter`, from `offset` on.
    pub fn get_transactions(
        &self,
        filter: &TransactionFilter,
        offset: u64,
        limit: Option<u32>,
        headers: Option<&Headers>,
    ) -> Result<Vec<TaskTransaction>, ApiError> {
        match limit {
            Some(limit) => Ok(self.get_transaction_page(filter, offset, limit, headers)?.items),
            None => collect_all(Strategy::default(), offset, |page| {
                self.fetch_page("/taskTransactions", filter.to_query(), page, headers)
            }),
        }
    }

    pub fn get_transaction_page(
        &self,
        filter: &TransactionFilter,
        offset: u64,
        limit: u32,
        headers: Option<&Headers>,
    ) -> Result<TaskTransactionPage, ApiError> {
        let page = PageRequest {
            offset,
            limit: Some(limit),
        };
        self.fetch_page("/taskTransactions", filter.to_query(), page, headers)
    }

    pub fn get_task(&self, task_id: &str, headers: Option<&Headers>) -> Result<Task, ApiError> {
        let response = self.client.get(&format!("/tasks/{task_id}"), QueryParams::new(), headers)?;
        let response = self.client.check(
            response,
            Outcome::Fetch {
                kind: "Task",
                id: task_id,
            },
        )?;
        decode(&response)
    }

    /// Create `task`. Its id, if any, is not sent: the server assigns one.
    pub fn create_task(&self, task: &Task, headers: Option<&Headers>) -> Result<(), ApiError> {
        let response = self.client.post("/tasks", &task.to_create_repr(), headers)?;
        self.client.check(response, Outcome::Write { accepted: ACCEPTED_WRITES })?;
        info!(task_type_id = %task.task_type_id, "task created");
        Ok(())
    }

    /// Replace the stored state of `task`, which must carry its id.
    pub fn update_task(&self, task: &Task, headers: Option<&Headers>) -> Result<(), ApiError> {
        let task_id = task
            .task_id
            .as_deref()
            .ok_or_else(|| ApiError::InvalidArgument("cannot update a task without an id".to_string()))?;
        let response = self.client.put(&format!("/tasks/{task_id}"), &task.to_repr(), headers)?;
        self.client.check(response, Outcome::Write { accepted: ACCEPTED_WRITES })?;
        Ok(())
    }

    pub fn create_task_transaction(&self, transaction: &TaskTransaction, headers: Option<&Headers>) -> Result<(), ApiError> {
        let response = self.client.post("/tasks/transactions", &transaction.to_repr(), headers)?;
        self.client.check(response, Outcome::Write { accepted: ACCEPTED_WRITES })?;
        Ok(())
    }

    fn fetch_page<T: PageItem>(
        &self,
        path: &str,
        mut query: QueryParams,
        page: PageRequest,
        headers: Option<&Headers>,
    ) -> Result<Page<T>, ApiError> {
        query.push("offset", page.offset).push_opt("limit", page.limit);
        let response = self.client.get(path, query, headers)?;
        let response = self.client.check(response, Outcome::Read)?;
        decode(&response)
    }
}
