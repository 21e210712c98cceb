//! Interface to the platform's service API.
//!
//! # Design
//! The service API fronts several components for applications: tokens, app
//! details, tasks, profiles and message logging. Its task listing comes in
//! two flavours with different completion rules:
//!
//! - [`ServiceApiInterface::get_all_tasks`] pages by 100 and stops at the
//!   first short page, ignoring the reported `total`.
//! - [`ServiceApiInterface::get_opened_tasks_of_user`] and
//!   [`ServiceApiInterface::get_all_tasks_of_application`] trust `total` and
//!   let the server choose the page size.
//!
//! Every page of an aggregation is sent with the same filters.

use serde_json::{json, Value};

use crate::client::{decode, decode_list, json_list, ComponentClient, Outcome};
use crate::codec::Repr;
use crate::config::ServiceApiConfig;
use crate::error::ApiError;
use crate::filter::ServiceTaskFilter;
use crate::http::{Headers, RestClient};
use crate::model::{App, CoreUserProfile, Message, Task, TaskPage, TaskTransaction, TokenDetails, UserProfile};
use crate::pagination::{collect_all, PageRequest, Strategy, DEFAULT_PAGE_SIZE};
use crate::query::QueryParams;

const COMPONENT: &str = "service api";
const ACCEPTED_WRITES: &[u16] = &[200, 201];

/// Free-form profile sections with their own endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSection {
    Competences,
    Materials,
    Meanings,
}

impl ProfileSection {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileSection::Competences => "competences",
            ProfileSection::Materials => "materials",
            ProfileSection::Meanings => "meanings",
        }
    }
}

pub struct ServiceApiInterface<C> {
    client: ComponentClient<C>,
}

impl<C: RestClient> ServiceApiInterface<C> {
    pub fn new(rest: C, config: &ServiceApiConfig) -> Self {
        Self {
            client: ComponentClient::new(rest, COMPONENT, &config.base_url(), config.extra_headers.clone()),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn get_token_details(&self, headers: Option<&Headers>) -> Result<TokenDetails, ApiError> {
        let response = self.client.get("/token", QueryParams::new(), headers)?;
        decode(&self.client.check(response, Outcome::Read)?)
    }

    pub fn get_app_details(&self, app_id: &str, headers: Option<&Headers>) -> Result<App, ApiError> {
        let response = self.client.get(&format!("/app/{app_id}"), QueryParams::new(), headers)?;
        decode(&self.client.check(response, fetch("App", app_id))?)
    }

    /// Identifiers of the users of an application.
    pub fn get_app_users(&self, app_id: &str, headers: Option<&Headers>) -> Result<Vec<String>, ApiError> {
        let response = self.client.get(&format!("/app/{app_id}/users"), QueryParams::new(), headers)?;
        decode_list(&self.client.check(response, fetch("App", app_id))?, "app users")
    }

    pub fn create_task(&self, task: &Task, headers: Option<&Headers>) -> Result<(), ApiError> {
        let response = self.client.post("/task", &task.to_create_repr(), headers)?;
        self.client.check(response, Outcome::Write { accepted: ACCEPTED_WRITES })?;
        Ok(())
    }

    /// The task with `task_id`. The returned task carries the requested id
    /// whatever the body says.
    pub fn get_task(&self, task_id: &str, headers: Option<&Headers>) -> Result<Task, ApiError> {
        let response = self.client.get(&format!("/task/{task_id}"), QueryParams::new(), headers)?;
        let response = self.client.check(response, fetch("Task", task_id))?;
        Ok(Task::from_repr_with_id(&response.json()?, task_id)?)
    }

    pub fn create_task_transaction(&self, transaction: &TaskTransaction, headers: Option<&Headers>) -> Result<(), ApiError> {
        let response = self.client.post("/task/transaction", &transaction.to_repr(), headers)?;
        self.client.check(response, Outcome::Write { accepted: ACCEPTED_WRITES })?;
        Ok(())
    }

    pub fn get_user_profile(&self, user_id: &str, headers: Option<&Headers>) -> Result<CoreUserProfile, ApiError> {
        let response = self.client.get(&format!("/user/profile/{user_id}"), QueryParams::new(), headers)?;
        decode(&self.client.check(response, fetch("User", user_id))?)
    }

    /// Ask the platform to create an empty profile for `user_id`.
    pub fn create_user_profile(&self, user_id: &str, headers: Option<&Headers>) -> Result<(), ApiError> {
        let response = self.client.post(&format!("/user/profile/{user_id}"), &json!({}), headers)?;
        self.client.check(response, Outcome::Write { accepted: ACCEPTED_WRITES })?;
        Ok(())
    }

    /// Store `profile` for `user_id` and return the full profile the platform
    /// now holds. Either profile variant can be sent.
    pub fn update_user_profile<P: Repr>(
        &self,
        user_id: &str,
        profile: &P,
        headers: Option<&Headers>,
    ) -> Result<UserProfile, ApiError> {
        let response = self.client.put(&format!("/user/profile/{user_id}"), &profile.to_repr(), headers)?;
        decode(&self.client.check(response, fetch("User", user_id))?)
    }

    /// One page of tasks. `limit: None` leaves the page size to the server.
    pub fn get_task_page(
        &self,
        filter: &ServiceTaskFilter,
        offset: u64,
        limit: Option<u32>,
        headers: Option<&Headers>,
    ) -> Result<TaskPage, ApiError> {
        self.fetch_tasks(filter, PageRequest { offset, limit }, Outcome::Read, headers)
    }

    /// Every task matching `filter` from `offset` on.
    pub fn get_all_tasks(
        &self,
        filter: &ServiceTaskFilter,
        offset: u64,
        headers: Option<&Headers>,
    ) -> Result<Vec<Task>, ApiError> {
        let strategy = Strategy::UntilShortPage {
            page_size: DEFAULT_PAGE_SIZE,
        };
        collect_all(strategy, offset, |page| self.fetch_tasks(filter, page, Outcome::Read, headers))
    }

    /// Open tasks requested by `user_id` in `app_id`.
    pub fn get_opened_tasks_of_user(
        &self,
        user_id: &str,
        app_id: &str,
        headers: Option<&Headers>,
    ) -> Result<Vec<Task>, ApiError> {
        let filter = ServiceTaskFilter::new().app(app_id).requester(user_id).closed(false);
        collect_all(Strategy::UntilTotal { page_size: None }, 0, |page| {
            self.fetch_tasks(&filter, page, fetch("User", user_id), headers)
        })
    }

    /// Open tasks of every user of `app_id`.
    pub fn get_all_tasks_of_application(&self, app_id: &str, headers: Option<&Headers>) -> Result<Vec<Task>, ApiError> {
        let filter = ServiceTaskFilter::new().app(app_id).closed(false);
        collect_all(Strategy::UntilTotal { page_size: None }, 0, |page| {
            self.fetch_tasks(&filter, page, fetch("App", app_id), headers)
        })
    }

    pub fn log_message(&self, message: &Message, headers: Option<&Headers>) -> Result<(), ApiError> {
        let response = self.client.post("/log/messages", &message.to_repr(), headers)?;
        self.client.check(response, Outcome::Write { accepted: ACCEPTED_WRITES })?;
        Ok(())
    }

    pub fn get_user_section(
        &self,
        user_id: &str,
        section: ProfileSection,
        headers: Option<&Headers>,
    ) -> Result<Vec<Value>, ApiError> {
        let path = format!("/user/profile/{user_id}/{}", section.as_str());
        let response = self.client.get(&path, QueryParams::new(), headers)?;
        json_list(&self.client.check(response, fetch("User", user_id))?, section.as_str())
    }

    /// Replace one profile section and return the stored list.
    pub fn update_user_section(
        &self,
        user_id: &str,
        section: ProfileSection,
        items: &[Value],
        headers: Option<&Headers>,
    ) -> Result<Vec<Value>, ApiError> {
        let path = format!("/user/profile/{user_id}/{}", section.as_str());
        let response = self.client.put(&path, &Value::Array(items.to_vec()), headers)?;
        json_list(&self.client.check(response, fetch("User", user_id))?, section.as_str())
    }

    pub fn get_user_competences(&self, user_id: &str, headers: Option<&Headers>) -> Result<Vec<Value>, ApiError> {
        self.get_user_section(user_id, ProfileSection::Competences, headers)
    }

    pub fn get_user_materials(&self, user_id: &str, headers: Option<&Headers>) -> Result<Vec<Value>, ApiError> {
        self.get_user_section(user_id, ProfileSection::Materials, headers)
    }

    pub fn get_user_meanings(&self, user_id: &str, headers: Option<&Headers>) -> Result<Vec<Value>, ApiError> {
        self.get_user_section(user_id, ProfileSection::Meanings, headers)
    }

    pub fn update_user_competences(
        &self,
        user_id: &str,
        competences: &[Value],
        headers: Option<&Headers>,
    ) -> Result<Vec<Value>, ApiError> {
        self.update_user_section(user_id, ProfileSection::Competences, competences, headers)
    }

    pub fn update_user_materials(
        &self,
        user_id: &str,
        materials: &[Value],
        headers: Option<&Headers>,
    ) -> Result<Vec<Value>, ApiError> {
        self.update_user_section(user_id, ProfileSection::Materials, materials, headers)
    }

    pub fn update_user_meanings(
        &self,
        user_id: &str,
        meanings: &[Value],
        headers: Option<&Headers>,
    ) -> Result<Vec<Value>, ApiError> {
        self.update_user_section(user_id, ProfileSection::Meanings, meanings, headers)
    }

    fn fetch_tasks(
        &self,
        filter: &ServiceTaskFilter,
        page: PageRequest,
        outcome: Outcome<'_>,
        headers: Option<&Headers>,
    ) -> Result<TaskPage, ApiError> {
        let mut query = filter.to_query();
        query.push("offset", page.offset).push_opt("limit", page.limit);
        let response = self.client.get("/tasks", query, headers)?;
        decode(&self.client.check(response, outcome)?)
    }
}

fn fetch<'a>(kind: &'static str, id: &'a str) -> Outcome<'a> {
    Outcome::Fetch { kind, id }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::DecodeError;
    use crate::http::HttpMethod;
    use crate::model::{Content, MessageType, TaskGoal};
    use crate::testing::ScriptedClient;

    fn interface(rest: &ScriptedClient) -> ServiceApiInterface<&ScriptedClient> {
        let config = ServiceApiConfig::new("http://localhost:8080").with_header("x-wenet-component-apikey", "key");
        ServiceApiInterface::new(rest, &config)
    }

    fn task(id: &str) -> Task {
        let mut task = Task::new("ask4help", "user-1", "app-1", TaskGoal::new(format!("goal {id}"), ""));
        task.task_id = Some(id.to_string());
        task
    }

    fn tasks(from: u64, count: u64) -> Vec<Task> {
        (from..from + count).map(|i| task(&format!("t{i}"))).collect()
    }

    fn page(offset: u64, total: u64, items: Vec<Task>) -> Value {
        TaskPage::new(offset, total, items).to_repr()
    }

    #[test]
    fn oauth_config_switches_component_path() {
        let rest = ScriptedClient::new();
        let config = ServiceApiConfig::new("http://localhost:8080").oauth();
        assert_eq!(ServiceApiInterface::new(&rest, &config).base_url(), "http://localhost:8080/api/service");
        assert_eq!(interface(&rest).base_url(), "http://localhost:8080/service");
    }

    #[test]
    fn task_page_then_all_tasks_with_small_total() {
        let two = tasks(1, 2);
        let rest = ScriptedClient::new()
            .respond(200, page(0, 2, two.clone()))
            .respond(200, page(0, 2, two.clone()));
        let api = interface(&rest);

        let filter = ServiceTaskFilter::new().app("app-1");
        let first = api.get_task_page(&filter, 0, Some(100), None).unwrap();
        assert_eq!(first, TaskPage::new(0, 2, two.clone()));

        let all = api.get_all_tasks(&filter, 0, None).unwrap();
        assert_eq!(all, two);
        assert_eq!(rest.requests().len(), 2);
    }

    #[test]
    fn empty_filter_sends_only_window() {
        let rest = ScriptedClient::new().respond(200, page(0, 0, Vec::new()));
        interface(&rest)
            .get_task_page(&ServiceTaskFilter::new(), 0, Some(10), None)
            .unwrap();
        let request = rest.request(0);
        assert_eq!(request.url, "http://localhost:8080/service/tasks");
        assert_eq!(
            request.query,
            vec![("offset".to_string(), "0".to_string()), ("limit".to_string(), "10".to_string())]
        );
    }

    #[test]
    fn all_tasks_pages_by_hundred_until_short_page() {
        let rest = ScriptedClient::new()
            .respond(200, page(0, 0, tasks(0, 100)))
            .respond(200, page(100, 0, Vec::new()));
        let filter = ServiceTaskFilter::new().app("app-1").requester("user-1");
        let all = interface(&rest).get_all_tasks(&filter, 0, None).unwrap();

        assert_eq!(all.len(), 100);
        let requests = rest.requests();
        assert_eq!(requests[1].query_param("offset"), Some("100"));
        assert!(requests.iter().all(|r| r.query_param("limit") == Some("100")));
        assert!(requests.iter().all(|r| r.query_param("requesterId") == Some("user-1")));
    }

    #[test]
    fn opened_tasks_follow_total_and_keep_filters() {
        let rest = ScriptedClient::new()
            .respond(200, page(0, 250, tasks(0, 100)))
            .respond(200, page(100, 250, tasks(100, 100)))
            .respond(200, page(200, 250, tasks(200, 50)));
        let opened = interface(&rest).get_opened_tasks_of_user("user-1", "app-1", None).unwrap();

        assert_eq!(opened, tasks(0, 250));
        let requests = rest.requests();
        let offsets: Vec<_> = requests.iter().map(|r| r.query_param("offset")).collect();
        assert_eq!(offsets, vec![Some("0"), Some("100"), Some("200")]);
        for request in &requests {
            assert_eq!(request.query_param("appId"), Some("app-1"));
            assert_eq!(request.query_param("requesterId"), Some("user-1"));
            assert_eq!(request.query_param("hasCloseTs"), Some("false"));
            assert_eq!(request.query_param("limit"), None);
        }
    }

    #[test]
    fn opened_tasks_of_unknown_user() {
        let rest = ScriptedClient::new().respond_text(404, "user not found");
        let err = interface(&rest).get_opened_tasks_of_user("ghost", "app-1", None).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { kind: "User", ref id, .. } if id == "ghost"));
    }

    #[test]
    fn application_tasks_of_unknown_app() {
        let rest = ScriptedClient::new().respond_text(404, "");
        let err = interface(&rest).get_all_tasks_of_application("app-x", None).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { kind: "App", .. }));
    }

    #[test]
    fn application_tasks_with_empty_result_cost_one_request() {
        let rest = ScriptedClient::new().respond(200, page(0, 0, Vec::new()));
        let all = interface(&rest).get_all_tasks_of_application("app-1", None).unwrap();
        assert!(all.is_empty());
        assert_eq!(rest.requests().len(), 1);
        assert_eq!(rest.request(0).query_param("requesterId"), None);
    }

    #[test]
    fn failed_page_discards_partial_results() {
        let rest = ScriptedClient::new()
            .respond(200, page(0, 0, tasks(0, 100)))
            .respond_text(500, "internal error");
        let err = interface(&rest)
            .get_all_tasks(&ServiceTaskFilter::new(), 0, None)
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedResponse { status: 500, ref body } if body == "internal error"));
    }

    #[test]
    fn transport_failure_on_second_page_aborts_aggregation() {
        let rest = ScriptedClient::new()
            .respond(200, page(0, 0, tasks(0, 100)))
            .fail(ApiError::Transport("connection reset".to_string()))
            .respond(200, page(200, 0, Vec::new()));
        let err = interface(&rest)
            .get_all_tasks(&ServiceTaskFilter::new(), 0, None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(ref reason) if reason == "connection reset"));
        assert_eq!(rest.requests().len(), 2);
    }

    #[test]
    fn get_task_forces_requested_id() {
        let mut body = task("other").to_repr();
        body["id"] = json!("other");
        let rest = ScriptedClient::new().respond(200, body);
        let fetched = interface(&rest).get_task("t-1", None).unwrap();
        assert_eq!(fetched.task_id.as_deref(), Some("t-1"));
        assert_eq!(rest.request(0).url, "http://localhost:8080/service/task/t-1");
    }

    #[test]
    fn get_task_not_found_and_auth() {
        let rest = ScriptedClient::new()
            .respond_text(404, "missing")
            .respond_text(401, "bad key");
        let api = interface(&rest);
        let err = api.get_task("t-404", None).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { kind: "Task", ref id, .. } if id == "t-404"));
        let err = api.get_task("t-1", None).unwrap_err();
        assert!(matches!(err, ApiError::Authentication { status: 401, .. }));
    }

    #[test]
    fn create_task_accepts_201_only_on_service_api() {
        let rest = ScriptedClient::new().respond_text(201, "").respond_text(202, "");
        let api = interface(&rest);
        api.create_task(&task("t-1"), None).unwrap();
        let err = api.create_task(&task("t-1"), None).unwrap_err();
        assert!(matches!(err, ApiError::Creation { status: 202, .. }));

        let body = rest.request(0).json_body().unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(rest.request(0).url, "http://localhost:8080/service/task");
    }

    #[test]
    fn transaction_goes_to_task_transaction() {
        let rest = ScriptedClient::new().respond_text(200, "");
        let transaction = TaskTransaction::new("t-1", "accept", Some("user-2".to_string()));
        interface(&rest).create_task_transaction(&transaction, None).unwrap();
        let request = rest.request(0);
        assert_eq!(request.url, "http://localhost:8080/service/task/transaction");
        assert_eq!(request.json_body().unwrap()["label"], "accept");
    }

    #[test]
    fn token_and_app_details() {
        let rest = ScriptedClient::new()
            .respond(200, json!({"profileId": "user-1", "appId": "app-1", "scopes": ["email"]}))
            .respond(200, json!({"appId": "app-1", "name": "Ask for help"}))
            .respond(200, json!(["user-1", "user-2"]));
        let api = interface(&rest);

        assert_eq!(api.get_token_details(None).unwrap().profile_id.as_deref(), Some("user-1"));
        assert_eq!(api.get_app_details("app-1", None).unwrap().name.as_deref(), Some("Ask for help"));
        assert_eq!(api.get_app_users("app-1", None).unwrap(), vec!["user-1", "user-2"]);
        assert_eq!(rest.request(1).url, "http://localhost:8080/service/app/app-1");
        assert_eq!(rest.request(2).url, "http://localhost:8080/service/app/app-1/users");
    }

    #[test]
    fn unknown_app_users() {
        let rest = ScriptedClient::new().respond_text(404, "");
        let err = interface(&rest).get_app_users("app-x", None).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { kind: "App", .. }));
    }

    #[test]
    fn profile_lifecycle_requests() {
        let mut core = CoreUserProfile::empty("user-1");
        core.email = Some("jane@example.com".to_string());
        let echoed = UserProfile::from_core(core.clone());
        let rest = ScriptedClient::new()
            .respond_text(201, "")
            .respond(200, core.to_repr())
            .respond(200, echoed.to_repr());
        let api = interface(&rest);

        api.create_user_profile("user-1", None).unwrap();
        assert_eq!(rest.request(0).json_body(), Some(json!({})));

        assert_eq!(api.get_user_profile("user-1", None).unwrap(), core);

        let updated = api.update_user_profile("user-1", &core, None).unwrap();
        assert_eq!(updated, echoed);
        let request = rest.request(2);
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.url, "http://localhost:8080/service/user/profile/user-1");
    }

    #[test]
    fn unknown_user_profile() {
        let rest = ScriptedClient::new().respond_text(404, "");
        let err = interface(&rest).get_user_profile("ghost", None).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { kind: "User", ref id, .. } if id == "ghost"));
    }

    #[test]
    fn profile_sections_round_trip_lists() {
        let competences = vec![json!({"name": "cooking", "ontology": "esco", "level": 0.8})];
        let rest = ScriptedClient::new()
            .respond(200, json!(competences.clone()))
            .respond(200, json!(competences.clone()))
            .respond(200, json!([]))
            .respond(200, json!({"not": "a list"}));
        let api = interface(&rest);

        assert_eq!(api.update_user_competences("user-1", &competences, None).unwrap(), competences);
        assert_eq!(rest.request(0).json_body(), Some(json!(competences.clone())));
        assert_eq!(api.get_user_competences("user-1", None).unwrap(), competences);
        assert!(api.get_user_meanings("user-1", None).unwrap().is_empty());
        let err = api.get_user_materials("user-1", None).unwrap_err();
        assert!(matches!(err, ApiError::Decode(DecodeError::InvalidType { .. })));

        let urls: Vec<_> = rest.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:8080/service/user/profile/user-1/competences",
                "http://localhost:8080/service/user/profile/user-1/competences",
                "http://localhost:8080/service/user/profile/user-1/meanings",
                "http://localhost:8080/service/user/profile/user-1/materials",
            ]
        );
    }

    #[test]
    fn section_of_unknown_user() {
        let rest = ScriptedClient::new().respond_text(404, "");
        let err = interface(&rest)
            .update_user_materials("ghost", &[json!({"name": "bike"})], None)
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { kind: "User", .. }));
    }

    #[test]
    fn log_message_posts_repr() {
        let rest = ScriptedClient::new().respond_text(201, "").respond_text(500, "down");
        let api = interface(&rest);
        let message = Message::new(MessageType::Request, "m-1", "Telegram", "user-1", "ask4help", Content::text("hi"), None);

        api.log_message(&message, None).unwrap();
        let request = rest.request(0);
        assert_eq!(request.url, "http://localhost:8080/service/log/messages");
        assert_eq!(request.json_body().unwrap()["type"], "REQUEST");

        let err = api.log_message(&message, None).unwrap_err();
        assert!(matches!(err, ApiError::Creation { status: 500, .. }));
    }
}
