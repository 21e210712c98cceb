//! In-memory stand-in for the WeNet task manager and service API.
//!
//! # Design
//! One shared [`Store`] backs both components: the task manager is mounted
//! under `/task_manager` and the service API under `/service` (and again
//! under `/api/service`, its OAuth2 path). Every route requires the
//! component API key header. Listings page with `offset`/`limit` and report
//! the full match count as `total`; without a `limit` the server picks
//! [`DEFAULT_PAGE_LIMIT`].

mod dto;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub use dto::{
    empty_profile, App, Goal, Task, TaskQuery, TaskTransaction, TokenDetails, TransactionQuery, PROFILE_COLLECTIONS,
    PROFILE_SECTIONS,
};

pub const API_KEY_HEADER: &str = "x-wenet-component-apikey";
pub const DEFAULT_API_KEY: &str = "test-key";
pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const SEEDED_APP_ID: &str = "app-1";

const MESSAGE_TYPES: [&str; 3] = ["REQUEST", "RESPONSE", "NOTIFICATION"];

#[derive(Debug, Default)]
pub struct Store {
    pub tasks: Vec<Task>,
    pub transactions: Vec<TaskTransaction>,
    pub profiles: HashMap<String, Map<String, Value>>,
    pub apps: HashMap<String, App>,
    pub messages: Vec<Value>,
}

impl Store {
    /// A store holding one application with two users.
    pub fn seeded() -> Self {
        let now = Utc::now().timestamp();
        let app = App {
            app_id: SEEDED_APP_ID.to_string(),
            name: Some("Ask for help".to_string()),
            message_callback_url: Some("http://localhost/callback".to_string()),
            metadata: Map::new(),
            creation_ts: Some(now),
            last_update_ts: Some(now),
            users: vec!["user-1".to_string(), "user-2".to_string()],
        };
        Self {
            apps: HashMap::from([(app.app_id.clone(), app)]),
            ..Self::default()
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    api_key: Arc<str>,
}

impl AppState {
    pub fn new(api_key: &str) -> Self {
        Self {
            db: Arc::new(RwLock::new(Store::seeded())),
            api_key: Arc::from(api_key),
        }
    }
}

type Failure = (StatusCode, String);

fn not_found(kind: &str, id: &str) -> Failure {
    (StatusCode::NOT_FOUND, format!("{kind} [{id}] does not exist"))
}

fn bad_request(reason: impl Into<String>) -> Failure {
    (StatusCode::BAD_REQUEST, reason.into())
}

pub fn app() -> Router {
    app_with_state(AppState::new(DEFAULT_API_KEY))
}

pub fn app_with_state(state: AppState) -> Router {
    let task_manager = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/transactions", post(create_transaction))
        .route("/tasks/{id}", get(get_task).put(update_task))
        .route("/taskTransactions", get(list_transactions));

    let service = Router::new()
        .route("/tasks", get(list_tasks))
        .route("/task", post(create_task))
        .route("/task/transaction", post(create_transaction))
        .route("/task/{id}", get(get_task))
        .route("/token", get(token_details))
        .route("/app/{id}", get(app_details))
        .route("/app/{id}/users", get(app_users))
        .route("/user/profile/{id}", get(get_profile).post(create_profile).put(update_profile))
        .route("/user/profile/{id}/{section}", get(get_section).put(update_section))
        .route("/log/messages", post(log_message));

    Router::new()
        .nest("/task_manager", task_manager)
        .nest("/service", service.clone())
        .nest("/api/service", service)
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = request.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if key != Some(&*state.api_key) {
        warn!(path = %request.uri().path(), "rejected request without a valid API key");
        return (StatusCode::UNAUTHORIZED, "missing or invalid API key").into_response();
    }
    next.run(request).await
}

/// Slice `items` to the requested window.
fn window<T: Clone>(items: &[&T], offset: Option<u64>, limit: Option<u64>) -> (u64, Vec<T>) {
    let offset = offset.unwrap_or(0);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let page = items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .map(|item| (*item).clone())
        .collect();
    (offset, page)
}

async fn list_tasks(State(state): State<AppState>, Query(query): Query<TaskQuery>) -> Json<Value> {
    let store = state.db.read().await;
    let matching: Vec<&Task> = store.tasks.iter().filter(|t| query.matches(t)).collect();
    let (offset, tasks) = window(&matching, query.offset, query.limit);
    Json(json!({"offset": offset, "total": matching.len(), "tasks": tasks}))
}

async fn create_task(State(state): State<AppState>, Json(mut task): Json<Task>) -> (StatusCode, Json<Task>) {
    let now = Utc::now().timestamp();
    task.id = Some(Uuid::new_v4().to_string());
    task.creation_ts = Some(now);
    task.last_update_ts = Some(now);
    state.db.write().await.tasks.push(task.clone());
    info!(task_id = ?task.id, app_id = %task.app_id, "task created");
    (StatusCode::CREATED, Json(task))
}

async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Task>, Failure> {
    let store = state.db.read().await;
    store
        .tasks
        .iter()
        .find(|t| t.id.as_deref() == Some(id.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("task", &id))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut task): Json<Task>,
) -> Result<Json<Task>, Failure> {
    let mut store = state.db.write().await;
    let stored = store
        .tasks
        .iter_mut()
        .find(|t| t.id.as_deref() == Some(id.as_str()))
        .ok_or_else(|| not_found("task", &id))?;
    task.id = Some(id);
    task.creation_ts = stored.creation_ts;
    task.last_update_ts = Some(Utc::now().timestamp());
    *stored = task.clone();
    Ok(Json(task))
}

async fn create_transaction(
    State(state): State<AppState>,
    Json(mut transaction): Json<TaskTransaction>,
) -> Result<(StatusCode, Json<TaskTransaction>), Failure> {
    let mut store = state.db.write().await;
    let known = store
        .tasks
        .iter()
        .any(|t| t.id.as_deref() == Some(transaction.task_id.as_str()));
    if !known {
        return Err(bad_request(format!("task [{}] does not exist", transaction.task_id)));
    }
    let now = Utc::now().timestamp();
    transaction.id = Some(Uuid::new_v4().to_string());
    transaction.creation_ts = Some(now);
    transaction.last_update_ts = Some(now);
    store.transactions.push(transaction.clone());
    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn list_transactions(State(state): State<AppState>, Query(query): Query<TransactionQuery>) -> Json<Value> {
    let store = state.db.read().await;
    let app_of = |task_id: &str| {
        store
            .tasks
            .iter()
            .find(|t| t.id.as_deref() == Some(task_id))
            .map(|t| t.app_id.as_str())
    };
    let eq = |filter: &Option<String>, value: Option<&str>| filter.as_deref().map_or(true, |f| Some(f) == value);
    let matching: Vec<&TaskTransaction> = store
        .transactions
        .iter()
        .filter(|tx| {
            eq(&query.app_id, app_of(&tx.task_id))
                && eq(&query.task_id, Some(tx.task_id.as_str()))
                && eq(&query.id, tx.id.as_deref())
                && eq(&query.label, Some(tx.label.as_str()))
                && eq(&query.actioneer_id, tx.actioneer_id.as_deref())
        })
        .collect();
    let (offset, transactions) = window(&matching, query.offset, query.limit);
    Json(json!({"offset": offset, "total": matching.len(), "transactions": transactions}))
}

async fn token_details() -> Json<TokenDetails> {
    Json(TokenDetails {
        profile_id: None,
        app_id: SEEDED_APP_ID.to_string(),
        scopes: vec!["first_name".to_string(), "last_name".to_string(), "email".to_string()],
    })
}

async fn app_details(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<App>, Failure> {
    let store = state.db.read().await;
    store.apps.get(&id).cloned().map(Json).ok_or_else(|| not_found("app", &id))
}

async fn app_users(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Vec<String>>, Failure> {
    let store = state.db.read().await;
    store
        .apps
        .get(&id)
        .map(|app| Json(app.users.clone()))
        .ok_or_else(|| not_found("app", &id))
}

async fn get_profile(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Map<String, Value>>, Failure> {
    let store = state.db.read().await;
    store
        .profiles
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("profile", &id))
}

async fn create_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Map<String, Value>>), Failure> {
    let mut store = state.db.write().await;
    if store.profiles.contains_key(&id) {
        return Err(bad_request(format!("profile [{id}] already exists")));
    }
    let profile = empty_profile(&id, Utc::now().timestamp());
    store.profiles.insert(id.clone(), profile.clone());
    info!(profile_id = %id, "profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Map<String, Value>>, Failure> {
    let Value::Object(update) = body else {
        return Err(bad_request("profile must be an object"));
    };
    let mut store = state.db.write().await;
    let profile = store.profiles.get_mut(&id).ok_or_else(|| not_found("profile", &id))?;
    for (key, value) in update {
        if key != "id" && key != "_creationTs" {
            profile.insert(key, value);
        }
    }
    profile.insert("_lastUpdateTs".to_string(), Value::from(Utc::now().timestamp()));
    Ok(Json(profile.clone()))
}

fn check_section(section: &str) -> Result<(), Failure> {
    if PROFILE_SECTIONS.contains(&section) {
        Ok(())
    } else {
        Err(not_found("profile section", section))
    }
}

async fn get_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(String, String)>,
) -> Result<Json<Value>, Failure> {
    check_section(&section)?;
    let store = state.db.read().await;
    let profile = store.profiles.get(&id).ok_or_else(|| not_found("profile", &id))?;
    Ok(Json(profile.get(&section).cloned().unwrap_or_else(|| json!([]))))
}

async fn update_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Failure> {
    check_section(&section)?;
    if !body.is_array() {
        return Err(bad_request(format!("{section} must be a list")));
    }
    let mut store = state.db.write().await;
    let profile = store.profiles.get_mut(&id).ok_or_else(|| not_found("profile", &id))?;
    profile.insert(section, body.clone());
    Ok(Json(body))
}

async fn log_message(State(state): State<AppState>, Json(message): Json<Value>) -> Result<StatusCode, Failure> {
    let message_type = message.get("type").and_then(Value::as_str).unwrap_or_default();
    if !MESSAGE_TYPES.contains(&message_type) {
        return Err(bad_request(format!("unexpected message type [{message_type}]")));
    }
    if message.get("messageId").and_then(Value::as_str).is_none() {
        return Err(bad_request("missing messageId"));
    }
    state.db.write().await.messages.push(message);
    Ok(StatusCode::CREATED)
}
