use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, App, Task, TokenDetails, API_KEY_HEADER, DEFAULT_API_KEY};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(API_KEY_HEADER, DEFAULT_API_KEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(API_KEY_HEADER, DEFAULT_API_KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn new_task(requester: &str) -> Value {
    json!({
        "taskTypeId": "ask4help",
        "requesterId": requester,
        "appId": "app-1",
        "goal": {"name": "Need a ride", "description": ""},
        "norms": [],
        "attributes": {},
    })
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/service/token").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"missing or invalid API key");
}

#[tokio::test]
async fn wrong_api_key_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/task_manager/tasks?appId=app-1")
                .header(API_KEY_HEADER, "wrong")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- service api ---

#[tokio::test]
async fn token_reports_seeded_app() {
    let resp = app().oneshot(get_request("/service/token")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let token: TokenDetails = body_json(resp).await;
    assert_eq!(token.app_id, "app-1");
    assert!(token.scopes.contains(&"email".to_string()));
}

#[tokio::test]
async fn app_details_and_users() {
    let resp = app().oneshot(get_request("/service/app/app-1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let details: App = body_json(resp).await;
    assert_eq!(details.name.as_deref(), Some("Ask for help"));

    let resp = app().oneshot(get_request("/service/app/app-1/users")).await.unwrap();
    let users: Vec<String> = body_json(resp).await;
    assert_eq!(users, vec!["user-1", "user-2"]);

    let resp = app().oneshot(get_request("/api/service/app/unknown")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_profile_returns_404() {
    let resp = app().oneshot(get_request("/service/user/profile/ghost")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app()
        .oneshot(json_request("PUT", "/service/user/profile/ghost", &json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn log_message_validates_type() {
    let message = json!({"type": "REQUEST", "messageId": "m-1", "channel": "Telegram"});
    let resp = app()
        .oneshot(json_request("POST", "/service/log/messages", &message))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let message = json!({"type": "BROADCAST", "messageId": "m-1"});
    let resp = app()
        .oneshot(json_request("POST", "/service/log/messages", &message))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transaction_for_unknown_task_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/task_manager/tasks/transactions",
            &json!({"taskId": "nope", "label": "accept"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_task_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/task_manager/tasks", &json!({"goal": {"name": "x"}})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- full lifecycle over one shared state ---

#[tokio::test]
async fn task_and_profile_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create two tasks, one through each component
    for (uri, requester) in [("/task_manager/tasks", "user-1"), ("/service/task", "user-2")] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", uri, &new_task(requester)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // filtered listing
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/service/tasks?appId=app-1&requesterId=user-1&hasCloseTs=false"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = body_json(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["offset"], 0);
    let task: Task = serde_json::from_value(page["tasks"][0].clone()).unwrap();
    assert_eq!(task.requester_id, "user-1");
    let id = task.id.clone().unwrap();

    // window past the end keeps the total
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/task_manager/tasks?appId=app-1&offset=5&limit=10"))
        .await
        .unwrap();
    let page: Value = body_json(resp).await;
    assert_eq!(page["total"], 2);
    assert_eq!(page["tasks"], json!([]));

    // close the task
    let mut closed = task.clone();
    closed.close_ts = Some(1_700_000_000);
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/task_manager/tasks/{id}"),
            &serde_json::to_value(&closed).unwrap(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/service/task/{id}")))
        .await
        .unwrap();
    let fetched: Task = body_json(resp).await;
    assert_eq!(fetched.close_ts, Some(1_700_000_000));
    assert_eq!(fetched.creation_ts, task.creation_ts);

    // transaction on the task, then list it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/service/task/transaction",
            &json!({"taskId": id, "label": "accept", "actioneerId": "user-2"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/task_manager/taskTransactions?appId=app-1&taskId={id}")))
        .await
        .unwrap();
    let page: Value = body_json(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["transactions"][0]["label"], "accept");

    // profile: create, update, sections
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/service/user/profile/user-1", &json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            "/service/user/profile/user-1",
            &json!({"id": "someone-else", "locale": "it_IT"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Value = body_json(resp).await;
    assert_eq!(profile["id"], "user-1");
    assert_eq!(profile["locale"], "it_IT");
    assert_eq!(profile["competences"], json!([]));

    let competences = json!([{"name": "cooking", "level": 0.8}]);
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", "/service/user/profile/user-1/competences", &competences))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/service/user/profile/user-1/competences"))
        .await
        .unwrap();
    let stored: Value = body_json(resp).await;
    assert_eq!(stored, competences);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/service/user/profile/user-1/norms"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
