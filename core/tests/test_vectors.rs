//! Verify the interfaces against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, the request the interface must send,
//! a simulated response, and the expected result or error class. Bodies and
//! results are compared as parsed JSON or decoded entities, never as raw
//! strings, so key order does not matter.

use std::cell::RefCell;

use chrono::{TimeZone, Utc};
use serde_json::Value;
use wenet_core::{
    ApiError, CoreUserProfile, HttpMethod, HttpRequest, HttpResponse, Message, Repr, RestClient, ServiceApiConfig,
    ServiceApiInterface, Task, TaskFilter, TaskManagerConfig, TaskManagerInterface,
};

const BASE_URL: &str = "http://localhost:3000";

/// Answers every request with one canned response and keeps the request.
struct Replay {
    response: HttpResponse,
    sent: RefCell<Vec<HttpRequest>>,
}

impl Replay {
    fn new(case: &Value) -> Self {
        let sim = &case["simulated_response"];
        let body = match &sim["body"] {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        Self {
            response: HttpResponse::new(sim["status"].as_u64().unwrap() as u16, body),
            sent: RefCell::new(Vec::new()),
        }
    }

    fn only_request(&self) -> HttpRequest {
        let sent = self.sent.borrow();
        assert_eq!(sent.len(), 1, "exactly one request per call");
        sent[0].clone()
    }
}

impl RestClient for Replay {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.sent.borrow_mut().push(request);
        Ok(self.response.clone())
    }
}

fn task_manager(rest: &Replay) -> TaskManagerInterface<&Replay> {
    let config = TaskManagerConfig::new(BASE_URL).with_header("x-wenet-component-apikey", "key");
    TaskManagerInterface::new(rest, &config)
}

fn service_api(rest: &Replay) -> ServiceApiInterface<&Replay> {
    let config = ServiceApiConfig::new(BASE_URL).with_header("x-wenet-component-apikey", "key");
    ServiceApiInterface::new(rest, &config)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(raw: &Value) -> Vec<(String, String)> {
    raw.as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect()
}

/// Compare the request the interface sent with the vector's expectation.
fn check_request(name: &str, sent: &HttpRequest, expected: &Value) {
    assert_eq!(sent.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(sent.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
    assert_eq!(sent.query, pairs(&expected["query"]), "{name}: query");
    assert_eq!(sent.headers, pairs(&expected["headers"]), "{name}: headers");
    match expected.get("body") {
        Some(body) => assert_eq!(sent.json_body().as_ref(), Some(body), "{name}: body"),
        None => assert!(sent.body.is_none(), "{name}: body should be None"),
    }
}

/// Check an error against the class named by the vector.
fn check_error(name: &str, err: &ApiError, case: &Value) {
    let expected = case["expected_error"].as_str().unwrap();
    let matched = match expected {
        "NotFound" => matches!(err, ApiError::NotFound { .. }),
        "Authentication" => matches!(err, ApiError::Authentication { .. }),
        "Creation" => matches!(err, ApiError::Creation { .. }),
        "UnexpectedResponse" => matches!(err, ApiError::UnexpectedResponse { .. }),
        "Decode" => matches!(err, ApiError::Decode(_)),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: expected {expected}, got {err:?}");

    // Failed responses keep the server's body verbatim.
    if let Some(status) = err.status() {
        assert_eq!(u64::from(status), case["simulated_response"]["status"].as_u64().unwrap(), "{name}: status");
        let body = &case["simulated_response"]["body"];
        if let Some(text) = body.as_str() {
            assert_eq!(err.body(), Some(text), "{name}: body kept verbatim");
        }
    }
}

fn task_filter(raw: &Value) -> TaskFilter {
    let mut filter = TaskFilter::for_app(raw["appId"].as_str().unwrap());
    if let Some(requester) = raw["requesterId"].as_str() {
        filter = filter.requester(requester);
    }
    if let Some(closed) = raw["hasCloseTs"].as_bool() {
        filter = filter.closed(closed);
    }
    if let Some(from) = raw["creationFrom"].as_i64() {
        filter.creation_from = Some(Utc.timestamp_opt(from, 0).unwrap());
    }
    if let Some(order) = raw["order"].as_str() {
        filter = filter.ordered_by(order.parse().unwrap());
    }
    filter
}

// ---------------------------------------------------------------------------
// Get task
// ---------------------------------------------------------------------------

#[test]
fn get_task_test_vectors() {
    let raw = include_str!("../../test-vectors/get_task.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let rest = Replay::new(case);
        let result = task_manager(&rest).get_task(case["input_id"].as_str().unwrap(), None);

        check_request(name, &rest.only_request(), &case["expected_request"]);
        match result {
            Ok(task) => {
                let expected = Task::from_repr(&case["expected_result"]).unwrap();
                assert_eq!(task, expected, "{name}: parsed result");
                assert_eq!(task.to_repr(), case["expected_result"], "{name}: canonical repr");
            }
            Err(err) => check_error(name, &err, case),
        }
    }
}

// ---------------------------------------------------------------------------
// Create task
// ---------------------------------------------------------------------------

#[test]
fn create_task_test_vectors() {
    let raw = include_str!("../../test-vectors/create_task.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = Task::from_repr(&case["input"]).unwrap();
        let rest = Replay::new(case);
        let result = task_manager(&rest).create_task(&input, None);

        check_request(name, &rest.only_request(), &case["expected_request"]);
        match result {
            Ok(()) => assert!(case.get("expected_error").is_none(), "{name}: expected an error"),
            Err(err) => check_error(name, &err, case),
        }
    }
}

// ---------------------------------------------------------------------------
// Task page
// ---------------------------------------------------------------------------

#[test]
fn get_task_page_test_vectors() {
    let raw = include_str!("../../test-vectors/get_task_page.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let filter = task_filter(&input["filter"]);
        let offset = input["offset"].as_u64().unwrap();
        let limit = input["limit"].as_u64().unwrap() as u32;

        let rest = Replay::new(case);
        let result = task_manager(&rest).get_task_page(&filter, offset, limit, None);

        check_request(name, &rest.only_request(), &case["expected_request"]);
        match result {
            Ok(page) => {
                let expected = &case["expected_result"];
                assert_eq!(page.offset, expected["offset"].as_u64().unwrap(), "{name}: offset");
                assert_eq!(page.total, expected["total"].as_u64().unwrap(), "{name}: total");
                let ids: Vec<Value> = page
                    .items
                    .iter()
                    .map(|t| Value::from(t.task_id.clone()))
                    .collect();
                assert_eq!(Value::Array(ids), expected["ids"], "{name}: ids");
            }
            Err(err) => check_error(name, &err, case),
        }
    }
}

// ---------------------------------------------------------------------------
// User profile
// ---------------------------------------------------------------------------

#[test]
fn get_user_profile_test_vectors() {
    let raw = include_str!("../../test-vectors/get_user_profile.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let rest = Replay::new(case);
        let result = service_api(&rest).get_user_profile(case["input_id"].as_str().unwrap(), None);

        check_request(name, &rest.only_request(), &case["expected_request"]);
        match result {
            Ok(profile) => {
                let expected = CoreUserProfile::from_repr(&case["expected_result"]).unwrap();
                assert_eq!(profile, expected, "{name}: parsed result");
            }
            Err(err) => check_error(name, &err, case),
        }
    }
}

// ---------------------------------------------------------------------------
// Log message
// ---------------------------------------------------------------------------

#[test]
fn log_message_test_vectors() {
    let raw = include_str!("../../test-vectors/log_message.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let message = Message::from_repr(&case["input"]).unwrap();
        let rest = Replay::new(case);
        let result = service_api(&rest).log_message(&message, None);

        check_request(name, &rest.only_request(), &case["expected_request"]);
        match result {
            Ok(()) => assert!(case.get("expected_error").is_none(), "{name}: expected an error"),
            Err(err) => check_error(name, &err, case),
        }
    }
}
