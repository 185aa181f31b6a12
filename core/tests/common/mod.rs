//! Shared fixtures: a scripted in-memory transport and a live mock server.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use taskflow_core::{
    ApiClient, ApiError, HttpRequest, HttpResponse, RecordingNotifier, ResourceClient, Transport,
    UreqTransport,
};

pub const BASE_URL: &str = "http://backend.test";

struct Reply {
    result: Result<HttpResponse, ApiError>,
    delay: Duration,
}

/// Answers requests from per-resource queues (`todo`, `users`, `auth`) in
/// FIFO order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, resource: &str, response: HttpResponse) -> &Self {
        self.enqueue(resource, Ok(response), Duration::ZERO)
    }

    pub fn reply_after(&self, resource: &str, response: HttpResponse, delay: Duration) -> &Self {
        self.enqueue(resource, Ok(response), delay)
    }

    pub fn fail(&self, resource: &str, error: ApiError) -> &Self {
        self.enqueue(resource, Err(error), Duration::ZERO)
    }

    fn enqueue(
        &self,
        resource: &str,
        result: Result<HttpResponse, ApiError>,
        delay: Duration,
    ) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(resource.to_string())
            .or_default()
            .push_back(Reply { result, delay });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, resource: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| resource_of(&r.path) == resource)
            .collect()
    }

    pub fn last_path(&self, resource: &str) -> String {
        self.requests_to(resource)
            .last()
            .map(|r| r.path.clone())
            .unwrap_or_default()
    }
}

fn resource_of(path: &str) -> &str {
    let rest = path.strip_prefix(BASE_URL).unwrap_or(path);
    rest.trim_start_matches('/')
        .split(['/', '?'])
        .next()
        .unwrap_or_default()
}

impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let resource = resource_of(&request.path).to_string();
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&resource)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(reply) => {
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                reply.result
            }
            None => Err(ApiError::Transport(format!("no scripted reply for {resource}"))),
        }
    }
}

pub fn scripted() -> Arc<ResourceClient<ScriptedTransport>> {
    Arc::new(ResourceClient::new(
        ApiClient::new(BASE_URL),
        ScriptedTransport::new(),
    ))
}

pub fn recorder() -> Arc<RecordingNotifier> {
    Arc::new(RecordingNotifier::new())
}

pub fn todo_json(id: &str, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "dueDate": "2024-05-01",
        "status": status,
        "assignedUser": 1,
        "priority": "low",
        "tags": null
    })
}

pub fn list(todos: &[Value]) -> HttpResponse {
    HttpResponse::new(200, Value::Array(todos.to_vec()).to_string())
}

pub fn list_with_total(todos: &[Value], total: usize) -> HttpResponse {
    list(todos).with_header("X-Total-Count", total.to_string())
}

pub fn users() -> HttpResponse {
    HttpResponse::new(
        200,
        json!([
            { "id": "1", "name": "Ada Lovelace", "email": "ada@example.com" },
            { "id": "2", "name": "Grace Hopper", "email": "grace@example.com" }
        ])
        .to_string(),
    )
}

/// Starts the mock server with `seed` on a random port and returns a client
/// bound to it.
pub async fn live(seed: mock_server::Seed) -> ResourceClient<UreqTransport> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with(listener, seed));
    ResourceClient::over_http(&format!("http://{addr}"))
}

/// Demo seed plus `done` todos `d1..=d{done}` due on consecutive days and
/// two open ones.
pub fn seed_with_done(done: usize) -> mock_server::Seed {
    let mut seed = mock_server::Seed::demo();
    for i in 1..=done {
        let mut todo = todo_json(&format!("d{i}"), &format!("Done task {i:02}"), "done");
        todo["dueDate"] = json!(format!("2024-01-{i:02}"));
        seed.todo.push(todo.as_object().unwrap().clone());
    }
    for (id, title) in [("o1", "Buy groceries"), ("o2", "Call plumber")] {
        let mut todo = todo_json(id, title, "todo");
        todo["assignedUser"] = json!(2);
        seed.todo.push(todo.as_object().unwrap().clone());
    }
    seed
}
