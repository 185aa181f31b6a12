//! In-memory stand-in for the generic REST resource backend.
//!
//! Mirrors the json-server conventions the task client is written against:
//! records are schemaless JSON objects, any non-underscore query key filters
//! by equality, `q` is a case-insensitive full-text match, `_sort`/`_order`
//! sort, and `_page`/`_limit` paginate with the pre-pagination match count
//! reported in `X-Total-Count`.

use std::{cmp::Ordering, collections::HashMap, path::Path, sync::Arc};

use axum::{
    extract::{Path as UrlPath, Query, State},
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// json-server's page size when `_page` is given without `_limit`.
const DEFAULT_LIMIT: usize = 10;

pub type Record = Map<String, Value>;

/// Initial contents of the store, shaped like a json-server `db.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub auth: Value,
    #[serde(default)]
    pub todo: Vec<Record>,
    #[serde(default)]
    pub users: Vec<Record>,
}

impl Seed {
    /// The demo data set: `admin` / `123` and three users.
    pub fn demo() -> Self {
        let users = [
            ("1", "Ada Lovelace", "ada@example.com"),
            ("2", "Grace Hopper", "grace@example.com"),
            ("3", "Alan Turing", "alan@example.com"),
        ]
        .into_iter()
        .map(|(id, name, email)| object(json!({ "id": id, "name": name, "email": email })))
        .collect();

        Self {
            auth: json!({ "username": "admin", "password": "123" }),
            todo: Vec::new(),
            users,
        }
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(std::io::Error::other)
    }
}

fn object(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

#[derive(Debug, Default)]
pub struct Store {
    auth: Value,
    todo: Vec<Record>,
    users: Vec<Record>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Seed::demo())
}

pub fn app_with(seed: Seed) -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        auth: seed.auth,
        todo: seed.todo,
        users: seed.users,
    }));
    Router::new()
        .route("/auth", get(get_auth))
        .route("/todo", get(list_todos).post(create_todo))
        .route(
            "/todo/{id}",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Seed::demo()).await
}

pub async fn run_with(listener: TcpListener, seed: Seed) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(seed)).await
}

async fn get_auth(State(db): State<Db>) -> Json<Value> {
    Json(db.read().await.auth.clone())
}

async fn list_todos(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, StatusCode> {
    let store = db.read().await;
    list(&store.todo, &params)
}

async fn list_users(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, StatusCode> {
    let store = db.read().await;
    list(&store.users, &params)
}

async fn get_todo(
    State(db): State<Db>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Record>, StatusCode> {
    let store = db.read().await;
    find(&store.todo, &id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn get_user(
    State(db): State<Db>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Record>, StatusCode> {
    let store = db.read().await;
    find(&store.users, &id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Ids are always assigned here; any id in the body is discarded.
async fn create_todo(
    State(db): State<Db>,
    Json(mut input): Json<Record>,
) -> (StatusCode, Json<Record>) {
    input.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    db.write().await.todo.push(input.clone());
    tracing::debug!(id = %input["id"], "created todo");
    (StatusCode::CREATED, Json(input))
}

async fn update_todo(
    State(db): State<Db>,
    UrlPath(id): UrlPath<String>,
    Json(patch): Json<Record>,
) -> Result<Json<Record>, StatusCode> {
    let mut store = db.write().await;
    let record = store
        .todo
        .iter_mut()
        .find(|r| id_matches(r, &id))
        .ok_or(StatusCode::NOT_FOUND)?;
    for (key, value) in patch {
        if key != "id" {
            record.insert(key, value);
        }
    }
    Ok(Json(record.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    UrlPath(id): UrlPath<String>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let index = store
        .todo
        .iter()
        .position(|r| id_matches(r, &id))
        .ok_or(StatusCode::NOT_FOUND)?;
    store.todo.remove(index);
    Ok(StatusCode::NO_CONTENT)
}

fn find<'a>(records: &'a [Record], id: &str) -> Option<&'a Record> {
    records.iter().find(|r| id_matches(r, id))
}

fn id_matches(record: &Record, id: &str) -> bool {
    record.get("id").map(scalar_text).as_deref() == Some(id)
}

/// Text form of a scalar used for filter comparison, so `assignedUser=2`
/// matches both `2` and `"2"`.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn list(records: &[Record], params: &HashMap<String, String>) -> Result<Response, StatusCode> {
    let needle = params.get("q").map(|q| q.to_lowercase());
    let mut matched: Vec<&Record> = records
        .iter()
        .filter(|r| {
            params
                .iter()
                .filter(|(key, _)| !key.starts_with('_') && key.as_str() != "q")
                .all(|(key, want)| r.get(key).map(scalar_text).as_deref() == Some(want.as_str()))
        })
        .filter(|r| needle.as_deref().is_none_or(|n| full_text_match(r, n)))
        .collect();

    if let Some(field) = params.get("_sort") {
        matched.sort_by(|a, b| compare_values(a.get(field), b.get(field)));
        if params.get("_order").map(String::as_str) == Some("desc") {
            matched.reverse();
        }
    }

    let total = matched.len();
    let page = parse_positive(params.get("_page"))?;
    let limit = parse_positive(params.get("_limit"))?;
    let window: Vec<Record> = match (page, limit) {
        (None, None) => matched.into_iter().cloned().collect(),
        (page, limit) => {
            let limit = limit.unwrap_or(DEFAULT_LIMIT);
            let start = page.map_or(0, |p| (p - 1).saturating_mul(limit));
            matched.into_iter().skip(start).take(limit).cloned().collect()
        }
    };

    let mut response = Json(window).into_response();
    response.headers_mut().insert(
        HeaderName::from_static(TOTAL_COUNT_HEADER),
        HeaderValue::from(total),
    );
    response.headers_mut().insert(
        HeaderName::from_static("access-control-expose-headers"),
        HeaderValue::from_static("X-Total-Count"),
    );
    Ok(response)
}

fn parse_positive(raw: Option<&String>) -> Result<Option<usize>, StatusCode> {
    match raw {
        None => Ok(None),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(StatusCode::BAD_REQUEST),
        },
    }
}

fn full_text_match(record: &Record, needle: &str) -> bool {
    record.values().any(|value| value_contains(value, needle))
}

fn value_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|v| value_contains(v, needle)),
        Value::Number(n) => n.to_string().contains(needle),
        _ => false,
    }
}

/// Missing fields sort first; numbers compare numerically, everything else
/// by text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => scalar_text(x).cmp(&scalar_text(y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> Record {
        object(value)
    }

    #[test]
    fn numeric_and_string_ids_both_match() {
        assert!(id_matches(&record(json!({ "id": 7 })), "7"));
        assert!(id_matches(&record(json!({ "id": "7" })), "7"));
        assert!(!id_matches(&record(json!({ "title": "no id" })), "7"));
    }

    #[test]
    fn full_text_searches_nested_tags() {
        let r = record(json!({ "title": "Write report", "tags": ["Finance", "q3"] }));
        assert!(full_text_match(&r, "finance"));
        assert!(full_text_match(&r, "report"));
        assert!(!full_text_match(&r, "groceries"));
    }

    #[test]
    fn numbers_sort_numerically() {
        let two = json!(2);
        let ten = json!(10);
        assert_eq!(compare_values(Some(&two), Some(&ten)), Ordering::Less);
    }

    #[test]
    fn missing_sort_field_sorts_first() {
        let v = json!("a");
        assert_eq!(compare_values(None, Some(&v)), Ordering::Less);
    }

    #[test]
    fn zero_page_is_rejected() {
        assert_eq!(parse_positive(Some(&"0".to_string())), Err(StatusCode::BAD_REQUEST));
        assert_eq!(parse_positive(Some(&"x".to_string())), Err(StatusCode::BAD_REQUEST));
        assert_eq!(parse_positive(Some(&"3".to_string())), Ok(Some(3)));
    }

    #[test]
    fn demo_seed_has_admin_credentials() {
        let seed = Seed::demo();
        assert_eq!(seed.auth["username"], "admin");
        assert_eq!(seed.auth["password"], "123");
        assert_eq!(seed.users.len(), 3);
    }

    #[test]
    fn seed_parses_db_json_shape() {
        let seed: Seed = serde_json::from_str(
            r#"{"auth":{"username":"u","password":"p"},"todo":[{"id":"1","title":"t"}]}"#,
        )
        .unwrap();
        assert_eq!(seed.todo.len(), 1);
        assert!(seed.users.is_empty());
    }
}
