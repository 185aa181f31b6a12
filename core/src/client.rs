//! Stateless HTTP request builder and response parser for the task API.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls. Each (resource, operation) pair is split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The I/O in between belongs to a `Transport`, which keeps
//! this layer deterministic and free of network dependencies.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Credentials, NewTodo, Todo, TodoPage, TodoPatch, TodoQuery, User};

/// Header carrying the pre-pagination match count on list responses.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Unreserved characters stay literal in query components and path segments.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Synchronous, stateless client for the task API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- auth ---

    /// Fetches the stored credential record. The backend gives no verdict;
    /// see [`crate::auth::sign_in`] for the comparison.
    pub fn build_get_auth(&self) -> HttpRequest {
        self.get(format!("{}/auth", self.base_url))
    }

    pub fn parse_get_auth(&self, response: HttpResponse) -> Result<Credentials, ApiError> {
        check_success(&response)?;
        decode(&response.body)
    }

    // --- todos ---

    pub fn build_list_todos(&self, query: &TodoQuery) -> HttpRequest {
        let pairs = query.to_pairs();
        let mut path = format!("{}/todo", self.base_url);
        if !pairs.is_empty() {
            let encoded: Vec<String> = pairs
                .iter()
                .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, COMPONENT)))
                .collect();
            path.push('?');
            path.push_str(&encoded.join("&"));
        }
        self.get(path)
    }

    pub fn build_get_todo(&self, id: &str) -> HttpRequest {
        self.get(self.todo_path(id))
    }

    pub fn build_create_todo(&self, input: &NewTodo) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, format!("{}/todo", self.base_url), input)
    }

    pub fn build_update_todo(&self, id: &str, patch: &TodoPatch) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Patch, self.todo_path(id), patch)
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.todo_path(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        Ok(self.parse_list_todos_page(response)?.items)
    }

    /// Like `parse_list_todos`, keeping the `X-Total-Count` header. A missing
    /// or malformed header yields `total: None`.
    pub fn parse_list_todos_page(&self, response: HttpResponse) -> Result<TodoPage, ApiError> {
        check_success(&response)?;
        let total = response
            .header(TOTAL_COUNT_HEADER)
            .and_then(|raw| raw.trim().parse::<usize>().ok());
        Ok(TodoPage {
            items: decode(&response.body)?,
            total,
        })
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_success(&response)?;
        decode(&response.body)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_success(&response)?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_success(&response)?;
        decode(&response.body)
    }

    /// Any 2xx counts; the body (empty or `{}`) is ignored.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    // --- users ---

    pub fn build_list_users(&self) -> HttpRequest {
        self.get(format!("{}/users", self.base_url))
    }

    pub fn build_get_user(&self, id: &str) -> HttpRequest {
        self.get(format!("{}/users/{}", self.base_url, encode_segment(id)))
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        check_success(&response)?;
        decode(&response.body)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        check_success(&response)?;
        decode(&response.body)
    }

    fn todo_path(&self, id: &str) -> String {
        format!("{}/todo/{}", self.base_url, encode_segment(id))
    }

    fn get(&self, path: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, COMPONENT).to_string()
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
