//! Domain DTOs for the task API.
//!
//! # Design
//! These types mirror the backend's JSON records but are defined here, not
//! shared with the mock-server crate, which stores schemaless objects.
//! Integration tests catch any drift between the two.
//!
//! Field names follow the backend's camelCase wire format.

use std::fmt;
use std::num::NonZeroU32;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Backend-assigned todo identifier.
pub type TodoId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TodoStatus {
    Todo,
    InProgress,
    Done,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 3] = [TodoStatus::Todo, TodoStatus::InProgress, TodoStatus::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            TodoStatus::Todo => "todo",
            TodoStatus::InProgress => "inProgress",
            TodoStatus::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TodoStatus::Todo => "To Do",
            TodoStatus::InProgress => "In Progress",
            TodoStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TodoPriority {
    High,
    Low,
}

impl TodoPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            TodoPriority::High => "high",
            TodoPriority::Low => "low",
        }
    }
}

impl fmt::Display for TodoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TodoStatus,
    /// Id of the assigned [`User`]; numeric on the wire while user ids are
    /// strings.
    pub assigned_user: u64,
    pub priority: TodoPriority,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Request payload for creating a todo. The backend assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TodoStatus,
    pub assigned_user: u64,
    pub priority: TodoPriority,
    pub tags: Option<Vec<String>>,
}

/// Request payload for a partial update. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TodoPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Option<Vec<String>>>,
}

impl TodoPatch {
    pub fn status(status: TodoStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// The fields of `edited` that differ from `original`.
    pub fn between(original: &NewTodo, edited: &NewTodo) -> Self {
        fn changed<T: PartialEq + Clone>(a: &T, b: &T) -> Option<T> {
            (a != b).then(|| b.clone())
        }
        Self {
            title: changed(&original.title, &edited.title),
            description: changed(&original.description, &edited.description),
            due_date: changed(&original.due_date, &edited.due_date),
            status: changed(&original.status, &edited.status),
            assigned_user: changed(&original.assigned_user, &edited.assigned_user),
            priority: changed(&original.priority, &edited.priority),
            tags: changed(&original.tags, &edited.tags),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&Todo> for NewTodo {
    fn from(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone(),
            due_date: todo.due_date,
            status: todo.status,
            assigned_user: todo.assigned_user,
            priority: todo.priority,
            tags: todo.tags.clone(),
        }
    }
}

/// A user that todos can be assigned to. Read-only from the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Username/password pair, both as submitted and as stored by the backend.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    DueDate,
    Title,
    Status,
    Priority,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::DueDate => "dueDate",
            SortField::Title => "title",
            SortField::Status => "status",
            SortField::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Parameters for one list request. Unset fields, and empty strings, are
/// left out of the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoQuery {
    pub status: Option<TodoStatus>,
    pub assigned_user: Option<String>,
    pub priority: Option<TodoPriority>,
    pub sort_field: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<NonZeroU32>,
    pub page_size: Option<NonZeroU32>,
    pub search_text: Option<String>,
}

impl TodoQuery {
    pub fn status(mut self, status: TodoStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn assigned_user(mut self, user: impl Into<String>) -> Self {
        self.assigned_user = Some(user.into());
        self
    }

    pub fn priority(mut self, priority: TodoPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_field = Some(field);
        self.sort_order = Some(order);
        self
    }

    /// Page numbers start at 1; `0` clears the field.
    pub fn page(mut self, page: u32) -> Self {
        self.page = NonZeroU32::new(page);
        self
    }

    /// `0` clears the field.
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = NonZeroU32::new(size);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// `other`'s set fields win over `self`'s.
    pub fn merged(&self, other: &TodoQuery) -> TodoQuery {
        TodoQuery {
            status: other.status.or(self.status),
            assigned_user: other
                .assigned_user
                .clone()
                .or_else(|| self.assigned_user.clone()),
            priority: other.priority.or(self.priority),
            sort_field: other.sort_field.or(self.sort_field),
            sort_order: other.sort_order.or(self.sort_order),
            page: other.page.or(self.page),
            page_size: other.page_size.or(self.page_size),
            search_text: other.search_text.clone().or_else(|| self.search_text.clone()),
        }
    }

    /// Wire-level `(key, value)` pairs in a fixed order, skipping unset and
    /// empty values.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let candidates: [(&'static str, Option<String>); 8] = [
            ("status", self.status.map(|s| s.as_str().to_string())),
            ("assignedUser", self.assigned_user.clone()),
            ("priority", self.priority.map(|p| p.as_str().to_string())),
            ("_sort", self.sort_field.map(|f| f.as_str().to_string())),
            ("_order", self.sort_order.map(|o| o.as_str().to_string())),
            ("_page", self.page.map(|p| p.to_string())),
            ("_limit", self.page_size.map(|p| p.to_string())),
            ("q", self.search_text.clone()),
        ];
        candidates
            .into_iter()
            .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
            .collect()
    }
}

/// One page of list results plus the backend's match count, when reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoPage {
    pub items: Vec<Todo>,
    pub total: Option<usize>,
}
