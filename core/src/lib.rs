//! Client core for the task-management service.
//!
//! # Overview
//! Typed access to the `todo`, `users` and `auth` resources of a generic
//! REST backend, plus the client-side state that sits on top: todo and user
//! collections, the session store, the filtered list view and the task form.
//!
//! # Design
//! - `ApiClient` is stateless: `build_*` produces an `HttpRequest`, `parse_*`
//!   consumes an `HttpResponse`, and a `Transport` does the I/O between them.
//! - `ResourceClient` glues the two together, one async fn per operation,
//!   single attempt, no retries.
//! - Collections own their state behind short-lived locks that are never held
//!   across an await, so fetches, deletes and updates may overlap freely.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod list_view;
pub mod notify;
pub mod resource;
pub mod session;
pub mod todos;
pub mod transport;
pub mod types;
pub mod users;

pub use auth::{sign_in, LoginError, LoginOutcome};
pub use client::ApiClient;
pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use form::{Field, Step, SubmitError, TaskForm, ValidationErrors};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use list_view::{derive_query, FilterState, TaskListView, ViewOptions};
pub use notify::{Level, Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use resource::ResourceClient;
pub use session::{FileStorage, MemoryStorage, Session, SessionError, SessionStorage, SessionStore};
pub use todos::TodoCollection;
pub use transport::{Transport, UreqTransport};
pub use types::{
    Credentials, NewTodo, SortField, SortOrder, Todo, TodoId, TodoPage, TodoPatch, TodoPriority,
    TodoQuery, TodoStatus, User,
};
pub use users::UserCollection;
