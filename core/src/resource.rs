//! Async resource functions: one per (resource, operation) pair.
//!
//! Each call is exactly one `build_*` → `Transport::execute` → `parse_*`
//! round-trip. Failures surface unchanged as [`ApiError`].

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Credentials, NewTodo, Todo, TodoPage, TodoPatch, TodoQuery, User};

#[derive(Debug, Clone)]
pub struct ResourceClient<T> {
    api: ApiClient,
    transport: T,
}

impl ResourceClient<UreqTransport> {
    pub fn over_http(base_url: &str) -> Self {
        Self::new(ApiClient::new(base_url), UreqTransport::new())
    }
}

impl<T: Transport> ResourceClient<T> {
    pub fn new(api: ApiClient, transport: T) -> Self {
        Self { api, transport }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the backend's stored credential record, not a verdict.
    pub async fn login(&self) -> Result<Credentials, ApiError> {
        let response = self.transport.execute(self.api.build_get_auth()).await?;
        self.api.parse_get_auth(response)
    }

    pub async fn list_todos(&self, query: &TodoQuery) -> Result<Vec<Todo>, ApiError> {
        Ok(self.list_todos_page(query).await?.items)
    }

    pub async fn list_todos_page(&self, query: &TodoQuery) -> Result<TodoPage, ApiError> {
        let response = self.transport.execute(self.api.build_list_todos(query)).await?;
        self.api.parse_list_todos_page(response)
    }

    pub async fn get_todo(&self, id: &str) -> Result<Todo, ApiError> {
        let response = self.transport.execute(self.api.build_get_todo(id)).await?;
        self.api.parse_get_todo(response)
    }

    pub async fn create_todo(&self, input: &NewTodo) -> Result<Todo, ApiError> {
        let request = self.api.build_create_todo(input)?;
        let response = self.transport.execute(request).await?;
        self.api.parse_create_todo(response)
    }

    pub async fn update_todo(&self, id: &str, patch: &TodoPatch) -> Result<Todo, ApiError> {
        let request = self.api.build_update_todo(id, patch)?;
        let response = self.transport.execute(request).await?;
        self.api.parse_update_todo(response)
    }

    pub async fn delete_todo(&self, id: &str) -> Result<(), ApiError> {
        let response = self.transport.execute(self.api.build_delete_todo(id)).await?;
        self.api.parse_delete_todo(response)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response = self.transport.execute(self.api.build_list_users()).await?;
        self.api.parse_list_users(response)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        let response = self.transport.execute(self.api.build_get_user(id)).await?;
        self.api.parse_get_user(response)
    }
}
