//! Client-side todo collection: local state plus fetch/remove/update
//! orchestration against the resource client.
//!
//! # Design
//! - Local state is one normalized store (ordered ids + by-id map). A fetch
//!   replaces it wholesale; an update patches a single entry in place.
//! - Every fetch takes a ticket from a monotonic counter. A response is
//!   applied only if no newer fetch was issued in the meantime, so the
//!   latest request wins regardless of resolution order.
//! - Fetch, delete and update each have their own in-flight counter, raised
//!   by an RAII guard, so overlapping calls never block one another and a
//!   flag clears on every exit path.
//! - Failures never propagate out of `fetch`/`remove`: they become an error
//!   string in state plus a notification. `update` additionally returns the
//!   error to the caller.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::ApiError;
use crate::notify::Notifier;
use crate::resource::ResourceClient;
use crate::transport::Transport;
use crate::types::{NewTodo, Todo, TodoId, TodoPage, TodoPatch, TodoQuery};

pub const FETCH_FAILED: &str = "Failed to fetch todos";
pub const DELETE_FAILED: &str = "Failed to delete todo";
pub const DELETED: &str = "Todo deleted successfully";
pub const UPDATE_FAILED: &str = "Failed to update todo";
pub const UPDATED: &str = "Todo updated successfully";
pub const CREATE_FAILED: &str = "Failed to add todo";
pub const CREATED: &str = "Todo added successfully";

#[derive(Debug, Default)]
struct TodoState {
    order: Vec<TodoId>,
    by_id: HashMap<TodoId, Todo>,
    total: Option<usize>,
    error: Option<String>,
    last_query: TodoQuery,
    fetching: usize,
    deleting: usize,
    updating: usize,
}

impl TodoState {
    fn replace(&mut self, page: &TodoPage) {
        self.order.clear();
        self.by_id.clear();
        for todo in &page.items {
            if self.by_id.insert(todo.id.clone(), todo.clone()).is_none() {
                self.order.push(todo.id.clone());
            }
        }
        self.total = page.total;
    }

    fn ordered(&self) -> Vec<Todo> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Fetch,
    Delete,
    Update,
}

impl TodoState {
    fn counter(&mut self, op: Op) -> &mut usize {
        match op {
            Op::Fetch => &mut self.fetching,
            Op::Delete => &mut self.deleting,
            Op::Update => &mut self.updating,
        }
    }
}

/// Lowers the in-flight counter for `op` when dropped.
struct InFlight<'a> {
    state: &'a Mutex<TodoState>,
    op: Op,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        let counter = state.counter(self.op);
        *counter = counter.saturating_sub(1);
    }
}

fn lock(state: &Mutex<TodoState>) -> MutexGuard<'_, TodoState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct TodoCollection<T> {
    client: Arc<ResourceClient<T>>,
    notifier: Arc<dyn Notifier>,
    params: TodoQuery,
    state: Mutex<TodoState>,
    fetch_ticket: AtomicU64,
}

impl<T: Transport> TodoCollection<T> {
    /// Creates the collection and performs its initial fetch with `params`.
    pub async fn mount(
        client: Arc<ResourceClient<T>>,
        params: TodoQuery,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let collection = Self {
            client,
            notifier,
            state: Mutex::new(TodoState {
                last_query: params.clone(),
                ..TodoState::default()
            }),
            params,
            fetch_ticket: AtomicU64::new(0),
        };
        collection.fetch(None).await;
        collection
    }

    /// Lists todos with the base params, `overrides` winning field by field,
    /// and replaces local state with the result. Returns the fetched items,
    /// or an empty list on failure.
    pub async fn fetch(&self, overrides: Option<&TodoQuery>) -> Vec<Todo> {
        let query = match overrides {
            Some(overrides) => self.params.merged(overrides),
            None => self.params.clone(),
        };
        self.run_fetch(query).await
    }

    /// Re-issues the most recent query.
    pub async fn refresh(&self) -> Vec<Todo> {
        let query = lock(&self.state).last_query.clone();
        self.run_fetch(query).await
    }

    async fn run_fetch(&self, query: TodoQuery) -> Vec<Todo> {
        let ticket = self.fetch_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = self.begin(Op::Fetch);
        {
            let mut state = lock(&self.state);
            state.error = None;
            state.last_query = query.clone();
        }

        let result = self.client.list_todos_page(&query).await;

        let mut state = lock(&self.state);
        let current = self.fetch_ticket.load(Ordering::SeqCst) == ticket;
        match result {
            Ok(page) => {
                if current {
                    state.replace(&page);
                } else {
                    tracing::debug!(ticket, "discarding superseded todo list response");
                }
                page.items
            }
            Err(e) => {
                tracing::warn!(ticket, "todo fetch failed: {e}");
                if current {
                    state.error = Some(FETCH_FAILED.to_string());
                    drop(state);
                    self.notifier.error(FETCH_FAILED);
                }
                Vec::new()
            }
        }
    }

    /// Deletes `id` remotely, then refetches the current query. Returns
    /// whether the delete succeeded.
    pub async fn remove(&self, id: &str) -> bool {
        let _in_flight = self.begin(Op::Delete);
        match self.client.delete_todo(id).await {
            Ok(()) => {
                tracing::info!(id, "deleted todo");
                self.notifier.success(DELETED);
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::warn!(id, "delete failed: {e}");
                self.fail(DELETE_FAILED);
                false
            }
        }
    }

    /// Applies `patch` remotely and swaps the returned record into local
    /// state. Items not currently loaded are left out.
    pub async fn update(&self, id: &str, patch: &TodoPatch) -> Result<Todo, ApiError> {
        let _in_flight = self.begin(Op::Update);
        match self.client.update_todo(id, patch).await {
            Ok(todo) => {
                {
                    let mut state = lock(&self.state);
                    if let Some(slot) = state.by_id.get_mut(&todo.id) {
                        *slot = todo.clone();
                    }
                }
                self.notifier.success(UPDATED);
                Ok(todo)
            }
            Err(e) => {
                tracing::warn!(id, "update failed: {e}");
                self.fail(UPDATE_FAILED);
                Err(e)
            }
        }
    }

    /// Creates a todo, then refetches the current query.
    pub async fn create(&self, input: &NewTodo) -> Result<Todo, ApiError> {
        match self.client.create_todo(input).await {
            Ok(todo) => {
                tracing::info!(id = %todo.id, "created todo");
                self.notifier.success(CREATED);
                self.refresh().await;
                Ok(todo)
            }
            Err(e) => {
                tracing::warn!("create failed: {e}");
                self.fail(CREATE_FAILED);
                Err(e)
            }
        }
    }

    pub fn todos(&self) -> Vec<Todo> {
        lock(&self.state).ordered()
    }

    pub fn get(&self, id: &str) -> Option<Todo> {
        lock(&self.state).by_id.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Backend-reported match count for the last applied fetch.
    pub fn total_count(&self) -> Option<usize> {
        lock(&self.state).total
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).fetching > 0
    }

    pub fn is_deleting(&self) -> bool {
        lock(&self.state).deleting > 0
    }

    pub fn is_updating(&self) -> bool {
        lock(&self.state).updating > 0
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    pub fn last_query(&self) -> TodoQuery {
        lock(&self.state).last_query.clone()
    }

    /// Distinct tags across the loaded todos, sorted.
    pub fn available_tags(&self) -> Vec<String> {
        let state = lock(&self.state);
        state
            .by_id
            .values()
            .filter_map(|todo| todo.tags.as_ref())
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn begin(&self, op: Op) -> InFlight<'_> {
        *lock(&self.state).counter(op) += 1;
        InFlight {
            state: &self.state,
            op,
        }
    }

    fn fail(&self, message: &str) {
        lock(&self.state).error = Some(message.to_string());
        self.notifier.error(message);
    }
}
