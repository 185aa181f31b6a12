//! Task list view model: filters, sort, pagination and debounced search
//! driving a [`TodoCollection`].
//!
//! Query derivation is a pure function of [`FilterState`]; the view only
//! decides when to re-run it. Any filter change resets the page to 1.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::notify::Notifier;
use crate::resource::ResourceClient;
use crate::todos::TodoCollection;
use crate::transport::Transport;
use crate::types::{SortField, SortOrder, Todo, TodoQuery, TodoStatus};
use crate::users::UserCollection;

pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Everything the list query depends on. `search_text` is the settled
/// (debounced) text, not the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub search_text: String,
    pub status: Option<TodoStatus>,
    pub user: Option<String>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            status: None,
            user: None,
            sort_field: SortField::DueDate,
            sort_order: SortOrder::Asc,
            page: 1,
        }
    }
}

pub fn derive_query(filters: &FilterState, page_size: u32) -> TodoQuery {
    TodoQuery {
        status: filters.status,
        assigned_user: filters.user.clone().filter(|u| !u.is_empty()),
        priority: None,
        sort_field: Some(filters.sort_field),
        sort_order: Some(filters.sort_order),
        page: NonZeroU32::new(filters.page.max(1)),
        page_size: NonZeroU32::new(page_size),
        search_text: Some(filters.search_text.trim().to_string()).filter(|s| !s.is_empty()),
    }
}

/// `ceil(result_count / page_size)`.
pub fn total_pages(result_count: usize, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = result_count.div_ceil(page_size as usize);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Trailing-edge debounce: of the calls to `settle` that overlap within
/// `delay`, only the last one resolves to `true`.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn settle(&self) -> bool {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        self.generation.load(Ordering::SeqCst) == mine
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub page_size: u32,
    pub search_debounce: Duration,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_DEBOUNCE,
        }
    }
}

pub struct TaskListView<T> {
    todos: TodoCollection<T>,
    users: UserCollection<T>,
    filters: Mutex<FilterState>,
    page_size: u32,
    debouncer: Debouncer,
}

impl<T: Transport> TaskListView<T> {
    /// Loads the first page with default filters and the user list.
    pub async fn mount(
        client: Arc<ResourceClient<T>>,
        notifier: Arc<dyn Notifier>,
        options: ViewOptions,
    ) -> Self {
        let filters = FilterState::default();
        let query = derive_query(&filters, options.page_size);
        let (todos, users) = tokio::join!(
            TodoCollection::mount(Arc::clone(&client), query, Arc::clone(&notifier)),
            UserCollection::mount(client, notifier),
        );
        Self {
            todos,
            users,
            filters: Mutex::new(filters),
            page_size: options.page_size,
            debouncer: Debouncer::new(options.search_debounce),
        }
    }

    pub fn todos(&self) -> &TodoCollection<T> {
        &self.todos
    }

    pub fn users(&self) -> &UserCollection<T> {
        &self.users
    }

    pub fn filters(&self) -> FilterState {
        self.lock().clone()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn query(&self) -> TodoQuery {
        derive_query(&self.lock(), self.page_size)
    }

    /// Feeds one search-box edit. Returns `true` if this edit outlived the
    /// debounce window and caused a fetch.
    pub async fn search_input(&self, text: &str) -> bool {
        if !self.debouncer.settle().await {
            return false;
        }
        let text = text.trim();
        let changed = {
            let mut filters = self.lock();
            let changed = filters.search_text.trim() != text || filters.page != 1;
            filters.search_text = text.to_string();
            filters.page = 1;
            changed
        };
        if changed {
            self.reload().await;
        }
        changed
    }

    pub async fn set_status(&self, status: Option<TodoStatus>) -> Vec<Todo> {
        self.change(|f| f.status = status).await
    }

    /// `None` or an empty id shows every user's todos.
    pub async fn set_user(&self, user: Option<String>) -> Vec<Todo> {
        self.change(|f| f.user = user.filter(|u| !u.is_empty())).await
    }

    pub async fn set_sort(&self, field: SortField, order: SortOrder) -> Vec<Todo> {
        self.change(|f| {
            f.sort_field = field;
            f.sort_order = order;
        })
        .await
    }

    /// Moves to `page`, clamped to `1..=total_pages`.
    pub async fn go_to_page(&self, page: u32) -> Vec<Todo> {
        let last = self.total_pages().max(1);
        self.lock().page = page.clamp(1, last);
        self.reload().await
    }

    pub async fn next_page(&self) -> Vec<Todo> {
        let page = self.lock().page.saturating_add(1);
        self.go_to_page(page).await
    }

    pub async fn previous_page(&self) -> Vec<Todo> {
        let page = self.lock().page.saturating_sub(1);
        self.go_to_page(page).await
    }

    /// Page count from the backend's total when it reports one, otherwise
    /// from the size of the current page.
    pub fn total_pages(&self) -> u32 {
        let count = self.todos.total_count().unwrap_or_else(|| self.todos.len());
        total_pages(count, self.page_size)
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.todos.remove(id).await
    }

    async fn change(&self, apply: impl FnOnce(&mut FilterState)) -> Vec<Todo> {
        {
            let mut filters = self.lock();
            apply(&mut filters);
            filters.page = 1;
        }
        self.reload().await
    }

    async fn reload(&self) -> Vec<Todo> {
        let query = self.query();
        self.todos.fetch(Some(&query)).await
    }

    fn lock(&self) -> MutexGuard<'_, FilterState> {
        self.filters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
