//! Client-side user list, loaded once on mount.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::notify::Notifier;
use crate::resource::ResourceClient;
use crate::transport::Transport;
use crate::types::User;

pub const FETCH_FAILED: &str = "Failed to fetch users";

#[derive(Debug, Default)]
struct UserState {
    users: Vec<User>,
    error: Option<String>,
    loading: usize,
}

pub struct UserCollection<T> {
    client: Arc<ResourceClient<T>>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<UserState>,
}

impl<T: Transport> UserCollection<T> {
    pub async fn mount(client: Arc<ResourceClient<T>>, notifier: Arc<dyn Notifier>) -> Self {
        let collection = Self {
            client,
            notifier,
            state: Mutex::new(UserState::default()),
        };
        collection.fetch().await;
        collection
    }

    /// Reloads the full user list. On failure the previous list is kept and
    /// an empty list is returned.
    pub async fn fetch(&self) -> Vec<User> {
        let _loading = self.begin();
        let result = self.client.list_users().await;

        match result {
            Ok(users) => {
                self.lock().users = users.clone();
                users
            }
            Err(e) => {
                tracing::warn!("user fetch failed: {e}");
                self.lock().error = Some(FETCH_FAILED.to_string());
                self.notifier.error(FETCH_FAILED);
                Vec::new()
            }
        }
    }

    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    /// The user a todo's numeric `assignedUser` points at.
    pub fn find_assignee(&self, assigned_user: u64) -> Option<User> {
        let wanted = assigned_user.to_string();
        self.lock().users.iter().find(|u| u.id == wanted).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading > 0
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    fn begin(&self) -> Loading<'_> {
        let mut state = self.lock();
        state.loading += 1;
        state.error = None;
        Loading { state: &self.state }
    }

    fn lock(&self) -> MutexGuard<'_, UserState> {
        lock(&self.state)
    }
}

/// Lowers the loading counter when dropped, including on cancellation.
struct Loading<'a> {
    state: &'a Mutex<UserState>,
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        state.loading = state.loading.saturating_sub(1);
    }
}

fn lock(state: &Mutex<UserState>) -> MutexGuard<'_, UserState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
