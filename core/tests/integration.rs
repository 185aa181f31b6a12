//! Full client lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every resource
//! operation and the hook layer over real HTTP with the ureq transport.
//! Validates that request building and response parsing agree with the
//! actual server.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::{live, recorder, seed_with_done};
use taskflow_core::{
    sign_in, ApiError, Credentials, LoginOutcome, MemoryStorage, NewTodo, SessionStore,
    SortField, SortOrder, TaskForm, TaskListView, TodoCollection, TodoPatch, TodoPriority,
    TodoQuery, TodoStatus, ViewOptions,
};

fn new_todo(title: &str) -> NewTodo {
    NewTodo {
        title: title.to_string(),
        description: "integration".to_string(),
        due_date: NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
        status: TodoStatus::Todo,
        assigned_user: 3,
        priority: TodoPriority::High,
        tags: Some(vec!["it".to_string()]),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn crud_lifecycle() {
    let client = live(mock_server::Seed::demo()).await;

    // list: should be empty
    let todos = client.list_todos(&TodoQuery::default()).await.unwrap();
    assert!(todos.is_empty(), "expected empty list");

    // create: backend assigns the id
    let input = new_todo("Integration test");
    let created = client.create_todo(&input).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(NewTodo::from(&created), input);

    // get: round-trips every field
    let fetched = client.get_todo(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    // partial update: status only
    let updated = client
        .update_todo(&created.id, &TodoPatch::status(TodoStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(updated.status, TodoStatus::InProgress);
    assert_eq!(updated.title, "Integration test");
    assert_eq!(updated.tags, input.tags);

    // delete, then the id is gone
    client.delete_todo(&created.id).await.unwrap();
    let err = client.get_todo(&created.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let err = client.delete_todo(&created.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let err = client
        .update_todo(&created.id, &TodoPatch::status(TodoStatus::Done))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(flavor = "multi_thread")]
async fn users_and_credentials() {
    let client = live(mock_server::Seed::demo()).await;

    let users = client.list_users().await.unwrap();
    assert_eq!(users.len(), 3);
    let grace = client.get_user("2").await.unwrap();
    assert_eq!(grace.email, "grace@example.com");
    assert!(matches!(client.get_user("99").await, Err(ApiError::NotFound)));

    let session = SessionStore::open(MemoryStorage::new());
    let notifier = recorder();
    let wrong = Credentials {
        username: "admin".to_string(),
        password: "wrong".to_string(),
    };
    let right = Credentials {
        username: "admin".to_string(),
        password: "123".to_string(),
    };
    assert_eq!(
        sign_in(&client, &session, notifier.as_ref(), &wrong).await.unwrap(),
        LoginOutcome::InvalidCredentials
    );
    assert!(!session.is_authenticated());
    assert_eq!(
        sign_in(&client, &session, notifier.as_ref(), &right).await.unwrap(),
        LoginOutcome::Authenticated
    );
    assert_eq!(session.username().as_deref(), Some("admin"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = taskflow_core::ResourceClient::over_http(&format!("http://{addr}"));
    let err = client.list_todos(&TodoQuery::default()).await.unwrap_err();
    assert!(err.is_network(), "{err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn filters_search_and_sort_reach_the_backend() {
    let client = live(seed_with_done(3)).await;

    let open = client
        .list_todos(&TodoQuery::default().status(TodoStatus::Todo))
        .await
        .unwrap();
    assert_eq!(open.len(), 2);

    let mine = client
        .list_todos(&TodoQuery::default().assigned_user("2"))
        .await
        .unwrap();
    assert!(mine.iter().all(|t| t.assigned_user == 2));
    assert_eq!(mine.len(), 2);

    let found = client
        .list_todos(&TodoQuery::default().search("call plumber"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "o2");

    let newest_first = client
        .list_todos(
            &TodoQuery::default()
                .status(TodoStatus::Done)
                .sort(SortField::DueDate, SortOrder::Desc),
        )
        .await
        .unwrap();
    let ids: Vec<&str> = newest_first.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["d3", "d2", "d1"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn second_page_of_thirteen_done_items() {
    let client = Arc::new(live(seed_with_done(13)).await);
    let view = TaskListView::mount(client, recorder(), ViewOptions::default()).await;

    view.set_status(Some(TodoStatus::Done)).await;
    let page = view.go_to_page(2).await;

    let ids: Vec<&str> = page.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["d7", "d8", "d9", "d10", "d11", "d12"]);
    assert_eq!(view.todos().total_count(), Some(13));
    assert_eq!(view.total_pages(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn form_submission_creates_then_edits() {
    let client = Arc::new(live(mock_server::Seed::demo()).await);
    let notifier = recorder();
    let todos = TodoCollection::mount(client.clone(), TodoQuery::default(), notifier.clone()).await;
    assert!(todos.is_empty());

    let mut form = TaskForm::create();
    form.set_title("Plan sprint");
    form.set_due_date("2024-10-01");
    assert!(form.next());
    form.set_assigned_user(Some(1));
    form.set_priority(Some(TodoPriority::High));
    let created = form.submit(&todos).await.unwrap();

    assert_eq!(todos.len(), 1);
    assert_eq!(todos.get(&created.id).unwrap().title, "Plan sprint");

    let mut edit = TaskForm::edit(&created);
    edit.set_status(TodoStatus::Done);
    let edited = edit.submit(&todos).await.unwrap();
    assert_eq!(edited.status, TodoStatus::Done);
    assert_eq!(todos.get(&created.id).unwrap().status, TodoStatus::Done);

    let stored = client.get_todo(&created.id).await.unwrap();
    assert_eq!(stored.title, "Plan sprint");
    assert_eq!(stored.status, TodoStatus::Done);

    let mut empty = TaskForm::create();
    assert!(empty.submit(&todos).await.is_err());
    assert_eq!(todos.len(), 1);
}
