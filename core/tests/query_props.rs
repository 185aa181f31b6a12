//! The list request carries exactly the query fields that are set and
//! non-empty, whatever combination of filters the view produces.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use proptest::option;
use proptest::prelude::*;
use taskflow_core::{
    ApiClient, HttpMethod, SortField, SortOrder, TodoPriority, TodoQuery, TodoStatus,
};

fn status() -> impl Strategy<Value = TodoStatus> {
    prop::sample::select(TodoStatus::ALL.to_vec())
}

fn priority() -> impl Strategy<Value = TodoPriority> {
    prop_oneof![Just(TodoPriority::High), Just(TodoPriority::Low)]
}

fn sort() -> impl Strategy<Value = (SortField, SortOrder)> {
    (
        prop_oneof![
            Just(SortField::DueDate),
            Just(SortField::Title),
            Just(SortField::Status),
            Just(SortField::Priority),
        ],
        prop_oneof![Just(SortOrder::Asc), Just(SortOrder::Desc)],
    )
}

prop_compose! {
    fn query()(
        status in option::of(status()),
        user in option::of("[0-9]{0,3}"),
        priority in option::of(priority()),
        sort in option::of(sort()),
        page in 0u32..5,
        page_size in 0u32..20,
        search in option::of("[a-z #&=?]{0,8}"),
    ) -> TodoQuery {
        let mut query = TodoQuery::default().page(page).page_size(page_size);
        if let Some(status) = status {
            query = query.status(status);
        }
        if let Some(user) = user {
            query = query.assigned_user(user);
        }
        if let Some(priority) = priority {
            query = query.priority(priority);
        }
        if let Some((field, order)) = sort {
            query = query.sort(field, order);
        }
        if let Some(text) = search {
            query = query.search(text);
        }
        query
    }
}

fn sent_pairs(path: &str) -> BTreeMap<String, String> {
    let Some((_, qs)) = path.split_once('?') else {
        return BTreeMap::new();
    };
    qs.split('&')
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap();
            let value = percent_decode_str(value).decode_utf8().unwrap().into_owned();
            (key.to_string(), value)
        })
        .collect()
}

fn expected_pairs(query: &TodoQuery) -> BTreeMap<String, String> {
    let mut expected = BTreeMap::new();
    let mut put = |key: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            expected.insert(key.to_string(), value);
        }
    };
    put("status", query.status.map(|s| s.as_str().to_string()));
    put("assignedUser", query.assigned_user.clone());
    put("priority", query.priority.map(|p| p.as_str().to_string()));
    put("_sort", query.sort_field.map(|f| f.as_str().to_string()));
    put("_order", query.sort_order.map(|o| o.as_str().to_string()));
    put("_page", query.page.map(|p| p.to_string()));
    put("_limit", query.page_size.map(|p| p.to_string()));
    put("q", query.search_text.clone());
    expected
}

proptest! {
    #[test]
    fn only_set_non_empty_fields_are_sent(query in query()) {
        let req = ApiClient::new("http://localhost:3000").build_list_todos(&query);

        prop_assert_eq!(req.method, HttpMethod::Get);
        prop_assert!(req.path.starts_with("http://localhost:3000/todo"));
        prop_assert!(!req.path.ends_with('?'));
        prop_assert_eq!(sent_pairs(&req.path), expected_pairs(&query));
    }
}
