//! End-to-end flows through the client, the store and the in-memory backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;
use todolists::api::{ApiCall, ScriptedFailure};
use todolists::{
    AddTaskArgs, ApiConfig, FilterValue, InMemoryTodolistsApi, RequestStatus, SyncError, TaskId,
    TaskPatch, TaskStatus, TodolistsAction, TodolistsClient, TodolistsEnvironment,
};
use todolists_runtime::StoreError;

fn client_with(api: &Arc<InMemoryTodolistsApi>) -> TodolistsClient {
    todolists_testing::init_test_tracing();
    let config = ApiConfig::default().with_operation_timeout(Duration::from_secs(2));
    TodolistsClient::init(TodolistsEnvironment::new(api.clone()), &config)
}

#[tokio::test]
async fn fetch_then_manage_tasks() {
    let api = Arc::new(InMemoryTodolistsApi::new());
    let learn = api.seed_todolist("What to learn");
    api.seed_task(&learn.id, "Rust").unwrap();
    let client = client_with(&api);

    let fetched = client.fetch_todolists().await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(client.tasks(&learn.id).await, Some(Vec::new()));

    let tasks = client.fetch_tasks(&learn.id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(client.tasks(&learn.id).await.unwrap(), tasks);

    let added = client
        .add_task(AddTaskArgs::new(learn.id.clone(), "Tokio"))
        .await
        .unwrap();
    let titles: Vec<_> = client
        .tasks(&learn.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, ["Tokio", "Rust"]);

    client
        .update_task(&learn.id, &added.id, TaskPatch::status(TaskStatus::Completed))
        .await
        .unwrap();
    client
        .change_filter(&learn.id, FilterValue::Completed)
        .await
        .unwrap();
    let visible = client.visible_tasks(&learn.id).await;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, added.id);

    client.remove_task(&learn.id, &added.id).await.unwrap();
    assert_eq!(client.tasks(&learn.id).await.map(|t| t.len()), Some(1));

    let state = client.state().await;
    assert!(state.is_consistent());
    assert_eq!(state.app.status, RequestStatus::Succeeded);
}

#[tokio::test]
async fn created_todolist_is_visible_when_call_returns() {
    let api = Arc::new(InMemoryTodolistsApi::new());
    let client = client_with(&api);

    let created = client.add_todolist("Groceries").await.unwrap();

    let entries = client.todolists().await;
    assert_eq!(entries[0].id, created.id);
    assert_eq!(client.tasks(&created.id).await, Some(Vec::new()));

    client.remove_todolist(&created.id).await.unwrap();
    assert!(client.todolists().await.is_empty());
    assert_eq!(client.tasks(&created.id).await, None);
    assert!(client.state().await.is_consistent());
}

#[tokio::test]
async fn network_failure_is_reported_and_returned() {
    let api = Arc::new(InMemoryTodolistsApi::new());
    let client = client_with(&api);
    api.fail_next(ScriptedFailure::Network("Network Error".into()));

    let result = client.fetch_todolists().await;

    assert_eq!(
        result,
        Err(SyncError::Network("Network Error".into()))
    );
    let status = client.app_status().await;
    assert_eq!(status.status, RequestStatus::Failed);
    assert_eq!(status.error.as_deref(), Some("Network Error"));
    assert!(client.todolists().await.is_empty());
}

#[tokio::test]
async fn server_refusal_returns_first_message() {
    let api = Arc::new(InMemoryTodolistsApi::new());
    let client = client_with(&api);

    let result = client.add_todolist("   ").await;

    assert_eq!(result, Err(SyncError::Server("Title is required".into())));
    assert_eq!(
        client.app_status().await.error.as_deref(),
        Some("Title is required")
    );
    assert!(client.todolists().await.is_empty());
}

#[tokio::test]
async fn update_of_unknown_task_never_reaches_backend() {
    let api = Arc::new(InMemoryTodolistsApi::new());
    let client = client_with(&api);
    let list = client.add_todolist("List").await.unwrap();
    let calls_before = api.call_count();

    let result = client
        .update_task(&list.id, &TaskId::new("missing"), TaskPatch::title("x"))
        .await;

    assert_eq!(
        result,
        Err(SyncError::TaskNotFound {
            todolist_id: list.id.clone(),
            task_id: TaskId::new("missing"),
        })
    );
    assert_eq!(api.call_count(), calls_before);
    let status = client.app_status().await;
    assert_eq!(status.status, RequestStatus::Succeeded);
    assert!(status.error.is_none());
}

#[tokio::test]
async fn row_is_loading_while_removal_is_in_flight() {
    let api = Arc::new(InMemoryTodolistsApi::new().with_latency(Duration::from_millis(100)));
    let list = api.seed_todolist("Slow");
    let client = client_with(&api);
    client.fetch_todolists().await.unwrap();

    let removal = {
        let client = client.clone();
        let id = list.id.clone();
        tokio::spawn(async move { client.remove_todolist(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    let in_flight = client.todolists().await;
    assert_eq!(in_flight[0].entity_status, RequestStatus::Loading);
    assert_eq!(client.app_status().await.status, RequestStatus::Loading);

    removal.await.unwrap().unwrap();
    assert!(client.todolists().await.is_empty());
}

#[tokio::test]
async fn failed_removal_marks_row_failed() {
    let api = Arc::new(InMemoryTodolistsApi::new());
    let list = api.seed_todolist("Keep me");
    let client = client_with(&api);
    client.fetch_todolists().await.unwrap();
    api.fail_next(ScriptedFailure::Rejected(Vec::new()));

    let result = client.remove_todolist(&list.id).await;

    assert_eq!(result, Err(SyncError::Server("Some error occurred".into())));
    let entries = client.todolists().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entity_status, RequestStatus::Failed);
}

#[tokio::test]
async fn subscribers_see_settled_actions_after_they_apply() {
    let api = Arc::new(InMemoryTodolistsApi::new());
    let client = client_with(&api);
    let mut rx = client.subscribe();

    let created = client.add_todolist("Observed").await.unwrap();

    let action = rx.recv().await.unwrap();
    assert!(matches!(
        action,
        TodolistsAction::TodolistAdded { ref todolist, .. } if todolist.id == created.id
    ));
}

#[tokio::test]
async fn clear_and_local_actions() {
    let api = Arc::new(InMemoryTodolistsApi::new());
    let client = client_with(&api);
    let list = client.add_todolist("List").await.unwrap();

    client
        .change_entity_status(&list.id, RequestStatus::Loading)
        .await
        .unwrap();
    client.set_app_error(Some("dismiss me".into())).await.unwrap();
    assert_eq!(
        client.todolists().await[0].entity_status,
        RequestStatus::Loading
    );
    assert_eq!(
        client.app_status().await.error.as_deref(),
        Some("dismiss me")
    );

    client.set_app_error(None).await.unwrap();
    client.clear().await.unwrap();

    let state = client.state().await;
    assert!(state.todolists.is_empty());
    assert!(state.tasks.is_empty());
    assert!(state.app.error.is_none());
}

#[tokio::test]
async fn concurrent_requests_settle_independently() {
    let api = Arc::new(InMemoryTodolistsApi::new().with_latency(Duration::from_millis(20)));
    let client = client_with(&api);

    let (first, second) = tokio::join!(client.add_todolist("One"), client.add_todolist("Two"));

    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.id, second.id);
    let state = client.state().await;
    assert_eq!(state.todolists.len(), 2);
    assert!(state.is_consistent());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_requests_all_resolve_with_their_outcome() {
    let api = Arc::new(InMemoryTodolistsApi::new());
    let client = client_with(&api);

    let pending: Vec<_> = (0..300)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move { client.add_todolist(format!("t{i}")).await })
        })
        .collect();

    let mut created = Vec::new();
    for request in pending {
        created.push(request.await.unwrap().unwrap());
    }

    let state = client.state().await;
    assert_eq!(created.len(), 300);
    assert_eq!(state.todolists.len(), 300);
    assert!(created.iter().all(|list| state.todolists.contains(&list.id)));
    assert!(state.is_consistent());
    assert_eq!(client.store().pending_waiters(), 0);
}

#[tokio::test]
async fn operation_times_out() {
    let api = Arc::new(InMemoryTodolistsApi::new().with_latency(Duration::from_millis(500)));
    let config = ApiConfig::default().with_operation_timeout(Duration::from_millis(50));
    let client = TodolistsClient::init(TodolistsEnvironment::new(api.clone()), &config);

    let result = client.fetch_todolists().await;

    assert_eq!(result, Err(SyncError::Timeout("fetch_todolists".into())));
}

#[tokio::test]
async fn shutdown_waits_for_requests_then_rejects_new_ones() {
    let api = Arc::new(InMemoryTodolistsApi::new().with_latency(Duration::from_millis(50)));
    let client = client_with(&api);

    let pending = {
        let client = client.clone();
        tokio::spawn(async move { client.add_todolist("Last one").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    client.shutdown(Duration::from_secs(1)).await.unwrap();

    assert!(pending.await.unwrap().is_ok());
    assert_eq!(client.todolists().await.len(), 1);
    assert_eq!(
        client.add_todolist("Too late").await,
        Err(SyncError::Store(StoreError::ShutdownInProgress.to_string()))
    );
    assert_eq!(
        api.calls()
            .iter()
            .filter(|call| matches!(call, ApiCall::CreateTodolist { .. }))
            .count(),
        1
    );
}

#[tokio::test]
async fn late_task_fetch_after_removal_keeps_invariant() {
    let api = Arc::new(InMemoryTodolistsApi::new().with_latency(Duration::from_millis(30)));
    let list = api.seed_todolist("Gone soon");
    let client = client_with(&api);
    client.fetch_todolists().await.unwrap();

    // Local removal simulates the todolist disappearing while tasks are in flight.
    let fetch = {
        let client = client.clone();
        let id = list.id.clone();
        tokio::spawn(async move { client.fetch_tasks(&id).await })
    };
    client.clear().await.unwrap();

    let fetched = fetch.await.unwrap();
    assert!(fetched.is_ok());
    let state = client.state().await;
    assert!(state.tasks.is_empty());
    assert!(state.is_consistent());
    assert_eq!(client.tasks(&list.id).await, None);
}
