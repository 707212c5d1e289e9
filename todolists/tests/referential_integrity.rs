//! Task buckets match the todolists after any sequence of events.

use chrono::NaiveDateTime;
use proptest::prelude::*;
use std::sync::Arc;
use todolists::reducer::{RootState, TodolistsEnvironment, TodolistsReducer};
use todolists::{
    InMemoryTodolistsApi, RequestId, Task, TaskId, TaskPatch, TaskPriority, TaskStatus, Todolist,
    TodolistId, TodolistsAction,
};
use todolists_core::reducer::Reducer;

const IDS: [&str; 4] = ["a", "b", "c", "d"];

fn todolist(index: usize) -> Todolist {
    Todolist {
        id: TodolistId::new(IDS[index]),
        title: format!("list {index}"),
        added_date: NaiveDateTime::default(),
        order: 0,
    }
}

fn task(list: usize, id: u8) -> Task {
    Task {
        id: TaskId::new(id.to_string()),
        todo_list_id: TodolistId::new(IDS[list]),
        title: format!("task {id}"),
        description: None,
        status: TaskStatus::New,
        priority: TaskPriority::Low,
        start_date: None,
        deadline: None,
        order: 0,
        added_date: NaiveDateTime::default(),
    }
}

fn event() -> impl Strategy<Value = TodolistsAction> {
    let list = 0..IDS.len();
    prop_oneof![
        list.clone().prop_map(|i| TodolistsAction::TodolistAdded {
            request_id: RequestId::new(),
            todolist: todolist(i),
        }),
        list.clone().prop_map(|i| TodolistsAction::TodolistRemoved {
            request_id: RequestId::new(),
            id: TodolistId::new(IDS[i]),
        }),
        prop::collection::vec(list.clone(), 0..4).prop_map(|picked| {
            TodolistsAction::TodolistsFetched {
                request_id: RequestId::new(),
                todolists: picked.into_iter().map(todolist).collect(),
            }
        }),
        (list.clone(), prop::collection::vec(any::<u8>(), 0..3)).prop_map(|(i, ids)| {
            TodolistsAction::TasksFetched {
                request_id: RequestId::new(),
                todolist_id: TodolistId::new(IDS[i]),
                tasks: ids.into_iter().map(|id| task(i, id)).collect(),
            }
        }),
        (list.clone(), any::<u8>()).prop_map(|(i, id)| TodolistsAction::TaskAdded {
            request_id: RequestId::new(),
            task: task(i, id),
        }),
        (list.clone(), any::<u8>()).prop_map(|(i, id)| TodolistsAction::TaskRemoved {
            request_id: RequestId::new(),
            todolist_id: TodolistId::new(IDS[i]),
            task_id: TaskId::new(id.to_string()),
        }),
        (list, any::<u8>()).prop_map(|(i, id)| TodolistsAction::TaskUpdated {
            request_id: RequestId::new(),
            todolist_id: TodolistId::new(IDS[i]),
            task_id: TaskId::new(id.to_string()),
            patch: TaskPatch::status(TaskStatus::Completed),
        }),
        Just(TodolistsAction::ClearTodolistsData),
    ]
}

proptest! {
    #[test]
    fn buckets_always_match_todolists(events in prop::collection::vec(event(), 0..40)) {
        let reducer = TodolistsReducer::new();
        let env = TodolistsEnvironment::new(Arc::new(InMemoryTodolistsApi::new()));
        let mut state = RootState::new();

        for event in events {
            let _ = reducer.reduce(&mut state, event, &env);
            prop_assert!(state.is_consistent(), "inconsistent state: {:?}", state);
        }
    }

    #[test]
    fn stored_tasks_belong_to_their_bucket(events in prop::collection::vec(event(), 0..40)) {
        let reducer = TodolistsReducer::new();
        let env = TodolistsEnvironment::new(Arc::new(InMemoryTodolistsApi::new()));
        let mut state = RootState::new();

        for event in events {
            let _ = reducer.reduce(&mut state, event, &env);
        }

        for id in state.todolists.ids() {
            let bucket = state.tasks.bucket(id).unwrap_or_default();
            prop_assert!(bucket.iter().all(|task| &task.todo_list_id == id));
        }
    }
}
