//! Command-line demo of the todolists state layer.
//!
//! Talks to the backend configured through `TODOLISTS_*` variables (a `.env`
//! file is honored). Without an API key it runs against the in-memory backend.

use std::sync::Arc;
use std::time::Duration;
use todolists::{
    AddTaskArgs, ApiConfig, FilterValue, HttpTodolistsApi, InMemoryTodolistsApi, RootState,
    TaskPatch, TaskStatus, TodolistsApi, TodolistsClient, TodolistsEnvironment,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ApiConfig::from_env()?;
    let api: Arc<dyn TodolistsApi> = if config.api_key.is_some() {
        tracing::info!(base_url = %config.base_url, "Using HTTP backend");
        Arc::new(HttpTodolistsApi::new(&config)?)
    } else {
        tracing::info!("No TODOLISTS_API_KEY set, using in-memory backend");
        Arc::new(InMemoryTodolistsApi::new())
    };

    println!("=== Todolists Demo ===\n");

    let client = TodolistsClient::init(TodolistsEnvironment::new(api), &config);

    let fetched = client.fetch_todolists().await?;
    println!("Fetched {} todolists", fetched.len());

    println!("\nCreating 'What to buy'...");
    let list = client.add_todolist("What to buy").await?;
    let milk = client
        .add_task(AddTaskArgs::new(list.id.clone(), "Milk"))
        .await?;
    client
        .add_task(AddTaskArgs::new(list.id.clone(), "Bread"))
        .await?;
    print_state(&client.state().await);

    println!("\nCompleting 'Milk'...");
    client
        .update_task(&list.id, &milk.id, TaskPatch::status(TaskStatus::Completed))
        .await?;
    client.change_filter(&list.id, FilterValue::Active).await?;
    let active = client.visible_tasks(&list.id).await;
    println!("Active tasks: {}", active.len());

    println!("\nRenaming and removing the list...");
    client.change_todolist_title(&list.id, "Groceries").await?;
    print_state(&client.state().await);
    client.remove_todolist(&list.id).await?;
    print_state(&client.state().await);

    match client.add_todolist("").await {
        Ok(_) => println!("\nEmpty title unexpectedly accepted"),
        Err(error) => println!("\nEmpty title rejected: {error}"),
    }
    let status = client.app_status().await;
    println!("App status: {:?}, error: {:?}", status.status, status.error);

    client.shutdown(Duration::from_secs(5)).await?;
    println!("\n=== Demo Complete ===");
    Ok(())
}

fn print_state(state: &RootState) {
    println!("Todolists: {}", state.todolists.len());
    for entry in &state.todolists {
        println!("  {} [{:?}]", entry.title, entry.entity_status);
        for task in state.tasks.bucket(&entry.id).unwrap_or_default() {
            let mark = if task.is_completed() { "x" } else { " " };
            println!("    [{mark}] {}", task.title);
        }
    }
}
