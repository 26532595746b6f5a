//! Standalone to-do list kept in the same store as the affiliate data.

use std::cmp::Reverse;

use serde::Deserialize;

use crate::{
  entity::{FilterOption, Priority, SortOption, Task, new_id},
  prelude::*,
};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TaskDraft {
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub priority: Option<Priority>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TaskQuery {
  #[serde(default)]
  pub search: String,
  #[serde(default)]
  pub filter: FilterOption,
  #[serde(default)]
  pub sort: SortOption,
}

pub fn matches_search(task: &Task, query: &str) -> bool {
  let query = query.to_lowercase();
  task.title.to_lowercase().contains(&query)
    || task.description.to_lowercase().contains(&query)
}

pub fn matches_filter(task: &Task, filter: FilterOption) -> bool {
  match filter {
    FilterOption::All => true,
    FilterOption::Completed => task.completed,
    FilterOption::Active => !task.completed,
  }
}

/// Stable sort: priority high to low, date newest first, title ascending.
pub fn sort_tasks(tasks: &mut [Task], sort: SortOption) {
  match sort {
    SortOption::Priority => tasks.sort_by_key(|t| t.priority.rank()),
    SortOption::Date => tasks.sort_by_key(|t| Reverse(t.created_at)),
    // case-insensitive first, so "apple" sorts before "Cherry"
    SortOption::Title => {
      tasks.sort_by_cached_key(|t| (t.title.to_lowercase(), t.title.clone()))
    }
  }
}

pub fn query(tasks: &[Task], query: &TaskQuery) -> Vec<Task> {
  let mut out: Vec<Task> = tasks
    .iter()
    .filter(|t| matches_search(t, &query.search))
    .filter(|t| matches_filter(t, query.filter))
    .cloned()
    .collect();
  sort_tasks(&mut out, query.sort);
  out
}

pub struct Tasks<'a> {
  store: &'a Store,
}

impl<'a> Tasks<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  pub async fn all(&self) -> Vec<Task> {
    self.store.load_collection(keys::TASKS).await
  }

  pub async fn query(&self, q: &TaskQuery) -> Vec<Task> {
    query(&self.all().await, q)
  }

  pub async fn add(&self, draft: TaskDraft) -> Result<Task> {
    let title = draft.title.trim();
    if title.is_empty() {
      debug!("Rejected task with empty title");
      return Err(Error::EmptyTitle);
    }

    let task = Task {
      id: new_id(),
      title: title.to_string(),
      description: draft.description.trim().to_string(),
      completed: false,
      created_at: Utc::now(),
      priority: draft.priority.unwrap_or_default(),
    };

    let _guard = self.store.lock().await;
    let mut tasks = self.all().await;
    tasks.insert(0, task.clone());
    self.store.save_collection(keys::TASKS, &tasks).await;

    Ok(task)
  }

  /// Replaces title, description and priority; identity, completion and
  /// creation time are kept.
  pub async fn edit(&self, id: &str, draft: TaskDraft) -> Result<Task> {
    let title = draft.title.trim();
    if title.is_empty() {
      return Err(Error::EmptyTitle);
    }

    let _guard = self.store.lock().await;
    let mut tasks = self.all().await;
    let task =
      tasks.iter_mut().find(|t| t.id == id).ok_or(Error::TaskNotFound)?;

    task.title = title.to_string();
    task.description = draft.description.trim().to_string();
    if let Some(priority) = draft.priority {
      task.priority = priority;
    }
    let task = task.clone();

    self.store.save_collection(keys::TASKS, &tasks).await;
    Ok(task)
  }

  pub async fn delete(&self, id: &str) -> Result<Task> {
    let _guard = self.store.lock().await;
    let mut tasks = self.all().await;
    let idx = tasks.iter().position(|t| t.id == id).ok_or(Error::TaskNotFound)?;

    let task = tasks.remove(idx);
    self.store.save_collection(keys::TASKS, &tasks).await;

    debug!("Task `{}` deleted", task.title);
    Ok(task)
  }

  pub async fn toggle(&self, id: &str) -> Result<Task> {
    let _guard = self.store.lock().await;
    let mut tasks = self.all().await;
    let task =
      tasks.iter_mut().find(|t| t.id == id).ok_or(Error::TaskNotFound)?;

    task.completed = !task.completed;
    let task = task.clone();

    self.store.save_collection(keys::TASKS, &tasks).await;
    Ok(task)
  }
}
