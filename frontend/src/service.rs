//! Client-side task cache and the requests that keep it current.
//!
//! State sits behind an `Rc<RefCell<_>>`: the app runs on the browser's single
//! thread and a borrow is never held across an `.await`, so run-to-completion
//! is the only synchronisation needed.
//!
//! Requests are neither deduplicated nor cancelled. Two status updates racing
//! for the same id leave whichever response is processed last in the cache.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use shared::{adapter, ApiError, ApiResponse, CreateTaskDto, Task, TaskApi, TaskId};
use tracing::{debug, warn};

pub const CREATE_FAILED: &str = "Failed to create task";
pub const FETCH_FAILED: &str = "Failed to fetch tasks";
pub const UPDATE_FAILED: &str = "Failed to update task status";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct TaskService<A> {
    api: Rc<A>,
    state: Rc<RefCell<TaskState>>,
}

impl<A> Clone for TaskService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Rc::clone(&self.api),
            state: Rc::clone(&self.state),
        }
    }
}

impl<A: TaskApi + 'static> TaskService<A> {
    pub fn new(api: A) -> Self {
        Self {
            api: Rc::new(api),
            state: Rc::new(RefCell::new(TaskState::default())),
        }
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> TaskState {
        self.state.borrow().clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    pub fn with_tasks<R>(&self, f: impl FnOnce(&[Task]) -> R) -> R {
        f(&self.state.borrow().tasks)
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.borrow_mut().error = None;
    }

    /// Sends a creation request. The created task is appended to the cache.
    pub fn create(&self, dto: CreateTaskDto) -> impl Future<Output = Option<Task>> + 'static {
        self.begin("create");
        let api = Rc::clone(&self.api);
        let state = Rc::clone(&self.state);
        async move {
            let result = api.create(&dto).await;
            let mut state = state.borrow_mut();
            state.loading = false;
            match accepted(result, CREATE_FAILED) {
                Ok(raw) => {
                    let task = adapter::normalize(&raw);
                    debug!(id = task.id, name = %task.task_name, "task created");
                    state.tasks.push(task.clone());
                    Some(task)
                }
                Err(message) => {
                    state.error = Some(message);
                    None
                }
            }
        }
    }

    /// Replaces the whole cache with the server's list. On failure the cached
    /// list is kept as is and an empty list is returned.
    pub fn list_all(&self) -> impl Future<Output = Vec<Task>> + 'static {
        self.begin("list_all");
        let api = Rc::clone(&self.api);
        let state = Rc::clone(&self.state);
        async move {
            let result = api.list_all().await;
            let mut state = state.borrow_mut();
            state.loading = false;
            match accepted(result, FETCH_FAILED) {
                Ok(raw) => {
                    let tasks = adapter::normalize_list(&raw);
                    debug!(count = tasks.len(), "tasks loaded");
                    state.tasks = tasks.clone();
                    tasks
                }
                Err(message) => {
                    state.error = Some(message);
                    Vec::new()
                }
            }
        }
    }

    /// Asks the server to move a task to its next status and swaps the
    /// returned record into the cache in place.
    pub fn update_status(&self, id: TaskId) -> impl Future<Output = Option<Task>> + 'static {
        self.begin("update_status");
        let api = Rc::clone(&self.api);
        let state = Rc::clone(&self.state);
        async move {
            let result = api.update_status(id).await;
            let mut state = state.borrow_mut();
            state.loading = false;
            match accepted(result, UPDATE_FAILED) {
                Ok(raw) => {
                    let updated = adapter::normalize(&raw);
                    debug!(id, status = %updated.status, "task status updated");
                    if let Some(slot) = state.tasks.iter_mut().find(|task| task.id == id) {
                        *slot = updated.clone();
                    } else {
                        debug!(id, "updated task is not cached");
                    }
                    Some(updated)
                }
                Err(message) => {
                    state.error = Some(message);
                    None
                }
            }
        }
    }

    fn begin(&self, operation: &'static str) {
        debug!(operation, "request started");
        let mut state = self.state.borrow_mut();
        state.loading = true;
        state.error = None;
    }
}

/// Unwraps a successful envelope, or produces the message to show the user.
fn accepted<T>(result: Result<ApiResponse<T>, ApiError>, fallback: &str) -> Result<T, String> {
    match result {
        Ok(response) if response.success => Ok(response.data),
        Ok(response) => {
            warn!(message = %response.message, "server rejected request");
            if response.message.trim().is_empty() {
                Err(fallback.to_string())
            } else {
                Err(response.message)
            }
        }
        Err(err) => {
            warn!(error = %err, "request failed");
            Err(err
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ok, raw_task, rejected, sample_dto, FakeApi};
    use serde_json::json;
    use shared::TaskStatus;

    fn service_with(api: &FakeApi) -> TaskService<FakeApi> {
        TaskService::new(api.clone())
    }

    async fn seeded(api: &FakeApi) -> TaskService<FakeApi> {
        api.push_list(Ok(ok(vec![
            raw_task(1, "Plan", "PENDING", 3.0),
            raw_task(2, "Build", "IN_PROGRESS", 5.0),
            raw_task(3, "Ship", "pending", 2.0),
        ])));
        let service = service_with(api);
        service.list_all().await;
        service
    }

    #[tokio::test]
    async fn list_all_replaces_cache() {
        let api = FakeApi::default();
        let service = seeded(&api).await;
        assert_eq!(service.tasks().len(), 3);

        api.push_list(Ok(ok(vec![raw_task(9, "Only", "COMPLETED", 1.0)])));
        let tasks = service.list_all().await;

        assert_eq!(tasks.len(), 1);
        assert_eq!(service.tasks(), tasks);
        assert_eq!(service.tasks()[0].status, TaskStatus::Completed);
        assert!(!service.loading());
        assert_eq!(service.error(), None);
    }

    #[tokio::test]
    async fn list_failure_keeps_stale_cache() {
        let api = FakeApi::default();
        let service = seeded(&api).await;
        let before = service.tasks();

        api.push_list(Err(ApiError::Transport("offline".into())));
        let tasks = service.list_all().await;

        assert!(tasks.is_empty());
        assert_eq!(service.tasks(), before);
        assert_eq!(service.error().as_deref(), Some(FETCH_FAILED));
        assert!(!service.loading());
    }

    #[tokio::test]
    async fn rejected_list_uses_server_message() {
        let api = FakeApi::default();
        let service = seeded(&api).await;

        api.push_list(Ok(rejected("Database unavailable")));
        assert!(service.list_all().await.is_empty());
        assert_eq!(service.tasks().len(), 3);
        assert_eq!(service.error().as_deref(), Some("Database unavailable"));
    }

    #[tokio::test]
    async fn rejected_list_with_null_data_uses_server_message() {
        let api = FakeApi::default();
        let service = seeded(&api).await;

        let envelope = serde_json::from_value(json!({
            "success": false,
            "message": "Database unavailable",
            "data": null
        }))
        .expect("envelope decodes");
        api.push_list(Ok(envelope));

        assert!(service.list_all().await.is_empty());
        assert_eq!(service.tasks().len(), 3);
        assert_eq!(service.error().as_deref(), Some("Database unavailable"));
    }

    #[tokio::test]
    async fn create_appends_normalized_task() {
        let api = FakeApi::default();
        let service = seeded(&api).await;

        api.push_create(Ok(ok(raw_task(4, "Review", "completed", 4.0))));
        let created = service.create(sample_dto()).await.expect("created");

        assert_eq!(created.id, 4);
        assert_eq!(created.status, TaskStatus::Completed);
        let ids: Vec<TaskId> = service.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(api.create_requests(), vec![sample_dto()]);
    }

    #[tokio::test]
    async fn create_failure_leaves_cache_unchanged() {
        let api = FakeApi::default();
        let service = seeded(&api).await;
        let before = service.tasks();

        api.push_create(Ok(rejected("")));
        assert_eq!(service.create(sample_dto()).await, None);
        assert_eq!(service.error().as_deref(), Some(CREATE_FAILED));

        api.push_create(Err(ApiError::Http {
            status: 422,
            message: Some("Task name already exists".into()),
        }));
        assert_eq!(service.create(sample_dto()).await, None);
        assert_eq!(service.error().as_deref(), Some("Task name already exists"));

        assert_eq!(service.tasks(), before);
        assert!(!service.loading());
    }

    #[tokio::test]
    async fn update_status_replaces_matching_entry_in_place() {
        let api = FakeApi::default();
        let service = seeded(&api).await;

        api.push_update(Ok(ok(raw_task(2, "Build", "COMPLETED", 5.0))));
        let updated = service.update_status(2).await.expect("updated");

        assert_eq!(updated.status, TaskStatus::Completed);
        let statuses: Vec<(TaskId, TaskStatus)> =
            service.tasks().iter().map(|t| (t.id, t.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (1, TaskStatus::Pending),
                (2, TaskStatus::Completed),
                (3, TaskStatus::Pending),
            ]
        );
        assert_eq!(api.update_requests(), vec![2]);
    }

    #[tokio::test]
    async fn update_failure_leaves_cache_unchanged() {
        let api = FakeApi::default();
        let service = seeded(&api).await;
        let before = service.tasks();

        api.push_update(Err(ApiError::Http {
            status: 404,
            message: None,
        }));
        assert_eq!(service.update_status(2).await, None);
        assert_eq!(service.tasks(), before);
        assert_eq!(service.error().as_deref(), Some(UPDATE_FAILED));
    }

    #[tokio::test]
    async fn update_for_uncached_id_leaves_list_alone() {
        let api = FakeApi::default();
        let service = seeded(&api).await;
        let before = service.tasks();

        api.push_update(Ok(ok(raw_task(99, "Elsewhere", "COMPLETED", 1.0))));
        let updated = service.update_status(99).await.expect("updated");

        assert_eq!(updated.id, 99);
        assert_eq!(service.tasks(), before);
        assert_eq!(service.tasks().len(), 3);
        assert!(service.tasks().iter().all(|task| task.id != 99));
    }

    #[tokio::test]
    async fn first_request_to_finish_clears_shared_loading_flag() {
        let api = FakeApi::default();
        let service = seeded(&api).await;

        api.push_list(Ok(ok(vec![raw_task(1, "Plan", "PENDING", 3.0)])));
        api.push_update(Ok(ok(raw_task(1, "Plan", "IN_PROGRESS", 3.0))));
        let refresh = service.list_all();
        let update = service.update_status(1);
        assert!(service.loading());

        refresh.await;
        assert!(!service.loading());

        update.await;
        assert!(!service.loading());
        assert_eq!(service.tasks()[0].status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn loading_is_set_while_request_is_pending() {
        let api = FakeApi::default();
        let service = service_with(&api);
        assert_eq!(service.snapshot(), TaskState::default());

        api.push_list(Ok(ok(Vec::new())));
        let pending = service.list_all();
        assert!(service.loading());
        pending.await;
        assert!(!service.loading());
    }

    #[tokio::test]
    async fn new_request_clears_previous_error() {
        let api = FakeApi::default();
        let service = service_with(&api);

        api.push_list(Err(ApiError::Decode("bad json".into())));
        service.list_all().await;
        assert!(service.error().is_some());

        api.push_list(Ok(ok(Vec::new())));
        let pending = service.list_all();
        assert_eq!(service.error(), None);
        pending.await;
        assert_eq!(service.error(), None);
    }
}
