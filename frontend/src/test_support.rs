use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::json;
use shared::{ApiError, ApiResponse, CreateTaskDto, RawTask, TaskApi, TaskId, TaskStatus};

type Scripted<T> = RefCell<VecDeque<Result<ApiResponse<T>, ApiError>>>;

#[derive(Default)]
struct Backend {
    created: Scripted<RawTask>,
    listed: Scripted<Vec<RawTask>>,
    updated: Scripted<RawTask>,
    create_requests: RefCell<Vec<CreateTaskDto>>,
    list_requests: RefCell<usize>,
    update_requests: RefCell<Vec<TaskId>>,
}

/// Scripted `TaskApi`: each call pops the next queued response and records
/// the request. An empty queue answers with a transport error.
#[derive(Clone, Default)]
pub struct FakeApi(Rc<Backend>);

impl FakeApi {
    pub fn push_create(&self, response: Result<ApiResponse<RawTask>, ApiError>) {
        self.0.created.borrow_mut().push_back(response);
    }

    pub fn push_list(&self, response: Result<ApiResponse<Vec<RawTask>>, ApiError>) {
        self.0.listed.borrow_mut().push_back(response);
    }

    pub fn push_update(&self, response: Result<ApiResponse<RawTask>, ApiError>) {
        self.0.updated.borrow_mut().push_back(response);
    }

    pub fn create_requests(&self) -> Vec<CreateTaskDto> {
        self.0.create_requests.borrow().clone()
    }

    pub fn list_requests(&self) -> usize {
        *self.0.list_requests.borrow()
    }

    pub fn update_requests(&self) -> Vec<TaskId> {
        self.0.update_requests.borrow().clone()
    }
}

fn next<T>(queue: &Scripted<T>) -> Result<ApiResponse<T>, ApiError> {
    queue
        .borrow_mut()
        .pop_front()
        .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".into())))
}

impl TaskApi for FakeApi {
    async fn create(&self, dto: &CreateTaskDto) -> Result<ApiResponse<RawTask>, ApiError> {
        self.0.create_requests.borrow_mut().push(dto.clone());
        next(&self.0.created)
    }

    async fn list_all(&self) -> Result<ApiResponse<Vec<RawTask>>, ApiError> {
        *self.0.list_requests.borrow_mut() += 1;
        next(&self.0.listed)
    }

    async fn update_status(&self, id: TaskId) -> Result<ApiResponse<RawTask>, ApiError> {
        self.0.update_requests.borrow_mut().push(id);
        next(&self.0.updated)
    }
}

pub fn ok<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        message: String::new(),
        data,
        count: None,
    }
}

/// An envelope with `success: false`, as sent for application-level failures.
pub fn rejected<T: Default>(message: &str) -> ApiResponse<T> {
    ApiResponse {
        success: false,
        message: message.to_string(),
        data: T::default(),
        count: None,
    }
}

/// A backend record in snake_case, the way the server usually sends it.
pub fn raw_task(id: TaskId, name: &str, status: &str, effort: f64) -> RawTask {
    RawTask::from(json!({
        "id": id,
        "task_name": name,
        "description": format!("{name} details"),
        "start_date": "2024-01-01",
        "end_date": "2024-01-31",
        "status": status,
        "effort_required": effort,
        "created_at": "2023-12-31T12:00:00Z"
    }))
}

pub fn sample_dto() -> CreateTaskDto {
    CreateTaskDto {
        task_name: "Test Task".to_string(),
        description: "Test Description".to_string(),
        start_date: "2024-01-01".to_string(),
        end_date: "2024-01-31".to_string(),
        status: TaskStatus::Pending,
        effort_required: 5.0,
    }
}
