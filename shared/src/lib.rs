pub mod adapter;
pub mod api;
pub mod model;

pub use adapter::{derive_display, normalize, normalize_list, TaskDisplay};
pub use api::{ApiError, TaskApi};
pub use model::{
    ApiResponse, CreateTaskDto, RawTask, StatusParseError, Task, TaskId, TaskStatus,
    MAX_TASK_NAME_LEN,
};
