//! Creation form and the state behind the task list page.

use std::collections::HashSet;
use std::future::Future;

use chrono::Utc;
use shared::adapter::parse_date;
use shared::{CreateTaskDto, Task, TaskApi, TaskId, TaskStatus, MAX_TASK_NAME_LEN};
use thiserror::Error;
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::service::TaskService;
use crate::task_card::TaskCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    TaskName,
    Description,
    StartDate,
    EndDate,
    Status,
    EffortRequired,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::TaskName,
        FormField::Description,
        FormField::StartDate,
        FormField::EndDate,
        FormField::Status,
        FormField::EffortRequired,
    ];

    /// Name used in validation messages and element ids.
    pub fn key(&self) -> &'static str {
        match self {
            FormField::TaskName => "taskName",
            FormField::Description => "description",
            FormField::StartDate => "startDate",
            FormField::EndDate => "endDate",
            FormField::Status => "status",
            FormField::EffortRequired => "effortRequired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::TaskName => "Task name",
            FormField::Description => "Description",
            FormField::StartDate => "Start date",
            FormField::EndDate => "End date",
            FormField::Status => "Status",
            FormField::EffortRequired => "Effort required",
        }
    }

    fn struct_field(&self) -> &'static str {
        match self {
            FormField::TaskName => "task_name",
            FormField::Description => "description",
            FormField::StartDate => "start_date",
            FormField::EndDate => "end_date",
            FormField::Status => "status",
            FormField::EffortRequired => "effort_required",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    MaxLength(usize),
    NotPositive,
}

impl FieldError {
    pub fn message(&self, field: FormField) -> String {
        match self {
            FieldError::Required => format!("{} is required.", field.key()),
            FieldError::MaxLength(_) => format!("{} exceeds maximum length.", field.key()),
            FieldError::NotPositive => format!("{} must be greater than zero.", field.key()),
        }
    }

    fn from_code(code: &str) -> Self {
        match code {
            "length" => FieldError::MaxLength(MAX_TASK_NAME_LEN),
            "positive" => FieldError::NotPositive,
            _ => FieldError::Required,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("Please fix the highlighted fields.")]
    Invalid,
    #[error("End date must be after start date.")]
    EndBeforeStart,
}

/// Raw input values of the creation form. Effort is kept as typed so a
/// half-entered number can be shown back unchanged.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct TaskForm {
    #[validate(custom(function = "task_name_rules"))]
    pub task_name: String,
    #[validate(custom(function = "required_text"))]
    pub description: String,
    #[validate(custom(function = "required_text"))]
    pub start_date: String,
    #[validate(custom(function = "required_text"))]
    pub end_date: String,
    #[validate(required)]
    pub status: Option<TaskStatus>,
    #[validate(custom(function = "positive_number"))]
    pub effort_required: String,
    touched: HashSet<FormField>,
}

fn required_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Length is in UTF-16 code units, like a browser string's length.
fn task_name_rules(value: &str) -> Result<(), ValidationError> {
    required_text(value)?;
    if value.encode_utf16().count() > MAX_TASK_NAME_LEN {
        return Err(ValidationError::new("length"));
    }
    Ok(())
}

fn positive_number(value: &str) -> Result<(), ValidationError> {
    match parse_effort(value) {
        Some(effort) if effort > 0.0 => Ok(()),
        _ => Err(ValidationError::new("positive")),
    }
}

fn parse_effort(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|effort| effort.is_finite())
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            task_name: String::new(),
            description: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            status: Some(TaskStatus::Pending),
            effort_required: "0".to_string(),
            touched: HashSet::new(),
        }
    }
}

impl TaskForm {
    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::TaskName => self.task_name.clone(),
            FormField::Description => self.description.clone(),
            FormField::StartDate => self.start_date.clone(),
            FormField::EndDate => self.end_date.clone(),
            FormField::Status => self
                .status
                .map(|status| status.as_str().to_string())
                .unwrap_or_default(),
            FormField::EffortRequired => self.effort_required.clone(),
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::TaskName => self.task_name = value,
            FormField::Description => self.description = value,
            FormField::StartDate => self.start_date = value,
            FormField::EndDate => self.end_date = value,
            FormField::Status => self.status = value.parse().ok(),
            FormField::EffortRequired => self.effort_required = value,
        }
    }

    pub fn touch(&mut self, field: FormField) {
        self.touched.insert(field);
    }

    pub fn mark_all_touched(&mut self) {
        self.touched.extend(FormField::ALL);
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.contains(&field)
    }

    pub fn error(&self, field: FormField) -> Option<FieldError> {
        let errors = self.validate().err()?;
        let failures = errors.field_errors().get(field.struct_field()).copied()?;
        failures
            .first()
            .map(|failure| FieldError::from_code(&failure.code))
    }

    /// Message to render under a field: only once the user has interacted
    /// with it.
    pub fn visible_error(&self, field: FormField) -> Option<String> {
        if !self.is_touched(field) {
            return None;
        }
        self.error(field).map(|err| err.message(field))
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn reset(&mut self) {
        *self = TaskForm::default();
    }

    /// Checked only at submit time, separately from the field validators.
    pub fn end_before_start(&self) -> bool {
        match (parse_date(&self.start_date), parse_date(&self.end_date)) {
            (Some(start), Some(end)) => end < start,
            _ => false,
        }
    }

    pub fn to_dto(&self) -> Option<CreateTaskDto> {
        Some(CreateTaskDto {
            task_name: self.task_name.trim().to_string(),
            description: self.description.trim().to_string(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            status: self.status?,
            effort_required: parse_effort(&self.effort_required)?,
        })
    }
}

pub struct TaskListViewModel<A> {
    service: TaskService<A>,
    pub form: TaskForm,
    show_form: bool,
}

impl<A> Clone for TaskListViewModel<A> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            form: self.form.clone(),
            show_form: self.show_form,
        }
    }
}

impl<A: TaskApi + 'static> TaskListViewModel<A> {
    pub fn new(service: TaskService<A>) -> Self {
        Self {
            service,
            form: TaskForm::default(),
            show_form: false,
        }
    }

    pub fn service(&self) -> &TaskService<A> {
        &self.service
    }

    /// Called once when the page mounts.
    pub fn load_tasks(&self) -> impl Future<Output = Vec<Task>> + 'static {
        self.service.list_all()
    }

    pub fn show_form(&self) -> bool {
        self.show_form
    }

    pub fn toggle_form(&mut self) {
        self.show_form = !self.show_form;
    }

    pub fn total_effort(&self) -> f64 {
        self.service
            .with_tasks(|tasks| tasks.iter().map(|task| task.effort_required).sum())
    }

    pub fn cards(&self) -> Vec<TaskCard> {
        let now = Utc::now();
        self.service.with_tasks(|tasks| {
            tasks
                .iter()
                .map(|task| TaskCard::new(task.clone(), now))
                .collect()
        })
    }

    /// Runs every check that happens before a request goes out. An invalid
    /// form gets all fields marked touched so their messages show.
    pub fn prepare_submit(&mut self) -> Result<CreateTaskDto, SubmitBlocked> {
        if !self.form.is_valid() {
            self.form.mark_all_touched();
            debug!("submit blocked: form invalid");
            return Err(SubmitBlocked::Invalid);
        }
        if self.form.end_before_start() {
            debug!("submit blocked: end date before start date");
            return Err(SubmitBlocked::EndBeforeStart);
        }
        self.form.to_dto().ok_or(SubmitBlocked::Invalid)
    }

    pub fn finish_submit(&mut self, created: Option<&Task>) {
        if created.is_some() {
            self.form.reset();
            self.show_form = false;
        }
    }

    pub async fn submit(&mut self) -> Result<Option<Task>, SubmitBlocked> {
        let dto = self.prepare_submit()?;
        let created = self.service.create(dto).await;
        self.finish_submit(created.as_ref());
        Ok(created)
    }

    pub fn update_status(&self, id: TaskId) -> impl Future<Output = Option<Task>> + 'static {
        self.service.update_status(id)
    }
}
