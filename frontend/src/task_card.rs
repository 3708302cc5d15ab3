use chrono::{DateTime, Utc};
use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use shared::{adapter, Task, TaskDisplay, TaskId, TaskStatus};

use crate::Msg;

/// Display state for one task. Flags are computed once, at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCard {
    display: TaskDisplay,
}

impl TaskCard {
    pub fn new(task: Task, now: DateTime<Utc>) -> Self {
        Self {
            display: adapter::derive_display(&task, now),
        }
    }

    pub fn task(&self) -> &Task {
        &self.display.task
    }

    pub fn is_overdue(&self) -> bool {
        self.display.is_overdue
    }

    pub fn is_completed(&self) -> bool {
        self.display.task.is_completed()
    }

    pub fn days_remaining(&self) -> Option<i64> {
        self.display.days_remaining
    }

    /// The card never talks to the service; the parent decides what a
    /// status update means.
    pub fn request_status_update(&self) -> TaskId {
        self.display.task.id
    }

    pub fn deadline_hint(&self) -> Option<String> {
        if self.is_completed() {
            return None;
        }
        let days = self.days_remaining()?;
        Some(match days {
            d if d < -1 => format!("Overdue by {} days", -d),
            -1 => "Overdue by 1 day".to_string(),
            0 => "Due today".to_string(),
            1 => "1 day left".to_string(),
            d => format!("{} days left", d),
        })
    }

    pub fn view(&self) -> Node<Msg> {
        let task = self.task();
        let task_id = self.request_status_update();
        let badge = match task.status {
            TaskStatus::Pending => "bg-ctp-yellow/20 text-ctp-yellow",
            TaskStatus::InProgress => "bg-ctp-blue/20 text-ctp-blue",
            TaskStatus::Completed => "bg-ctp-green/20 text-ctp-green",
        };

        div(
            [
                key(task.id.to_string()),
                class(&format!(
                    "border rounded-xl p-6 bg-ctp-surface0 shadow-sm transition-all duration-300 {}",
                    if self.is_overdue() {
                        "border-ctp-red"
                    } else if self.is_completed() {
                        "border-ctp-green bg-ctp-green/10"
                    } else {
                        "border-ctp-surface1 hover:border-ctp-blue"
                    }
                )),
            ],
            [
                div([class("flex items-start justify-between gap-4")], [
                    div([class("flex-1 min-w-0")], [
                        h3(
                            [class(&format!(
                                "text-lg font-semibold mb-2 {}",
                                if self.is_completed() {
                                    "line-through text-ctp-overlay1"
                                } else {
                                    "text-ctp-text"
                                }
                            ))],
                            [text(&task.task_name)],
                        ),
                        p(
                            [class("text-sm leading-relaxed break-words text-ctp-subtext1")],
                            [text(&task.description)],
                        ),
                    ]),
                    span(
                        [class(&format!(
                            "inline-flex items-center px-2 py-1 rounded-full text-xs font-medium {}",
                            badge
                        ))],
                        [text(task.status.label())],
                    ),
                ]),
                div([class("mt-4 flex flex-wrap gap-4 text-sm text-ctp-subtext0")], [
                    span([], [text(&format!("{} → {}", task.start_date, task.end_date))]),
                    span([], [text(&format!("Effort: {}", task.effort_required))]),
                    match self.deadline_hint() {
                        Some(hint) => span(
                            [class(if self.is_overdue() {
                                "text-ctp-red font-medium"
                            } else {
                                "text-ctp-subtext1"
                            })],
                            [text(&hint)],
                        ),
                        None => span([], []),
                    },
                ]),
                div([class("mt-4")], [button(
                    [
                        r#type("button"),
                        on_click(move |_| Msg::UpdateStatus(task_id)),
                        class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-4 py-2 rounded-md transition-colors duration-200"),
                    ],
                    [text("Update status")],
                )]),
            ],
        )
    }
}
