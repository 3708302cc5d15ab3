use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use shared::{Task, TaskId, TaskStatus};
use tracing::{debug, info, warn};
use web_sys::{console, window};

pub mod config;
pub mod http;
pub mod logging;
pub mod service;
pub mod task_card;
pub mod task_list;

#[cfg(test)]
mod test_support;

use crate::config::AppConfig;
use crate::http::FetchApi;
use crate::service::TaskService;
use crate::task_list::{FormField, SubmitBlocked, TaskListViewModel};

#[derive(Debug, Clone)]
pub enum Msg {
    LoadTasks,
    TasksLoaded(usize),
    ToggleForm,
    SetField(FormField, String),
    TouchField(FormField),
    SubmitForm,
    TaskCreated(Option<Task>),
    UpdateStatus(TaskId),
    StatusUpdated(TaskId, Option<Task>),
    DismissError,
}

#[derive(Clone)]
pub struct Model {
    tasks: TaskListViewModel<FetchApi>,
}

impl Model {
    pub fn new(config: AppConfig) -> Self {
        let service = TaskService::new(FetchApi::new(config));
        Self {
            tasks: TaskListViewModel::new(service),
        }
    }
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        Cmd::new(async { Msg::LoadTasks })
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::LoadTasks => {
                let request = self.tasks.load_tasks();
                Cmd::new(async move { Msg::TasksLoaded(request.await.len()) })
            }
            Msg::TasksLoaded(count) => {
                debug!(count, "task list refreshed");
                Cmd::none()
            }
            Msg::ToggleForm => {
                self.tasks.toggle_form();
                Cmd::none()
            }
            Msg::SetField(field, value) => {
                self.tasks.form.set(field, value);
                Cmd::none()
            }
            Msg::TouchField(field) => {
                self.tasks.form.touch(field);
                Cmd::none()
            }
            Msg::SubmitForm => match self.tasks.prepare_submit() {
                Ok(dto) => {
                    let request = self.tasks.service().create(dto);
                    Cmd::new(async move { Msg::TaskCreated(request.await) })
                }
                Err(SubmitBlocked::EndBeforeStart) => {
                    alert(&SubmitBlocked::EndBeforeStart.to_string());
                    Cmd::none()
                }
                Err(SubmitBlocked::Invalid) => Cmd::none(),
            },
            Msg::TaskCreated(created) => {
                self.tasks.finish_submit(created.as_ref());
                Cmd::none()
            }
            Msg::UpdateStatus(id) => {
                let request = self.tasks.update_status(id);
                Cmd::new(async move { Msg::StatusUpdated(id, request.await) })
            }
            Msg::StatusUpdated(id, updated) => {
                match updated {
                    Some(task) => debug!(id, status = %task.status, "status change applied"),
                    None => warn!(id, "status change failed"),
                }
                Cmd::none()
            }
            Msg::DismissError => {
                self.tasks.service().clear_error();
                Cmd::none()
            }
        }
    }

    fn view(&self) -> Node<Msg> {
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text")],
            [
                self.view_header(),
                div(
                    [class("max-w-4xl mx-auto px-4 py-8 space-y-6")],
                    [
                        self.view_error(),
                        self.view_toolbar(),
                        if self.tasks.show_form() {
                            self.view_create_form()
                        } else {
                            span([], [])
                        },
                        self.view_task_list(),
                    ],
                ),
            ],
        )
    }
}

impl Model {
    fn view_header(&self) -> Node<Msg> {
        let count = self.tasks.service().with_tasks(|tasks| tasks.len());
        header(
            [class("bg-ctp-mantle border-b border-ctp-surface0")],
            [div(
                [class("max-w-4xl mx-auto px-4 py-6 flex items-center justify-between")],
                [
                    h1([class("text-2xl font-bold text-ctp-text")], [text("Task Board")]),
                    div([class("flex gap-4")], [
                        self.stat_card("Tasks", &count.to_string()),
                        self.stat_card("Total effort", &self.tasks.total_effort().to_string()),
                    ]),
                ],
            )],
        )
    }

    fn stat_card(&self, card_title: &str, value: &str) -> Node<Msg> {
        div([class("bg-ctp-surface0 rounded-lg px-4 py-2 text-center border border-ctp-surface1")], [
            p([class("text-xs font-medium text-ctp-subtext0")], [text(card_title)]),
            p([class("text-xl font-bold text-ctp-text")], [text(value)]),
        ])
    }

    fn view_error(&self) -> Node<Msg> {
        match self.tasks.service().error() {
            Some(message) => div(
                [class("flex items-center justify-between p-4 rounded-lg bg-ctp-red/20 text-ctp-red border border-ctp-red")],
                [
                    span([], [text(&message)]),
                    button(
                        [
                            r#type("button"),
                            on_click(|_| Msg::DismissError),
                            class("text-sm font-medium underline"),
                        ],
                        [text("Dismiss")],
                    ),
                ],
            ),
            None => span([], []),
        }
    }

    fn view_toolbar(&self) -> Node<Msg> {
        let loading = self.tasks.service().loading();
        div([class("flex items-center justify-between")], [
            button(
                [
                    r#type("button"),
                    on_click(|_| Msg::ToggleForm),
                    class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-2 rounded-md transition-colors duration-200"),
                ],
                [text(if self.tasks.show_form() { "Cancel" } else { "New Task" })],
            ),
            div([class("flex items-center gap-3")], [
                if loading {
                    span([class("animate-spin text-ctp-blue")], [text("◐")])
                } else {
                    span([], [])
                },
                button(
                    [
                        r#type("button"),
                        on_click(|_| Msg::LoadTasks),
                        class("text-sm text-ctp-subtext1 hover:text-ctp-text"),
                        disabled(loading),
                    ],
                    [text("Refresh")],
                ),
            ]),
        ])
    }

    fn view_create_form(&self) -> Node<Msg> {
        div(
            [class("p-6 bg-ctp-surface1 rounded-lg border border-ctp-surface2")],
            [
                h2([class("text-xl font-semibold text-ctp-text mb-4 pb-2 border-b border-ctp-surface2")], [text("Add New Task")]),
                div([class("space-y-4")], [
                    self.form_input(FormField::TaskName, "text"),
                    self.form_textarea(FormField::Description),
                    div([class("grid grid-cols-2 gap-4")], [
                        self.form_input(FormField::StartDate, "date"),
                        self.form_input(FormField::EndDate, "date"),
                    ]),
                    div([class("grid grid-cols-2 gap-4")], [
                        self.form_status(),
                        self.form_input(FormField::EffortRequired, "number"),
                    ]),
                    button([
                        r#type("button"),
                        on_click(|_| Msg::SubmitForm),
                        disabled(self.tasks.service().loading()),
                        class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-2 rounded-md transition-colors duration-200"),
                    ], [text("Add Task")]),
                ]),
            ],
        )
    }

    fn form_input(&self, field: FormField, input_type: &'static str) -> Node<Msg> {
        self.form_row(
            field,
            input([
                r#type(input_type),
                id(field.key()),
                placeholder(field.label()),
                value(self.tasks.form.value(field)),
                on_input(move |event| Msg::SetField(field, event.value())),
                on_blur(move |_| Msg::TouchField(field)),
                class(field_class(self.tasks.form.visible_error(field).is_some())),
            ], []),
        )
    }

    fn form_textarea(&self, field: FormField) -> Node<Msg> {
        self.form_row(
            field,
            textarea([
                id(field.key()),
                placeholder(field.label()),
                value(self.tasks.form.value(field)),
                on_input(move |event| Msg::SetField(field, event.value())),
                on_blur(move |_| Msg::TouchField(field)),
                class(&format!("{} h-20 resize-y", field_class(self.tasks.form.visible_error(field).is_some()))),
            ], []),
        )
    }

    fn form_status(&self) -> Node<Msg> {
        let field = FormField::Status;
        let current = self.tasks.form.status;
        self.form_row(
            field,
            select(
                [
                    id(field.key()),
                    on_input(move |event| Msg::SetField(field, event.value())),
                    on_blur(move |_| Msg::TouchField(field)),
                    class(field_class(self.tasks.form.visible_error(field).is_some())),
                ],
                TaskStatus::ALL
                    .iter()
                    .map(|status| {
                        option(
                            [value(status.as_str()), selected(current == Some(*status))],
                            [text(status.label())],
                        )
                    })
                    .collect::<Vec<_>>(),
            ),
        )
    }

    fn form_row(&self, field: FormField, control: Node<Msg>) -> Node<Msg> {
        div([class("space-y-1")], [
            label([class("block text-sm font-medium text-ctp-subtext1")], [text(field.label())]),
            control,
            match self.tasks.form.visible_error(field) {
                Some(message) => p([class("text-sm text-ctp-red")], [text(&message)]),
                None => span([], []),
            },
        ])
    }

    fn view_task_list(&self) -> Node<Msg> {
        let cards = self.tasks.cards();
        if cards.is_empty() {
            return div([class("text-center py-12")], [
                h3([class("text-lg font-medium text-ctp-text mb-2")], [text("No tasks yet")]),
                p([class("text-ctp-subtext0")], [text("Create a new one above to get started!")]),
            ]);
        }
        div(
            [class("space-y-4")],
            cards.iter().map(|card| card.view()).collect::<Vec<_>>(),
        )
    }
}

fn field_class(has_error: bool) -> String {
    format!(
        "w-full px-3 py-2 bg-ctp-surface0 border rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue {}",
        if has_error { "border-ctp-red" } else { "border-ctp-surface2" }
    )
}

fn alert(message: &str) {
    if let Some(window) = window() {
        let _ = window.alert_with_message(message);
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::load().unwrap_or_else(|err| {
        console::error_1(&format!("{}; using defaults", err).into());
        AppConfig::default()
    });
    logging::init(config.log_level);
    info!(api = %config.api_base_url, "task board starting");
    Program::mount_to_body(Model::new(config));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_form_view_builds_every_input() {
        let mut model = Model::new(AppConfig::default());
        model.tasks.toggle_form();
        model.tasks.form.mark_all_touched();
        let _ = model.view_create_form();
        let _ = model.view();
    }
}
