//! Translation from raw backend records into canonical [`Task`] values.
//!
//! Every field is read snake_case first, then camelCase, then defaulted.
//! Nothing here fails: a malformed record degrades to defaults instead of
//! being rejected.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::model::{RawTask, Task, TaskId, TaskStatus};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A task plus fields derived for display at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDisplay {
    #[serde(flatten)]
    pub task: Task,
    pub is_overdue: bool,
    /// `None` when the end date cannot be parsed.
    pub days_remaining: Option<i64>,
}

pub fn normalize(raw: &RawTask) -> Task {
    Task {
        id: raw.field(&["id"]).map(as_id).unwrap_or_default(),
        task_name: string_field(raw, &["task_name", "taskName"]),
        description: string_field(raw, &["description"]),
        start_date: string_field(raw, &["start_date", "startDate"]),
        end_date: string_field(raw, &["end_date", "endDate"]),
        status: raw
            .field(&["status"])
            .and_then(Value::as_str)
            .map(TaskStatus::from_lenient)
            .unwrap_or_default(),
        effort_required: raw
            .field(&["effort_required", "effortRequired"])
            .map(as_number)
            .unwrap_or_default(),
        created_at: raw.field(&["created_at", "createdAt"]).and_then(as_string),
    }
}

pub fn normalize_list(raw: &[RawTask]) -> Vec<Task> {
    raw.iter().map(normalize).collect()
}

pub fn derive_display(task: &Task, now: DateTime<Utc>) -> TaskDisplay {
    let days_remaining = parse_date(&task.end_date).map(|end| {
        let millis = (end - now).num_milliseconds();
        // ceil for a positive divisor
        -(-millis).div_euclid(MILLIS_PER_DAY)
    });
    let is_overdue = matches!(days_remaining, Some(days) if days < 0) && !task.is_completed();

    TaskDisplay {
        task: task.clone(),
        is_overdue,
        days_remaining,
    }
}

/// Accepts `YYYY-MM-DD` (taken as UTC midnight) or an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn string_field(raw: &RawTask, keys: &[&str]) -> String {
    raw.field(keys).and_then(as_string).unwrap_or_default()
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite()).unwrap_or_default()
}

fn as_id(value: &Value) -> TaskId {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as TaskId))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}
