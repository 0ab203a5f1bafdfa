//! Server-side tasks.
//!
//! Every `async_*` call returns a [`Ref<Task>`]. The task's record says whether
//! the operation is still running, its result once it succeeded and the
//! failure it raised otherwise.

use crate::connection::Connection;
use crate::framework::{Failure, FromValue, Ref, Result, Value};
use crate::model::{Host, TaskAllowedOperations, TaskStatusType};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

xenapi_class! {
    /// A long-running server-side operation.
    pub class Task = "task";

    pub record TaskRecord {
        ro uuid: String = "uuid";
        ro name_label: String = "name_label";
        ro name_description: String = "name_description";
        ro allowed_operations: Vec<TaskAllowedOperations> = "allowed_operations";
        ro current_operations: HashMap<String, TaskAllowedOperations> = "current_operations";
        ro created: DateTime<Utc> = "created";
        ro finished: DateTime<Utc> = "finished";
        ro status: TaskStatusType = "status";
        ro resident_on: Ref<Host> = "resident_on";
        ro progress: f64 = "progress";
        ro task_type: String = "type";
        /// The result, wrapped as `<value>...</value>`.
        ro result: String = "result";
        /// Error code followed by its parameters when the task failed.
        ro error_info: Vec<String> = "error_info";
        map other_config: HashMap<String, String> = "other_config";
        ro subtask_of: Ref<Task> = "subtask_of";
        ro subtasks: Vec<Ref<Task>> = "subtasks";
        ro backtrace: String = "backtrace";
    }
}

xenapi_methods! {
    impl Task = "task" {
        fn get_all() -> Vec<Ref<Task>>;
        fn get_all_records() -> HashMap<Ref<Task>, TaskRecord>;
        fn get_by_name_label(label: &str) -> Vec<Ref<Task>>;
        fn create(label: &str, description: &str) -> Ref<Task>;
        fn destroy(this: &Ref<Task>) -> ();
        task fn cancel(this: &Ref<Task>) -> (), raises [OperationNotAllowed];
    }
}

impl Task {
    /// Polls `task` until it leaves the pending state and returns its final
    /// record. A failed or cancelled task is returned as its [`Failure`].
    pub async fn wait(conn: &Connection, task: &Ref<Task>, poll_interval: Duration) -> Result<TaskRecord> {
        loop {
            let record = Task::get_record(conn, task).await?;
            match record.status {
                TaskStatusType::Pending | TaskStatusType::Cancelling => {
                    debug!(%task, progress = record.progress, "Task still running");
                    tokio::time::sleep(poll_interval).await;
                }
                TaskStatusType::Failure | TaskStatusType::Cancelled => {
                    let failure = record
                        .failure()
                        .unwrap_or_else(|| Failure::new("TASK_CANCELLED", vec![task.to_string()]));
                    return Err(failure.into());
                }
                _ => return Ok(record),
            }
        }
    }
}

impl TaskRecord {
    /// The failure a finished task reported, if any.
    pub fn failure(&self) -> Option<Failure> {
        let (code, params) = self.error_info.split_first()?;
        Some(Failure::new(code.as_str(), params.to_vec()))
    }

    /// The result with its `<value>` wrapper removed.
    pub fn result_text(&self) -> &str {
        let trimmed = self.result.trim();
        trimmed
            .strip_prefix("<value>")
            .and_then(|s| s.strip_suffix("</value>"))
            .unwrap_or(trimmed)
    }

    /// Decodes the result as `T`. Only scalar results (references, strings,
    /// numbers) survive the text form the server stores.
    pub fn result_as<T: FromValue>(&self) -> Result<T> {
        T::from_value(&Value::from(self.result_text()))
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self.status,
            TaskStatusType::Pending | TaskStatusType::Cancelling
        )
    }
}
