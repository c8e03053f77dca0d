//! Client side of the task board: a typed HTTP client for the task API and a
//! locally cached task list that only changes once the server confirms.

pub mod api;
pub mod board;
pub mod cache;
pub mod task;

pub use api::{ClientError, HttpTaskApi, TaskApi};
pub use board::{Confirm, DeleteOutcome, TaskBoard};
pub use cache::{CacheAction, LoadState, TaskCache};
pub use task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};
