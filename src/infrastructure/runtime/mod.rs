//! Runtime infrastructure - Tokio runtime bridge for async operations

mod bridge;
mod worker;

pub use bridge::{NoticeLevel, RuntimeBridge, RuntimeCommand, RuntimeEvent, SessionEvent};
pub use worker::{run_async_worker, run_sessions, WorkerSettings};
