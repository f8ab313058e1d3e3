//! Core runtime pieces: configuration, task supervision and the worker pool

pub mod config;
pub mod pool;
pub mod tasks;

pub use config::Config;
pub use pool::{PoolError, Task, TaskQueue, WorkerPool};
pub use tasks::{BackgroundTasks, TaskKind};
