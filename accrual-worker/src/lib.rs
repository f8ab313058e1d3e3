//! Accrual Worker - loyalty accrual reconciliation engine
//!
//! Periodically finds orders still waiting for an accrual decision, asks the
//! external accrual authority about each one on a bounded worker pool, and
//! writes the decision back to order and balance storage.
//!
//! # 模块结构
//!
//! - [`core`] - 配置、后台任务、工作池
//! - [`accrual`] - 对账循环、在途登记、解析状态机
//! - [`storage`] - 存储端口与内存实现
//! - [`utils`] - 日志

pub mod accrual;
pub mod core;
pub mod storage;
pub mod utils;

// Re-export public types
pub use accrual::{AccrualService, CycleReport, OrderResolver, Reconciler, Resolution, ResolveError};
pub use crate::core::{BackgroundTasks, Config, TaskKind, WorkerPool};
pub use storage::{BalanceStore, MemoryStore, OrderStore, SeedData, StorageError};
