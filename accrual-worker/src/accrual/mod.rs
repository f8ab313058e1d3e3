//! Accrual reconciliation
//!
//! ```text
//! Reconciler --claim--> InFlightRegistry
//!     |
//!     +--submit--> WorkerPool --> OrderResolver --> AccrualApi
//!                                      |
//!                                      +--> BalanceStore, then OrderStore
//! ```

pub mod error;
pub mod pipeline;
pub mod reconciler;
pub mod registry;
pub mod service;
pub mod transition;

pub use error::ResolveError;
pub use pipeline::{OrderResolver, Resolution};
pub use reconciler::{CycleReport, PollSettings, Reconciler};
pub use registry::{Claim, ClaimStore, InFlightRegistry};
pub use service::AccrualService;
pub use transition::{RetryPolicy, RetryReason, Transition, next_transition};
