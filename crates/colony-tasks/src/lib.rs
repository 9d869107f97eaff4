//! Task lifecycle: converts demand for agents into bounded creation requests
//! and tracks every requested agent through `queued -> spawning -> running`.
//!
//! Task instances live in a [`TaskStore`] keyed by task name and context key.
//! Reconciliation against the creation subsystem happens every time a trigger
//! is checked, so stale entries never hold back new requests.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod delivery;
pub mod memory;
pub mod task;

pub use delivery::{DeliveryConfig, DeliveryTask, DELIVERY};
pub use memory::{TaskMemory, TaskStore};
pub use task::{Task, TaskEnv, TaskRegistry};
