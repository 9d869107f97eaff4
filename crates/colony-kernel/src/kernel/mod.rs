//! Kernel - the per-tick loop and the handlers draining its event queue.

mod dispatcher;
mod events;
mod runner;

pub use dispatcher::{Colony, Journal, TaskDispatcher};
pub use events::{TickEvent, TickReport};
pub use runner::Kernel;
