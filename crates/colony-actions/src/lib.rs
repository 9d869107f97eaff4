//! The colony's action catalog and agent-class behaviours.
//!
//! Actions are a fixed enumeration ([`ActionKind`]) registered by name, so an
//! agent's durable assignment resolves back to the same action on the next
//! tick. Behaviours pick from them in priority order.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod behaviours;
pub mod boosting;
pub mod gather;
pub mod kind;
pub mod movement;
pub mod recycler;
pub mod remote_worker;
pub mod spend;

pub use behaviours::{behaviours, destiny_flag, BehaviourConfig};
pub use boosting::Boosting;
pub use gather::{Harvesting, Picking, Uncharging, Withdrawing};
pub use kind::{
    catalog, ActionKind, AVOIDING, BOOSTING, BUILDING, HARVESTING, PICKING, RECYCLING, REPAIRING,
    STORING, TRAVELLING, UNCHARGING, WITHDRAWING,
};
pub use movement::{flee_position, Avoiding, Idle, Recycling, Travelling, FLEE_RANGE};
pub use recycler::{Recycler, RECYCLER};
pub use remote_worker::{RemoteWorker, REMOTE_WORKER};
pub use spend::{Building, Repairing, Storing};
