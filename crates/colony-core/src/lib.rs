//! Deterministic per-tick decision primitives.
//!
//! Every tick an agent's [`Behaviour`] validates its durable assignment,
//! picks a new [`Action`] in priority order when needed and steps it once.
//! Capacity per target is enforced through the [`TickCache`] ledger, which is
//! rebuilt from live assignments at the start of every tick.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod agent;
pub mod behaviour;
pub mod boost;
pub mod entity;
pub mod events;
pub mod hysteresis;
pub mod registry;
pub mod spawn;
pub mod tick;
pub mod world;

pub use action::{bind, nearest_target, unbind, Action, ActionKey, IDLE};
pub use agent::{AgentData, AgentState, Assignment, Destiny};
pub use behaviour::{
    assign_first, assign_idle, validate_assignment, Behaviour, BehaviourRegistry, WindDown,
};
pub use boost::{boost_part, is_boost_compound, LAB_BOOST_ENERGY, LAB_BOOST_MINERAL};
pub use entity::{
    BodyPart, Color, Entity, EntityId, EntityKind, FlagColor, FlagInfo, PartKind, Position,
    RoomName, StructureType,
};
pub use events::{EventBus, EventHandler, EventQueue};
pub use hysteresis::HysteresisSet;
pub use registry::{ActionRegistry, RegistryError};
pub use spawn::{
    CreationQueue, CreationRequest, CreatureTemplate, QueuePriority, QueuedRequest, SpawnParams,
};
pub use tick::{AssignmentLedger, TickCache, TickContext};
pub use world::{Work, WorkResult, WorldMut, WorldView};
