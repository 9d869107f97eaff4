//! Deterministic in-memory world for the colony decision loop.
//!
//! [`SimWorld`] implements the world collaborator traits with rooms on a
//! 50x50 grid, work effects and agent lifetimes; [`SpawnQueue`] implements the
//! creation-request subsystem on top of it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod room;
pub mod spawner;
pub mod work;
pub mod world;

pub use room::{room_coords, Exit, RoomGrid, RoomMap, Tile, ROOM_SIZE};
pub use spawner::{body_cost, build_body, part_cost, SpawnEvent, SpawnQueue, SPAWN_TIME_PER_PART};
pub use work::{hits_max, work_range};
pub use world::{
    DepartedAgent, Departure, SimRoom, SimWorld, CARRY_PER_PART, CREEP_LIFE_TIME,
    DEFAULT_STORAGE_TARGET,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("invalid room name `{0}`")]
    InvalidRoomName(String),
    #[error("unknown room `{0}`")]
    UnknownRoom(String),
    #[error("agent `{0}` already exists")]
    DuplicateAgent(String),
    #[error("tile {x},{y} is outside the room")]
    OutOfBounds { x: i32, y: i32 },
}
