use crate::{AgentData, AgentState, Entity, EntityId, Position, RoomName};

/// Read-only world access.
///
/// The world owns agents and entities; the decision loop only reads them and
/// writes an agent's [`AgentData`] through [`WorldMut`]. Every query reflects
/// the current tick and must not be cached across ticks by callers.
pub trait WorldView {
    /// Live agents in ascending id order.
    fn agents(&self) -> Vec<EntityId>;

    fn agent(&self, id: EntityId) -> Option<&AgentState>;

    fn agent_by_name(&self, name: &str) -> Option<&AgentState>;

    /// Any object, agents included.
    fn entity(&self, id: EntityId) -> Option<&Entity>;

    /// Objects reachable from inside `room`, in discovery order.
    fn entities_in_room(&self, room: &RoomName) -> Vec<EntityId>;

    /// Every flag, in discovery order.
    fn flags(&self) -> Vec<EntityId>;

    fn flag(&self, name: &str) -> Option<&Entity>;

    /// Travel distance. Unreachable targets report `u32::MAX`.
    fn distance(&self, a: &Position, b: &Position) -> u32;

    /// Number of rooms between two rooms along the route.
    fn route_range(&self, from: &RoomName, to: &RoomName) -> Option<u32>;

    fn is_my_room(&self, room: &RoomName) -> bool;

    /// Where an agent with nothing to do should wait.
    fn rally_point(&self, room: &RoomName) -> Option<EntityId>;

    /// Storage fill level relative to the room's target level, if the room has a storage.
    fn storage_charge(&self, room: &RoomName) -> Option<f64>;

    /// Proposes an owned room able to produce agents for `target_room`.
    fn find_spawn_room(&self, target_room: &RoomName, min_energy_capacity: u32) -> Option<RoomName>;

    fn position_of(&self, id: EntityId) -> Option<Position> {
        self.entity(id).map(|e| e.pos.clone())
    }
}

/// Units of domain work an action can ask the world to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Work {
    Harvest,
    Pickup,
    Withdraw,
    Transfer,
    Build,
    Repair,
    Boost,
    Recycle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkResult {
    Ok,
    NotInRange,
    /// The target has nothing left to give or take.
    Exhausted,
    /// The agent cannot carry more.
    Full,
    /// The agent has nothing to spend.
    Empty,
    InvalidTarget,
    NoBodypart,
}

impl WorkResult {
    pub fn is_ok(self) -> bool {
        self == WorkResult::Ok
    }
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {
    fn agent_data_mut(&mut self, id: EntityId) -> Option<&mut AgentData>;

    /// Moves the agent one step towards `target`, stopping at `range`.
    fn move_to(&mut self, agent: EntityId, target: &Position, range: u32);

    /// Random-walk style shuffle used while waiting.
    fn idle_move(&mut self, agent: EntityId);

    fn perform(&mut self, agent: EntityId, work: Work, target: EntityId) -> WorkResult;

    fn say(&mut self, _agent: EntityId, _message: &str) {}
}
