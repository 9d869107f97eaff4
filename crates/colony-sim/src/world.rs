use std::collections::BTreeMap;

use colony_core::{
    AgentData, AgentState, BodyPart, Entity, EntityId, EntityKind, FlagColor, FlagInfo, PartKind,
    Position, RoomName, Work, WorkResult, WorldMut, WorldView,
};

use crate::{RoomGrid, RoomMap, SimError, Tile, ROOM_SIZE};

/// Ticks an agent lives before it expires.
pub const CREEP_LIFE_TIME: u64 = 1500;
/// Energy one carry part holds.
pub const CARRY_PER_PART: u32 = 50;
/// Storage level that counts as a charge of 1.0.
pub const DEFAULT_STORAGE_TARGET: u32 = 100_000;

#[derive(Debug, Clone)]
pub struct SimRoom {
    pub owned: bool,
    pub storage_target: u32,
    grid: RoomGrid,
}

impl SimRoom {
    pub fn grid(&self) -> &RoomGrid {
        &self.grid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    Recycled,
    Expired,
    Killed,
}

/// An agent that left the world since the last [`SimWorld::take_departed`].
#[derive(Debug, Clone, PartialEq)]
pub struct DepartedAgent {
    pub id: EntityId,
    pub name: String,
    pub data: AgentData,
    pub cause: Departure,
}

/// Reference world: rooms, objects, agents and their lifetimes.
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    time: u64,
    next_id: u64,
    rooms: BTreeMap<RoomName, SimRoom>,
    map: RoomMap,
    pub(crate) entities: BTreeMap<EntityId, Entity>,
    pub(crate) agents: BTreeMap<EntityId, AgentState>,
    expires_at: BTreeMap<EntityId, u64>,
    departed: Vec<DepartedAgent>,
    said: BTreeMap<EntityId, String>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn add_room(&mut self, name: impl Into<RoomName>, owned: bool) -> Result<(), SimError> {
        let name = name.into();
        self.map.insert(name.clone())?;
        self.rooms.insert(
            name,
            SimRoom {
                owned,
                storage_target: DEFAULT_STORAGE_TARGET,
                grid: RoomGrid::new(),
            },
        );
        Ok(())
    }

    pub fn room(&self, name: &RoomName) -> Option<&SimRoom> {
        self.rooms.get(name)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &RoomName> + '_ {
        self.rooms.keys()
    }

    fn room_mut(&mut self, name: &RoomName) -> Result<&mut SimRoom, SimError> {
        self.rooms
            .get_mut(name)
            .ok_or_else(|| SimError::UnknownRoom(name.to_string()))
    }

    pub fn set_storage_target(&mut self, room: &RoomName, target: u32) -> Result<(), SimError> {
        self.room_mut(room)?.storage_target = target.max(1);
        Ok(())
    }

    pub fn set_wall(&mut self, pos: &Position) -> Result<(), SimError> {
        let tile = Self::checked_tile(pos)?;
        self.room_mut(&pos.room)?.grid.set_blocked(tile, true);
        Ok(())
    }

    fn checked_tile(pos: &Position) -> Result<Tile, SimError> {
        let inside = (0..ROOM_SIZE).contains(&pos.x) && (0..ROOM_SIZE).contains(&pos.y);
        if !inside {
            return Err(SimError::OutOfBounds { x: pos.x, y: pos.y });
        }
        Ok(Tile::new(pos.x, pos.y))
    }

    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    pub fn add_entity(&mut self, pos: Position, kind: EntityKind) -> Result<EntityId, SimError> {
        Self::checked_tile(&pos)?;
        if !self.rooms.contains_key(&pos.room) {
            return Err(SimError::UnknownRoom(pos.room.to_string()));
        }
        let id = self.allocate_id();
        self.entities.insert(id, Entity::new(id, pos, kind));
        Ok(id)
    }

    pub fn add_flag(
        &mut self,
        name: impl Into<String>,
        pos: Position,
        color: FlagColor,
    ) -> Result<EntityId, SimError> {
        let flag = FlagInfo {
            name: name.into(),
            color,
        };
        self.add_entity(pos, EntityKind::Flag(flag))
    }

    /// Materializes an owned agent with a fresh body.
    pub fn add_agent(
        &mut self,
        name: impl Into<String>,
        pos: Position,
        body: &[PartKind],
        data: AgentData,
    ) -> Result<EntityId, SimError> {
        let name = name.into();
        if self.agent_by_name(&name).is_some() {
            return Err(SimError::DuplicateAgent(name));
        }
        Self::checked_tile(&pos)?;
        if !self.rooms.contains_key(&pos.room) {
            return Err(SimError::UnknownRoom(pos.room.to_string()));
        }

        let id = self.allocate_id();
        let carry_parts = body.iter().filter(|p| **p == PartKind::Carry).count() as u32;
        let kind = EntityKind::Creep {
            owner: String::new(),
            hostile: false,
            body: body.iter().copied().map(BodyPart::new).collect(),
        };
        self.agents.insert(
            id,
            AgentState {
                name,
                entity: Entity::new(id, pos, kind),
                carry: 0,
                carry_capacity: carry_parts * CARRY_PER_PART,
                data,
            },
        );
        self.expires_at.insert(id, self.time + CREEP_LIFE_TIME);
        Ok(id)
    }

    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut AgentState> {
        self.agents.get_mut(&id)
    }

    /// Non-agent objects only.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn kill(&mut self, id: EntityId) -> bool {
        self.depart(id, Departure::Killed)
    }

    pub(crate) fn depart(&mut self, id: EntityId, cause: Departure) -> bool {
        let Some(agent) = self.agents.remove(&id) else {
            return false;
        };
        self.expires_at.remove(&id);
        self.said.remove(&id);
        tracing::debug!(agent = %agent.name, cause = ?cause, "Agent left the world");
        self.departed.push(DepartedAgent {
            id,
            name: agent.name,
            data: agent.data,
            cause,
        });
        true
    }

    /// Starts the next tick; agents past their lifetime expire.
    pub fn advance(&mut self) -> u64 {
        self.time += 1;
        let expired: Vec<EntityId> = self
            .expires_at
            .iter()
            .filter(|(_, at)| **at <= self.time)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            self.depart(id, Departure::Expired);
        }
        self.time
    }

    pub fn take_departed(&mut self) -> Vec<DepartedAgent> {
        std::mem::take(&mut self.departed)
    }

    pub fn last_said(&self, agent: EntityId) -> Option<&str> {
        self.said.get(&agent).map(String::as_str)
    }

    /// Spawns in owned rooms, ascending id.
    pub fn spawns(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| matches!(e.kind, EntityKind::Spawn { .. }))
            .filter(|e| self.is_my_room(&e.pos.room))
            .map(|e| e.id)
            .collect()
    }

    fn room_spawn_capacity(&self, room: &RoomName) -> Option<u32> {
        self.entities
            .values()
            .filter(|e| &e.pos.room == room)
            .filter_map(|e| match &e.kind {
                EntityKind::Spawn {
                    energy_capacity, ..
                } => Some(*energy_capacity),
                _ => None,
            })
            .max()
    }
}

impl WorldView for SimWorld {
    fn agents(&self) -> Vec<EntityId> {
        self.agents.keys().copied().collect()
    }

    fn agent(&self, id: EntityId) -> Option<&AgentState> {
        self.agents.get(&id)
    }

    fn agent_by_name(&self, name: &str) -> Option<&AgentState> {
        self.agents.values().find(|a| a.name == name)
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .get(&id)
            .or_else(|| self.agents.get(&id).map(|a| &a.entity))
    }

    fn entities_in_room(&self, room: &RoomName) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| &e.pos.room == room)
            .map(|e| e.id)
            .chain(
                self.agents
                    .values()
                    .filter(|a| &a.pos().room == room)
                    .map(|a| a.id()),
            )
            .collect();
        ids.sort();
        ids
    }

    fn flags(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.as_flag().is_some())
            .map(|e| e.id)
            .collect()
    }

    fn flag(&self, name: &str) -> Option<&Entity> {
        self.entities
            .values()
            .find(|e| e.as_flag().is_some_and(|f| f.name == name))
    }

    fn distance(&self, a: &Position, b: &Position) -> u32 {
        if let Some(range) = a.range_to(b) {
            return range;
        }
        match self.route_range(&a.room, &b.room) {
            Some(rooms) => rooms * ROOM_SIZE as u32,
            None => u32::MAX,
        }
    }

    fn route_range(&self, from: &RoomName, to: &RoomName) -> Option<u32> {
        self.map.route(from, to).map(|route| route.len() as u32)
    }

    fn is_my_room(&self, room: &RoomName) -> bool {
        self.rooms.get(room).is_some_and(|r| r.owned)
    }

    fn rally_point(&self, room: &RoomName) -> Option<EntityId> {
        let in_room = || self.entities.values().filter(move |e| &e.pos.room == room);
        in_room()
            .find(|e| e.as_flag().is_some_and(|f| f.color == FlagColor::IDLE))
            .or_else(|| in_room().find(|e| matches!(e.kind, EntityKind::Spawn { .. })))
            .map(|e| e.id)
    }

    fn storage_charge(&self, room: &RoomName) -> Option<f64> {
        let target = self.rooms.get(room)?.storage_target;
        self.entities
            .values()
            .filter(|e| &e.pos.room == room)
            .find_map(|e| match e.kind {
                EntityKind::Storage { energy, .. } => Some(f64::from(energy) / f64::from(target)),
                _ => None,
            })
    }

    fn find_spawn_room(
        &self,
        target_room: &RoomName,
        min_energy_capacity: u32,
    ) -> Option<RoomName> {
        self.rooms
            .iter()
            .filter(|(_, room)| room.owned)
            .filter(|(name, _)| {
                self.room_spawn_capacity(name)
                    .is_some_and(|cap| cap >= min_energy_capacity)
            })
            .filter_map(|(name, _)| {
                self.route_range(name, target_room)
                    .map(|range| (range, name))
            })
            .min()
            .map(|(_, name)| name.clone())
    }
}

impl WorldMut for SimWorld {
    fn agent_data_mut(&mut self, id: EntityId) -> Option<&mut AgentData> {
        self.agents.get_mut(&id).map(|a| &mut a.data)
    }

    fn move_to(&mut self, agent: EntityId, target: &Position, range: u32) {
        let Some(state) = self.agents.get(&agent) else {
            return;
        };
        if !state.has_active_bodyparts(PartKind::Move) {
            tracing::trace!(agent = %state.name, "Cannot move without move parts");
            return;
        }
        let from = state.pos().clone();
        let Some(room) = self.rooms.get(&from.room) else {
            return;
        };
        let tile = Tile::new(from.x, from.y);

        let next = if from.room == target.room {
            room.grid
                .next_step(tile, Tile::new(target.x, target.y), range)
                .map(|t| Position::new(from.room.clone(), t.x, t.y))
        } else {
            let Some(next_room) = self
                .map
                .route(&from.room, &target.room)
                .and_then(|route| route.into_iter().next())
            else {
                tracing::trace!(agent = %state.name, to = %target.room, "No route");
                return;
            };
            let Some(exit) = self.map.exit_towards(&from.room, &next_room) else {
                return;
            };
            if exit.contains(tile) {
                let arrival = exit.arrival(tile);
                Some(Position::new(next_room, arrival.x, arrival.y))
            } else {
                room.grid
                    .find_path(tile, |t| exit.contains(t), |t| exit.steps_from(t))
                    .and_then(|path| path.get(1).copied())
                    .map(|t| Position::new(from.room.clone(), t.x, t.y))
            }
        };

        if let (Some(next), Some(state)) = (next, self.agents.get_mut(&agent)) {
            state.entity.pos = next;
        }
    }

    /// Steps off room edges so waiting agents do not bounce between rooms.
    fn idle_move(&mut self, agent: EntityId) {
        let Some(state) = self.agents.get_mut(&agent) else {
            return;
        };
        let pos = &mut state.entity.pos;
        if Tile::new(pos.x, pos.y).is_edge() {
            pos.x = pos.x.clamp(1, ROOM_SIZE - 2);
            pos.y = pos.y.clamp(1, ROOM_SIZE - 2);
        }
    }

    fn perform(&mut self, agent: EntityId, work: Work, target: EntityId) -> WorkResult {
        self.apply_work(agent, work, target)
    }

    fn say(&mut self, agent: EntityId, message: &str) {
        tracing::trace!(agent = %agent, message, "say");
        self.said.insert(agent, message.to_string());
    }
}
