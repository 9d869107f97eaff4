use std::collections::BTreeMap;

use crate::{EntityId, RoomName, WorldView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    pub tick: u64,
}

impl TickContext {
    pub fn new(tick: u64) -> Self {
        Self { tick }
    }
}

/// Live count of agents per `(action, target)` pair.
///
/// Seeded from every agent's durable assignment when the tick starts and kept
/// in step with every bind/unbind during the pass, so capacity checks see the
/// choices of agents processed earlier in the same tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentLedger {
    counts: BTreeMap<(String, EntityId), usize>,
    by_agent: BTreeMap<EntityId, (String, EntityId)>,
}

impl AssignmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_world<W: WorldView + ?Sized>(world: &W) -> Self {
        let mut ledger = Self::new();
        for id in world.agents() {
            let Some(agent) = world.agent(id) else {
                continue;
            };
            if let Some(assignment) = &agent.data.assignment {
                if let Some(target) = assignment.target {
                    ledger.record(id, &assignment.action, target);
                }
            }
        }
        ledger
    }

    pub fn count(&self, action: &str, target: EntityId) -> usize {
        self.counts
            .get(&(action.to_string(), target))
            .copied()
            .unwrap_or(0)
    }

    pub fn current(&self, agent: EntityId) -> Option<(&str, EntityId)> {
        self.by_agent
            .get(&agent)
            .map(|(action, target)| (action.as_str(), *target))
    }

    /// Records `agent` against `(action, target)`, releasing its previous slot.
    pub fn record(&mut self, agent: EntityId, action: &str, target: EntityId) {
        self.release(agent);
        *self
            .counts
            .entry((action.to_string(), target))
            .or_insert(0) += 1;
        self.by_agent.insert(agent, (action.to_string(), target));
    }

    pub fn release(&mut self, agent: EntityId) {
        let Some(key) = self.by_agent.remove(&agent) else {
            return;
        };
        if let Some(count) = self.counts.get_mut(&key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.counts.remove(&key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_agent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_agent.is_empty()
    }
}

/// Everything derived during one tick. Built fresh at the start of every tick
/// and dropped at its end; nothing in here is valid across a tick boundary.
#[derive(Debug, Default)]
pub struct TickCache {
    assignments: AssignmentLedger,
    room_entities: BTreeMap<RoomName, Vec<EntityId>>,
    hostiles: BTreeMap<RoomName, Vec<EntityId>>,
}

impl TickCache {
    pub fn new<W: WorldView + ?Sized>(world: &W) -> Self {
        Self {
            assignments: AssignmentLedger::from_world(world),
            room_entities: BTreeMap::new(),
            hostiles: BTreeMap::new(),
        }
    }

    pub fn assignments(&self) -> &AssignmentLedger {
        &self.assignments
    }

    pub fn assignments_mut(&mut self) -> &mut AssignmentLedger {
        &mut self.assignments
    }

    /// Memoized [`WorldView::entities_in_room`].
    pub fn room_entities<W: WorldView + ?Sized>(
        &mut self,
        world: &W,
        room: &RoomName,
    ) -> Vec<EntityId> {
        self.room_entities
            .entry(room.clone())
            .or_insert_with(|| world.entities_in_room(room))
            .clone()
    }

    /// Memoized hostile creeps of a room, in discovery order.
    pub fn hostiles<W: WorldView + ?Sized>(&mut self, world: &W, room: &RoomName) -> Vec<EntityId> {
        if let Some(ids) = self.hostiles.get(room) {
            return ids.clone();
        }
        let ids: Vec<EntityId> = self
            .room_entities(world, room)
            .into_iter()
            .filter(|id| world.entity(*id).is_some_and(|e| e.is_hostile()))
            .collect();
        self.hostiles.insert(room.clone(), ids.clone());
        ids
    }
}
