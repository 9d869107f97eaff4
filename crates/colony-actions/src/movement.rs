//! Actions that mostly move the agent around: waiting, fleeing, travelling
//! and heading home to be recycled.

use colony_core::{
    nearest_target, unbind, Action, ActionKey, AgentState, Entity, EntityId, EntityKind,
    Position, TickCache, TickContext, Work, WorkResult, WorldMut, IDLE,
};

use crate::{AVOIDING, RECYCLING, TRAVELLING};

/// Hostiles closer than this make an agent flee.
pub const FLEE_RANGE: u32 = 4;
const FLEE_DISTANCE: i32 = 5;

/// Waits at the room's rally point, or in place when there is none.
///
/// Always assignable. The assignment survives its step so every agent holds
/// one between ticks; behaviours replace it on their next pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl<W> Action<W> for Idle
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        IDLE
    }

    fn target_range(&self) -> u32 {
        3
    }

    fn is_valid_target(&self, _target: &Entity, _agent: &AgentState, _world: &W) -> bool {
        true
    }

    fn is_addable_target(
        &self,
        _target: &Entity,
        _agent: &AgentState,
        _world: &W,
        _cache: &TickCache,
    ) -> bool {
        true
    }

    fn new_target(
        &self,
        agent: &AgentState,
        world: &W,
        _cache: &mut TickCache,
    ) -> Option<EntityId> {
        world
            .rally_point(&agent.pos().room)
            .or(Some(agent.id()))
    }

    fn work(&self, agent: EntityId, _target: EntityId, world: &mut W) -> WorkResult {
        world.idle_move(agent);
        WorkResult::Ok
    }
}

/// Steps away from hostile creeps in the agent's room.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avoiding;

fn is_threat(target: &Entity, agent: &AgentState) -> bool {
    target.is_hostile()
        && agent
            .pos()
            .range_to(&target.pos)
            .is_some_and(|range| range <= FLEE_RANGE)
}

/// A spot `FLEE_DISTANCE` tiles further away from `threat`, kept off the room edges.
pub fn flee_position(from: &Position, threat: &Position) -> Position {
    let mut dx = (from.x - threat.x).signum();
    let dy = (from.y - threat.y).signum();
    if dx == 0 && dy == 0 {
        dx = 1;
    }
    Position::new(
        from.room.clone(),
        (from.x + dx * FLEE_DISTANCE).clamp(1, 48),
        (from.y + dy * FLEE_DISTANCE).clamp(1, 48),
    )
}

impl<W> Action<W> for Avoiding
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        AVOIDING
    }

    fn is_valid_action(&self, agent: &AgentState, world: &W) -> bool {
        world
            .entities_in_room(&agent.pos().room)
            .into_iter()
            .filter_map(|id| world.entity(id))
            .any(|e| is_threat(e, agent))
    }

    fn is_valid_target(&self, target: &Entity, agent: &AgentState, _world: &W) -> bool {
        is_threat(target, agent)
    }

    fn work(&self, _agent: EntityId, _target: EntityId, _world: &mut W) -> WorkResult {
        WorkResult::Ok
    }

    /// Flees instead of approaching; the assignment lasts while the threat does.
    fn step(&self, _ctx: &TickContext, agent: EntityId, world: &mut W, cache: &mut TickCache) {
        let flee = {
            let view: &W = world;
            view.agent(agent).and_then(|state| {
                let threat = view
                    .entity(state.data.target()?)
                    .filter(|t| is_threat(t, state))?;
                Some(flee_position(state.pos(), &threat.pos))
            })
        };
        match flee {
            Some(goal) => world.move_to(agent, &goal, 0),
            None => unbind(world, cache, agent),
        }
    }
}

/// Walks to another room; the flag or spawn target only names the room.
#[derive(Debug, Clone, Copy, Default)]
pub struct Travelling;

impl<W> Action<W> for Travelling
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        TRAVELLING
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &W) -> bool {
        matches!(target.kind, EntityKind::Flag(_) | EntityKind::Spawn { .. })
    }

    /// Only ever assigned with an explicit destination.
    fn new_target(
        &self,
        _agent: &AgentState,
        _world: &W,
        _cache: &mut TickCache,
    ) -> Option<EntityId> {
        None
    }

    fn in_range(&self, agent: &AgentState, target: &Entity, _world: &W) -> bool {
        agent.pos().room == target.pos.room
    }

    fn work(&self, _agent: EntityId, _target: EntityId, _world: &mut W) -> WorkResult {
        WorkResult::Ok
    }

    fn is_complete(&self, agent: &AgentState, target: &Entity) -> bool {
        agent.pos().room == target.pos.room
    }
}

/// Returns the agent to a spawn of ours to be recycled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recycling;

impl Recycling {
    fn first_spawn<W: WorldMut>(world: &W, agent: &AgentState) -> Option<EntityId> {
        let room = world.find_spawn_room(&agent.pos().room, 0)?;
        world
            .entities_in_room(&room)
            .into_iter()
            .find(|id| {
                world
                    .entity(*id)
                    .is_some_and(|e| matches!(e.kind, EntityKind::Spawn { .. }))
            })
    }
}

impl<W> Action<W> for Recycling
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        RECYCLING
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, world: &W) -> bool {
        matches!(target.kind, EntityKind::Spawn { .. }) && world.is_my_room(&target.pos.room)
    }

    /// Mother spawn first, then the nearest spawn in sight, then any spawn of
    /// the closest owned room.
    fn new_target(&self, agent: &AgentState, world: &W, cache: &mut TickCache) -> Option<EntityId> {
        let mother = agent.data.mother_spawn.filter(|id| {
            world
                .entity(*id)
                .is_some_and(|spawn| self.is_valid_target(spawn, agent, world))
        });
        mother
            .or_else(|| nearest_target(self, agent, world, cache))
            .or_else(|| Self::first_spawn(world, agent))
    }

    fn work(&self, agent: EntityId, target: EntityId, world: &mut W) -> WorkResult {
        world.perform(agent, Work::Recycle, target)
    }
}
