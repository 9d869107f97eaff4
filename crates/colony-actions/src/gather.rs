//! Actions that fill the agent with energy.
//!
//! All of them are done once the agent is full or the target has nothing
//! left to give.

use colony_core::{
    Action, ActionKey, AgentState, Entity, EntityId, EntityKind, PartKind, WorkResult, Work,
    WorldMut,
};

use crate::{HARVESTING, PICKING, UNCHARGING, WITHDRAWING};

fn can_carry_more(agent: &AgentState) -> bool {
    agent.has_active_bodyparts(PartKind::Carry) && !agent.is_full()
}

fn gathered(agent: &AgentState, target: &Entity) -> bool {
    agent.is_full() || !matches!(target.stored_energy(), Some(energy) if energy > 0)
}

/// Picks up dropped energy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Picking;

impl<W> Action<W> for Picking
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        PICKING
    }

    fn max_per_action(&self) -> usize {
        4
    }

    fn is_valid_action(&self, agent: &AgentState, _world: &W) -> bool {
        can_carry_more(agent)
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &W) -> bool {
        matches!(target.kind, EntityKind::Dropped { amount } if amount > 0)
    }

    fn work(&self, agent: EntityId, target: EntityId, world: &mut W) -> WorkResult {
        world.perform(agent, Work::Pickup, target)
    }

    fn is_complete(&self, agent: &AgentState, target: &Entity) -> bool {
        gathered(agent, target)
    }
}

/// Empties containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uncharging;

impl<W> Action<W> for Uncharging
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        UNCHARGING
    }

    fn is_valid_action(&self, agent: &AgentState, _world: &W) -> bool {
        can_carry_more(agent)
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &W) -> bool {
        matches!(target.kind, EntityKind::Container { energy, .. } if energy > 0)
    }

    fn work(&self, agent: EntityId, target: EntityId, world: &mut W) -> WorkResult {
        world.perform(agent, Work::Withdraw, target)
    }

    fn is_complete(&self, agent: &AgentState, target: &Entity) -> bool {
        gathered(agent, target)
    }
}

/// Takes energy out of a storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Withdrawing;

impl<W> Action<W> for Withdrawing
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        WITHDRAWING
    }

    fn is_valid_action(&self, agent: &AgentState, _world: &W) -> bool {
        can_carry_more(agent)
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &W) -> bool {
        matches!(target.kind, EntityKind::Storage { energy, .. } if energy > 0)
    }

    fn work(&self, agent: EntityId, target: EntityId, world: &mut W) -> WorkResult {
        world.perform(agent, Work::Withdraw, target)
    }

    fn is_complete(&self, agent: &AgentState, target: &Entity) -> bool {
        gathered(agent, target)
    }
}

/// Mines an energy source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Harvesting;

impl<W> Action<W> for Harvesting
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        HARVESTING
    }

    fn max_per_action(&self) -> usize {
        2
    }

    fn is_valid_action(&self, agent: &AgentState, _world: &W) -> bool {
        agent.has_active_bodyparts(PartKind::Work) && can_carry_more(agent)
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &W) -> bool {
        matches!(target.kind, EntityKind::Source { energy, .. } if energy > 0)
    }

    fn work(&self, agent: EntityId, target: EntityId, world: &mut W) -> WorkResult {
        world.perform(agent, Work::Harvest, target)
    }

    fn is_complete(&self, agent: &AgentState, target: &Entity) -> bool {
        gathered(agent, target)
    }
}
