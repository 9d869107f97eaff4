//! Actions that spend carried energy. Done once the agent is empty or the
//! target needs nothing more.

use colony_core::{
    Action, ActionKey, AgentState, Entity, EntityId, EntityKind, PartKind, StructureType, Work,
    WorkResult, WorldMut,
};

use crate::{BUILDING, REPAIRING, STORING};

fn can_spend(agent: &AgentState) -> bool {
    agent.has_active_bodyparts(PartKind::Work) && !agent.is_empty()
}

/// Repairs damaged structures. Walls and ramparts are left to dedicated builders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Repairing;

impl<W> Action<W> for Repairing
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        REPAIRING
    }

    fn target_range(&self) -> u32 {
        3
    }

    fn max_per_action(&self) -> usize {
        1
    }

    fn is_valid_action(&self, agent: &AgentState, _world: &W) -> bool {
        can_spend(agent)
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &W) -> bool {
        match target.kind {
            EntityKind::Structure {
                structure,
                hits,
                hits_max,
            } => {
                !matches!(structure, StructureType::Wall | StructureType::Rampart)
                    && hits < hits_max
            }
            _ => false,
        }
    }

    fn work(&self, agent: EntityId, target: EntityId, world: &mut W) -> WorkResult {
        world.perform(agent, Work::Repair, target)
    }

    fn is_complete(&self, agent: &AgentState, target: &Entity) -> bool {
        let damaged = matches!(
            target.kind,
            EntityKind::Structure { hits, hits_max, .. } if hits < hits_max
        );
        agent.is_empty() || !damaged
    }
}

/// Works on construction sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct Building;

impl<W> Action<W> for Building
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        BUILDING
    }

    fn target_range(&self) -> u32 {
        3
    }

    fn max_per_action(&self) -> usize {
        3
    }

    fn is_valid_action(&self, agent: &AgentState, _world: &W) -> bool {
        can_spend(agent)
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &W) -> bool {
        matches!(target.kind, EntityKind::Site { progress, total, .. } if progress < total)
    }

    fn work(&self, agent: EntityId, target: EntityId, world: &mut W) -> WorkResult {
        world.perform(agent, Work::Build, target)
    }

    fn is_complete(&self, agent: &AgentState, target: &Entity) -> bool {
        agent.is_empty() || !matches!(target.kind, EntityKind::Site { .. })
    }
}

/// Fills a storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Storing;

impl<W> Action<W> for Storing
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        STORING
    }

    fn is_valid_action(&self, agent: &AgentState, _world: &W) -> bool {
        !agent.is_empty()
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &W) -> bool {
        matches!(target.kind, EntityKind::Storage { energy, capacity } if energy < capacity)
    }

    fn work(&self, agent: EntityId, target: EntityId, world: &mut W) -> WorkResult {
        world.perform(agent, Work::Transfer, target)
    }

    fn is_complete(&self, agent: &AgentState, target: &Entity) -> bool {
        agent.is_empty()
            || !matches!(target.kind, EntityKind::Storage { energy, capacity } if energy < capacity)
    }
}
