use colony_core::{
    boost_part, Action, ActionKey, AgentState, Entity, EntityId, EntityKind, PartKind, TickCache,
    Work, WorkResult, WorldMut, LAB_BOOST_ENERGY, LAB_BOOST_MINERAL,
};

use crate::BOOSTING;

/// Has a lab enhance the agent's body parts, one part per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boosting;

fn lab_compound(target: &Entity) -> Option<&str> {
    match &target.kind {
        EntityKind::Lab {
            mineral: Some(mineral),
            ..
        } => Some(mineral.as_str()),
        _ => None,
    }
}

/// Whether some part of `kind` is still unboosted.
fn can_boost_type(agent: &AgentState, kind: PartKind) -> bool {
    agent
        .body()
        .iter()
        .filter(|p| p.kind == kind)
        .any(|p| p.boost.is_none())
}

impl<W> Action<W> for Boosting
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey {
        BOOSTING
    }

    fn target_range(&self) -> u32 {
        2
    }

    fn max_per_action(&self) -> usize {
        1
    }

    fn is_valid_action(&self, agent: &AgentState, _world: &W) -> bool {
        agent.body().iter().any(|p| p.boost.is_none())
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &W) -> bool {
        matches!(
            target.kind,
            EntityKind::Lab { energy, mineral_amount, .. }
                if energy >= LAB_BOOST_ENERGY && mineral_amount >= LAB_BOOST_MINERAL
        )
    }

    fn is_addable_target(
        &self,
        target: &Entity,
        agent: &AgentState,
        world: &W,
        cache: &TickCache,
    ) -> bool {
        let Some(part) = lab_compound(target).and_then(boost_part) else {
            return false;
        };
        self.is_valid_target(target, agent, world)
            && <Self as Action<W>>::has_capacity(self, target.id, agent, cache)
            && agent.has_active_bodyparts(part)
            && can_boost_type(agent, part)
    }

    fn work(&self, agent: EntityId, target: EntityId, world: &mut W) -> WorkResult {
        world.perform(agent, Work::Boost, target)
    }

    fn is_complete(&self, agent: &AgentState, target: &Entity) -> bool {
        lab_compound(target)
            .and_then(boost_part)
            .is_none_or(|part| !can_boost_type(agent, part))
    }
}
