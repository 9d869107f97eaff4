use colony_core::{
    ActionKey, ActionRegistry, AgentState, BehaviourRegistry, Entity, EntityId, TickCache,
    TickContext, WorldMut, WorldView,
};

use crate::{Recycler, RemoteWorker, AVOIDING, TRAVELLING};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviourConfig {
    /// Fraction of carry capacity below which an agent keeps gathering.
    pub gather_threshold: f64,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            gather_threshold: 0.8,
        }
    }
}

impl BehaviourConfig {
    pub fn wants_energy(&self, agent: &AgentState) -> bool {
        f64::from(agent.carry) < f64::from(agent.carry_capacity) * self.gather_threshold
    }
}

/// Every agent class the colony runs.
pub fn behaviours<W>(config: BehaviourConfig) -> BehaviourRegistry<W>
where
    W: WorldMut + 'static,
{
    BehaviourRegistry::new()
        .with(Box::new(RemoteWorker::new(config)))
        .with(Box::new(Recycler::new(config)))
}

/// The flag an agent was created for, if it still exists.
pub fn destiny_flag<'w, W>(agent: &AgentState, world: &'w W) -> Option<&'w Entity>
where
    W: WorldView + ?Sized,
{
    let destiny = agent.data.destiny.as_ref()?;
    world.flag(&destiny.target_name)
}

pub(crate) fn assign_key<W>(
    key: ActionKey,
    target: Option<EntityId>,
    ctx: &TickContext,
    agent: EntityId,
    world: &mut W,
    cache: &mut TickCache,
    actions: &ActionRegistry<W>,
) -> bool
where
    W: WorldMut + 'static,
{
    actions
        .by_key(key)
        .is_some_and(|action| action.assign(ctx, agent, target, world, cache))
}

pub(crate) fn travel_to<W>(
    target: EntityId,
    ctx: &TickContext,
    agent: EntityId,
    world: &mut W,
    cache: &mut TickCache,
    actions: &ActionRegistry<W>,
) -> bool
where
    W: WorldMut + 'static,
{
    assign_key(TRAVELLING, Some(target), ctx, agent, world, cache, actions)
}

/// Flees while hostiles are close. `true` when the agent's tick went into fleeing.
pub(crate) fn avoid_hostiles<W>(
    ctx: &TickContext,
    agent: EntityId,
    world: &mut W,
    cache: &mut TickCache,
    actions: &ActionRegistry<W>,
) -> bool
where
    W: WorldMut + 'static,
{
    let Some(avoiding) = actions.by_key(AVOIDING) else {
        return false;
    };
    let (threatened, fleeing) = {
        let view: &W = world;
        let Some(state) = view.agent(agent) else {
            return false;
        };
        (
            avoiding.is_valid_action(state, view),
            state.data.action_name() == Some(AVOIDING.0),
        )
    };
    if !threatened {
        return false;
    }
    if !fleeing && !avoiding.assign(ctx, agent, None, world, cache) {
        return false;
    }
    tracing::debug!(agent = %agent, "Fleeing hostiles");
    avoiding.step(ctx, agent, world, cache);
    true
}
