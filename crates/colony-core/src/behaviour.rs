use std::collections::BTreeMap;

use crate::{
    action::unbind, Action, ActionKey, ActionRegistry, AgentState, EntityId, TickCache,
    TickContext, WorldMut, IDLE,
};

/// Action that replaces an agent's normal list once it has lost its reason
/// to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindDown {
    pub action: ActionKey,
    pub target: Option<EntityId>,
}

/// Per-agent-class decision policy.
///
/// The state machine `NoAssignment -> Evaluating -> Assigned` is not stored;
/// [`Behaviour::run`] re-derives it every tick from the durable assignment.
pub trait Behaviour<W>: 'static
where
    W: WorldMut + 'static,
{
    fn name(&self) -> &'static str;

    fn wind_down(&self, _agent: &AgentState, _world: &W) -> Option<WindDown> {
        None
    }

    /// Runs ahead of normal selection; `true` consumes the agent's tick.
    fn preempt(
        &self,
        _ctx: &TickContext,
        _agent: EntityId,
        _world: &mut W,
        _cache: &mut TickCache,
        _actions: &ActionRegistry<W>,
    ) -> bool {
        false
    }

    /// Class-specific gate on top of the action's own checks.
    fn is_addable_action(&self, _action: &dyn Action<W>, _agent: &AgentState, _world: &W) -> bool {
        true
    }

    /// Picks and commits the next action. `false` lets [`Behaviour::run`]
    /// fall back to idle.
    fn next_action(
        &self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        cache: &mut TickCache,
        actions: &ActionRegistry<W>,
    ) -> bool;

    fn run(
        &self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        cache: &mut TickCache,
        actions: &ActionRegistry<W>,
    ) {
        let wind_down = {
            let view: &W = world;
            let Some(state) = view.agent(agent) else {
                return;
            };
            self.wind_down(state, view)
                .filter(|w| state.data.action_name() != Some(w.action.0))
        };
        if let Some(wind) = wind_down {
            let assigned = actions
                .by_key(wind.action)
                .is_some_and(|a| a.assign(ctx, agent, wind.target, world, cache));
            if !assigned {
                tracing::debug!(
                    tick = ctx.tick,
                    agent = %agent,
                    action = wind.action.0,
                    "Wind-down unavailable"
                );
            }
            ensure_assigned(ctx, agent, world, cache, actions);
            return;
        }

        if self.preempt(ctx, agent, world, cache, actions) {
            ensure_assigned(ctx, agent, world, cache, actions);
            return;
        }

        let keep = validate_assignment(agent, world, cache, actions);
        let idle = world
            .agent(agent)
            .and_then(|a| a.data.action_name())
            .is_some_and(|name| name == IDLE.0);
        if (!keep || idle) && !self.next_action(ctx, agent, world, cache, actions) {
            assign_idle(ctx, agent, world, cache, actions);
        }

        let current = world
            .agent(agent)
            .and_then(|a| a.data.assignment.clone())
            .and_then(|a| actions.get(&a.action).map(|action| (action, a.target)));
        match current {
            Some((action, Some(_))) => action.step(ctx, agent, world, cache),
            _ => {
                if let Some(state) = world.agent(agent) {
                    tracing::error!(
                        tick = ctx.tick,
                        agent = %state.name,
                        behaviour = self.name(),
                        data = ?state.data,
                        "Agent without action or target"
                    );
                }
                unbind(world, cache, agent);
            }
        }

        ensure_assigned(ctx, agent, world, cache, actions);
    }
}

/// Tries `priority` in order; the first successful assign wins.
pub fn assign_first<W, B>(
    behaviour: &B,
    priority: &[ActionKey],
    ctx: &TickContext,
    agent: EntityId,
    world: &mut W,
    cache: &mut TickCache,
    actions: &ActionRegistry<W>,
) -> bool
where
    W: WorldMut + 'static,
    B: Behaviour<W> + ?Sized,
{
    for key in priority {
        let Some(action) = actions.by_key(*key) else {
            tracing::warn!(
                action = key.0,
                behaviour = behaviour.name(),
                "Unknown action in priority list"
            );
            continue;
        };
        let eligible = {
            let view: &W = world;
            let Some(state) = view.agent(agent) else {
                return false;
            };
            action.is_valid_action(state, view)
                && action.is_addable_action(state, view, cache)
                && behaviour.is_addable_action(action, state, view)
        };
        if eligible && action.assign(ctx, agent, None, world, cache) {
            return true;
        }
    }
    false
}

/// Drops an assignment whose action or target no longer holds.
///
/// Returns whether a usable assignment remains.
pub fn validate_assignment<W>(
    agent: EntityId,
    world: &mut W,
    cache: &mut TickCache,
    actions: &ActionRegistry<W>,
) -> bool
where
    W: WorldMut + 'static,
{
    let valid = {
        let view: &W = world;
        let Some(state) = view.agent(agent) else {
            return false;
        };
        let Some(assignment) = &state.data.assignment else {
            return false;
        };
        match actions.get(&assignment.action) {
            None => {
                tracing::warn!(
                    agent = %state.name,
                    action = %assignment.action,
                    "Unknown action in durable data"
                );
                false
            }
            Some(action) => {
                action.is_valid_action(state, view)
                    && match assignment.target {
                        Some(target) => view
                            .entity(target)
                            .is_some_and(|e| action.is_valid_target(e, state, view)),
                        // Surfaced as a diagnostic by the work step.
                        None => true,
                    }
            }
        }
    };
    if !valid {
        unbind(world, cache, agent);
    }
    valid
}

pub fn assign_idle<W>(
    ctx: &TickContext,
    agent: EntityId,
    world: &mut W,
    cache: &mut TickCache,
    actions: &ActionRegistry<W>,
) -> bool
where
    W: WorldMut + 'static,
{
    actions.idle().assign(ctx, agent, None, world, cache)
}

fn ensure_assigned<W>(
    ctx: &TickContext,
    agent: EntityId,
    world: &mut W,
    cache: &mut TickCache,
    actions: &ActionRegistry<W>,
) where
    W: WorldMut + 'static,
{
    let unbound = world
        .agent(agent)
        .is_some_and(|a| a.data.assignment.is_none());
    if unbound && !assign_idle(ctx, agent, world, cache, actions) {
        tracing::error!(tick = ctx.tick, agent = %agent, "Idle assignment failed");
    }
}

/// Behaviours keyed by agent class (`AgentData::creep_type`).
pub struct BehaviourRegistry<W>
where
    W: WorldMut + 'static,
{
    behaviours: BTreeMap<&'static str, Box<dyn Behaviour<W>>>,
}

impl<W> BehaviourRegistry<W>
where
    W: WorldMut + 'static,
{
    pub fn new() -> Self {
        Self {
            behaviours: BTreeMap::new(),
        }
    }

    pub fn with(mut self, behaviour: Box<dyn Behaviour<W>>) -> Self {
        self.behaviours.insert(behaviour.name(), behaviour);
        self
    }

    pub fn get(&self, creep_type: &str) -> Option<&dyn Behaviour<W>> {
        self.behaviours.get(creep_type).map(|b| b.as_ref())
    }

    /// Runs every live agent in ascending id order.
    pub fn run_all(
        &self,
        ctx: &TickContext,
        world: &mut W,
        cache: &mut TickCache,
        actions: &ActionRegistry<W>,
    ) -> usize {
        let mut ran = 0;
        for agent in world.agents() {
            let Some(creep_type) = world.agent(agent).map(|a| a.data.creep_type.clone()) else {
                continue;
            };
            let Some(behaviour) = self.get(&creep_type) else {
                tracing::warn!(
                    tick = ctx.tick,
                    agent = %agent,
                    creep_type = %creep_type,
                    "No behaviour for agent class"
                );
                continue;
            };
            behaviour.run(ctx, agent, world, cache, actions);
            ran += 1;
        }
        ran
    }
}

impl<W> Default for BehaviourRegistry<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
