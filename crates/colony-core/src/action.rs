use crate::{
    AgentState, Assignment, Entity, EntityId, TickCache, TickContext, WorkResult, WorldMut,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionKey(pub &'static str);

impl ActionKey {
    pub fn name(self) -> &'static str {
        self.0
    }
}

/// The action every agent falls back to. A registry must always provide it.
pub const IDLE: ActionKey = ActionKey("idle");

/// One unit behaviour: validity, targeting and per-tick work.
///
/// Implementations hold static configuration only. Every decision is a
/// function of the agent, the target and the world as they are this tick;
/// the only state shared between agents is the [`TickCache`] ledger.
pub trait Action<W>: 'static
where
    W: WorldMut + 'static,
{
    fn key(&self) -> ActionKey;

    /// Maximum interaction distance.
    fn target_range(&self) -> u32 {
        1
    }

    /// Upper bound on agents holding this action on the same target.
    fn max_per_action(&self) -> usize {
        usize::MAX
    }

    /// Whether the agent could ever perform this action.
    fn is_valid_action(&self, _agent: &AgentState, _world: &W) -> bool {
        true
    }

    fn is_addable_action(&self, _agent: &AgentState, _world: &W, _cache: &TickCache) -> bool {
        true
    }

    /// Whether `target` qualifies in isolation.
    fn is_valid_target(&self, target: &Entity, agent: &AgentState, world: &W) -> bool;

    /// Validity plus room for one more agent on `target`.
    fn is_addable_target(
        &self,
        target: &Entity,
        agent: &AgentState,
        world: &W,
        cache: &TickCache,
    ) -> bool {
        self.is_valid_target(target, agent, world) && self.has_capacity(target.id, agent, cache)
    }

    /// Live ledger check; an agent already holding the slot does not count
    /// against itself.
    fn has_capacity(&self, target: EntityId, agent: &AgentState, cache: &TickCache) -> bool {
        let ledger = cache.assignments();
        let mut count = ledger.count(self.key().0, target);
        if ledger.current(agent.id()) == Some((self.key().0, target)) {
            count = count.saturating_sub(1);
        }
        count < self.max_per_action()
    }

    fn new_target(&self, agent: &AgentState, world: &W, cache: &mut TickCache) -> Option<EntityId> {
        nearest_target(self, agent, world, cache)
    }

    fn in_range(&self, agent: &AgentState, target: &Entity, world: &W) -> bool {
        world.distance(agent.pos(), &target.pos) <= self.target_range()
    }

    /// One tick of domain work against an in-range target.
    fn work(&self, agent: EntityId, target: EntityId, world: &mut W) -> WorkResult;

    /// Evaluated after successful work; `true` ends the assignment.
    fn is_complete(&self, _agent: &AgentState, _target: &Entity) -> bool {
        false
    }

    fn on_assignment(&self, agent: EntityId, world: &mut W) {
        world.say(agent, self.key().0);
    }

    /// Commits `target` (or a freshly discovered one) as the agent's assignment.
    fn assign(
        &self,
        ctx: &TickContext,
        agent: EntityId,
        target: Option<EntityId>,
        world: &mut W,
        cache: &mut TickCache,
    ) -> bool {
        let view: &W = world;
        let Some(state) = view.agent(agent) else {
            return false;
        };

        let target = match target {
            Some(target) => Some(target),
            None => self.new_target(state, view, cache),
        };
        let Some(target) = target else {
            return false;
        };

        let addable = view
            .entity(target)
            .is_some_and(|entity| self.is_addable_target(entity, state, view, cache));
        if !addable {
            return false;
        }

        if !bind(world, cache, agent, self.key(), target, ctx.tick) {
            return false;
        }
        self.on_assignment(agent, world);
        true
    }

    /// Moves towards the target or works on it, clearing the assignment once
    /// it is complete or can no longer be served.
    fn step(&self, ctx: &TickContext, agent: EntityId, world: &mut W, cache: &mut TickCache) {
        let view: &W = world;
        let Some(state) = view.agent(agent) else {
            return;
        };

        let Some(target_id) = state.data.target() else {
            tracing::error!(
                tick = ctx.tick,
                agent = %state.name,
                action = self.key().0,
                "Agent reached work step without a bound target"
            );
            unbind(world, cache, agent);
            return;
        };

        let Some(target) = view.entity(target_id) else {
            tracing::debug!(agent = %state.name, target = %target_id, "Target vanished");
            unbind(world, cache, agent);
            return;
        };

        if !self.is_valid_target(target, state, view) {
            tracing::debug!(agent = %state.name, target = %target_id, "Target no longer valid");
            unbind(world, cache, agent);
            return;
        }

        if !self.in_range(state, target, view) {
            let goal = target.pos.clone();
            world.move_to(agent, &goal, self.target_range());
            return;
        }

        let done = match self.work(agent, target_id, world) {
            WorkResult::Ok => {
                let view: &W = world;
                match (view.agent(agent), view.entity(target_id)) {
                    (Some(state), Some(target)) => self.is_complete(state, target),
                    (Some(_), None) => true,
                    (None, None) | (None, Some(_)) => return,
                }
            }
            WorkResult::NotInRange => false,
            _ => true,
        };

        if done {
            unbind(world, cache, agent);
        }
    }
}

/// Writes the assignment into the agent's durable data and the tick ledger.
pub fn bind<W>(
    world: &mut W,
    cache: &mut TickCache,
    agent: EntityId,
    action: ActionKey,
    target: EntityId,
    tick: u64,
) -> bool
where
    W: WorldMut + ?Sized,
{
    let Some(data) = world.agent_data_mut(agent) else {
        return false;
    };
    data.assignment = Some(Assignment::new(action.0, target, tick));
    cache.assignments_mut().record(agent, action.0, target);
    true
}

pub fn unbind<W>(world: &mut W, cache: &mut TickCache, agent: EntityId)
where
    W: WorldMut + ?Sized,
{
    if let Some(data) = world.agent_data_mut(agent) {
        data.assignment = None;
    }
    cache.assignments_mut().release(agent);
}

/// Nearest valid target reachable from the agent's room; ties keep discovery order.
pub fn nearest_target<W, A>(
    action: &A,
    agent: &AgentState,
    world: &W,
    cache: &mut TickCache,
) -> Option<EntityId>
where
    W: WorldMut + 'static,
    A: Action<W> + ?Sized,
{
    let origin = agent.pos();
    cache
        .room_entities(world, &origin.room)
        .into_iter()
        .filter(|id| *id != agent.id())
        .filter_map(|id| world.entity(id))
        .filter(|e| action.is_valid_target(e, agent, world))
        .min_by_key(|e| world.distance(origin, &e.pos))
        .map(|e| e.id)
}
