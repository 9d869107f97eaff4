use colony_core::{
    assign_first, ActionKey, ActionRegistry, AgentState, Behaviour, EntityId, TickCache,
    TickContext, WindDown, WorldMut, IDLE,
};

use crate::behaviours::{assign_key, avoid_hostiles, destiny_flag, travel_to};
use crate::{
    BehaviourConfig, BUILDING, HARVESTING, PICKING, RECYCLING, REPAIRING, UNCHARGING,
    WITHDRAWING,
};

pub const REMOTE_WORKER: &str = "remoteWorker";

const GATHERING: [ActionKey; 5] = [PICKING, UNCHARGING, WITHDRAWING, HARVESTING, IDLE];
const SPENDING: [ActionKey; 3] = [REPAIRING, BUILDING, RECYCLING];

/// Keeps a remote room's structures in shape using energy found there.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteWorker {
    config: BehaviourConfig,
}

impl RemoteWorker {
    pub fn new(config: BehaviourConfig) -> Self {
        Self { config }
    }
}

impl<W> Behaviour<W> for RemoteWorker
where
    W: WorldMut + 'static,
{
    fn name(&self) -> &'static str {
        REMOTE_WORKER
    }

    fn wind_down(&self, agent: &AgentState, world: &W) -> Option<WindDown> {
        destiny_flag(agent, world).is_none().then_some(WindDown {
            action: RECYCLING,
            target: None,
        })
    }

    fn preempt(
        &self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        cache: &mut TickCache,
        actions: &ActionRegistry<W>,
    ) -> bool {
        avoid_hostiles(ctx, agent, world, cache, actions)
    }

    fn next_action(
        &self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        cache: &mut TickCache,
        actions: &ActionRegistry<W>,
    ) -> bool {
        let (flag, at_destination, gathering, mother) = {
            let view: &W = world;
            let Some(state) = view.agent(agent) else {
                return false;
            };
            let Some(flag) = destiny_flag(state, view) else {
                return false;
            };
            let destination = state
                .data
                .destiny
                .as_ref()
                .and_then(|d| d.target_room.as_ref())
                .unwrap_or(&flag.pos.room);
            (
                flag.id,
                &state.pos().room == destination,
                self.config.wants_energy(state),
                state.data.mother_spawn,
            )
        };

        if !at_destination {
            return travel_to(flag, ctx, agent, world, cache, actions);
        }

        let priority: &[ActionKey] = if gathering { &GATHERING } else { &SPENDING };
        if assign_first(self, priority, ctx, agent, world, cache, actions) {
            return true;
        }

        match mother {
            Some(spawn) => assign_key(RECYCLING, Some(spawn), ctx, agent, world, cache, actions),
            None => false,
        }
    }
}
