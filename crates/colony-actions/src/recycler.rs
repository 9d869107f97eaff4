use colony_core::{
    assign_first, ActionKey, ActionRegistry, AgentState, Behaviour, EntityId, FlagColor,
    RoomName, TickCache, TickContext, WindDown, WorldMut, WorldView,
};

use crate::behaviours::{assign_key, avoid_hostiles, destiny_flag, travel_to};
use crate::{BehaviourConfig, BUILDING, PICKING, RECYCLING, REPAIRING, STORING, WITHDRAWING};

pub const RECYCLER: &str = "recycler";

const LOADING: [ActionKey; 2] = [WITHDRAWING, PICKING];
const UNLOADING: [ActionKey; 3] = [STORING, REPAIRING, BUILDING];

/// Hauls energy out of its home room's storage into its travel room, then
/// recycles itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recycler {
    config: BehaviourConfig,
}

impl Recycler {
    pub fn new(config: BehaviourConfig) -> Self {
        Self { config }
    }
}

/// Something in `room` to walk to: a delivery flag, any other flag, the rally point.
fn arrival_marker<W: WorldView + ?Sized>(world: &W, room: &RoomName) -> Option<EntityId> {
    let flags: Vec<_> = world
        .flags()
        .into_iter()
        .filter_map(|id| world.entity(id))
        .filter(|e| &e.pos.room == room)
        .collect();
    flags
        .iter()
        .find(|e| e.as_flag().is_some_and(|f| f.color == FlagColor::DELIVERY))
        .or_else(|| flags.first())
        .map(|e| e.id)
        .or_else(|| world.rally_point(room))
}

enum Plan {
    Recycle,
    /// Top up, heading on to the marker when nothing is left to load.
    Load(Option<EntityId>),
    Unload,
    Travel(Option<EntityId>),
}

impl Recycler {
    fn plan<W: WorldView>(&self, state: &AgentState, world: &W) -> Plan {
        let room = &state.pos().room;
        let home = state.data.home_room.as_ref();
        let Some(travel) = state.data.travel_room.as_ref().filter(|t| Some(*t) != home) else {
            return Plan::Recycle;
        };
        let at_home = Some(room) == home;

        if state.is_empty() {
            if room == travel {
                Plan::Recycle
            } else if at_home {
                Plan::Load(None)
            } else {
                Plan::Travel(destiny_flag(state, world).map(|f| f.id))
            }
        } else if room == travel {
            Plan::Unload
        } else if at_home && self.config.wants_energy(state) {
            Plan::Load(arrival_marker(world, travel))
        } else {
            Plan::Travel(arrival_marker(world, travel))
        }
    }
}

impl<W> Behaviour<W> for Recycler
where
    W: WorldMut + 'static,
{
    fn name(&self) -> &'static str {
        RECYCLER
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
        let plan = {
            let view: &W = world;
            let Some(state) = view.agent(agent) else {
                return false;
            };
            self.plan(state, view)
        };

        let assigned = match plan {
            Plan::Recycle => false,
            Plan::Load(next) => {
                assign_first(self, &LOADING, ctx, agent, world, cache, actions)
                    || next.is_some_and(|marker| {
                        travel_to(marker, ctx, agent, world, cache, actions)
                    })
            }
            Plan::Unload => assign_first(self, &UNLOADING, ctx, agent, world, cache, actions),
            Plan::Travel(Some(marker)) => travel_to(marker, ctx, agent, world, cache, actions),
            Plan::Travel(None) => {
                tracing::debug!(agent = %agent, "No way to reach the recycler's next room");
                false
            }
        };
        assigned || assign_key(RECYCLING, None, ctx, agent, world, cache, actions)
    }
}
