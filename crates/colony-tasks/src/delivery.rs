#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use colony_core::{
    CreationRequest, CreatureTemplate, Destiny, Entity, EntityId, FlagColor, PartKind,
    QueuePriority, QueuedRequest, RoomName, SpawnParams, WorldMut, WorldView,
};

use crate::{Task, TaskEnv};

pub const DELIVERY: &str = "delivery";

/// Tuning knobs of the delivery task.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeliveryConfig {
    /// Haulers per unit of storage charge in the source room.
    pub charge_multiplier: f64,
    pub min_energy_capacity: u32,
    /// Travel time per room, for the predicted renewal.
    pub ticks_per_room: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            charge_multiplier: 2.0,
            min_energy_capacity: 100,
            ticks_per_room: 50,
        }
    }
}

/// Moves surplus energy out of an owned room marked with a robbing flag.
///
/// Each flag keeps haulers (`recycler` agents) running in proportion to the
/// room's storage charge. They carry energy to the nearest delivery flag's
/// room and recycle themselves there.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryTask {
    config: DeliveryConfig,
}

impl DeliveryTask {
    pub fn new(config: DeliveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    pub fn recycler_template() -> CreatureTemplate {
        CreatureTemplate {
            name: "recycler".into(),
            behaviour: "recycler".into(),
            fixed_body: vec![PartKind::Carry, PartKind::Move],
            multi_body: vec![PartKind::Carry, PartKind::Move],
            queue: QueuePriority::Low,
        }
    }

    pub fn is_trigger<W: WorldView + ?Sized>(flag: &Entity, world: &W) -> bool {
        flag.as_flag()
            .is_some_and(|f| f.color == FlagColor::ROBBING)
            && world.is_my_room(&flag.pos.room)
    }

    /// Haulers wanted for `room`: one without storage, otherwise scaled by
    /// the storage charge and never below one.
    pub fn demand_limit<W: WorldView + ?Sized>(&self, room: &RoomName, world: &W) -> usize {
        match world.storage_charge(room) {
            None => 1,
            Some(charge) => (charge * self.config.charge_multiplier).floor().max(1.0) as usize,
        }
    }

    /// Room of the nearest delivery flag, else a room the world proposes.
    ///
    /// The trigger's own room never qualifies: a hauler sent there would
    /// recycle without moving anything.
    pub fn target_room<W: WorldView + ?Sized>(&self, flag: &Entity, world: &W) -> Option<RoomName> {
        let home = &flag.pos.room;
        let nearest = world
            .flags()
            .into_iter()
            .filter_map(|id| world.entity(id))
            .filter(|e| e.as_flag().is_some_and(|f| f.color == FlagColor::DELIVERY))
            .filter(|e| &e.pos.room != home)
            .map(|e| (world.distance(&flag.pos, &e.pos), e))
            .filter(|(distance, _)| *distance != u32::MAX)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, e)| e.pos.room.clone());
        nearest.or_else(|| {
            world
                .find_spawn_room(home, self.config.min_energy_capacity)
                .filter(|room| room != home)
        })
    }

    /// Reconciles the flag's instance and submits at most one request.
    pub fn check_for_required_creeps<W>(
        &self,
        flag: EntityId,
        env: &mut TaskEnv<'_, W>,
    ) -> Option<QueuedRequest>
    where
        W: WorldMut + 'static,
    {
        let flag = env.world.entity(flag)?.clone();
        let info = flag.as_flag()?;
        let room = flag.pos.room.clone();

        let memory = env.store.memory(DELIVERY, room.as_str());
        memory.validate_all(&*env.spawner, &*env.world);
        if memory.is_pending() {
            return None;
        }

        let limit = self.demand_limit(&room, &*env.world);
        if memory.running.len() >= limit {
            return None;
        }

        let Some(target_room) = self.target_room(&flag, &*env.world) else {
            tracing::debug!(
                tick = env.ctx.tick,
                flag = %info.name,
                room = %room,
                "No room to deliver to"
            );
            return None;
        };

        let destiny = Destiny {
            task: DELIVERY.into(),
            target_name: info.name.clone(),
            target_room: Some(target_room.clone()),
            home_room: Some(room.clone()),
        };
        let params = SpawnParams {
            explicit: Some(room.clone()),
            target_room: Some(target_room.clone()),
            min_energy_capacity: self.config.min_energy_capacity,
        };
        let Some(queued) = env
            .spawner
            .submit(&Self::recycler_template(), destiny, params)
        else {
            tracing::debug!(flag = %info.name, room = %room, "Creation request rejected");
            return None;
        };

        tracing::info!(
            tick = env.ctx.tick,
            task = DELIVERY,
            flag = %info.name,
            name = %queued.name,
            target = %target_room,
            running = memory.running.len(),
            limit,
            "Requested hauler"
        );
        memory.push_queued(queued.clone());
        Some(queued)
    }
}

impl<W> Task<W> for DeliveryTask
where
    W: WorldMut + 'static,
{
    fn name(&self) -> &'static str {
        DELIVERY
    }

    fn memory_key(&self, destiny: &Destiny, world: &W) -> Option<String> {
        world
            .flag(&destiny.target_name)
            .map(|f| f.pos.room.as_str().to_string())
    }

    fn handle_flag_found(&self, flag: EntityId, env: &mut TaskEnv<'_, W>) {
        let is_trigger = env
            .world
            .entity(flag)
            .is_some_and(|f| Self::is_trigger(f, &*env.world));
        if is_trigger {
            self.check_for_required_creeps(flag, env);
        }
    }

    fn handle_spawning_started(
        &self,
        room: &RoomName,
        request: &CreationRequest,
        env: &mut TaskEnv<'_, W>,
    ) {
        if request.destiny.task != DELIVERY {
            return;
        }
        let Some(key) = self.memory_key(&request.destiny, &*env.world) else {
            return;
        };
        let memory = env.store.memory(DELIVERY, &key);
        memory.mark_spawning(QueuedRequest {
            room: room.clone(),
            name: request.name.clone(),
        });
        memory.validate_queued(&*env.spawner);
    }

    fn handle_spawning_completed(&self, agent: EntityId, env: &mut TaskEnv<'_, W>) {
        let Some(state) = env.world.agent(agent) else {
            return;
        };
        let Some(destiny) = state.data.destiny.clone().filter(|d| d.task == DELIVERY) else {
            return;
        };
        let name = state.name.clone();
        let home_room = destiny.home_room.clone().or_else(|| state.data.home_room.clone());
        let travel_room = destiny
            .target_room
            .clone()
            .or_else(|| state.data.travel_room.clone());
        let spawning_time = state.data.spawning_time;

        let flag_room = env.world.flag(&destiny.target_name).map(|f| f.pos.room.clone());
        let predicted_renewal = match (&home_room, travel_room.as_ref().or(flag_room.as_ref())) {
            (Some(home), Some(away)) => env
                .world
                .route_range(home, away)
                .map(|rooms| spawning_time + u64::from(rooms) * self.config.ticks_per_room),
            _ => None,
        };

        if let Some(data) = env.world.agent_data_mut(agent) {
            data.home_room = home_room;
            data.travel_room = travel_room;
            if flag_room.is_some() {
                data.predicted_renewal = predicted_renewal;
            }
        }

        let Some(flag_room) = flag_room else {
            tracing::debug!(agent = %name, flag = %destiny.target_name, "Hauler outlived its flag");
            return;
        };
        let memory = env.store.memory(DELIVERY, flag_room.as_str());
        memory.validate_spawning(&*env.spawner);
        memory.mark_running(&name);
    }
}
