use std::collections::BTreeMap;

use colony_core::{
    AgentData, CreationQueue, CreationRequest, CreatureTemplate, Destiny, EntityId, EntityKind,
    PartKind, Position, QueuedRequest, RoomName, SpawnParams, WorldView,
};

use crate::{SimWorld, ROOM_SIZE};

/// Ticks a spawn needs per body part.
pub const SPAWN_TIME_PER_PART: u64 = 3;
const MAX_BODY_PARTS: usize = 50;

pub fn part_cost(part: PartKind) -> u32 {
    match part {
        PartKind::Move | PartKind::Carry => 50,
        PartKind::Work => 100,
        PartKind::Attack => 80,
        PartKind::RangedAttack => 150,
        PartKind::Heal => 250,
        PartKind::Tough => 10,
        PartKind::Claim => 600,
    }
}

pub fn body_cost(body: &[PartKind]) -> u32 {
    body.iter().copied().map(part_cost).sum()
}

/// Fixed parts plus as many repetitions of the multi parts as the energy
/// capacity allows. Empty when even the fixed parts do not fit.
pub fn build_body(template: &CreatureTemplate, energy_capacity: u32) -> Vec<PartKind> {
    let mut body = template.fixed_body.clone();
    let mut cost = body_cost(&body);
    if cost > energy_capacity {
        return Vec::new();
    }
    let multi_cost = body_cost(&template.multi_body);
    if template.multi_body.is_empty() || multi_cost == 0 {
        return body;
    }
    while cost + multi_cost <= energy_capacity
        && body.len() + template.multi_body.len() <= MAX_BODY_PARTS
    {
        body.extend_from_slice(&template.multi_body);
        cost += multi_cost;
    }
    body
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpawnEvent {
    Started {
        room: RoomName,
        request: CreationRequest,
    },
    Completed {
        room: RoomName,
        request: CreationRequest,
        agent: EntityId,
    },
}

#[derive(Debug, Clone)]
struct Spawning {
    room: RoomName,
    request: CreationRequest,
    body: Vec<PartKind>,
    remaining: u64,
}

/// Per-room creation queues feeding the spawns of a [`SimWorld`].
///
/// Room capacities are refreshed by [`SpawnQueue::sync`] so requests can be
/// accepted without access to the world.
#[derive(Debug, Clone, Default)]
pub struct SpawnQueue {
    capacities: BTreeMap<RoomName, u32>,
    queues: BTreeMap<RoomName, Vec<CreationRequest>>,
    active: BTreeMap<EntityId, Spawning>,
    serial: u64,
}

impl SpawnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-reads which owned rooms can produce agents and at what capacity.
    pub fn sync(&mut self, world: &SimWorld) {
        self.capacities.clear();
        for spawn in world.spawns() {
            let Some(entity) = world.entity(spawn) else {
                continue;
            };
            if let EntityKind::Spawn {
                energy_capacity, ..
            } = entity.kind
            {
                let best = self.capacities.entry(entity.pos.room.clone()).or_insert(0);
                *best = (*best).max(energy_capacity);
            }
        }
    }

    pub fn queued(&self, room: &RoomName) -> &[CreationRequest] {
        self.queues.get(room).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty() && self.queues.values().all(Vec::is_empty)
    }

    fn select_room(&self, params: &SpawnParams) -> Option<RoomName> {
        let fits = |room: &RoomName| {
            self.capacities
                .get(room)
                .is_some_and(|cap| *cap >= params.min_energy_capacity)
        };
        if let Some(explicit) = &params.explicit {
            return fits(explicit).then(|| explicit.clone());
        }
        if let Some(target) = params.target_room.as_ref().filter(|r| fits(r)) {
            return Some(target.clone());
        }
        self.capacities.keys().find(|r| fits(r)).cloned()
    }

    /// Finishes due spawns, then starts the highest-priority request of every
    /// free spawn.
    pub fn tick(&mut self, world: &mut SimWorld) -> Vec<SpawnEvent> {
        let mut events = Vec::new();

        let due: Vec<EntityId> = self
            .active
            .iter_mut()
            .filter_map(|(spawn, job)| {
                job.remaining = job.remaining.saturating_sub(1);
                (job.remaining == 0).then_some(*spawn)
            })
            .collect();
        for spawn in due {
            let Some(job) = self.active.remove(&spawn) else {
                continue;
            };
            if let Some(event) = Self::complete(world, spawn, job) {
                events.push(event);
            }
        }

        for spawn in world.spawns() {
            if self.active.contains_key(&spawn) {
                continue;
            }
            let Some(entity) = world.entity(spawn) else {
                continue;
            };
            let EntityKind::Spawn {
                energy_capacity, ..
            } = entity.kind
            else {
                continue;
            };
            let room = entity.pos.room.clone();
            let Some(queue) = self.queues.get_mut(&room) else {
                continue;
            };
            let Some(next) = queue
                .iter()
                .enumerate()
                .min_by_key(|(_, r)| r.template.queue)
                .map(|(idx, _)| idx)
            else {
                continue;
            };
            let request = queue.remove(next);
            let body = build_body(&request.template, energy_capacity);
            if body.is_empty() {
                tracing::warn!(
                    room = %room,
                    name = %request.name,
                    "Body does not fit spawn capacity"
                );
                continue;
            }
            tracing::debug!(
                room = %room,
                name = %request.name,
                parts = body.len(),
                "Spawning started"
            );
            events.push(SpawnEvent::Started {
                room: room.clone(),
                request: request.clone(),
            });
            self.active.insert(
                spawn,
                Spawning {
                    room,
                    request,
                    remaining: body.len() as u64 * SPAWN_TIME_PER_PART,
                    body,
                },
            );
        }

        events
    }

    fn complete(world: &mut SimWorld, spawn: EntityId, job: Spawning) -> Option<SpawnEvent> {
        let pos = world.entity(spawn)?.pos.clone();
        let pos = Position::new(pos.room, pos.x, (pos.y + 1).min(ROOM_SIZE - 1));
        let data = AgentData {
            creep_type: job.request.template.behaviour.clone(),
            home_room: Some(job.room.clone()),
            mother_spawn: Some(spawn),
            destiny: Some(job.request.destiny.clone()),
            spawning_time: job.body.len() as u64 * SPAWN_TIME_PER_PART,
            ..AgentData::default()
        };
        match world.add_agent(job.request.name.clone(), pos, &job.body, data) {
            Ok(agent) => Some(SpawnEvent::Completed {
                room: job.room,
                request: job.request,
                agent,
            }),
            Err(err) => {
                tracing::warn!(
                    name = %job.request.name,
                    error = %err,
                    "Spawn could not place agent"
                );
                None
            }
        }
    }
}

impl CreationQueue for SpawnQueue {
    fn submit(
        &mut self,
        template: &CreatureTemplate,
        destiny: Destiny,
        params: SpawnParams,
    ) -> Option<QueuedRequest> {
        let room = self.select_room(&params)?;
        self.serial += 1;
        let name = format!("{}-{}", template.name, self.serial);
        self.queues
            .entry(room.clone())
            .or_default()
            .push(CreationRequest {
                name: name.clone(),
                template: template.clone(),
                destiny,
                params,
            });
        Some(QueuedRequest { room, name })
    }

    fn is_queued(&self, room: &RoomName, name: &str) -> bool {
        self.queued(room).iter().any(|r| r.name == name)
    }

    fn is_spawning(&self, name: &str) -> bool {
        self.active.values().any(|job| job.request.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_core::QueuePriority;

    fn hauler() -> CreatureTemplate {
        CreatureTemplate {
            name: "hauler".into(),
            behaviour: "hauler".into(),
            fixed_body: vec![PartKind::Carry, PartKind::Move],
            multi_body: vec![PartKind::Carry, PartKind::Move],
            queue: QueuePriority::Low,
        }
    }

    #[test]
    fn body_grows_with_capacity() {
        assert_eq!(build_body(&hauler(), 99), Vec::<PartKind>::new());
        assert_eq!(build_body(&hauler(), 100).len(), 2);
        assert_eq!(build_body(&hauler(), 300).len(), 6);
        assert_eq!(build_body(&hauler(), 100_000).len(), MAX_BODY_PARTS);
    }
}
