//! Effects of one tick of work, applied directly to the world state.

use colony_core::{
    boost_part, AgentState, Entity, EntityId, EntityKind, PartKind, StructureType, Work,
    WorkResult, WorldView, LAB_BOOST_ENERGY, LAB_BOOST_MINERAL,
};

use crate::{Departure, SimWorld};

pub const HARVEST_POWER: u32 = 2;
pub const BUILD_POWER: u32 = 5;
pub const REPAIR_POWER: u32 = 100;

/// Maximum range at which each kind of work takes effect.
pub fn work_range(work: Work) -> u32 {
    match work {
        Work::Build | Work::Repair => 3,
        Work::Boost => 2,
        _ => 1,
    }
}

pub fn hits_max(structure: StructureType) -> u32 {
    match structure {
        StructureType::Spawn => 5_000,
        StructureType::Extension => 1_000,
        StructureType::Road => 5_000,
        StructureType::Wall => 300_000_000,
        StructureType::Rampart => 3_000_000,
        StructureType::Container => 250_000,
        StructureType::Storage => 10_000,
        StructureType::Tower => 3_000,
        StructureType::Lab => 500,
    }
}

impl SimWorld {
    pub(crate) fn apply_work(
        &mut self,
        agent: EntityId,
        work: Work,
        target: EntityId,
    ) -> WorkResult {
        let (Some(state), Some(entity)) = (self.agent(agent), self.entity(target)) else {
            return WorkResult::InvalidTarget;
        };
        let in_range = state
            .pos()
            .range_to(&entity.pos)
            .is_some_and(|range| range <= work_range(work));
        if !in_range {
            return WorkResult::NotInRange;
        }

        match work {
            Work::Harvest => self.harvest(agent, target),
            Work::Pickup => self.pickup(agent, target),
            Work::Withdraw => self.withdraw(agent, target),
            Work::Transfer => self.transfer(agent, target),
            Work::Build => self.build(agent, target),
            Work::Repair => self.repair(agent, target),
            Work::Boost => self.boost(agent, target),
            Work::Recycle => self.recycle(agent, target),
        }
    }

    fn worker_and_target(
        &mut self,
        agent: EntityId,
        target: EntityId,
    ) -> Option<(&mut AgentState, &mut Entity)> {
        Some((self.agents.get_mut(&agent)?, self.entities.get_mut(&target)?))
    }

    fn harvest(&mut self, agent: EntityId, target: EntityId) -> WorkResult {
        let Some((state, entity)) = self.worker_and_target(agent, target) else {
            return WorkResult::InvalidTarget;
        };
        let EntityKind::Source { energy, .. } = &mut entity.kind else {
            return WorkResult::InvalidTarget;
        };
        let parts = state.active_parts(PartKind::Work);
        if parts == 0 {
            return WorkResult::NoBodypart;
        }
        if *energy == 0 {
            return WorkResult::Exhausted;
        }
        let free = state.free_capacity();
        if free == 0 {
            return WorkResult::Full;
        }
        let amount = (parts * HARVEST_POWER).min(*energy).min(free);
        *energy -= amount;
        state.carry += amount;
        WorkResult::Ok
    }

    fn pickup(&mut self, agent: EntityId, target: EntityId) -> WorkResult {
        let Some((state, entity)) = self.worker_and_target(agent, target) else {
            return WorkResult::InvalidTarget;
        };
        let EntityKind::Dropped { amount } = &mut entity.kind else {
            return WorkResult::InvalidTarget;
        };
        let free = state.free_capacity();
        if free == 0 {
            return WorkResult::Full;
        }
        let taken = (*amount).min(free);
        *amount -= taken;
        state.carry += taken;
        if *amount == 0 {
            self.entities.remove(&target);
        }
        WorkResult::Ok
    }

    fn withdraw(&mut self, agent: EntityId, target: EntityId) -> WorkResult {
        let Some((state, entity)) = self.worker_and_target(agent, target) else {
            return WorkResult::InvalidTarget;
        };
        let (EntityKind::Container { energy, .. } | EntityKind::Storage { energy, .. }) =
            &mut entity.kind
        else {
            return WorkResult::InvalidTarget;
        };
        if *energy == 0 {
            return WorkResult::Exhausted;
        }
        let free = state.free_capacity();
        if free == 0 {
            return WorkResult::Full;
        }
        let taken = (*energy).min(free);
        *energy -= taken;
        state.carry += taken;
        WorkResult::Ok
    }

    fn transfer(&mut self, agent: EntityId, target: EntityId) -> WorkResult {
        let Some((state, entity)) = self.worker_and_target(agent, target) else {
            return WorkResult::InvalidTarget;
        };
        let (EntityKind::Container { energy, capacity }
        | EntityKind::Storage { energy, capacity }) = &mut entity.kind
        else {
            return WorkResult::InvalidTarget;
        };
        if state.carry == 0 {
            return WorkResult::Empty;
        }
        let room = capacity.saturating_sub(*energy);
        if room == 0 {
            return WorkResult::Exhausted;
        }
        let given = state.carry.min(room);
        *energy += given;
        state.carry -= given;
        WorkResult::Ok
    }

    fn build(&mut self, agent: EntityId, target: EntityId) -> WorkResult {
        let Some((state, entity)) = self.worker_and_target(agent, target) else {
            return WorkResult::InvalidTarget;
        };
        let EntityKind::Site {
            structure,
            progress,
            total,
        } = &mut entity.kind
        else {
            return WorkResult::InvalidTarget;
        };
        let parts = state.active_parts(PartKind::Work);
        if parts == 0 {
            return WorkResult::NoBodypart;
        }
        if state.carry == 0 {
            return WorkResult::Empty;
        }
        let amount = (parts * BUILD_POWER)
            .min(state.carry)
            .min(total.saturating_sub(*progress));
        *progress += amount;
        state.carry -= amount;

        if *progress >= *total {
            let structure = *structure;
            let hits_max = hits_max(structure);
            let hits = match structure {
                StructureType::Wall | StructureType::Rampart => 1,
                _ => hits_max,
            };
            tracing::debug!(site = %target, structure = ?structure, "Construction finished");
            entity.kind = EntityKind::Structure {
                structure,
                hits,
                hits_max,
            };
        }
        WorkResult::Ok
    }

    fn repair(&mut self, agent: EntityId, target: EntityId) -> WorkResult {
        let Some((state, entity)) = self.worker_and_target(agent, target) else {
            return WorkResult::InvalidTarget;
        };
        let EntityKind::Structure { hits, hits_max, .. } = &mut entity.kind else {
            return WorkResult::InvalidTarget;
        };
        let parts = state.active_parts(PartKind::Work);
        if parts == 0 {
            return WorkResult::NoBodypart;
        }
        if state.carry == 0 {
            return WorkResult::Empty;
        }
        let missing = hits_max.saturating_sub(*hits);
        if missing == 0 {
            return WorkResult::Exhausted;
        }
        let amount = (parts * REPAIR_POWER)
            .min(missing)
            .min(state.carry * REPAIR_POWER);
        *hits += amount;
        state.carry -= amount.div_ceil(REPAIR_POWER);
        WorkResult::Ok
    }

    fn boost(&mut self, agent: EntityId, target: EntityId) -> WorkResult {
        let Some((state, entity)) = self.worker_and_target(agent, target) else {
            return WorkResult::InvalidTarget;
        };
        let EntityKind::Lab {
            energy,
            mineral: Some(mineral),
            mineral_amount,
        } = &mut entity.kind
        else {
            return WorkResult::InvalidTarget;
        };
        let Some(part) = boost_part(mineral) else {
            return WorkResult::InvalidTarget;
        };
        if *energy < LAB_BOOST_ENERGY || *mineral_amount < LAB_BOOST_MINERAL {
            return WorkResult::Exhausted;
        }
        let EntityKind::Creep { body, .. } = &mut state.entity.kind else {
            return WorkResult::InvalidTarget;
        };
        let Some(slot) = body
            .iter_mut()
            .find(|p| p.kind == part && p.is_active() && p.boost.is_none())
        else {
            return WorkResult::NoBodypart;
        };
        slot.boost = Some(mineral.clone());
        *energy -= LAB_BOOST_ENERGY;
        *mineral_amount -= LAB_BOOST_MINERAL;
        WorkResult::Ok
    }

    fn recycle(&mut self, agent: EntityId, target: EntityId) -> WorkResult {
        let is_spawn = self
            .entities
            .get(&target)
            .is_some_and(|e| matches!(e.kind, EntityKind::Spawn { .. }));
        if !is_spawn {
            return WorkResult::InvalidTarget;
        }
        self.depart(agent, Departure::Recycled);
        WorkResult::Ok
    }
}
