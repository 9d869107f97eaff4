//! Hostile creep tracking across ticks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use colony_core::{EntityId, EntityKind, HysteresisSet, PartKind, RoomName, TickCache, WorldView};
use serde::{Deserialize, Serialize};

use crate::kernel::TickEvent;

/// Statistics of one hostile creep's visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvaderRecord {
    pub id: EntityId,
    pub owner: String,
    pub room: RoomName,
    /// Body part counts by type.
    pub body: BTreeMap<PartKind, u32>,
    pub enter_tick: u64,
    pub entered_at: DateTime<Utc>,
    #[serde(default)]
    pub leave_tick: Option<u64>,
}

/// Remembers the hostile creeps of every room seen so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvaderTracker {
    rooms: BTreeMap<RoomName, HysteresisSet<EntityId>>,
    statistics: Vec<InvaderRecord>,
}

impl InvaderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs the hostiles of every `visible` room against the last tick.
    ///
    /// Known ids count as gone only when the object no longer exists as a
    /// hostile anywhere. Rooms without sight keep their known set and report
    /// it as still known.
    pub fn update<W>(
        &mut self,
        tick: u64,
        visible: &[RoomName],
        world: &W,
        cache: &mut TickCache,
        record_statistics: bool,
    ) -> Vec<TickEvent>
    where
        W: WorldView + ?Sized,
    {
        let mut events = Vec::new();
        let still_hostile = |id: &EntityId| world.entity(*id).is_some_and(|e| e.is_hostile());

        for room in visible {
            let present = cache.hostiles(world, room);
            if present.is_empty() && !self.rooms.contains_key(room) {
                continue;
            }
            let set = self.rooms.entry(room.clone()).or_default();
            set.update(present, still_hostile);

            for id in set.appeared() {
                events.push(TickEvent::NewInvader {
                    room: room.clone(),
                    id: *id,
                });
            }
            for id in set.known() {
                events.push(TickEvent::KnownInvader {
                    room: room.clone(),
                    id: *id,
                });
            }
            for id in set.disappeared() {
                events.push(TickEvent::GoneInvader {
                    room: room.clone(),
                    id: *id,
                });
            }
        }

        for (room, set) in &self.rooms {
            if visible.contains(room) {
                continue;
            }
            for id in set.known() {
                events.push(TickEvent::KnownInvader {
                    room: room.clone(),
                    id: *id,
                });
            }
        }

        if record_statistics {
            self.record(tick, world, &events);
        }
        self.rooms.retain(|_, set| !set.known().is_empty());
        events
    }

    fn record<W>(&mut self, tick: u64, world: &W, events: &[TickEvent])
    where
        W: WorldView + ?Sized,
    {
        for event in events {
            match event {
                TickEvent::NewInvader { room, id } => {
                    // Moving between rooms keeps one visit open.
                    if let Some(open) = self.open_record(*id) {
                        open.room = room.clone();
                        continue;
                    }
                    let Some(entity) = world.entity(*id) else {
                        continue;
                    };
                    let EntityKind::Creep { owner, body, .. } = &entity.kind else {
                        continue;
                    };
                    let mut parts = BTreeMap::new();
                    for part in body {
                        *parts.entry(part.kind).or_insert(0) += 1;
                    }
                    self.statistics.push(InvaderRecord {
                        id: *id,
                        owner: owner.clone(),
                        room: room.clone(),
                        body: parts,
                        enter_tick: tick,
                        entered_at: Utc::now(),
                        leave_tick: None,
                    });
                }
                TickEvent::GoneInvader { id, .. } => {
                    if let Some(open) = self.open_record(*id) {
                        open.leave_tick = Some(tick);
                    }
                }
                _ => {}
            }
        }
    }

    fn open_record(&mut self, id: EntityId) -> Option<&mut InvaderRecord> {
        self.statistics
            .iter_mut()
            .rev()
            .find(|r| r.id == id && r.leave_tick.is_none())
    }

    pub fn known(&self, room: &RoomName) -> &[EntityId] {
        self.rooms.get(room).map(|s| s.known()).unwrap_or(&[])
    }

    pub fn statistics(&self) -> &[InvaderRecord] {
        &self.statistics
    }

    pub fn rooms(&self) -> impl Iterator<Item = &RoomName> + '_ {
        self.rooms.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_core::{BodyPart, Position};
    use colony_sim::SimWorld;

    fn invader(world: &mut SimWorld, x: i32) -> EntityId {
        world
            .add_entity(
                Position::new("W1N1", x, 10),
                EntityKind::Creep {
                    owner: "Invader".into(),
                    hostile: true,
                    body: vec![BodyPart::new(PartKind::Attack), BodyPart::new(PartKind::Move)],
                },
            )
            .unwrap()
    }

    fn kinds(events: &[TickEvent], kind: &str) -> Vec<EntityId> {
        events
            .iter()
            .filter(|e| e.kind() == kind)
            .filter_map(|e| match e {
                TickEvent::NewInvader { id, .. }
                | TickEvent::KnownInvader { id, .. }
                | TickEvent::GoneInvader { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn appeared_and_gone_follow_set_differences() {
        let mut world = SimWorld::new();
        world.add_room("W1N1", true).unwrap();
        let visible = vec![RoomName::from("W1N1")];
        let mut tracker = InvaderTracker::new();

        let a = invader(&mut world, 10);
        let events = tracker.update(0, &visible, &world, &mut TickCache::new(&world), true);
        assert_eq!(kinds(&events, "new_invader"), vec![a]);
        assert_eq!(kinds(&events, "known_invader"), vec![a]);

        let b = invader(&mut world, 20);
        let events = tracker.update(1, &visible, &world, &mut TickCache::new(&world), true);
        assert_eq!(kinds(&events, "new_invader"), vec![b]);
        assert!(kinds(&events, "gone_invader").is_empty());

        world.remove_entity(a);
        let events = tracker.update(2, &visible, &world, &mut TickCache::new(&world), true);
        assert!(kinds(&events, "new_invader").is_empty());
        assert_eq!(kinds(&events, "gone_invader"), vec![a]);
        assert_eq!(tracker.known(&visible[0]), &[b]);

        let stats = tracker.statistics();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].leave_tick, Some(2));
        assert_eq!(stats[0].body.get(&PartKind::Attack), Some(&1));
        assert_eq!(stats[1].leave_tick, None);
    }

    #[test]
    fn rooms_out_of_sight_stay_known() {
        let mut world = SimWorld::new();
        world.add_room("W1N1", true).unwrap();
        let room = RoomName::from("W1N1");
        let mut tracker = InvaderTracker::new();
        let a = invader(&mut world, 10);
        tracker.update(0, &[room.clone()], &world, &mut TickCache::new(&world), false);

        world.remove_entity(a);
        let events = tracker.update(1, &[], &world, &mut TickCache::new(&world), false);
        assert_eq!(kinds(&events, "known_invader"), vec![a]);
        assert!(kinds(&events, "gone_invader").is_empty());
        assert!(tracker.statistics().is_empty());
    }

    #[test]
    fn roaming_invader_keeps_one_record() {
        let mut world = SimWorld::new();
        world.add_room("W1N1", true).unwrap();
        world.add_room("W2N1", false).unwrap();
        let visible = vec![RoomName::from("W1N1"), RoomName::from("W2N1")];
        let mut tracker = InvaderTracker::new();

        let a = invader(&mut world, 10);
        tracker.update(0, &visible, &world, &mut TickCache::new(&world), true);

        world.entity_mut(a).unwrap().pos = Position::new("W2N1", 10, 10);
        let events = tracker.update(1, &visible, &world, &mut TickCache::new(&world), true);
        assert_eq!(kinds(&events, "new_invader"), vec![a]);
        assert!(kinds(&events, "gone_invader").is_empty());

        world.entity_mut(a).unwrap().pos = Position::new("W1N1", 10, 10);
        tracker.update(2, &visible, &world, &mut TickCache::new(&world), true);
        world.remove_entity(a);
        let events = tracker.update(3, &visible, &world, &mut TickCache::new(&world), true);
        // Each room that knew it reports the departure.
        assert_eq!(kinds(&events, "gone_invader"), vec![a, a]);

        let stats = tracker.statistics();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].room, visible[0]);
        assert_eq!(stats[0].enter_tick, 0);
        assert_eq!(stats[0].leave_tick, Some(3));
    }

    #[test]
    fn tracker_survives_a_json_round_trip() {
        let mut world = SimWorld::new();
        world.add_room("W1N1", true).unwrap();
        let visible = vec![RoomName::from("W1N1")];
        let mut tracker = InvaderTracker::new();
        let a = invader(&mut world, 10);
        tracker.update(0, &visible, &world, &mut TickCache::new(&world), true);

        let json = serde_json::to_string(&tracker).unwrap();
        let mut restored: InvaderTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.known(&visible[0]), &[a]);
        assert_eq!(restored.statistics(), tracker.statistics());

        world.remove_entity(a);
        let events = restored.update(1, &visible, &world, &mut TickCache::new(&world), true);
        assert_eq!(kinds(&events, "gone_invader"), vec![a]);
        assert_eq!(restored.statistics()[0].leave_tick, Some(1));
    }
}
