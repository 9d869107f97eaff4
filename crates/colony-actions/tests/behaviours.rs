use colony_actions::{behaviours, catalog, BehaviourConfig, REMOTE_WORKER, RECYCLER};
use colony_core::{
    ActionRegistry, AgentData, BehaviourRegistry, Destiny, EntityId, EntityKind, FlagColor,
    PartKind, Position, RoomName, TickCache, TickContext, WorldView,
};
use colony_sim::{Departure, SimWorld};

struct Harness {
    world: SimWorld,
    actions: ActionRegistry<SimWorld>,
    behaviours: BehaviourRegistry<SimWorld>,
    tick: u64,
}

impl Harness {
    fn new(world: SimWorld) -> Self {
        Self {
            world,
            actions: catalog().expect("catalog"),
            behaviours: behaviours(BehaviourConfig::default()),
            tick: 0,
        }
    }

    fn step(&mut self) {
        self.tick += 1;
        let ctx = TickContext::new(self.tick);
        let mut cache = TickCache::new(&self.world);
        self.behaviours
            .run_all(&ctx, &mut self.world, &mut cache, &self.actions);
        self.world.advance();
    }

    fn action(&self, agent: EntityId) -> Option<String> {
        self.world
            .agent(agent)
            .and_then(|a| a.data.action_name().map(str::to_string))
    }
}

/// Owned `W1N1` with a spawn, unowned `W0N1` to its east.
fn colony() -> (SimWorld, EntityId) {
    let mut world = SimWorld::new();
    world.add_room("W1N1", true).expect("home");
    world.add_room("W0N1", false).expect("remote");
    let spawn = world
        .add_entity(
            Position::new("W1N1", 20, 20),
            EntityKind::Spawn {
                name: "Spawn1".into(),
                energy_capacity: 300,
            },
        )
        .expect("spawn");
    (world, spawn)
}

fn remote_worker(world: &mut SimWorld, pos: Position, flag: &str) -> EntityId {
    let mut data = AgentData::new(REMOTE_WORKER);
    data.destiny = Some(Destiny {
        task: "remoteWork".into(),
        target_name: flag.into(),
        target_room: Some(RoomName::from("W0N1")),
        home_room: Some(RoomName::from("W1N1")),
    });
    world
        .add_agent(
            "worker",
            pos,
            &[PartKind::Work, PartKind::Carry, PartKind::Move],
            data,
        )
        .expect("agent")
}

#[test]
fn remote_worker_travels_then_harvests() {
    let (mut world, _) = colony();
    world
        .add_flag("remote", Position::new("W0N1", 25, 25), FlagColor::REMOTE_WORK)
        .expect("flag");
    world
        .add_entity(
            Position::new("W0N1", 10, 10),
            EntityKind::Source {
                energy: 3000,
                capacity: 3000,
            },
        )
        .expect("source");
    let agent = remote_worker(&mut world, Position::new("W1N1", 25, 25), "remote");

    let mut h = Harness::new(world);
    h.step();
    assert_eq!(h.action(agent).as_deref(), Some("travelling"));

    let mut saw_harvesting = false;
    for _ in 0..100 {
        h.step();
        saw_harvesting |= h.action(agent).as_deref() == Some("harvesting");
        if h.world.agent(agent).is_some_and(|a| a.carry > 0) {
            break;
        }
    }
    let state = h.world.agent(agent).expect("alive");
    assert!(saw_harvesting);
    assert_eq!(state.pos().room, RoomName::from("W0N1"));
    assert!(state.carry > 0);
}

#[test]
fn remote_worker_without_flag_winds_down_into_recycling() {
    let (mut world, spawn) = colony();
    let agent = remote_worker(&mut world, Position::new("W1N1", 21, 21), "gone");

    let mut h = Harness::new(world);
    h.step();
    // Wind-down only assigns; the first step happens on the next pass.
    assert_eq!(h.action(agent).as_deref(), Some("recycling"));
    assert_eq!(h.world.agent(agent).and_then(|a| a.data.target()), Some(spawn));

    h.step();
    assert!(h.world.agent(agent).is_none());
    let departed = h.world.take_departed();
    assert_eq!(departed.len(), 1);
    assert_eq!(departed[0].cause, Departure::Recycled);
}

#[test]
fn remote_worker_flees_from_close_hostiles() {
    let (mut world, _) = colony();
    world
        .add_flag("remote", Position::new("W0N1", 40, 40), FlagColor::REMOTE_WORK)
        .expect("flag");
    let hostile = world
        .add_entity(
            Position::new("W0N1", 27, 25),
            EntityKind::Creep {
                owner: "Invader".into(),
                hostile: true,
                body: Vec::new(),
            },
        )
        .expect("hostile");
    let agent = remote_worker(&mut world, Position::new("W0N1", 25, 25), "remote");

    let mut h = Harness::new(world);
    h.step();
    assert_eq!(h.action(agent).as_deref(), Some("avoiding"));
    let hostile_pos = h.world.entity(hostile).expect("hostile").pos.clone();
    let range = h
        .world
        .agent(agent)
        .and_then(|a| a.pos().range_to(&hostile_pos))
        .expect("same room");
    assert!(range > 2);

    h.world.remove_entity(hostile);
    h.step();
    assert_ne!(h.action(agent).as_deref(), Some("avoiding"));
}

#[test]
fn recycler_delivers_energy_then_recycles() {
    let (mut world, _) = colony();
    world
        .add_flag("rob", Position::new("W1N1", 22, 22), FlagColor::ROBBING)
        .expect("robbing flag");
    world
        .add_entity(
            Position::new("W1N1", 21, 20),
            EntityKind::Storage {
                energy: 10_000,
                capacity: 1_000_000,
            },
        )
        .expect("home storage");
    world
        .add_flag("drop", Position::new("W0N1", 5, 24), FlagColor::DELIVERY)
        .expect("delivery flag");
    let target = world
        .add_entity(
            Position::new("W0N1", 5, 25),
            EntityKind::Storage {
                energy: 0,
                capacity: 1_000_000,
            },
        )
        .expect("remote storage");

    let mut data = AgentData::new(RECYCLER);
    data.home_room = Some(RoomName::from("W1N1"));
    data.travel_room = Some(RoomName::from("W0N1"));
    data.destiny = Some(Destiny {
        task: "delivery".into(),
        target_name: "rob".into(),
        target_room: Some(RoomName::from("W0N1")),
        home_room: Some(RoomName::from("W1N1")),
    });
    let agent = world
        .add_agent(
            "recycler-1",
            Position::new("W1N1", 21, 21),
            &[PartKind::Carry, PartKind::Carry, PartKind::Move, PartKind::Move],
            data,
        )
        .expect("agent");

    let mut h = Harness::new(world);
    let mut departed = Vec::new();
    for _ in 0..200 {
        h.step();
        departed.extend(h.world.take_departed());
        if !departed.is_empty() {
            break;
        }
    }

    assert!(matches!(
        h.world.entity(target).map(|e| &e.kind),
        Some(EntityKind::Storage { energy: 100, .. })
    ));
    assert_eq!(departed.len(), 1);
    assert_eq!(departed[0].id, agent);
    assert_eq!(departed[0].cause, Departure::Recycled);
}

#[test]
fn every_agent_holds_one_assignment_after_a_pass() {
    let (mut world, _) = colony();
    world
        .add_flag("remote", Position::new("W0N1", 25, 25), FlagColor::REMOTE_WORK)
        .expect("flag");
    let agents: Vec<EntityId> = (0..4)
        .map(|i| {
            let mut data = AgentData::new(REMOTE_WORKER);
            data.destiny = Some(Destiny {
                task: "remoteWork".into(),
                target_name: if i % 2 == 0 { "remote".into() } else { "missing".into() },
                target_room: Some(RoomName::from("W0N1")),
                home_room: None,
            });
            h_agent(&mut world, i, data)
        })
        .collect();

    let mut h = Harness::new(world);
    for _ in 0..5 {
        h.step();
        for agent in &agents {
            if let Some(state) = h.world.agent(*agent) {
                assert!(state.data.assignment.is_some(), "{} unassigned", state.name);
            }
        }
    }
}

fn h_agent(world: &mut SimWorld, i: i32, data: AgentData) -> EntityId {
    world
        .add_agent(
            format!("w{i}"),
            Position::new("W0N1", 10 + i, 30),
            &[PartKind::Work, PartKind::Carry, PartKind::Move],
            data,
        )
        .expect("agent")
}
