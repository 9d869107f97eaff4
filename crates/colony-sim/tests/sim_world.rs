use colony_core::{
    AgentData, CreationQueue, CreatureTemplate, Destiny, EntityKind, FlagColor, PartKind,
    Position, QueuePriority, RoomName, SpawnParams, Work, WorkResult, WorldMut, WorldView,
};
use colony_sim::{Departure, RoomGrid, SimWorld, SpawnEvent, SpawnQueue, Tile};

fn two_rooms() -> SimWorld {
    let mut world = SimWorld::new();
    world.add_room("W1N1", true).expect("home room");
    world.add_room("W0N1", false).expect("east room");
    world
}

fn worker(world: &mut SimWorld, name: &str, pos: Position) -> colony_core::EntityId {
    world
        .add_agent(
            name,
            pos,
            &[PartKind::Work, PartKind::Carry, PartKind::Move],
            AgentData::new("remoteWorker"),
        )
        .expect("agent")
}

#[test]
fn grid_finds_path_around_walls() {
    let mut grid = RoomGrid::new();
    // A vertical wall with a single gap.
    for y in 0..50 {
        if y != 40 {
            grid.set_blocked(Tile::new(25, y), true);
        }
    }
    let path = grid
        .find_path(Tile::new(20, 10), |t| t == Tile::new(30, 10), |t| t.range(Tile::new(30, 10)))
        .expect("path through the gap");
    assert!(path.contains(&Tile::new(25, 40)));
    assert_eq!(path.first().copied(), Some(Tile::new(20, 10)));
    assert_eq!(path.last().copied(), Some(Tile::new(30, 10)));

    let again = grid
        .find_path(Tile::new(20, 10), |t| t == Tile::new(30, 10), |t| t.range(Tile::new(30, 10)))
        .expect("path");
    assert_eq!(path, again);
}

#[test]
fn agents_walk_across_room_borders() {
    let mut world = two_rooms();
    let agent = worker(&mut world, "walker", Position::new("W1N1", 25, 25));
    let goal = Position::new("W0N1", 10, 25);

    assert_eq!(world.route_range(&RoomName::from("W1N1"), &RoomName::from("W0N1")), Some(1));
    assert_eq!(world.distance(&Position::new("W1N1", 25, 25), &goal), 50);

    for _ in 0..80 {
        let pos = world.agent(agent).expect("alive").pos().clone();
        if pos.range_to(&goal).is_some_and(|r| r <= 1) {
            break;
        }
        world.move_to(agent, &goal, 1);
    }
    let pos = world.agent(agent).expect("alive").pos().clone();
    assert_eq!(pos.room, RoomName::from("W0N1"));
    assert!(pos.range_to(&goal).is_some_and(|r| r <= 1));
}

#[test]
fn unknown_rooms_are_unreachable() {
    let mut world = two_rooms();
    let far = Position::new("E5S5", 1, 1);
    assert_eq!(world.distance(&Position::new("W1N1", 1, 1), &far), u32::MAX);
    assert!(world.add_entity(far, EntityKind::Dropped { amount: 5 }).is_err());
}

#[test]
fn harvesting_drains_the_source() {
    let mut world = two_rooms();
    let agent = worker(&mut world, "miner", Position::new("W1N1", 10, 10));
    let source = world
        .add_entity(
            Position::new("W1N1", 11, 11),
            EntityKind::Source {
                energy: 3,
                capacity: 3000,
            },
        )
        .expect("source");
    let far = world
        .add_entity(
            Position::new("W1N1", 40, 40),
            EntityKind::Source {
                energy: 100,
                capacity: 3000,
            },
        )
        .expect("source");

    assert_eq!(world.perform(agent, Work::Harvest, far), WorkResult::NotInRange);
    assert_eq!(world.perform(agent, Work::Harvest, source), WorkResult::Ok);
    assert_eq!(world.perform(agent, Work::Harvest, source), WorkResult::Ok);
    assert_eq!(world.perform(agent, Work::Harvest, source), WorkResult::Exhausted);
    assert_eq!(world.agent(agent).expect("alive").carry, 3);
}

#[test]
fn recycling_reports_a_departure() {
    let mut world = two_rooms();
    let spawn = world
        .add_entity(
            Position::new("W1N1", 20, 20),
            EntityKind::Spawn {
                name: "Spawn1".into(),
                energy_capacity: 300,
            },
        )
        .expect("spawn");
    let agent = worker(&mut world, "old", Position::new("W1N1", 21, 21));

    assert_eq!(world.perform(agent, Work::Recycle, spawn), WorkResult::Ok);
    assert!(world.agent(agent).is_none());

    let departed = world.take_departed();
    assert_eq!(departed.len(), 1);
    assert_eq!(departed[0].name, "old");
    assert_eq!(departed[0].cause, Departure::Recycled);
    assert!(world.take_departed().is_empty());
}

#[test]
fn rally_point_prefers_idle_flag_over_spawn() {
    let mut world = two_rooms();
    let room = RoomName::from("W1N1");
    let spawn = world
        .add_entity(
            Position::new("W1N1", 20, 20),
            EntityKind::Spawn {
                name: "Spawn1".into(),
                energy_capacity: 300,
            },
        )
        .expect("spawn");
    assert_eq!(world.rally_point(&room), Some(spawn));

    let flag = world
        .add_flag("rally", Position::new("W1N1", 30, 30), FlagColor::IDLE)
        .expect("flag");
    assert_eq!(world.rally_point(&room), Some(flag));
    assert_eq!(world.flag("rally").map(|f| f.id), Some(flag));
    assert_eq!(
        world.find_spawn_room(&RoomName::from("W0N1"), 300),
        Some(room.clone())
    );
    assert_eq!(world.find_spawn_room(&RoomName::from("W0N1"), 301), None);
}

#[test]
fn spawn_queue_reports_started_before_completed() {
    let mut world = two_rooms();
    world
        .add_entity(
            Position::new("W1N1", 20, 20),
            EntityKind::Spawn {
                name: "Spawn1".into(),
                energy_capacity: 300,
            },
        )
        .expect("spawn");

    let template = CreatureTemplate {
        name: "recycler".into(),
        behaviour: "recycler".into(),
        fixed_body: vec![PartKind::Carry, PartKind::Move],
        multi_body: vec![PartKind::Carry, PartKind::Move],
        queue: QueuePriority::Low,
    };
    let params = SpawnParams {
        explicit: Some(RoomName::from("W1N1")),
        target_room: None,
        min_energy_capacity: 100,
    };

    let mut queue = SpawnQueue::new();
    assert!(queue
        .submit(&template, Destiny::default(), params.clone())
        .is_none());

    queue.sync(&world);
    let destiny = Destiny {
        task: "delivery".into(),
        target_name: "rob".into(),
        ..Destiny::default()
    };
    let handle = queue
        .submit(&template, destiny.clone(), params)
        .expect("accepted");
    assert!(queue.is_queued(&handle.room, &handle.name));
    assert!(!queue.is_spawning(&handle.name));

    let started = queue.tick(&mut world);
    assert!(matches!(
        &started[..],
        [SpawnEvent::Started { request, .. }] if request.name == handle.name
    ));
    assert!(!queue.is_queued(&handle.room, &handle.name));
    assert!(queue.is_spawning(&handle.name));

    let mut completed = None;
    for _ in 0..30 {
        for event in queue.tick(&mut world) {
            if let SpawnEvent::Completed { agent, .. } = event {
                completed = Some(agent);
            }
        }
        if completed.is_some() {
            break;
        }
    }
    let agent = completed.expect("spawn completes");
    let state = world.agent(agent).expect("materialized");
    assert_eq!(state.name, handle.name);
    assert_eq!(state.data.creep_type, "recycler");
    assert_eq!(state.data.destiny.as_ref(), Some(&destiny));
    assert_eq!(state.data.spawning_time, 18);
    assert_eq!(state.carry_capacity, 150);
    assert!(!queue.is_spawning(&handle.name));
    assert!(queue.is_idle());
}
