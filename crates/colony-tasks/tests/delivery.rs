use colony_core::{
    AgentData, CreationQueue, Destiny, EntityId, EntityKind, FlagColor, Position, RoomName,
    TickContext, WorldView,
};
use colony_sim::{SimWorld, SpawnEvent, SpawnQueue};
use colony_tasks::{
    DeliveryConfig, DeliveryTask, Task, TaskEnv, TaskMemory, TaskRegistry, TaskStore, DELIVERY,
};

/// Owned `W1N1` with a spawn and a robbing flag, unowned `W0N1` east of it
/// with a delivery flag.
fn robbing_room() -> (SimWorld, EntityId) {
    let mut world = SimWorld::new();
    world.add_room("W1N1", true).expect("home");
    world.add_room("W0N1", false).expect("remote");
    world
        .add_entity(
            Position::new("W1N1", 20, 20),
            EntityKind::Spawn {
                name: "Spawn1".into(),
                energy_capacity: 300,
            },
        )
        .expect("spawn");
    let flag = world
        .add_flag("rob", Position::new("W1N1", 22, 22), FlagColor::ROBBING)
        .expect("robbing flag");
    world
        .add_flag("drop", Position::new("W0N1", 10, 10), FlagColor::DELIVERY)
        .expect("delivery flag");
    (world, flag)
}

struct Colony {
    world: SimWorld,
    spawner: SpawnQueue,
    store: TaskStore,
    tasks: TaskRegistry<SimWorld>,
    tick: u64,
}

impl Colony {
    fn new(world: SimWorld) -> Self {
        let mut spawner = SpawnQueue::new();
        spawner.sync(&world);
        Self {
            world,
            spawner,
            store: TaskStore::new(),
            tasks: TaskRegistry::new().with(Box::new(DeliveryTask::default())),
            tick: 0,
        }
    }

    fn env(&mut self) -> TaskEnv<'_, SimWorld> {
        TaskEnv {
            ctx: TickContext::new(self.tick),
            world: &mut self.world,
            spawner: &mut self.spawner,
            store: &mut self.store,
        }
    }

    /// Spawn events, deaths, then every flag, the way the kernel orders them.
    fn pump(&mut self) {
        self.tick += 1;
        self.spawner.sync(&self.world);
        let events = self.spawner.tick(&mut self.world);
        let departed = self.world.take_departed();

        let tasks = std::mem::take(&mut self.tasks);
        let mut env = self.env();
        for event in &events {
            match event {
                SpawnEvent::Started { room, request } => {
                    tasks.spawning_started(room, request, &mut env)
                }
                SpawnEvent::Completed { agent, .. } => tasks.spawning_completed(*agent, &mut env),
            }
        }
        for agent in &departed {
            tasks.creep_died(&agent.name, &agent.data, &mut env);
        }
        for flag in env.world.flags() {
            tasks.flag_found(flag, &mut env);
        }
        self.tasks = tasks;
        self.world.advance();
    }

    fn memory(&self) -> TaskMemory {
        self.store.get(DELIVERY, "W1N1").cloned().unwrap_or_default()
    }
}

fn assert_exclusive(memory: &TaskMemory) {
    let mut names: Vec<&str> = memory
        .queued
        .iter()
        .map(|q| q.name.as_str())
        .chain(memory.spawning.iter().map(|s| s.name.as_str()))
        .chain(memory.running.iter().map(String::as_str))
        .collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total, "entry tracked twice: {memory:?}");
}

#[test]
fn one_request_then_none_while_it_is_pending() {
    let (world, flag) = robbing_room();
    let mut colony = Colony::new(world);
    let task = DeliveryTask::default();

    let first = task.check_for_required_creeps(flag, &mut colony.env());
    let queued = first.expect("first check submits");
    assert_eq!(queued.room, RoomName::from("W1N1"));
    assert!(task.check_for_required_creeps(flag, &mut colony.env()).is_none());

    let memory = colony.memory();
    assert_eq!(memory.queued, vec![queued]);
    assert!(memory.running.is_empty());

    let requests = colony.spawner.queued(&RoomName::from("W1N1"));
    assert_eq!(requests.len(), 1);
    let destiny = &requests[0].destiny;
    assert_eq!(destiny.task, DELIVERY);
    assert_eq!(destiny.target_name, "rob");
    assert_eq!(destiny.target_room, Some(RoomName::from("W0N1")));
    assert_eq!(requests[0].params.explicit, Some(RoomName::from("W1N1")));
    assert_eq!(requests[0].template, DeliveryTask::recycler_template());
}

#[test]
fn hauler_moves_from_queued_to_running() {
    let (world, _) = robbing_room();
    let mut colony = Colony::new(world);

    for _ in 0..40 {
        colony.pump();
        let memory = colony.memory();
        assert_exclusive(&memory);
        assert!(memory.tracked() <= 1, "burst submission: {memory:?}");
        if !memory.running.is_empty() {
            break;
        }
    }

    let memory = colony.memory();
    assert_eq!(memory.running.len(), 1);
    assert!(!memory.is_pending());

    let hauler = colony
        .world
        .agent_by_name(&memory.running[0])
        .expect("hauler exists");
    assert_eq!(hauler.data.creep_type, "recycler");
    assert_eq!(hauler.data.home_room, Some(RoomName::from("W1N1")));
    assert_eq!(hauler.data.travel_room, Some(RoomName::from("W0N1")));
    assert_eq!(
        hauler.data.predicted_renewal,
        Some(hauler.data.spawning_time + 50)
    );

    // Demand is met; nothing new gets queued.
    colony.pump();
    assert_eq!(colony.memory(), memory);
    assert!(colony.spawner.queued(&RoomName::from("W1N1")).is_empty());
}

#[test]
fn dead_hauler_is_forgotten_once_and_replaced() {
    let (world, _) = robbing_room();
    let mut colony = Colony::new(world);
    while colony.memory().running.is_empty() {
        assert!(colony.tick < 40, "hauler never materialized");
        colony.pump();
    }
    let name = colony.memory().running[0].clone();
    let id = colony.world.agent_by_name(&name).expect("hauler").id();
    let data = colony.world.agent(id).expect("hauler").data.clone();

    assert!(colony.world.kill(id));
    colony.pump();
    let memory = colony.memory();
    assert!(memory.running.is_empty());
    assert_eq!(memory.queued.len(), 1, "replacement requested");

    let tasks = std::mem::take(&mut colony.tasks);
    tasks.creep_died(&name, &data, &mut colony.env());
    assert_eq!(colony.memory(), memory);
}

#[test]
fn creep_death_of_other_tasks_is_ignored() {
    let (world, _) = robbing_room();
    let mut colony = Colony::new(world);
    colony
        .store
        .memory(DELIVERY, "W1N1")
        .mark_running("recycler-9");

    let mut data = AgentData::new("remoteWorker");
    data.destiny = Some(Destiny {
        task: "remoteWork".into(),
        target_name: "rob".into(),
        ..Destiny::default()
    });
    let task = DeliveryTask::default();
    task.handle_creep_died("recycler-9", &data, &mut colony.env());
    assert_eq!(colony.memory().running, vec!["recycler-9".to_string()]);
}

#[test]
fn death_after_the_flag_is_gone_still_clears_running() {
    let (world, flag) = robbing_room();
    let mut colony = Colony::new(world);
    colony
        .store
        .memory(DELIVERY, "W1N1")
        .mark_running("recycler-3");
    colony.world.remove_entity(flag);

    let mut data = AgentData::new("recycler");
    data.destiny = Some(Destiny {
        task: DELIVERY.into(),
        target_name: "rob".into(),
        ..Destiny::default()
    });
    let task = DeliveryTask::default();
    task.handle_creep_died("recycler-3", &data, &mut colony.env());
    assert!(colony.memory().running.is_empty());
}

#[test]
fn demand_scales_with_storage_charge() {
    let (mut world, _) = robbing_room();
    let home = RoomName::from("W1N1");
    let task = DeliveryTask::new(DeliveryConfig::default());
    assert_eq!(task.demand_limit(&home, &world), 1);

    let storage = world
        .add_entity(
            Position::new("W1N1", 25, 25),
            EntityKind::Storage {
                energy: 0,
                capacity: 1_000_000,
            },
        )
        .expect("storage");
    world.set_storage_target(&home, 100_000).expect("target");
    assert_eq!(task.demand_limit(&home, &world), 1, "an empty storage still wants one");

    if let Some(EntityKind::Storage { energy, .. }) = world.entity_mut(storage).map(|e| &mut e.kind)
    {
        *energy = 150_000;
    }
    assert_eq!(task.demand_limit(&home, &world), 3);
}

#[test]
fn stale_queued_entries_do_not_block_new_requests() {
    let (world, flag) = robbing_room();
    let mut colony = Colony::new(world);
    let task = DeliveryTask::default();
    task.check_for_required_creeps(flag, &mut colony.env())
        .expect("first request");

    // The creation subsystem lost the request.
    colony.spawner = SpawnQueue::new();
    colony.spawner.sync(&colony.world);
    assert!(!colony
        .spawner
        .is_queued(&RoomName::from("W1N1"), &colony.memory().queued[0].name));

    let second = task.check_for_required_creeps(flag, &mut colony.env());
    assert!(second.is_some());
    assert_eq!(colony.memory().queued.len(), 1);
}

#[test]
fn unresolvable_context_is_retried_next_tick() {
    let mut world = SimWorld::new();
    world.add_room("W1N1", true).expect("home");
    world.add_room("W0N1", false).expect("remote");
    let flag = world
        .add_flag("rob", Position::new("W1N1", 22, 22), FlagColor::ROBBING)
        .expect("flag");
    let mut colony = Colony::new(world);
    let task = DeliveryTask::default();

    assert!(task.check_for_required_creeps(flag, &mut colony.env()).is_none());
    assert!(colony.spawner.is_idle());

    colony
        .world
        .add_entity(
            Position::new("W1N1", 20, 20),
            EntityKind::Spawn {
                name: "Spawn1".into(),
                energy_capacity: 300,
            },
        )
        .expect("spawn");
    colony.spawner.sync(&colony.world);
    // The only proposed room is the trigger's own.
    assert!(task.check_for_required_creeps(flag, &mut colony.env()).is_none());

    colony
        .world
        .add_flag("drop", Position::new("W0N1", 10, 10), FlagColor::DELIVERY)
        .expect("delivery flag");
    let queued = task.check_for_required_creeps(flag, &mut colony.env());
    assert!(queued.is_some());
    let requests = colony.spawner.queued(&RoomName::from("W1N1"));
    assert_eq!(requests[0].destiny.target_room, Some(RoomName::from("W0N1")));
}

#[test]
fn delivery_flag_in_the_trigger_room_is_ignored() {
    let mut world = SimWorld::new();
    world.add_room("W1N1", true).expect("home");
    world
        .add_entity(
            Position::new("W1N1", 20, 20),
            EntityKind::Spawn {
                name: "Spawn1".into(),
                energy_capacity: 300,
            },
        )
        .expect("spawn");
    let flag = world
        .add_flag("rob", Position::new("W1N1", 22, 22), FlagColor::ROBBING)
        .expect("robbing flag");
    world
        .add_flag("drop", Position::new("W1N1", 30, 30), FlagColor::DELIVERY)
        .expect("delivery flag");
    let mut colony = Colony::new(world);

    for _ in 0..100 {
        colony.pump();
    }
    let memory = colony.memory();
    assert!(memory.queued.is_empty());
    assert!(memory.spawning.is_empty());
    assert!(memory.running.is_empty());
    assert!(colony.spawner.is_idle());
}

#[test]
fn only_robbing_flags_in_owned_rooms_trigger() {
    let mut world = SimWorld::new();
    world.add_room("W1N1", true).expect("home");
    world.add_room("W0N1", false).expect("remote");
    world
        .add_entity(
            Position::new("W1N1", 20, 20),
            EntityKind::Spawn {
                name: "Spawn1".into(),
                energy_capacity: 300,
            },
        )
        .expect("spawn");
    world
        .add_flag("far", Position::new("W0N1", 22, 22), FlagColor::ROBBING)
        .expect("unowned robbing flag");
    world
        .add_flag("idle", Position::new("W1N1", 30, 30), FlagColor::IDLE)
        .expect("idle flag");

    let mut colony = Colony::new(world);
    for _ in 0..3 {
        colony.pump();
    }
    assert!(colony.spawner.is_idle());
    assert!(colony.store.is_empty());
}

#[test]
fn spawning_notices_of_other_tasks_are_ignored() {
    let (world, _) = robbing_room();
    let mut colony = Colony::new(world);
    let request = colony_core::CreationRequest {
        name: "worker-1".into(),
        template: DeliveryTask::recycler_template(),
        destiny: Destiny {
            task: "remoteWork".into(),
            target_name: "rob".into(),
            ..Destiny::default()
        },
        params: Default::default(),
    };
    let task = DeliveryTask::default();
    task.handle_spawning_started(&RoomName::from("W1N1"), &request, &mut colony.env());
    assert!(colony.store.is_empty());
}

#[test]
fn registry_lists_tasks_in_order() {
    let tasks: TaskRegistry<SimWorld> = TaskRegistry::new().with(Box::new(DeliveryTask::default()));
    assert_eq!(tasks.names(), vec![DELIVERY]);
    assert!(tasks.get(DELIVERY).is_some());
    assert!(tasks.get("claim").is_none());
}
