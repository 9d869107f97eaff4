use std::collections::BTreeMap;

use colony_core::{
    assign_first, Action, ActionKey, ActionRegistry, AgentData, AgentState, Behaviour,
    BehaviourRegistry, BodyPart, Entity, EntityId, EntityKind, PartKind, Position, RegistryError,
    RoomName, TickCache, TickContext, Work, WorkResult, WorldMut, WorldView, IDLE,
};

#[derive(Default)]
struct TestWorld {
    agents: BTreeMap<EntityId, AgentState>,
    entities: BTreeMap<EntityId, Entity>,
    said: Vec<(EntityId, String)>,
}

impl TestWorld {
    fn add_agent(&mut self, id: u64, x: i32) -> EntityId {
        let id = EntityId(id);
        let entity = Entity::new(
            id,
            Position::new("W1N1", x, 10),
            EntityKind::Creep {
                owner: "me".into(),
                hostile: false,
                body: vec![BodyPart::new(PartKind::Work), BodyPart::new(PartKind::Carry)],
            },
        );
        self.agents.insert(
            id,
            AgentState {
                name: format!("worker-{}", id.0),
                entity,
                carry: 0,
                carry_capacity: 50,
                data: AgentData::new("worker"),
            },
        );
        id
    }

    fn add_source(&mut self, id: u64, x: i32, energy: u32) -> EntityId {
        let id = EntityId(id);
        self.entities.insert(
            id,
            Entity::new(
                id,
                Position::new("W1N1", x, 11),
                EntityKind::Source {
                    energy,
                    capacity: 3000,
                },
            ),
        );
        id
    }

    fn add_container(&mut self, id: u64, x: i32) -> EntityId {
        let id = EntityId(id);
        self.entities.insert(
            id,
            Entity::new(
                id,
                Position::new("W1N1", x, 30),
                EntityKind::Container {
                    energy: 500,
                    capacity: 2000,
                },
            ),
        );
        id
    }

    fn assignment(&self, id: EntityId) -> Option<(String, Option<EntityId>)> {
        self.agents[&id]
            .data
            .assignment
            .as_ref()
            .map(|a| (a.action.clone(), a.target))
    }
}

impl WorldView for TestWorld {
    fn agents(&self) -> Vec<EntityId> {
        self.agents.keys().copied().collect()
    }

    fn agent(&self, id: EntityId) -> Option<&AgentState> {
        self.agents.get(&id)
    }

    fn agent_by_name(&self, name: &str) -> Option<&AgentState> {
        self.agents.values().find(|a| a.name == name)
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .get(&id)
            .or_else(|| self.agents.get(&id).map(|a| &a.entity))
    }

    fn entities_in_room(&self, room: &RoomName) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| &e.pos.room == room)
            .map(|e| e.id)
            .collect()
    }

    fn flags(&self) -> Vec<EntityId> {
        Vec::new()
    }

    fn flag(&self, _name: &str) -> Option<&Entity> {
        None
    }

    fn distance(&self, a: &Position, b: &Position) -> u32 {
        a.range_to(b).unwrap_or(u32::MAX)
    }

    fn route_range(&self, from: &RoomName, to: &RoomName) -> Option<u32> {
        Some(u32::from(from != to))
    }

    fn is_my_room(&self, _room: &RoomName) -> bool {
        true
    }

    fn rally_point(&self, _room: &RoomName) -> Option<EntityId> {
        None
    }

    fn storage_charge(&self, _room: &RoomName) -> Option<f64> {
        None
    }

    fn find_spawn_room(&self, _target_room: &RoomName, _min: u32) -> Option<RoomName> {
        None
    }
}

impl WorldMut for TestWorld {
    fn agent_data_mut(&mut self, id: EntityId) -> Option<&mut AgentData> {
        self.agents.get_mut(&id).map(|a| &mut a.data)
    }

    fn move_to(&mut self, agent: EntityId, target: &Position, _range: u32) {
        if let Some(a) = self.agents.get_mut(&agent) {
            a.entity.pos = target.clone();
        }
    }

    fn idle_move(&mut self, _agent: EntityId) {}

    fn perform(&mut self, agent: EntityId, work: Work, target: EntityId) -> WorkResult {
        if work != Work::Harvest {
            return WorkResult::InvalidTarget;
        }
        let Some(Entity {
            kind: EntityKind::Source { energy, .. },
            ..
        }) = self.entities.get_mut(&target)
        else {
            return WorkResult::InvalidTarget;
        };
        if *energy == 0 {
            return WorkResult::Exhausted;
        }
        let taken = (*energy).min(25);
        *energy -= taken;
        if let Some(a) = self.agents.get_mut(&agent) {
            a.carry += taken;
        }
        WorkResult::Ok
    }

    fn say(&mut self, agent: EntityId, message: &str) {
        self.said.push((agent, message.to_string()));
    }
}

struct Harvest;

impl Action<TestWorld> for Harvest {
    fn key(&self) -> ActionKey {
        ActionKey("harvesting")
    }

    fn max_per_action(&self) -> usize {
        1
    }

    fn is_valid_action(&self, agent: &AgentState, _world: &TestWorld) -> bool {
        !agent.is_full()
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &TestWorld) -> bool {
        matches!(target.kind, EntityKind::Source { energy, .. } if energy > 0)
    }

    fn work(&self, agent: EntityId, target: EntityId, world: &mut TestWorld) -> WorkResult {
        world.perform(agent, Work::Harvest, target)
    }

    fn is_complete(&self, agent: &AgentState, target: &Entity) -> bool {
        agent.is_full() || target.stored_energy() == Some(0)
    }
}

struct Loiter;

impl Action<TestWorld> for Loiter {
    fn key(&self) -> ActionKey {
        ActionKey("loitering")
    }

    fn is_valid_target(&self, target: &Entity, _agent: &AgentState, _world: &TestWorld) -> bool {
        matches!(target.kind, EntityKind::Container { .. })
    }

    fn work(&self, _agent: EntityId, _target: EntityId, _world: &mut TestWorld) -> WorkResult {
        WorkResult::Ok
    }
}

struct Idle;

impl Action<TestWorld> for Idle {
    fn key(&self) -> ActionKey {
        IDLE
    }

    fn is_valid_target(&self, _target: &Entity, _agent: &AgentState, _world: &TestWorld) -> bool {
        true
    }

    fn new_target(
        &self,
        agent: &AgentState,
        world: &TestWorld,
        _cache: &mut TickCache,
    ) -> Option<EntityId> {
        world.rally_point(&agent.pos().room).or(Some(agent.id()))
    }

    fn work(&self, _agent: EntityId, _target: EntityId, _world: &mut TestWorld) -> WorkResult {
        WorkResult::Ok
    }
}

struct Worker;

const PRIORITY: [ActionKey; 2] = [ActionKey("harvesting"), ActionKey("loitering")];

impl Behaviour<TestWorld> for Worker {
    fn name(&self) -> &'static str {
        "worker"
    }

    fn next_action(
        &self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut TestWorld,
        cache: &mut TickCache,
        actions: &ActionRegistry<TestWorld>,
    ) -> bool {
        assign_first(self, &PRIORITY, ctx, agent, world, cache, actions)
    }
}

fn registry() -> ActionRegistry<TestWorld> {
    ActionRegistry::new(vec![Box::new(Harvest), Box::new(Loiter), Box::new(Idle)])
        .expect("valid registry")
}

fn run_tick(world: &mut TestWorld, tick: u64) {
    let actions = registry();
    let behaviours = BehaviourRegistry::new().with(Box::new(Worker));
    let mut cache = TickCache::new(&*world);
    behaviours.run_all(&TickContext::new(tick), world, &mut cache, &actions);
}

#[test]
fn full_target_falls_through_to_next_priority() {
    let mut world = TestWorld::default();
    let first = world.add_agent(1, 5);
    let second = world.add_agent(2, 6);
    let source = world.add_source(100, 5, 3000);
    let container = world.add_container(200, 40);

    run_tick(&mut world, 0);

    assert_eq!(
        world.assignment(first),
        Some(("harvesting".to_string(), Some(source)))
    );
    assert_eq!(
        world.assignment(second),
        Some(("loitering".to_string(), Some(container)))
    );
}

#[test]
fn addable_target_respects_max_per_action() {
    let mut world = TestWorld::default();
    let first = world.add_agent(1, 5);
    let second = world.add_agent(2, 6);
    let source = world.add_source(100, 5, 3000);
    let actions = registry();
    let ctx = TickContext::new(0);
    let mut cache = TickCache::new(&world);

    assert!(Harvest.assign(&ctx, first, Some(source), &mut world, &mut cache));

    {
        let target = world.entity(source).unwrap();
        let agent = world.agent(second).unwrap();
        assert!(!Harvest.is_addable_target(target, agent, &world, &cache));
    }
    assert!(!actions
        .get("harvesting")
        .unwrap()
        .assign(&ctx, second, Some(source), &mut world, &mut cache));

    // The holder itself may re-commit to its own slot.
    let target = world.entity(source).unwrap();
    let holder = world.agent(first).unwrap();
    assert!(Harvest.is_addable_target(target, holder, &world, &cache));
}

#[test]
fn every_agent_ends_the_tick_with_exactly_one_assignment() {
    let mut world = TestWorld::default();
    let ids: Vec<EntityId> = (1..=4).map(|i| world.add_agent(i, i as i32)).collect();

    run_tick(&mut world, 0);

    for id in ids {
        let (action, target) = world.assignment(id).expect("assignment bound");
        assert_eq!(action, IDLE.0);
        assert_eq!(target, Some(id));
    }
}

#[test]
fn destroyed_target_is_replaced_on_next_run() {
    let mut world = TestWorld::default();
    let agent = world.add_agent(1, 5);
    let doomed = world.add_source(100, 5, 3000);
    let spare = world.add_source(101, 9, 3000);

    run_tick(&mut world, 0);
    assert_eq!(
        world.assignment(agent),
        Some(("harvesting".to_string(), Some(doomed)))
    );

    world.entities.remove(&doomed);
    run_tick(&mut world, 1);

    assert_eq!(
        world.assignment(agent),
        Some(("harvesting".to_string(), Some(spare)))
    );
}

#[test]
fn completed_step_leaves_idle_placeholder() {
    let mut world = TestWorld::default();
    let agent = world.add_agent(1, 5);
    world.add_source(100, 5, 25);

    run_tick(&mut world, 0);

    // Adjacent source: one harvest drained it and the action completed during the step.
    assert_eq!(world.agents[&agent].carry, 25);
    let (action, _) = world.assignment(agent).expect("placeholder bound");
    assert_eq!(action, IDLE.0);
}

#[test]
fn ledger_is_rebuilt_from_durable_assignments() {
    let mut world = TestWorld::default();
    let first = world.add_agent(1, 5);
    let source = world.add_source(100, 5, 3000);

    run_tick(&mut world, 0);
    let cache = TickCache::new(&world);
    assert_eq!(cache.assignments().count("harvesting", source), 1);
    assert_eq!(
        cache.assignments().current(first),
        Some(("harvesting", source))
    );
}

#[test]
fn registry_requires_idle_and_unique_names() {
    let missing = ActionRegistry::<TestWorld>::new(vec![Box::new(Harvest)]);
    assert!(matches!(missing, Err(RegistryError::MissingIdle)));

    let duplicate = ActionRegistry::<TestWorld>::new(vec![
        Box::new(Idle),
        Box::new(Harvest),
        Box::new(Harvest),
    ]);
    assert!(matches!(
        duplicate,
        Err(RegistryError::DuplicateAction("harvesting"))
    ));

    let registry = registry();
    assert_eq!(
        registry.keys().collect::<Vec<_>>(),
        vec![ActionKey("harvesting"), ActionKey("loitering"), IDLE]
    );
}

#[test]
fn assignment_announces_itself() {
    let mut world = TestWorld::default();
    let agent = world.add_agent(1, 5);
    world.add_source(100, 5, 3000);

    run_tick(&mut world, 0);

    assert_eq!(world.said, vec![(agent, "harvesting".to_string())]);
}

#[test]
fn assignment_remembers_the_tick_it_was_made() {
    let mut world = TestWorld::default();
    let agent = world.add_agent(1, 5);
    world.add_container(200, 40);

    run_tick(&mut world, 3);
    run_tick(&mut world, 4);
    run_tick(&mut world, 5);

    let assignment = world.agents[&agent].data.assignment.clone().expect("bound");
    assert_eq!(assignment.action, "loitering");
    assert_eq!(assignment.since, 3);
}
