//! Event handlers - route queued tick events to tasks and the journal.

use colony_core::{EntityKind, EventHandler, TickContext, WorldView};
use colony_sim::{SimWorld, SpawnQueue};
use colony_tasks::{TaskEnv, TaskRegistry, TaskStore};
use serde_json::json;

use crate::kernel::TickEvent;
use crate::observability::KernelEvent;
use crate::InvaderTracker;

/// Mutable state every handler works on.
#[derive(Debug, Default)]
pub struct Colony {
    pub world: SimWorld,
    pub spawner: SpawnQueue,
    pub store: TaskStore,
    pub defense: InvaderTracker,
    pub(crate) journal: Vec<KernelEvent>,
    pub(crate) tick: u64,
}

impl Colony {
    pub fn new(world: SimWorld) -> Self {
        Self {
            tick: world.time(),
            world,
            ..Self::default()
        }
    }

    /// Events recorded this tick and not yet written out.
    pub fn journal(&self) -> &[KernelEvent] {
        &self.journal
    }

    fn task_env(&mut self) -> TaskEnv<'_, SimWorld> {
        TaskEnv {
            ctx: TickContext::new(self.tick),
            world: &mut self.world,
            spawner: &mut self.spawner,
            store: &mut self.store,
        }
    }
}

/// Hands lifecycle events to every registered task.
pub struct TaskDispatcher {
    tasks: TaskRegistry<SimWorld>,
}

impl TaskDispatcher {
    pub fn new(tasks: TaskRegistry<SimWorld>) -> Self {
        Self { tasks }
    }
}

impl EventHandler<TickEvent, Colony> for TaskDispatcher {
    fn name(&self) -> &'static str {
        "tasks"
    }

    fn handle(&mut self, event: &TickEvent, colony: &mut Colony) {
        let mut env = colony.task_env();
        match event {
            TickEvent::FlagFound { flag } => self.tasks.flag_found(*flag, &mut env),
            TickEvent::SpawningStarted { room, request } => {
                self.tasks.spawning_started(room, request, &mut env)
            }
            TickEvent::SpawningCompleted { agent, .. } => {
                self.tasks.spawning_completed(*agent, &mut env)
            }
            TickEvent::CreepDied(departed) => {
                self.tasks
                    .creep_died(&departed.name, &departed.data, &mut env)
            }
            TickEvent::NewInvader { .. }
            | TickEvent::KnownInvader { .. }
            | TickEvent::GoneInvader { .. } => {}
        }
    }
}

/// Turns notable events into [`KernelEvent`]s for the event log.
pub struct Journal {
    notify: bool,
}

impl Journal {
    pub fn new(notify: bool) -> Self {
        Self { notify }
    }
}

impl EventHandler<TickEvent, Colony> for Journal {
    fn name(&self) -> &'static str {
        "journal"
    }

    fn handle(&mut self, event: &TickEvent, colony: &mut Colony) {
        let tick = colony.tick;
        let entry = match event {
            TickEvent::FlagFound { .. } | TickEvent::KnownInvader { .. } => return,
            TickEvent::SpawningStarted { room, request } => {
                KernelEvent::new(tick, event.kind(), format!("Spawning {}", request.name))
                    .in_room(room)
                    .for_agent(&request.name)
                    .with_metadata(json!({
                        "behaviour": request.template.behaviour,
                        "task": request.destiny.task,
                    }))
            }
            TickEvent::SpawningCompleted { room, name, .. } => {
                KernelEvent::new(tick, event.kind(), format!("{name} is ready"))
                    .in_room(room)
                    .for_agent(name)
            }
            TickEvent::CreepDied(departed) => KernelEvent::new(
                tick,
                event.kind(),
                format!("{} left the world ({:?})", departed.name, departed.cause),
            )
            .for_agent(&departed.name)
            .with_metadata(json!({
                "creep_type": departed.data.creep_type,
                "task": departed.data.destiny.as_ref().map(|d| d.task.clone()),
            })),
            TickEvent::NewInvader { room, id } => {
                let owner = colony
                    .world
                    .entity(*id)
                    .and_then(|e| match &e.kind {
                        EntityKind::Creep { owner, .. } => Some(owner.clone()),
                        _ => None,
                    })
                    .unwrap_or_default();
                if self.notify {
                    tracing::warn!(
                        room = %room,
                        invader = %id,
                        owner = %owner,
                        "Hostile creep entered"
                    );
                }
                KernelEvent::new(tick, event.kind(), format!("Hostile {id} of {owner} entered"))
                    .in_room(room)
                    .with_metadata(json!({ "id": id.0, "owner": owner }))
            }
            TickEvent::GoneInvader { room, id } => {
                tracing::info!(room = %room, invader = %id, "Hostile creep gone");
                KernelEvent::new(tick, event.kind(), format!("Hostile {id} is gone"))
                    .in_room(room)
                    .with_metadata(json!({ "id": id.0 }))
            }
        };
        colony.journal.push(entry);
    }
}
