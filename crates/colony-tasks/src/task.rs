use colony_core::{
    AgentData, CreationQueue, CreationRequest, Destiny, EntityId, RoomName, TickContext,
    WorldMut,
};

use crate::TaskStore;

/// Everything a task touches during one event.
pub struct TaskEnv<'a, W: ?Sized> {
    pub ctx: TickContext,
    pub world: &'a mut W,
    pub spawner: &'a mut dyn CreationQueue,
    pub store: &'a mut TaskStore,
}

/// A category of recurring demand for agents.
///
/// Tasks hold no state of their own; every instance lives in the
/// [`TaskStore`] under [`Task::name`] and the key [`Task::memory_key`]
/// derives from an agent's destiny.
pub trait Task<W>: 'static
where
    W: WorldMut + 'static,
{
    fn name(&self) -> &'static str;

    /// Instance key for an agent requested with `destiny`.
    fn memory_key(&self, destiny: &Destiny, world: &W) -> Option<String>;

    /// Offered every flag, every tick.
    fn handle_flag_found(&self, flag: EntityId, env: &mut TaskEnv<'_, W>);

    fn handle_spawning_started(
        &self,
        room: &RoomName,
        request: &CreationRequest,
        env: &mut TaskEnv<'_, W>,
    );

    fn handle_spawning_completed(&self, agent: EntityId, env: &mut TaskEnv<'_, W>);

    /// Forgets a departed agent. Safe to call more than once.
    fn handle_creep_died(&self, name: &str, data: &AgentData, env: &mut TaskEnv<'_, W>) {
        let Some(destiny) = data.destiny.as_ref().filter(|d| d.task == self.name()) else {
            return;
        };
        let removed = match self.memory_key(destiny, &*env.world) {
            Some(key) => env.store.memory(self.name(), &key).remove_running(name),
            // The instance's context is gone; look the name up instead.
            None => env
                .store
                .instances_mut(self.name())
                .any(|(_, memory)| memory.remove_running(name)),
        };
        if removed {
            tracing::debug!(task = self.name(), agent = %name, "Agent left the task");
        }
    }
}

/// Fixed set of tasks, offered every event in registration order.
pub struct TaskRegistry<W>
where
    W: WorldMut + 'static,
{
    tasks: Vec<Box<dyn Task<W>>>,
}

impl<W> Default for TaskRegistry<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<W> TaskRegistry<W>
where
    W: WorldMut + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, task: Box<dyn Task<W>>) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Task<W>> {
        self.tasks
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn flag_found(&self, flag: EntityId, env: &mut TaskEnv<'_, W>) {
        for task in &self.tasks {
            task.handle_flag_found(flag, env);
        }
    }

    pub fn spawning_started(
        &self,
        room: &RoomName,
        request: &CreationRequest,
        env: &mut TaskEnv<'_, W>,
    ) {
        for task in &self.tasks {
            task.handle_spawning_started(room, request, env);
        }
    }

    pub fn spawning_completed(&self, agent: EntityId, env: &mut TaskEnv<'_, W>) {
        for task in &self.tasks {
            task.handle_spawning_completed(agent, env);
        }
    }

    pub fn creep_died(&self, name: &str, data: &AgentData, env: &mut TaskEnv<'_, W>) {
        for task in &self.tasks {
            task.handle_creep_died(name, data, env);
        }
    }
}
