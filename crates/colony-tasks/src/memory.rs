use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use colony_core::{CreationQueue, QueuedRequest, WorldView};

/// Lifecycle sets of one task instance.
///
/// A name sits in at most one of the three lists, at most once. The
/// `mark_*` methods move an entry forward and keep that true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TaskMemory {
    /// Accepted by the creation subsystem, not started yet.
    pub queued: Vec<QueuedRequest>,
    /// Being materialized.
    pub spawning: Vec<QueuedRequest>,
    /// Agent names serving the instance.
    pub running: Vec<String>,
}

impl TaskMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a request is queued or spawning.
    pub fn is_pending(&self) -> bool {
        !self.queued.is_empty() || !self.spawning.is_empty()
    }

    pub fn tracked(&self) -> usize {
        self.queued.len() + self.spawning.len() + self.running.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.queued.iter().any(|q| q.name == name)
            || self.spawning.iter().any(|s| s.name == name)
            || self.running.iter().any(|r| r == name)
    }

    /// Records a freshly accepted request. Names already tracked are ignored.
    pub fn push_queued(&mut self, request: QueuedRequest) -> bool {
        if self.contains(&request.name) {
            return false;
        }
        self.queued.push(request);
        true
    }

    pub fn mark_spawning(&mut self, request: QueuedRequest) {
        if self.running.iter().any(|r| *r == request.name) {
            return;
        }
        self.queued.retain(|q| q.name != request.name);
        if !self.spawning.iter().any(|s| s.name == request.name) {
            self.spawning.push(request);
        }
    }

    pub fn mark_running(&mut self, name: &str) {
        self.queued.retain(|q| q.name != name);
        self.spawning.retain(|s| s.name != name);
        if !self.running.iter().any(|r| r == name) {
            self.running.push(name.to_string());
        }
    }

    /// Removes `name` from `running`; absent names are a no-op.
    pub fn remove_running(&mut self, name: &str) -> bool {
        let before = self.running.len();
        self.running.retain(|r| r != name);
        self.running.len() != before
    }

    /// Drops queued entries the creation subsystem no longer holds.
    pub fn validate_queued(&mut self, spawner: &dyn CreationQueue) -> usize {
        let before = self.queued.len();
        self.queued.retain(|q| {
            let live = spawner.is_queued(&q.room, &q.name);
            if !live {
                tracing::trace!(name = %q.name, room = %q.room, "Dropping stale queued entry");
            }
            live
        });
        before - self.queued.len()
    }

    /// Drops spawning entries no producer is materializing any more.
    pub fn validate_spawning(&mut self, spawner: &dyn CreationQueue) -> usize {
        let before = self.spawning.len();
        self.spawning.retain(|s| {
            let live = spawner.is_spawning(&s.name);
            if !live {
                tracing::trace!(name = %s.name, "Dropping stale spawning entry");
            }
            live
        });
        before - self.spawning.len()
    }

    /// Drops running names without a live agent.
    pub fn validate_running<W>(&mut self, world: &W) -> usize
    where
        W: WorldView + ?Sized,
    {
        let before = self.running.len();
        self.running.retain(|name| world.agent_by_name(name).is_some());
        before - self.running.len()
    }

    pub fn validate_all<W>(&mut self, spawner: &dyn CreationQueue, world: &W) -> usize
    where
        W: WorldView + ?Sized,
    {
        self.validate_queued(spawner)
            + self.validate_spawning(spawner)
            + self.validate_running(world)
    }
}

/// Durable task memories, keyed by task name and context key.
///
/// Instances initialize themselves on first access and are never removed
/// implicitly; [`TaskStore::forget`] is the garbage-collection hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TaskStore {
    tasks: BTreeMap<String, BTreeMap<String, TaskMemory>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(&mut self, task: &str, key: &str) -> &mut TaskMemory {
        self.tasks
            .entry(task.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default()
    }

    pub fn get(&self, task: &str, key: &str) -> Option<&TaskMemory> {
        self.tasks.get(task).and_then(|instances| instances.get(key))
    }

    pub fn instances(&self, task: &str) -> impl Iterator<Item = (&str, &TaskMemory)> + '_ {
        self.tasks
            .get(task)
            .into_iter()
            .flat_map(|instances| instances.iter().map(|(k, m)| (k.as_str(), m)))
    }

    pub fn instances_mut(
        &mut self,
        task: &str,
    ) -> impl Iterator<Item = (&str, &mut TaskMemory)> + '_ {
        self.tasks
            .get_mut(task)
            .into_iter()
            .flat_map(|instances| instances.iter_mut().map(|(k, m)| (k.as_str(), m)))
    }

    /// Every instance as `(task, key, memory)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &TaskMemory)> + '_ {
        self.tasks.iter().flat_map(|(task, instances)| {
            instances
                .iter()
                .map(move |(key, memory)| (task.as_str(), key.as_str(), memory))
        })
    }

    pub fn forget(&mut self, task: &str, key: &str) -> Option<TaskMemory> {
        self.tasks.get_mut(task)?.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.values().all(BTreeMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> QueuedRequest {
        QueuedRequest {
            room: "W1N1".into(),
            name: name.to_string(),
        }
    }

    #[test]
    fn entries_move_forward_without_duplicates() {
        let mut memory = TaskMemory::new();
        assert!(memory.push_queued(request("a")));
        assert!(!memory.push_queued(request("a")));

        memory.mark_spawning(request("a"));
        memory.mark_spawning(request("a"));
        assert!(memory.queued.is_empty());
        assert_eq!(memory.spawning.len(), 1);

        memory.mark_running("a");
        memory.mark_running("a");
        assert!(!memory.is_pending());
        assert_eq!(memory.running, vec!["a".to_string()]);

        // A late start notice must not pull a running agent back.
        memory.mark_spawning(request("a"));
        assert_eq!(memory.tracked(), 1);
    }

    #[test]
    fn store_initializes_on_first_access() {
        let mut store = TaskStore::new();
        assert!(store.get("delivery", "W1N1").is_none());
        assert_eq!(store.memory("delivery", "W1N1"), &TaskMemory::default());
        assert!(store.get("delivery", "W1N1").is_some());
        assert_eq!(store.instances("delivery").count(), 1);
        assert!(store.forget("delivery", "W1N1").is_some());
        assert!(store.is_empty());
    }
}
