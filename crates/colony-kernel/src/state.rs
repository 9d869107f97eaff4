//! Durable colony state: what survives a run.

use std::path::Path;

use anyhow::{Context, Result};
use colony_core::{AgentData, Position, WorldView};
use colony_tasks::TaskStore;
use serde::{Deserialize, Serialize};

use crate::kernel::Colony;
use crate::InvaderTracker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub name: String,
    pub pos: Position,
    pub carry: u32,
    pub data: AgentData,
}

/// Agent records, task memories and invader memory as of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub agents: Vec<AgentSnapshot>,
    #[serde(default)]
    pub tasks: TaskStore,
    #[serde(default)]
    pub invaders: InvaderTracker,
}

impl Snapshot {
    pub fn capture(colony: &Colony) -> Self {
        let world = &colony.world;
        let agents = world
            .agents()
            .into_iter()
            .filter_map(|id| world.agent(id))
            .map(|agent| AgentSnapshot {
                name: agent.name.clone(),
                pos: agent.pos().clone(),
                carry: agent.carry,
                data: agent.data.clone(),
            })
            .collect();
        Self {
            tick: world.time(),
            agents,
            tasks: colony.store.clone(),
            invaders: colony.defense.clone(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write state to {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state from {}", path.display()))
    }
}
