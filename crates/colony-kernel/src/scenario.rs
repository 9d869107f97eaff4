//! Scenario files: the rooms, objects and agents a run starts from.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use colony_core::{
    AgentData, BodyPart, Destiny, EntityKind, FlagColor, PartKind, Position, RoomName, WorldView,
};
use colony_sim::{SimError, SimWorld};
use serde::{Deserialize, Serialize};

/// The scenario `colony run` uses without `--scenario`.
pub const DEFAULT_SCENARIO: &str = include_str!("../scenarios/default.yaml");

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("room `{0}` is declared twice")]
    DuplicateRoom(String),
    #[error("`{name}` refers to undeclared room `{room}`")]
    UnknownRoom { name: String, room: String },
    #[error("name `{0}` is used twice")]
    DuplicateName(String),
    #[error("agent `{0}` has an empty body")]
    EmptyBody(String),
    #[error(transparent)]
    World(#[from] SimError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub name: RoomName,
    #[serde(default)]
    pub owned: bool,
    #[serde(default)]
    pub storage_target: Option<u32>,
    #[serde(default)]
    pub walls: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub room: RoomName,
    pub x: i32,
    pub y: i32,
    pub kind: EntityKind,
}

/// Named flag colours scenario files can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    Robbing,
    Delivery,
    Idle,
    RemoteWork,
}

impl FlagKind {
    pub fn color(self) -> FlagColor {
        match self {
            FlagKind::Robbing => FlagColor::ROBBING,
            FlagKind::Delivery => FlagColor::DELIVERY,
            FlagKind::Idle => FlagColor::IDLE,
            FlagKind::RemoteWork => FlagColor::REMOTE_WORK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagSpec {
    pub name: String,
    pub room: RoomName,
    pub x: i32,
    pub y: i32,
    pub kind: FlagKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub room: RoomName,
    pub x: i32,
    pub y: i32,
    pub creep_type: String,
    pub body: Vec<PartKind>,
    #[serde(default)]
    pub home_room: Option<RoomName>,
    #[serde(default)]
    pub destiny: Option<Destiny>,
}

/// Hostile creeps that enter at `tick` and leave `duration` ticks later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvaderWave {
    pub tick: u64,
    pub duration: u64,
    pub room: RoomName,
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_owner")]
    pub owner: String,
    pub body: Vec<PartKind>,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_owner() -> String {
    "Invader".to_string()
}
fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub rooms: Vec<RoomSpec>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    #[serde(default)]
    pub flags: Vec<FlagSpec>,
    #[serde(default)]
    pub agents: Vec<AgentSpec>,
    #[serde(default)]
    pub invaders: Vec<InvaderWave>,
}

/// A built world plus the scripted arrivals the kernel plays back.
#[derive(Debug)]
pub struct ScenarioWorld {
    pub world: SimWorld,
    pub invaders: Vec<InvaderWave>,
}

impl Scenario {
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(DEFAULT_SCENARIO).context("Built-in scenario is invalid")
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse scenario")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario from {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("In scenario {}", path.display()))
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        let mut rooms = BTreeSet::new();
        for room in &self.rooms {
            if !rooms.insert(room.name.clone()) {
                return Err(ScenarioError::DuplicateRoom(room.name.to_string()));
            }
        }
        let check_room = |name: &str, room: &RoomName| {
            if rooms.contains(room) {
                Ok(())
            } else {
                Err(ScenarioError::UnknownRoom {
                    name: name.to_string(),
                    room: room.to_string(),
                })
            }
        };

        let mut names = BTreeSet::new();
        for flag in &self.flags {
            check_room(&flag.name, &flag.room)?;
            if !names.insert(flag.name.as_str()) {
                return Err(ScenarioError::DuplicateName(flag.name.clone()));
            }
        }
        for agent in &self.agents {
            check_room(&agent.name, &agent.room)?;
            if let Some(home) = &agent.home_room {
                check_room(&agent.name, home)?;
            }
            if agent.body.is_empty() {
                return Err(ScenarioError::EmptyBody(agent.name.clone()));
            }
            if !names.insert(agent.name.as_str()) {
                return Err(ScenarioError::DuplicateName(agent.name.clone()));
            }
        }
        for object in &self.objects {
            check_room("object", &object.room)?;
        }
        for wave in &self.invaders {
            check_room("invaders", &wave.room)?;
        }
        Ok(())
    }

    pub fn build(&self) -> Result<ScenarioWorld, ScenarioError> {
        self.validate()?;
        let mut world = SimWorld::new();

        for room in &self.rooms {
            world.add_room(room.name.clone(), room.owned)?;
            if let Some(target) = room.storage_target {
                world.set_storage_target(&room.name, target)?;
            }
            for (x, y) in &room.walls {
                world.set_wall(&Position::new(room.name.clone(), *x, *y))?;
            }
        }
        for object in &self.objects {
            world.add_entity(
                Position::new(object.room.clone(), object.x, object.y),
                object.kind.clone(),
            )?;
        }
        for flag in &self.flags {
            world.add_flag(
                flag.name.clone(),
                Position::new(flag.room.clone(), flag.x, flag.y),
                flag.kind.color(),
            )?;
        }
        for agent in &self.agents {
            let home = agent.home_room.clone().unwrap_or_else(|| agent.room.clone());
            let mother_spawn = world
                .spawns()
                .into_iter()
                .find(|id| world.position_of(*id).is_some_and(|p| p.room == home));
            let data = AgentData {
                creep_type: agent.creep_type.clone(),
                home_room: Some(home),
                mother_spawn,
                destiny: agent.destiny.clone(),
                ..AgentData::default()
            };
            world.add_agent(
                agent.name.clone(),
                Position::new(agent.room.clone(), agent.x, agent.y),
                &agent.body,
                data,
            )?;
        }

        tracing::debug!(
            scenario = %self.name,
            rooms = self.rooms.len(),
            agents = self.agents.len(),
            "Scenario built"
        );
        Ok(ScenarioWorld {
            world,
            invaders: self.invaders.clone(),
        })
    }
}

impl InvaderWave {
    pub fn leaves_at(&self) -> u64 {
        self.tick + self.duration
    }

    pub fn creep(&self) -> EntityKind {
        EntityKind::Creep {
            owner: self.owner.clone(),
            hostile: true,
            body: self.body.iter().copied().map(BodyPart::new).collect(),
        }
    }
}
