#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BodyPart, Entity, EntityId, EntityKind, PartKind, Position, RoomName};

/// The binding of one agent to one action and (usually) one target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assignment {
    pub action: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<EntityId>,
    /// Tick the binding was made.
    #[cfg_attr(feature = "serde", serde(default))]
    pub since: u64,
}

impl Assignment {
    pub fn new(action: impl Into<String>, target: EntityId, since: u64) -> Self {
        Self {
            action: action.into(),
            target: Some(target),
            since,
        }
    }
}

/// Routing metadata a task attaches to the agents it requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Destiny {
    pub task: String,
    pub target_name: String,
    pub target_room: Option<RoomName>,
    pub home_room: Option<RoomName>,
}

/// Durable per-agent record. Survives across ticks; everything else about an
/// agent is re-read from the world each tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentData {
    /// Agent class; selects the behaviour.
    pub creep_type: String,
    pub home_room: Option<RoomName>,
    pub travel_room: Option<RoomName>,
    pub mother_spawn: Option<EntityId>,
    pub destiny: Option<Destiny>,
    pub assignment: Option<Assignment>,
    pub spawning_time: u64,
    pub predicted_renewal: Option<u64>,
}

impl AgentData {
    pub fn new(creep_type: impl Into<String>) -> Self {
        Self {
            creep_type: creep_type.into(),
            ..Self::default()
        }
    }

    pub fn action_name(&self) -> Option<&str> {
        self.assignment.as_ref().map(|a| a.action.as_str())
    }

    pub fn target(&self) -> Option<EntityId> {
        self.assignment.as_ref().and_then(|a| a.target)
    }

    pub fn belongs_to(&self, task: &str) -> bool {
        self.destiny.as_ref().is_some_and(|d| d.task == task)
    }
}

/// A live agent as the world currently reports it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentState {
    pub name: String,
    pub entity: Entity,
    pub carry: u32,
    pub carry_capacity: u32,
    pub data: AgentData,
}

impl AgentState {
    pub fn id(&self) -> EntityId {
        self.entity.id
    }

    pub fn pos(&self) -> &Position {
        &self.entity.pos
    }

    pub fn body(&self) -> &[BodyPart] {
        match &self.entity.kind {
            EntityKind::Creep { body, .. } => body,
            _ => &[],
        }
    }

    pub fn has_active_bodyparts(&self, kind: PartKind) -> bool {
        self.active_parts(kind) > 0
    }

    pub fn active_parts(&self, kind: PartKind) -> u32 {
        self.body()
            .iter()
            .filter(|p| p.kind == kind && p.is_active())
            .count() as u32
    }

    pub fn is_full(&self) -> bool {
        self.carry >= self.carry_capacity
    }

    pub fn is_empty(&self) -> bool {
        self.carry == 0
    }

    pub fn free_capacity(&self) -> u32 {
        self.carry_capacity.saturating_sub(self.carry)
    }
}
