use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier for every world object, agents included.
///
/// Ordering is the deterministic processing order of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn stable_id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RoomName(pub String);

impl RoomName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub room: RoomName,
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{}", self.room, self.x, self.y)
    }
}

impl Position {
    pub fn new(room: impl Into<RoomName>, x: i32, y: i32) -> Self {
        Self {
            room: room.into(),
            x,
            y,
        }
    }

    /// Chebyshev range inside one room, `None` across rooms.
    pub fn range_to(&self, other: &Position) -> Option<u32> {
        if self.room != other.room {
            return None;
        }
        Some((self.x - other.x).unsigned_abs().max((self.y - other.y).unsigned_abs()))
    }
}

impl From<String> for RoomName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PartKind {
    Move,
    Work,
    Carry,
    Attack,
    RangedAttack,
    Heal,
    Tough,
    Claim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyPart {
    pub kind: PartKind,
    pub hits: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub boost: Option<String>,
}

impl BodyPart {
    pub const HITS: u32 = 100;

    pub fn new(kind: PartKind) -> Self {
        Self {
            kind,
            hits: Self::HITS,
            boost: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.hits > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Color {
    Red,
    Purple,
    Blue,
    Cyan,
    Green,
    Yellow,
    Orange,
    Brown,
    Grey,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlagColor {
    pub primary: Color,
    pub secondary: Color,
}

impl FlagColor {
    /// Marks an owned room whose storage may be drained for delivery.
    pub const ROBBING: FlagColor = FlagColor::new(Color::Yellow, Color::Orange);
    /// Marks the room deliveries should be brought to.
    pub const DELIVERY: FlagColor = FlagColor::new(Color::Green, Color::Yellow);
    /// Rally point for agents with nothing to do.
    pub const IDLE: FlagColor = FlagColor::new(Color::Grey, Color::Grey);
    /// Destiny of remote workers.
    pub const REMOTE_WORK: FlagColor = FlagColor::new(Color::Green, Color::White);

    pub const fn new(primary: Color, secondary: Color) -> Self {
        Self { primary, secondary }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlagInfo {
    pub name: String,
    pub color: FlagColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StructureType {
    Spawn,
    Extension,
    Road,
    Wall,
    Rampart,
    Container,
    Storage,
    Tower,
    Lab,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum EntityKind {
    Source {
        energy: u32,
        capacity: u32,
    },
    Dropped {
        amount: u32,
    },
    Container {
        energy: u32,
        capacity: u32,
    },
    Storage {
        energy: u32,
        capacity: u32,
    },
    Lab {
        energy: u32,
        mineral: Option<String>,
        mineral_amount: u32,
    },
    Site {
        structure: StructureType,
        progress: u32,
        total: u32,
    },
    Structure {
        structure: StructureType,
        hits: u32,
        hits_max: u32,
    },
    Spawn {
        name: String,
        energy_capacity: u32,
    },
    Flag(FlagInfo),
    Creep {
        owner: String,
        hostile: bool,
        body: Vec<BodyPart>,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entity {
    pub id: EntityId,
    pub pos: Position,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(id: EntityId, pos: Position, kind: EntityKind) -> Self {
        Self { id, pos, kind }
    }

    pub fn as_flag(&self) -> Option<&FlagInfo> {
        match &self.kind {
            EntityKind::Flag(flag) => Some(flag),
            _ => None,
        }
    }

    pub fn is_hostile(&self) -> bool {
        matches!(self.kind, EntityKind::Creep { hostile: true, .. })
    }

    /// Energy an agent could take from this object, if any.
    pub fn stored_energy(&self) -> Option<u32> {
        match &self.kind {
            EntityKind::Source { energy, .. }
            | EntityKind::Container { energy, .. }
            | EntityKind::Storage { energy, .. } => Some(*energy),
            EntityKind::Dropped { amount } => Some(*amount),
            _ => None,
        }
    }
}
