use colony_core::{CreationRequest, EntityId, RoomName};
use colony_sim::DepartedAgent;

/// Something that happened this tick, waiting in the kernel's event queue.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    FlagFound {
        flag: EntityId,
    },
    SpawningStarted {
        room: RoomName,
        request: CreationRequest,
    },
    SpawningCompleted {
        room: RoomName,
        agent: EntityId,
        name: String,
    },
    CreepDied(DepartedAgent),
    NewInvader {
        room: RoomName,
        id: EntityId,
    },
    /// Emitted every tick for every invader still remembered.
    KnownInvader {
        room: RoomName,
        id: EntityId,
    },
    GoneInvader {
        room: RoomName,
        id: EntityId,
    },
}

impl TickEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TickEvent::FlagFound { .. } => "flag_found",
            TickEvent::SpawningStarted { .. } => "spawning_started",
            TickEvent::SpawningCompleted { .. } => "spawning_completed",
            TickEvent::CreepDied(_) => "creep_died",
            TickEvent::NewInvader { .. } => "new_invader",
            TickEvent::KnownInvader { .. } => "known_invader",
            TickEvent::GoneInvader { .. } => "gone_invader",
        }
    }
}

/// What one [`crate::Kernel::tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub agents: usize,
    pub decisions: usize,
    pub events: usize,
    pub spawning_started: usize,
    pub spawned: usize,
    pub died: usize,
    pub new_invaders: usize,
    pub gone_invaders: usize,
}

impl TickReport {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Agents: {}, Decisions: {}, Events: {}, Spawned: {}, Died: {}, Invaders: +{}/-{}",
            self.agents,
            self.decisions,
            self.events,
            self.spawned,
            self.died,
            self.new_invaders,
            self.gone_invaders
        )
    }

    pub(crate) fn count(&mut self, event: &TickEvent) {
        match event {
            TickEvent::SpawningStarted { .. } => self.spawning_started += 1,
            TickEvent::SpawningCompleted { .. } => self.spawned += 1,
            TickEvent::CreepDied(_) => self.died += 1,
            TickEvent::NewInvader { .. } => self.new_invaders += 1,
            TickEvent::GoneInvader { .. } => self.gone_invaders += 1,
            TickEvent::FlagFound { .. } | TickEvent::KnownInvader { .. } => {}
        }
    }
}
