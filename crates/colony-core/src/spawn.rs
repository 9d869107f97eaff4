#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Destiny, PartKind, RoomName};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum QueuePriority {
    High,
    Medium,
    #[default]
    Low,
}

/// What kind of agent to request: body layout and the behaviour it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CreatureTemplate {
    pub name: String,
    pub behaviour: String,
    pub fixed_body: Vec<PartKind>,
    pub multi_body: Vec<PartKind>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub queue: QueuePriority,
}

/// Room selection parameters for a creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpawnParams {
    /// Produce in this room only.
    pub explicit: Option<RoomName>,
    pub target_room: Option<RoomName>,
    pub min_energy_capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CreationRequest {
    /// Name the agent will carry once it materializes.
    pub name: String,
    pub template: CreatureTemplate,
    pub destiny: Destiny,
    pub params: SpawnParams,
}

/// Handle returned by the creation subsystem for an accepted request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QueuedRequest {
    pub room: RoomName,
    pub name: String,
}

/// The creation-request subsystem.
///
/// Requests are accepted asynchronously; the subsystem later reports
/// `spawning started` / `spawning completed` through the kernel's event queue.
pub trait CreationQueue {
    /// Submits a request; `None` when no room can take it.
    fn submit(
        &mut self,
        template: &CreatureTemplate,
        destiny: Destiny,
        params: SpawnParams,
    ) -> Option<QueuedRequest>;

    /// True while `name` still waits in `room`'s queue.
    fn is_queued(&self, room: &RoomName, name: &str) -> bool;

    /// True while some producer is materializing `name`.
    fn is_spawning(&self, name: &str) -> bool;
}
