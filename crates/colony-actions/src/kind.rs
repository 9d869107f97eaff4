use colony_core::{Action, ActionKey, ActionRegistry, RegistryError, WorldMut, IDLE};

use crate::{
    Avoiding, Boosting, Building, Harvesting, Idle, Picking, Recycling, Repairing, Storing,
    Travelling, Uncharging, Withdrawing,
};

pub const AVOIDING: ActionKey = ActionKey("avoiding");
pub const TRAVELLING: ActionKey = ActionKey("travelling");
pub const RECYCLING: ActionKey = ActionKey("recycling");
pub const PICKING: ActionKey = ActionKey("picking");
pub const UNCHARGING: ActionKey = ActionKey("uncharging");
pub const WITHDRAWING: ActionKey = ActionKey("withdrawing");
pub const HARVESTING: ActionKey = ActionKey("harvesting");
pub const REPAIRING: ActionKey = ActionKey("repairing");
pub const BUILDING: ActionKey = ActionKey("building");
pub const STORING: ActionKey = ActionKey("storing");
pub const BOOSTING: ActionKey = ActionKey("boosting");

/// Every action the colony knows, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    Idle,
    Avoiding,
    Travelling,
    Recycling,
    Picking,
    Uncharging,
    Withdrawing,
    Harvesting,
    Repairing,
    Building,
    Storing,
    Boosting,
}

impl ActionKind {
    pub const ALL: [ActionKind; 12] = [
        ActionKind::Idle,
        ActionKind::Avoiding,
        ActionKind::Travelling,
        ActionKind::Recycling,
        ActionKind::Picking,
        ActionKind::Uncharging,
        ActionKind::Withdrawing,
        ActionKind::Harvesting,
        ActionKind::Repairing,
        ActionKind::Building,
        ActionKind::Storing,
        ActionKind::Boosting,
    ];

    pub fn key(self) -> ActionKey {
        match self {
            ActionKind::Idle => IDLE,
            ActionKind::Avoiding => AVOIDING,
            ActionKind::Travelling => TRAVELLING,
            ActionKind::Recycling => RECYCLING,
            ActionKind::Picking => PICKING,
            ActionKind::Uncharging => UNCHARGING,
            ActionKind::Withdrawing => WITHDRAWING,
            ActionKind::Harvesting => HARVESTING,
            ActionKind::Repairing => REPAIRING,
            ActionKind::Building => BUILDING,
            ActionKind::Storing => STORING,
            ActionKind::Boosting => BOOSTING,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key().0 == name)
    }

    pub fn build<W>(self) -> Box<dyn Action<W>>
    where
        W: WorldMut + 'static,
    {
        match self {
            ActionKind::Idle => Box::new(Idle),
            ActionKind::Avoiding => Box::new(Avoiding),
            ActionKind::Travelling => Box::new(Travelling),
            ActionKind::Recycling => Box::new(Recycling),
            ActionKind::Picking => Box::new(Picking),
            ActionKind::Uncharging => Box::new(Uncharging),
            ActionKind::Withdrawing => Box::new(Withdrawing),
            ActionKind::Harvesting => Box::new(Harvesting),
            ActionKind::Repairing => Box::new(Repairing),
            ActionKind::Building => Box::new(Building),
            ActionKind::Storing => Box::new(Storing),
            ActionKind::Boosting => Box::new(Boosting),
        }
    }
}

/// Registry holding one instance of every [`ActionKind`].
pub fn catalog<W>() -> Result<ActionRegistry<W>, RegistryError>
where
    W: WorldMut + 'static,
{
    ActionRegistry::new(
        ActionKind::ALL
            .into_iter()
            .map(|kind| kind.build::<W>())
            .collect(),
    )
}
