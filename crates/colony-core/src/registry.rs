use crate::{Action, ActionKey, WorldMut, IDLE};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("action `{0}` registered twice")]
    DuplicateAction(&'static str),
    #[error("registry has no `idle` action")]
    MissingIdle,
}

/// Ordered catalog of every action, looked up by name.
///
/// Durable assignments store the action's name; the registry turns it back
/// into behaviour on the next tick.
pub struct ActionRegistry<W>
where
    W: WorldMut + 'static,
{
    actions: Vec<Box<dyn Action<W>>>,
}

impl<W> ActionRegistry<W>
where
    W: WorldMut + 'static,
{
    pub fn new(actions: Vec<Box<dyn Action<W>>>) -> Result<Self, RegistryError> {
        let mut registry = Self {
            actions: Vec::with_capacity(actions.len()),
        };
        for action in actions {
            registry.register(action)?;
        }
        if registry.get(IDLE.0).is_none() {
            return Err(RegistryError::MissingIdle);
        }
        Ok(registry)
    }

    fn register(&mut self, action: Box<dyn Action<W>>) -> Result<(), RegistryError> {
        let key = action.key();
        if self.get(key.0).is_some() {
            return Err(RegistryError::DuplicateAction(key.0));
        }
        self.actions.push(action);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Action<W>> {
        self.actions
            .iter()
            .find(|a| a.key().0 == name)
            .map(|a| a.as_ref())
    }

    pub fn by_key(&self, key: ActionKey) -> Option<&dyn Action<W>> {
        self.get(key.0)
    }

    pub fn idle(&self) -> &dyn Action<W> {
        // Presence is checked in `new`.
        self.actions
            .iter()
            .find(|a| a.key() == IDLE)
            .map(|a| a.as_ref())
            .unwrap_or_else(|| unreachable!("registry constructed without idle"))
    }

    pub fn keys(&self) -> impl Iterator<Item = ActionKey> + '_ {
        self.actions.iter().map(|a| a.key())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
