/// Events raised during a tick, waiting for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQueue<E> {
    pending: Vec<E>,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: E) {
        self.pending.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = E>) {
        self.pending.extend(events);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> &[E] {
        &self.pending
    }

    fn take(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending)
    }
}

pub trait EventHandler<E, C: ?Sized> {
    fn name(&self) -> &'static str;

    fn handle(&mut self, event: &E, ctx: &mut C);
}

/// Fixed set of handlers, invoked in registration order.
pub struct EventBus<E, C: ?Sized> {
    handlers: Vec<Box<dyn EventHandler<E, C>>>,
}

impl<E, C: ?Sized> Default for EventBus<E, C> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<E, C: ?Sized> EventBus<E, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: Box<dyn EventHandler<E, C>>) {
        self.handlers.push(handler);
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Drains the queue once. Events each handler pushes back into a queue
    /// wait for the next dispatch.
    pub fn dispatch(&mut self, queue: &mut EventQueue<E>, ctx: &mut C) -> usize {
        let events = queue.take();
        for event in &events {
            for handler in self.handlers.iter_mut() {
                handler.handle(event, ctx);
            }
        }
        events.len()
    }
}
