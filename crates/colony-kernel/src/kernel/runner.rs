//! Runner - advances the colony one tick at a time.

use anyhow::{Context, Result};
use colony_actions::{behaviours, catalog};
use colony_core::{
    ActionRegistry, BehaviourRegistry, EntityId, EventBus, EventQueue, Position, RoomName,
    TickCache, TickContext, WorldView,
};
use colony_sim::{SimWorld, SpawnEvent};
use colony_tasks::{DeliveryTask, TaskRegistry};

use crate::config::KernelConfig;
use crate::kernel::{Colony, Journal, TaskDispatcher, TickEvent, TickReport};
use crate::observability::EventLog;
use crate::scenario::{InvaderWave, ScenarioWorld};
use crate::state::Snapshot;

/// Invaders on the map and when they leave.
#[derive(Debug)]
struct ActiveWave {
    leaves_at: u64,
    creeps: Vec<EntityId>,
}

/// The per-tick loop.
///
/// Every [`Kernel::tick`] runs in a fixed order: creation subsystem and
/// departures, a fresh [`TickCache`], invader tracking, flag discovery, one
/// drain of the event queue, then every agent's behaviour in id order.
pub struct Kernel {
    config: KernelConfig,
    colony: Colony,
    actions: ActionRegistry<SimWorld>,
    behaviours: BehaviourRegistry<SimWorld>,
    bus: EventBus<TickEvent, Colony>,
    queue: EventQueue<TickEvent>,
    invaders: Vec<InvaderWave>,
    active: Vec<ActiveWave>,
    log: Option<EventLog>,
}

impl Kernel {
    pub fn new(config: KernelConfig, world: SimWorld) -> Result<Self> {
        let actions = catalog::<SimWorld>().context("Failed to build the action catalog")?;
        let behaviours = behaviours(config.behaviour.behaviour_config());
        let tasks = TaskRegistry::new().with(Box::new(DeliveryTask::new(config.delivery)));

        let mut bus = EventBus::new();
        bus.subscribe(Box::new(TaskDispatcher::new(tasks)));
        bus.subscribe(Box::new(Journal::new(config.defense.notify)));

        Ok(Self {
            config,
            colony: Colony::new(world),
            actions,
            behaviours,
            bus,
            queue: EventQueue::new(),
            invaders: Vec::new(),
            active: Vec::new(),
            log: None,
        })
    }

    pub fn from_scenario(config: KernelConfig, scenario: ScenarioWorld) -> Result<Self> {
        let mut kernel = Self::new(config, scenario.world)?;
        kernel.invaders = scenario.invaders;
        Ok(kernel)
    }

    pub fn with_event_log(mut self, log: EventLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn colony(&self) -> &Colony {
        &self.colony
    }

    pub fn colony_mut(&mut self) -> &mut Colony {
        &mut self.colony
    }

    pub fn world(&self) -> &SimWorld {
        &self.colony.world
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.bus.handler_names()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.colony)
    }

    /// Runs one tick. Only writing the event log can fail.
    pub fn tick(&mut self) -> Result<TickReport> {
        let tick = self.colony.world.time();
        self.colony.tick = tick;
        let ctx = TickContext::new(tick);
        let mut report = TickReport::new(tick);

        self.play_invaders(tick)?;

        self.colony.spawner.sync(&self.colony.world);
        for event in self.colony.spawner.tick(&mut self.colony.world) {
            self.queue.push(match event {
                SpawnEvent::Started { room, request } => {
                    TickEvent::SpawningStarted { room, request }
                }
                SpawnEvent::Completed {
                    room,
                    request,
                    agent,
                } => TickEvent::SpawningCompleted {
                    room,
                    agent,
                    name: request.name,
                },
            });
        }
        self.queue
            .extend(self.colony.world.take_departed().into_iter().map(TickEvent::CreepDied));

        let mut cache = TickCache::new(&self.colony.world);

        let visible: Vec<RoomName> = self.colony.world.rooms().cloned().collect();
        let invaders = self.colony.defense.update(
            tick,
            &visible,
            &self.colony.world,
            &mut cache,
            self.config.defense.statistics,
        );
        self.queue.extend(invaders);

        for flag in self.colony.world.flags() {
            self.queue.push(TickEvent::FlagFound { flag });
        }

        for event in self.queue.pending() {
            report.count(event);
        }
        report.events = self.bus.dispatch(&mut self.queue, &mut self.colony);

        report.decisions =
            self.behaviours
                .run_all(&ctx, &mut self.colony.world, &mut cache, &self.actions);
        report.agents = self.colony.world.agents().len();

        self.flush_journal(tick)?;
        self.colony.world.advance();

        tracing::debug!(tick, summary = %report.summary(), "Tick finished");
        Ok(report)
    }

    /// Runs `ticks` ticks, bracketed by start/stop entries in the event log.
    pub fn run(&mut self, ticks: u64) -> Result<Vec<TickReport>> {
        let start = self.colony.world.time();
        if let Some(log) = &self.log {
            log.emit_simple(start, "kernel_start", "Kernel started")?;
        }

        let mut reports = Vec::new();
        for _ in 0..ticks {
            reports.push(self.tick()?);
        }

        if let Some(log) = &self.log {
            log.emit_simple(self.colony.world.time(), "kernel_stop", "Kernel stopped")?;
        }
        Ok(reports)
    }

    fn play_invaders(&mut self, tick: u64) -> Result<()> {
        let world = &mut self.colony.world;
        self.active.retain(|wave| {
            if wave.leaves_at > tick {
                return true;
            }
            for id in &wave.creeps {
                world.remove_entity(*id);
            }
            false
        });

        for wave in self.invaders.iter().filter(|w| w.tick == tick) {
            let mut creeps = Vec::new();
            for i in 0..wave.count {
                let x = (wave.x + i as i32).min(48);
                let id = world
                    .add_entity(Position::new(wave.room.clone(), x, wave.y), wave.creep())
                    .with_context(|| format!("Failed to place invaders in {}", wave.room))?;
                creeps.push(id);
            }
            tracing::info!(room = %wave.room, count = wave.count, tick, "Invaders arrive");
            self.active.push(ActiveWave {
                leaves_at: wave.leaves_at(),
                creeps,
            });
        }
        Ok(())
    }

    fn flush_journal(&mut self, tick: u64) -> Result<()> {
        let journal = std::mem::take(&mut self.colony.journal);
        if let Some(log) = &self.log {
            log.emit_all(&journal)
                .with_context(|| format!("Failed to record events of tick {tick}"))?;
        }
        Ok(())
    }
}
