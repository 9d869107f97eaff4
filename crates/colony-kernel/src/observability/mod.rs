//! Observability - the JSONL event log.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelEvent {
    pub timestamp: DateTime<Utc>,
    pub tick: u64,
    pub event_type: String,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    pub message: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl KernelEvent {
    pub fn new(tick: u64, event_type: &str, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            tick,
            event_type: event_type.to_string(),
            room: None,
            agent: None,
            message: message.into(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn in_room(mut self, room: impl ToString) -> Self {
        self.room = Some(room.to_string());
        self
    }

    pub fn for_agent(mut self, agent: impl ToString) -> Self {
        self.agent = Some(agent.to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Append-only JSONL file of [`KernelEvent`]s.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log under a project root.
    pub fn in_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".colony/events.jsonl"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn emit(&self, event: &KernelEvent) -> Result<()> {
        self.emit_all(std::slice::from_ref(event))
    }

    /// Appends events in order with one open/flush.
    pub fn emit_all(&self, events: &[KernelEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open event log {}", self.path.display()))?;

        for event in events {
            let line = serde_json::to_string(event)?;
            writeln!(file, "{}", line)?;
        }

        Ok(())
    }

    /// Emit a simple event.
    pub fn emit_simple(&self, tick: u64, event_type: &str, message: &str) -> Result<()> {
        self.emit(&KernelEvent::new(tick, event_type, message))
    }

    /// Last `limit` readable events; a missing log reads as empty.
    pub fn read_recent(&self, limit: usize) -> Vec<KernelEvent> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };

        let reader = BufReader::new(file);
        let mut events: Vec<KernelEvent> = reader
            .lines()
            .map_while(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        if events.len() > limit {
            events.drain(0..events.len() - limit);
        }

        events
    }
}
