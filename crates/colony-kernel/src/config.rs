//! Kernel configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colony_actions::BehaviourConfig;
use colony_tasks::DeliveryConfig;
use serde::{Deserialize, Serialize};

/// Main kernel configuration, loaded from .colony/config.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Config version
    pub version: Option<String>,

    /// Ticks `colony run` simulates when not told otherwise
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Agent behaviour tuning
    #[serde(default)]
    pub behaviour: BehaviourSection,

    /// Delivery task tuning
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Invader tracking
    #[serde(default)]
    pub defense: DefenseConfig,

    /// Event log
    #[serde(default)]
    pub events: EventsConfig,

    /// Where `colony run` leaves its final snapshot (relative to project root)
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

fn default_ticks() -> u64 {
    300
}
fn default_state_path() -> PathBuf {
    PathBuf::from(".colony/state.json")
}
fn default_events_path() -> PathBuf {
    PathBuf::from(".colony/events.jsonl")
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviourSection {
    /// Fraction of carry capacity below which workers keep gathering
    #[serde(default = "default_gather_threshold")]
    pub gather_threshold: f64,
}

fn default_gather_threshold() -> f64 {
    BehaviourConfig::default().gather_threshold
}

impl Default for BehaviourSection {
    fn default() -> Self {
        Self {
            gather_threshold: default_gather_threshold(),
        }
    }
}

impl BehaviourSection {
    pub fn behaviour_config(&self) -> BehaviourConfig {
        BehaviourConfig {
            gather_threshold: self.gather_threshold.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseConfig {
    /// Keep per-invader statistics
    #[serde(default = "default_true")]
    pub statistics: bool,

    /// Log a warning when an invader shows up
    #[serde(default = "default_true")]
    pub notify: bool,
}

impl Default for DefenseConfig {
    fn default() -> Self {
        Self {
            statistics: true,
            notify: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Whether events are written at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// JSONL file events are appended to (relative to project root)
    #[serde(default = "default_events_path")]
    pub path: PathBuf,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_events_path(),
        }
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            version: None,
            ticks: default_ticks(),
            behaviour: BehaviourSection::default(),
            delivery: DeliveryConfig::default(),
            defense: DefenseConfig::default(),
            events: EventsConfig::default(),
            state_path: default_state_path(),
        }
    }
}

impl KernelConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from project root (looks for .colony/config.yaml)
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = Self::project_path(project_root);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn project_path(project_root: &Path) -> PathBuf {
        project_root.join(".colony/config.yaml")
    }

    /// Resolve paths relative to project root
    pub fn resolve_paths(&mut self, project_root: &Path) {
        self.events.path = project_root.join(&self.events.path);
        self.state_path = project_root.join(&self.state_path);
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}
