use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tix_engine::EngineConfig;
use tix_server::ServerConfig;

use crate::cli::{ServeArgs, SimulateArgs};

/// Load simulation parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tickets: u64,
    pub requests: u64,
    pub workers: usize,
    pub timeout_secs: u64,
    pub batch_size: u64,
    /// Log a progress line every this many results
    pub progress_every: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tickets: 50_000,
            requests: 75_000,
            workers: 1000,
            timeout_secs: 30,
            batch_size: 1000,
            progress_every: 5000,
        }
    }
}

/// Everything `tix` can be configured with; file values, then flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TixConfig {
    pub simulation: SimulationConfig,
    pub engine: EngineConfig,
    pub server: ServerConfig,
}

impl Default for TixConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            engine: EngineConfig {
                latency_jitter_us: 100,
            },
            server: ServerConfig::default(),
        }
    }
}

impl TixConfig {
    /// Read `path` if given, falling back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn apply_simulate_args(&mut self, args: &SimulateArgs) {
        let sim = &mut self.simulation;
        if let Some(v) = args.tickets {
            sim.tickets = v;
        }
        if let Some(v) = args.requests {
            sim.requests = v;
        }
        if let Some(v) = args.workers {
            sim.workers = v;
        }
        if let Some(v) = args.timeout_secs {
            sim.timeout_secs = v;
        }
        if let Some(v) = args.batch_size {
            sim.batch_size = v;
        }
        if let Some(v) = args.jitter_us {
            self.engine.latency_jitter_us = v;
        }
    }

    pub fn apply_serve_args(&mut self, args: &ServeArgs) {
        if let Some(bind) = args.bind {
            self.server.bind_addr = bind;
        }
        if let Some(tickets) = args.tickets {
            self.server.total_tickets = tickets;
        }
    }
}
