// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulation configuration parsed from the command line.

use std::time::Duration;

use crate::resource::ResourceKind;

/// Configuration for one simulation run.
#[derive(Debug, Clone, clap::Args)]
pub struct Config {
    /// Runway capacity.
    #[arg(long = "pistas", default_value_t = 3, value_name = "N")]
    pub runways: u32,

    /// Gate capacity.
    #[arg(long = "portoes", default_value_t = 5, value_name = "N")]
    pub gates: u32,

    /// Tower slot capacity.
    #[arg(long = "torre", default_value_t = 2, value_name = "N")]
    pub tower_slots: u32,

    /// Simulation window in seconds.
    #[arg(long = "tempo", default_value_t = 300, value_name = "SECONDS")]
    pub window_secs: u64,

    /// Minimum gap between arrivals in milliseconds.
    #[arg(long = "intervalo-min", default_value_t = 500, value_name = "MS")]
    pub interval_min_ms: u64,

    /// Maximum gap between arrivals in milliseconds.
    #[arg(long = "intervalo-max", default_value_t = 1500, value_name = "MS")]
    pub interval_max_ms: u64,

    /// Both arrival bounds in one shot; overrides the individual flags.
    #[arg(long = "intervalo", num_args = 2, value_names = ["MIN", "MAX"])]
    pub interval: Option<Vec<u64>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runways: 3,
            gates: 5,
            tower_slots: 2,
            window_secs: 300,
            interval_min_ms: 500,
            interval_max_ms: 1500,
            interval: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.runways == 0 || self.gates == 0 || self.tower_slots == 0 {
            anyhow::bail!("all capacities must be greater than zero");
        }
        if self.window_secs == 0 {
            anyhow::bail!("--tempo must be greater than zero");
        }
        if let Some(ref pair) = self.interval {
            if pair.len() != 2 {
                anyhow::bail!("--intervalo takes exactly two values: MIN MAX");
            }
        }
        let (min, max) = self.arrival_interval_ms();
        if min >= max {
            anyhow::bail!("arrival interval min ({min} ms) must be below max ({max} ms)");
        }
        Ok(())
    }

    /// Arrival gap bounds in milliseconds, with `--intervalo` taking
    /// precedence over the individual flags.
    pub fn arrival_interval_ms(&self) -> (u64, u64) {
        match self.interval.as_deref() {
            Some([min, max]) => (*min, *max),
            _ => (self.interval_min_ms, self.interval_max_ms),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn capacity_of(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Runway => self.runways,
            ResourceKind::Gate => self.gates,
            ResourceKind::TowerSlot => self.tower_slots,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
