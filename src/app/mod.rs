//! Headless runner: loads a config, drives the engine and reports progress.

use crate::model::config::SimConfig;
use crate::model::engine::Engine;
use crate::model::snapshot::EngineSnapshot;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

/// Reads `path` as TOML. A missing file falls back to the defaults; a file
/// that exists but does not parse or validate is an error.
pub fn load_config(path: &Path) -> anyhow::Result<SimConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        return Ok(SimConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    SimConfig::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub ticks: u64,
    /// Ticks between progress reports. Zero disables them.
    pub report_every: u64,
    /// Emit reports as one JSON object per line.
    pub json: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: 5000,
            report_every: 500,
            json: false,
        }
    }
}

pub struct Runner {
    pub engine: Engine,
    options: RunOptions,
}

impl Runner {
    pub fn new(config: SimConfig, options: RunOptions) -> anyhow::Result<Self> {
        Ok(Self {
            engine: Engine::new(config)?,
            options,
        })
    }

    /// Runs every tick, writing reports to `out`. Returns the final state.
    pub fn run<W: Write>(&mut self, out: &mut W) -> anyhow::Result<EngineSnapshot> {
        for _ in 0..self.options.ticks {
            self.engine.tick();
            let tick = self.engine.tick_count();
            if self.options.report_every > 0 && tick % self.options.report_every == 0 {
                let snapshot = self.engine.build_snapshot();
                self.report(&snapshot, out)?;
            }
        }
        let last = self.engine.build_snapshot();
        self.summarize(&last, out)?;
        Ok(last)
    }

    fn report<W: Write>(&self, snapshot: &EngineSnapshot, out: &mut W) -> anyhow::Result<()> {
        if self.options.json {
            writeln!(out, "{}", snapshot.summary())?;
            return Ok(());
        }
        write!(out, "tick {:>7}", snapshot.tick)?;
        for colony in &snapshot.colonies {
            write!(
                out,
                " | {} stock {:.1} workers {} army {}",
                colony.name, colony.stock, colony.workers, colony.army
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn summarize<W: Write>(&self, snapshot: &EngineSnapshot, out: &mut W) -> anyhow::Result<()> {
        if self.options.json {
            writeln!(out, "{}", snapshot.summary())?;
            return Ok(());
        }
        writeln!(out, "Finished after {} ticks", snapshot.tick)?;
        for colony in &snapshot.colonies {
            write!(
                out,
                "  {:<12} stock {:>8.1}  delivered {:>8.1}",
                colony.name, colony.stock, colony.delivered
            )?;
            writeln!(
                out,
                "  workers {:>4}  army {:>4}  kills {:>4}  lost {:>4}",
                colony.workers, colony.army, colony.kills, colony.lost
            )?;
        }
        Ok(())
    }
}
