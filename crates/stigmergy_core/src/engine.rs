//! Multi-colony simulation engine.
//!
//! The engine owns every colony, the food sources and the enemy index. Outside
//! callers only read through snapshots and iterators, and only write through
//! [`Command`]s, which are applied at the next tick boundary.

use crate::agent::Agent;
use crate::colony::{Colony, SpawnOutcome, TickContext, UpgradeOutcome};
use crate::combat::{EnemyEntry, EnemyLookup, ExhaustiveScan, GridEnemyIndex};
use crate::command::Command;
use crate::config::{EnemyIndexKind, SimConfig, TuningParams};
use crate::error::{CoreError, Result};
use crate::food;
use crate::interaction::InteractionCommand;
use crate::metrics::Metrics;
use crate::snapshot::{AgentSnapshot, ColonySnapshot, EngineSnapshot, FoodSnapshot};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use stigmergy_data::{ColonyId, FoodSource, Position, Role, UpgradeKind};

pub struct Engine {
    config: SimConfig,
    tick: u64,
    colonies: Vec<Colony>,
    foods: Vec<FoodSource>,
    tuning: TuningParams,
    pending: VecDeque<Command>,
    rng: ChaCha8Rng,
    enemy_index: Box<dyn EnemyLookup>,
    interaction_buffer: Vec<InteractionCommand>,
    metrics: Metrics,
    snapshot: Option<Arc<EngineSnapshot>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("tick", &self.tick)
            .field("colonies", &self.colonies.len())
            .field("foods", &self.foods.len())
            .field("tuning", &self.tuning)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Validates `config` and builds the initial world. The RNG is seeded from
    /// `config.world.seed`, or from entropy when no seed is set.
    pub fn new(config: SimConfig) -> anyhow::Result<Self> {
        let rng = if let Some(seed) = config.world.seed {
            ChaCha8Rng::seed_from_u64(seed)
        } else {
            ChaCha8Rng::from_entropy()
        };
        Self::with_rng(config, rng)
    }

    /// Same as [`Engine::new`] with an injected RNG.
    pub fn with_rng(config: SimConfig, mut rng: ChaCha8Rng) -> anyhow::Result<Self> {
        config.validate()?;

        let mut colonies = Vec::with_capacity(config.colonies.len());
        for (idx, colony_config) in config.colonies.iter().enumerate() {
            let mut colony = Colony::new(ColonyId(idx), colony_config, &config)?;
            colony.seed(colony_config, &config, &mut rng);
            colonies.push(colony);
        }

        let homes: Vec<Position> = colonies.iter().map(|c| c.home).collect();
        let bounds = (config.world.width, config.world.height);
        let foods = food::scatter(&mut rng, &config.food, bounds, &homes);

        let enemy_index: Box<dyn EnemyLookup> = match config.world.enemy_index {
            EnemyIndexKind::Grid => Box::new(GridEnemyIndex::new(
                config.army.sensor_range.max(config.world.cell_size),
                config.world.width,
                config.world.height,
            )),
            EnemyIndexKind::Exhaustive => Box::new(ExhaustiveScan::default()),
        };

        tracing::info!(
            colonies = colonies.len(),
            agents = colonies.iter().map(Colony::population).sum::<usize>(),
            foods = foods.len(),
            seed = ?config.world.seed,
            fingerprint = %config.fingerprint(),
            "Engine initialised"
        );

        Ok(Self {
            tuning: TuningParams::from_config(&config.tuning),
            metrics: Metrics::new(config.world.report_interval),
            config,
            tick: 0,
            colonies,
            foods,
            pending: VecDeque::new(),
            rng,
            enemy_index,
            interaction_buffer: Vec::new(),
            snapshot: None,
        })
    }

    /// Queues a command for the next tick boundary.
    pub fn submit(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn request_spawn(&mut self, colony: ColonyId, role: Role) {
        self.submit(Command::Spawn { colony, role });
    }

    pub fn request_upgrade(&mut self, colony: ColonyId, kind: UpgradeKind) {
        self.submit(Command::Upgrade { colony, kind });
    }

    pub fn set_evaporation_rate(&mut self, rate: f32) {
        self.submit(Command::SetEvaporationRate(rate));
    }

    pub fn set_follow_strength(&mut self, strength: f64) {
        self.submit(Command::SetFollowStrength(strength));
    }

    fn colony_index(&self, id: ColonyId) -> Result<usize> {
        self.colonies
            .iter()
            .position(|c| c.id == id)
            .ok_or(CoreError::UnknownColony(id))
    }

    fn apply_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Spawn { colony, role } => {
                let idx = self.colony_index(colony)?;
                let outcome = self.colonies[idx].request_spawn(role, &self.config, &mut self.rng);
                match outcome {
                    SpawnOutcome::Spawned(_) => self.metrics.increment_counter("spawn_requests"),
                    SpawnOutcome::Declined(reason) => {
                        tracing::debug!(%colony, ?role, ?reason, "Spawn declined");
                    }
                }
            }
            Command::Upgrade { colony, kind } => {
                let idx = self.colony_index(colony)?;
                match self.colonies[idx].request_upgrade(kind, &self.config) {
                    UpgradeOutcome::Applied { .. } => self.metrics.increment_counter("upgrades"),
                    UpgradeOutcome::Declined(reason) => {
                        tracing::debug!(%colony, ?kind, ?reason, "Upgrade declined");
                    }
                }
            }
            Command::SetEvaporationRate(rate) => {
                if !rate.is_finite() {
                    return Err(CoreError::invalid_config("evaporation rate is not finite"));
                }
                let (lo, hi) = self.config.tuning.evaporation_range;
                let clamped = rate.clamp(lo, hi);
                if clamped != rate {
                    tracing::warn!(requested = rate, applied = clamped, "Evaporation rate clamped");
                }
                self.tuning.evaporation_rate = clamped;
            }
            Command::SetFollowStrength(strength) => {
                if !strength.is_finite() {
                    return Err(CoreError::invalid_config("follow strength is not finite"));
                }
                let (lo, hi) = self.config.tuning.follow_range;
                let clamped = strength.clamp(lo, hi);
                if clamped != strength {
                    tracing::warn!(
                        requested = strength,
                        applied = clamped,
                        "Follow strength clamped"
                    );
                }
                self.tuning.follow_strength = clamped;
            }
        }
        Ok(())
    }

    fn apply_pending(&mut self) {
        while let Some(command) = self.pending.pop_front() {
            if let Err(e) = self.apply_command(command) {
                tracing::warn!(error = %e, ?command, "Command dropped");
                self.metrics.increment_counter("dropped_commands");
            }
        }
    }

    fn rebuild_enemy_index(&mut self) {
        let entries: Vec<EnemyEntry> = self
            .colonies
            .iter()
            .flat_map(|c| c.agents.iter())
            .filter(|a| a.is_alive())
            .map(|a| EnemyEntry {
                colony: a.colony,
                id: a.id,
                position: a.position,
            })
            .collect();
        self.enemy_index
            .rebuild(entries, self.config.world.width, self.config.world.height);
    }

    fn resolve_interactions(&mut self, commands: &mut Vec<InteractionCommand>) {
        let danger = self.config.agent.danger_deposit;
        for command in commands.drain(..) {
            match command {
                InteractionCommand::Damage {
                    target_colony,
                    target,
                    attacker_colony,
                    amount,
                } => {
                    let Ok(idx) = self.colony_index(target_colony) else {
                        continue;
                    };
                    if self.colonies[idx].apply_damage(target, amount, danger) == Some(true) {
                        if let Ok(attacker) = self.colony_index(attacker_colony) {
                            self.colonies[attacker].stats.kills += 1;
                        }
                        self.metrics.increment_counter("kills");
                        tracing::debug!(%attacker_colony, %target_colony, %target, "Agent killed");
                    }
                }
            }
        }
    }

    /// Advances the whole simulation by one tick.
    pub fn tick(&mut self) {
        let start = Instant::now();
        self.apply_pending();
        self.rebuild_enemy_index();

        let bounds = (self.config.world.width, self.config.world.height);
        let mut commands = std::mem::take(&mut self.interaction_buffer);
        let mut auto_spawned = 0;
        for colony in self.colonies.iter_mut() {
            let mut ctx = TickContext {
                foods: &mut self.foods,
                enemies: self.enemy_index.as_ref(),
                config: &self.config,
                tuning: &self.tuning,
                bounds,
                rng: &mut self.rng,
                commands: &mut commands,
            };
            colony.tick(&mut ctx);
            if colony.auto_spawn(&self.config, &mut self.rng).is_some() {
                auto_spawned += 1;
            }
            if colony.replenish(&self.config, &mut self.rng).is_some() {
                auto_spawned += 1;
            }
        }
        self.metrics.add_to_counter("auto_spawns", auto_spawned);

        self.resolve_interactions(&mut commands);
        self.interaction_buffer = commands;

        let homes: Vec<Position> = self.colonies.iter().map(|c| c.home).collect();
        let relocated = food::update(
            &mut self.foods,
            &mut self.rng,
            &self.config.food,
            bounds,
            &homes,
        );
        self.metrics
            .add_to_counter("food_relocations", relocated as u64);

        for colony in self.colonies.iter_mut() {
            colony.remove_dead();
        }

        self.tick += 1;
        self.snapshot = None;
        self.metrics
            .record_tick(start.elapsed(), self.population(), self.foods.len());
    }

    /// Runs `ticks` ticks back to back.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Read-only view of the current state, cached until the next tick.
    pub fn snapshot(&mut self) -> Arc<EngineSnapshot> {
        if let Some(snapshot) = &self.snapshot {
            return Arc::clone(snapshot);
        }
        let snapshot = Arc::new(self.build_snapshot());
        self.snapshot = Some(Arc::clone(&snapshot));
        snapshot
    }

    #[must_use]
    pub fn build_snapshot(&self) -> EngineSnapshot {
        let (grid_width, grid_height, cell_size) = self
            .colonies
            .first()
            .map_or((0, 0, self.config.world.cell_size), |c| {
                (c.field.width, c.field.height, c.field.cell_size)
            });
        EngineSnapshot {
            tick: self.tick,
            width: self.config.world.width,
            height: self.config.world.height,
            grid_width,
            grid_height,
            cell_size,
            colonies: self
                .colonies
                .iter()
                .map(|c| ColonySnapshot {
                    id: c.id,
                    name: c.race.name.clone(),
                    color: c.race.color,
                    home: c.home,
                    is_player: c.is_player,
                    stock: c.stock,
                    workers: c.count_role(Role::Worker),
                    army: c.count_role(Role::Army),
                    max_agents: c.max_agents,
                    delivered: c.stats.delivered,
                    kills: c.stats.kills,
                    lost: c.stats.lost,
                    field: Arc::new(c.field.clone()),
                })
                .collect(),
            agents: self
                .agents()
                .map(|a| AgentSnapshot {
                    id: a.id,
                    colony: a.colony,
                    position: a.position,
                    heading: a.heading,
                    role: a.role,
                    state: a.state,
                    carried: a.carried,
                    health_fraction: a.health_fraction(),
                })
                .collect(),
            foods: self
                .foods
                .iter()
                .map(|f| FoodSnapshot {
                    position: f.position,
                    radius: f.radius,
                    remaining_fraction: f.remaining_fraction(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn tuning(&self) -> TuningParams {
        self.tuning
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    pub fn colonies(&self) -> &[Colony] {
        &self.colonies
    }

    pub fn colony(&self, id: ColonyId) -> Option<&Colony> {
        self.colonies.iter().find(|c| c.id == id)
    }

    /// Direct access for scenario setup. Invalidates the cached snapshot.
    pub fn colony_mut(&mut self, id: ColonyId) -> Option<&mut Colony> {
        self.snapshot = None;
        self.colonies.iter_mut().find(|c| c.id == id)
    }

    /// Every live agent of every colony, colony by colony.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.colonies
            .iter()
            .flat_map(|c| c.agents.iter())
            .filter(|a| a.is_alive())
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.colonies.iter().map(Colony::population).sum()
    }

    pub fn foods(&self) -> &[FoodSource] {
        &self.foods
    }

    /// Direct access for scenario setup. Invalidates the cached snapshot.
    pub fn foods_mut(&mut self) -> &mut Vec<FoodSource> {
        self.snapshot = None;
        &mut self.foods
    }

    pub fn add_food(&mut self, food: FoodSource) {
        self.foods_mut().push(food);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stigmergy_data::{AgentState, Channel};

    fn quiet_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.world.width = 200.0;
        config.world.height = 200.0;
        config.world.seed = Some(11);
        config.food.count = 0;
        config.economy.auto_spawn_chance = 0.0;
        config.colonies[0].home = Some((50.0, 50.0));
        config.colonies[0].initial_workers = 0;
        config.colonies[0].auto_replenish = false;
        config.colonies[1].home = Some((150.0, 150.0));
        config.colonies[1].initial_workers = 0;
        config.colonies[1].initial_army = 0;
        config
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = quiet_config();
        config.world.cell_size = 0.0;
        assert!(Engine::new(config).is_err());
    }

    #[test]
    fn test_commands_apply_at_next_tick() {
        let mut engine = Engine::new(quiet_config()).expect("engine");
        engine
            .colony_mut(ColonyId(0))
            .expect("colony 0")
            .stock = 100.0;
        engine.request_spawn(ColonyId(0), Role::Worker);
        assert_eq!(engine.population(), 0);
        assert_eq!(engine.pending_commands(), 1);

        engine.tick();
        assert_eq!(engine.pending_commands(), 0);
        assert_eq!(engine.population(), 1);
        let colony = engine.colony(ColonyId(0)).expect("colony 0");
        assert_eq!(colony.stock, 100.0 - engine.config().economy.worker_cost);
    }

    #[test]
    fn test_unknown_colony_is_dropped() {
        let mut engine = Engine::new(quiet_config()).expect("engine");
        engine.request_spawn(ColonyId(42), Role::Worker);
        engine.tick();
        assert_eq!(engine.population(), 0);
        assert_eq!(engine.metrics().counter("dropped_commands"), 1);
    }

    #[test]
    fn test_tuning_is_clamped() {
        let mut engine = Engine::new(quiet_config()).expect("engine");
        engine.set_evaporation_rate(5.0);
        engine.set_follow_strength(-1.0);
        engine.tick();
        let (_, evap_max) = engine.config().tuning.evaporation_range;
        let (follow_min, _) = engine.config().tuning.follow_range;
        assert_eq!(engine.tuning().evaporation_rate, evap_max);
        assert_eq!(engine.tuning().follow_strength, follow_min);
    }

    #[test]
    fn test_lethal_combat_removes_target() {
        let mut engine = Engine::new(quiet_config()).expect("engine");
        let config = engine.config().clone();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let attacker = engine.colony_mut(ColonyId(0)).expect("colony 0");
        attacker.spawn(Role::Army, &config, &mut rng);
        attacker.agents[0].position = Position::new(100.0, 100.0);

        let defender = engine.colony_mut(ColonyId(1)).expect("colony 1");
        let victim = defender.spawn(Role::Worker, &config, &mut rng);
        defender.agents[0].position = Position::new(101.0, 100.0);
        defender.agents[0].speed = 0.0;
        defender.agents[0].health = 1.0;

        engine.tick();

        let defender = engine.colony(ColonyId(1)).expect("colony 1");
        assert!(defender.agent(victim).is_none());
        assert_eq!(defender.stats.lost, 1);
        assert!(defender.field.sample(Channel::Danger, Position::new(101.0, 100.0)) > 0.0);
        let attacker = engine.colony(ColonyId(0)).expect("colony 0");
        assert_eq!(attacker.stats.kills, 1);
        assert_eq!(attacker.agents[0].state, AgentState::Fight);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut config = SimConfig::default();
        config.world.width = 300.0;
        config.world.height = 300.0;
        config.world.seed = Some(99);
        config.food.count = 8;
        config.colonies[0].home = Some((150.0, 150.0));
        config.colonies[1].home = Some((60.0, 60.0));

        let mut a = Engine::new(config.clone()).expect("engine a");
        let mut b = Engine::new(config).expect("engine b");
        a.run(50);
        b.run(50);

        let pa: Vec<_> = a.agents().map(|ag| (ag.id, ag.position)).collect();
        let pb: Vec<_> = b.agents().map(|ag| (ag.id, ag.position)).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_snapshot_is_cached_until_tick() {
        let mut engine = Engine::new(quiet_config()).expect("engine");
        let first = engine.snapshot();
        let again = engine.snapshot();
        assert!(Arc::ptr_eq(&first, &again));
        engine.tick();
        let next = engine.snapshot();
        assert_eq!(next.tick, 1);
        assert_eq!(next.colonies.len(), 2);
        let merged = next.merged_channel(Channel::Home);
        assert_eq!(merged.len(), next.grid_width * next.grid_height);
        assert!(merged.iter().all(|v| *v >= 0.0));
    }
}
