//! Colony: field physics cadence, roster, and spawn/upgrade economy.

use crate::agent::{Agent, AgentContext, AgentTraits};
use crate::combat::EnemyLookup;
use crate::config::{ColonyConfig, SimConfig, TuningParams};
use crate::error::Result;
use crate::interaction::{AgentEvent, InteractionCommand};
use crate::pheromone::PheromoneField;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use stigmergy_data::{AgentId, Channel, ColonyId, FoodSource, Position, Race, Role, UpgradeKind};

/// Why a spawn or upgrade request was turned down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeclineReason {
    InsufficientResources { needed: f64, available: f64 },
    RosterFull { cap: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOutcome {
    Spawned(AgentId),
    Declined(DeclineReason),
}

impl SpawnOutcome {
    #[must_use]
    pub fn is_spawned(&self) -> bool {
        matches!(self, SpawnOutcome::Spawned(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeOutcome {
    Applied { kind: UpgradeKind, level: u32 },
    Declined(DeclineReason),
}

impl UpgradeOutcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, UpgradeOutcome::Applied { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    pub carry_capacity: u32,
    pub spawn_rate: u32,
    pub max_agents: u32,
}

/// Lifetime counters, mostly for HUDs and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColonyStats {
    pub harvested: f64,
    pub delivered: f64,
    pub spawned: u64,
    pub lost: u64,
    pub died_of_age: u64,
    pub kills: u64,
    pub damage_taken: f64,
}

/// Shared state a colony needs for one tick.
pub struct TickContext<'a, R: Rng> {
    pub foods: &'a mut [FoodSource],
    pub enemies: &'a dyn EnemyLookup,
    pub config: &'a SimConfig,
    pub tuning: &'a TuningParams,
    pub bounds: (f64, f64),
    pub rng: &'a mut R,
    pub commands: &'a mut Vec<InteractionCommand>,
}

#[derive(Debug, Clone)]
pub struct Colony {
    pub id: ColonyId,
    pub race: Race,
    pub home: Position,
    /// Never negative: every debit is checked first.
    pub stock: f64,
    pub agents: Vec<Agent>,
    pub field: PheromoneField,
    pub is_player: bool,
    pub auto_replenish: bool,
    pub max_agents: usize,
    /// Ticks left before the next replenishment spawn.
    pub spawn_cooldown: u64,
    pub upgrades: UpgradeLevels,
    pub stats: ColonyStats,
}

impl Colony {
    /// Empty colony with an allocated field set. Agents are added by
    /// [`Colony::seed`] or the spawn operations.
    pub fn new(id: ColonyId, config: &ColonyConfig, sim: &SimConfig) -> Result<Self> {
        let field = PheromoneField::new(sim.world.width, sim.world.height, sim.world.cell_size)?
            .with_epsilon(sim.field.epsilon);
        Ok(Self {
            id,
            race: config.race.clone(),
            home: config.home_position(&sim.world),
            stock: config.initial_stock.max(0.0),
            agents: Vec::new(),
            field,
            is_player: config.player,
            auto_replenish: config.auto_replenish,
            max_agents: config.max_agents,
            spawn_cooldown: 0,
            upgrades: UpgradeLevels::default(),
            stats: ColonyStats::default(),
        })
    }

    /// Spawns the configured starting roster.
    pub fn seed<R: Rng>(&mut self, config: &ColonyConfig, sim: &SimConfig, rng: &mut R) {
        for _ in 0..config.initial_workers {
            self.spawn(Role::Worker, sim, rng);
        }
        for _ in 0..config.initial_army {
            self.spawn(Role::Army, sim, rng);
        }
    }

    /// Spawn-time numbers for `role` under the current race stats.
    pub fn traits_for<R: Rng>(&self, role: Role, sim: &SimConfig, rng: &mut R) -> AgentTraits {
        let stats = &self.race.stats;
        let base_speed = rng.gen_range(sim.agent.min_speed..=sim.agent.max_speed);
        let max_age = sim
            .agent
            .lifespan
            .map(|ticks| (ticks as f64 * stats.lifespan).round() as u64);
        let sensor_range = sim.army.sensor_range * stats.sensor_range;
        match role {
            Role::Worker => AgentTraits {
                speed: base_speed * stats.speed,
                health: sim.agent.health * stats.health,
                capacity: sim.agent.capacity * stats.carry_capacity,
                damage: 0.0,
                sensor_range,
                max_age,
            },
            Role::Army => AgentTraits {
                speed: base_speed * stats.speed,
                health: sim.army.health * stats.health,
                capacity: 0.0,
                damage: sim.army.damage * stats.damage,
                sensor_range,
                max_age,
            },
        }
    }

    /// Unconditionally adds an agent at home with a random heading.
    pub fn spawn<R: Rng>(&mut self, role: Role, sim: &SimConfig, rng: &mut R) -> AgentId {
        let traits = self.traits_for(role, sim, rng);
        let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
        let heading = rng.gen_range(0.0..TAU);
        self.agents
            .push(Agent::new(id, self.id, role, self.home, heading, traits));
        self.stats.spawned += 1;
        tracing::debug!(colony = %self.id, ?role, %id, "Agent spawned");
        id
    }

    fn check_funds(&self, cost: f64) -> std::result::Result<(), DeclineReason> {
        if self.stock >= cost {
            Ok(())
        } else {
            Err(DeclineReason::InsufficientResources {
                needed: cost,
                available: self.stock,
            })
        }
    }

    fn debit(&mut self, cost: f64) {
        debug_assert!(self.stock >= cost);
        self.stock = (self.stock - cost).max(0.0);
    }

    /// Spawns if the colony can pay and has room; otherwise leaves
    /// everything unchanged.
    pub fn request_spawn<R: Rng>(
        &mut self,
        role: Role,
        sim: &SimConfig,
        rng: &mut R,
    ) -> SpawnOutcome {
        let cost = sim.economy.cost(role);
        if let Err(reason) = self.check_funds(cost) {
            return SpawnOutcome::Declined(reason);
        }
        if self.population() >= self.max_agents {
            return SpawnOutcome::Declined(DeclineReason::RosterFull {
                cap: self.max_agents,
            });
        }
        self.debit(cost);
        SpawnOutcome::Spawned(self.spawn(role, sim, rng))
    }

    /// Flat-cost permanent upgrade.
    pub fn request_upgrade(&mut self, kind: UpgradeKind, sim: &SimConfig) -> UpgradeOutcome {
        let economy = &sim.economy;
        let cost = match kind {
            UpgradeKind::CarryCapacity => economy.capacity_upgrade_cost,
            UpgradeKind::SpawnRate => economy.spawn_rate_upgrade_cost,
            UpgradeKind::MaxAgents => economy.max_agents_upgrade_cost,
        };
        if let Err(reason) = self.check_funds(cost) {
            return UpgradeOutcome::Declined(reason);
        }
        self.debit(cost);

        let level = match kind {
            UpgradeKind::CarryCapacity => {
                let factor = economy.capacity_upgrade_factor;
                self.race.stats.carry_capacity *= factor;
                for agent in self.agents.iter_mut().filter(|a| a.role == Role::Worker) {
                    agent.capacity *= factor;
                }
                self.upgrades.carry_capacity += 1;
                self.upgrades.carry_capacity
            }
            UpgradeKind::SpawnRate => {
                self.race.stats.spawn_rate *= economy.spawn_rate_upgrade_factor;
                self.upgrades.spawn_rate += 1;
                self.upgrades.spawn_rate
            }
            UpgradeKind::MaxAgents => {
                self.max_agents += economy.max_agents_upgrade_step;
                self.upgrades.max_agents += 1;
                self.upgrades.max_agents
            }
        };
        tracing::debug!(colony = %self.id, ?kind, level, stock = self.stock, "Upgrade applied");
        UpgradeOutcome::Applied { kind, level }
    }

    /// Random growth of computer-controlled colonies.
    pub fn auto_spawn<R: Rng>(&mut self, sim: &SimConfig, rng: &mut R) -> Option<AgentId> {
        if self.is_player {
            return None;
        }
        // 0 * inf is NaN, which gen_bool rejects.
        let chance = sim.economy.auto_spawn_chance * self.race.stats.spawn_rate;
        if chance.is_nan() || chance <= 0.0 {
            return None;
        }
        if !rng.gen_bool(chance.min(1.0)) {
            return None;
        }
        let role = if rng.gen_bool(sim.economy.army_fraction) {
            Role::Army
        } else {
            Role::Worker
        };
        match self.request_spawn(role, sim, rng) {
            SpawnOutcome::Spawned(id) => Some(id),
            SpawnOutcome::Declined(_) => None,
        }
    }

    /// Cooldown-limited worker spawning for player colonies.
    pub fn replenish<R: Rng>(&mut self, sim: &SimConfig, rng: &mut R) -> Option<AgentId> {
        if !self.is_player || !self.auto_replenish || self.spawn_cooldown > 0 {
            return None;
        }
        match self.request_spawn(Role::Worker, sim, rng) {
            SpawnOutcome::Spawned(id) => {
                let cooldown = sim.economy.spawn_cooldown_ticks as f64 / self.race.stats.spawn_rate;
                self.spawn_cooldown = if cooldown.is_finite() {
                    cooldown.round() as u64
                } else {
                    u64::MAX
                };
                Some(id)
            }
            SpawnOutcome::Declined(_) => None,
        }
    }

    /// Advances fields and every agent by one tick, then drops the dead.
    pub fn tick<R: Rng>(&mut self, ctx: &mut TickContext<'_, R>) {
        let sim = ctx.config;
        self.field.step_all(&sim.field, ctx.tuning.evaporation_rate);
        self.field
            .deposit(Channel::Home, self.home, sim.field.home_seed_strength);

        let substeps = sim.world.substeps.max(1);
        for step in 0..substeps {
            let strike = step + 1 == substeps;
            for agent in self.agents.iter_mut() {
                if agent.dead {
                    continue;
                }
                let mut agent_ctx = AgentContext {
                    field: &mut self.field,
                    foods: &mut *ctx.foods,
                    enemies: ctx.enemies,
                    home: self.home,
                    bounds: ctx.bounds,
                    agent: &sim.agent,
                    army: &sim.army,
                    follow_strength: ctx.tuning.follow_strength,
                    strike,
                    rng: &mut *ctx.rng,
                    commands: &mut *ctx.commands,
                };
                match agent.update(&mut agent_ctx) {
                    Some(AgentEvent::Harvested(amount)) => self.stats.harvested += amount,
                    Some(AgentEvent::Delivered(amount)) => {
                        self.stock += amount;
                        self.stats.delivered += amount;
                    }
                    Some(AgentEvent::DiedOfAge) => self.stats.died_of_age += 1,
                    None => {}
                }
            }
        }

        self.spawn_cooldown = self.spawn_cooldown.saturating_sub(1);
        self.remove_dead();
    }

    /// Applies a hit to `target`. Returns `Some(true)` if it died from this
    /// hit, `Some(false)` if it survived, `None` if no live agent matched.
    /// The victim marks the spot with DANGER.
    pub fn apply_damage(
        &mut self,
        target: AgentId,
        amount: f64,
        danger_deposit: f32,
    ) -> Option<bool> {
        let agent = self
            .agents
            .iter_mut()
            .find(|a| a.id == target && !a.dead)?;
        let killed = agent.take_damage(amount);
        let at = agent.position;
        self.stats.damage_taken += amount.max(0.0);
        self.field.deposit(Channel::Danger, at, danger_deposit);
        Some(killed)
    }

    /// Compaction pass: removes every agent flagged dead.
    pub fn remove_dead(&mut self) -> usize {
        let before = self.agents.len();
        self.agents.retain(Agent::is_alive);
        let removed = before - self.agents.len();
        if removed > 0 {
            self.stats.lost += removed as u64;
            tracing::debug!(colony = %self.id, removed, "Dead agents removed");
        }
        removed
    }

    /// Live agents.
    #[must_use]
    pub fn population(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    #[must_use]
    pub fn count_role(&self, role: Role) -> usize {
        self.agents
            .iter()
            .filter(|a| a.is_alive() && a.role == role)
            .count()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }
}
