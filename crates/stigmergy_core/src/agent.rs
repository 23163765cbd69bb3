//! Agent sensing, steering and role behaviour.
//!
//! Every update runs the same pipeline: sense → steer → move → interact →
//! deposit. The role tag picks which channels are sensed and what the
//! interact and deposit stages do.

use crate::combat::EnemyLookup;
use crate::config::{AgentConfig, ArmyConfig};
use crate::food::FoodLogic;
use crate::interaction::{AgentEvent, InteractionCommand};
use crate::pheromone::PheromoneField;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use stigmergy_data::{AgentId, AgentState, Channel, ColonyId, FoodSource, Position, Role};

/// Keeps clamped positions strictly inside the last pheromone cell.
const EDGE_MARGIN: f64 = 1e-6;

/// Field values at the three sensor points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readings {
    pub left: f32,
    pub forward: f32,
    pub right: f32,
}

impl Readings {
    #[must_use]
    pub fn total(&self) -> f32 {
        self.left + self.forward + self.right
    }
}

/// Directional decision before noise is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnChoice {
    Straight,
    Left,
    Right,
    /// Either side, picked uniformly.
    Either,
}

/// Picks a direction from sensor readings.
///
/// Forward unique maximum, or forward tied with one side and above the
/// other, keeps the heading. A side strictly above both others wins. Forward
/// strictly below two equal sides, or an exact three-way tie, is a coin flip.
#[must_use]
pub fn choose_turn(p: Readings) -> TurnChoice {
    let Readings {
        left: l,
        forward: f,
        right: r,
    } = p;
    if l > f && l > r {
        TurnChoice::Left
    } else if r > f && r > l {
        TurnChoice::Right
    } else if (f < l && f < r) || (f == l && f == r) {
        TurnChoice::Either
    } else {
        TurnChoice::Straight
    }
}

/// Role-dependent numbers fixed at spawn time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentTraits {
    pub speed: f64,
    pub health: f64,
    pub capacity: f64,
    pub damage: f64,
    pub sensor_range: f64,
    pub max_age: Option<u64>,
}

/// Everything an agent may read or touch during one update.
pub struct AgentContext<'a, R: Rng> {
    pub field: &'a mut PheromoneField,
    pub foods: &'a mut [FoodSource],
    pub enemies: &'a dyn EnemyLookup,
    pub home: Position,
    pub bounds: (f64, f64),
    pub agent: &'a AgentConfig,
    pub army: &'a ArmyConfig,
    pub follow_strength: f64,
    /// Melee only lands on the update where this is set (once per tick).
    pub strike: bool,
    pub rng: &'a mut R,
    pub commands: &'a mut Vec<InteractionCommand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub colony: ColonyId,
    pub role: Role,
    pub state: AgentState,
    pub position: Position,
    /// Radians, kept in `[0, 2π)`.
    pub heading: f64,
    pub speed: f64,
    pub health: f64,
    pub max_health: f64,
    pub carried: f64,
    pub capacity: f64,
    pub damage: f64,
    pub sensor_range: f64,
    pub age: u64,
    pub max_age: Option<u64>,
    /// Set when health runs out or age is exceeded; removal happens in the
    /// colony's cleanup pass.
    pub dead: bool,
}

impl Agent {
    #[must_use]
    pub fn new(
        id: AgentId,
        colony: ColonyId,
        role: Role,
        position: Position,
        heading: f64,
        traits: AgentTraits,
    ) -> Self {
        Self {
            id,
            colony,
            role,
            state: AgentState::initial(role),
            position,
            heading: heading.rem_euclid(TAU),
            speed: traits.speed,
            health: traits.health,
            max_health: traits.health,
            carried: 0.0,
            capacity: traits.capacity.max(0.0),
            damage: traits.damage,
            sensor_range: traits.sensor_range,
            age: 0,
            max_age: traits.max_age,
            dead: false,
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    #[must_use]
    pub fn health_fraction(&self) -> f64 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Samples `target` at the three sensor points, each reduced by
    /// `weight × channel` for every inhibitor.
    #[must_use]
    pub fn sense(
        &self,
        field: &PheromoneField,
        target: Channel,
        inhibitors: &[(Channel, f32)],
        config: &AgentConfig,
    ) -> Readings {
        let angle = config.sensor_angle();
        let read = |heading: f64| {
            let at = self.position.offset(heading, config.sensor_offset);
            let mut value = field.sample(target, at);
            for &(channel, weight) in inhibitors {
                value -= weight * field.sample(channel, at);
            }
            value
        };
        Readings {
            left: read(self.heading - angle),
            forward: read(self.heading),
            right: read(self.heading + angle),
        }
    }

    /// Turns according to `readings`, plus exploration noise, scaled by the
    /// follow strength.
    pub fn steer<R: Rng>(
        &mut self,
        readings: Readings,
        config: &AgentConfig,
        follow_strength: f64,
        rng: &mut R,
    ) {
        let angle = config.sensor_angle();
        let mut turn = match choose_turn(readings) {
            TurnChoice::Straight => 0.0,
            TurnChoice::Left => -angle,
            TurnChoice::Right => angle,
            TurnChoice::Either => {
                if rng.gen_bool(0.5) {
                    -angle
                } else {
                    angle
                }
            }
        };
        let noise = config.noise_turn();
        if noise > 0.0 {
            turn += rng.gen_range(-noise..=noise);
        }
        self.heading = (self.heading + turn * follow_strength).rem_euclid(TAU);
    }

    /// Moves `distance` along the heading. Crossing a world edge mirrors the
    /// heading on that axis and clamps the position inside.
    pub fn advance_by(&mut self, distance: f64, bounds: (f64, f64)) {
        let max_x = (bounds.0 - EDGE_MARGIN).max(0.0);
        let max_y = (bounds.1 - EDGE_MARGIN).max(0.0);
        let mut x = self.position.x + self.heading.cos() * distance;
        let mut y = self.position.y + self.heading.sin() * distance;
        let mut heading = self.heading;

        if x < 0.0 {
            x = -x;
            heading = PI - heading;
        } else if x > max_x {
            x = 2.0 * max_x - x;
            heading = PI - heading;
        }
        if y < 0.0 {
            y = -y;
            heading = -heading;
        } else if y > max_y {
            y = 2.0 * max_y - y;
            heading = -heading;
        }

        self.position = Position::new(x.clamp(0.0, max_x), y.clamp(0.0, max_y));
        self.heading = heading.rem_euclid(TAU);
    }

    pub fn advance(&mut self, bounds: (f64, f64)) {
        self.advance_by(self.speed, bounds);
    }

    /// Applies damage. Returns true when this hit killed the agent.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        if self.dead {
            return false;
        }
        self.health -= amount.max(0.0);
        if self.health <= 0.0 {
            self.health = 0.0;
            self.dead = true;
            return true;
        }
        false
    }

    /// One full update. Dead agents are left untouched.
    pub fn update<R: Rng>(&mut self, ctx: &mut AgentContext<'_, R>) -> Option<AgentEvent> {
        if self.dead {
            return None;
        }
        self.age += 1;
        if self.max_age.is_some_and(|max| self.age > max) {
            self.dead = true;
            return Some(AgentEvent::DiedOfAge);
        }
        match self.role {
            Role::Worker => self.update_worker(ctx),
            Role::Army => {
                self.update_army(ctx);
                None
            }
        }
    }

    fn update_worker<R: Rng>(&mut self, ctx: &mut AgentContext<'_, R>) -> Option<AgentEvent> {
        let config = ctx.agent;
        let readings = match self.state {
            AgentState::Return => self.sense(ctx.field, Channel::Home, &[], config),
            _ => self.sense(
                ctx.field,
                Channel::Harvest,
                &[
                    (Channel::Home, config.home_inhibition),
                    (Channel::Danger, config.danger_inhibition),
                ],
                config,
            ),
        };
        self.steer(readings, config, ctx.follow_strength, ctx.rng);
        self.advance(ctx.bounds);

        let event = match self.state {
            AgentState::Return => self.try_deliver(ctx.home, config, ctx.rng),
            _ => self.try_harvest(ctx.foods, ctx.home, config),
        };

        match self.state {
            AgentState::Return => {
                ctx.field
                    .deposit(Channel::Harvest, self.position, config.return_deposit);
            }
            _ => {
                ctx.field
                    .deposit(Channel::Home, self.position, config.search_deposit);
            }
        }
        event
    }

    /// Picks up from the first non-empty source in reach.
    pub fn try_harvest(
        &mut self,
        foods: &mut [FoodSource],
        home: Position,
        config: &AgentConfig,
    ) -> Option<AgentEvent> {
        let room = (self.capacity - self.carried).max(0.0);
        if room <= 0.0 {
            return None;
        }
        let food = foods
            .iter_mut()
            .find(|f| !f.is_exhausted() && f.in_reach(&self.position, config.pickup_distance))?;
        let taken = food.take(room);
        if taken <= 0.0 {
            return None;
        }
        self.carried = (self.carried + taken).min(self.capacity);
        self.state = AgentState::Return;
        self.heading = self.position.heading_to(&home).rem_euclid(TAU);
        Some(AgentEvent::Harvested(taken))
    }

    /// Drops the load when close enough to home.
    pub fn try_deliver<R: Rng>(
        &mut self,
        home: Position,
        config: &AgentConfig,
        rng: &mut R,
    ) -> Option<AgentEvent> {
        if self.position.distance(&home) >= config.deposit_distance {
            return None;
        }
        let delivered = self.carried;
        self.carried = 0.0;
        self.state = AgentState::Search;
        self.heading = rng.gen_range(0.0..TAU);
        Some(AgentEvent::Delivered(delivered))
    }

    fn update_army<R: Rng>(&mut self, ctx: &mut AgentContext<'_, R>) {
        let melee = ctx.army.melee_range;
        match ctx
            .enemies
            .nearest_enemy(self.colony, self.position, self.sensor_range)
        {
            Some(enemy) => {
                self.state = AgentState::Fight;
                self.heading = self.position.heading_to(&enemy.position).rem_euclid(TAU);
                if enemy.distance > melee {
                    let step = self.speed.min(enemy.distance - melee / 2.0);
                    self.advance_by(step, ctx.bounds);
                }
                if ctx.strike && self.position.distance(&enemy.position) <= melee {
                    ctx.commands.push(InteractionCommand::Damage {
                        target_colony: enemy.colony,
                        target: enemy.id,
                        attacker_colony: self.colony,
                        amount: self.damage,
                    });
                }
                ctx.field
                    .deposit(Channel::Attack, self.position, ctx.army.recruit_deposit);
            }
            None => {
                self.state = AgentState::Patrol;
                let mut readings = self.sense(ctx.field, Channel::Attack, &[], ctx.agent);
                if readings.total() < ctx.army.attack_threshold {
                    readings = self.sense(ctx.field, Channel::Home, &[], ctx.agent);
                }
                self.steer(readings, ctx.agent, ctx.follow_strength, ctx.rng);
                self.advance(ctx.bounds);
            }
        }
    }
}
