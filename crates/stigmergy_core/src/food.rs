//! Food placement, harvesting and regrowth.

use crate::config::FoodConfig;
use rand::Rng;
use stigmergy_data::{FoodSource, Position};

/// Behaviour attached to [`FoodSource`].
pub trait FoodLogic {
    /// Removes up to `wanted` units and returns what was actually taken.
    fn take(&mut self, wanted: f64) -> f64;
    /// Regrows by `regen_rate`, capped at `max_amount`.
    fn regenerate(&mut self);
    /// True when `pos` is close enough to pick up from this source.
    fn in_reach(&self, pos: &Position, pickup_distance: f64) -> bool;
}

impl FoodLogic for FoodSource {
    fn take(&mut self, wanted: f64) -> f64 {
        let taken = wanted.max(0.0).min(self.amount);
        self.amount = (self.amount - taken).max(0.0);
        taken
    }

    fn regenerate(&mut self) {
        if self.amount < self.max_amount {
            self.amount = (self.amount + self.regen_rate).min(self.max_amount);
        }
    }

    fn in_reach(&self, pos: &Position, pickup_distance: f64) -> bool {
        self.position.distance(pos) < self.radius.min(pickup_distance)
    }
}

fn coordinate<R: Rng>(rng: &mut R, radius: f64, extent: f64) -> f64 {
    if extent > 2.0 * radius {
        rng.gen_range(radius..extent - radius)
    } else {
        extent / 2.0
    }
}

/// Random position for a patch of `radius` at least `clearance` away from
/// every home. Gives up after a fixed number of tries and keeps the last
/// candidate.
fn place<R: Rng>(
    rng: &mut R,
    radius: f64,
    bounds: (f64, f64),
    homes: &[Position],
    clearance: f64,
) -> Position {
    let (w, h) = bounds;
    let mut candidate = Position::new(
        coordinate(rng, radius, w),
        coordinate(rng, radius, h),
    );
    for _ in 0..30 {
        if homes.iter().all(|home| home.distance(&candidate) > clearance) {
            break;
        }
        candidate = Position::new(coordinate(rng, radius, w), coordinate(rng, radius, h));
    }
    candidate
}

/// Initial food layout.
pub fn scatter<R: Rng>(
    rng: &mut R,
    config: &FoodConfig,
    bounds: (f64, f64),
    homes: &[Position],
) -> Vec<FoodSource> {
    (0..config.count)
        .map(|_| spawn_one(rng, config, bounds, homes))
        .collect()
}

fn spawn_one<R: Rng>(
    rng: &mut R,
    config: &FoodConfig,
    bounds: (f64, f64),
    homes: &[Position],
) -> FoodSource {
    let radius = rng.gen_range(config.min_radius..=config.max_radius);
    let position = place(rng, radius, bounds, homes, config.home_clearance);
    let max_amount = rng.gen_range(config.min_amount..=config.max_amount).floor();
    FoodSource::new(position, radius, max_amount, config.regen_rate)
}

/// Per-tick food update. Regrowing patches regrow in place; exhausted
/// patches without regrowth relocate once they have been empty for
/// `respawn_delay` ticks. Returns the number of relocated patches.
pub fn update<R: Rng>(
    foods: &mut [FoodSource],
    rng: &mut R,
    config: &FoodConfig,
    bounds: (f64, f64),
    homes: &[Position],
) -> usize {
    let mut respawned = 0;
    for food in foods.iter_mut() {
        if food.regen_rate > 0.0 {
            food.regenerate();
            food.depleted_ticks = 0;
            continue;
        }
        if !food.is_exhausted() {
            food.depleted_ticks = 0;
            continue;
        }
        food.depleted_ticks += 1;
        if food.depleted_ticks >= config.respawn_delay {
            *food = spawn_one(rng, config, bounds, homes);
            respawned += 1;
        }
    }
    if respawned > 0 {
        tracing::debug!(respawned, "Food patches relocated");
    }
    respawned
}
