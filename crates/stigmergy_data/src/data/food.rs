use crate::data::geometry::Position;
use serde::{Deserialize, Serialize};

/// Depletable resource patch in world space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodSource {
    pub position: Position,
    /// Pickup radius; also the drawn size.
    pub radius: f64,
    pub amount: f64,
    pub max_amount: f64,
    /// Units regrown per tick. Zero means the patch relocates once exhausted.
    pub regen_rate: f64,
    /// Consecutive ticks this patch has been exhausted.
    #[serde(default)]
    pub depleted_ticks: u64,
}

impl FoodSource {
    /// Amount at or below which a patch counts as exhausted.
    pub const EXHAUSTED: f64 = 0.01;

    #[must_use]
    pub fn new(position: Position, radius: f64, max_amount: f64, regen_rate: f64) -> Self {
        Self {
            position,
            radius,
            amount: max_amount,
            max_amount,
            regen_rate,
            depleted_ticks: 0,
        }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.amount <= Self::EXHAUSTED
    }

    /// Remaining share of the maximum, in `[0, 1]`.
    #[must_use]
    pub fn remaining_fraction(&self) -> f64 {
        if self.max_amount > 0.0 {
            (self.amount / self.max_amount).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
