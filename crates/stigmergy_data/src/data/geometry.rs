use serde::{Deserialize, Serialize};

/// World position in continuous coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_sq(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    #[must_use]
    pub fn distance(&self, other: &Position) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Point `dist` units away along `heading` (radians).
    #[must_use]
    pub fn offset(&self, heading: f64, dist: f64) -> Position {
        Position {
            x: self.x + heading.cos() * dist,
            y: self.y + heading.sin() * dist,
        }
    }

    /// Heading (radians) that points from `self` toward `target`.
    #[must_use]
    pub fn heading_to(&self, target: &Position) -> f64 {
        (target.y - self.y).atan2(target.x - self.x)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
