//! Pheromone field: one scalar grid per channel, diffused and evaporated
//! every tick.
//!
//! Boundary policy: reflective. A cell on the edge uses its own value in
//! place of the missing neighbour, so pure diffusion (no evaporation) keeps
//! the channel total constant up to the epsilon floor.

use crate::config::FieldConfig;
use crate::error::{CoreError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use stigmergy_data::{Channel, Position};

/// Physics constants for one channel step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelParams {
    pub evaporation_rate: f32,
    pub diffusion: f32,
}

impl ChannelParams {
    /// Resolves the constants for `channel` under the global evaporation rate.
    #[must_use]
    pub fn resolve(config: &FieldConfig, channel: Channel, evaporation_rate: f32) -> Self {
        let c = config.channel(channel);
        Self {
            evaporation_rate: (evaporation_rate * c.evaporation_scale).clamp(0.0, 1.0),
            diffusion: c.diffusion,
        }
    }
}

/// Grid-based pheromone map owned by one colony.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PheromoneField {
    pub width: usize,
    pub height: usize,
    /// World units per cell.
    pub cell_size: f64,
    pub epsilon: f32,
    channels: Vec<Vec<f32>>,
    #[serde(skip)]
    back_buffer: Vec<f32>,
    #[serde(skip)]
    pub is_dirty: bool,
}

impl PheromoneField {
    /// Field covering a `world_width × world_height` area.
    pub fn new(world_width: f64, world_height: f64, cell_size: f64) -> Result<Self> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(CoreError::invalid_grid(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }
        let width = (world_width / cell_size).floor();
        let height = (world_height / cell_size).floor();
        if !(width >= 1.0 && height >= 1.0) {
            return Err(CoreError::invalid_grid(format!(
                "{world_width}x{world_height} world holds no {cell_size}-unit cell"
            )));
        }
        Self::with_grid(width as usize, height as usize, cell_size)
    }

    /// Field with explicit grid dimensions.
    pub fn with_grid(width: usize, height: usize, cell_size: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::invalid_grid(format!("{width}x{height}")));
        }
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(CoreError::invalid_grid(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }
        let len = width * height;
        Ok(Self {
            width,
            height,
            cell_size,
            epsilon: 1e-4,
            channels: vec![vec![0.0; len]; Channel::COUNT],
            back_buffer: vec![0.0; len],
            is_dirty: true,
        })
    }

    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[inline(always)]
    fn index(&self, gx: usize, gy: usize) -> usize {
        gy * self.width + gx
    }

    /// Cell index containing `pos`, or `None` outside the grid.
    #[inline]
    pub fn cell_index(&self, pos: Position) -> Option<usize> {
        if !pos.is_finite() || pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let gx = (pos.x / self.cell_size) as usize;
        let gy = (pos.y / self.cell_size) as usize;
        if gx >= self.width || gy >= self.height {
            None
        } else {
            Some(self.index(gx, gy))
        }
    }

    /// Adds `amount` to the cell containing `pos`. Outside the grid this is a
    /// no-op.
    pub fn deposit(&mut self, channel: Channel, pos: Position, amount: f32) {
        if let Some(idx) = self.cell_index(pos) {
            let cell = &mut self.channels[channel.index()][idx];
            *cell = (*cell + amount).max(0.0);
            self.is_dirty = true;
        }
    }

    /// Adds `amount` to grid cell `(gx, gy)`.
    pub fn deposit_cell(&mut self, channel: Channel, gx: usize, gy: usize, amount: f32) {
        assert!(
            gx < self.width && gy < self.height,
            "cell ({gx}, {gy}) outside {}x{} grid",
            self.width,
            self.height
        );
        let idx = self.index(gx, gy);
        let cell = &mut self.channels[channel.index()][idx];
        *cell = (*cell + amount).max(0.0);
        self.is_dirty = true;
    }

    /// Value of the cell containing `pos`; zero outside the grid.
    #[inline]
    pub fn sample(&self, channel: Channel, pos: Position) -> f32 {
        self.cell_index(pos)
            .map_or(0.0, |idx| self.channels[channel.index()][idx])
    }

    pub fn cell(&self, channel: Channel, gx: usize, gy: usize) -> f32 {
        assert!(
            gx < self.width && gy < self.height,
            "cell ({gx}, {gy}) outside {}x{} grid",
            self.width,
            self.height
        );
        self.channels[channel.index()][self.index(gx, gy)]
    }

    /// Row-major view of a whole channel.
    #[must_use]
    pub fn channel(&self, channel: Channel) -> &[f32] {
        &self.channels[channel.index()]
    }

    #[must_use]
    pub fn total(&self, channel: Channel) -> f64 {
        self.channels[channel.index()]
            .iter()
            .map(|&v| f64::from(v))
            .sum()
    }

    pub fn clear(&mut self, channel: Channel) {
        self.channels[channel.index()].fill(0.0);
        self.is_dirty = true;
    }

    /// One diffuse + evaporate pass over `channel`.
    ///
    /// Reads only the live grid and writes only the back buffer, then swaps
    /// the two, so no read observes a value written in the same step.
    pub fn step(&mut self, channel: Channel, evaporation_rate: f32, diffusion: f32) {
        let w = self.width;
        let h = self.height;
        let len = w * h;
        if self.back_buffer.len() != len {
            self.back_buffer.resize(len, 0.0);
        }

        let keep = 1.0 - diffusion;
        let retain = 1.0 - evaporation_rate;
        let epsilon = self.epsilon;
        let src = &self.channels[channel.index()];

        self.back_buffer
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, out)| {
                let row = y * w;
                let up = if y == 0 { row } else { row - w };
                let down = if y + 1 == h { row } else { row + w };
                for (x, slot) in out.iter_mut().enumerate() {
                    let i = row + x;
                    let center = src[i];
                    let left = if x == 0 { center } else { src[i - 1] };
                    let right = if x + 1 == w { center } else { src[i + 1] };
                    let avg = (left + right + src[up + x] + src[down + x]) * 0.25;

                    let v = (center * keep + avg * diffusion) * retain;
                    *slot = if v < epsilon { 0.0 } else { v };
                }
            });

        std::mem::swap(&mut self.channels[channel.index()], &mut self.back_buffer);
        self.is_dirty = true;
    }

    /// Steps every channel with its configured constants.
    pub fn step_all(&mut self, config: &FieldConfig, evaporation_rate: f32) {
        for channel in Channel::ALL {
            let params = ChannelParams::resolve(config, channel, evaporation_rate);
            self.step(channel, params.evaporation_rate, params.diffusion);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_10() -> PheromoneField {
        PheromoneField::with_grid(10, 10, 1.0).expect("valid grid")
    }

    #[test]
    fn test_single_deposit_decay() {
        let mut field = grid_10();
        field.deposit(Channel::Harvest, Position::new(5.5, 5.5), 10.0);
        field.step(Channel::Harvest, 0.1, 0.0);

        assert!((field.cell(Channel::Harvest, 5, 5) - 9.0).abs() < 1e-5);
        for gy in 0..10 {
            for gx in 0..10 {
                if (gx, gy) != (5, 5) {
                    assert_eq!(field.cell(Channel::Harvest, gx, gy), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_channels_are_independent() {
        let mut field = grid_10();
        field.deposit(Channel::Home, Position::new(2.0, 2.0), 3.0);
        assert_eq!(field.sample(Channel::Home, Position::new(2.0, 2.0)), 3.0);
        assert_eq!(field.sample(Channel::Danger, Position::new(2.0, 2.0)), 0.0);
        field.step(Channel::Danger, 0.5, 0.5);
        assert_eq!(field.cell(Channel::Home, 2, 2), 3.0);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut field = grid_10();
        field.deposit(Channel::Home, Position::new(-1.0, 3.0), 5.0);
        field.deposit(Channel::Home, Position::new(3.0, 10.0), 5.0);
        field.deposit(Channel::Home, Position::new(f64::NAN, 3.0), 5.0);
        assert_eq!(field.total(Channel::Home), 0.0);
        assert_eq!(field.sample(Channel::Home, Position::new(100.0, 100.0)), 0.0);
    }

    #[test]
    fn test_diffusion_spreads_to_neighbours() {
        let mut field = grid_10();
        field.deposit_cell(Channel::Home, 5, 5, 4.0);
        field.step(Channel::Home, 0.0, 1.0);
        assert_eq!(field.cell(Channel::Home, 5, 5), 0.0);
        assert!((field.cell(Channel::Home, 4, 5) - 1.0).abs() < 1e-6);
        assert!((field.cell(Channel::Home, 5, 6) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pure_diffusion_conserves_mass_at_corner() {
        let mut field = grid_10().with_epsilon(0.0);
        field.deposit_cell(Channel::Harvest, 0, 0, 8.0);
        let before = field.total(Channel::Harvest);
        for _ in 0..5 {
            field.step(Channel::Harvest, 0.0, 0.5);
        }
        let after = field.total(Channel::Harvest);
        assert!(after <= before + 1e-4);
        assert!((after - before).abs() < 1e-3);
    }

    #[test]
    fn test_small_values_extinguish() {
        let mut field = grid_10().with_epsilon(0.01);
        field.deposit_cell(Channel::Attack, 1, 1, 0.011);
        field.step(Channel::Attack, 0.5, 0.0);
        assert_eq!(field.cell(Channel::Attack, 1, 1), 0.0);
    }

    #[test]
    fn test_invalid_grid_rejected() {
        assert!(PheromoneField::with_grid(0, 10, 1.0).is_err());
        assert!(PheromoneField::new(1.0, 1.0, 2.0).is_err());
        assert!(PheromoneField::new(100.0, 100.0, 0.0).is_err());
        let field = PheromoneField::new(1200.0, 800.0, 2.0).expect("valid");
        assert_eq!((field.width, field.height), (600, 400));
    }

    #[test]
    #[should_panic]
    fn test_cell_out_of_range_panics() {
        let field = grid_10();
        let _ = field.cell(Channel::Home, 10, 0);
    }
}
