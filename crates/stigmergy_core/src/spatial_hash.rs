use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

#[derive(Clone, Debug, Default)]
/// Uniform grid bucketing of point positions.
///
/// Uses the "offset array" layout (like compressed sparse rows):
/// `cell_offsets[i]..cell_offsets[i+1]` indexes the slice of
/// `entity_indices` holding every entry that falls in cell `i`.
///
/// # Performance Characteristics
/// - Construction: O(entity_count + cell_count), counting pass in parallel
/// - Radius query: O(cells touched + entries in them)
///
/// # Examples
/// ```
/// use stigmergy_core::spatial_hash::SpatialHash;
///
/// let mut spatial = SpatialHash::new(10.0, 100.0, 100.0);
/// let positions = vec![(15.0, 15.0), (25.0, 25.0), (85.0, 85.0)];
/// spatial.build_parallel(&positions, 100.0, 100.0);
///
/// let mut nearby = Vec::new();
/// spatial.query_into(15.0, 15.0, 20.0, &mut nearby);
/// assert_eq!(nearby.len(), 2);
/// ```
pub struct SpatialHash {
    pub cell_size: f64,
    pub width: f64,
    pub height: f64,
    pub cols: usize,
    pub rows: usize,
    pub cell_offsets: Vec<usize>,
    pub entity_indices: Vec<usize>,
}

impl SpatialHash {
    /// Creates an empty hash covering `width × height` world units.
    pub fn new(cell_size: f64, width: f64, height: f64) -> Self {
        let cols = (width / cell_size).ceil().max(1.0) as usize;
        let rows = (height / cell_size).ceil().max(1.0) as usize;
        Self {
            cell_size,
            width,
            height,
            cols,
            rows,
            cell_offsets: vec![0; cols * rows + 1],
            entity_indices: Vec::new(),
        }
    }

    /// Flat cell index for a world coordinate.
    ///
    /// Non-finite coordinates and coordinates outside the world return `None`.
    /// A coordinate exactly on the far edge maps to the last cell.
    #[inline]
    pub fn get_cell_idx(&self, x: f64, y: f64) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        if x < 0.0 || y < 0.0 || x > self.width || y > self.height {
            return None;
        }

        let cx = ((x / self.cell_size) as usize).min(self.cols - 1);
        let cy = ((y / self.cell_size) as usize).min(self.rows - 1);
        Some(cy * self.cols + cx)
    }

    pub fn build_parallel(&mut self, positions: &[(f64, f64)], width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.cols = (width / self.cell_size).ceil().max(1.0) as usize;
        self.rows = (height / self.cell_size).ceil().max(1.0) as usize;

        let cell_count = self.cols * self.rows;
        let entity_count = positions.len();

        let atomic_counts: Vec<AtomicUsize> =
            (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
        positions.par_iter().for_each(|&(x, y)| {
            if let Some(idx) = self.get_cell_idx(x, y) {
                atomic_counts[idx].fetch_add(1, AtomicOrdering::Relaxed);
            }
        });
        let counts: Vec<usize> = atomic_counts.into_iter().map(|a| a.into_inner()).collect();

        self.cell_offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            self.cell_offsets[i] = total;
            total += count;
        }
        self.cell_offsets[cell_count] = total;

        self.entity_indices.clear();
        self.entity_indices.resize(total, 0);
        let mut cursor = self.cell_offsets[..cell_count].to_vec();

        // Sequential fill keeps entries of a cell in input order.
        for (entity_idx, &(x, y)) in positions.iter().enumerate() {
            if let Some(cell_idx) = self.get_cell_idx(x, y) {
                self.entity_indices[cursor[cell_idx]] = entity_idx;
                cursor[cell_idx] += 1;
            }
        }
        debug_assert!(total <= entity_count);
    }

    /// Calls `callback` with every entry in the cells overlapping the square
    /// of half-width `radius` around `(x, y)`. Callers filter by distance.
    pub fn query_callback<F>(&self, x: f64, y: f64, radius: f64, mut callback: F)
    where
        F: FnMut(usize),
    {
        let min_cx = ((x - radius) / self.cell_size).floor() as i64;
        let max_cx = ((x + radius) / self.cell_size).floor() as i64;
        let min_cy = ((y - radius) / self.cell_size).floor() as i64;
        let max_cy = ((y + radius) / self.cell_size).floor() as i64;

        for cy in min_cy.max(0)..=max_cy.min(self.rows as i64 - 1) {
            for cx in min_cx.max(0)..=max_cx.min(self.cols as i64 - 1) {
                let cell_idx = (cy as usize * self.cols) + cx as usize;
                let start = self.cell_offsets[cell_idx];
                let end = self.cell_offsets[cell_idx + 1];

                for &entity_idx in &self.entity_indices[start..end] {
                    callback(entity_idx);
                }
            }
        }
    }

    pub fn count_nearby(&self, x: f64, y: f64, radius: f64) -> usize {
        let mut count = 0;
        self.query_callback(x, y, radius, |_| count += 1);
        count
    }

    #[inline]
    pub fn query_into(&self, x: f64, y: f64, radius: f64, result: &mut Vec<usize>) {
        result.clear();
        self.query_callback(x, y, radius, |idx| result.push(idx));
    }
}
