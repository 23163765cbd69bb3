//! Cross-colony enemy lookup.
//!
//! The engine rebuilds the index from every live agent at the start of a
//! tick; colonies only see it through [`EnemyLookup`], never each other's
//! rosters. Both implementations answer identically: nearest agent of a
//! different colony within range, ties broken by registration order.

use crate::spatial_hash::SpatialHash;
use stigmergy_data::{AgentId, ColonyId, Position};

/// One live agent as seen by the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyEntry {
    pub colony: ColonyId,
    pub id: AgentId,
    pub position: Position,
}

/// Answer to a nearest-enemy query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyContact {
    pub colony: ColonyId,
    pub id: AgentId,
    pub position: Position,
    pub distance: f64,
}

pub trait EnemyLookup: Send + Sync {
    /// Replaces the indexed population.
    fn rebuild(&mut self, entries: Vec<EnemyEntry>, width: f64, height: f64);

    /// Nearest agent not belonging to `own` within `range` of `from`.
    fn nearest_enemy(&self, own: ColonyId, from: Position, range: f64) -> Option<EnemyContact>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn closer(best: &Option<(usize, f64)>, idx: usize, d2: f64) -> bool {
    match best {
        None => true,
        Some((best_idx, best_d2)) => d2 < *best_d2 || (d2 == *best_d2 && idx < *best_idx),
    }
}

fn contact(entry: &EnemyEntry, d2: f64) -> EnemyContact {
    EnemyContact {
        colony: entry.colony,
        id: entry.id,
        position: entry.position,
        distance: d2.sqrt(),
    }
}

/// Checks every entry. O(n) per query.
#[derive(Debug, Default, Clone)]
pub struct ExhaustiveScan {
    entries: Vec<EnemyEntry>,
}

impl EnemyLookup for ExhaustiveScan {
    fn rebuild(&mut self, entries: Vec<EnemyEntry>, _width: f64, _height: f64) {
        self.entries = entries;
    }

    fn nearest_enemy(&self, own: ColonyId, from: Position, range: f64) -> Option<EnemyContact> {
        let range_sq = range * range;
        let mut best: Option<(usize, f64)> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.colony == own {
                continue;
            }
            let d2 = from.distance_sq(&entry.position);
            if d2 <= range_sq && closer(&best, idx, d2) {
                best = Some((idx, d2));
            }
        }
        best.map(|(idx, d2)| contact(&self.entries[idx], d2))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Buckets entries in a [`SpatialHash`] so a query only touches the cells
/// overlapping its range.
#[derive(Debug, Clone)]
pub struct GridEnemyIndex {
    entries: Vec<EnemyEntry>,
    hash: SpatialHash,
    positions: Vec<(f64, f64)>,
}

impl GridEnemyIndex {
    #[must_use]
    pub fn new(cell_size: f64, width: f64, height: f64) -> Self {
        Self {
            entries: Vec::new(),
            hash: SpatialHash::new(cell_size, width, height),
            positions: Vec::new(),
        }
    }
}

impl EnemyLookup for GridEnemyIndex {
    fn rebuild(&mut self, entries: Vec<EnemyEntry>, width: f64, height: f64) {
        self.positions.clear();
        self.positions
            .extend(entries.iter().map(|e| (e.position.x, e.position.y)));
        self.hash.build_parallel(&self.positions, width, height);
        self.entries = entries;
    }

    fn nearest_enemy(&self, own: ColonyId, from: Position, range: f64) -> Option<EnemyContact> {
        let range_sq = range * range;
        let mut best: Option<(usize, f64)> = None;
        self.hash.query_callback(from.x, from.y, range, |idx| {
            let entry = &self.entries[idx];
            if entry.colony == own {
                return;
            }
            let d2 = from.distance_sq(&entry.position);
            if d2 <= range_sq && closer(&best, idx, d2) {
                best = Some((idx, d2));
            }
        });
        best.map(|(idx, d2)| contact(&self.entries[idx], d2))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
