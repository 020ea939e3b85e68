use glam::Vec2;

use crate::ecs::components::Species;

/// Per-tick snapshot of an agent, captured before any position writes so
/// avoidance sees every neighbor's pre-update position regardless of
/// iteration order.
#[derive(Debug, Clone, Copy)]
pub struct AgentSnapshot {
    pub entity: hecs::Entity,
    pub pos: Vec2,
    pub vel: Vec2,
    pub speed: f32,
    pub species: Species,
    pub banked: bool,
    pub disabled: bool,
}

/// Spatial hash grid for cheap neighbor queries during the avoidance
/// pass. Cell size should be at least the avoidance radius.
pub struct SpatialHash {
    inv_cell_size: f32,
    table_size: usize,
    /// Buckets of snapshot indices. Pre-allocated, cleared each tick.
    buckets: Vec<Vec<u32>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32, table_size: usize) -> Self {
        let mut buckets = Vec::with_capacity(table_size);
        for _ in 0..table_size {
            buckets.push(Vec::with_capacity(8));
        }
        Self {
            inv_cell_size: 1.0 / cell_size,
            table_size,
            buckets,
        }
    }

    /// Clear all buckets, keeping their allocations.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    pub fn insert(&mut self, pos: Vec2, snapshot_index: u32) {
        let hash = self.hash(pos);
        self.buckets[hash].push(snapshot_index);
    }

    /// Visit every snapshot index in the cell containing `pos` and the 8
    /// surrounding cells.
    pub fn query_neighbors(&self, pos: Vec2, mut callback: impl FnMut(u32)) {
        let (cx, cy) = self.cell_coords(pos);
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let hash = self.hash_cell(cx.wrapping_add(dx), cy.wrapping_add(dy));
                for &index in &self.buckets[hash] {
                    callback(index);
                }
            }
        }
    }

    fn cell_coords(&self, pos: Vec2) -> (i32, i32) {
        let cx = (pos.x * self.inv_cell_size).floor() as i32;
        let cy = (pos.y * self.inv_cell_size).floor() as i32;
        (cx, cy)
    }

    fn hash(&self, pos: Vec2) -> usize {
        let (cx, cy) = self.cell_coords(pos);
        self.hash_cell(cx, cy)
    }

    fn hash_cell(&self, cx: i32, cy: i32) -> usize {
        // Multiplicative spatial hash, evenly distributed for grid data.
        let h = (cx as u32).wrapping_mul(73856093) ^ (cy as u32).wrapping_mul(19349663);
        (h as usize) % self.table_size
    }
}
