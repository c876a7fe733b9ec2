//! Uniform XZ grid used for proximity culling.
//!
//! # Model
//! - The world plane (XZ) is split into square cells of `cell_size` meters.
//! - A world position maps to the cell containing it:
//!   `gx = floor(x / cell_size)`, `gz = floor(z / cell_size)`.
//! - The grid is unbounded: coordinates are `i32`, so negative positions need no offset.
//!
//! # Storage
//! [`CellGrid`] maps each occupied cell to the slot indices (into the owner's dense
//! array) of the items whose reference point lies in it. Empty cells are dropped so the
//! map only grows with occupied space.

use std::collections::HashMap;

/// Integer coordinates of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

/// Cell containing the world position `(x, z)`.
///
/// Non-finite inputs land in cell (0, 0) (`as` saturates NaN to 0).
#[inline]
pub fn cell_of(x: f32, z: f32, cell_size: f32) -> CellCoord {
    CellCoord {
        x: (x / cell_size).floor() as i32,
        z: (z / cell_size).floor() as i32,
    }
}

/// Inclusive cell range covering the XZ square of half-size `radius` around `(x, z)`.
#[inline]
pub fn cell_range(x: f32, z: f32, radius: f32, cell_size: f32) -> (CellCoord, CellCoord) {
    (
        cell_of(x - radius, z - radius, cell_size),
        cell_of(x + radius, z + radius, cell_size),
    )
}

/// Number of cells in an inclusive range (saturating).
#[inline]
pub fn cell_count(min: CellCoord, max: CellCoord) -> u64 {
    let w = (max.x as i64 - min.x as i64 + 1).max(0) as u64;
    let h = (max.z as i64 - min.z as i64 + 1).max(0) as u64;
    w.saturating_mul(h)
}

/// Sparse cell → slot index buckets.
#[derive(Clone, Debug, Default)]
pub struct CellGrid {
    cells: HashMap<CellCoord, Vec<usize>>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cell: CellCoord, slot: usize) {
        self.cells.entry(cell).or_default().push(slot);
    }

    /// Remove `slot` from `cell`. Unknown pairs are ignored.
    pub fn remove(&mut self, cell: CellCoord, slot: usize) {
        if let Some(bucket) = self.cells.get_mut(&cell) {
            if let Some(i) = bucket.iter().position(|&s| s == slot) {
                bucket.swap_remove(i);
            }
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Rename a slot after its item was moved inside the owner's dense array.
    pub fn relabel(&mut self, cell: CellCoord, from: usize, to: usize) {
        if let Some(bucket) = self.cells.get_mut(&cell) {
            if let Some(s) = bucket.iter_mut().find(|s| **s == from) {
                *s = to;
            }
        }
    }

    /// Slots stored in `cell`.
    pub fn slots(&self, cell: CellCoord) -> &[usize] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Slots stored in every cell of the inclusive range `min..=max`.
    pub fn slots_in_range(
        &self,
        min: CellCoord,
        max: CellCoord,
    ) -> impl Iterator<Item = usize> + '_ {
        (min.x..=max.x)
            .flat_map(move |x| (min.z..=max.z).map(move |z| CellCoord { x, z }))
            .flat_map(move |cell| self.slots(cell).iter().copied())
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}
