// Copyright (C) 2025 Thousand Worlds contributors. This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! A grid-backed 2-D spatial index keyed by character id. Cells are sized to
//! roughly the radius broadcasts query at, so `queryRadius` only needs to
//! examine the handful of cells overlapping the query's bounding square
//! instead of every tracked id — this is what keeps area broadcasts cheap in
//! worlds with thousands of live characters.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use core_common::CharacterId;
use core_protocol::Position;

type CellCoord = (i64, i64);

/// Cell size, in world units, used to bucket positions. Chosen to match the
/// default area-broadcast radius used by the hub so that a typical query
/// touches only a 3x3 neighborhood of cells.
pub const DEFAULT_CELL_SIZE: f64 = 200.0;

struct Inner {
    cell_size: f64,
    cells: HashMap<CellCoord, HashSet<CharacterId>>,
    positions: HashMap<CharacterId, Position>,
}

impl Inner {
    fn cell_of(&self, pos: Position) -> CellCoord {
        (
            (pos.x / self.cell_size).floor() as i64,
            (pos.y / self.cell_size).floor() as i64,
        )
    }

    fn remove_locked(&mut self, id: CharacterId) {
        if let Some(pos) = self.positions.remove(&id) {
            let cell = self.cell_of(pos);
            if let Some(set) = self.cells.get_mut(&cell) {
                set.remove(&id);
                if set.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    fn insert_locked(&mut self, id: CharacterId, pos: Position) {
        self.remove_locked(id);
        let cell = self.cell_of(pos);
        self.cells.entry(cell).or_default().insert(id);
        self.positions.insert(id, pos);
    }
}

/// Thread-safe grid index: `insert`/`remove`/`update`/`query_radius`.
///
/// Inserting an id that is already present overwrites its position.
/// Removing an absent id is a no-op.
pub struct SpatialIndex {
    inner: Mutex<Inner>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::with_cell_size(DEFAULT_CELL_SIZE)
    }

    pub fn with_cell_size(cell_size: f64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                cell_size,
                cells: HashMap::new(),
                positions: HashMap::new(),
            }),
        }
    }

    pub fn insert(&self, id: CharacterId, pos: Position) {
        self.inner.lock().unwrap().insert_locked(id, pos);
    }

    /// Alias for `insert` — an update is just a re-insert at the new position.
    pub fn update(&self, id: CharacterId, pos: Position) {
        self.insert(id, pos);
    }

    pub fn remove(&self, id: CharacterId) {
        self.inner.lock().unwrap().remove_locked(id);
    }

    pub fn position_of(&self, id: CharacterId) -> Option<Position> {
        self.inner.lock().unwrap().positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids within Euclidean distance `radius` of `center`, as a consistent
    /// snapshot taken atomically under the index's lock.
    pub fn query_radius(&self, center: Position, radius: f64) -> HashSet<CharacterId> {
        let guard = self.inner.lock().unwrap();

        // A non-finite radius (e.g. a caller wanting "everyone") would
        // otherwise saturate the cell bounds below to i64::MIN..=i64::MAX.
        // Every position matches such a radius anyway, so skip the grid.
        if !radius.is_finite() {
            return guard.positions.keys().copied().collect();
        }

        let cell_size = guard.cell_size;
        let min_cell = (
            ((center.x - radius) / cell_size).floor() as i64,
            ((center.y - radius) / cell_size).floor() as i64,
        );
        let max_cell = (
            ((center.x + radius) / cell_size).floor() as i64,
            ((center.y + radius) / cell_size).floor() as i64,
        );

        let mut matches = HashSet::new();
        for cx in min_cell.0..=max_cell.0 {
            for cy in min_cell.1..=max_cell.1 {
                let Some(candidates) = guard.cells.get(&(cx, cy)) else {
                    continue;
                };
                for &id in candidates {
                    if let Some(pos) = guard.positions.get(&id) {
                        if pos.distance_to(center) <= radius {
                            matches.insert(id);
                        }
                    }
                }
            }
        }
        matches
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> CharacterId {
        CharacterId::new_random()
    }

    #[test]
    fn insert_then_query_finds_self() {
        let idx = SpatialIndex::new();
        let a = id();
        idx.insert(a, Position::new(0.0, 0.0));
        let found = idx.query_radius(Position::new(0.0, 0.0), 1.0);
        assert!(found.contains(&a));
    }

    #[test]
    fn query_excludes_far_points() {
        let idx = SpatialIndex::new();
        let near = id();
        let far = id();
        idx.insert(near, Position::new(10.0, 10.0));
        idx.insert(far, Position::new(10_000.0, 10_000.0));
        let found = idx.query_radius(Position::new(0.0, 0.0), 50.0);
        assert!(found.contains(&near));
        assert!(!found.contains(&far));
    }

    #[test]
    fn duplicate_insert_overwrites_position() {
        let idx = SpatialIndex::new();
        let a = id();
        idx.insert(a, Position::new(0.0, 0.0));
        idx.insert(a, Position::new(1_000.0, 1_000.0));
        assert!(idx
            .query_radius(Position::new(0.0, 0.0), 10.0)
            .is_empty());
        assert!(idx
            .query_radius(Position::new(1_000.0, 1_000.0), 10.0)
            .contains(&a));
    }

    #[test]
    fn infinite_radius_matches_everyone_without_scanning_cells() {
        let idx = SpatialIndex::new();
        let near = id();
        let far = id();
        idx.insert(near, Position::new(0.0, 0.0));
        idx.insert(far, Position::new(1_000_000.0, -1_000_000.0));
        let found = idx.query_radius(Position::new(0.0, 0.0), f64::INFINITY);
        assert!(found.contains(&near));
        assert!(found.contains(&far));
    }

    #[test]
    fn removing_absent_id_is_noop() {
        let idx = SpatialIndex::new();
        idx.remove(id());
    }

    #[test]
    fn grid_matches_naive_scan_on_dense_field() {
        let idx = SpatialIndex::new();
        let mut ids = Vec::new();
        for gx in (0..100).step_by(10) {
            for gy in (0..100).step_by(10) {
                let cid = id();
                idx.insert(cid, Position::new(gx as f64, gy as f64));
                ids.push((cid, Position::new(gx as f64, gy as f64)));
            }
        }
        let center = Position::new(50.0, 50.0);
        let radius = 25.0;
        let expected: HashSet<CharacterId> = ids
            .iter()
            .filter(|(_, pos)| pos.distance_to(center) <= radius)
            .map(|(cid, _)| *cid)
            .collect();
        assert_eq!(idx.query_radius(center, radius), expected);
    }
}
