//! Uniform-grid broad phase.
//!
//! The world is cut into square cells of `cell_size`. Each member is listed
//! in every cell its bounding box overlaps, so a radius query only has to
//! look at the cells covered by the query box. Cell coordinates are clamped
//! to the grid, which keeps members outside the world queryable at the edge.

use std::collections::{HashMap, HashSet};

use glam::Vec2;

use swarmfall_core::components::Body;
use swarmfall_core::math::circles_overlap;
use swarmfall_core::types::{Handle, WorldBounds};

type Cell = (i32, i32);

/// Inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellSpan {
    min: Cell,
    max: Cell,
}

impl CellSpan {
    fn contains(&self, (x, y): Cell) -> bool {
        x >= self.min.0 && x <= self.max.0 && y >= self.min.1 && y <= self.max.1
    }

    /// Cells in row-major order.
    fn cells(self) -> impl Iterator<Item = Cell> {
        (self.min.1..=self.max.1)
            .flat_map(move |y| (self.min.0..=self.max.0).map(move |x| (x, y)))
    }
}

#[derive(Debug, Clone, Copy)]
struct Member {
    center: Vec2,
    radius: f32,
    span: CellSpan,
}

/// Spatial hash over circles keyed by entity handle.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    columns: i32,
    rows: i32,
    cells: HashMap<Cell, Vec<Handle>>,
    members: HashMap<Handle, Member>,
}

impl SpatialGrid {
    pub fn new(bounds: WorldBounds, cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            swarmfall_core::constants::GRID_CELL_SIZE
        };
        let columns = ((bounds.width / cell_size).ceil() as i32).max(1);
        let rows = ((bounds.height / cell_size).ceil() as i32).max(1);
        Self {
            cell_size,
            columns,
            rows,
            cells: HashMap::new(),
            members: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.members.contains_key(&handle)
    }

    /// Insert an entity's circle. Re-adding a member moves it instead.
    pub fn add(&mut self, handle: Handle, body: &Body) {
        self.insert(handle, body.position, body.radius);
    }

    pub fn insert(&mut self, handle: Handle, center: Vec2, radius: f32) {
        if self.members.contains_key(&handle) {
            self.relocate(handle, center, radius);
            return;
        }
        let span = self.span(center, radius);
        for cell in span.cells() {
            self.cells.entry(cell).or_default().push(handle);
        }
        self.members.insert(handle, Member { center, radius, span });
    }

    /// Drop a member from every cell it occupies.
    pub fn remove(&mut self, handle: Handle) -> bool {
        let Some(member) = self.members.remove(&handle) else {
            return false;
        };
        for cell in member.span.cells() {
            self.detach(cell, handle);
        }
        true
    }

    /// Move a member, touching only the cells that changed.
    pub fn update(&mut self, handle: Handle, body: &Body) {
        self.relocate(handle, body.position, body.radius);
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.members.clear();
    }

    /// Members whose circle intersects the query circle, deduplicated.
    ///
    /// Cells are walked row-major and each member appears once, at its
    /// first encounter.
    pub fn entities_in_radius(&self, point: Vec2, radius: f32) -> Vec<Handle> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for cell in self.span(point, radius).cells() {
            let Some(list) = self.cells.get(&cell) else {
                continue;
            };
            for &handle in list {
                if !seen.insert(handle) {
                    continue;
                }
                if let Some(member) = self.members.get(&handle) {
                    if circles_overlap(point, radius, member.center, member.radius) {
                        found.push(handle);
                    }
                }
            }
        }
        found
    }

    /// Broad-phase candidates only: every member sharing a cell with the
    /// query box, without the exact circle test.
    pub fn candidates(&self, point: Vec2, radius: f32) -> Vec<Handle> {
        let mut seen = HashSet::new();
        self.span(point, radius)
            .cells()
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .copied()
            .filter(|handle| seen.insert(*handle))
            .collect()
    }

    /// Members overlapping `handle`'s own circle, excluding itself.
    pub fn nearby_entities(&self, handle: Handle) -> Vec<Handle> {
        let Some(member) = self.members.get(&handle) else {
            return Vec::new();
        };
        let mut found = self.entities_in_radius(member.center, member.radius);
        found.retain(|&h| h != handle);
        found
    }

    fn relocate(&mut self, handle: Handle, center: Vec2, radius: f32) {
        let Some(old) = self.members.get(&handle).map(|m| m.span) else {
            self.insert(handle, center, radius);
            return;
        };
        let span = self.span(center, radius);
        if span != old {
            for cell in old.cells().filter(|&c| !span.contains(c)) {
                self.detach(cell, handle);
            }
            for cell in span.cells().filter(|&c| !old.contains(c)) {
                self.cells.entry(cell).or_default().push(handle);
            }
        }
        self.members.insert(handle, Member { center, radius, span });
    }

    fn detach(&mut self, cell: Cell, handle: Handle) {
        if let Some(list) = self.cells.get_mut(&cell) {
            if let Some(pos) = list.iter().position(|&h| h == handle) {
                list.swap_remove(pos);
            }
            if list.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    fn cell_of(&self, point: Vec2) -> Cell {
        let x = (point.x / self.cell_size).floor() as i32;
        let y = (point.y / self.cell_size).floor() as i32;
        (x.clamp(0, self.columns - 1), y.clamp(0, self.rows - 1))
    }

    fn span(&self, center: Vec2, radius: f32) -> CellSpan {
        let reach = Vec2::splat(radius.max(0.0));
        CellSpan {
            min: self.cell_of(center - reach),
            max: self.cell_of(center + reach),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid() -> SpatialGrid {
        SpatialGrid::new(
            WorldBounds {
                width: 1000.0,
                height: 1000.0,
            },
            100.0,
        )
    }

    fn h(i: u32) -> Handle {
        Handle::new(i, 0)
    }

    #[test]
    fn finds_member_spanning_cells() {
        let mut g = grid();
        // Straddles the corner of four cells.
        g.insert(h(1), Vec2::new(100.0, 100.0), 20.0);
        assert_eq!(g.entities_in_radius(Vec2::new(112.0, 112.0), 5.0), vec![h(1)]);
        assert_eq!(g.entities_in_radius(Vec2::new(88.0, 112.0), 5.0), vec![h(1)]);
        assert!(g.entities_in_radius(Vec2::new(130.0, 130.0), 5.0).is_empty());
        assert_eq!(g.candidates(Vec2::new(50.0, 50.0), 1.0), vec![h(1)]);
    }

    #[test]
    fn exact_filter_drops_far_candidates() {
        let mut g = grid();
        g.insert(h(1), Vec2::new(10.0, 10.0), 2.0);
        g.insert(h(2), Vec2::new(90.0, 90.0), 2.0);
        // Same cell, only one within reach.
        assert_eq!(g.entities_in_radius(Vec2::new(12.0, 12.0), 5.0), vec![h(1)]);
        assert_eq!(g.candidates(Vec2::new(12.0, 12.0), 5.0).len(), 2);
    }

    #[test]
    fn remove_and_update_keep_index_consistent() {
        let mut g = grid();
        g.insert(h(1), Vec2::new(50.0, 50.0), 10.0);
        g.insert(h(1), Vec2::new(850.0, 850.0), 10.0);
        assert!(g.entities_in_radius(Vec2::new(50.0, 50.0), 10.0).is_empty());
        assert_eq!(g.entities_in_radius(Vec2::new(850.0, 850.0), 1.0), vec![h(1)]);
        assert_eq!(g.len(), 1);

        assert!(g.remove(h(1)));
        assert!(!g.remove(h(1)));
        assert!(g.entities_in_radius(Vec2::new(850.0, 850.0), 50.0).is_empty());
        assert!(g.cells.is_empty());
    }

    #[test]
    fn out_of_world_members_clamp_to_edge_cells() {
        let mut g = grid();
        g.insert(h(7), Vec2::new(-300.0, 2000.0), 5.0);
        assert_eq!(g.entities_in_radius(Vec2::new(-298.0, 2000.0), 5.0), vec![h(7)]);
        assert!(g.entities_in_radius(Vec2::new(-100.0, 2000.0), 5.0).is_empty());
    }

    #[test]
    fn nearby_excludes_self() {
        let mut g = grid();
        g.insert(h(1), Vec2::new(300.0, 300.0), 10.0);
        g.insert(h(2), Vec2::new(315.0, 300.0), 10.0);
        g.insert(h(3), Vec2::new(600.0, 300.0), 10.0);
        assert_eq!(g.nearby_entities(h(1)), vec![h(2)]);
        assert!(g.nearby_entities(h(9)).is_empty());
    }

    #[test]
    fn clear_empties_grid() {
        let mut g = grid();
        g.insert(h(1), Vec2::new(300.0, 300.0), 10.0);
        g.clear();
        assert!(g.is_empty());
        assert!(g.entities_in_radius(Vec2::new(300.0, 300.0), 100.0).is_empty());
    }

    fn circle() -> impl Strategy<Value = (f32, f32, f32)> {
        (-200.0f32..1200.0, -200.0f32..1200.0, 0.0f32..120.0)
    }

    proptest! {
        #[test]
        fn query_matches_brute_force(
            members in proptest::collection::vec(circle(), 0..40),
            moves in proptest::collection::vec(circle(), 0..40),
            query in circle(),
        ) {
            let mut g = grid();
            let mut truth: Vec<(Handle, Vec2, f32)> = Vec::new();
            for (i, (x, y, r)) in members.iter().enumerate() {
                g.insert(h(i as u32), Vec2::new(*x, *y), *r);
                truth.push((h(i as u32), Vec2::new(*x, *y), *r));
            }
            for (i, (x, y, r)) in moves.iter().enumerate() {
                if let Some(entry) = truth.get_mut(i) {
                    let body = Body { position: Vec2::new(*x, *y), radius: *r, ..Body::default() };
                    g.update(entry.0, &body);
                    entry.1 = body.position;
                    entry.2 = body.radius;
                }
            }

            let (qx, qy, qr) = query;
            let point = Vec2::new(qx, qy);
            let mut expected: Vec<Handle> = truth
                .iter()
                .filter(|(_, c, r)| circles_overlap(point, qr, *c, *r))
                .map(|(h, _, _)| *h)
                .collect();
            let mut found = g.entities_in_radius(point, qr);
            expected.sort();
            found.sort();
            prop_assert_eq!(found, expected);
        }
    }
}
