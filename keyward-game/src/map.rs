//! Grid coordinates, terrain and the fog-of-war map.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::rng::GameRng;

/// A tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// One tile closer to `target`, moving along the longer axis first.
    #[must_use]
    pub const fn step_toward(self, target: Self) -> Self {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        if dx == 0 && dy == 0 {
            return self;
        }
        if dx.abs() >= dy.abs() {
            self.offset(dx.signum(), 0)
        } else {
            self.offset(0, dy.signum())
        }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Plains,
    Forest,
    Hills,
    Water,
}

impl Terrain {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plains => "plains",
            Self::Forest => "forest",
            Self::Hills => "hills",
            Self::Water => "water",
        }
    }

    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Water)
    }
}

const TERRAIN_WEIGHTS: [(Terrain, u32); 4] = [
    (Terrain::Plains, 55),
    (Terrain::Forest, 25),
    (Terrain::Hills, 12),
    (Terrain::Water, 8),
];

/// Rectangular map with a base tile and a discovered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    pub terrain: Vec<Terrain>,
    pub base: GridPos,
    pub discovered: BTreeSet<usize>,
}

impl GameMap {
    /// Generate terrain from the RNG with the base and its neighbours cleared and revealed.
    #[must_use]
    pub fn generate(width: i32, height: i32, rng: &mut GameRng) -> Self {
        let tiles = usize::try_from(width.max(0) * height.max(0)).unwrap_or(0);
        let terrain = (0..tiles)
            .map(|_| rng.choose_weighted(&TERRAIN_WEIGHTS).copied().unwrap_or_default())
            .collect();
        let mut map = Self {
            width,
            height,
            terrain,
            base: GridPos::new(width / 2, height / 2),
            discovered: BTreeSet::new(),
        };
        let base = map.base;
        let cleared: Vec<GridPos> = std::iter::once(base).chain(map.neighbours(base)).collect();
        for pos in cleared {
            if let Some(index) = map.index_of(pos) {
                map.terrain[index] = Terrain::Plains;
                map.discovered.insert(index);
            }
        }
        map
    }

    #[must_use]
    pub const fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// `y * width + x`, or `None` out of bounds.
    #[must_use]
    pub fn index_of(&self, pos: GridPos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        usize::try_from(pos.y * self.width + pos.x).ok()
    }

    #[must_use]
    pub fn pos_of(&self, index: usize) -> GridPos {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        let width = self.width.max(1);
        GridPos::new(index % width, index / width)
    }

    #[must_use]
    pub fn terrain_at(&self, pos: GridPos) -> Option<Terrain> {
        self.index_of(pos)
            .and_then(|index| self.terrain.get(index).copied())
    }

    #[must_use]
    pub fn is_passable(&self, pos: GridPos) -> bool {
        self.terrain_at(pos).is_some_and(Terrain::is_passable)
    }

    #[must_use]
    pub fn is_discovered(&self, pos: GridPos) -> bool {
        self.index_of(pos)
            .is_some_and(|index| self.discovered.contains(&index))
    }

    /// Mark a tile discovered; returns true if it was new.
    pub fn reveal(&mut self, pos: GridPos) -> bool {
        self.index_of(pos)
            .is_some_and(|index| self.discovered.insert(index))
    }

    /// In-bounds orthogonal neighbours.
    pub fn neighbours(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        [(0, -1), (1, 0), (0, 1), (-1, 0)]
            .into_iter()
            .map(move |(dx, dy)| pos.offset(dx, dy))
            .filter(|next| self.in_bounds(*next))
    }

    /// Nearest undiscovered tile to `from`, ties broken by index.
    #[must_use]
    pub fn nearest_undiscovered(&self, from: GridPos) -> Option<GridPos> {
        (0..self.terrain.len())
            .filter(|index| !self.discovered.contains(index))
            .map(|index| self.pos_of(index))
            .min_by_key(|pos| (pos.manhattan(from), self.index_of(*pos)))
    }

    /// Passable tiles on the outer ring, in index order.
    #[must_use]
    pub fn edge_tiles(&self) -> Vec<GridPos> {
        (0..self.terrain.len())
            .map(|index| self.pos_of(index))
            .filter(|pos| {
                (pos.x == 0 || pos.y == 0 || pos.x == self.width - 1 || pos.y == self.height - 1)
                    && self.is_passable(*pos)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_map_clears_base_area() {
        let mut rng = GameRng::from_seed_str("map");
        let map = GameMap::generate(16, 12, &mut rng);
        assert_eq!(map.base, GridPos::new(8, 6));
        assert_eq!(map.terrain.len(), 16 * 12);
        assert_eq!(map.discovered.len(), 5);
        assert_eq!(map.terrain_at(map.base), Some(Terrain::Plains));
        for pos in map.neighbours(map.base) {
            assert!(map.is_discovered(pos));
            assert!(map.is_passable(pos));
        }
    }

    #[test]
    fn generation_is_seeded() {
        let a = GameMap::generate(16, 12, &mut GameRng::from_seed_str("same"));
        let b = GameMap::generate(16, 12, &mut GameRng::from_seed_str("same"));
        assert_eq!(a, b);
    }

    #[test]
    fn index_round_trips() {
        let map = GameMap::generate(16, 12, &mut GameRng::from_seed_str("idx"));
        let pos = GridPos::new(3, 4);
        assert_eq!(map.index_of(pos), Some(67));
        assert_eq!(map.pos_of(67), pos);
        assert_eq!(map.index_of(GridPos::new(16, 0)), None);
        assert_eq!(map.index_of(GridPos::new(-1, 0)), None);
    }

    #[test]
    fn step_prefers_longer_axis() {
        let from = GridPos::new(0, 0);
        assert_eq!(from.step_toward(GridPos::new(5, 2)), GridPos::new(1, 0));
        assert_eq!(from.step_toward(GridPos::new(1, 4)), GridPos::new(0, 1));
        assert_eq!(from.step_toward(from), from);
        assert_eq!(GridPos::new(2, 3).manhattan(GridPos::new(5, 1)), 5);
    }

    #[test]
    fn nearest_undiscovered_scans_outward() {
        let map = GameMap::generate(16, 12, &mut GameRng::from_seed_str("fog"));
        let next = map.nearest_undiscovered(map.base).unwrap();
        assert_eq!(next.manhattan(map.base), 2);
        assert!(!map.is_discovered(next));
    }
}
