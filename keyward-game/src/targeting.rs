//! Target selection over the live enemy list.
//!
//! All functions return indices into the slice they were given. Dead enemies
//! are never selected and ties go to the earlier enemy.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::map::GridPos;
use crate::state::Enemy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum TargetingMode {
    #[default]
    Nearest,
    Strongest,
    Weakest,
    Fastest,
    First,
    Last,
}

impl TargetingMode {
    /// Unknown names fall back to `Nearest`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strongest" => Self::Strongest,
            "weakest" => Self::Weakest,
            "fastest" => Self::Fastest,
            "first" => Self::First,
            "last" => Self::Last,
            _ => Self::Nearest,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Strongest => "strongest",
            Self::Weakest => "weakest",
            Self::Fastest => "fastest",
            Self::First => "first",
            Self::Last => "last",
        }
    }
}

impl fmt::Display for TargetingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TargetingMode {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<TargetingMode> for String {
    fn from(value: TargetingMode) -> Self {
        value.as_str().to_string()
    }
}

fn in_range(from: GridPos, enemy: &Enemy, range: Option<i32>) -> bool {
    enemy.is_alive() && range.is_none_or(|limit| from.manhattan(enemy.pos) <= limit)
}

fn candidates(
    from: GridPos,
    range: Option<i32>,
    enemies: &[Enemy],
) -> impl Iterator<Item = (usize, &Enemy)> {
    enemies
        .iter()
        .enumerate()
        .filter(move |(_, enemy)| in_range(from, enemy, range))
}

/// Select one enemy by `mode`. `range = None` means unlimited.
#[must_use]
pub fn find_target(
    from: GridPos,
    range: Option<i32>,
    mode: TargetingMode,
    enemies: &[Enemy],
) -> Option<usize> {
    let mut best: Option<(usize, &Enemy)> = None;
    for (index, enemy) in candidates(from, range, enemies) {
        let better = match best {
            None => true,
            Some((_, current)) => match mode {
                TargetingMode::Nearest => from.manhattan(enemy.pos) < from.manhattan(current.pos),
                TargetingMode::Strongest => enemy.hp > current.hp,
                TargetingMode::Weakest => enemy.hp < current.hp,
                TargetingMode::Fastest => enemy.speed > current.speed,
                TargetingMode::First => false,
                TargetingMode::Last => true,
            },
        };
        if better {
            best = Some((index, enemy));
        }
    }
    best.map(|(index, _)| index)
}

/// Up to `count` nearest enemies in ascending distance.
#[must_use]
pub fn find_multi_targets(
    from: GridPos,
    range: Option<i32>,
    count: usize,
    enemies: &[Enemy],
) -> Vec<usize> {
    let mut found: Vec<(i32, usize)> = candidates(from, range, enemies)
        .map(|(index, enemy)| (from.manhattan(enemy.pos), index))
        .collect();
    found.sort_by_key(|(distance, _)| *distance);
    found.into_iter().take(count).map(|(_, index)| index).collect()
}

/// Every enemy within `radius` of `center`, inclusive.
#[must_use]
pub fn find_aoe_targets(center: GridPos, radius: i32, enemies: &[Enemy]) -> Vec<usize> {
    candidates(center, Some(radius), enemies)
        .map(|(index, _)| index)
        .collect()
}

/// Chain path starting at `seed`, hopping to the nearest unvisited enemy within `jump_range`.
#[must_use]
pub fn find_chain_targets(
    seed: usize,
    max_jumps: usize,
    jump_range: i32,
    enemies: &[Enemy],
) -> Vec<usize> {
    let Some(first) = enemies.get(seed).filter(|enemy| enemy.is_alive()) else {
        return Vec::new();
    };
    let mut path = vec![seed];
    let mut current = first.pos;
    while path.len() <= max_jumps {
        let next = candidates(current, Some(jump_range), enemies)
            .filter(|(index, _)| !path.contains(index))
            .fold(None::<(usize, i32)>, |best, (index, enemy)| {
                let distance = current.manhattan(enemy.pos);
                match best {
                    Some((_, best_distance)) if best_distance <= distance => best,
                    _ => Some((index, distance)),
                }
            });
        let Some((index, _)) = next else {
            break;
        };
        path.push(index);
        current = enemies[index].pos;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(id: u32, x: i32, y: i32, hp: i32, speed: f64) -> Enemy {
        Enemy {
            id,
            pos: GridPos::new(x, y),
            hp,
            max_hp: hp.max(1),
            speed,
            ..Enemy::default()
        }
    }

    #[test]
    fn empty_or_dead_lists_yield_nothing() {
        let origin = GridPos::new(0, 0);
        assert_eq!(find_target(origin, None, TargetingMode::Nearest, &[]), None);
        let dead = vec![enemy(1, 1, 0, 0, 1.0), enemy(2, 2, 0, -3, 1.0)];
        for mode in [
            TargetingMode::Nearest,
            TargetingMode::Strongest,
            TargetingMode::Weakest,
            TargetingMode::Fastest,
            TargetingMode::First,
            TargetingMode::Last,
        ] {
            assert_eq!(find_target(origin, None, mode, &dead), None);
        }
        assert!(find_multi_targets(origin, None, 3, &dead).is_empty());
        assert!(find_aoe_targets(origin, 5, &dead).is_empty());
        assert!(find_chain_targets(0, 3, 5, &dead).is_empty());
    }

    #[test]
    fn modes_pick_expected_enemy() {
        let origin = GridPos::new(0, 0);
        let list = vec![
            enemy(1, 3, 0, 5, 0.5),
            enemy(2, 1, 0, 9, 1.0),
            enemy(3, 0, 1, 2, 2.0),
            enemy(4, 4, 4, 9, 2.0),
        ];
        assert_eq!(find_target(origin, None, TargetingMode::Nearest, &list), Some(1));
        assert_eq!(find_target(origin, None, TargetingMode::Strongest, &list), Some(1));
        assert_eq!(find_target(origin, None, TargetingMode::Weakest, &list), Some(2));
        assert_eq!(find_target(origin, None, TargetingMode::Fastest, &list), Some(2));
        assert_eq!(find_target(origin, None, TargetingMode::First, &list), Some(0));
        assert_eq!(find_target(origin, None, TargetingMode::Last, &list), Some(3));
        assert_eq!(find_target(origin, Some(2), TargetingMode::Last, &list), Some(2));
    }

    #[test]
    fn unknown_mode_defaults_to_nearest() {
        assert_eq!(TargetingMode::parse("sideways"), TargetingMode::Nearest);
        assert_eq!(TargetingMode::parse(" Weakest "), TargetingMode::Weakest);
        let parsed: TargetingMode = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(parsed, TargetingMode::Nearest);
    }

    #[test]
    fn multi_targets_sorted_by_distance() {
        let origin = GridPos::new(0, 0);
        let list = vec![
            enemy(1, 3, 0, 5, 1.0),
            enemy(2, 1, 0, 5, 1.0),
            enemy(3, 0, 2, 5, 1.0),
            enemy(4, 2, 0, 0, 1.0),
        ];
        assert_eq!(find_multi_targets(origin, None, 2, &list), vec![1, 2]);
        assert_eq!(find_multi_targets(origin, Some(2), 5, &list), vec![1, 2]);
    }

    #[test]
    fn aoe_is_inclusive() {
        let list = vec![enemy(1, 2, 0, 5, 1.0), enemy(2, 3, 0, 5, 1.0)];
        assert_eq!(find_aoe_targets(GridPos::new(0, 0), 2, &list), vec![0]);
    }

    #[test]
    fn chain_hops_to_nearest_unvisited() {
        let list = vec![
            enemy(1, 0, 0, 5, 1.0),
            enemy(2, 5, 0, 5, 1.0),
            enemy(3, 1, 0, 5, 1.0),
            enemy(4, 3, 0, 5, 1.0),
        ];
        assert_eq!(find_chain_targets(0, 5, 2, &list), vec![0, 2, 3, 1]);
        assert_eq!(find_chain_targets(0, 1, 2, &list), vec![0, 2]);
        assert_eq!(find_chain_targets(0, 5, 1, &list), vec![0, 2]);
    }
}
