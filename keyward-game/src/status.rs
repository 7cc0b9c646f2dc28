//! Timed status effects carried by enemies.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::constants::{DOT_INTERVAL_MS, POISON_MAX_STACKS, SLOW_SPEED_MULT};
use crate::damage::calculate_dot_tick_damage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Frozen,
    Slowed,
    Burning,
    Poisoned,
}

impl StatusKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frozen => "frozen",
            Self::Slowed => "slowed",
            Self::Burning => "burning",
            Self::Poisoned => "poisoned",
        }
    }

    #[must_use]
    pub const fn is_dot(self) -> bool {
        matches!(self, Self::Burning | Self::Poisoned)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub remaining_ms: u32,
    #[serde(default)]
    pub tick_damage: i32,
    #[serde(default = "one_stack")]
    pub stacks: u32,
    /// Time accumulated toward the next damage tick.
    #[serde(default)]
    pub tick_ms: u32,
}

const fn one_stack() -> u32 {
    1
}

pub type StatusList = SmallVec<[StatusEffect; 2]>;

/// Apply or refresh an effect. Poison stacks up to the cap; other kinds refresh.
pub fn apply_status(list: &mut StatusList, kind: StatusKind, duration_ms: u32, tick_damage: i32) {
    if let Some(existing) = list.iter_mut().find(|effect| effect.kind == kind) {
        if kind == StatusKind::Poisoned {
            existing.stacks = (existing.stacks + 1).min(POISON_MAX_STACKS);
            existing.remaining_ms = duration_ms;
        } else {
            existing.remaining_ms = existing.remaining_ms.max(duration_ms);
        }
        existing.tick_damage = existing.tick_damage.max(tick_damage);
        return;
    }
    list.push(StatusEffect {
        kind,
        remaining_ms: duration_ms,
        tick_damage,
        stacks: 1,
        tick_ms: 0,
    });
}

#[must_use]
pub fn has_status(list: &StatusList, kind: StatusKind) -> bool {
    list.iter().any(|effect| effect.kind == kind)
}

/// Movement multiplier from crowd-control effects.
#[must_use]
pub fn speed_multiplier(list: &StatusList) -> f64 {
    if has_status(list, StatusKind::Frozen) {
        0.0
    } else if has_status(list, StatusKind::Slowed) {
        SLOW_SPEED_MULT
    } else {
        1.0
    }
}

/// Advance every effect by `dt_ms`, dropping expired ones. Returns damage-over-time dealt.
pub fn tick_statuses(list: &mut StatusList, dt_ms: u32) -> i32 {
    let mut damage = 0;
    for effect in list.iter_mut() {
        let elapsed = dt_ms.min(effect.remaining_ms);
        if effect.kind.is_dot() {
            effect.tick_ms += elapsed;
            while effect.tick_ms >= DOT_INTERVAL_MS {
                effect.tick_ms -= DOT_INTERVAL_MS;
                damage += calculate_dot_tick_damage(effect.tick_damage, effect.stacks);
            }
        }
        effect.remaining_ms -= elapsed;
    }
    list.retain(|effect| effect.remaining_ms > 0);
    damage
}
