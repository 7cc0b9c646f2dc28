//! Damage-type math.
//!
//! Each damage type keeps its own clamp rule; Physical and Poison never drop
//! below 1 while the pass-through types return the raw amount.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{CHAIN_FALLOFF, FIRE_FROZEN_MULT, HOLY_AFFIX_MULT, LIGHTNING_BONUS};
use crate::numbers::{floor_f64_to_i32, usize_to_i32};
use crate::state::Enemy;
use crate::status::{StatusKind, has_status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    #[default]
    Physical,
    Magical,
    Pure,
    Poison,
    Holy,
    Lightning,
    Fire,
    Cold,
}

impl DamageType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Magical => "magical",
            Self::Pure => "pure",
            Self::Poison => "poison",
            Self::Holy => "holy",
            Self::Lightning => "lightning",
            Self::Fire => "fire",
            Self::Cold => "cold",
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DamageType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physical" => Ok(Self::Physical),
            "magical" => Ok(Self::Magical),
            "pure" => Ok(Self::Pure),
            "poison" => Ok(Self::Poison),
            "holy" => Ok(Self::Holy),
            "lightning" => Ok(Self::Lightning),
            "fire" => Ok(Self::Fire),
            "cold" => Ok(Self::Cold),
            _ => Err(()),
        }
    }
}

/// Damage dealt by `amount` of `damage_type` to `target` before shields.
///
/// The minimum of 1 for Physical, Poison and Holy holds only for positive
/// amounts; `amount <= 0` always deals 0.
#[must_use]
pub fn calculate_damage(amount: i32, damage_type: DamageType, target: &Enemy) -> i32 {
    if amount <= 0 {
        return 0;
    }
    match damage_type {
        DamageType::Physical => (amount - target.armor).max(1),
        DamageType::Magical | DamageType::Pure | DamageType::Cold => amount,
        DamageType::Poison => (amount - target.armor.div_euclid(2)).max(1),
        DamageType::Holy => {
            let base = (amount - target.armor).max(1);
            if target.affix.is_some() {
                floor_f64_to_i32(f64::from(base) * HOLY_AFFIX_MULT)
            } else {
                base
            }
        }
        DamageType::Lightning => amount + LIGHTNING_BONUS,
        DamageType::Fire => {
            if has_status(&target.status, StatusKind::Frozen) {
                amount * FIRE_FROZEN_MULT
            } else {
                amount
            }
        }
    }
}

/// Damage at the `jump`-th link of a chain; the seed hit is jump 0.
#[must_use]
pub fn calculate_chain_damage(base: i32, jump: usize) -> i32 {
    floor_f64_to_i32(f64::from(base) * CHAIN_FALLOFF.powi(usize_to_i32(jump))).max(1)
}

/// Splash damage at `distance` from the impact within `radius`.
#[must_use]
pub fn calculate_aoe_damage(base: i32, distance: i32, radius: i32) -> i32 {
    let falloff = 1.0 - f64::from(distance) / f64::from(radius + 1);
    floor_f64_to_i32(f64::from(base) * falloff).max(1)
}

#[must_use]
pub fn calculate_dot_tick_damage(base: i32, stacks: u32) -> i32 {
    let stacks = i32::try_from(stacks.max(1)).unwrap_or(i32::MAX);
    base.saturating_mul(stacks)
}

/// Let a shield soak `damage`; returns what gets through.
pub fn absorb_with_shield(shield: &mut i32, damage: i32) -> i32 {
    if *shield <= 0 {
        return damage;
    }
    let absorbed = damage.min(*shield);
    *shield -= absorbed;
    damage - absorbed
}
