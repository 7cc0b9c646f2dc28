//! Day-gated enemy affixes.
use crate::constants::{
    AFFIX_BASE_CHANCE, AFFIX_CHANCE_PER_DAY, AFFIX_MAX_CHANCE, AFFIX_TIER_THREE_DAY,
    AFFIX_TIER_TWO_DAY, ARMORED_ARMOR_BONUS, ENRAGED_DAMAGE_BONUS, ENRAGED_SPEED_MULT,
    EXPLOSIVE_DAMAGE_MULT, REGEN_PER_SECOND, RESILIENT_HP_MULT, SHIELDED_SHIELD, SWIFT_SPEED_MULT,
    VAMPIRIC_HEAL,
};
use crate::content::Content;
use crate::numbers::floor_f64_to_i32;
use crate::rng::GameRng;
use crate::state::Enemy;

pub const SWIFT: &str = "swift";
pub const ARMORED: &str = "armored";
pub const RESILIENT: &str = "resilient";
pub const SHIELDED: &str = "shielded";
pub const REGENERATING: &str = "regenerating";
pub const VAMPIRIC: &str = "vampiric";
pub const EXPLOSIVE: &str = "explosive";
pub const ENRAGED: &str = "enraged";

/// Chance, in percent, that an enemy spawned on `day` carries an affix.
#[must_use]
pub fn affix_chance(day: i32) -> i32 {
    (AFFIX_BASE_CHANCE + AFFIX_CHANCE_PER_DAY * (day - 1)).min(AFFIX_MAX_CHANCE)
}

/// Highest affix tier available on `day`.
#[must_use]
pub const fn max_affix_tier(day: i32) -> i32 {
    if day < AFFIX_TIER_TWO_DAY {
        1
    } else if day < AFFIX_TIER_THREE_DAY {
        2
    } else {
        3
    }
}

/// Roll an affix id for an enemy spawned on `day`.
pub fn roll_affix(day: i32, rng: &mut GameRng, content: &Content) -> Option<String> {
    let roll = rng.roll_percent();
    if roll > affix_chance(day) {
        return None;
    }
    let max_tier = max_affix_tier(day);
    let eligible: Vec<&str> = content
        .combat
        .affixes
        .iter()
        .filter(|affix| affix.tier <= max_tier)
        .map(|affix| affix.id.as_str())
        .collect();
    rng.choose(&eligible).map(|id| (*id).to_string())
}

/// Apply the stat changes of an affix to a freshly created enemy.
pub fn apply_affix(enemy: &mut Enemy, affix: &str) {
    match affix {
        SWIFT => enemy.speed *= SWIFT_SPEED_MULT,
        ARMORED => enemy.armor += ARMORED_ARMOR_BONUS,
        RESILIENT => {
            enemy.max_hp = floor_f64_to_i32(f64::from(enemy.max_hp) * RESILIENT_HP_MULT);
            enemy.hp = enemy.max_hp;
        }
        SHIELDED => enemy.shield = SHIELDED_SHIELD,
        _ => {}
    }
    enemy.affix = Some(affix.to_string());
}

/// Per-step affix behavior. Returns an event when something visible happens.
pub fn tick_affix(enemy: &mut Enemy, dt_ms: u32) -> Option<String> {
    if !enemy.is_alive() {
        return None;
    }
    if enemy.has_affix(REGENERATING) {
        enemy.regen_ms += dt_ms;
        while enemy.regen_ms >= 1_000 {
            enemy.regen_ms -= 1_000;
            enemy.hp = (enemy.hp + REGEN_PER_SECOND).min(enemy.max_hp);
        }
    }
    if enemy.has_affix(ENRAGED) && !enemy.enraged && enemy.hp * 2 < enemy.max_hp {
        enemy.enraged = true;
        enemy.speed *= ENRAGED_SPEED_MULT;
        enemy.damage += ENRAGED_DAMAGE_BONUS;
        return Some(format!("The {} becomes enraged!", enemy.kind));
    }
    None
}

/// Damage an enemy deals when it reaches the castle.
#[must_use]
pub fn castle_damage(enemy: &Enemy) -> i32 {
    if enemy.has_affix(EXPLOSIVE) {
        enemy.damage * EXPLOSIVE_DAMAGE_MULT
    } else {
        enemy.damage
    }
}

/// Vampiric enemies drink from what they hit, never more than the blow dealt.
/// Returns the hp regained.
pub fn on_enemy_hit(enemy: &mut Enemy, dealt: i32) -> i32 {
    if !enemy.is_alive() || !enemy.has_affix(VAMPIRIC) {
        return 0;
    }
    let before = enemy.hp;
    enemy.hp = (enemy.hp + VAMPIRIC_HEAL.min(dealt.max(0))).min(enemy.max_hp);
    enemy.hp - before
}
