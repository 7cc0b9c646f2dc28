//! Combat content: enemies, bosses, towers, affixes, synergies and spells.
use serde::{Deserialize, Serialize};

use crate::damage::DamageType;
use crate::state::ResourceBundle;
use crate::status::StatusKind;
use crate::targeting::TargetingMode;

/// A regular enemy kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDef {
    pub id: String,
    pub name: String,
    pub tier: i32,
    pub hp: i32,
    #[serde(default)]
    pub armor: i32,
    /// Tiles per second.
    pub speed: f64,
    pub damage: i32,
    pub gold: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossAbilityKind {
    Summon,
    Heal,
    StunTowers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossAbility {
    pub kind: BossAbilityKind,
    pub cooldown_ms: u32,
    /// Heal percentage, stun duration, or unused for summons.
    #[serde(default)]
    pub value: i32,
    /// Enemy kind spawned by `summon`.
    #[serde(default)]
    pub minion: Option<String>,
}

/// Modifiers applied when a boss enters a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossPhaseDef {
    #[serde(default = "unit_mult")]
    pub speed_mult: f64,
    #[serde(default)]
    pub armor_bonus: i32,
    pub message: String,
}

const fn unit_mult() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDef {
    pub id: String,
    pub name: String,
    pub unlock_day: i32,
    pub hp: i32,
    #[serde(default)]
    pub armor: i32,
    pub speed: f64,
    pub damage: i32,
    pub gold: i32,
    pub ability: BossAbility,
    pub phases: Vec<BossPhaseDef>,
}

/// How a tower turns a firing opportunity into hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AttackMode {
    Single,
    Multi { targets: usize },
    Chain { jumps: usize, jump_range: i32 },
    Splash { radius: i32 },
    Zone,
    Contact,
    Summon { max_summons: usize },
    Support,
}

/// Status effect a tower applies on every hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusOnHit {
    pub kind: StatusKind,
    pub duration_ms: u32,
    #[serde(default)]
    pub tick_damage: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerDef {
    pub id: String,
    pub name: String,
    pub tier: i32,
    #[serde(default)]
    pub damage: i32,
    /// Attacks per second; 0 with contact attacks means "every tick".
    #[serde(default)]
    pub attack_speed: f64,
    #[serde(default)]
    pub range: i32,
    #[serde(default)]
    pub targeting: TargetingMode,
    pub damage_type: DamageType,
    pub attack: AttackMode,
    pub cost: ResourceBundle,
    #[serde(default)]
    pub upgrades_to: Vec<String>,
    #[serde(default)]
    pub on_hit: Option<StatusOnHit>,
}

impl TowerDef {
    /// Cooldown after firing, in milliseconds, given a fractional speed bonus.
    #[must_use]
    pub fn cooldown_ms(&self, speed_bonus: f64) -> u32 {
        let speed = self.attack_speed * (1.0 + speed_bonus);
        if speed <= 0.0 {
            return 0;
        }
        crate::numbers::round_f64_to_u32(1_000.0 / speed)
    }

    /// Contact towers with no attack speed strike on every tick.
    #[must_use]
    pub fn fires_every_tick(&self) -> bool {
        matches!(self.attack, AttackMode::Contact) && self.attack_speed <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffixDef {
    pub id: String,
    pub name: String,
    pub tier: i32,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyKind {
    /// Two listed tower types within radius of each other.
    Pair,
    /// At least `count` listed towers within radius.
    Cluster,
    /// Listed tower within radius of a support tower.
    Supported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyDef {
    pub id: String,
    pub name: String,
    pub kind: SynergyKind,
    pub towers: Vec<String>,
    #[serde(default)]
    pub count: usize,
    pub radius: i32,
    #[serde(default)]
    pub damage_bonus: f64,
    #[serde(default)]
    pub speed_bonus: f64,
    #[serde(default)]
    pub range_bonus: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpellEffect {
    DamageAll { amount: i32, damage_type: DamageType },
    FreezeAll { duration_ms: u32 },
    Heal { amount: i32 },
    GoldRush { amount: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDef {
    pub id: String,
    pub name: String,
    pub cooldown_secs: f64,
    pub effect: SpellEffect,
}

/// Everything the combat subsystems read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CombatTables {
    pub enemies: Vec<EnemyDef>,
    pub bosses: Vec<BossDef>,
    pub towers: Vec<TowerDef>,
    pub affixes: Vec<AffixDef>,
    #[serde(default)]
    pub synergies: Vec<SynergyDef>,
    #[serde(default)]
    pub spells: Vec<SpellDef>,
}
