//! Centralized balance and tuning constants for the Keyward simulation.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that balance can only be adjusted via
//! code changes reviewed in version control, rather than through the JSON
//! content tables.

// Save format ---------------------------------------------------------------
pub const SAVE_VERSION: u32 = 1;

// Starting state ------------------------------------------------------------
pub const MAP_WIDTH: i32 = 16;
pub const MAP_HEIGHT: i32 = 12;
pub const START_HP: i32 = 20;
pub const START_AP: i32 = 3;
pub const START_GOLD: i32 = 30;
pub const START_WOOD: i32 = 20;
pub const START_STONE: i32 = 10;
pub const START_FOOD: i32 = 15;
pub const START_LESSON: &str = "home_row";
pub const ROAMING_ENEMIES_AT_START: usize = 2;
pub const POIS_AT_START: usize = 4;
pub const RESOURCE_NODES_AT_START: usize = 6;

// Day actions ----------------------------------------------------------------
pub const BUILD_AP_COST: i32 = 1;
pub const GATHER_AP_COST: i32 = 1;
pub const EXPLORE_AP_COST: i32 = 1;
pub const BASE_GATHER_YIELD: i32 = 2;
pub const EXPLORE_THREAT_GAIN: i32 = 1;
pub const EXPLORE_ROAMING_CHANCE: f64 = 0.3;
pub const THREAT_MAX: i32 = 100;
pub const DEMOLISH_REFUND_DIVISOR: i32 = 2;

// Night & waves --------------------------------------------------------------
pub const WAVE_BASE_ENEMIES: i32 = 2;
pub const MAX_WAVES_PER_NIGHT: i32 = 4;
pub const NIGHT_STEP_MS: u32 = 1_000;
pub const VICTORY_DAY: i32 = 20;
pub const WAVE_THEMES: [&str; 5] = ["standard", "swarm", "armored", "swift", "mixed"];
pub const BOSS_THEME: &str = "boss_assault";

// Enemy scaling ----------------------------------------------------------------
pub const ENEMY_HP_DAY_DIVISOR: i32 = 3;
pub const ENEMY_HP_THREAT_DIVISOR: i32 = 10;
pub const ENEMY_ARMOR_DAY_DIVISOR: i32 = 8;

// Affixes --------------------------------------------------------------------
pub const AFFIX_BASE_CHANCE: i32 = 30;
pub const AFFIX_CHANCE_PER_DAY: i32 = 5;
pub const AFFIX_MAX_CHANCE: i32 = 60;
pub const AFFIX_TIER_TWO_DAY: i32 = 4;
pub const AFFIX_TIER_THREE_DAY: i32 = 7;
pub const SWIFT_SPEED_MULT: f64 = 1.5;
pub const ARMORED_ARMOR_BONUS: i32 = 2;
pub const RESILIENT_HP_MULT: f64 = 1.5;
pub const SHIELDED_SHIELD: i32 = 5;
pub const REGEN_PER_SECOND: i32 = 1;
pub const VAMPIRIC_HEAL: i32 = 2;
pub const EXPLOSIVE_DAMAGE_MULT: i32 = 2;
pub const ENRAGED_SPEED_MULT: f64 = 1.5;
pub const ENRAGED_DAMAGE_BONUS: i32 = 1;

// Damage ----------------------------------------------------------------------
pub const LIGHTNING_BONUS: i32 = 2;
pub const HOLY_AFFIX_MULT: f64 = 1.5;
pub const FIRE_FROZEN_MULT: i32 = 3;
pub const CHAIN_FALLOFF: f64 = 0.8;
pub const POISON_MAX_STACKS: u32 = 5;
pub const DOT_INTERVAL_MS: u32 = 1_000;
pub const SLOW_SPEED_MULT: f64 = 0.5;

// Boss ------------------------------------------------------------------------
pub const BOSS_PHASE_THRESHOLDS: [f64; 3] = [1.0, 0.5, 0.25];
pub const BOSS_SUMMON_COUNT: usize = 2;
pub const BOSS_STUN_RADIUS: i32 = 3;

// Typing ---------------------------------------------------------------------
pub const TYPING_BASE_DAMAGE: f64 = 3.0;
pub const COMBO_BONUS_PER_WORD: f64 = 0.05;
pub const COMBO_BONUS_CAP: f64 = 0.5;
pub const ENCOUNTER_APPROACH_PER_SEC: f64 = 0.1;
pub const ENCOUNTER_DAMAGE_PER_TIER: i32 = 2;
pub const ENCOUNTER_GOLD_BONUS: i32 = 1;

// Economy -------------------------------------------------------------------
pub const WORKER_BONUS_PER_CITIZEN: f64 = 0.05;
pub const WORKER_BONUS_CAP: f64 = 1.5;
pub const DAWN_HP_REGEN: i32 = 1;
pub const GOLD_TO_RESOURCE_RATE: i32 = 2;
pub const RESOURCE_TO_GOLD_RATE: i32 = 3;
pub const RESOURCE_SWAP_RATE: i32 = 2;
pub const RESOURCE_CAP_TABLE: [(i32, i32); 4] = [(5, 100), (10, 200), (15, 400), (i32::MAX, 800)];

// Diplomacy -------------------------------------------------------------------
pub const RELATION_MIN: i32 = -100;
pub const RELATION_MAX: i32 = 100;
pub const GIFT_RELATION_GAIN: i32 = 10;
pub const BREAK_RELATION_LOSS: i32 = 20;

// Summons ---------------------------------------------------------------------
pub const SUMMON_HP: i32 = 8;
pub const SUMMON_DAMAGE: i32 = 2;
