//! The single mutable world snapshot and its entity types.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::constants::SAVE_VERSION;
use crate::content::ItemSlot;
use crate::map::{GameMap, GridPos};
use crate::rng::GameRng;
use crate::status::StatusList;
use crate::typing::TypingMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Day,
    Night,
    GameOver,
    Victory,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
            Self::GameOver => "game_over",
            Self::Victory => "victory",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Gold,
    Wood,
    Stone,
    Food,
}

impl ResourceKind {
    pub const ALL: [Self; 4] = [Self::Gold, Self::Wood, Self::Stone, Self::Food];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Food => "food",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gold" => Ok(Self::Gold),
            "wood" => Ok(Self::Wood),
            "stone" => Ok(Self::Stone),
            "food" => Ok(Self::Food),
            _ => Err(()),
        }
    }
}

/// An amount of every resource, used for costs, production and rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResourceBundle {
    pub gold: i32,
    pub wood: i32,
    pub stone: i32,
    pub food: i32,
}

impl ResourceBundle {
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> i32 {
        match kind {
            ResourceKind::Gold => self.gold,
            ResourceKind::Wood => self.wood,
            ResourceKind::Stone => self.stone,
            ResourceKind::Food => self.food,
        }
    }

    pub const fn get_mut(&mut self, kind: ResourceKind) -> &mut i32 {
        match kind {
            ResourceKind::Gold => &mut self.gold,
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Stone => &mut self.stone,
            ResourceKind::Food => &mut self.food,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.gold == 0 && self.wood == 0 && self.stone == 0 && self.food == 0
    }

    /// Every component divided by `divisor`, rounding down.
    #[must_use]
    pub const fn divided(&self, divisor: i32) -> Self {
        let divisor = if divisor == 0 { 1 } else { divisor };
        Self {
            gold: self.gold / divisor,
            wood: self.wood / divisor,
            stone: self.stone / divisor,
            food: self.food / divisor,
        }
    }

    #[must_use]
    pub const fn plus(&self, other: &Self) -> Self {
        Self {
            gold: self.gold + other.gold,
            wood: self.wood + other.wood,
            stone: self.stone + other.stone,
            food: self.food + other.food,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, i32)> + '_ {
        ResourceKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

impl fmt::Display for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .filter(|(_, amount)| *amount != 0)
            .map(|(kind, amount)| format!("{amount} {kind}"))
            .collect();
        if parts.is_empty() {
            f.write_str("nothing")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Non-gold stockpile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Resources {
    pub wood: i32,
    pub stone: i32,
    pub food: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Enemy {
    pub id: u32,
    pub kind: String,
    pub pos: GridPos,
    pub hp: i32,
    pub max_hp: i32,
    pub armor: i32,
    /// Tiles per second.
    pub speed: f64,
    pub damage: i32,
    pub tier: i32,
    pub gold: i32,
    pub word: String,
    pub affix: Option<String>,
    pub shield: i32,
    pub status: StatusList,
    pub is_boss: bool,
    pub boss_phase: usize,
    pub ability_cooldown_ms: u32,
    pub move_progress: f64,
    /// Encounter approach, 0.0 to 1.0.
    pub approach: f64,
    pub regen_ms: u32,
    /// Enraged affix already triggered.
    pub enraged: bool,
}

impl Enemy {
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    #[must_use]
    pub fn has_affix(&self, id: &str) -> bool {
        self.affix.as_deref() == Some(id)
    }
}

/// A world enemy wandering the map by day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoamingEnemy {
    pub id: u32,
    pub kind: String,
    pub pos: GridPos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Encounter {
    /// Roaming enemy that triggered the fight.
    pub source_id: u32,
    pub enemies: Vec<Enemy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NightState {
    pub wave_index: i32,
    pub total_waves: i32,
    pub pending_spawns: Vec<String>,
    pub theme: String,
    pub has_boss: bool,
    pub step: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Npc {
    pub id: String,
    pub pos: GridPos,
    pub talked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Poi {
    pub id: String,
    pub visited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResourceNode {
    pub kind: String,
    pub cooldown_days: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Summon {
    pub id: u32,
    pub tower_index: usize,
    pub pos: GridPos,
    pub hp: i32,
    pub damage: i32,
}

/// Timed bundle of named numeric effects. Unique per id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Buff {
    pub id: String,
    pub remaining_days: i32,
    pub effects: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Counters {
    pub kills: i32,
    pub bosses_defeated: i32,
    pub structures_built: i32,
    pub tiles_discovered: i32,
    pub words_typed: i32,
    pub max_combo: i32,
    pub gold_earned: i32,
    pub damage_taken_tonight: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ActiveChallenge {
    pub id: String,
    /// Counter value when the challenge was issued.
    pub baseline: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Expedition {
    pub id: u32,
    pub kind: String,
    pub days_remaining: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpellState {
    pub cooldown_secs: f64,
}

const fn default_version() -> u32 {
    SAVE_VERSION
}

/// Complete state of one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    #[serde(default = "default_version")]
    pub version: u32,
    pub seed: String,
    pub rng: GameRng,
    pub day: i32,
    pub phase: Phase,
    pub hp: i32,
    pub hp_max: i32,
    pub ap: i32,
    pub ap_max: i32,
    pub threat: i32,
    pub gold: i32,
    pub resources: Resources,
    pub map: GameMap,
    pub player_pos: GridPos,
    pub structures: BTreeMap<usize, String>,
    pub structure_levels: BTreeMap<usize, i32>,
    pub tower_cooldowns: BTreeMap<usize, u32>,
    pub enemies: Vec<Enemy>,
    pub roaming: Vec<RoamingEnemy>,
    pub encounter: Option<Encounter>,
    pub night: NightState,
    pub npcs: Vec<Npc>,
    pub pois: BTreeMap<usize, Poi>,
    pub resource_nodes: BTreeMap<usize, ResourceNode>,
    pub citizens: i32,
    pub summons: Vec<Summon>,
    pub tower_summons: BTreeMap<usize, Vec<u32>>,
    pub buffs: Vec<Buff>,
    pub completed_quests: BTreeSet<String>,
    pub completed_milestones: BTreeSet<String>,
    pub completed_challenges: BTreeSet<String>,
    pub daily_challenge: Option<ActiveChallenge>,
    pub counters: Counters,
    pub skill_points: i32,
    pub unlocked_skills: BTreeSet<String>,
    pub equipped: BTreeMap<ItemSlot, String>,
    pub inventory: BTreeMap<String, u32>,
    pub faction_relations: BTreeMap<String, i32>,
    pub agreements: BTreeSet<String>,
    pub expeditions: Vec<Expedition>,
    pub spells: BTreeMap<String, SpellState>,
    pub typing: TypingMetrics,
    pub lesson_id: String,
    pub next_enemy_id: u32,
    pub next_entity_id: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            seed: String::new(),
            rng: GameRng::default(),
            day: 1,
            phase: Phase::Day,
            hp: 0,
            hp_max: 0,
            ap: 0,
            ap_max: 0,
            threat: 0,
            gold: 0,
            resources: Resources::default(),
            map: GameMap::default(),
            player_pos: GridPos::default(),
            structures: BTreeMap::new(),
            structure_levels: BTreeMap::new(),
            tower_cooldowns: BTreeMap::new(),
            enemies: Vec::new(),
            roaming: Vec::new(),
            encounter: None,
            night: NightState::default(),
            npcs: Vec::new(),
            pois: BTreeMap::new(),
            resource_nodes: BTreeMap::new(),
            citizens: 0,
            summons: Vec::new(),
            tower_summons: BTreeMap::new(),
            buffs: Vec::new(),
            completed_quests: BTreeSet::new(),
            completed_milestones: BTreeSet::new(),
            completed_challenges: BTreeSet::new(),
            daily_challenge: None,
            counters: Counters::default(),
            skill_points: 0,
            unlocked_skills: BTreeSet::new(),
            equipped: BTreeMap::new(),
            inventory: BTreeMap::new(),
            faction_relations: BTreeMap::new(),
            agreements: BTreeSet::new(),
            expeditions: Vec::new(),
            spells: BTreeMap::new(),
            typing: TypingMetrics::default(),
            lesson_id: String::new(),
            next_enemy_id: 1,
            next_entity_id: 1,
        }
    }
}

impl GameState {
    /// Reserve the next enemy id. Ids are never reused.
    pub const fn alloc_enemy_id(&mut self) -> u32 {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        id
    }

    /// Reserve an id for summons and expeditions.
    pub const fn alloc_entity_id(&mut self) -> u32 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    #[must_use]
    pub const fn is_night(&self) -> bool {
        matches!(self.phase, Phase::Night)
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    #[must_use]
    pub const fn amount(&self, kind: ResourceKind) -> i32 {
        match kind {
            ResourceKind::Gold => self.gold,
            ResourceKind::Wood => self.resources.wood,
            ResourceKind::Stone => self.resources.stone,
            ResourceKind::Food => self.resources.food,
        }
    }

    const fn amount_mut(&mut self, kind: ResourceKind) -> &mut i32 {
        match kind {
            ResourceKind::Gold => &mut self.gold,
            ResourceKind::Wood => &mut self.resources.wood,
            ResourceKind::Stone => &mut self.resources.stone,
            ResourceKind::Food => &mut self.resources.food,
        }
    }

    /// Add (or with a negative amount, remove) a resource. Never drops below zero.
    pub fn add_resource(&mut self, kind: ResourceKind, amount: i32) {
        let slot = self.amount_mut(kind);
        *slot = (*slot + amount).max(0);
        if kind == ResourceKind::Gold && amount > 0 {
            self.counters.gold_earned += amount;
        }
    }

    pub fn set_resource(&mut self, kind: ResourceKind, amount: i32) {
        *self.amount_mut(kind) = amount.max(0);
    }

    #[must_use]
    pub fn can_afford(&self, cost: &ResourceBundle) -> bool {
        cost.iter().all(|(kind, amount)| self.amount(kind) >= amount)
    }

    /// Deduct `cost`; returns false and leaves the stockpile untouched when short.
    pub fn pay(&mut self, cost: &ResourceBundle) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (kind, amount) in cost.iter() {
            *self.amount_mut(kind) -= amount;
        }
        true
    }

    pub fn grant(&mut self, bundle: &ResourceBundle) {
        for (kind, amount) in bundle.iter() {
            if amount != 0 {
                self.add_resource(kind, amount);
            }
        }
    }

    #[must_use]
    pub fn count_structures(&self, kind: &str) -> usize {
        self.structures.values().filter(|id| *id == kind).count()
    }

    /// Live enemy list the player is currently typing against.
    #[must_use]
    pub fn typing_targets(&self) -> &[Enemy] {
        match &self.encounter {
            Some(encounter) => &encounter.enemies,
            None => &self.enemies,
        }
    }
}
