//! Economy content: buildings, resource nodes, items, skills, factions and expeditions.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::{ResourceBundle, ResourceKind};

/// A non-combat structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDef {
    pub id: String,
    pub name: String,
    pub cost: ResourceBundle,
    /// Produced at every dawn before worker and buff bonuses.
    #[serde(default)]
    pub production: ResourceBundle,
    #[serde(default)]
    pub citizens: i32,
    /// Added to the wood/stone/food ceilings.
    #[serde(default)]
    pub cap_bonus: i32,
    /// Added to castle max hp while standing.
    #[serde(default)]
    pub hp_bonus: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNodeDef {
    pub id: String,
    pub name: String,
    pub resource: ResourceKind,
    #[serde(rename = "yield")]
    pub amount: i32,
    pub regrow_days: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSlot {
    Weapon,
    Armor,
    Trinket,
}

impl ItemSlot {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Trinket => "trinket",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    pub slot: ItemSlot,
    #[serde(default)]
    pub effects: BTreeMap<String, f64>,
    pub recipe: ResourceBundle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: String,
    pub name: String,
    pub cost: i32,
    #[serde(default)]
    pub requires: Option<String>,
    #[serde(default)]
    pub effects: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionDef {
    pub id: String,
    pub name: String,
    pub gift_cost: i32,
    pub agreement_threshold: i32,
    /// Gold paid every dawn while an agreement stands.
    pub agreement_income: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpeditionDef {
    pub id: String,
    pub name: String,
    pub days: i32,
    pub ap_cost: i32,
    pub food_cost: i32,
    pub rewards: BTreeMap<ResourceKind, RewardRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EconomyTables {
    pub buildings: Vec<BuildingDef>,
    #[serde(default)]
    pub resource_nodes: Vec<ResourceNodeDef>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub skills: Vec<SkillDef>,
    #[serde(default)]
    pub factions: Vec<FactionDef>,
    #[serde(default)]
    pub expeditions: Vec<ExpeditionDef>,
}
