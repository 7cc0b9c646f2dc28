//! Progression content: quests, milestones, daily challenges, points of interest, NPCs.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::ResourceBundle;

/// Live counter a condition is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Kills,
    MaxCombo,
    DayReached,
    Gold,
    StructuresBuilt,
    TilesDiscovered,
    BossesDefeated,
    WordsTyped,
}

impl ConditionKind {
    /// Whether a daily challenge measures this counter relative to the dawn snapshot.
    #[must_use]
    pub const fn is_cumulative(self) -> bool {
        !matches!(self, Self::DayReached | Self::Gold | Self::MaxCombo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    pub target: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffGrant {
    pub id: String,
    pub days: i32,
    #[serde(default)]
    pub effects: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Reward {
    #[serde(default)]
    pub resources: ResourceBundle,
    #[serde(default)]
    pub skill_points: i32,
    #[serde(default)]
    pub buff: Option<BuffGrant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestDef {
    pub id: String,
    pub name: String,
    pub condition: Condition,
    #[serde(default)]
    pub reward: Reward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeDef {
    pub id: String,
    pub name: String,
    pub tier: i32,
    pub condition: Condition,
    #[serde(default)]
    pub reward: Reward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiDef {
    pub id: String,
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub reward: Reward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcRole {
    Merchant,
    Trainer,
    Sage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcDef {
    pub id: String,
    pub name: String,
    pub role: NpcRole,
    pub greeting: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProgressionTables {
    #[serde(default)]
    pub quests: Vec<QuestDef>,
    #[serde(default)]
    pub milestones: Vec<QuestDef>,
    #[serde(default)]
    pub challenges: Vec<ChallengeDef>,
    #[serde(default)]
    pub pois: Vec<PoiDef>,
    #[serde(default)]
    pub npcs: Vec<NpcDef>,
}
