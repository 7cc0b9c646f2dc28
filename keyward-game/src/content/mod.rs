//! Static content registries.
//!
//! Every table is plain data embedded from `data/*.json`. Subsystems receive a
//! `&Content` explicitly so tests can clone and tweak their own copy.
mod combat;
mod economy;
mod progression;

pub use combat::{
    AffixDef, AttackMode, BossAbility, BossAbilityKind, BossDef, BossPhaseDef, CombatTables,
    EnemyDef, SpellDef, SpellEffect, StatusOnHit, SynergyDef, SynergyKind, TowerDef,
};
pub use economy::{
    BuildingDef, EconomyTables, ExpeditionDef, FactionDef, ItemDef, ItemSlot, ResourceNodeDef,
    RewardRange, SkillDef,
};
pub use progression::{
    BuffGrant, ChallengeDef, Condition, ConditionKind, NpcDef, NpcRole, PoiDef,
    ProgressionTables, QuestDef, Reward,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

const COMBAT_JSON: &str = include_str!("../../data/combat.json");
const ECONOMY_JSON: &str = include_str!("../../data/economy.json");
const PROGRESSION_JSON: &str = include_str!("../../data/progression.json");
const WORDS_JSON: &str = include_str!("../../data/words.json");

/// Failure while parsing or validating a content table.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to parse {table} table: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {table} table: {reason}")]
    Invalid { table: &'static str, reason: String },
}

/// Typing word lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WordPools {
    pub lessons: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub boss: Vec<String>,
}

/// All registries in one injectable bundle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Content {
    pub combat: CombatTables,
    pub economy: EconomyTables,
    pub progression: ProgressionTables,
    pub words: WordPools,
}

static BUILTIN: OnceLock<Content> = OnceLock::new();

fn parse_table<T: serde::de::DeserializeOwned>(
    table: &'static str,
    json: &str,
) -> Result<T, ContentError> {
    serde_json::from_str(json).map_err(|source| ContentError::Parse { table, source })
}

impl Content {
    /// Shared, lazily parsed copy of the embedded tables.
    ///
    /// A broken embedded table is logged and replaced with empty content.
    #[must_use]
    pub fn builtin() -> &'static Self {
        BUILTIN.get_or_init(|| {
            Self::load_builtin().unwrap_or_else(|err| {
                log::error!("built-in content failed to load: {err}");
                Self::default()
            })
        })
    }

    /// Parse the embedded tables into a fresh, owned bundle.
    ///
    /// # Errors
    ///
    /// Returns an error if any embedded table fails to parse or validate.
    pub fn load_builtin() -> Result<Self, ContentError> {
        Self::from_json_tables(COMBAT_JSON, ECONOMY_JSON, PROGRESSION_JSON, WORDS_JSON)
    }

    /// Build content from caller-supplied JSON documents.
    ///
    /// # Errors
    ///
    /// Returns an error if a document cannot be parsed or references are broken.
    pub fn from_json_tables(
        combat: &str,
        economy: &str,
        progression: &str,
        words: &str,
    ) -> Result<Self, ContentError> {
        let content = Self {
            combat: parse_table("combat", combat)?,
            economy: parse_table("economy", economy)?,
            progression: parse_table("progression", progression)?,
            words: parse_table("words", words)?,
        };
        content.validate()?;
        Ok(content)
    }

    /// Check cross-table references.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Invalid`] naming the first broken reference.
    pub fn validate(&self) -> Result<(), ContentError> {
        for tower in &self.combat.towers {
            for next in &tower.upgrades_to {
                if self.tower(next).is_none() {
                    return Err(ContentError::Invalid {
                        table: "combat",
                        reason: format!("tower {} upgrades to unknown {next}", tower.id),
                    });
                }
            }
        }
        for boss in &self.combat.bosses {
            if boss.phases.len() != crate::constants::BOSS_PHASE_THRESHOLDS.len() {
                return Err(ContentError::Invalid {
                    table: "combat",
                    reason: format!("boss {} must define one entry per phase", boss.id),
                });
            }
            if let Some(minion) = &boss.ability.minion
                && self.enemy(minion).is_none()
            {
                return Err(ContentError::Invalid {
                    table: "combat",
                    reason: format!("boss {} summons unknown {minion}", boss.id),
                });
            }
        }
        for skill in &self.economy.skills {
            if let Some(req) = &skill.requires
                && self.skill(req).is_none()
            {
                return Err(ContentError::Invalid {
                    table: "economy",
                    reason: format!("skill {} requires unknown {req}", skill.id),
                });
            }
        }
        if self.words.lessons.values().any(Vec::is_empty) {
            return Err(ContentError::Invalid {
                table: "words",
                reason: "lessons must not be empty".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn enemy(&self, id: &str) -> Option<&EnemyDef> {
        self.combat.enemies.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn boss(&self, id: &str) -> Option<&BossDef> {
        self.combat.bosses.iter().find(|def| def.id == id)
    }

    /// Boss whose assault happens on `day`.
    #[must_use]
    pub fn boss_for_day(&self, day: i32) -> Option<&BossDef> {
        self.combat.bosses.iter().find(|def| def.unlock_day == day)
    }

    /// Next boss at or after `day`.
    #[must_use]
    pub fn next_boss(&self, day: i32) -> Option<&BossDef> {
        self.combat
            .bosses
            .iter()
            .filter(|def| def.unlock_day >= day)
            .min_by_key(|def| def.unlock_day)
    }

    #[must_use]
    pub fn tower(&self, id: &str) -> Option<&TowerDef> {
        self.combat.towers.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn affix(&self, id: &str) -> Option<&AffixDef> {
        self.combat.affixes.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn spell(&self, id: &str) -> Option<&SpellDef> {
        self.combat.spells.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn building(&self, id: &str) -> Option<&BuildingDef> {
        self.economy.buildings.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn resource_node(&self, id: &str) -> Option<&ResourceNodeDef> {
        self.economy.resource_nodes.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.economy.items.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn skill(&self, id: &str) -> Option<&SkillDef> {
        self.economy.skills.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn faction(&self, id: &str) -> Option<&FactionDef> {
        self.economy.factions.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn expedition(&self, id: &str) -> Option<&ExpeditionDef> {
        self.economy.expeditions.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn quest(&self, id: &str) -> Option<&QuestDef> {
        self.progression.quests.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn challenge(&self, id: &str) -> Option<&ChallengeDef> {
        self.progression.challenges.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn poi(&self, id: &str) -> Option<&PoiDef> {
        self.progression.pois.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn npc(&self, id: &str) -> Option<&NpcDef> {
        self.progression.npcs.iter().find(|def| def.id == id)
    }

    /// Words for a lesson; unknown lessons yield an empty slice.
    #[must_use]
    pub fn lesson_words(&self, lesson: &str) -> &[String] {
        self.words.lessons.get(lesson).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has_lesson(&self, lesson: &str) -> bool {
        self.words.lessons.contains_key(lesson)
    }

    /// Whether a structure id names a tower (as opposed to a building).
    #[must_use]
    pub fn is_tower(&self, id: &str) -> bool {
        self.tower(id).is_some()
    }

    /// Cost of any structure id, tower or building.
    #[must_use]
    pub fn structure_cost(&self, id: &str) -> Option<crate::state::ResourceBundle> {
        self.tower(id)
            .map(|def| def.cost)
            .or_else(|| self.building(id).map(|def| def.cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_parse_and_validate() {
        let content = Content::load_builtin().expect("embedded content is valid");
        assert_eq!(content.combat.affixes.len(), 8);
        assert_eq!(content.combat.bosses.len(), 4);
        assert!(content.tower("sentry").is_some());
        assert!(content.tower("nope").is_none());
        assert!(content.building("market").is_some());
        assert!(!content.lesson_words(crate::constants::START_LESSON).is_empty());
    }

    #[test]
    fn sentry_matches_documented_stats() {
        let content = Content::builtin();
        let sentry = content.tower("sentry").unwrap();
        assert_eq!(sentry.damage, 5);
        assert_eq!(sentry.cooldown_ms(0.0), 1_000);
        assert_eq!(sentry.upgrades_to, vec!["ballista".to_string()]);
    }

    #[test]
    fn bosses_are_keyed_by_day() {
        let content = Content::builtin();
        assert_eq!(content.boss_for_day(5).map(|b| b.id.as_str()), Some("warlord"));
        assert_eq!(content.boss_for_day(6), None);
        assert_eq!(content.next_boss(11).map(|b| b.id.as_str()), Some("hydra"));
    }

    #[test]
    fn broken_upgrade_reference_is_rejected() {
        let mut content = Content::builtin().clone();
        content.combat.towers[0].upgrades_to.push("missing".into());
        let err = content.validate().unwrap_err();
        assert!(matches!(err, ContentError::Invalid { table: "combat", .. }));
    }

    #[test]
    fn malformed_table_reports_its_name() {
        let err = Content::from_json_tables("{", ECONOMY_JSON, PROGRESSION_JSON, WORDS_JSON)
            .unwrap_err();
        assert!(err.to_string().contains("combat"));
    }
}
