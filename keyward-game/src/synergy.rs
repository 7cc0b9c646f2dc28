//! Placement-based tower synergies.
use crate::content::{AttackMode, Content, SynergyDef, SynergyKind};
use crate::state::GameState;

/// Summed bonuses for one tower.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SynergyBonus {
    pub damage: f64,
    pub speed: f64,
    pub range: i32,
}

impl SynergyBonus {
    fn add(&mut self, def: &SynergyDef) {
        self.damage += def.damage_bonus;
        self.speed += def.speed_bonus;
        self.range += def.range_bonus;
    }
}

fn within(state: &GameState, a: usize, b: usize, radius: i32) -> bool {
    state.map.pos_of(a).manhattan(state.map.pos_of(b)) <= radius
}

fn is_support(content: &Content, kind: &str) -> bool {
    content
        .tower(kind)
        .is_some_and(|def| matches!(def.attack, AttackMode::Support))
}

fn applies(
    state: &GameState,
    content: &Content,
    def: &SynergyDef,
    index: usize,
    kind: &str,
) -> bool {
    if !def.towers.iter().any(|id| id == kind) {
        return false;
    }
    match def.kind {
        SynergyKind::Pair => {
            let partners: Vec<&String> = def.towers.iter().filter(|id| *id != kind).collect();
            state.structures.iter().any(|(other, other_kind)| {
                *other != index
                    && partners.contains(&other_kind)
                    && within(state, index, *other, def.radius)
            })
        }
        SynergyKind::Cluster => {
            let members = state
                .structures
                .iter()
                .filter(|(other, other_kind)| {
                    def.towers.contains(*other_kind) && within(state, index, **other, def.radius)
                })
                .count();
            members >= def.count.max(1)
        }
        SynergyKind::Supported => state.structures.iter().any(|(other, other_kind)| {
            *other != index
                && is_support(content, other_kind)
                && within(state, index, *other, def.radius)
        }),
    }
}

/// Bonuses the tower at `index` receives from every active synergy.
#[must_use]
pub fn tower_bonuses(state: &GameState, content: &Content, index: usize) -> SynergyBonus {
    let mut bonus = SynergyBonus::default();
    let Some(kind) = state.structures.get(&index) else {
        return bonus;
    };
    for def in &content.combat.synergies {
        if applies(state, content, def, index, kind) {
            bonus.add(def);
        }
    }
    bonus
}

/// Ids of synergies active for at least one tower, in registry order.
#[must_use]
pub fn active_synergies(state: &GameState, content: &Content) -> Vec<String> {
    content
        .combat
        .synergies
        .iter()
        .filter(|def| {
            state
                .structures
                .iter()
                .any(|(index, kind)| applies(state, content, def, *index, kind))
        })
        .map(|def| def.id.clone())
        .collect()
}
