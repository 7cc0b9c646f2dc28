//! Tower cooldowns and firing.
use std::fmt;

use crate::buffs::{EFFECT_TOWER_DAMAGE, EFFECT_TOWER_SPEED, effect_total};
use crate::content::{AttackMode, Content, TowerDef};
use crate::damage::{
    absorb_with_shield, calculate_aoe_damage, calculate_chain_damage, calculate_damage,
};
use crate::map::GridPos;
use crate::numbers::floor_f64_to_i32;
use crate::state::{Enemy, GameState};
use crate::status::apply_status;
use crate::synergy::tower_bonuses;
use crate::targeting::{
    TargetingMode, find_aoe_targets, find_chain_targets, find_multi_targets, find_target,
};

/// One tower hit on one enemy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TowerAttack {
    pub tower_index: usize,
    pub tower_type: String,
    pub target_id: u32,
    pub damage: i32,
    pub killed: bool,
}

impl fmt::Display for TowerAttack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} hits enemy #{} for {}",
            self.tower_type, self.tower_index, self.target_id, self.damage
        )?;
        if self.killed {
            f.write_str(" (killed)")?;
        }
        Ok(())
    }
}

/// Towers that attack directly; summoners and support towers act elsewhere.
#[must_use]
pub fn is_attacking_tower(def: &TowerDef) -> bool {
    !matches!(def.attack, AttackMode::Summon { .. } | AttackMode::Support)
}

/// Enemy indices and raw amounts for one volley.
fn plan_hits(
    def: &TowerDef,
    pos: GridPos,
    range: i32,
    base: i32,
    enemies: &[Enemy],
) -> Vec<(usize, i32)> {
    match &def.attack {
        AttackMode::Single => find_target(pos, Some(range), def.targeting, enemies)
            .map(|index| vec![(index, base)])
            .unwrap_or_default(),
        AttackMode::Multi { targets } => find_multi_targets(pos, Some(range), *targets, enemies)
            .into_iter()
            .map(|index| (index, base))
            .collect(),
        AttackMode::Chain { jumps, jump_range } => {
            let Some(seed) = find_target(pos, Some(range), def.targeting, enemies) else {
                return Vec::new();
            };
            find_chain_targets(seed, *jumps, *jump_range, enemies)
                .into_iter()
                .enumerate()
                .map(|(jump, index)| (index, calculate_chain_damage(base, jump)))
                .collect()
        }
        AttackMode::Splash { radius } => {
            let Some(primary) = find_target(pos, Some(range), def.targeting, enemies) else {
                return Vec::new();
            };
            let center = enemies[primary].pos;
            find_aoe_targets(center, *radius, enemies)
                .into_iter()
                .map(|index| {
                    let distance = center.manhattan(enemies[index].pos);
                    (index, calculate_aoe_damage(base, distance, *radius))
                })
                .collect()
        }
        AttackMode::Zone => find_aoe_targets(pos, range, enemies)
            .into_iter()
            .map(|index| (index, base))
            .collect(),
        AttackMode::Contact => find_target(pos, Some(1), TargetingMode::Nearest, enemies)
            .map(|index| vec![(index, base)])
            .unwrap_or_default(),
        AttackMode::Summon { .. } | AttackMode::Support => Vec::new(),
    }
}

/// Advance every tower by `dt_ms` and fire those that are ready.
///
/// Towers are visited in ascending map-index order. A ready tower without a
/// target keeps a zero cooldown.
pub fn tick_towers(state: &mut GameState, content: &Content, dt_ms: u32) -> Vec<TowerAttack> {
    let towers: Vec<(usize, &TowerDef)> = state
        .structures
        .iter()
        .filter_map(|(index, kind)| content.tower(kind).map(|def| (*index, def)))
        .filter(|(_, def)| is_attacking_tower(def))
        .collect();
    let damage_effect = effect_total(state, content, EFFECT_TOWER_DAMAGE);
    let speed_effect = effect_total(state, content, EFFECT_TOWER_SPEED);
    let mut attacks = Vec::new();

    for (index, def) in towers {
        let cooldown = state.tower_cooldowns.entry(index).or_insert(0);
        *cooldown = cooldown.saturating_sub(dt_ms);
        if *cooldown > 0 {
            continue;
        }
        let bonus = tower_bonuses(state, content, index);
        let pos = state.map.pos_of(index);
        let multiplier = 1.0 + bonus.damage + damage_effect;
        let base = floor_f64_to_i32(f64::from(def.damage) * multiplier).max(1);
        let hits = plan_hits(def, pos, def.range + bonus.range, base, &state.enemies);
        if hits.is_empty() {
            continue;
        }
        for (target, amount) in hits {
            let enemy = &mut state.enemies[target];
            let dealt = calculate_damage(amount, def.damage_type, enemy);
            let through = absorb_with_shield(&mut enemy.shield, dealt);
            enemy.hp -= through;
            if let Some(on_hit) = &def.on_hit {
                apply_status(
                    &mut enemy.status,
                    on_hit.kind,
                    on_hit.duration_ms,
                    on_hit.tick_damage,
                );
            }
            attacks.push(TowerAttack {
                tower_index: index,
                tower_type: def.id.clone(),
                target_id: enemy.id,
                damage: through,
                killed: !enemy.is_alive(),
            });
        }
        let reset = if def.fires_every_tick() {
            0
        } else {
            def.cooldown_ms(bonus.speed + speed_effect)
        };
        state.tower_cooldowns.insert(index, reset);
        log::debug!("tower {} at {pos} fired, cooldown {reset} ms", def.id);
    }
    attacks
}
