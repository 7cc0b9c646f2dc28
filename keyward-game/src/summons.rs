//! Units raised by summoning towers.
use crate::affixes::on_enemy_hit;
use crate::constants::{SUMMON_DAMAGE, SUMMON_HP};
use crate::content::{AttackMode, Content};
use crate::damage::{DamageType, absorb_with_shield, calculate_damage};
use crate::state::{GameState, Summon};
use crate::targeting::{TargetingMode, find_target};

fn muster(state: &mut GameState, content: &Content, dt_ms: u32) -> Vec<String> {
    let mut events = Vec::new();
    let summoners: Vec<(usize, String, usize, u32, i32)> = state
        .structures
        .iter()
        .filter_map(|(index, kind)| {
            let def = content.tower(kind)?;
            match def.attack {
                AttackMode::Summon { max_summons } => Some((
                    *index,
                    def.id.clone(),
                    max_summons,
                    def.cooldown_ms(0.0),
                    def.damage,
                )),
                _ => None,
            }
        })
        .collect();
    for (index, kind, max_summons, reset, damage) in summoners {
        let cooldown = state.tower_cooldowns.entry(index).or_insert(0);
        *cooldown = cooldown.saturating_sub(dt_ms);
        if *cooldown > 0 {
            continue;
        }
        let alive = state.tower_summons.get(&index).map_or(0, Vec::len);
        if alive >= max_summons {
            continue;
        }
        let id = state.alloc_entity_id();
        let pos = state.map.pos_of(index);
        state.summons.push(Summon {
            id,
            tower_index: index,
            pos,
            hp: SUMMON_HP,
            damage: damage.max(SUMMON_DAMAGE),
        });
        state.tower_summons.entry(index).or_default().push(id);
        state.tower_cooldowns.insert(index, reset);
        events.push(format!("{kind} musters soldier #{id}"));
    }
    events
}

/// Raise new summons, then let every summon close in on and trade blows with enemies.
pub fn tick_summons(state: &mut GameState, content: &Content, dt_ms: u32) -> Vec<String> {
    let mut events = muster(state, content, dt_ms);
    for slot in 0..state.summons.len() {
        let summon_pos = state.summons[slot].pos;
        let Some(target) = find_target(summon_pos, None, TargetingMode::Nearest, &state.enemies)
        else {
            continue;
        };
        let enemy_pos = state.enemies[target].pos;
        if summon_pos.manhattan(enemy_pos) > 1 {
            state.summons[slot].pos = summon_pos.step_toward(enemy_pos);
            continue;
        }
        let summon = &mut state.summons[slot];
        let enemy = &mut state.enemies[target];
        let dealt = calculate_damage(summon.damage, DamageType::Physical, enemy);
        enemy.hp -= absorb_with_shield(&mut enemy.shield, dealt);
        let strike = enemy.damage;
        summon.hp -= strike;
        events.push(format!(
            "Soldier #{} strikes enemy #{} for {dealt}",
            summon.id, enemy.id
        ));
        let drained = on_enemy_hit(enemy, strike);
        if drained > 0 {
            events.push(format!("{} #{} drains {drained} hp", enemy.kind, enemy.id));
        }
    }
    let (fallen, standing): (Vec<Summon>, Vec<Summon>) = std::mem::take(&mut state.summons)
        .into_iter()
        .partition(|summon| summon.hp <= 0);
    state.summons = standing;
    for summon in fallen {
        if let Some(ids) = state.tower_summons.get_mut(&summon.tower_index) {
            ids.retain(|id| *id != summon.id);
        }
        events.push(format!("Soldier #{} falls", summon.id));
    }
    events
}

/// Drop every summon belonging to a removed tower.
pub fn dismiss_tower_summons(state: &mut GameState, tower_index: usize) {
    state.tower_summons.remove(&tower_index);
    state
        .summons
        .retain(|summon| summon.tower_index != tower_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::GridPos;
    use crate::state::Enemy;
    use crate::world::new_game;

    fn barracks_state() -> (GameState, usize) {
        let content = Content::builtin();
        let mut state = new_game("summons", content);
        let index = state.map.index_of(GridPos::new(3, 3)).unwrap();
        state.structures.insert(index, "barracks".into());
        (state, index)
    }

    #[test]
    fn barracks_respects_max_summons() {
        let content = Content::builtin();
        let (mut state, index) = barracks_state();
        let AttackMode::Summon { max_summons } = content.tower("barracks").unwrap().attack else {
            panic!("barracks must summon");
        };
        for _ in 0..20 {
            tick_summons(&mut state, content, 10_000);
        }
        assert_eq!(state.summons.len(), max_summons);
        assert_eq!(state.tower_summons[&index].len(), max_summons);
    }

    #[test]
    fn summons_fight_adjacent_enemies() {
        let content = Content::builtin();
        let (mut state, _) = barracks_state();
        tick_summons(&mut state, content, 0);
        assert_eq!(state.summons.len(), 1);
        state.enemies.push(Enemy {
            id: 5,
            kind: "raider".into(),
            pos: GridPos::new(3, 4),
            hp: 30,
            max_hp: 30,
            damage: 3,
            ..Enemy::default()
        });
        let events = tick_summons(&mut state, content, 0);
        assert!(events.iter().any(|e| e.contains("strikes enemy #5")));
        assert!(state.enemies[0].hp < 30);
        assert_eq!(state.summons[0].hp, SUMMON_HP - 3);
    }

    #[test]
    fn vampiric_enemies_drain_soldiers() {
        let content = Content::builtin();
        let (mut state, _) = barracks_state();
        tick_summons(&mut state, content, 0);
        state.enemies.push(Enemy {
            id: 6,
            kind: "wraith".into(),
            pos: GridPos::new(3, 4),
            hp: 20,
            max_hp: 30,
            damage: 3,
            affix: Some(crate::affixes::VAMPIRIC.into()),
            ..Enemy::default()
        });
        let events = tick_summons(&mut state, content, 0);
        assert!(events.iter().any(|e| e == "wraith #6 drains 2 hp"), "{events:?}");
        assert_eq!(state.enemies[0].hp, 20 - 2 + 2);
        assert_eq!(state.summons[0].hp, SUMMON_HP - 3);
    }

    #[test]
    fn dismiss_clears_tower_units() {
        let content = Content::builtin();
        let (mut state, index) = barracks_state();
        tick_summons(&mut state, content, 0);
        dismiss_tower_summons(&mut state, index);
        assert!(state.summons.is_empty());
        assert!(!state.tower_summons.contains_key(&index));
    }
}
