//! Boss phases and abilities.
use crate::constants::{BOSS_PHASE_THRESHOLDS, BOSS_STUN_RADIUS, BOSS_SUMMON_COUNT};
use crate::content::{BossAbilityKind, Content};
use crate::enemies::create_enemy;
use crate::numbers::floor_f64_to_i32;
use crate::state::{Enemy, GameState};

const DEFAULT_MINION: &str = "raider";

/// Phase index for the current hp ratio: the last threshold the ratio is at or below.
#[must_use]
pub fn compute_phase(hp: i32, max_hp: i32) -> usize {
    if max_hp <= 0 {
        return 0;
    }
    let ratio = f64::from(hp) / f64::from(max_hp);
    BOSS_PHASE_THRESHOLDS
        .iter()
        .rposition(|threshold| ratio <= *threshold)
        .unwrap_or(0)
}

/// Advance a boss into a deeper phase when its hp warrants it.
///
/// Returns the phase message on a transition. Phases never go back.
pub fn update_boss_phase(enemy: &mut Enemy, content: &Content) -> Option<String> {
    if !enemy.is_boss || !enemy.is_alive() {
        return None;
    }
    let computed = compute_phase(enemy.hp, enemy.max_hp);
    if computed <= enemy.boss_phase {
        return None;
    }
    enemy.boss_phase = computed;
    let def = content.boss(&enemy.kind)?;
    let phase = def.phases.get(computed)?;
    enemy.speed = def.speed * phase.speed_mult;
    enemy.armor = def.armor + phase.armor_bonus;
    log::debug!("{} entered phase {computed}", enemy.kind);
    Some(format!("{}: {}", def.name, phase.message))
}

/// Count down boss ability cooldowns and fire the ready ones.
pub fn tick_boss_abilities(state: &mut GameState, content: &Content, dt_ms: u32) -> Vec<String> {
    let mut events = Vec::new();
    let boss_indices: Vec<usize> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| enemy.is_boss && enemy.is_alive())
        .map(|(index, _)| index)
        .collect();
    let mut spawned = Vec::new();
    for index in boss_indices {
        let Some(def) = content.boss(&state.enemies[index].kind) else {
            continue;
        };
        let boss = &mut state.enemies[index];
        boss.ability_cooldown_ms = boss.ability_cooldown_ms.saturating_sub(dt_ms);
        if boss.ability_cooldown_ms > 0 {
            continue;
        }
        boss.ability_cooldown_ms = def.ability.cooldown_ms;
        let pos = boss.pos;
        match def.ability.kind {
            BossAbilityKind::Summon => {
                let minion = def.ability.minion.as_deref().unwrap_or(DEFAULT_MINION);
                for _ in 0..BOSS_SUMMON_COUNT {
                    if let Some(enemy) = create_enemy(state, content, minion, pos) {
                        spawned.push(enemy);
                    }
                }
                events.push(format!("{} summons {BOSS_SUMMON_COUNT} {minion}s!", def.name));
            }
            BossAbilityKind::Heal => {
                let amount = floor_f64_to_i32(
                    f64::from(boss.max_hp) * f64::from(def.ability.value) / 100.0,
                )
                .max(1);
                boss.hp = (boss.hp + amount).min(boss.max_hp);
                events.push(format!("{} heals {amount} hp", def.name));
            }
            BossAbilityKind::StunTowers => {
                let stun = u32::try_from(def.ability.value).unwrap_or(0);
                let mut stunned = 0;
                let towers: Vec<usize> = state
                    .structures
                    .iter()
                    .filter(|(_, kind)| content.is_tower(kind))
                    .map(|(tower, _)| *tower)
                    .collect();
                for tower in towers {
                    if state.map.pos_of(tower).manhattan(pos) <= BOSS_STUN_RADIUS {
                        let cooldown = state.tower_cooldowns.entry(tower).or_insert(0);
                        *cooldown = cooldown.saturating_add(stun);
                        stunned += 1;
                    }
                }
                events.push(format!("{} stuns {stunned} towers", def.name));
            }
        }
    }
    state.enemies.extend(spawned);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::GridPos;
    use crate::world::new_game;

    fn boss(content: &Content, id: &str) -> Enemy {
        let def = content.boss(id).unwrap();
        Enemy {
            id: 1,
            kind: id.to_string(),
            hp: def.hp,
            max_hp: def.hp,
            armor: def.armor,
            speed: def.speed,
            is_boss: true,
            ability_cooldown_ms: def.ability.cooldown_ms,
            ..Enemy::default()
        }
    }

    #[test]
    fn phase_follows_thresholds() {
        assert_eq!(compute_phase(100, 100), 0);
        assert_eq!(compute_phase(60, 100), 0);
        assert_eq!(compute_phase(50, 100), 1);
        assert_eq!(compute_phase(26, 100), 1);
        assert_eq!(compute_phase(25, 100), 2);
        assert_eq!(compute_phase(1, 100), 2);
        assert_eq!(compute_phase(150, 100), 0);
        assert_eq!(compute_phase(5, 0), 0);
    }

    #[test]
    fn transition_reported_once_and_never_reverts() {
        let content = Content::builtin();
        let mut warlord = boss(content, "warlord");
        assert!(update_boss_phase(&mut warlord, content).is_none());
        warlord.hp = warlord.max_hp / 2;
        assert!(update_boss_phase(&mut warlord, content).is_some());
        assert_eq!(warlord.boss_phase, 1);
        assert!(update_boss_phase(&mut warlord, content).is_none());
        warlord.hp = warlord.max_hp;
        assert!(update_boss_phase(&mut warlord, content).is_none());
        assert_eq!(warlord.boss_phase, 1);
        let def = content.boss("warlord").unwrap();
        assert_eq!(warlord.armor, def.armor + def.phases[1].armor_bonus);
    }

    #[test]
    fn summon_ability_adds_minions() {
        let content = Content::builtin();
        let mut state = new_game("boss", content);
        let mut warlord = boss(content, "warlord");
        warlord.ability_cooldown_ms = 500;
        state.enemies.push(warlord);
        let events = tick_boss_abilities(&mut state, content, 1_000);
        assert_eq!(events.len(), 1);
        assert_eq!(state.enemies.len(), 1 + BOSS_SUMMON_COUNT);
        let def = content.boss("warlord").unwrap();
        assert_eq!(state.enemies[0].ability_cooldown_ms, def.ability.cooldown_ms);
    }

    #[test]
    fn stun_delays_nearby_towers() {
        let content = Content::builtin();
        let mut state = new_game("stun", content);
        let near = state.map.index_of(GridPos::new(2, 2)).unwrap();
        let far = state.map.index_of(GridPos::new(12, 10)).unwrap();
        state.structures.insert(near, "sentry".into());
        state.structures.insert(far, "sentry".into());
        let mut dragon = boss(content, "dragon");
        dragon.pos = GridPos::new(1, 1);
        dragon.ability_cooldown_ms = 0;
        state.enemies.push(dragon);
        tick_boss_abilities(&mut state, content, 1_000);
        let stun = u32::try_from(content.boss("dragon").unwrap().ability.value).unwrap();
        assert_eq!(state.tower_cooldowns.get(&near), Some(&stun));
        assert_eq!(state.tower_cooldowns.get(&far).copied().unwrap_or(0), 0);
    }
}
