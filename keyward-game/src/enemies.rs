//! Enemy factory, word assignment and kill rewards.
use crate::affixes::{apply_affix, roll_affix};
use crate::buffs::{EFFECT_GOLD_BONUS, effect_total};
use crate::constants::{
    ENEMY_ARMOR_DAY_DIVISOR, ENEMY_HP_DAY_DIVISOR, ENEMY_HP_THREAT_DIVISOR, START_LESSON,
};
use crate::content::Content;
use crate::map::GridPos;
use crate::numbers::floor_f64_to_i32;
use crate::state::{Enemy, GameState, ResourceKind};

const FALLBACK_WORD: &str = "ward";

fn live_words(state: &GameState) -> Vec<String> {
    let encounter = state
        .encounter
        .iter()
        .flat_map(|encounter| encounter.enemies.iter());
    state
        .enemies
        .iter()
        .chain(encounter)
        .filter(|enemy| enemy.is_alive())
        .map(|enemy| enemy.word.to_ascii_lowercase())
        .collect()
}

/// Pick a typing word not already assigned to a live enemy.
///
/// Falls back to any pool word when every word is taken.
pub fn pick_word(state: &mut GameState, content: &Content, boss: bool) -> String {
    let pool: Vec<String> = if boss && !content.words.boss.is_empty() {
        content.words.boss.clone()
    } else if content.has_lesson(&state.lesson_id) {
        content.lesson_words(&state.lesson_id).to_vec()
    } else {
        content.lesson_words(START_LESSON).to_vec()
    };
    let taken = live_words(state);
    let free: Vec<&String> = pool
        .iter()
        .filter(|word| !taken.contains(&word.to_ascii_lowercase()))
        .collect();
    let picked = if free.is_empty() {
        state.rng.choose(&pool).cloned()
    } else {
        state.rng.choose(&free).map(|word| (*word).clone())
    };
    picked.unwrap_or_else(|| FALLBACK_WORD.to_string())
}

/// Build a scaled regular enemy. Unknown kinds yield `None`.
pub fn create_enemy(
    state: &mut GameState,
    content: &Content,
    kind: &str,
    pos: GridPos,
) -> Option<Enemy> {
    let def = content.enemy(kind)?;
    let hp = def.hp + state.day / ENEMY_HP_DAY_DIVISOR + state.threat / ENEMY_HP_THREAT_DIVISOR;
    let mut enemy = Enemy {
        id: state.alloc_enemy_id(),
        kind: def.id.clone(),
        pos,
        hp,
        max_hp: hp,
        armor: def.armor + state.day / ENEMY_ARMOR_DAY_DIVISOR,
        speed: def.speed,
        damage: def.damage,
        tier: def.tier,
        gold: def.gold,
        ..Enemy::default()
    };
    enemy.word = pick_word(state, content, false);
    if let Some(affix) = roll_affix(state.day, &mut state.rng, content) {
        apply_affix(&mut enemy, &affix);
    }
    log::debug!("created {} #{} at {pos} ({} hp)", enemy.kind, enemy.id, enemy.hp);
    Some(enemy)
}

/// Build a boss at full strength. Bosses never roll affixes.
pub fn create_boss(
    state: &mut GameState,
    content: &Content,
    boss_id: &str,
    pos: GridPos,
) -> Option<Enemy> {
    let def = content.boss(boss_id)?;
    let enemy = Enemy {
        id: state.alloc_enemy_id(),
        kind: def.id.clone(),
        pos,
        hp: def.hp,
        max_hp: def.hp,
        armor: def.armor,
        speed: def.speed,
        damage: def.damage,
        tier: 3,
        gold: def.gold,
        word: pick_word(state, content, true),
        is_boss: true,
        ability_cooldown_ms: def.ability.cooldown_ms,
        ..Enemy::default()
    };
    Some(enemy)
}

/// Create an enemy and add it to the night field. Returns its id.
pub fn spawn_enemy(
    state: &mut GameState,
    content: &Content,
    kind: &str,
    pos: GridPos,
) -> Option<u32> {
    let enemy = create_enemy(state, content, kind, pos)?;
    let id = enemy.id;
    state.enemies.push(enemy);
    Some(id)
}

/// Grant gold and counters for a defeated enemy and describe it.
pub fn reward_kill(state: &mut GameState, content: &Content, enemy: &Enemy) -> String {
    let bonus = floor_f64_to_i32(effect_total(state, content, EFFECT_GOLD_BONUS));
    let gold = (enemy.gold + bonus).max(0);
    state.add_resource(ResourceKind::Gold, gold);
    state.counters.kills += 1;
    if enemy.is_boss {
        state.counters.bosses_defeated += 1;
        let name = content
            .boss(&enemy.kind)
            .map_or(enemy.kind.as_str(), |def| def.name.as_str());
        return format!("{name} has fallen! (+{gold} gold)");
    }
    format!("Defeated {} #{} (+{gold} gold)", enemy.kind, enemy.id)
}

/// Remove dead enemies from the night field, rewarding each.
pub fn sweep_defeated(state: &mut GameState, content: &Content) -> Vec<String> {
    let (dead, alive): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|enemy| !enemy.is_alive());
    state.enemies = alive;
    dead.iter()
        .map(|enemy| reward_kill(state, content, enemy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::new_game;

    #[test]
    fn scaling_follows_day_and_threat() {
        let content = Content::builtin();
        let mut state = new_game("scale", content);
        state.day = 9;
        state.threat = 25;
        let raider = content.enemy("raider").unwrap().clone();
        let enemy = create_enemy(&mut state, content, "raider", GridPos::new(0, 0)).unwrap();
        let base_hp = raider.hp + 3 + 2;
        if enemy.affix.as_deref() == Some("resilient") {
            assert_eq!(enemy.max_hp, floor_f64_to_i32(f64::from(base_hp) * 1.5));
        } else {
            assert_eq!(enemy.max_hp, base_hp);
        }
        let armor_bonus = if enemy.affix.as_deref() == Some("armored") { 2 } else { 0 };
        assert_eq!(enemy.armor, raider.armor + 1 + armor_bonus);
    }

    #[test]
    fn unknown_kind_is_none() {
        let content = Content::builtin();
        let mut state = new_game("none", content);
        let before = state.next_enemy_id;
        assert!(create_enemy(&mut state, content, "dragonfly", GridPos::new(0, 0)).is_none());
        assert_eq!(state.next_enemy_id, before);
    }

    #[test]
    fn words_avoid_live_duplicates() {
        let content = Content::builtin();
        let mut state = new_game("words", content);
        let pool = content.lesson_words(&state.lesson_id).len();
        for _ in 0..pool {
            spawn_enemy(&mut state, content, "imp", GridPos::new(0, 0)).unwrap();
        }
        let mut words: Vec<String> = state.enemies.iter().map(|e| e.word.clone()).collect();
        words.sort();
        words.dedup();
        assert_eq!(words.len(), pool);
        spawn_enemy(&mut state, content, "imp", GridPos::new(0, 0)).unwrap();
        assert!(!state.enemies.last().unwrap().word.is_empty());
    }

    #[test]
    fn kills_pay_gold_and_count() {
        let content = Content::builtin();
        let mut state = new_game("gold", content);
        let gold = state.gold;
        let enemy = Enemy {
            id: 9,
            kind: "raider".into(),
            gold: 3,
            ..Enemy::default()
        };
        state.enemies.push(enemy);
        let events = sweep_defeated(&mut state, content);
        assert_eq!(events, vec!["Defeated raider #9 (+3 gold)".to_string()]);
        assert_eq!(state.gold, gold + 3);
        assert_eq!(state.counters.kills, 1);
        assert!(state.enemies.is_empty());
    }
}
