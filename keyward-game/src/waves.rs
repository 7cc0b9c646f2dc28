//! Wave sizing, themes and spawning.
use crate::constants::{BOSS_THEME, MAX_WAVES_PER_NIGHT, WAVE_BASE_ENEMIES, WAVE_THEMES};
use crate::content::Content;
use crate::enemies::{create_boss, create_enemy};
use crate::numbers::floor_f64_to_i32;
use crate::rng::GameRng;
use crate::state::GameState;

/// Enemies spawned per step while a wave is still arriving.
const SPAWNS_PER_STEP: usize = 2;
const ARMORED_HEAVY_DAY: i32 = 8;

/// `max(1, floor((2 + day / 2) * (1 + wave_index / total_waves)))`.
#[must_use]
pub fn wave_enemy_count(day: i32, wave_index: i32, total_waves: i32) -> i32 {
    let base = f64::from(WAVE_BASE_ENEMIES + day / 2);
    let growth = if total_waves > 0 {
        1.0 + f64::from(wave_index) / f64::from(total_waves)
    } else {
        1.0
    };
    floor_f64_to_i32(base * growth).max(1)
}

#[must_use]
pub fn total_waves(day: i32) -> i32 {
    (1 + day / 3).min(MAX_WAVES_PER_NIGHT)
}

#[must_use]
pub fn is_boss_day(day: i32, content: &Content) -> bool {
    content.boss_for_day(day).is_some()
}

/// Theme for a wave. The final wave of a boss day is always the boss assault.
pub fn select_theme(
    day: i32,
    wave_index: i32,
    total_waves: i32,
    rng: &mut GameRng,
    content: &Content,
) -> String {
    if wave_index + 1 >= total_waves && is_boss_day(day, content) {
        return BOSS_THEME.to_string();
    }
    rng.choose(&WAVE_THEMES)
        .map_or_else(|| WAVE_THEMES[0].to_string(), |theme| (*theme).to_string())
}

/// Enemy kinds a theme draws from on `day`.
#[must_use]
pub fn theme_kinds(theme: &str, day: i32, content: &Content) -> Vec<String> {
    let named = |ids: &[&str]| -> Vec<String> {
        ids.iter()
            .filter(|id| content.enemy(id).is_some())
            .map(|id| (*id).to_string())
            .collect()
    };
    let kinds = match theme {
        "swarm" => named(&["imp"]),
        "armored" if day >= ARMORED_HEAVY_DAY => named(&["brute", "juggernaut"]),
        "armored" => named(&["brute"]),
        "swift" => named(&["runner", "scout"]),
        "mixed" => {
            let tier = crate::affixes::max_affix_tier(day);
            content
                .combat
                .enemies
                .iter()
                .filter(|def| def.tier <= tier)
                .map(|def| def.id.clone())
                .collect()
        }
        _ => named(&["raider", "scout"]),
    };
    if kinds.is_empty() {
        content.combat.enemies.iter().map(|def| def.id.clone()).take(1).collect()
    } else {
        kinds
    }
}

/// Choose the theme and queue the spawns for the current wave.
pub fn compose_wave(state: &mut GameState, content: &Content) -> String {
    let day = state.day;
    let wave = state.night.wave_index;
    let total = state.night.total_waves;
    let theme = select_theme(day, wave, total, &mut state.rng, content);
    let count = usize::try_from(wave_enemy_count(day, wave, total)).unwrap_or(1);
    let mut pending = Vec::with_capacity(count + 1);
    let kind_theme = if theme == BOSS_THEME { "standard" } else { theme.as_str() };
    let kinds = theme_kinds(kind_theme, day, content);
    for _ in 0..count {
        if let Some(kind) = state.rng.choose(&kinds) {
            pending.push(kind.clone());
        }
    }
    state.night.has_boss = theme == BOSS_THEME;
    if state.night.has_boss
        && let Some(boss) = content.boss_for_day(day)
    {
        pending.insert(0, boss.id.clone());
    }
    state.night.pending_spawns = pending;
    state.night.theme = theme.clone();
    log::debug!(
        "day {day} wave {}/{total}: {theme} with {} spawns",
        wave + 1,
        state.night.pending_spawns.len()
    );
    format!(
        "Wave {}/{total} approaches: {theme} ({} foes)",
        wave + 1,
        state.night.pending_spawns.len()
    )
}

/// Place up to a few queued enemies on random edge tiles.
pub fn spawn_pending(state: &mut GameState, content: &Content) -> Vec<String> {
    let mut events = Vec::new();
    let edges = state.map.edge_tiles();
    for _ in 0..SPAWNS_PER_STEP {
        if state.night.pending_spawns.is_empty() {
            break;
        }
        let kind = state.night.pending_spawns.remove(0);
        let Some(pos) = state.rng.choose(&edges).copied() else {
            log::warn!("no passable edge tile to spawn {kind}");
            continue;
        };
        let enemy = if content.boss(&kind).is_some() {
            create_boss(state, content, &kind, pos)
        } else {
            create_enemy(state, content, &kind, pos)
        };
        match enemy {
            Some(enemy) => {
                events.push(if enemy.is_boss {
                    format!("{} arrives at {pos}! Type '{}'", enemy.kind, enemy.word)
                } else {
                    format!("A {} appears at {pos} [{}]", enemy.kind, enemy.word)
                });
                state.enemies.push(enemy);
            }
            None => log::warn!("unknown enemy kind {kind} in wave"),
        }
    }
    events
}
