//! World creation and the exploration actions: moving, exploring, talking.
use crate::constants::{
    EXPLORE_AP_COST, EXPLORE_ROAMING_CHANCE, EXPLORE_THREAT_GAIN, MAP_HEIGHT, MAP_WIDTH,
    POIS_AT_START, RESOURCE_NODES_AT_START, ROAMING_ENEMIES_AT_START, START_AP, START_FOOD,
    START_GOLD, START_HP, START_LESSON, START_STONE, START_WOOD, THREAT_MAX,
};
use crate::content::{Content, NpcRole};
use crate::enemies::create_enemy;
use crate::intent::IntentError;
use crate::map::{GameMap, GridPos};
use crate::numbers::usize_to_i32;
use crate::progression::{apply_reward, roll_daily_challenge};
use crate::rng::GameRng;
use crate::state::{
    Encounter, GameState, Npc, Phase, Poi, Resources, ResourceNode, RoamingEnemy,
};

const NODE_MIN_DISTANCE: i32 = 2;
const NPC_DISTANCE: (i32, i32) = (2, 3);
const POI_MIN_DISTANCE: i32 = 3;
const ROAMING_MIN_DISTANCE: i32 = 4;
const ENCOUNTER_EXTRA_EVERY_DAYS: i32 = 5;

fn tile_is_free(state: &GameState, pos: GridPos) -> bool {
    let Some(index) = state.map.index_of(pos) else {
        return false;
    };
    state.map.is_passable(pos)
        && pos != state.map.base
        && !state.resource_nodes.contains_key(&index)
        && !state.pois.contains_key(&index)
        && !state.structures.contains_key(&index)
        && !state.npcs.iter().any(|npc| npc.pos == pos)
        && !state.roaming.iter().any(|enemy| enemy.pos == pos)
}

/// RNG-picked free tile whose distance from the base lies in `min..=max`.
fn random_free_tile(state: &mut GameState, min: i32, max: i32) -> Option<GridPos> {
    let base = state.map.base;
    let candidates: Vec<GridPos> = (0..state.map.terrain.len())
        .map(|index| state.map.pos_of(index))
        .filter(|pos| {
            let distance = pos.manhattan(base);
            distance >= min && distance <= max && tile_is_free(state, *pos)
        })
        .collect();
    state.rng.choose(&candidates).copied()
}

fn tier_one_kinds(content: &Content) -> Vec<String> {
    content
        .combat
        .enemies
        .iter()
        .filter(|def| def.tier == 1)
        .map(|def| def.id.clone())
        .collect()
}

fn place_roaming(state: &mut GameState, content: &Content, pos: GridPos) -> Option<String> {
    let kinds = tier_one_kinds(content);
    let kind = state.rng.choose(&kinds)?.clone();
    let id = state.alloc_enemy_id();
    state.roaming.push(RoamingEnemy {
        id,
        kind: kind.clone(),
        pos,
    });
    Some(kind)
}

fn populate(state: &mut GameState, content: &Content) {
    let far = MAP_WIDTH.max(MAP_HEIGHT) * 2;
    let node_ids: Vec<String> = content
        .economy
        .resource_nodes
        .iter()
        .map(|def| def.id.clone())
        .collect();
    for _ in 0..RESOURCE_NODES_AT_START {
        let Some(kind) = state.rng.choose(&node_ids).cloned() else {
            break;
        };
        let Some(pos) = random_free_tile(state, NODE_MIN_DISTANCE, far) else {
            break;
        };
        if let Some(index) = state.map.index_of(pos) {
            state.resource_nodes.insert(
                index,
                ResourceNode {
                    kind,
                    cooldown_days: 0,
                },
            );
        }
    }

    let mut poi_ids: Vec<String> = content
        .progression
        .pois
        .iter()
        .map(|def| def.id.clone())
        .collect();
    for _ in 0..POIS_AT_START {
        let Some(slot) = state.rng.pick_index(poi_ids.len()) else {
            break;
        };
        let Some(pos) = random_free_tile(state, POI_MIN_DISTANCE, far) else {
            break;
        };
        let id = poi_ids.remove(slot);
        if let Some(index) = state.map.index_of(pos) {
            state.pois.insert(index, Poi { id, visited: false });
        }
    }

    for def in &content.progression.npcs {
        let Some(pos) = random_free_tile(state, NPC_DISTANCE.0, NPC_DISTANCE.1) else {
            log::warn!("no room to place npc {}", def.id);
            continue;
        };
        state.npcs.push(Npc {
            id: def.id.clone(),
            pos,
            talked: false,
        });
    }

    for _ in 0..ROAMING_ENEMIES_AT_START {
        let Some(pos) = random_free_tile(state, ROAMING_MIN_DISTANCE, far) else {
            break;
        };
        place_roaming(state, content, pos);
    }
}

/// Create a fresh game from a seed string.
#[must_use]
pub fn new_game(seed: &str, content: &Content) -> GameState {
    let mut rng = GameRng::from_seed_str(seed);
    let map = GameMap::generate(MAP_WIDTH, MAP_HEIGHT, &mut rng);
    let mut state = GameState {
        seed: seed.to_string(),
        rng,
        hp: START_HP,
        hp_max: START_HP,
        ap: START_AP,
        ap_max: START_AP,
        gold: START_GOLD,
        resources: Resources {
            wood: START_WOOD,
            stone: START_STONE,
            food: START_FOOD,
        },
        player_pos: map.base,
        lesson_id: START_LESSON.to_string(),
        map,
        ..GameState::default()
    };
    state.counters.tiles_discovered = usize_to_i32(state.map.discovered.len());
    populate(&mut state, content);
    roll_daily_challenge(&mut state, content);
    log::debug!(
        "new game '{seed}': {} nodes, {} pois, {} roaming",
        state.resource_nodes.len(),
        state.pois.len(),
        state.roaming.len()
    );
    state
}

fn reveal_tile(state: &mut GameState, content: &Content, pos: GridPos) -> Vec<String> {
    let mut events = Vec::new();
    if !state.map.reveal(pos) {
        return events;
    }
    state.counters.tiles_discovered += 1;
    if let Some(index) = state.map.index_of(pos) {
        if let Some(node) = state.resource_nodes.get(&index)
            && let Some(def) = content.resource_node(&node.kind)
        {
            events.push(format!("Found a {} at {pos}", def.name));
        }
        if let Some(poi) = state.pois.get(&index)
            && let Some(def) = content.poi(&poi.id)
        {
            events.push(format!("Spotted {} at {pos}", def.name));
        }
    }
    events
}

fn visit_poi(state: &mut GameState, content: &Content, pos: GridPos) -> Option<String> {
    let index = state.map.index_of(pos)?;
    let poi = state.pois.get_mut(&index)?;
    if poi.visited {
        return None;
    }
    poi.visited = true;
    let id = poi.id.clone();
    let def = content.poi(&id)?;
    let reward = apply_reward(state, &def.reward);
    Some(format!("{}: {} ({reward})", def.name, def.message))
}

fn start_encounter(state: &mut GameState, content: &Content, roaming: RoamingEnemy) -> Vec<String> {
    let count = 1 + state.day / ENCOUNTER_EXTRA_EVERY_DAYS;
    let pos = state.player_pos;
    let mut enemies = Vec::new();
    for _ in 0..count {
        if let Some(enemy) = create_enemy(state, content, &roaming.kind, pos) {
            enemies.push(enemy);
        }
    }
    let words: Vec<String> = enemies
        .iter()
        .map(|enemy| format!("'{}'", enemy.word))
        .collect();
    state.encounter = Some(Encounter {
        source_id: roaming.id,
        enemies,
    });
    vec![format!(
        "A {} ambushes you! Type {} to fight",
        roaming.kind,
        words.join(", ")
    )]
}

fn check_ambush(state: &mut GameState, content: &Content) -> Vec<String> {
    let player = state.player_pos;
    let Some(slot) = state
        .roaming
        .iter()
        .position(|enemy| enemy.pos.manhattan(player) <= 1)
    else {
        return Vec::new();
    };
    let roaming = state.roaming.remove(slot);
    start_encounter(state, content, roaming)
}

fn require_exploring(state: &GameState, action: &'static str) -> Result<(), IntentError> {
    if state.phase != Phase::Day {
        return Err(IntentError::WrongPhase {
            action,
            phase: state.phase,
        });
    }
    if state.encounter.is_some() {
        return Err(IntentError::InEncounter(action));
    }
    Ok(())
}

/// Step one tile in any direction, including diagonals.
///
/// # Errors
///
/// Fails at night, in an encounter, for long or blocked steps.
pub fn move_player(
    state: &mut GameState,
    content: &Content,
    dx: i32,
    dy: i32,
) -> Result<Vec<String>, IntentError> {
    require_exploring(state, "move")?;
    if dx.abs() > 1 || dy.abs() > 1 || (dx == 0 && dy == 0) {
        return Err(IntentError::InvalidPayload(format!(
            "a step is one tile, got ({dx}, {dy})"
        )));
    }
    let target = state.player_pos.offset(dx, dy);
    if !state.map.in_bounds(target) {
        return Err(IntentError::OutOfBounds {
            x: target.x,
            y: target.y,
        });
    }
    if !state.map.is_passable(target) {
        return Err(IntentError::rejected(format!("water blocks the way at {target}")));
    }
    state.player_pos = target;
    let mut events = vec![format!("You move to {target}")];
    events.extend(reveal_tile(state, content, target));
    events.extend(visit_poi(state, content, target));
    events.extend(check_ambush(state, content));
    Ok(events)
}

/// Reveal the nearest unexplored tile.
///
/// # Errors
///
/// Fails outside the day, in an encounter, without AP or when the map is known.
pub fn explore(state: &mut GameState, content: &Content) -> Result<Vec<String>, IntentError> {
    require_exploring(state, "explore")?;
    if state.ap < EXPLORE_AP_COST {
        return Err(IntentError::NotEnoughAp {
            needed: EXPLORE_AP_COST,
            have: state.ap,
        });
    }
    let Some(tile) = state.map.nearest_undiscovered(state.player_pos) else {
        return Err(IntentError::rejected("the whole map is already explored"));
    };
    state.ap -= EXPLORE_AP_COST;
    state.threat = (state.threat + EXPLORE_THREAT_GAIN).min(THREAT_MAX);
    let terrain = state.map.terrain_at(tile).unwrap_or_default();
    let mut events = vec![format!("Explored {tile}: {}", terrain.as_str())];
    events.extend(reveal_tile(state, content, tile));
    if state.rng.roll_chance(EXPLORE_ROAMING_CHANCE)
        && tile_is_free(state, tile)
        && let Some(kind) = place_roaming(state, content, tile)
    {
        events.push(format!("A {kind} prowls near {tile}"));
    }
    Ok(events)
}

/// Talk to an NPC standing on or next to the player.
///
/// # Errors
///
/// Fails when nobody is close enough.
pub fn talk(state: &mut GameState, content: &Content) -> Result<Vec<String>, IntentError> {
    require_exploring(state, "talk")?;
    let player = state.player_pos;
    let Some(slot) = state
        .npcs
        .iter()
        .position(|npc| npc.pos.manhattan(player) <= 1)
    else {
        return Err(IntentError::rejected("nobody is close enough to talk to"));
    };
    let npc_id = state.npcs[slot].id.clone();
    let first_visit = !state.npcs[slot].talked;
    state.npcs[slot].talked = true;
    let def = content
        .npc(&npc_id)
        .ok_or_else(|| IntentError::unknown("npc", &npc_id))?;
    let mut events = vec![format!("{}: \"{}\"", def.name, def.greeting)];
    match def.role {
        NpcRole::Merchant => events.push(format!(
            "{}: \"Build a market and I will swap gold for twice its weight in goods.\"",
            def.name
        )),
        NpcRole::Trainer if first_visit => {
            state.skill_points += 1;
            events.push(format!("{} trains you (+1 skill point)", def.name));
        }
        NpcRole::Trainer => events.push(format!("{}: \"Keep your fingers nimble.\"", def.name)),
        NpcRole::Sage => match content.next_boss(state.day) {
            Some(boss) => events.push(format!(
                "{}: \"{} comes on day {}.\"",
                def.name, boss.name, boss.unlock_day
            )),
            None => events.push(format!("{}: \"No great foe remains.\"", def.name)),
        },
    }
    Ok(events)
}

/// Switch the lesson new enemy words are drawn from.
///
/// # Errors
///
/// Fails for unknown lessons.
pub fn set_lesson(
    state: &mut GameState,
    content: &Content,
    lesson: &str,
) -> Result<Vec<String>, IntentError> {
    if !content.has_lesson(lesson) {
        return Err(IntentError::unknown("lesson", lesson));
    }
    state.lesson_id = lesson.to_string();
    Ok(vec![format!("Lesson set to {lesson}")])
}
