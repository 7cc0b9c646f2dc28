use keyward_game::spells::cooldown_remaining;
use keyward_game::{
    Content, DiplomacyAction, Enemy, GameSession, GameState, GridPos, Intent, ResourceKind,
    StepOutcome,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Towers the steady player raises, in order.
const TOWER_PLAN: [&str; 6] = ["sentry", "flame", "frost", "sentry", "tesla", "shrine"];

/// Policy interface for automated play.
pub trait PlayerPolicy {
    /// Name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Pick the next intent for `state`.
    fn next_intent(&mut self, state: &GameState, content: &Content) -> Intent;
}

/// Builds a tower line by day and types at the closest enemy by night.
#[derive(Debug, Clone, Copy, Default)]
pub struct SteadyPolicy;

impl PlayerPolicy for SteadyPolicy {
    fn name(&self) -> &'static str {
        "steady"
    }

    fn next_intent(&mut self, state: &GameState, content: &Content) -> Intent {
        if let Some(target) = closest_target(state) {
            if let Some(spell) = spell_to_cast(state) {
                return Intent::CastSpell {
                    spell: spell.to_string(),
                };
            }
            return Intent::DefendInput {
                text: target.word.clone(),
                elapsed_ms: Some(1_200),
            };
        }
        if state.is_night() || state.encounter.is_some() {
            return Intent::Wait;
        }
        if state.ap <= 0 {
            return Intent::End;
        }
        if let Some(intent) = planned_build(state, content) {
            return intent;
        }
        if state.resources.wood < 10 {
            return Intent::Gather {
                resource: ResourceKind::Wood,
            };
        }
        Intent::Explore
    }
}

fn closest_target(state: &GameState) -> Option<&Enemy> {
    let base = state.map.base;
    state
        .typing_targets()
        .iter()
        .filter(|enemy| enemy.is_alive())
        .min_by_key(|enemy| (enemy.pos.manhattan(base), enemy.id))
}

fn spell_to_cast(state: &GameState) -> Option<&'static str> {
    let ready = |id: &str| cooldown_remaining(state, id) <= 0.0;
    if state.hp * 3 < state.hp_max && ready("mend") {
        return Some("mend");
    }
    if state.is_night() && state.enemies.len() >= 4 && ready("fireball") {
        return Some("fireball");
    }
    None
}

fn planned_build(state: &GameState, content: &Content) -> Option<Intent> {
    let built: usize = TOWER_PLAN
        .iter()
        .map(|kind| state.count_structures(kind))
        .sum();
    let kind = TOWER_PLAN.get(built % TOWER_PLAN.len())?;
    let cost = content.tower(kind)?.cost;
    if !state.can_afford(&cost) {
        return None;
    }
    let tile = open_tile_near_base(state)?;
    Some(Intent::Build {
        structure: (*kind).to_string(),
        x: tile.x,
        y: tile.y,
    })
}

/// Closest discovered tile that can take a structure.
#[must_use]
pub fn open_tile_near_base(state: &GameState) -> Option<GridPos> {
    let base = state.map.base;
    state
        .map
        .discovered
        .iter()
        .filter(|index| {
            !state.structures.contains_key(index)
                && !state.resource_nodes.contains_key(index)
                && !state.pois.contains_key(index)
        })
        .map(|index| state.map.pos_of(*index))
        .filter(|pos| *pos != base && state.map.is_passable(*pos))
        .min_by_key(|pos| (pos.manhattan(base), pos.y, pos.x))
}

/// Random but well-formed intents, reproducible from a seed label.
#[derive(Debug, Clone)]
pub struct FuzzPolicy {
    rng: ChaCha20Rng,
}

impl FuzzPolicy {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(label.as_bytes());
        Self {
            rng: ChaCha20Rng::seed_from_u64(hasher.finish()),
        }
    }

    fn fighting_intent(&mut self, state: &GameState, content: &Content) -> Intent {
        let roll: u32 = self.rng.gen_range(0..100);
        let targets = state.typing_targets();
        match roll {
            0..70 if !targets.is_empty() => {
                let pick = self.rng.gen_range(0..targets.len());
                Intent::DefendInput {
                    text: targets[pick].word.clone(),
                    elapsed_ms: Some(self.rng.gen_range(300..2_500)),
                }
            }
            70..82 => {
                let words = content.lesson_words(&state.lesson_id);
                let text = if words.is_empty() {
                    "miss".to_string()
                } else {
                    words[self.rng.gen_range(0..words.len())].clone()
                };
                Intent::DefendInput {
                    text,
                    elapsed_ms: None,
                }
            }
            82..86 => {
                let spells = &content.combat.spells;
                match spells.get(self.rng.gen_range(0..spells.len().max(1))) {
                    Some(spell) => Intent::CastSpell {
                        spell: spell.id.clone(),
                    },
                    None => Intent::Wait,
                }
            }
            86..92 => Intent::Tick {
                delta_ms: self.rng.gen_range(100..1_500),
            },
            _ => Intent::Wait,
        }
    }

    fn day_intent(&mut self, state: &GameState, content: &Content) -> Intent {
        if state.ap <= 0 && self.rng.gen_bool(0.6) {
            return Intent::End;
        }
        let roll: u32 = self.rng.gen_range(0..100);
        match roll {
            0..15 => Intent::Explore,
            15..25 => Intent::Gather {
                resource: ResourceKind::ALL[self.rng.gen_range(0..ResourceKind::ALL.len())],
            },
            25..45 => {
                let towers = &content.combat.towers;
                let base = state.map.base;
                let Some(tower) = towers.get(self.rng.gen_range(0..towers.len().max(1))) else {
                    return Intent::Explore;
                };
                Intent::Build {
                    structure: tower.id.clone(),
                    x: base.x + self.rng.gen_range(-2..=2),
                    y: base.y + self.rng.gen_range(-2..=2),
                }
            }
            45..60 => {
                let (dx, dy) = [(0, -1), (0, 1), (1, 0), (-1, 0)][self.rng.gen_range(0..4)];
                Intent::MovePlayer { dx, dy }
            }
            60..64 => Intent::Talk,
            64..68 => Intent::Trade {
                give: ResourceKind::Gold,
                receive: ResourceKind::Wood,
                amount: self.rng.gen_range(1..6),
            },
            68..71 => match content.economy.factions.first() {
                Some(faction) => Intent::Diplomacy {
                    faction: faction.id.clone(),
                    action: DiplomacyAction::Gift,
                },
                None => Intent::Explore,
            },
            71..74 => match content.economy.expeditions.first() {
                Some(expedition) => Intent::StartExpedition {
                    id: expedition.id.clone(),
                },
                None => Intent::Explore,
            },
            74..76 => Intent::Status,
            _ => Intent::End,
        }
    }
}

impl PlayerPolicy for FuzzPolicy {
    fn name(&self) -> &'static str {
        "fuzz"
    }

    fn next_intent(&mut self, state: &GameState, content: &Content) -> Intent {
        if state.is_night() || state.encounter.is_some() {
            self.fighting_intent(state, content)
        } else {
            self.day_intent(state, content)
        }
    }
}

/// Apply one policy step. A refused intent falls back to waiting at night
/// or ending the day, so every step makes progress.
pub fn drive_step(session: &mut GameSession, policy: &mut dyn PlayerPolicy) -> StepOutcome {
    let intent = policy.next_intent(session.state(), session.content());
    log::trace!("{} plays {intent}", policy.name());
    let outcome = session.apply(intent);
    if outcome.ok || session.state().is_over() {
        return outcome;
    }
    let fallback = if session.state().is_night() || session.state().encounter.is_some() {
        Intent::Wait
    } else {
        Intent::End
    };
    session.apply(fallback)
}

/// Drive until `stop` holds, the game ends or `limit` steps pass. Returns the step count.
pub fn drive(
    session: &mut GameSession,
    policy: &mut dyn PlayerPolicy,
    limit: usize,
    stop: impl Fn(&GameState) -> bool,
) -> usize {
    let mut steps = 0;
    while steps < limit && !session.state().is_over() && !stop(session.state()) {
        drive_step(session, policy);
        steps += 1;
    }
    steps
}
