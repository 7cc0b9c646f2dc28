//! Scripted player shared by the integration tests.
#![allow(dead_code)]

use keyward_game::{GameSession, GameState, GridPos, Intent, StepOutcome};

/// First discovered tile a structure can go on.
pub fn open_tile(state: &GameState) -> Option<GridPos> {
    state
        .map
        .discovered
        .iter()
        .copied()
        .filter(|index| {
            !state.structures.contains_key(index)
                && !state.resource_nodes.contains_key(index)
                && !state.pois.contains_key(index)
        })
        .map(|index| state.map.pos_of(index))
        .find(|pos| *pos != state.map.base && state.map.is_passable(*pos))
}

/// The intent a steady player would choose next.
pub fn next_intent(state: &GameState) -> Intent {
    if let Some(target) = state.typing_targets().first() {
        return Intent::DefendInput {
            text: target.word.clone(),
            elapsed_ms: Some(900),
        };
    }
    if state.is_night() || state.encounter.is_some() {
        return Intent::Wait;
    }
    if state.ap > 0 {
        if state.gold >= 10
            && state.resources.wood >= 5
            && let Some(tile) = open_tile(state)
        {
            return Intent::Build {
                structure: "sentry".into(),
                x: tile.x,
                y: tile.y,
            };
        }
        return Intent::Explore;
    }
    Intent::End
}

/// Apply the next intent; a refused day action falls back to ending the day.
pub fn step(session: &mut GameSession) -> StepOutcome {
    let intent = next_intent(session.state());
    let outcome = session.apply(intent);
    if outcome.ok || session.state().is_over() {
        return outcome;
    }
    session.apply(Intent::End)
}

/// Step until `done` holds, the game ends or `limit` steps pass.
pub fn play_until(
    session: &mut GameSession,
    limit: usize,
    done: impl Fn(&GameState) -> bool,
) -> usize {
    let mut steps = 0;
    while steps < limit && !session.state().is_over() && !done(session.state()) {
        step(session);
        steps += 1;
    }
    steps
}
