//! A playthrough with its content and intent history.
use crate::content::Content;
use crate::intent::Intent;
use crate::persistence::{PersistenceError, save_state};
use crate::pipeline::{IntentResult, apply};
use crate::state::GameState;
use crate::world::new_game;

/// Result of one session step, without the state copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub events: Vec<String>,
    pub ok: bool,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    content: Content,
    history: Vec<Intent>,
}

impl GameSession {
    #[must_use]
    pub fn new(seed: &str, content: Content) -> Self {
        let state = new_game(seed, &content);
        Self::from_state(state, content)
    }

    /// Resume from an existing state; history starts empty.
    #[must_use]
    pub const fn from_state(state: GameState, content: Content) -> Self {
        Self {
            state,
            content,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn content(&self) -> &Content {
        &self.content
    }

    /// Intents that were accepted, in order.
    #[must_use]
    pub fn history(&self) -> &[Intent] {
        &self.history
    }

    pub fn apply(&mut self, intent: Intent) -> StepOutcome {
        let state = std::mem::take(&mut self.state);
        let IntentResult {
            state, events, ok, ..
        } = apply(state, &intent, &self.content);
        self.state = state;
        if ok && !intent.is_informational() {
            self.history.push(intent);
        }
        StepOutcome { events, ok }
    }

    /// Parse a typed command for the current phase and apply it.
    pub fn apply_command(&mut self, line: &str) -> StepOutcome {
        match Intent::parse_command(line, self.state.phase, self.state.encounter.is_some()) {
            Ok(intent) => self.apply(intent),
            Err(err) => StepOutcome {
                events: vec![format!("Error: {err}")],
                ok: false,
            },
        }
    }

    /// # Errors
    ///
    /// Propagates encoding failures.
    pub fn save(&self) -> Result<String, PersistenceError> {
        save_state(&self.state)
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}

/// Rebuild a state by applying `intents` to a fresh game from `seed`.
#[must_use]
pub fn replay(seed: &str, intents: &[Intent], content: &Content) -> GameState {
    intents
        .iter()
        .fold(new_game(seed, content), |state, intent| {
            apply(state, intent, content).state
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_reproduces_session() {
        let content = Content::builtin().clone();
        let mut session = GameSession::new("replay", content.clone());
        for line in ["explore", "gather wood", "status", "build sentry 99 99", "end", "wait"] {
            session.apply_command(line);
        }
        assert!(session.history().iter().all(|i| !i.is_informational()));
        let rebuilt = replay("replay", session.history(), &content);
        assert_eq!(&rebuilt, session.state());
    }

    #[test]
    fn bad_commands_report_errors() {
        let mut session = GameSession::new("commands", Content::builtin().clone());
        let outcome = session.apply_command("dance wildly");
        assert!(!outcome.ok);
        assert!(outcome.events[0].starts_with("Error"));
        assert!(session.history().is_empty());
    }
}
