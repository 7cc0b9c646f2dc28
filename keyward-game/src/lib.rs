//! Keyward Game Engine
//!
//! Deterministic simulation core for the Keyward typing tower-defense game.
//! The engine turns player intents into a new game state plus human-readable
//! events, using a seeded generator stored inside the state so that the same
//! seed and intents always reproduce the same game.

pub mod affixes;
pub mod boss;
pub mod buffs;
pub mod combat;
pub mod constants;
pub mod content;
pub mod damage;
pub mod diplomacy;
pub mod economy;
pub mod enemies;
pub mod expeditions;
pub mod intent;
pub mod map;
pub mod night;
pub mod numbers;
pub mod persistence;
pub mod pipeline;
pub mod progression;
pub mod rng;
pub mod session;
pub mod spells;
pub mod state;
pub mod status;
pub mod summons;
pub mod synergy;
pub mod targeting;
pub mod typing;
pub mod waves;
pub mod world;

// Re-export commonly used types
pub use combat::{TowerAttack, tick_towers};
pub use content::{Content, ContentError};
pub use damage::{DamageType, calculate_damage};
pub use intent::{DiplomacyAction, INTENT_KINDS, Intent, IntentError};
pub use map::{GameMap, GridPos, Terrain};
pub use persistence::{PersistenceError, load_state, save_state};
pub use pipeline::{IntentResult, apply, apply_value};
pub use rng::{GameRng, hash_index};
pub use session::{GameSession, StepOutcome, replay};
pub use state::{Enemy, GameState, Phase, ResourceBundle, ResourceKind};
pub use status::{StatusEffect, StatusKind};
pub use targeting::TargetingMode;
pub use typing::TypingMetrics;
pub use world::new_game;

/// Trait for abstracting content loading.
/// Frontends may ship their own tables; [`BuiltinContent`] uses the embedded ones.
pub trait ContentLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every content registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a table cannot be read or fails validation.
    fn load_content(&self) -> Result<Content, Self::Error>;
}

/// Loads the tables compiled into the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinContent;

impl ContentLoader for BuiltinContent {
    type Error = ContentError;

    fn load_content(&self) -> Result<Content, Self::Error> {
        Content::load_builtin()
    }
}

/// Trait for abstracting save/load operations.
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Main game engine for managing game instances
pub struct GameEngine<L, S>
where
    L: ContentLoader,
    S: GameStorage,
{
    loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: ContentLoader,
    S: GameStorage,
{
    /// Create a new game engine with the provided content loader and storage
    pub const fn new(loader: L, storage: S) -> Self {
        Self { loader, storage }
    }

    /// Create a new game from a seed string
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be loaded.
    pub fn create_game(&self, seed: &str) -> Result<GameState, L::Error> {
        self.create_session(seed).map(GameSession::into_state)
    }

    /// Construct a new session holding state, content and history.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be loaded.
    pub fn create_session(&self, seed: &str) -> Result<GameSession, L::Error> {
        let content = self.loader.load_content()?;
        Ok(GameSession::new(seed, content))
    }

    /// Save a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    pub fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), S::Error> {
        self.storage.save_game(save_name, game_state)
    }

    /// Load a saved game into a session with freshly loaded content
    ///
    /// # Errors
    ///
    /// Returns an error if the save or the content cannot be loaded.
    pub fn load_game(&self, save_name: &str) -> Result<Option<GameSession>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(game_state) = self.storage.load_game(save_name).map_err(Into::into)? else {
            return Ok(None);
        };
        let content = self.loader.load_content().map_err(Into::into)?;
        Ok(Some(GameSession::from_state(game_state, content)))
    }

    /// Delete a saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_game(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}
