//! Player intents: the closed command set, its wire form and the typed-command parser.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::state::{Phase, ResourceBundle, ResourceKind};

/// Why an intent was refused. The state is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntentError {
    #[error("unknown intent '{0}'")]
    UnknownIntent(String),
    #[error("unknown command '{0}', type 'help' for a list")]
    UnknownCommand(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("cannot {action} during the {phase}")]
    WrongPhase { action: &'static str, phase: Phase },
    #[error("cannot {0} during an encounter")]
    InEncounter(&'static str),
    #[error("not enough AP: need {needed}, have {have}")]
    NotEnoughAp { needed: i32, have: i32 },
    #[error("not enough resources: need {0}")]
    Insufficient(ResourceBundle),
    #[error("({x}, {y}) is out of bounds")]
    OutOfBounds { x: i32, y: i32 },
    #[error("unknown {what} '{id}'")]
    UnknownId { what: &'static str, id: String },
    #[error("{what} is on cooldown ({remaining:.1}s left)")]
    OnCooldown { what: String, remaining: f64 },
    #[error("{0}")]
    Rejected(String),
    #[error("the game is over")]
    GameOver,
}

impl IntentError {
    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub(crate) fn unknown(what: &'static str, id: &str) -> Self {
        Self::UnknownId {
            what,
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiplomacyAction {
    Gift,
    Agreement,
    Break,
}

impl DiplomacyAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gift => "gift",
            Self::Agreement => "agreement",
            Self::Break => "break",
        }
    }
}

impl FromStr for DiplomacyAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gift" => Ok(Self::Gift),
            "agreement" | "agree" => Ok(Self::Agreement),
            "break" => Ok(Self::Break),
            _ => Err(()),
        }
    }
}

/// Every action the engine accepts. Wire form: `{"kind": "...", ...payload}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    MovePlayer {
        dx: i32,
        dy: i32,
    },
    Explore,
    Gather {
        resource: ResourceKind,
    },
    Build {
        #[serde(rename = "type")]
        structure: String,
        x: i32,
        y: i32,
    },
    Upgrade {
        x: i32,
        y: i32,
        #[serde(default)]
        to: Option<String>,
    },
    Demolish {
        x: i32,
        y: i32,
    },
    End,
    Wait,
    Tick {
        delta_ms: u32,
    },
    DefendInput {
        text: String,
        #[serde(default)]
        elapsed_ms: Option<u64>,
    },
    CastSpell {
        spell: String,
    },
    Trade {
        give: ResourceKind,
        receive: ResourceKind,
        amount: i32,
    },
    Craft {
        item: String,
    },
    Equip {
        item: String,
    },
    Diplomacy {
        faction: String,
        action: DiplomacyAction,
    },
    StartExpedition {
        id: String,
    },
    UnlockSkill {
        id: String,
    },
    ClaimQuest {
        id: String,
    },
    Talk,
    SetLesson {
        lesson: String,
    },
    Help,
    Status,
}

/// Wire names of every intent kind.
pub const INTENT_KINDS: [&str; 22] = [
    "move_player",
    "explore",
    "gather",
    "build",
    "upgrade",
    "demolish",
    "end",
    "wait",
    "tick",
    "defend_input",
    "cast_spell",
    "trade",
    "craft",
    "equip",
    "diplomacy",
    "start_expedition",
    "unlock_skill",
    "claim_quest",
    "talk",
    "set_lesson",
    "help",
    "status",
];

impl Intent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MovePlayer { .. } => "move_player",
            Self::Explore => "explore",
            Self::Gather { .. } => "gather",
            Self::Build { .. } => "build",
            Self::Upgrade { .. } => "upgrade",
            Self::Demolish { .. } => "demolish",
            Self::End => "end",
            Self::Wait => "wait",
            Self::Tick { .. } => "tick",
            Self::DefendInput { .. } => "defend_input",
            Self::CastSpell { .. } => "cast_spell",
            Self::Trade { .. } => "trade",
            Self::Craft { .. } => "craft",
            Self::Equip { .. } => "equip",
            Self::Diplomacy { .. } => "diplomacy",
            Self::StartExpedition { .. } => "start_expedition",
            Self::UnlockSkill { .. } => "unlock_skill",
            Self::ClaimQuest { .. } => "claim_quest",
            Self::Talk => "talk",
            Self::SetLesson { .. } => "set_lesson",
            Self::Help => "help",
            Self::Status => "status",
        }
    }

    /// Informational intents never change the state.
    #[must_use]
    pub const fn is_informational(&self) -> bool {
        matches!(self, Self::Help | Self::Status)
    }

    /// Parse a wire record.
    ///
    /// # Errors
    ///
    /// [`IntentError::UnknownIntent`] for an unrecognized kind and
    /// [`IntentError::InvalidPayload`] for anything else that does not fit.
    pub fn from_value(value: &Value) -> Result<Self, IntentError> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| IntentError::InvalidPayload("missing string field 'kind'".into()))?;
        if !INTENT_KINDS.contains(&kind) {
            return Err(IntentError::UnknownIntent(kind.to_string()));
        }
        serde_json::from_value(value.clone())
            .map_err(|err| IntentError::InvalidPayload(format!("{kind}: {err}")))
    }

    /// Serialize to the wire record.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Parse a typed command line.
    ///
    /// At night or inside an encounter, anything that is not a combat command
    /// is treated as a word typed at an enemy.
    ///
    /// # Errors
    ///
    /// Returns an error for blank input, unknown commands or bad arguments.
    pub fn parse_command(
        line: &str,
        phase: Phase,
        in_encounter: bool,
    ) -> Result<Self, IntentError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(IntentError::InvalidPayload("empty command".into()));
        }
        let words: Vec<&str> = trimmed.split_whitespace().collect();
        let verb = words[0].to_ascii_lowercase();
        let args = &words[1..];
        let fighting = in_encounter || phase == Phase::Night;

        if fighting {
            return Ok(match verb.as_str() {
                "wait" if args.is_empty() => Self::Wait,
                "help" if args.is_empty() => Self::Help,
                "status" if args.is_empty() => Self::Status,
                "cast" if args.len() == 1 => Self::CastSpell {
                    spell: args[0].to_ascii_lowercase(),
                },
                "tick" if args.len() == 1 => Self::Tick {
                    delta_ms: parse_arg(args[0], "milliseconds")?,
                },
                _ => Self::DefendInput {
                    text: trimmed.to_string(),
                    elapsed_ms: None,
                },
            });
        }

        match (verb.as_str(), args) {
            ("move", [dx, dy]) => Ok(Self::MovePlayer {
                dx: parse_arg(dx, "dx")?,
                dy: parse_arg(dy, "dy")?,
            }),
            ("north" | "n", []) => Ok(Self::MovePlayer { dx: 0, dy: -1 }),
            ("south" | "s", []) => Ok(Self::MovePlayer { dx: 0, dy: 1 }),
            ("east" | "e", []) => Ok(Self::MovePlayer { dx: 1, dy: 0 }),
            ("west" | "w", []) => Ok(Self::MovePlayer { dx: -1, dy: 0 }),
            ("explore", []) => Ok(Self::Explore),
            ("gather", [resource]) => Ok(Self::Gather {
                resource: resource
                    .parse()
                    .map_err(|()| IntentError::unknown("resource", resource))?,
            }),
            ("build", [structure, x, y]) => Ok(Self::Build {
                structure: structure.to_ascii_lowercase(),
                x: parse_arg(x, "x")?,
                y: parse_arg(y, "y")?,
            }),
            ("upgrade", [x, y]) => Ok(Self::Upgrade {
                x: parse_arg(x, "x")?,
                y: parse_arg(y, "y")?,
                to: None,
            }),
            ("upgrade", [x, y, to]) => Ok(Self::Upgrade {
                x: parse_arg(x, "x")?,
                y: parse_arg(y, "y")?,
                to: Some(to.to_ascii_lowercase()),
            }),
            ("demolish", [x, y]) => Ok(Self::Demolish {
                x: parse_arg(x, "x")?,
                y: parse_arg(y, "y")?,
            }),
            ("end", []) => Ok(Self::End),
            ("wait", []) => Ok(Self::Wait),
            ("trade", [give, receive, amount]) => Ok(Self::Trade {
                give: give
                    .parse()
                    .map_err(|()| IntentError::unknown("resource", give))?,
                receive: receive
                    .parse()
                    .map_err(|()| IntentError::unknown("resource", receive))?,
                amount: parse_arg(amount, "amount")?,
            }),
            ("craft", [item]) => Ok(Self::Craft {
                item: item.to_ascii_lowercase(),
            }),
            ("equip", [item]) => Ok(Self::Equip {
                item: item.to_ascii_lowercase(),
            }),
            ("diplomacy", [faction, action]) => Ok(Self::Diplomacy {
                faction: faction.to_ascii_lowercase(),
                action: action
                    .to_ascii_lowercase()
                    .parse()
                    .map_err(|()| IntentError::unknown("diplomacy action", action))?,
            }),
            ("expedition", [id]) => Ok(Self::StartExpedition {
                id: id.to_ascii_lowercase(),
            }),
            ("unlock", [id]) => Ok(Self::UnlockSkill {
                id: id.to_ascii_lowercase(),
            }),
            ("claim", [id]) => Ok(Self::ClaimQuest {
                id: id.to_ascii_lowercase(),
            }),
            ("talk", []) => Ok(Self::Talk),
            ("lesson", [lesson]) => Ok(Self::SetLesson {
                lesson: lesson.to_ascii_lowercase(),
            }),
            ("cast", [spell]) => Ok(Self::CastSpell {
                spell: spell.to_ascii_lowercase(),
            }),
            ("help", []) => Ok(Self::Help),
            ("status", []) => Ok(Self::Status),
            _ => Err(IntentError::UnknownCommand(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

fn parse_arg<T: FromStr>(raw: &str, name: &str) -> Result<T, IntentError> {
    raw.parse()
        .map_err(|_| IntentError::InvalidPayload(format!("{name} must be a number, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_records_parse() {
        let build = Intent::from_value(&json!({"kind": "build", "type": "sentry", "x": 3, "y": 4}));
        assert_eq!(
            build,
            Ok(Intent::Build {
                structure: "sentry".into(),
                x: 3,
                y: 4
            })
        );
        assert_eq!(Intent::from_value(&json!({"kind": "end"})), Ok(Intent::End));
        let defend = Intent::from_value(&json!({"kind": "defend_input", "text": "flask"})).unwrap();
        assert_eq!(
            defend,
            Intent::DefendInput {
                text: "flask".into(),
                elapsed_ms: None
            }
        );
    }

    #[test]
    fn unknown_and_malformed_are_distinguished() {
        assert_eq!(
            Intent::from_value(&json!({"kind": "fly"})),
            Err(IntentError::UnknownIntent("fly".into()))
        );
        assert!(matches!(
            Intent::from_value(&json!({"kind": "move_player", "dx": "left"})),
            Err(IntentError::InvalidPayload(_))
        ));
        assert!(matches!(
            Intent::from_value(&json!(42)),
            Err(IntentError::InvalidPayload(_))
        ));
    }

    #[test]
    fn wire_round_trip_keeps_kind() {
        let intent = Intent::Trade {
            give: ResourceKind::Gold,
            receive: ResourceKind::Wood,
            amount: 4,
        };
        let value = intent.to_value();
        assert_eq!(value["kind"], "trade");
        assert_eq!(Intent::from_value(&value), Ok(intent));
    }

    #[test]
    fn day_commands_parse() {
        assert_eq!(
            Intent::parse_command("build sentry 3 4", Phase::Day, false),
            Ok(Intent::Build {
                structure: "sentry".into(),
                x: 3,
                y: 4
            })
        );
        assert_eq!(
            Intent::parse_command("move 1 0", Phase::Day, false),
            Ok(Intent::MovePlayer { dx: 1, dy: 0 })
        );
        assert_eq!(Intent::parse_command(" END ", Phase::Day, false), Ok(Intent::End));
        assert!(matches!(
            Intent::parse_command("gather mana", Phase::Day, false),
            Err(IntentError::UnknownId { .. })
        ));
        assert!(matches!(
            Intent::parse_command("dance", Phase::Day, false),
            Err(IntentError::UnknownCommand(_))
        ));
    }

    #[test]
    fn night_text_becomes_defense() {
        assert_eq!(
            Intent::parse_command("flask", Phase::Night, false),
            Ok(Intent::DefendInput {
                text: "flask".into(),
                elapsed_ms: None
            })
        );
        assert_eq!(Intent::parse_command("wait", Phase::Night, false), Ok(Intent::Wait));
        assert_eq!(
            Intent::parse_command("cast fireball", Phase::Day, true),
            Ok(Intent::CastSpell {
                spell: "fireball".into()
            })
        );
    }
}
