use keyward_game::{Content, GameSession, Phase, load_state, replay, save_state};
use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;
use thiserror::Error;
use twox_hash::XxHash64;

use super::autoplay::{FuzzPolicy, SteadyPolicy, drive, drive_step};

/// Days the siege scenario must hold.
pub const SIEGE_DAYS: i32 = 5;
const FUZZ_STEPS: usize = 400;
const STEP_LIMIT: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Smoke,
    Determinism,
    Persistence,
    Siege,
}

impl Scenario {
    pub const ALL: [Self; 4] = [
        Self::Smoke,
        Self::Determinism,
        Self::Persistence,
        Self::Siege,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Determinism => "determinism",
            Self::Persistence => "persistence",
            Self::Siege => "siege",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Smoke => "Build a tower and survive the first night",
            Self::Determinism => "Replay a fuzzed intent script twice and compare save hashes",
            Self::Persistence => "Save mid-night, reload and continue in lockstep",
            Self::Siege => "Auto-player holds the keep for several days",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScenarioError::Unknown(s.to_string()))
    }
}

/// Every way a scenario run can fail.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unknown scenario '{0}'")]
    Unknown(String),
    #[error("the keep fell on day {day} after {steps} steps")]
    Fell { day: i32, steps: usize },
    #[error("no progress: still day {day} in the {phase} after {steps} steps")]
    Stalled { day: i32, phase: Phase, steps: usize },
    #[error("runs diverged: {first:016x} != {second:016x}")]
    Diverged { first: u64, second: u64 },
    #[error("{0}")]
    Expectation(String),
    #[error(transparent)]
    Persistence(#[from] keyward_game::PersistenceError),
}

/// What a passing run looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub seed: String,
    pub day: i32,
    pub phase: Phase,
    pub steps: usize,
    pub kills: i32,
    pub fingerprint: u64,
}

fn fingerprint(session: &GameSession) -> Result<u64, ScenarioError> {
    let raw = save_state(session.state())?;
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(raw.as_bytes());
    Ok(hasher.finish())
}

fn summarize(session: &GameSession, seed: &str, steps: usize) -> Result<RunSummary, ScenarioError> {
    let state = session.state();
    Ok(RunSummary {
        seed: seed.to_string(),
        day: state.day,
        phase: state.phase,
        steps,
        kills: state.counters.kills,
        fingerprint: fingerprint(session)?,
    })
}

/// Play `scenario` once from `seed`.
///
/// # Errors
///
/// Returns the [`ScenarioError`] describing the first broken expectation.
pub fn run_scenario(
    scenario: Scenario,
    seed: &str,
    content: &Content,
) -> Result<RunSummary, ScenarioError> {
    match scenario {
        Scenario::Smoke => smoke(seed, content),
        Scenario::Determinism => determinism(seed, content),
        Scenario::Persistence => persistence(seed, content),
        Scenario::Siege => siege(seed, content),
    }
}

fn hold_until_day(seed: &str, content: &Content, day: i32) -> Result<GameSession, ScenarioError> {
    let mut session = GameSession::new(seed, content.clone());
    let steps = drive(&mut session, &mut SteadyPolicy, STEP_LIMIT, |state| {
        state.day >= day
    });
    let state = session.state();
    if state.phase == Phase::GameOver {
        return Err(ScenarioError::Fell {
            day: state.day,
            steps,
        });
    }
    if state.day < day && !state.is_over() {
        return Err(ScenarioError::Stalled {
            day: state.day,
            phase: state.phase,
            steps,
        });
    }
    Ok(session)
}

fn smoke(seed: &str, content: &Content) -> Result<RunSummary, ScenarioError> {
    let session = hold_until_day(seed, content, 2)?;
    let counters = session.state().counters;
    if counters.structures_built == 0 {
        return Err(ScenarioError::Expectation(
            "no structure was built on day one".into(),
        ));
    }
    let steps = session.history().len();
    summarize(&session, seed, steps)
}

fn siege(seed: &str, content: &Content) -> Result<RunSummary, ScenarioError> {
    let session = hold_until_day(seed, content, SIEGE_DAYS + 1)?;
    let steps = session.history().len();
    summarize(&session, seed, steps)
}

fn fuzzed_run(seed: &str, content: &Content) -> GameSession {
    let mut session = GameSession::new(seed, content.clone());
    let mut policy = FuzzPolicy::from_label(seed);
    for _ in 0..FUZZ_STEPS {
        if session.state().is_over() {
            break;
        }
        drive_step(&mut session, &mut policy);
    }
    session
}

fn determinism(seed: &str, content: &Content) -> Result<RunSummary, ScenarioError> {
    let first = fuzzed_run(seed, content);
    let second = fuzzed_run(seed, content);
    let (a, b) = (fingerprint(&first)?, fingerprint(&second)?);
    if a != b {
        return Err(ScenarioError::Diverged {
            first: a,
            second: b,
        });
    }
    let rebuilt = replay(seed, first.history(), content);
    let rebuilt = GameSession::from_state(rebuilt, content.clone());
    let c = fingerprint(&rebuilt)?;
    if a != c {
        return Err(ScenarioError::Diverged {
            first: a,
            second: c,
        });
    }
    summarize(&first, seed, first.history().len())
}

fn persistence(seed: &str, content: &Content) -> Result<RunSummary, ScenarioError> {
    let mut live = GameSession::new(seed, content.clone());
    drive(&mut live, &mut SteadyPolicy, STEP_LIMIT, |state| {
        state.is_night() && !state.enemies.is_empty()
    });
    let restored_state = load_state(&live.save()?)?;
    if &restored_state != live.state() {
        return Err(ScenarioError::Expectation(
            "reloaded state differs from the saved one".into(),
        ));
    }
    let mut restored = GameSession::from_state(restored_state, content.clone());
    let mut steps = 0;
    while steps < 200 && !live.state().is_over() {
        let a = drive_step(&mut live, &mut SteadyPolicy);
        let b = drive_step(&mut restored, &mut SteadyPolicy);
        if a != b {
            return Err(ScenarioError::Expectation(format!(
                "step {steps} produced different events after reload"
            )));
        }
        steps += 1;
    }
    let (a, b) = (fingerprint(&live)?, fingerprint(&restored)?);
    if a != b {
        return Err(ScenarioError::Diverged {
            first: a,
            second: b,
        });
    }
    summarize(&live, seed, steps)
}

/// Replay a newline-separated command script and collect the transcript.
///
/// Blank lines and lines starting with `#` are skipped.
#[must_use]
pub fn run_script(seed: &str, script: &str, content: &Content) -> Vec<String> {
    let mut session = GameSession::new(seed, content.clone());
    let mut transcript = Vec::new();
    for line in script.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        transcript.push(format!("> {line}"));
        let outcome = session.apply_command(line);
        transcript.extend(outcome.events.into_iter().map(|event| format!("  {event}")));
    }
    let state = session.state();
    transcript.push(format!(
        "= day {} ({}) hp {}/{} gold {}",
        state.day, state.phase, state.hp, state.hp_max, state.gold
    ));
    transcript
}
