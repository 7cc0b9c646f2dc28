mod support;

use keyward_game::{Content, GameSession, Intent, replay, save_state};
use std::hash::Hasher;
use twox_hash::XxHash64;

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

fn scripted_run(seed: &str, steps: usize) -> GameSession {
    let mut session = GameSession::new(seed, Content::builtin().clone());
    support::play_until(&mut session, steps, |_| false);
    session
}

#[test]
fn same_seed_same_snapshot() {
    let first = scripted_run("determinism-a", 400);
    let second = scripted_run("determinism-a", 400);
    let first_hash = snapshot_hash(save_state(first.state()).unwrap().as_bytes());
    let second_hash = snapshot_hash(save_state(second.state()).unwrap().as_bytes());
    assert_eq!(first_hash, second_hash);
    assert_eq!(first.history(), second.history());
}

#[test]
fn different_seeds_diverge() {
    let first = scripted_run("determinism-a", 50);
    let second = scripted_run("determinism-b", 50);
    assert_ne!(
        snapshot_hash(save_state(first.state()).unwrap().as_bytes()),
        snapshot_hash(save_state(second.state()).unwrap().as_bytes())
    );
}

#[test]
fn history_replays_to_the_same_state() {
    let content = Content::builtin();
    let session = scripted_run("replayable", 300);
    assert!(!session.history().is_empty());
    let rebuilt = replay("replayable", session.history(), content);
    assert_eq!(&rebuilt, session.state());
}

#[test]
fn informational_intents_do_not_disturb_the_stream() {
    let content = Content::builtin().clone();
    let mut quiet = GameSession::new("chatty", content.clone());
    let mut chatty = GameSession::new("chatty", content);
    for _ in 0..60 {
        chatty.apply(Intent::Status);
        chatty.apply(Intent::Help);
        support::step(&mut chatty);
        support::step(&mut quiet);
    }
    assert_eq!(quiet.state(), chatty.state());
}
