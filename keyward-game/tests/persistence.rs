mod support;

use keyward_game::{Content, GameSession, PersistenceError, load_state, save_state};

#[test]
fn saved_night_resumes_identically() {
    let content = Content::builtin().clone();
    let mut live = GameSession::new("mid-night", content.clone());
    support::play_until(&mut live, 5_000, |state| {
        state.is_night() && !state.enemies.is_empty()
    });
    assert!(live.state().is_night());

    let raw = live.save().unwrap();
    let mut restored = GameSession::from_state(load_state(&raw).unwrap(), content);
    assert_eq!(restored.state(), live.state());

    for _ in 0..120 {
        let a = support::step(&mut live);
        let b = support::step(&mut restored);
        assert_eq!(a, b);
    }
    assert_eq!(restored.state(), live.state());
}

#[test]
fn saves_are_versioned_documents() {
    let session = GameSession::new("versioned", Content::builtin().clone());
    let raw = save_state(session.state()).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(document["version"], 1);
    assert_eq!(document["state"]["seed"], "versioned");
    assert_eq!(document["state"]["day"], 1);
}

#[test]
fn tampered_documents_are_refused() {
    let session = GameSession::new("tampered", Content::builtin().clone());
    let raw = session.save().unwrap();
    let truncated = &raw[..raw.len() / 2];
    assert!(matches!(
        load_state(truncated),
        Err(PersistenceError::Malformed(_))
    ));
    let bumped = raw.replacen(r#""version":1"#, r#""version":9"#, 1);
    assert!(matches!(
        load_state(&bumped),
        Err(PersistenceError::NewerVersion { found: 9, .. })
    ));
}
