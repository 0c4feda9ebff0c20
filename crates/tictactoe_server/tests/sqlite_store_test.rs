//! Tests for the SQLite game store.

use diesel::prelude::*;
use diesel::sql_query;
use tempfile::NamedTempFile;
use tictactoe_engine::{Board, Difficulty, Mark};
use tictactoe_server::{
    CorruptBoardPolicy, GameMode, GameSession, GameStatus, GameStore, PlayerId, SqliteStore,
    StoreErrorKind,
};

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready store.
fn setup_test_db(policy: CorruptBoardPolicy) -> (NamedTempFile, String, SqliteStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = SqliteStore::open(db_path.clone(), policy).expect("Failed to open store");
    (db_file, db_path, store)
}

fn assert_same_session(actual: &GameSession, expected: &GameSession) {
    assert_eq!(actual.id(), expected.id());
    assert_eq!(actual.board(), expected.board());
    assert_eq!(actual.turn(), expected.turn());
    assert_eq!(actual.status(), expected.status());
    assert_eq!(actual.player_x(), expected.player_x());
    assert_eq!(actual.opponent(), expected.opponent());
    assert_eq!(actual.spectators(), expected.spectators());
}

fn overwrite_board(db_path: &str, session: &GameSession, raw: &str) {
    let mut conn = SqliteConnection::establish(db_path).expect("Failed to connect");
    sql_query(format!(
        "UPDATE games SET board = '{}' WHERE id = '{}'",
        raw,
        session.id()
    ))
    .execute(&mut conn)
    .expect("Update failed");
}

#[test]
fn test_load_missing_game() {
    let (_db, _path, store) = setup_test_db(CorruptBoardPolicy::Reject);
    let session = GameSession::create(PlayerId::new("alice"), GameMode::TwoPlayer);
    assert!(store.load(session.id()).expect("Load failed").is_none());
}

#[test]
fn test_round_trip_two_player_game() {
    let (_db, _path, store) = setup_test_db(CorruptBoardPolicy::Reject);
    let mut session = GameSession::create(PlayerId::new("alice"), GameMode::TwoPlayer);
    store.save(&session).expect("Save failed");

    session.join(PlayerId::new("bob")).expect("Join failed");
    session
        .make_move(&PlayerId::new("alice"), 1, 1)
        .expect("Move failed");
    session.add_spectator(PlayerId::new("eve"));
    session.add_spectator(PlayerId::new("mallory"));
    store.save(&session).expect("Upsert failed");

    let loaded = store
        .load(session.id())
        .expect("Load failed")
        .expect("Game missing");
    assert_same_session(&loaded, &session);
    assert_eq!(loaded.spectators().len(), 2);
}

#[test]
fn test_round_trip_ai_game() {
    let (_db, _path, store) = setup_test_db(CorruptBoardPolicy::Reject);
    let session = GameSession::create(PlayerId::new("alice"), GameMode::VsAi(Difficulty::Hard));
    store.save(&session).expect("Save failed");

    let loaded = store
        .load(session.id())
        .expect("Load failed")
        .expect("Game missing");
    assert_same_session(&loaded, &session);
    assert_eq!(loaded.ai_difficulty(), Some(Difficulty::Hard));
}

#[test]
fn test_list_waiting_newest_first() {
    let (_db, _path, store) = setup_test_db(CorruptBoardPolicy::Reject);
    let first = GameSession::create(PlayerId::new("alice"), GameMode::TwoPlayer);
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = GameSession::create(PlayerId::new("bob"), GameMode::TwoPlayer);
    let running = GameSession::create(PlayerId::new("carol"), GameMode::VsAi(Difficulty::Easy));
    for s in [&first, &second, &running] {
        store.save(s).expect("Save failed");
    }

    let waiting = store.list_waiting().expect("List failed");
    let ids: Vec<_> = waiting.iter().map(|s| *s.id()).collect();
    assert_eq!(ids, vec![*second.id(), *first.id()]);
}

#[test]
fn test_list_active_for_player() {
    let (_db, _path, store) = setup_test_db(CorruptBoardPolicy::Reject);
    let alice = PlayerId::new("alice");
    let bob = PlayerId::new("bob");

    let mut as_o = GameSession::create(PlayerId::new("carol"), GameMode::TwoPlayer);
    as_o.join(bob.clone()).expect("Join failed");
    let as_x = GameSession::create(bob.clone(), GameMode::VsAi(Difficulty::Medium));
    let unrelated = GameSession::create(alice.clone(), GameMode::TwoPlayer);

    let mut finished = GameSession::create(bob.clone(), GameMode::TwoPlayer);
    finished.join(alice.clone()).expect("Join failed");
    for (player, row, col) in [
        (&bob, 0, 0),
        (&alice, 1, 0),
        (&bob, 0, 1),
        (&alice, 1, 1),
        (&bob, 0, 2),
    ] {
        finished.make_move(player, row, col).expect("Move failed");
    }
    assert_eq!(finished.status(), GameStatus::Finished);

    for s in [&as_o, &as_x, &unrelated, &finished] {
        store.save(s).expect("Save failed");
    }

    let active = store.list_active_for(&bob).expect("List failed");
    let mut ids: Vec<_> = active.iter().map(|s| *s.id()).collect();
    ids.sort();
    let mut expected = vec![*as_o.id(), *as_x.id()];
    expected.sort();
    assert_eq!(ids, expected);
}

#[test]
fn test_corrupt_board_rejected() {
    let (_db, path, store) = setup_test_db(CorruptBoardPolicy::Reject);
    let session = GameSession::create(PlayerId::new("alice"), GameMode::TwoPlayer);
    store.save(&session).expect("Save failed");
    overwrite_board(&path, &session, "{not a board");

    let err = store.load(session.id()).expect_err("Corrupt board accepted");
    assert_eq!(err.kind, StoreErrorKind::Corrupt);
    assert!(!err.is_retryable());
}

#[test]
fn test_corrupt_board_reset_restarts_game() {
    let (_db, path, store) = setup_test_db(CorruptBoardPolicy::ResetToEmpty);
    let mut session = GameSession::create(PlayerId::new("alice"), GameMode::TwoPlayer);
    session.join(PlayerId::new("bob")).expect("Join failed");
    session
        .make_move(&PlayerId::new("alice"), 0, 0)
        .expect("Move failed");
    store.save(&session).expect("Save failed");
    overwrite_board(&path, &session, r#"[["X","X","X"]]"#);

    let loaded = store
        .load(session.id())
        .expect("Load failed")
        .expect("Game missing");
    assert_eq!(*loaded.board(), Board::empty());
    assert_eq!(loaded.turn(), Mark::X);
    assert_eq!(loaded.status(), GameStatus::InProgress);
}

#[test]
fn test_reopen_keeps_data() {
    let (_db, path, store) = setup_test_db(CorruptBoardPolicy::Reject);
    let session = GameSession::create(PlayerId::new("alice"), GameMode::TwoPlayer);
    store.save(&session).expect("Save failed");
    drop(store);

    let reopened = SqliteStore::open(path, CorruptBoardPolicy::Reject).expect("Reopen failed");
    assert!(reopened.load(session.id()).expect("Load failed").is_some());
}
