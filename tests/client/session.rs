//! Sign-in, scoring and leaderboard reads across several players.

use std::sync::Arc;

use highscore::{ClientError, Credential, DocumentStore, PlayerProfile, ScoreRecord};
use serde_json::{json, Value};

use crate::support::{usernames, Backend};

#[test]
fn players_see_a_ranked_leaderboard() {
    let backend = Backend::start();
    let mut alice = backend.player("alice");
    let mut bob = backend.player("bob");
    let mut carol = backend.player("carol");

    alice.set_score(10.0).unwrap();
    bob.set_score(30.0).unwrap();
    carol.set_score(20.0).unwrap();
    backend.settle();

    let top = alice.leaderboard(10, false).unwrap();
    assert_eq!(usernames(&top), vec!["bob", "carol", "alice"]);
    assert_eq!(alice.high_score().unwrap().data.rank, 3);

    alice.add_score(25.0).unwrap();
    backend.settle();
    let top = bob.leaderboard(2, false).unwrap();
    assert_eq!(usernames(&top), vec!["alice", "bob"]);
}

#[test]
fn centered_leaderboard_surrounds_the_player() {
    let backend = Backend::start();
    let mut players: Vec<_> = (1..=12)
        .map(|i| backend.player(&format!("p{:02}", i)))
        .collect();
    for (i, player) in players.iter_mut().enumerate() {
        player.set_score(100.0 - i as f64).unwrap();
    }
    backend.settle();

    // p10 holds rank 10
    let window = players[9].leaderboard(5, true).unwrap();
    let ranks: Vec<u64> = window.iter().map(|r| r.data.rank).collect();
    assert_eq!(ranks, vec![8, 9, 10, 11, 12]);

    let window = players[0].leaderboard(5, true).unwrap();
    assert_eq!(usernames(&window), vec!["p01", "p02", "p03", "p04", "p05"]);
}

#[test]
fn achievements_add_to_the_score() {
    let backend = Backend::start();
    let mut dana = backend.player("dana");
    dana.set_score(5.0).unwrap();

    dana.add_achievement("speedrun", "Finish under a minute", 40.0, json!({ "secs": 58 }))
        .unwrap();
    dana.add_achievement("pacifist", "No fights", 15.0, Value::Null)
        .unwrap();

    assert_eq!(dana.high_score().unwrap().data.score, 60.0);
    let names: Vec<String> = dana
        .achievements()
        .unwrap()
        .into_iter()
        .map(|a| a.data.name)
        .collect();
    assert_eq!(names, vec!["speedrun", "pacifist"]);

    let erin = backend.player("erin");
    assert!(erin.achievements().unwrap().is_empty());
}

#[test]
fn score_saves_accumulate_play_time_and_run_hooks() {
    let backend = Backend::start();
    let mut client = backend
        .client()
        .with_score_details_hook(Arc::new(|details: &mut Value, record: &ScoreRecord| {
            details["previous"] = json!(record.last_score);
        }))
        .with_player_details_hook(Arc::new(|details: &mut Value, _: &PlayerProfile| {
            let saves = details["saves"].as_u64().unwrap_or(0);
            details["saves"] = json!(saves + 1);
        }));
    client.sign_in("fay", "fay").unwrap();

    client.set_score(3.0).unwrap();
    let saved = client.set_score(8.0).unwrap();
    assert_eq!(saved.data.score_details["previous"], json!(3.0));

    let profile = backend
        .store
        .get::<PlayerProfile>(&Credential::user("fay"), "fay")
        .unwrap()
        .unwrap();
    assert_eq!(profile.data.details["saves"], json!(2));
}

#[test]
fn username_cannot_be_claimed_twice() {
    let backend = Backend::start();
    backend.player("gus");

    let mut imposter = backend.client();
    let err = imposter.sign_in("someone-else", "gus").unwrap_err();
    assert_eq!(
        err,
        ClientError::UsernameTaken {
            username: "gus".into()
        }
    );
    assert_eq!(imposter.user_id(), None);
}

#[test]
fn signed_out_client_is_refused() {
    let backend = Backend::start();
    let mut client = backend.player("hal");
    client.sign_out();

    assert_eq!(client.add_score(1.0).unwrap_err(), ClientError::NotSignedIn);
    assert_eq!(client.achievements().unwrap_err(), ClientError::NotSignedIn);
    assert_eq!(client.reset_play_time().unwrap_err(), ClientError::NotSignedIn);
}
