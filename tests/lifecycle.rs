//! End-to-end lifecycle tests: the full challenge flow and the
//! concurrent-create property on the challenger's slot.

use std::sync::{Arc, Barrier};
use std::thread;

use club_ladder::{ChallengeStatus, LadderEngine, LadderError, LadderStore};

fn engine() -> LadderEngine {
    LadderEngine::new(LadderStore::in_memory().unwrap())
}

#[test]
fn full_challenge_lifecycle() {
    let engine = engine();
    let ann = engine.add_player("Ann", Some("ann@club.test")).unwrap();
    let ben = engine.add_player("Ben", None).unwrap();

    let challenge = engine.create_challenge(&ann.id, &ben.id).unwrap();
    assert_eq!(challenge.status, ChallengeStatus::Pending);

    // Schedule, accept, play, record, complete
    let date = "2026-09-01T19:00:00Z".parse().unwrap();
    engine.update_match_date(&challenge.id, Some(date)).unwrap();
    engine
        .update_status(&challenge.id, ChallengeStatus::Accepted)
        .unwrap();
    engine.submit_score(&challenge.id, 7, 4).unwrap();
    engine
        .update_status(&challenge.id, ChallengeStatus::Completed)
        .unwrap();

    let done = engine.get_challenge(&challenge.id).unwrap();
    assert_eq!(done.status, ChallengeStatus::Completed);
    assert_eq!(done.challenger_score, Some(7));
    assert_eq!(done.challenged_score, Some(4));
    assert_eq!(done.match_date, Some(date));

    // Ann's slot is free again; she can start a new challenge
    let ann = engine.get_player(&ann.id).unwrap();
    assert_eq!(ann.active_challenge_id, None);
    engine.create_challenge(&ann.id, &ben.id).unwrap();
}

#[test]
fn tightened_policy_rejects_existing_gap() {
    let engine = engine();
    let ids: Vec<String> = (1..=5)
        .map(|i| engine.add_player(&format!("P{}", i), None).unwrap().id)
        .collect();

    // Default window of 5 allows rank 1 vs rank 5
    assert_eq!(engine.max_rank_difference().unwrap(), 5);
    let c = engine.create_challenge(&ids[0], &ids[4]).unwrap();
    engine
        .update_status(&c.id, ChallengeStatus::Accepted)
        .unwrap();
    engine
        .update_status(&c.id, ChallengeStatus::Completed)
        .unwrap();

    // After tightening to 3 the same pairing is rejected
    engine.set_max_rank_difference(3).unwrap();
    let err = engine.create_challenge(&ids[0], &ids[4]).unwrap_err();
    assert!(matches!(err, LadderError::PolicyViolation { .. }));
}

#[test]
fn concurrent_creates_take_single_slot() {
    let engine = engine();
    let challenger = engine.add_player("Challenger", None).unwrap();
    let targets: Vec<String> = (0..5)
        .map(|i| engine.add_player(&format!("Target {}", i), None).unwrap().id)
        .collect();

    let barrier = Arc::new(Barrier::new(targets.len()));
    let handles: Vec<_> = targets
        .iter()
        .map(|target| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            let challenger_id = challenger.id.clone();
            let target_id = target.clone();
            thread::spawn(move || {
                barrier.wait();
                engine.create_challenge(&challenger_id, &target_id)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(LadderError::Conflict(_))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, targets.len() - 1);

    // The one winner is recorded as the challenger's active challenge
    let challenger = engine.get_player(&challenger.id).unwrap();
    let winner = results.iter().find_map(|r| r.as_ref().ok()).unwrap();
    assert_eq!(challenger.active_challenge_id.as_deref(), Some(winner.id.as_str()));
}
