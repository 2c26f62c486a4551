//! Leaderboard projection.
//!
//! Pure read over the player registry: ascending by rank, id as the
//! tie-break. Ranks are effectively a unique sequence, but a duplicate
//! (mid-edit by an admin) must still produce a stable order.

use crate::error::Result;
use crate::model::Player;
use crate::store::LadderStore;

/// Read-only view over the ladder store.
#[derive(Clone)]
pub struct Standings {
    store: LadderStore,
}

impl Standings {
    pub fn new(store: LadderStore) -> Self {
        Self { store }
    }

    /// Players ordered best rank first.
    pub fn list_players(&self) -> Result<Vec<Player>> {
        self.store.list_players_by_rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LadderEngine;

    #[test]
    fn test_ordered_by_rank() {
        let store = LadderStore::in_memory().unwrap();
        let engine = LadderEngine::new(store.clone());
        let ann = engine.add_player("Ann", None).unwrap();
        let ben = engine.add_player("Ben", None).unwrap();
        let cat = engine.add_player("Cat", None).unwrap();

        // Move Cat to the top
        engine.set_rank(&cat.id, 1).unwrap();
        engine.set_rank(&ann.id, 2).unwrap();
        engine.set_rank(&ben.id, 3).unwrap();

        let standings = Standings::new(store);
        let names: Vec<_> = standings
            .list_players()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Cat", "Ann", "Ben"]);
    }

    #[test]
    fn test_duplicate_ranks_stable_by_id() {
        let store = LadderStore::in_memory().unwrap();
        let engine = LadderEngine::new(store.clone());
        let a = engine.add_player("Ann", None).unwrap();
        let b = engine.add_player("Ben", None).unwrap();

        // Force a tie; projector must not choke and must order by id
        engine.set_rank(&a.id, 1).unwrap();
        engine.set_rank(&b.id, 1).unwrap();

        let players = Standings::new(store).list_players().unwrap();
        assert_eq!(players.len(), 2);
        let mut ids = vec![a.id, b.id];
        ids.sort();
        assert_eq!(players[0].id, ids[0]);
        assert_eq!(players[1].id, ids[1]);
    }

    #[test]
    fn test_empty_ladder() {
        let store = LadderStore::in_memory().unwrap();
        assert!(Standings::new(store).list_players().unwrap().is_empty());
    }
}
