use std::collections::{BTreeMap, HashSet};
use std::sync::Once;

use ephid_core::{AllocError, EphemeralIds, IdentifierSpace};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(ephid_logging::initialize_for_tests);
}

/// Space of `starters` two-letter starters, each with `suffixes` suffixes.
fn space(starters: usize, suffixes: usize) -> IdentifierSpace {
    let all_suffixes: Vec<String> = (b'0'..=b'9')
        .flat_map(|d| (b'a'..=b'z').map(move |l| format!("{}{}", d as char, l as char)))
        .take(suffixes)
        .collect();
    let map: BTreeMap<String, Vec<String>> = (0..starters)
        .map(|i| {
            let upper = (b'A' + (i / 26) as u8) as char;
            let lower = (b'a' + (i % 26) as u8) as char;
            let starter = format!("{upper}{lower}");
            (starter, all_suffixes.clone())
        })
        .collect();
    IdentifierSpace::new(2, map).unwrap()
}

fn allocator(starters: usize, suffixes: usize, seed: u64) -> EphemeralIds<ChaCha8Rng> {
    EphemeralIds::with_rng(space(starters, suffixes), ChaCha8Rng::seed_from_u64(seed)).unwrap()
}

#[test]
fn empty_space_fails_at_construction() {
    init_logging();
    let err = EphemeralIds::new(IdentifierSpace::empty(2)).unwrap_err();
    assert_eq!(err, AllocError::EmptySpace);
}

#[test]
fn allocations_are_unique_until_exhaustion() {
    init_logging();
    let mut ids = allocator(40, 5, 7);

    let mut seen = HashSet::new();
    let mut starters = HashSet::new();
    for _ in 0..40 {
        let id = ids.allocate().unwrap();
        assert_eq!(id.len(), 4);
        assert!(ids.space().contains(&id));
        assert!(starters.insert(id[..2].to_string()), "starter reused: {id}");
        assert!(seen.insert(id));
    }

    assert_eq!(ids.available(), 0);
    assert_eq!(ids.allocate(), Err(AllocError::Exhausted { active: 40 }));
}

#[test]
fn failed_allocation_leaves_state_unchanged() {
    init_logging();
    let mut ids = allocator(2, 3, 1);
    let first = ids.allocate().unwrap();
    let second = ids.allocate().unwrap();

    assert!(ids.allocate().is_err());
    assert_eq!(ids.available(), 0);
    assert_eq!(ids.active_count(), 2);
    assert!(ids.is_active(&first));
    assert!(ids.is_active(&second));

    ids.release(&first);
    let third = ids.allocate().unwrap();
    assert_eq!(&third[..2], &first[..2]);
}

#[test]
fn release_is_tolerant_of_unknown_and_repeated_ids() {
    init_logging();
    let mut ids = allocator(3, 2, 3);
    let id = ids.allocate().unwrap();

    ids.release("Zz9z");
    ids.release("");
    assert_eq!(ids.available(), 2);

    ids.release(&id);
    ids.release(&id);
    assert_eq!(ids.available(), 3);
    assert_eq!(ids.active_count(), 0);
}

#[test]
fn released_starters_are_reused() {
    init_logging();
    let mut ids = allocator(1, 100, 11);
    for _ in 0..50 {
        let id = ids.allocate().unwrap();
        assert!(id.starts_with("Aa"));
        assert!(ids.allocate().is_err());
        ids.release(&id);
    }
}

#[test]
fn same_seed_gives_same_sequence() {
    init_logging();
    let mut a = allocator(30, 10, 99);
    let mut b = allocator(30, 10, 99);
    let left: Vec<String> = (0..30).map(|_| a.allocate().unwrap()).collect();
    let right: Vec<String> = (0..30).map(|_| b.allocate().unwrap()).collect();
    assert_eq!(left, right);
}

#[test]
fn reset_restores_full_pool() {
    init_logging();
    let mut ids = allocator(5, 4, 5);
    ids.remap(&["a", "b"]).unwrap();
    ids.allocate().unwrap();
    assert_eq!(ids.available(), 2);

    ids.reset();
    assert_eq!(ids.available(), 5);
    assert_eq!(ids.active_count(), 0);
    assert!(ids.remapped().is_empty());
    for _ in 0..5 {
        ids.allocate().unwrap();
    }
}

#[test]
fn allocator_supports_entropy_seeding() {
    init_logging();
    let mut ids = EphemeralIds::new(space(4, 2)).unwrap();
    let id = ids.allocate().unwrap();
    assert_eq!(ids.starter_length(), 2);
    assert_eq!(ids.space().starter_of(&id), Some(&id[..2]));
    assert_eq!(ids.active_ids().collect::<Vec<_>>(), vec![id.as_str()]);
}
