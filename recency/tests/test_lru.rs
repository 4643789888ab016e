use std::num::NonZeroUsize;

use indexmap::IndexMap;
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use recency::{
    LruCache,
    Matrix,
    MatrixCache,
};

fn lru<V>(capacity: usize) -> LruCache<i32, V> {
    LruCache::new(NonZeroUsize::new(capacity).unwrap())
}

#[test]
fn test_lru_new_empty() {
    let cache = lru::<String>(3);
    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
    assert_eq!(cache.capacity(), 3);
    assert_eq!(cache.into_iter().collect::<Vec<_>>(), vec![]);
}

#[test]
fn test_lru_put_overflow() {
    let mut cache = lru(2);
    cache.put(1, "one".to_string());
    cache.put(2, "two".to_string());
    cache.put(3, "three".to_string());
    assert_eq!(cache.len(), 2);
    assert_eq!(
        cache.into_iter().collect::<Vec<_>>(),
        vec![(2, "two".to_string()), (3, "three".to_string())]
    );
}

#[test]
fn test_lru_capacity_two_scenario() {
    let mut cache = lru(2);
    assert_eq!(cache.put(1, "a"), None);
    assert_eq!(cache.put(2, "b"), None);
    assert_eq!(cache.put(3, "c"), Some((1, "a")));

    assert_eq!(cache.get(&2), Some(&"b"));
    assert_eq!(cache.put(4, "d"), Some((3, "c")));

    assert_eq!(cache.newest(), Some((&4, &"d")));
    assert_eq!(cache.into_iter().collect::<Vec<_>>(), vec![(2, "b"), (4, "d")]);
}

#[test]
fn test_lru_put_then_get_round_trips() {
    let mut cache = lru(4);
    cache.put(7, vec![1, 2, 3]);
    assert_eq!(cache.get(&7), Some(&vec![1, 2, 3]));
}

#[test]
fn test_lru_access_pattern() {
    let mut cache = lru(3);
    cache.put(1, "one".to_string());
    cache.put(2, "two".to_string());
    cache.put(3, "three".to_string());

    cache.get(&1);
    cache.get(&2);
    cache.put(4, "four".to_string());

    assert!(!cache.contains_key(&3));
    assert_eq!(
        cache.into_iter().collect::<Vec<_>>(),
        vec![
            (1, "one".to_string()),
            (2, "two".to_string()),
            (4, "four".to_string())
        ]
    );
}

#[test]
fn test_lru_update_existing() {
    let mut cache = lru(2);
    cache.put(1, "one".to_string());
    cache.put(2, "two".to_string());
    assert_eq!(cache.put(1, "ONE".to_string()), None);
    assert_eq!(
        cache.into_iter().collect::<Vec<_>>(),
        vec![(2, "two".to_string()), (1, "ONE".to_string())]
    );
}

#[test]
fn test_lru_repeated_get_is_idempotent() {
    let mut cache = lru(3);
    for i in 0..3 {
        cache.put(i, i * 10);
    }
    cache.get(&0);
    let after_one: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
    cache.get(&0);
    let after_two: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(after_one, after_two);
    assert_eq!(after_two, vec![(1, 10), (2, 20), (0, 0)]);
}

#[test]
fn test_lru_print_does_not_reorder() {
    let mut cache = lru(3);
    cache.put(3, 30);
    cache.put(1, 10);
    cache.put(2, 20);

    let mut out = Vec::new();
    cache.write_to(&mut out).unwrap();
    cache.print();
    assert_eq!(String::from_utf8(out).unwrap(), "3 30\n1 10\n2 20\n");

    assert_eq!(cache.put(4, 40), Some((3, 30)));
}

#[test]
fn test_matrix_cache() {
    let mut cache = MatrixCache::new(NonZeroUsize::new(2).unwrap());
    cache.put(1, Matrix::identity(3));
    cache.put(2, Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap());

    let identity = cache.get(&1).unwrap();
    assert_eq!(identity[(2, 2)], 1);
    assert_eq!(identity[(0, 2)], 0);

    let evicted = cache.put(3, Matrix::new(2, 2)).unwrap();
    assert_eq!(evicted.0, 2);
    assert_eq!(evicted.1.to_string(), "1 2\n3 4");
}

/// Replays random put/get/peek/remove sequences against an `IndexMap` kept in
/// recency order.
#[test]
fn test_lru_matches_model() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for capacity in [1, 2, 3, 8, 33] {
        let mut cache = lru(capacity);
        let mut model: IndexMap<i32, u32> = IndexMap::new();

        for step in 0..2_000u32 {
            let key = rng.random_range(0..(capacity as i32 * 2 + 1));
            match rng.random_range(0..10) {
                0..=4 => {
                    let expected = if model.shift_remove(&key).is_none() && model.len() >= capacity {
                        model.shift_remove_index(0)
                    } else {
                        None
                    };
                    model.insert(key, step);
                    assert_eq!(cache.put(key, step), expected);
                }
                5..=7 => {
                    let expected = model.shift_remove(&key);
                    if let Some(value) = expected {
                        model.insert(key, value);
                    }
                    assert_eq!(cache.get(&key).copied(), expected);
                }
                8 => {
                    assert_eq!(cache.peek(&key), model.get(&key));
                }
                _ => {
                    assert_eq!(cache.remove(&key), model.shift_remove(&key));
                }
            }

            assert!(cache.len() <= capacity);
            assert_eq!(cache.len(), model.len());
            if rng.random_bool(0.05) {
                assert!(cache.iter().eq(model.iter()));
            }
        }

        assert!(cache.iter().eq(model.iter()));
    }
}
