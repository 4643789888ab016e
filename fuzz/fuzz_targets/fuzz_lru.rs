#![no_main]

use fuzz_lib::CacheOperation;
use indexmap::IndexMap;
use libfuzzer_sys::fuzz_target;
use recency::LruCache;

fuzz_target!(|data: (u8, Vec<CacheOperation>)| {
    let (capacity_raw, operations) = data;

    let capacity = usize::from(capacity_raw % 16).max(1);
    let Ok(mut cache) = LruCache::<u8, u8>::try_new(capacity) else {
        unreachable!("capacity is at least one");
    };
    let mut model: IndexMap<u8, u8> = IndexMap::new();

    for op in operations {
        match op {
            CacheOperation::Put(key, value) => {
                let evicted = if model.shift_remove(&key).is_none() && model.len() >= capacity {
                    model.shift_remove_index(0)
                } else {
                    None
                };
                model.insert(key, value);
                assert_eq!(cache.put(key, value), evicted);
            }
            CacheOperation::Get(key) => {
                let expected = model.shift_remove(&key);
                if let Some(value) = expected {
                    model.insert(key, value);
                }
                assert_eq!(cache.get(&key).copied(), expected);
            }
            CacheOperation::GetMut(key, value) => {
                let expected = model.shift_remove(&key);
                if expected.is_some() {
                    model.insert(key, value);
                }
                match cache.get_mut(&key) {
                    Some(slot) => {
                        assert_eq!(Some(*slot), expected);
                        *slot = value;
                    }
                    None => assert_eq!(expected, None),
                }
            }
            CacheOperation::Peek(key) => {
                assert_eq!(cache.peek(&key), model.get(&key));
            }
            CacheOperation::Remove(key) => {
                assert_eq!(cache.remove(&key), model.shift_remove(&key));
            }
            CacheOperation::PopOldest => {
                assert_eq!(cache.pop_oldest(), model.shift_remove_index(0));
            }
            CacheOperation::Clear => {
                cache.clear();
                model.clear();
            }
            CacheOperation::Print => {
                let expected: String = model.iter().map(|(k, v)| format!("{k} {v}\n")).collect();
                assert_eq!(cache.to_string(), expected);
            }
        }

        cache.debug_validate();
        assert!(cache.len() <= cache.capacity());
        assert_eq!(cache.len(), model.len());
        assert_eq!(cache.oldest(), model.first());
        assert_eq!(cache.newest(), model.last());
    }

    assert!(cache.iter().eq(model.iter()));
});
