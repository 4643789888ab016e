#![no_main]

use fuzz_lib::IndexOperation;
use indexmap::IndexMap;
use libfuzzer_sys::fuzz_target;
use recency::{
    HashIndex,
    MAX_LOAD_FACTOR,
};

fuzz_target!(|data: (u8, Vec<IndexOperation>)| {
    let (buckets, operations) = data;

    let mut index = HashIndex::<u16, u16>::with_buckets(usize::from(buckets % 8));
    let mut model: IndexMap<u16, u16> = IndexMap::new();

    for op in operations {
        match op {
            IndexOperation::Insert(key, value) => {
                let (stored, inserted) = index.insert(key, value);
                assert_eq!(*stored, value);
                assert_eq!(inserted, model.insert(key, value).is_none());
            }
            IndexOperation::Take(key) => {
                assert_eq!(index.take(&key), model.swap_remove_entry(&key));
            }
            IndexOperation::Find(key) => {
                assert_eq!(index.find(&key), model.get_key_value(&key));
            }
            IndexOperation::Expand => {
                let before = index.bucket_count();
                index.expand();
                assert!(index.bucket_count() > before);
            }
            IndexOperation::Clear => {
                index.clear();
                model.clear();
            }
        }

        index.debug_validate();
        assert_eq!(index.len(), model.len());
        assert!(index.len() <= MAX_LOAD_FACTOR * index.bucket_count());
    }

    for (key, value) in &model {
        assert_eq!(index.get(key), Some(value));
    }
});
