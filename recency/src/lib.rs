#![doc = include_str!("../../README.md")]
#![deny(missing_docs)]

mod error;
mod hash_index;
pub mod linked_hash_map;
pub mod list;
mod lru;
mod matrix;

pub use error::Error;
pub use hash_index::{
    HashIndex,
    INITIAL_BUCKETS,
    MAX_LOAD_FACTOR,
};
pub use linked_hash_map::LinkedHashMap;
pub use list::{
    DoublyLinkedList,
    Handle,
};
pub use lru::LruCache;
pub use matrix::{
    Matrix,
    MatrixCache,
};

/// The default [`BuildHasher`](std::hash::BuildHasher) for every container in
/// this crate.
#[cfg(not(feature = "ahash"))]
pub type RandomState = std::hash::RandomState;
/// The default [`BuildHasher`](std::hash::BuildHasher) for every container in
/// this crate.
#[cfg(feature = "ahash")]
pub type RandomState = ahash::RandomState;
