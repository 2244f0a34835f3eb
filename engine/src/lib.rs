//! Game-agnostic building blocks: tick-driven delays, string key-value
//! persistence and change notification lists.

pub mod delay;
pub mod kv;
pub mod observe;

pub use delay::DelayTimer;
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use observe::{SubscriptionId, Subscribers};
