//! Storage traits (ports)

pub mod key_value_store;

pub use key_value_store::KeyValueStore;
