//! Session-owning services

pub mod token_store;
pub mod event_bus;

pub use token_store::TokenStore;
pub use event_bus::{SessionEvent, SessionEvents};
