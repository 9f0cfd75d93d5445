//! # Studio Infrastructure
//! 
//! Storage adapters and the HTTP session client (adapters).

pub mod storage;
pub mod http;

#[cfg(test)]
mod test;

pub use storage::{FileStore, MemoryStore};
pub use http::{Dispatcher, RequestOptions, SessionClient};
