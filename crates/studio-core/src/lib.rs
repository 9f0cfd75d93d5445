//! # Studio Core
//! 
//! Domain models, the client error taxonomy, the storage port and the
//! session-owning services of the design studio client.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{ClientError, ErrorKind, StorageError};
pub use repositories::KeyValueStore;
pub use services::{SessionEvent, SessionEvents, TokenStore};
