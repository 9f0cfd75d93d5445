//! # Studio Core - Domain Module
//! 
//! Payloads exchanged with the design studio backend.

pub mod auth;
pub mod user;
pub mod order;
pub mod tariff;
pub mod page;

pub use auth::{AuthOutcome, ErrorBody, LoginSuccess, TokenPair};
pub use user::{NewUser, ProfileUpdate, UserProfile};
pub use order::{NewOrder, Order, OrderStatus};
pub use tariff::Tariff;
pub use page::Page;
