//! HTTP side of the session client

pub mod dispatcher;
pub mod session_client;
mod response;

pub use dispatcher::{Dispatcher, RequestOptions};
pub use session_client::SessionClient;
