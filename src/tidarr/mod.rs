mod auth;
mod client;

pub use auth::{test_connection, AuthResponse, ConnectionTest};
pub use client::{is_created, Ack, Dispatch, TidarrClient};
