// Network adapters split by WebSocket clients vs plain HTTP session routes.

pub mod client;
pub mod sessions;

pub use client::ws_handler;
pub use sessions::{
    command_handler, create_session_handler, delete_session_handler, get_session_handler,
};
