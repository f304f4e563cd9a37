// Interface adapters: wire protocol, HTTP/WebSocket handling, outbound clients.

pub mod clients;
pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
pub mod utils;
