// Outbound HTTP clients.

pub mod puzzle;
