// Use cases layer: session lifecycle, the tick driver, and the session registry.

pub mod game;
pub mod puzzle;
pub mod registry;
pub mod session;
pub mod types;

pub use game::{DriverSettings, SessionHandle, spawn_session};
pub use registry::{RegistryError, SessionRegistry};
pub use session::Session;
pub use types::SessionCommand;
