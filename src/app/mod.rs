// Application layer - Session controller and wiring

pub mod container;
pub mod session;

pub use container::{AppContainer, DefaultAppContainer};
pub use session::{SessionSnapshot, SessionTiming, TrimSession};
