pub mod error;
pub mod http;
pub mod protocol;

pub use error::SimulateError;
pub use http::{spawn_simulate, SimulateRequest, SimulatorClient};
pub use protocol::{Incoming, IncomingKind};
