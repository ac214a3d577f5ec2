pub mod channel;
pub mod error;
pub mod hub;
pub mod monitor;
pub mod supervisor;

pub use error::HubError;
