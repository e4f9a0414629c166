// krm-exec Core - Domain, Ports & Adapter Use Cases
// NO process spawning here: the ProcessRunner port is implemented in infra-system

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};
