//! ciliai-common: Shared error taxonomy and the allowlisted HTTP client used across CiliAI crates.

pub mod error;
pub mod sandbox;

pub use error::{CiliaiError, Result};
pub use sandbox::SandboxClient;
