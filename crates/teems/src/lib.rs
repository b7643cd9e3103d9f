mod client;
mod error;
mod types;

pub use client::TeamsClient;
pub use error::Error;
pub use types::*;
