pub mod config;
pub mod error;
pub mod provision;
pub mod registry;
pub mod serve;

pub use error::{Result, TokenHubError};
