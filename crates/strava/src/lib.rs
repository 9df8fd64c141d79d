pub mod client;
pub mod error;
pub mod models;

pub use client::{StravaClient, StravaCredentials};
pub use error::{Result, StravaError};
