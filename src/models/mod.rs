//! Validated Riot DTOs and derived statistics.

mod account;
pub mod matches;
mod stats;

#[cfg(test)]
pub(crate) mod fixtures;

pub use account::*;
pub use matches::*;
pub use stats::*;
