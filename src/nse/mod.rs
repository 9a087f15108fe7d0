pub mod client;
pub mod option_chain;

// Re-exports for convenient access (e.g. `use crate::nse::NseClient`).
pub use client::NseClient;
pub use option_chain::{OptionChain, OptionLeg, StrikeRow};
