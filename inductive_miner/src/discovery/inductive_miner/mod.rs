//!
//! Inductive Miner
//!
//! Recursively splits a compressed log ([`UVCL`](crate::event_log::uvcl_struct::UVCL))
//! along the cuts of its directly-follows graph until only base cases remain. If no cut can
//! be found, a fall-through is applied. The variants `IM` and `IMf` discover process trees,
//! the POWL variants additionally detect partial order cuts and discover POWL models.
//!

/// Base cases (empty log and single activity)
pub mod base_cases;
/// Variant and algorithm parameters
pub mod config;
/// Cut detection
pub mod cuts;
/// Error type
pub mod error;
/// Fall-throughs applied when no cut is found
pub mod fall_through;
/// Recursive discovery
pub mod full;
/// Splitting a log along a cut
pub mod projection;

#[doc(inline)]
pub use config::{FallThroughKind, InductiveMinerConfig, InductiveMinerVariant};
#[doc(inline)]
pub use error::InductiveMinerError;
#[doc(inline)]
pub use full::{discover, discover_powl, discover_process_tree, InductiveModel, Model};

#[cfg(test)]
mod tests;
