//! rsp-core: Shared types and utilities for ReelSpin
//!
//! Error taxonomy and the easing curves the reel timeline is built on.

mod easing;
mod error;

pub use easing::*;
pub use error::*;

/// Symbol identity: index into the symbol catalog
pub type SymbolId = u32;

/// Reel index within a machine (0 = leftmost)
pub type ReelId = usize;
