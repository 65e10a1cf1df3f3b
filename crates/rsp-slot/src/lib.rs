//! # rsp-slot — Reel engine for ReelSpin
//!
//! Frame-driven slot machine core: reels that spin, decelerate and snap to
//! rest, a machine that sequences them left to right, and a payline
//! evaluator over the settled grid. Rendering is left to the host, which
//! feeds per-frame deltas and reads snapshots.
//!
//! ## Architecture
//!
//! ```text
//! GameSession (balance, bet, autoplay)
//!     │ spin() / update(delta)
//!     v
//! SlotMachine ── Scheduler (staggered starts, first stop)
//!     │
//!     ├── Reel × N ── Tile × (rows + 2)
//!     │       └── SpinComplete ──> stop next reel
//!     v
//! PayTable::evaluate(grid) → SpinOutcome → credited = total × bet
//! ```

pub mod config;
pub mod machine;
pub mod paytable;
pub mod reel;
pub mod scheduler;
pub mod session;
pub mod symbols;
pub mod tile;
pub mod timing;

pub use config::*;
pub use machine::*;
pub use paytable::*;
pub use reel::*;
pub use scheduler::*;
pub use session::*;
pub use symbols::*;
pub use tile::*;
pub use timing::*;

pub use rsp_core::{ReelId, SlotError, SlotResult, SymbolId};
