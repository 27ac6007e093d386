//! Client-side synchronization core.
//!
//! Every component renders through a small view trait and runs on a
//! single-threaded `LocalSet`, so state is shared with `Rc` and never locked.

pub mod announcer;
pub mod export;
pub mod roster;
pub mod schedule;
pub mod session;
pub mod table;
pub mod terminal;
pub mod visibility;

#[cfg(test)]
pub mod testing;

pub use session::{Session, Surfaces};
