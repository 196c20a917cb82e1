//! Primitive consensus types shared by the fork choice crates.

#[macro_use]
mod slot_epoch_macros;
mod slot_epoch;

pub use slot_epoch::{Epoch, Slot};

/// A 32-byte block root.
pub type Hash256 = ethereum_types::H256;
