//! An implementation of the LMD-GHOST fork choice rule over a "proto-array" block tree:
//! a flat arena of nodes carrying cumulative attestation weights and cached
//! best-child/best-descendant links, filtered by Casper FFG justification and finality.
//!
//! The entry point is `ProtoArrayForkChoice`; block validation, state transition and
//! attestation verification are the caller's concern.

mod error;
pub mod fork_choice_test_definition;
mod proto_array;
mod proto_array_fork_choice;
mod ssz_container;

pub use crate::proto_array_fork_choice::ProtoArrayForkChoice;
pub use error::Error;
