//! Pure domain types and scoring algorithms for the validator ranking pipeline.
//!
//! This crate holds everything that is deterministic and I/O-free: the chain-derived
//! domain model ([`types`]), the per-validator scoring function ([`scorer`]), cluster
//! membership and visibility sampling ([`cluster`]), and Pareto dominance analysis
//! ([`dominance`]). Nothing here talks to a node, a database, or the network - that
//! lives in the `validator-rank-service` crate, which drives these functions with data
//! fetched from the outside world.

pub mod account_id;
pub mod cluster;
pub mod dominance;
pub mod error;
pub mod scorer;
pub mod types;

pub use account_id::AccountId32;
pub use error::CoreError;
