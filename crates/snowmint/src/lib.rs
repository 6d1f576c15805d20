//! # snowmint
//!
//! Snowflake-style 64-bit IDs for services that know their own
//! `(datacenter, worker)` identity.
//!
//! ```text
//!  | reserved (1) | timestamp (41) | datacenter (5) | worker (5) | sequence (12) |
//! ```
//!
//! - [`generator::SnowflakeGenerator`] mints IDs for one node under a mutex.
//!   Up to 4096 IDs per millisecond; past that it waits for the clock.
//! - [`registry::GeneratorRegistry`] lazily creates and caches one generator
//!   per node identity, so every caller for a node shares its sequence.
//! - [`time::TimeSource`] abstracts the wall clock. The clock is never
//!   trusted to be monotonic: a reading older than the last issued ID fails
//!   with [`Error::ClockRegression`] instead of risking a duplicate.
//!
//! ## Features
//!
//! - `parking-lot`: use `parking_lot::Mutex` (no poisoning).
//! - `cache-padded`: pad each generator's state to a cache line.
//! - `tracing`: emit `tracing` spans and events.
//! - `serde`: `Serialize`/`Deserialize` for IDs, plus [`serde::as_string`].
//! - `async-tokio`: await IDs on Tokio instead of spinning.
//!
//! ## Example
//!
//! ```
//! use snowmint::registry::GeneratorRegistry;
//!
//! let registry = GeneratorRegistry::new();
//! let id = registry.next_id(1, 1).unwrap();
//! assert_eq!(id.datacenter_id(), 1);
//! assert_eq!(id.worker_id(), 1);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
#[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
#[cfg(feature = "futures")]
pub mod futures;
pub mod generator;
pub mod id;
pub mod registry;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub mod serde;
pub mod time;

pub use crate::error::*;
pub use crate::generator::{Poll, SnowflakeGenerator};
pub use crate::id::{NodeId, SnowflakeId};
pub use crate::registry::{GeneratorRegistry, next_id};
pub use crate::time::{DEFAULT_EPOCH, SystemClock, TimeSource};
