#![forbid(unsafe_code)]

//! Campus ledger runtime.
//!
//! Wraps the pure `campus_ledger` kernel with sessions, an append-only
//! journal, replay, snapshots and drift detection, plus the view router
//! and the recommendation collaborator.
//!
//! No ledger rules live here; transitions and invariants come from
//! the kernel.

pub mod config;
pub mod drift;
pub mod error;
pub mod event_store;
pub mod logging;
pub mod proto_bridge;
pub mod proto_types;
pub mod recommend;
pub mod replay;
pub mod router;
pub mod session;
pub mod snapshot;
pub mod snapshot_codec;

pub use error::SessionError;
pub use router::{Dispatch, Screen, ViewRouter};
pub use session::{Session, SharedSession};
