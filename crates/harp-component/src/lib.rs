//! Component building blocks for harp.
//!
//! This crate holds the state a component owns and the error taxonomy
//! every operation reports through. It has no queue, no directory and no
//! dispatch; those live in `harp-runtime`, which assembles these pieces
//! into an addressable `Component`.
//!
//! # Contents
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`RegisterStore`] | Keyed registers gated by accessor/mutator predicates |
//! | [`PermissionTable`] | Per-operation access predicates plus `api_mutable` |
//! | [`ComponentError`] | Every expected failure, with a stable error code |
//! | [`Outcome`] | Result of a successfully dispatched operation |
//! | [`Status`] | Run-loop state |
//!
//! # Example
//!
//! ```
//! use harp_auth::{Context, Predicate};
//! use harp_component::{ComponentError, RegisterStore};
//! use serde_json::json;
//!
//! let mut store = RegisterStore::new("mem");
//! store
//!     .add("pc", Predicate::always(), Predicate::always(), true, json!(0))
//!     .unwrap();
//!
//! let err = store.delete("pc", &Context::system()).unwrap_err();
//! assert!(matches!(err, ComponentError::ImmutableRegister { .. }));
//! ```

mod error;
mod outcome;
mod permission;
mod register;
mod status;

pub use error::ComponentError;
pub use outcome::Outcome;
pub use permission::PermissionTable;
pub use register::RegisterStore;
pub use status::Status;

// Re-exported so downstream crates need a single import path.
pub use harp_auth::{Context, EntityCriteria, Predicate};
pub use harp_event::{Callable, Message, MessageField, RegisterValue};
pub use harp_types::{ComponentId, ErrorCode, Principal};
