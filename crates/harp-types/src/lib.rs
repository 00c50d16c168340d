//! Core types for the harp component runtime.
//!
//! This crate provides the identifier, principal and error-code types
//! shared by every other harp crate.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SDK Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  harp-types     : IDs, Principal, ErrorCode  ◄── HERE        │
//! │  harp-auth      : Context, Predicate, EntityCriteria        │
//! │  harp-event     : Message, RegisterValue                    │
//! │  harp-component : RegisterStore, PermissionTable, errors    │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Runtime Layer                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  harp-runtime   : queue, directory, dispatch, Component     │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Frontend Layer                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  harp-cli       : `harp` embedder binary                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use harp_types::{ComponentId, MessageId};
//!
//! // Component IDs are derived from the directory name
//! let a = ComponentId::new("alu");
//! let b = ComponentId::new("alu");
//! assert_eq!(a, b);
//!
//! // Every message gets a fresh ID
//! assert_ne!(MessageId::new(), MessageId::new());
//! ```

mod error;
mod id;
mod principal;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{ComponentId, MessageId, PrincipalId};
pub use principal::Principal;
