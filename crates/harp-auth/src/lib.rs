//! Access primitives for harp components.
//!
//! Every gate in the runtime is a predicate evaluated against a
//! caller-supplied [`Context`]:
//!
//! ```text
//! Register read    = accessor(context)
//! Register write   = mutator(context)
//! Operation call   = api_permission[operation](operation_context)
//! Table change     = api_mutable(context)
//! Edge add/remove  = criteria(entity_name, context)
//! ```
//!
//! | Type | Signature | Gates |
//! |------|-----------|-------|
//! | [`Predicate`] | `Fn(&Context) -> bool` | registers, operations, permission table |
//! | [`EntityCriteria`] | `Fn(&str, &Context) -> bool` | connection graph edges |
//!
//! Predicates are expected to be pure and fast. They run on the owning
//! component's worker, so a slow predicate stalls that component only.

pub mod context;
pub mod predicate;

pub use context::Context;
pub use predicate::{EntityCriteria, Predicate};

// Re-export Principal from harp_types for convenience
pub use harp_types::Principal;
