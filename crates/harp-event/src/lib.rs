//! Message envelope for harp components.
//!
//! A [`Message`] is the only thing one component can hand to another.
//! It names an operation, carries the context used to check whether
//! the sender may call it, and carries every operand any built-in
//! operation might need as optional fields.
//!
//! # Message Flow
//!
//! ```text
//! sender                         target
//!   │  Message { operation: "get", key, context }
//!   │ ────────────────────────────► queue ──► run() ──► dispatch
//!   │                                                    │
//!   │                          permission(operation_context)?
//!   │                          bind fields by MessageField
//!   │                                                    ▼
//!   │                                       Outcome / ComponentError
//! ```
//!
//! # Operand Binding
//!
//! Operations declare their parameters as [`MessageField`]s. A field
//! is bound when it is *present* on the message; a present `0`,
//! `false` or `""` binds normally.
//!
//! # Example
//!
//! ```
//! use harp_auth::Context;
//! use harp_event::{Message, MessageField};
//! use harp_types::ComponentId;
//!
//! let msg = Message::new(ComponentId::new("cpu"), "get", Context::system())
//!     .with_key("pc")
//!     .with_context(Context::system());
//!
//! assert_eq!(msg.operation(), "get");
//! assert!(MessageField::Key.is_present(&msg));
//! assert!(!MessageField::Value.is_present(&msg));
//! ```

mod field;
mod message;
mod value;

pub use field::MessageField;
pub use message::{Message, Metadata};
pub use value::{Callable, RegisterValue};
