//! Component layer errors.
//!
//! Every expected failure in the runtime is a [`ComponentError`] value.
//! Nothing here is a fault: an embedder branches on the variant (or on
//! [`ErrorCode::code`]) and decides whether to retry, drop or propagate.
//!
//! # Error Code Convention
//!
//! All component errors use the `COMPONENT_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`KeyNotFound`](ComponentError::KeyNotFound) | `COMPONENT_KEY_NOT_FOUND` | Yes |
//! | [`KeyAlreadyExists`](ComponentError::KeyAlreadyExists) | `COMPONENT_KEY_ALREADY_EXISTS` | No |
//! | [`AccessDenied`](ComponentError::AccessDenied) | `COMPONENT_ACCESS_DENIED` | Yes |
//! | [`PermissionDenied`](ComponentError::PermissionDenied) | `COMPONENT_PERMISSION_DENIED` | Yes |
//! | [`ImmutableRegister`](ComponentError::ImmutableRegister) | `COMPONENT_IMMUTABLE_REGISTER` | No |
//! | [`NotInvocable`](ComponentError::NotInvocable) | `COMPONENT_NOT_INVOCABLE` | No |
//! | [`OperationNotFound`](ComponentError::OperationNotFound) | `COMPONENT_OPERATION_NOT_FOUND` | No |
//! | [`ArgumentBinding`](ComponentError::ArgumentBinding) | `COMPONENT_ARGUMENT_BINDING` | No |
//! | [`CriteriaNotSatisfied`](ComponentError::CriteriaNotSatisfied) | `COMPONENT_CRITERIA_NOT_SATISFIED` | Yes |
//! | [`EntityNotFound`](ComponentError::EntityNotFound) | `COMPONENT_ENTITY_NOT_FOUND` | Yes |
//! | [`NotConnected`](ComponentError::NotConnected) | `COMPONENT_NOT_CONNECTED` | Yes |
//! | [`PermissionLocked`](ComponentError::PermissionLocked) | `COMPONENT_PERMISSION_LOCKED` | No |
//! | [`ComponentBlocked`](ComponentError::ComponentBlocked) | `COMPONENT_BLOCKED` | Yes |
//! | [`QueueFull`](ComponentError::QueueFull) | `COMPONENT_QUEUE_FULL` | Yes |
//! | [`EntityAlreadyRegistered`](ComponentError::EntityAlreadyRegistered) | `COMPONENT_ENTITY_ALREADY_REGISTERED` | No |
//! | [`InvalidOperation`](ComponentError::InvalidOperation) | `COMPONENT_INVALID_OPERATION` | No |
//!
//! Recoverable means some later state change (a register added, a
//! policy relaxed, a connection made, the queue drained) could let the
//! same message succeed. The core never retries on its own.
//!
//! # Example
//!
//! ```
//! use harp_component::ComponentError;
//! use harp_types::ErrorCode;
//!
//! let err = ComponentError::KeyNotFound {
//!     component: "mem".into(),
//!     key: "x".into(),
//! };
//! assert_eq!(err.code(), "COMPONENT_KEY_NOT_FOUND");
//! assert!(err.is_recoverable());
//! assert_eq!(err.component(), "mem");
//! ```

use harp_event::Message;
use harp_types::ErrorCode;
use thiserror::Error;

/// Component layer error.
///
/// Each variant names the component that produced it plus the key,
/// operation, entity or message involved.
#[derive(Debug, Clone, Error)]
pub enum ComponentError {
    /// The register does not exist.
    #[error("{component}: register '{key}' not found")]
    KeyNotFound { component: String, key: String },

    /// `add` was called for a key that already exists.
    #[error("{component}: register '{key}' already exists")]
    KeyAlreadyExists { component: String, key: String },

    /// The register's accessor or mutator rejected the context.
    #[error("{component}: access to register '{key}' denied")]
    AccessDenied { component: String, key: String },

    /// The permission table rejected the operation context.
    #[error("{component}: permission denied for operation '{operation}'")]
    PermissionDenied { component: String, operation: String },

    /// The register's policy is frozen.
    #[error("{component}: register '{key}' is immutable")]
    ImmutableRegister { component: String, key: String },

    /// `eval` targeted a register holding plain data.
    #[error("{component}: register '{key}' is not invocable")]
    NotInvocable { component: String, key: String },

    /// The operation is not exposed by this component.
    #[error("{component}: operation '{operation}' not found")]
    OperationNotFound { component: String, operation: String },

    /// A declared parameter was absent from the message.
    #[error(
        "{component}: operation '{operation}' is missing argument '{parameter}' (message {id})",
        id = .message.id()
    )]
    ArgumentBinding {
        component: String,
        operation: String,
        parameter: &'static str,
        message: Box<Message>,
    },

    /// Connection or disconnection criteria rejected the entity.
    #[error("{component}: criteria not satisfied for entity '{entity}'")]
    CriteriaNotSatisfied { component: String, entity: String },

    /// The entity is not registered in the directory.
    #[error("{component}: entity '{entity}' not found")]
    EntityNotFound { component: String, entity: String },

    /// The entity is registered but not connected.
    #[error("{component}: entity '{entity}' is not connected")]
    NotConnected { component: String, entity: String },

    /// A policy that was frozen (or is gated by `api_mutable`) cannot change.
    #[error("{component}: '{target}' is locked")]
    PermissionLocked { component: String, target: String },

    /// `run` found the queue empty.
    #[error("{component}: no message to process")]
    ComponentBlocked { component: String },

    /// A bounded queue rejected a push.
    #[error("{component}: message queue full (capacity {capacity})")]
    QueueFull { component: String, capacity: usize },

    /// A second component tried to register under a taken name.
    #[error("entity '{component}' is already registered")]
    EntityAlreadyRegistered { component: String },

    /// An operation table entry was rejected at registration.
    #[error("{component}: invalid operation '{operation}': {reason}")]
    InvalidOperation {
        component: String,
        operation: String,
        reason: String,
    },
}

impl ComponentError {
    /// Returns the name of the component that produced the error.
    #[must_use]
    pub fn component(&self) -> &str {
        match self {
            Self::KeyNotFound { component, .. }
            | Self::KeyAlreadyExists { component, .. }
            | Self::AccessDenied { component, .. }
            | Self::PermissionDenied { component, .. }
            | Self::ImmutableRegister { component, .. }
            | Self::NotInvocable { component, .. }
            | Self::OperationNotFound { component, .. }
            | Self::ArgumentBinding { component, .. }
            | Self::CriteriaNotSatisfied { component, .. }
            | Self::EntityNotFound { component, .. }
            | Self::NotConnected { component, .. }
            | Self::PermissionLocked { component, .. }
            | Self::ComponentBlocked { component }
            | Self::QueueFull { component, .. }
            | Self::EntityAlreadyRegistered { component }
            | Self::InvalidOperation { component, .. } => component,
        }
    }

    /// Returns the offending message for binding errors.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::ArgumentBinding { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns `true` for [`ComponentBlocked`](Self::ComponentBlocked).
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::ComponentBlocked { .. })
    }
}

impl ErrorCode for ComponentError {
    fn code(&self) -> &'static str {
        match self {
            Self::KeyNotFound { .. } => "COMPONENT_KEY_NOT_FOUND",
            Self::KeyAlreadyExists { .. } => "COMPONENT_KEY_ALREADY_EXISTS",
            Self::AccessDenied { .. } => "COMPONENT_ACCESS_DENIED",
            Self::PermissionDenied { .. } => "COMPONENT_PERMISSION_DENIED",
            Self::ImmutableRegister { .. } => "COMPONENT_IMMUTABLE_REGISTER",
            Self::NotInvocable { .. } => "COMPONENT_NOT_INVOCABLE",
            Self::OperationNotFound { .. } => "COMPONENT_OPERATION_NOT_FOUND",
            Self::ArgumentBinding { .. } => "COMPONENT_ARGUMENT_BINDING",
            Self::CriteriaNotSatisfied { .. } => "COMPONENT_CRITERIA_NOT_SATISFIED",
            Self::EntityNotFound { .. } => "COMPONENT_ENTITY_NOT_FOUND",
            Self::NotConnected { .. } => "COMPONENT_NOT_CONNECTED",
            Self::PermissionLocked { .. } => "COMPONENT_PERMISSION_LOCKED",
            Self::ComponentBlocked { .. } => "COMPONENT_BLOCKED",
            Self::QueueFull { .. } => "COMPONENT_QUEUE_FULL",
            Self::EntityAlreadyRegistered { .. } => "COMPONENT_ENTITY_ALREADY_REGISTERED",
            Self::InvalidOperation { .. } => "COMPONENT_INVALID_OPERATION",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::KeyNotFound { .. }
                | Self::AccessDenied { .. }
                | Self::PermissionDenied { .. }
                | Self::CriteriaNotSatisfied { .. }
                | Self::EntityNotFound { .. }
                | Self::NotConnected { .. }
                | Self::ComponentBlocked { .. }
                | Self::QueueFull { .. }
        )
    }
}
