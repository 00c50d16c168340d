//! Principal (actor identity) types.
//!
//! A [`Principal`] identifies who is acting. It carries no permission
//! logic: access decisions are made by predicates over a `Context`
//! (see `harp-auth`), which may inspect the principal.

use crate::{ComponentId, PrincipalId};
use serde::{Deserialize, Serialize};

/// The actor performing an action.
///
/// | Variant | Description |
/// |---------|-------------|
/// | `User` | External caller driving the embedder |
/// | `Component` | Another component acting through the connection graph |
/// | `System` | The embedder itself (construction, wiring) |
///
/// # Example
///
/// ```
/// use harp_types::{ComponentId, Principal, PrincipalId};
///
/// let user = Principal::User(PrincipalId::new());
/// let peer = Principal::Component(ComponentId::new("alu"));
/// assert!(user.is_user());
/// assert_eq!(peer.component_id().map(|id| id.name()), Some("alu"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// External caller.
    User(PrincipalId),
    /// Peer component.
    Component(ComponentId),
    /// The embedding application.
    System,
}

impl Principal {
    /// Returns `true` if this is a [`Principal::User`].
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Returns `true` if this is a [`Principal::Component`].
    #[must_use]
    pub fn is_component(&self) -> bool {
        matches!(self, Self::Component(_))
    }

    /// Returns `true` if this is [`Principal::System`].
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// Returns the [`ComponentId`] if this is a Component, otherwise `None`.
    #[must_use]
    pub fn component_id(&self) -> Option<&ComponentId> {
        match self {
            Self::Component(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{}", id.uuid()),
            Self::Component(id) => write!(f, "component:{}", id.name()),
            Self::System => write!(f, "system"),
        }
    }
}
