//! Identifier types for harp.
//!
//! All identifiers are UUID-based so they serialize cleanly and can be
//! attached to log records.

use serde::{Deserialize, Serialize};
use uuid::{uuid, Uuid};

/// Namespace UUID for deterministic UUID v5 generation of component IDs.
const HARP_NAMESPACE: Uuid = uuid!("5b0e4a3e-6f0c-4d8e-9a57-2c1f0b7d9e41");

/// Identifier for a component.
///
/// Components are addressed by name in the process-wide directory, and
/// names are unique there. The UUID is therefore derived from the name
/// (UUID v5), so two IDs built from the same name compare equal.
///
/// # Example
///
/// ```
/// use harp_types::ComponentId;
///
/// let id = ComponentId::new("alu");
/// assert_eq!(id.name(), "alu");
/// assert_eq!(id, ComponentId::new("alu"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    /// Name-derived unique identifier.
    pub uuid: Uuid,
    /// Directory name.
    name: String,
}

impl ComponentId {
    /// Creates a component ID from its directory name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uuid: Uuid::new_v5(&HARP_NAMESPACE, name.as_bytes()),
            name,
        }
    }

    /// Returns the directory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.uuid)
    }
}

/// Identifier for a single message.
///
/// Generated when a message is constructed and carried through dispatch,
/// so log lines for one message can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

#[allow(clippy::new_without_default)] // Generated by Message::new(), not defaulted
impl MessageId {
    /// Creates a new random [`MessageId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "msg:{}", self.0)
    }
}

/// Identifier for a human or external caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    /// Creates a new random [`PrincipalId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "principal:{}", self.0)
    }
}
