//! Static field table used for argument binding.

use crate::Message;
use std::fmt;

/// A named operand field on [`Message`].
///
/// Each operation declares its formal parameters as a list of
/// `MessageField`s. Binding a parameter means checking that the field
/// with the same name is present on the incoming message; the field's
/// wire name is the parameter name reported in binding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageField {
    Key,
    Value,
    Accessor,
    Mutator,
    Immutable,
    Context,
    Args,
    Criteria,
    Entity,
    TargetOperation,
    Permission,
    Message,
}

impl MessageField {
    /// Every field, in declaration order.
    pub const ALL: [MessageField; 12] = [
        Self::Key,
        Self::Value,
        Self::Accessor,
        Self::Mutator,
        Self::Immutable,
        Self::Context,
        Self::Args,
        Self::Criteria,
        Self::Entity,
        Self::TargetOperation,
        Self::Permission,
        Self::Message,
    ];

    /// Returns the parameter name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Value => "value",
            Self::Accessor => "accessor",
            Self::Mutator => "mutator",
            Self::Immutable => "immutable",
            Self::Context => "context",
            Self::Args => "args",
            Self::Criteria => "criteria",
            Self::Entity => "entity",
            Self::TargetOperation => "target_operation",
            Self::Permission => "permission",
            Self::Message => "message",
        }
    }

    /// Looks a field up by parameter name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Returns `true` if the field is present on `msg`.
    ///
    /// Presence is `Option::is_some`; the value itself is never
    /// inspected.
    #[must_use]
    pub fn is_present(self, msg: &Message) -> bool {
        match self {
            Self::Key => msg.key().is_some(),
            Self::Value => msg.value().is_some(),
            Self::Accessor => msg.accessor().is_some(),
            Self::Mutator => msg.mutator().is_some(),
            Self::Immutable => msg.immutable().is_some(),
            Self::Context => msg.context().is_some(),
            Self::Args => msg.args().is_some(),
            Self::Criteria => msg.criteria().is_some(),
            Self::Entity => msg.entity().is_some(),
            Self::TargetOperation => msg.target_operation().is_some(),
            Self::Permission => msg.permission().is_some(),
            Self::Message => msg.message().is_some(),
        }
    }
}

impl fmt::Display for MessageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for field in MessageField::ALL {
            assert_eq!(MessageField::from_name(field.name()), Some(field));
        }
        assert_eq!(MessageField::from_name("nope"), None);
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = MessageField::ALL.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), MessageField::ALL.len());
    }

    #[test]
    fn display_is_name() {
        assert_eq!(MessageField::TargetOperation.to_string(), "target_operation");
    }
}
