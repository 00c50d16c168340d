//! The message envelope.

use crate::{MessageField, RegisterValue};
use chrono::{DateTime, Utc};
use harp_auth::{Context, EntityCriteria, Predicate};
use harp_types::{ComponentId, MessageId};
use serde_json::{Map, Value};

/// Message metadata.
///
/// The timestamp feeds the default priority function. Extra entries
/// are free-form and available to custom priority functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Free-form metadata.
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// Metadata stamped with the current time.
    #[must_use]
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            extra: Map::new(),
        }
    }
}

/// A self-describing request for one operation on one component.
///
/// Messages are immutable once built: fields are set through the
/// `with_*` builder methods and read through accessors. A message is
/// consumed by exactly one dispatch on the component that pops it.
///
/// # Fields
///
/// | Field | Used by |
/// |-------|---------|
/// | `key` | register operations |
/// | `value` | `update`, `add` |
/// | `accessor`, `mutator` | `add`, `modify_accessor`, `modify_mutator` |
/// | `immutable` | `add` |
/// | `context` | register reads/writes, connect/disconnect, `modify_api_permission` |
/// | `args` | `eval` |
/// | `criteria` | `modify_connection_criteria`, `modify_disconnection_criteria` |
/// | `entity` | `connect_entity`, `disconnect_entity`, `message_entity` |
/// | `target_operation`, `permission` | `modify_api_permission` |
/// | `message` | `message_entity` |
///
/// `operation_context` is always present and is what the permission
/// table checks; `context` is the operand passed to the operation.
///
/// # Example
///
/// ```
/// use harp_auth::{Context, Predicate};
/// use harp_event::Message;
/// use harp_types::ComponentId;
/// use serde_json::json;
///
/// let msg = Message::new(ComponentId::new("cpu"), "add", Context::system())
///     .with_key("acc")
///     .with_accessor(Predicate::always())
///     .with_mutator(Predicate::flag("owner"))
///     .with_immutable(false)
///     .with_value(json!(0));
///
/// assert_eq!(msg.key(), Some("acc"));
/// assert_eq!(msg.immutable(), Some(false));
/// ```
#[derive(Debug, Clone)]
pub struct Message {
    id: MessageId,
    source: ComponentId,
    operation: String,
    operation_context: Context,
    metadata: Metadata,
    key: Option<String>,
    value: Option<RegisterValue>,
    accessor: Option<Predicate>,
    mutator: Option<Predicate>,
    immutable: Option<bool>,
    context: Option<Context>,
    args: Option<Vec<Value>>,
    criteria: Option<EntityCriteria>,
    entity: Option<String>,
    target_operation: Option<String>,
    permission: Option<Predicate>,
    message: Option<Box<Message>>,
}

impl Message {
    /// Creates a message with no operands, stamped with the current time.
    #[must_use]
    pub fn new(
        source: ComponentId,
        operation: impl Into<String>,
        operation_context: Context,
    ) -> Self {
        Self {
            id: MessageId::new(),
            source,
            operation: operation.into(),
            operation_context,
            metadata: Metadata::now(),
            key: None,
            value: None,
            accessor: None,
            mutator: None,
            immutable: None,
            context: None,
            args: None,
            criteria: None,
            entity: None,
            target_operation: None,
            permission: None,
            message: None,
        }
    }

    // === Builder ===

    /// Overrides the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.metadata.timestamp = timestamp;
        self
    }

    /// Adds a free-form metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.extra.insert(key.into(), value.into());
        self
    }

    /// Sets `key`.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets `value`.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<RegisterValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets `accessor`.
    #[must_use]
    pub fn with_accessor(mut self, accessor: Predicate) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Sets `mutator`.
    #[must_use]
    pub fn with_mutator(mut self, mutator: Predicate) -> Self {
        self.mutator = Some(mutator);
        self
    }

    /// Sets `immutable`.
    #[must_use]
    pub fn with_immutable(mut self, immutable: bool) -> Self {
        self.immutable = Some(immutable);
        self
    }

    /// Sets `context`.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets `args`.
    #[must_use]
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(args);
        self
    }

    /// Sets `criteria`.
    #[must_use]
    pub fn with_criteria(mut self, criteria: EntityCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    /// Sets `entity`.
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Sets `target_operation`.
    #[must_use]
    pub fn with_target_operation(mut self, operation: impl Into<String>) -> Self {
        self.target_operation = Some(operation.into());
        self
    }

    /// Sets `permission`.
    #[must_use]
    pub fn with_permission(mut self, permission: Predicate) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Sets the nested `message`.
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(Box::new(message));
        self
    }

    // === Accessors ===

    /// Returns the message ID.
    #[must_use]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the sending component.
    #[must_use]
    pub fn source(&self) -> &ComponentId {
        &self.source
    }

    /// Returns the requested operation name.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the context checked against the permission table.
    #[must_use]
    pub fn operation_context(&self) -> &Context {
        &self.operation_context
    }

    /// Returns the metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.metadata.timestamp
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    #[must_use]
    pub fn value(&self) -> Option<&RegisterValue> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn accessor(&self) -> Option<&Predicate> {
        self.accessor.as_ref()
    }

    #[must_use]
    pub fn mutator(&self) -> Option<&Predicate> {
        self.mutator.as_ref()
    }

    #[must_use]
    pub fn immutable(&self) -> Option<bool> {
        self.immutable
    }

    #[must_use]
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    #[must_use]
    pub fn args(&self) -> Option<&[Value]> {
        self.args.as_deref()
    }

    #[must_use]
    pub fn criteria(&self) -> Option<&EntityCriteria> {
        self.criteria.as_ref()
    }

    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    #[must_use]
    pub fn target_operation(&self) -> Option<&str> {
        self.target_operation.as_deref()
    }

    #[must_use]
    pub fn permission(&self) -> Option<&Predicate> {
        self.permission.as_ref()
    }

    /// Returns the nested message carried for `message_entity`.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.message.as_deref()
    }

    /// Returns `true` if `field` is present on this message.
    #[must_use]
    pub fn has(&self, field: MessageField) -> bool {
        field.is_present(self)
    }

    /// Returns the names of every present operand field.
    #[must_use]
    pub fn present_fields(&self) -> Vec<&'static str> {
        MessageField::ALL
            .iter()
            .filter(|f| f.is_present(self))
            .map(|f| f.name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn source() -> ComponentId {
        ComponentId::new("test")
    }

    #[test]
    fn new_message_has_no_operands() {
        let msg = Message::new(source(), "get", Context::system());
        assert!(msg.present_fields().is_empty());
        assert_eq!(msg.source().name(), "test");
        assert!(msg.operation_context().principal().is_system());
    }

    #[test]
    fn builder_sets_fields() {
        let inner = Message::new(source(), "get", Context::system());
        let msg = Message::new(source(), "message_entity", Context::system())
            .with_entity("mem")
            .with_message(inner.clone());

        assert_eq!(msg.entity(), Some("mem"));
        assert_eq!(msg.message().map(Message::id), Some(inner.id()));
        assert_eq!(msg.present_fields(), vec!["entity", "message"]);
    }

    #[test]
    fn zero_values_are_present() {
        let msg = Message::new(source(), "add", Context::system())
            .with_key("")
            .with_value(json!(0))
            .with_immutable(false)
            .with_args(vec![]);

        assert!(msg.has(MessageField::Key));
        assert!(msg.has(MessageField::Value));
        assert!(msg.has(MessageField::Immutable));
        assert!(msg.has(MessageField::Args));
    }

    #[test]
    fn timestamp_and_metadata() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let msg = Message::new(source(), "get", Context::system())
            .with_timestamp(at)
            .with_metadata("priority", 3);

        assert_eq!(msg.timestamp(), at);
        assert_eq!(msg.metadata().extra.get("priority"), Some(&json!(3)));
    }

    #[test]
    fn ids_are_unique() {
        let a = Message::new(source(), "get", Context::system());
        let b = Message::new(source(), "get", Context::system());
        assert_ne!(a.id(), b.id());
    }
}
