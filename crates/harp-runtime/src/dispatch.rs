//! Operation table and message dispatch.
//!
//! Dispatch maps one incoming [`Message`] onto one exposed operation:
//!
//! ```text
//! Message { operation, operation_context, fields.. }
//!     │
//!     ├─ 1. operation exposed?            else OperationNotFound
//!     ├─ 2. permission(operation_context) else PermissionDenied
//!     ├─ 3. every declared field present? else ArgumentBinding
//!     └─ 4. handler(component, bindings)  → Outcome | ComponentError
//! ```
//!
//! Parameters are declared per operation as a list of [`MessageField`]s.
//! Presence means `Option::is_some`, so `0`, `false` and `""` all bind.

use crate::Component;
use harp_auth::{Context, EntityCriteria, Predicate};
use harp_component::{ComponentError, Outcome};
use harp_event::{Message, MessageField, RegisterValue};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Names of the built-in operations, in sorted order.
pub const BUILTIN_OPERATIONS: [&str; 13] = [
    "add",
    "connect_entity",
    "delete",
    "disconnect_entity",
    "eval",
    "get",
    "message_entity",
    "modify_accessor",
    "modify_api_permission",
    "modify_connection_criteria",
    "modify_disconnection_criteria",
    "modify_mutator",
    "update",
];

/// Operation implementation.
pub type Handler =
    Arc<dyn Fn(&mut Component, &Bindings<'_>) -> Result<Outcome, ComponentError> + Send + Sync>;

/// One exposed operation.
#[derive(Clone)]
pub struct Operation {
    name: String,
    params: Vec<MessageField>,
    handler: Handler,
}

impl Operation {
    pub fn new<F>(name: impl Into<String>, params: &[MessageField], handler: F) -> Self
    where
        F: Fn(&mut Component, &Bindings<'_>) -> Result<Outcome, ComponentError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: params.to_vec(),
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters, in declaration order.
    #[must_use]
    pub fn params(&self) -> &[MessageField] {
        &self.params
    }

    /// Parameter names as they appear in binding errors.
    #[must_use]
    pub fn param_names(&self) -> Vec<&'static str> {
        self.params.iter().map(|f| f.name()).collect()
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("params", &self.param_names())
            .finish_non_exhaustive()
    }
}

/// The set of operations a component exposes.
///
/// Built once when the component is constructed. Its names seed the
/// component's [`PermissionTable`](harp_component::PermissionTable).
#[derive(Clone)]
pub struct OperationTable {
    owner: String,
    ops: BTreeMap<String, Operation>,
}

impl OperationTable {
    /// A table with no operations.
    pub fn empty(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ops: BTreeMap::new(),
        }
    }

    /// The built-in operation surface.
    ///
    /// | Operation | Parameters |
    /// |-----------|------------|
    /// | `get` | `key`, `context` |
    /// | `eval` | `key`, `context`, `args` |
    /// | `update` | `key`, `value`, `context` |
    /// | `delete` | `key`, `context` |
    /// | `add` | `key`, `accessor`, `mutator`, `immutable`, `value` |
    /// | `modify_accessor` | `key`, `accessor` |
    /// | `modify_mutator` | `key`, `mutator` |
    /// | `modify_api_permission` | `target_operation`, `permission`, `context` |
    /// | `connect_entity` | `entity`, `context` |
    /// | `disconnect_entity` | `entity`, `context` |
    /// | `modify_connection_criteria` | `criteria` |
    /// | `modify_disconnection_criteria` | `criteria` |
    /// | `message_entity` | `entity`, `message` |
    pub fn builtin(owner: impl Into<String>) -> Self {
        use MessageField as F;

        let mut table = Self::empty(owner);
        let builtins = [
            Operation::new("get", &[F::Key, F::Context], builtin::get),
            Operation::new("eval", &[F::Key, F::Context, F::Args], builtin::eval),
            Operation::new("update", &[F::Key, F::Value, F::Context], builtin::update),
            Operation::new("delete", &[F::Key, F::Context], builtin::delete),
            Operation::new(
                "add",
                &[F::Key, F::Accessor, F::Mutator, F::Immutable, F::Value],
                builtin::add,
            ),
            Operation::new("modify_accessor", &[F::Key, F::Accessor], builtin::modify_accessor),
            Operation::new("modify_mutator", &[F::Key, F::Mutator], builtin::modify_mutator),
            Operation::new(
                "modify_api_permission",
                &[F::TargetOperation, F::Permission, F::Context],
                builtin::modify_api_permission,
            ),
            Operation::new("connect_entity", &[F::Entity, F::Context], builtin::connect_entity),
            Operation::new("disconnect_entity", &[F::Entity, F::Context], builtin::disconnect_entity),
            Operation::new(
                "modify_connection_criteria",
                &[F::Criteria],
                builtin::modify_connection_criteria,
            ),
            Operation::new(
                "modify_disconnection_criteria",
                &[F::Criteria],
                builtin::modify_disconnection_criteria,
            ),
            Operation::new("message_entity", &[F::Entity, F::Message], builtin::message_entity),
        ];
        for op in builtins {
            table.ops.insert(op.name.clone(), op);
        }
        table
    }

    fn invalid(&self, operation: &str, reason: impl Into<String>) -> ComponentError {
        ComponentError::InvalidOperation {
            component: self.owner.clone(),
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Adds an operation.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for an empty or duplicate name, or a parameter
    /// list that names the same field twice.
    pub fn register(&mut self, operation: Operation) -> Result<(), ComponentError> {
        if operation.name.is_empty() {
            return Err(self.invalid("", "operation name is empty"));
        }
        if self.ops.contains_key(&operation.name) {
            return Err(self.invalid(&operation.name, "operation already exists"));
        }
        for (i, field) in operation.params.iter().enumerate() {
            if operation.params[..i].contains(field) {
                return Err(self.invalid(
                    &operation.name,
                    format!("parameter '{field}' declared twice"),
                ));
            }
        }
        self.ops.insert(operation.name.clone(), operation);
        Ok(())
    }

    /// Removes an operation from the exposed surface.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if `name` is not in the table.
    pub fn remove(&mut self, name: &str) -> Result<Operation, ComponentError> {
        self.ops
            .remove(name)
            .ok_or_else(|| self.invalid(name, "operation does not exist"))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.ops.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Operation names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.ops.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationTable")
            .field("owner", &self.owner)
            .field("ops", &self.names())
            .finish()
    }
}

/// Typed view of a message's bound parameters.
///
/// Every declared parameter has already been checked for presence, so
/// the accessors only fail when a handler reads a field it did not
/// declare.
#[derive(Debug)]
pub struct Bindings<'a> {
    owner: String,
    message: &'a Message,
}

impl<'a> Bindings<'a> {
    fn new(owner: impl Into<String>, message: &'a Message) -> Self {
        Self {
            owner: owner.into(),
            message,
        }
    }

    fn require<T>(&self, field: MessageField, value: Option<T>) -> Result<T, ComponentError> {
        value.ok_or_else(|| ComponentError::ArgumentBinding {
            component: self.owner.clone(),
            operation: self.message.operation().to_string(),
            parameter: field.name(),
            message: Box::new(self.message.clone()),
        })
    }

    /// The message being dispatched.
    #[must_use]
    pub fn envelope(&self) -> &'a Message {
        self.message
    }

    pub fn key(&self) -> Result<&'a str, ComponentError> {
        self.require(MessageField::Key, self.message.key())
    }

    pub fn value(&self) -> Result<&'a RegisterValue, ComponentError> {
        self.require(MessageField::Value, self.message.value())
    }

    pub fn accessor(&self) -> Result<&'a Predicate, ComponentError> {
        self.require(MessageField::Accessor, self.message.accessor())
    }

    pub fn mutator(&self) -> Result<&'a Predicate, ComponentError> {
        self.require(MessageField::Mutator, self.message.mutator())
    }

    pub fn immutable(&self) -> Result<bool, ComponentError> {
        self.require(MessageField::Immutable, self.message.immutable())
    }

    pub fn context(&self) -> Result<&'a Context, ComponentError> {
        self.require(MessageField::Context, self.message.context())
    }

    pub fn args(&self) -> Result<&'a [Value], ComponentError> {
        self.require(MessageField::Args, self.message.args())
    }

    pub fn criteria(&self) -> Result<&'a EntityCriteria, ComponentError> {
        self.require(MessageField::Criteria, self.message.criteria())
    }

    pub fn entity(&self) -> Result<&'a str, ComponentError> {
        self.require(MessageField::Entity, self.message.entity())
    }

    pub fn target_operation(&self) -> Result<&'a str, ComponentError> {
        self.require(MessageField::TargetOperation, self.message.target_operation())
    }

    pub fn permission(&self) -> Result<&'a Predicate, ComponentError> {
        self.require(MessageField::Permission, self.message.permission())
    }

    /// The nested message carried for `message_entity`.
    pub fn message(&self) -> Result<&'a Message, ComponentError> {
        self.require(MessageField::Message, self.message.message())
    }
}

/// Runs the dispatch algorithm for one message.
pub(crate) fn execute(component: &mut Component, message: Message) -> Result<Outcome, ComponentError> {
    let table = Arc::clone(component.operation_table());
    let Some(op) = table.get(message.operation()) else {
        return Err(ComponentError::OperationNotFound {
            component: component.name().to_string(),
            operation: message.operation().to_string(),
        });
    };

    component
        .permissions()
        .is_permitted(op.name(), message.operation_context())?;

    if let Some(missing) = op.params().iter().find(|f| !f.is_present(&message)) {
        return Err(ComponentError::ArgumentBinding {
            component: component.name().to_string(),
            operation: op.name().to_string(),
            parameter: missing.name(),
            message: Box::new(message),
        });
    }

    let bindings = Bindings::new(component.name(), &message);
    (op.handler)(component, &bindings)
}

mod builtin {
    use super::Bindings;
    use crate::Component;
    use harp_component::{ComponentError, Outcome};

    type Res = Result<Outcome, ComponentError>;

    pub(super) fn get(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.get(b.key()?, b.context()?).map(Outcome::Value)
    }

    pub(super) fn eval(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.eval(b.key()?, b.context()?, b.args()?).map(Outcome::from)
    }

    pub(super) fn update(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.update(b.key()?, b.value()?.clone(), b.context()?)?;
        Ok(Outcome::Done)
    }

    pub(super) fn delete(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.delete(b.key()?, b.context()?)?;
        Ok(Outcome::Done)
    }

    pub(super) fn add(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.add(
            b.key()?,
            b.accessor()?.clone(),
            b.mutator()?.clone(),
            b.immutable()?,
            b.value()?.clone(),
        )?;
        Ok(Outcome::Done)
    }

    pub(super) fn modify_accessor(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.modify_accessor(b.key()?, b.accessor()?.clone())?;
        Ok(Outcome::Done)
    }

    pub(super) fn modify_mutator(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.modify_mutator(b.key()?, b.mutator()?.clone())?;
        Ok(Outcome::Done)
    }

    pub(super) fn modify_api_permission(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.modify_api_permission(b.target_operation()?, b.permission()?.clone(), b.context()?)?;
        Ok(Outcome::Done)
    }

    pub(super) fn connect_entity(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.connect_entity(b.entity()?, b.context()?)?;
        Ok(Outcome::Done)
    }

    pub(super) fn disconnect_entity(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.disconnect_entity(b.entity()?, b.context()?)?;
        Ok(Outcome::Done)
    }

    pub(super) fn modify_connection_criteria(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.modify_connection_criteria(b.criteria()?.clone())?;
        Ok(Outcome::Done)
    }

    pub(super) fn modify_disconnection_criteria(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.modify_disconnection_criteria(b.criteria()?.clone())?;
        Ok(Outcome::Done)
    }

    pub(super) fn message_entity(c: &mut Component, b: &Bindings<'_>) -> Res {
        c.message_entity(b.entity()?, b.message()?.clone())?;
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harp_types::ErrorCode;

    fn noop(_: &mut Component, _: &Bindings<'_>) -> Result<Outcome, ComponentError> {
        Ok(Outcome::Done)
    }

    #[test]
    fn builtin_surface() {
        let table = OperationTable::builtin("mem");
        assert_eq!(table.names(), BUILTIN_OPERATIONS.to_vec());
        assert_eq!(
            table.get("add").unwrap().param_names(),
            vec!["key", "accessor", "mutator", "immutable", "value"]
        );
        assert_eq!(
            table.get("modify_api_permission").unwrap().param_names(),
            vec!["target_operation", "permission", "context"]
        );
        assert_eq!(table.get("message_entity").unwrap().param_names(), vec!["entity", "message"]);
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut table = OperationTable::builtin("mem");
        let err = table.register(Operation::new("get", &[], noop)).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_INVALID_OPERATION");
        assert_eq!(err.component(), "mem");

        let err = table
            .register(Operation::new("twice", &[MessageField::Key, MessageField::Key], noop))
            .unwrap_err();
        assert!(err.to_string().contains("declared twice"));

        let err = table.register(Operation::new("", &[], noop)).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_INVALID_OPERATION");

        table.register(Operation::new("reset", &[], noop)).unwrap();
        assert!(table.contains("reset"));
    }

    #[test]
    fn remove_hides_operation() {
        let mut table = OperationTable::builtin("mem");
        table.remove("delete").unwrap();
        assert!(!table.contains("delete"));
        assert!(table.remove("delete").is_err());
    }

    #[test]
    fn debug_lists_names() {
        let mut table = OperationTable::empty("mem");
        assert!(table.is_empty());
        table.register(Operation::new("ping", &[], noop)).unwrap();
        let dbg = format!("{table:?}");
        assert!(dbg.contains("ping"), "got: {dbg}");
    }
}
