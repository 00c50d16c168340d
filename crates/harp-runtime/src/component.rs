//! The addressable component.
//!
//! A [`Component`] composes every per-component piece into one unit:
//!
//! ```text
//! ┌──────────────────────── Component "mem" ────────────────────────┐
//! │  RegisterStore     PermissionTable     ConnectionSet            │
//! │        ▲                 ▲                   ▲                  │
//! │        └──── dispatch ◀──┴── OperationTable  │                  │
//! │                  ▲                           │ message_entity   │
//! │               run()                          ▼                  │
//! │  Arc<MessageQueue> ◀── pushes from anyone   Arc<Directory>      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Direct methods (`get`, `update`, `connect_entity`, ...) are trusted
//! in-process calls and skip the permission table. Messages go through
//! [`Component::execute_message`], which applies it.
//!
//! # Example
//!
//! ```
//! use harp_auth::{Context, Predicate};
//! use harp_event::Message;
//! use harp_runtime::{ComponentBuilder, Directory};
//! use serde_json::json;
//!
//! let dir = Directory::shared();
//! let mut mem = ComponentBuilder::new("mem").build(&dir).unwrap();
//!
//! let add = Message::new(mem.id().clone(), "add", Context::system())
//!     .with_key("x")
//!     .with_accessor(Predicate::always())
//!     .with_mutator(Predicate::always())
//!     .with_immutable(false)
//!     .with_value(json!(5));
//! mem.push_message(add).unwrap();
//! mem.run().unwrap();
//!
//! let value = mem.get("x", &Context::system()).unwrap();
//! assert_eq!(value.as_data(), Some(&json!(5)));
//! ```

use crate::config::RuntimeConfig;
use crate::dispatch::{self, Bindings, Operation, OperationTable};
use crate::queue::{timestamp_priority, PriorityFn};
use crate::{ComponentHandle, ConnectionSet, Directory, MessageQueue};
use harp_auth::{Context, EntityCriteria, Predicate};
use harp_component::{ComponentError, Outcome, PermissionTable, RegisterStore, Status};
use harp_event::{Message, MessageField, RegisterValue};
use harp_types::{ComponentId, ErrorCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, debug_span, info};

/// A message-driven unit with gated registers and an exposed API.
#[derive(Debug)]
pub struct Component {
    id: ComponentId,
    status: Status,
    registers: RegisterStore,
    permissions: PermissionTable,
    connections: ConnectionSet,
    operations: Arc<OperationTable>,
    queue: Arc<MessageQueue>,
    directory: Arc<Directory>,
}

impl Component {
    // === Identity ===

    #[must_use]
    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// A handle other components can use to reach this one.
    #[must_use]
    pub fn handle(&self) -> ComponentHandle {
        ComponentHandle::new(self.id.clone(), Arc::clone(&self.queue))
    }

    #[must_use]
    pub fn queue(&self) -> &Arc<MessageQueue> {
        &self.queue
    }

    #[must_use]
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    #[must_use]
    pub fn registers(&self) -> &RegisterStore {
        &self.registers
    }

    #[must_use]
    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    #[must_use]
    pub fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    pub(crate) fn operation_table(&self) -> &Arc<OperationTable> {
        &self.operations
    }

    /// Exposed operation names in sorted order.
    #[must_use]
    pub fn operations(&self) -> Vec<&str> {
        self.operations.names()
    }

    // === Register store ===

    /// # Errors
    ///
    /// `KeyNotFound`, `AccessDenied`.
    pub fn get(&self, key: &str, ctx: &Context) -> Result<RegisterValue, ComponentError> {
        self.registers.get(key, ctx)
    }

    /// # Errors
    ///
    /// `KeyNotFound`, `NotInvocable`, `AccessDenied`.
    pub fn eval(&self, key: &str, ctx: &Context, args: &[Value]) -> Result<Value, ComponentError> {
        self.registers.eval(key, ctx, args)
    }

    /// # Errors
    ///
    /// `KeyNotFound`, `AccessDenied`.
    pub fn update(
        &mut self,
        key: &str,
        value: impl Into<RegisterValue>,
        ctx: &Context,
    ) -> Result<(), ComponentError> {
        self.registers.update(key, value, ctx)
    }

    /// # Errors
    ///
    /// `KeyNotFound`, `ImmutableRegister`, `AccessDenied`.
    pub fn delete(&mut self, key: &str, ctx: &Context) -> Result<(), ComponentError> {
        self.registers.delete(key, ctx)
    }

    /// # Errors
    ///
    /// `KeyAlreadyExists`.
    pub fn add(
        &mut self,
        key: impl Into<String>,
        accessor: Predicate,
        mutator: Predicate,
        immutable: bool,
        value: impl Into<RegisterValue>,
    ) -> Result<(), ComponentError> {
        self.registers.add(key, accessor, mutator, immutable, value)
    }

    /// # Errors
    ///
    /// `KeyNotFound`, `ImmutableRegister`.
    pub fn modify_accessor(&mut self, key: &str, accessor: Predicate) -> Result<(), ComponentError> {
        self.registers.modify_accessor(key, accessor)
    }

    /// # Errors
    ///
    /// `KeyNotFound`, `ImmutableRegister`.
    pub fn modify_mutator(&mut self, key: &str, mutator: Predicate) -> Result<(), ComponentError> {
        self.registers.modify_mutator(key, mutator)
    }

    // === Permission layer ===

    /// Replaces the predicate gating `operation`.
    ///
    /// # Errors
    ///
    /// `OperationNotFound`, `PermissionLocked`.
    pub fn modify_api_permission(
        &mut self,
        operation: &str,
        predicate: Predicate,
        ctx: &Context,
    ) -> Result<(), ComponentError> {
        self.permissions.modify_api_permission(operation, predicate, ctx)
    }

    // === Connection graph ===

    /// # Errors
    ///
    /// `CriteriaNotSatisfied`, `EntityNotFound`.
    pub fn connect_entity(&mut self, entity: &str, ctx: &Context) -> Result<(), ComponentError> {
        self.connections.connect(entity, ctx, &self.directory)
    }

    /// # Errors
    ///
    /// `CriteriaNotSatisfied`, `EntityNotFound`, `NotConnected`.
    pub fn disconnect_entity(&mut self, entity: &str, ctx: &Context) -> Result<(), ComponentError> {
        self.connections.disconnect(entity, ctx, &self.directory)
    }

    /// # Errors
    ///
    /// `PermissionLocked`.
    pub fn modify_connection_criteria(&mut self, criteria: EntityCriteria) -> Result<(), ComponentError> {
        self.connections.modify_connection_criteria(criteria)
    }

    /// # Errors
    ///
    /// `PermissionLocked`.
    pub fn modify_disconnection_criteria(&mut self, criteria: EntityCriteria) -> Result<(), ComponentError> {
        self.connections.modify_disconnection_criteria(criteria)
    }

    /// Delivers `message` into a connected entity's queue.
    ///
    /// # Errors
    ///
    /// `EntityNotFound`, `NotConnected`, `QueueFull`.
    pub fn message_entity(&self, entity: &str, message: Message) -> Result<(), ComponentError> {
        self.connections.message_entity(entity, message, &self.directory)
    }

    #[must_use]
    pub fn is_connected(&self, entity: &str) -> bool {
        self.connections.is_connected(entity)
    }

    // === Queue and run loop ===

    /// Pushes into this component's own queue.
    ///
    /// # Errors
    ///
    /// `QueueFull` when bounded and at capacity.
    pub fn push_message(&self, message: Message) -> Result<(), ComponentError> {
        self.queue.push_message(message)
    }

    /// Pops the highest-priority message without dispatching it.
    pub fn pop_next_message(&self) -> Option<Message> {
        self.queue.pop_next_message()
    }

    /// Dispatches one message.
    ///
    /// # Errors
    ///
    /// `OperationNotFound`, `PermissionDenied`, `ArgumentBinding`, or
    /// whatever the operation itself returns.
    pub fn execute_message(&mut self, message: Message) -> Result<Outcome, ComponentError> {
        debug!(
            component = %self.id.name(),
            message = %message.id(),
            operation = message.operation(),
            source = %message.source(),
            "dispatching"
        );
        dispatch::execute(self, message)
    }

    /// Performs one pop-and-dispatch cycle.
    ///
    /// # Errors
    ///
    /// `ComponentBlocked` when the queue is empty, otherwise whatever the
    /// dispatched message produced.
    pub fn run(&mut self) -> Result<Outcome, ComponentError> {
        let Some(message) = self.queue.pop_next_message() else {
            return Err(ComponentError::ComponentBlocked {
                component: self.id.name().to_string(),
            });
        };

        let span = debug_span!("run", component = %self.id.name(), message = %message.id());
        let _enter = span.enter();

        self.status = Status::Processing;
        let result = self.execute_message(message);
        self.status = Status::Idle;

        match &result {
            Ok(outcome) => debug!(?outcome, "message processed"),
            Err(e) => debug!(code = e.code(), error = %e, "message rejected"),
        }
        result
    }
}

/// Builder for [`Component`].
///
/// Defaults: FIFO timestamp priority, allow-all mutable criteria, an
/// allow-all permission table over the built-in operations, `api_mutable`
/// always passing, and an unbounded queue.
#[must_use]
pub struct ComponentBuilder {
    name: String,
    priority: PriorityFn,
    capacity: Option<usize>,
    connection_criteria: EntityCriteria,
    connection_mutable: bool,
    disconnection_criteria: EntityCriteria,
    disconnection_mutable: bool,
    permissions: HashMap<String, Predicate>,
    api_mutable: Predicate,
    extra_operations: Vec<Operation>,
    hidden_operations: Vec<String>,
}

impl ComponentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: timestamp_priority(),
            capacity: None,
            connection_criteria: EntityCriteria::always(),
            connection_mutable: true,
            disconnection_criteria: EntityCriteria::always(),
            disconnection_mutable: true,
            permissions: HashMap::new(),
            api_mutable: Predicate::always(),
            extra_operations: Vec::new(),
            hidden_operations: Vec::new(),
        }
    }

    /// Sets the queue priority function. Lower keys pop first.
    pub fn priority<F>(mut self, f: F) -> Self
    where
        F: Fn(&Message) -> i64 + Send + Sync + 'static,
    {
        self.priority = Arc::new(f);
        self
    }

    /// Bounds the queue. `None` is unbounded.
    pub fn queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the connection criteria and whether they may be replaced later.
    pub fn connection_criteria(mut self, criteria: EntityCriteria, mutable: bool) -> Self {
        self.connection_criteria = criteria;
        self.connection_mutable = mutable;
        self
    }

    /// Sets the disconnection criteria and whether they may be replaced later.
    pub fn disconnection_criteria(mut self, criteria: EntityCriteria, mutable: bool) -> Self {
        self.disconnection_criteria = criteria;
        self.disconnection_mutable = mutable;
        self
    }

    /// Gates one operation. Names that end up not exposed are dropped at build.
    pub fn permission(mut self, operation: impl Into<String>, predicate: Predicate) -> Self {
        self.permissions.insert(operation.into(), predicate);
        self
    }

    /// Gates every listed operation with the same predicate.
    pub fn permissions<I, S>(mut self, operations: I, predicate: &Predicate) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for op in operations {
            self.permissions.insert(op.into(), predicate.clone());
        }
        self
    }

    /// Sets the predicate gating changes to the permission table.
    pub fn api_mutable(mut self, predicate: Predicate) -> Self {
        self.api_mutable = predicate;
        self
    }

    /// Exposes an additional operation.
    pub fn operation<F>(mut self, name: impl Into<String>, params: &[MessageField], handler: F) -> Self
    where
        F: Fn(&mut Component, &Bindings<'_>) -> Result<Outcome, ComponentError> + Send + Sync + 'static,
    {
        self.extra_operations.push(Operation::new(name, params, handler));
        self
    }

    /// Removes a built-in operation from the exposed surface.
    pub fn hide_operation(mut self, name: impl Into<String>) -> Self {
        self.hidden_operations.push(name.into());
        self
    }

    /// Applies runtime configuration.
    pub fn with_config(mut self, config: &RuntimeConfig) -> Self {
        self.capacity = config.queue.capacity;
        self
    }

    /// Builds the component and registers it in `directory`.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the operation table cannot be assembled,
    /// `EntityAlreadyRegistered` if the name is taken. Nothing is
    /// registered on failure.
    pub fn build(self, directory: &Arc<Directory>) -> Result<Component, ComponentError> {
        let mut operations = OperationTable::builtin(&self.name);
        for name in &self.hidden_operations {
            operations.remove(name)?;
        }
        for op in self.extra_operations {
            operations.register(op)?;
        }

        let id = ComponentId::new(&self.name);
        let queue = Arc::new(MessageQueue::with_priority(
            &self.name,
            self.priority,
            self.capacity,
        ));
        let permissions = PermissionTable::new(
            &self.name,
            operations.names(),
            self.permissions,
            self.api_mutable,
        );
        let connections = ConnectionSet::with_criteria(
            &self.name,
            self.connection_criteria,
            self.connection_mutable,
            self.disconnection_criteria,
            self.disconnection_mutable,
        );

        directory.register(ComponentHandle::new(id.clone(), Arc::clone(&queue)))?;
        info!(
            component = %self.name,
            operations = operations.len(),
            capacity = ?self.capacity,
            "component built"
        );

        Ok(Component {
            registers: RegisterStore::new(&self.name),
            id,
            status: Status::Idle,
            permissions,
            connections,
            operations: Arc::new(operations),
            queue,
            directory: Arc::clone(directory),
        })
    }
}
