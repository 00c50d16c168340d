//! Outbound connection set.
//!
//! A component may only message entities it is connected to. Edges are
//! created and removed under [`EntityCriteria`] that each carry their
//! own mutability flag.
//!
//! | Operation | Failure order |
//! |-----------|---------------|
//! | `connect` | `CriteriaNotSatisfied`, `EntityNotFound` |
//! | `disconnect` | `CriteriaNotSatisfied`, `EntityNotFound`, `NotConnected` |
//! | `message_entity` | `EntityNotFound`, `NotConnected`, `QueueFull` |
//! | `modify_*_criteria` | `PermissionLocked` |
//!
//! Every name in the set is also in the directory: names are only added
//! after a successful lookup, and the directory never removes entries.

use crate::Directory;
use harp_auth::{Context, EntityCriteria};
use harp_component::ComponentError;
use harp_event::Message;
use std::collections::BTreeSet;
use tracing::debug;

/// A component's outbound edges and the criteria that gate them.
#[derive(Debug, Clone)]
pub struct ConnectionSet {
    owner: String,
    connected: BTreeSet<String>,
    connection_criteria: EntityCriteria,
    disconnection_criteria: EntityCriteria,
    connection_mutable: bool,
    disconnection_mutable: bool,
}

impl ConnectionSet {
    /// Creates an allow-all set whose criteria may be replaced.
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_criteria(owner, EntityCriteria::always(), true, EntityCriteria::always(), true)
    }

    pub fn with_criteria(
        owner: impl Into<String>,
        connection_criteria: EntityCriteria,
        connection_mutable: bool,
        disconnection_criteria: EntityCriteria,
        disconnection_mutable: bool,
    ) -> Self {
        Self {
            owner: owner.into(),
            connected: BTreeSet::new(),
            connection_criteria,
            disconnection_criteria,
            connection_mutable,
            disconnection_mutable,
        }
    }

    fn criteria_failed(&self, entity: &str) -> ComponentError {
        ComponentError::CriteriaNotSatisfied {
            component: self.owner.clone(),
            entity: entity.to_string(),
        }
    }

    fn not_found(&self, entity: &str) -> ComponentError {
        ComponentError::EntityNotFound {
            component: self.owner.clone(),
            entity: entity.to_string(),
        }
    }

    fn not_connected(&self, entity: &str) -> ComponentError {
        ComponentError::NotConnected {
            component: self.owner.clone(),
            entity: entity.to_string(),
        }
    }

    /// Adds an edge to `entity`. Connecting twice is a no-op.
    ///
    /// # Errors
    ///
    /// `CriteriaNotSatisfied`, then `EntityNotFound`.
    pub fn connect(&mut self, entity: &str, ctx: &Context, directory: &Directory) -> Result<(), ComponentError> {
        if !self.connection_criteria.check(entity, ctx) {
            return Err(self.criteria_failed(entity));
        }
        if !directory.contains(entity) {
            return Err(self.not_found(entity));
        }
        if self.connected.insert(entity.to_string()) {
            debug!(component = %self.owner, entity, "connected");
        }
        Ok(())
    }

    /// Removes the edge to `entity`.
    ///
    /// # Errors
    ///
    /// `CriteriaNotSatisfied`, `EntityNotFound`, then `NotConnected`.
    pub fn disconnect(&mut self, entity: &str, ctx: &Context, directory: &Directory) -> Result<(), ComponentError> {
        if !self.disconnection_criteria.check(entity, ctx) {
            return Err(self.criteria_failed(entity));
        }
        if !directory.contains(entity) {
            return Err(self.not_found(entity));
        }
        if !self.connected.remove(entity) {
            return Err(self.not_connected(entity));
        }
        debug!(component = %self.owner, entity, "disconnected");
        Ok(())
    }

    /// Replaces the connection criteria.
    ///
    /// # Errors
    ///
    /// `PermissionLocked` if the connection criteria are frozen.
    pub fn modify_connection_criteria(&mut self, criteria: EntityCriteria) -> Result<(), ComponentError> {
        if !self.connection_mutable {
            return Err(ComponentError::PermissionLocked {
                component: self.owner.clone(),
                target: "connection_criteria".to_string(),
            });
        }
        self.connection_criteria = criteria;
        Ok(())
    }

    /// Replaces the disconnection criteria.
    ///
    /// # Errors
    ///
    /// `PermissionLocked` if the disconnection criteria are frozen.
    pub fn modify_disconnection_criteria(&mut self, criteria: EntityCriteria) -> Result<(), ComponentError> {
        if !self.disconnection_mutable {
            return Err(ComponentError::PermissionLocked {
                component: self.owner.clone(),
                target: "disconnection_criteria".to_string(),
            });
        }
        self.disconnection_criteria = criteria;
        Ok(())
    }

    /// Delivers `message` into a connected entity's queue.
    ///
    /// The target handle is cloned out of the directory before the push.
    ///
    /// # Errors
    ///
    /// `EntityNotFound`, `NotConnected`, then `QueueFull` from the target.
    pub fn message_entity(&self, entity: &str, message: Message, directory: &Directory) -> Result<(), ComponentError> {
        let Some(target) = directory.lookup(entity) else {
            return Err(self.not_found(entity));
        };
        if !self.connected.contains(entity) {
            return Err(self.not_connected(entity));
        }
        debug!(
            component = %self.owner,
            entity,
            message = %message.id(),
            operation = message.operation(),
            "delivering message"
        );
        target.push_message(message)
    }

    #[must_use]
    pub fn is_connected(&self, entity: &str) -> bool {
        self.connected.contains(entity)
    }

    /// Connected names in sorted order.
    #[must_use]
    pub fn connected(&self) -> Vec<&str> {
        self.connected.iter().map(String::as_str).collect()
    }

    #[must_use]
    pub fn connection_criteria(&self) -> &EntityCriteria {
        &self.connection_criteria
    }

    #[must_use]
    pub fn disconnection_criteria(&self) -> &EntityCriteria {
        &self.disconnection_criteria
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentHandle, MessageQueue};
    use harp_types::{ComponentId, ErrorCode};
    use std::sync::Arc;

    fn directory(names: &[&str]) -> Directory {
        let dir = Directory::new();
        for name in names {
            dir.register(ComponentHandle::new(
                ComponentId::new(*name),
                Arc::new(MessageQueue::new(*name)),
            ))
            .unwrap();
        }
        dir
    }

    fn ctx() -> Context {
        Context::system()
    }

    #[test]
    fn connect_requires_criteria_then_existence() {
        let dir = directory(&["mem"]);
        let mut set = ConnectionSet::with_criteria(
            "cpu",
            EntityCriteria::allow_list(["mem", "ghost"]),
            true,
            EntityCriteria::always(),
            true,
        );

        // criteria are checked before the directory
        let err = set.connect("alu", &ctx(), &dir).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_CRITERIA_NOT_SATISFIED");
        let err = set.connect("ghost", &ctx(), &dir).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_ENTITY_NOT_FOUND");

        set.connect("mem", &ctx(), &dir).unwrap();
        set.connect("mem", &ctx(), &dir).unwrap();
        assert_eq!(set.connected(), vec!["mem"]);
    }

    #[test]
    fn disconnect_check_order() {
        let dir = directory(&["mem", "alu"]);
        let mut set = ConnectionSet::new("cpu");
        set.connect("mem", &ctx(), &dir).unwrap();

        let err = set.disconnect("ghost", &ctx(), &dir).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_ENTITY_NOT_FOUND");
        let err = set.disconnect("alu", &ctx(), &dir).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_NOT_CONNECTED");

        set.modify_disconnection_criteria(EntityCriteria::never()).unwrap();
        let err = set.disconnect("mem", &ctx(), &dir).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_CRITERIA_NOT_SATISFIED");
        assert!(set.is_connected("mem"));

        set.modify_disconnection_criteria(EntityCriteria::always()).unwrap();
        set.disconnect("mem", &ctx(), &dir).unwrap();
        assert!(!set.is_connected("mem"));
    }

    #[test]
    fn message_entity_check_order() {
        let dir = directory(&["mem"]);
        dir.register(ComponentHandle::new(
            ComponentId::new("alu"),
            Arc::new(MessageQueue::with_priority("alu", crate::timestamp_priority(), Some(1))),
        ))
        .unwrap();
        let mut set = ConnectionSet::new("cpu");
        let msg = || Message::new(ComponentId::new("cpu"), "get", ctx());

        let err = set.message_entity("ghost", msg(), &dir).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_ENTITY_NOT_FOUND");
        let err = set.message_entity("alu", msg(), &dir).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_NOT_CONNECTED");

        set.connect("alu", &ctx(), &dir).unwrap();
        set.message_entity("alu", msg(), &dir).unwrap();
        let err = set.message_entity("alu", msg(), &dir).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_QUEUE_FULL");
        assert_eq!(dir.lookup("alu").unwrap().queue().len(), 1);
    }

    #[test]
    fn frozen_criteria() {
        let mut set = ConnectionSet::with_criteria(
            "cpu",
            EntityCriteria::never(),
            false,
            EntityCriteria::never(),
            false,
        );
        let err = set.modify_connection_criteria(EntityCriteria::always()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_PERMISSION_LOCKED");
        let err = set.modify_disconnection_criteria(EntityCriteria::always()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_PERMISSION_LOCKED");
        assert_eq!(set.connection_criteria().label(), "never");
    }

    #[test]
    fn message_entity_requires_connection() {
        let dir = directory(&["mem"]);
        let mut set = ConnectionSet::new("cpu");
        let msg = || Message::new(ComponentId::new("cpu"), "get", ctx());

        let err = set.message_entity("ghost", msg(), &dir).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_ENTITY_NOT_FOUND");
        let err = set.message_entity("mem", msg(), &dir).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_NOT_CONNECTED");

        set.connect("mem", &ctx(), &dir).unwrap();
        set.message_entity("mem", msg(), &dir).unwrap();
        assert_eq!(dir.lookup("mem").unwrap().queue().len(), 1);
    }
}
