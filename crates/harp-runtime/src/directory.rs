//! Process-wide component directory.
//!
//! The directory maps a component name to its [`ComponentHandle`]. It is
//! created once by the embedder, wrapped in an `Arc`, and injected into
//! every component at construction. Names are write-once: there is no
//! removal and no replacement.
//!
//! ```text
//! Arc<Directory>
//!   ├── "cpu" ──▶ ComponentHandle { id, queue: Arc<MessageQueue> }
//!   ├── "mem" ──▶ ComponentHandle { .. }
//!   └── "alu" ──▶ ComponentHandle { .. }
//! ```
//!
//! Lookups clone the handle out, so no directory lock is held while a
//! message is pushed into a target queue.

use crate::MessageQueue;
use harp_component::ComponentError;
use harp_event::Message;
use harp_types::ComponentId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Addressable reference to a component's inbox.
#[derive(Debug, Clone)]
pub struct ComponentHandle {
    id: ComponentId,
    queue: Arc<MessageQueue>,
}

impl ComponentHandle {
    pub fn new(id: ComponentId, queue: Arc<MessageQueue>) -> Self {
        Self { id, queue }
    }

    #[must_use]
    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    #[must_use]
    pub fn queue(&self) -> &Arc<MessageQueue> {
        &self.queue
    }

    /// Pushes a message into the component's queue.
    ///
    /// # Errors
    ///
    /// `QueueFull` from a bounded queue.
    pub fn push_message(&self, message: Message) -> Result<(), ComponentError> {
        self.queue.push_message(message)
    }
}

/// Name-unique registry of component handles.
#[derive(Debug, Default)]
pub struct Directory {
    entries: RwLock<HashMap<String, ComponentHandle>>,
}

impl Directory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty directory ready to be shared.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Registers a handle under its component name.
    ///
    /// # Errors
    ///
    /// `EntityAlreadyRegistered` if the name is taken.
    pub fn register(&self, handle: ComponentHandle) -> Result<(), ComponentError> {
        let mut entries = self.entries.write();
        let name = handle.name().to_string();
        if entries.contains_key(&name) {
            return Err(ComponentError::EntityAlreadyRegistered { component: name });
        }
        info!(component = %name, id = %handle.id(), "registered in directory");
        entries.insert(name, handle);
        Ok(())
    }

    /// Returns a clone of the named handle.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ComponentHandle> {
        self.entries.read().get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
