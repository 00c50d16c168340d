//! Fixtures for exercising components.
//!
//! [`Profile`] captures a whole security posture (criteria, permission
//! table, register policy) so a test can say "a strict component" in one
//! word. [`TestBench`] owns a directory and builds named components
//! against it.
//!
//! | Profile | Criteria | API permissions | `api_mutable` | Register policy |
//! |---------|----------|-----------------|---------------|-----------------|
//! | `Permissive` | allow all, mutable | always | always | always / always, mutable |
//! | `Strict` | deny all, frozen | never | never | never / never, immutable |
//! | `Gated` | `flag:status`, mutable | `flag:status` | `flag:status` | `flag:status`, immutable |
//!
//! # Example
//!
//! ```
//! use harp_runtime::testing::{Profile, TestBench};
//!
//! let bench = TestBench::new();
//! let mut strict = bench.component("vault", Profile::Strict).unwrap();
//! let msg = bench.message(&strict, "get").with_key("k").with_context(bench.context());
//!
//! assert!(strict.execute_message(msg).is_err());
//! ```

use crate::dispatch::BUILTIN_OPERATIONS;
use crate::{Component, ComponentBuilder, Directory};
use harp_auth::{Context, EntityCriteria, Predicate};
use harp_component::ComponentError;
use harp_event::{Message, RegisterValue};
use std::sync::Arc;

/// Context attribute consulted by [`Profile::Gated`].
pub const GATE_ATTR: &str = "status";

/// A canned security posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Everything allowed, everything mutable.
    Permissive,
    /// Everything denied, everything frozen.
    Strict,
    /// Allowed only when the context carries `status = true`.
    Gated,
}

impl Profile {
    fn gate(self) -> Predicate {
        match self {
            Self::Permissive => Predicate::always(),
            Self::Strict => Predicate::never(),
            Self::Gated => Predicate::flag(GATE_ATTR),
        }
    }

    fn criteria(self) -> (EntityCriteria, bool) {
        match self {
            Self::Permissive => (EntityCriteria::always(), true),
            Self::Strict => (EntityCriteria::never(), false),
            Self::Gated => (EntityCriteria::from_predicate(self.gate()), true),
        }
    }

    /// A builder preconfigured for this profile.
    pub fn builder(self, name: impl Into<String>) -> ComponentBuilder {
        let builder = ComponentBuilder::new(name);
        let (connect, connect_mut) = self.criteria();
        let (disconnect, disconnect_mut) = self.criteria();
        let builder = builder
            .connection_criteria(connect, connect_mut)
            .disconnection_criteria(disconnect, disconnect_mut)
            .api_mutable(self.gate());

        match self {
            Self::Permissive => builder,
            Self::Strict | Self::Gated => {
                builder.permissions(BUILTIN_OPERATIONS, &self.gate())
            }
        }
    }

    /// Accessor for registers created under this profile.
    #[must_use]
    pub fn accessor(self) -> Predicate {
        self.gate()
    }

    /// Mutator for registers created under this profile.
    #[must_use]
    pub fn mutator(self) -> Predicate {
        self.gate()
    }

    /// Whether registers created under this profile are frozen.
    #[must_use]
    pub fn immutable(self) -> bool {
        !matches!(self, Self::Permissive)
    }

    /// Adds a register with this profile's policy.
    ///
    /// # Errors
    ///
    /// `KeyAlreadyExists`.
    pub fn add_register(
        self,
        component: &mut Component,
        key: &str,
        value: impl Into<RegisterValue>,
    ) -> Result<(), ComponentError> {
        component.add(key, self.accessor(), self.mutator(), self.immutable(), value)
    }
}

/// A directory plus helpers for building components and messages.
#[derive(Debug, Clone, Default)]
pub struct TestBench {
    directory: Arc<Directory>,
}

impl TestBench {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// Builds a component with the given profile.
    ///
    /// # Errors
    ///
    /// `EntityAlreadyRegistered` if the name is taken.
    pub fn component(&self, name: &str, profile: Profile) -> Result<Component, ComponentError> {
        profile.builder(name).build(&self.directory)
    }

    /// Builds a component from a custom builder.
    ///
    /// # Errors
    ///
    /// Whatever [`ComponentBuilder::build`] returns.
    pub fn build(&self, builder: ComponentBuilder) -> Result<Component, ComponentError> {
        builder.build(&self.directory)
    }

    /// A system context.
    #[must_use]
    pub fn context(&self) -> Context {
        Context::system()
    }

    /// A context that opens [`Profile::Gated`] components.
    #[must_use]
    pub fn gated_context(&self) -> Context {
        Context::system().with_attr(GATE_ATTR, true)
    }

    /// A message from `source` requesting `operation` under a system context.
    #[must_use]
    pub fn message(&self, source: &Component, operation: &str) -> Message {
        Message::new(source.id().clone(), operation, self.context())
    }
}
