//! Caller context.

use harp_types::{Principal, PrincipalId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The caller-supplied context every predicate is evaluated against.
///
/// A Context is an immutable value combining:
///
/// - **Who**: the [`Principal`] on whose behalf the call is made
/// - **Attributes**: arbitrary JSON facts the predicates may inspect
///   (clearance levels, status flags, hashes, ...)
///
/// The runtime never interprets attributes; only predicates do.
///
/// # Example
///
/// ```
/// use harp_auth::Context;
/// use serde_json::json;
///
/// let ctx = Context::system()
///     .with_attr("status", true)
///     .with_attr("level", 3);
///
/// assert!(ctx.flag("status"));
/// assert_eq!(ctx.attr("level"), Some(&json!(3)));
/// assert!(!ctx.flag("missing"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    principal: Principal,
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl Context {
    /// Creates a context with no attributes.
    #[must_use]
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            attributes: Map::new(),
        }
    }

    /// Creates a context acting as the embedding application.
    #[must_use]
    pub fn system() -> Self {
        Self::new(Principal::System)
    }

    /// Creates a context for a fresh external user.
    #[must_use]
    pub fn user() -> Self {
        Self::new(Principal::User(PrincipalId::new()))
    }

    /// Returns a copy of this context with one attribute set.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the principal.
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns one attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns `true` only if the attribute is present and is JSON `true`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.attributes.get(key), Some(Value::Bool(true)))
    }

    /// Returns all attributes.
    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}
