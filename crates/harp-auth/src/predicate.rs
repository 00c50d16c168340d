//! Access predicates.
//!
//! [`Predicate`] and [`EntityCriteria`] are cheaply clonable handles to
//! shared closures. Each carries a label used only for `Debug` output
//! and logs, so a policy can be identified without calling it.

use crate::Context;
use harp_types::Principal;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

type ContextFn = dyn Fn(&Context) -> bool + Send + Sync;
type EntityFn = dyn Fn(&str, &Context) -> bool + Send + Sync;

/// A gate over a [`Context`].
///
/// # Example
///
/// ```
/// use harp_auth::{Context, Predicate};
///
/// let cleared = Predicate::flag("cleared");
/// let ctx = Context::system().with_attr("cleared", true);
///
/// assert!(cleared.check(&ctx));
/// assert!(!cleared.check(&Context::system()));
/// assert!(Predicate::always().check(&Context::system()));
/// assert!(!Predicate::never().check(&ctx));
/// ```
#[derive(Clone)]
pub struct Predicate {
    inner: Arc<ContextFn>,
    label: Cow<'static, str>,
}

impl Predicate {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        Self::labeled("custom", f)
    }

    /// Wraps a closure with a descriptive label.
    pub fn labeled<F>(label: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(f),
            label: label.into(),
        }
    }

    /// Always passes.
    #[must_use]
    pub fn always() -> Self {
        Self::labeled("always", |_| true)
    }

    /// Never passes.
    #[must_use]
    pub fn never() -> Self {
        Self::labeled("never", |_| false)
    }

    /// Passes when the context attribute `attr` is `true`.
    #[must_use]
    pub fn flag(attr: impl Into<String>) -> Self {
        let attr = attr.into();
        let label = format!("flag:{attr}");
        Self::labeled(label, move |ctx| ctx.flag(&attr))
    }

    /// Passes when the context was issued by exactly `principal`.
    #[must_use]
    pub fn principal(principal: Principal) -> Self {
        let label = format!("principal:{principal}");
        Self::labeled(label, move |ctx| ctx.principal() == &principal)
    }

    /// Passes when both predicates pass.
    #[must_use]
    pub fn and(&self, other: &Predicate) -> Self {
        let (a, b) = (self.clone(), other.clone());
        let label = format!("({} && {})", a.label, b.label);
        Self::labeled(label, move |ctx| a.check(ctx) && b.check(ctx))
    }

    /// Passes when either predicate passes.
    #[must_use]
    pub fn or(&self, other: &Predicate) -> Self {
        let (a, b) = (self.clone(), other.clone());
        let label = format!("({} || {})", a.label, b.label);
        Self::labeled(label, move |ctx| a.check(ctx) || b.check(ctx))
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn check(&self, ctx: &Context) -> bool {
        (self.inner)(ctx)
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self.label)
    }
}

/// A gate over an entity name and a [`Context`].
///
/// Used for connection and disconnection criteria in the connection
/// graph.
///
/// # Example
///
/// ```
/// use harp_auth::{Context, EntityCriteria};
///
/// let only_mem = EntityCriteria::allow_list(["mem"]);
/// assert!(only_mem.check("mem", &Context::system()));
/// assert!(!only_mem.check("alu", &Context::system()));
/// ```
#[derive(Clone)]
pub struct EntityCriteria {
    inner: Arc<EntityFn>,
    label: Cow<'static, str>,
}

impl EntityCriteria {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &Context) -> bool + Send + Sync + 'static,
    {
        Self::labeled("custom", f)
    }

    /// Wraps a closure with a descriptive label.
    pub fn labeled<F>(label: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&str, &Context) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(f),
            label: label.into(),
        }
    }

    /// Always passes.
    #[must_use]
    pub fn always() -> Self {
        Self::labeled("always", |_, _| true)
    }

    /// Never passes.
    #[must_use]
    pub fn never() -> Self {
        Self::labeled("never", |_, _| false)
    }

    /// Passes for the listed entity names, whatever the context.
    #[must_use]
    pub fn allow_list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        Self::labeled("allow_list", move |entity, _| names.contains(entity))
    }

    /// Ignores the entity name and evaluates `predicate` on the context.
    #[must_use]
    pub fn from_predicate(predicate: Predicate) -> Self {
        let label = format!("context:{}", predicate.label());
        Self::labeled(label, move |_, ctx| predicate.check(ctx))
    }

    /// Evaluates the criteria.
    #[must_use]
    pub fn check(&self, entity: &str, ctx: &Context) -> bool {
        (self.inner)(entity, ctx)
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for EntityCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityCriteria({})", self.label)
    }
}
