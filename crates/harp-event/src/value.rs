//! Register values.

use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

type CallableFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// An invocable register value.
///
/// # Example
///
/// ```
/// use harp_event::Callable;
/// use serde_json::json;
///
/// let add = Callable::labeled("add", |args| {
///     json!(args.iter().filter_map(|a| a.as_i64()).sum::<i64>())
/// });
/// assert_eq!(add.call(&[json!(2), json!(40)]), json!(42));
/// ```
#[derive(Clone)]
pub struct Callable {
    inner: Arc<CallableFn>,
    label: Cow<'static, str>,
}

impl Callable {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self::labeled("callable", f)
    }

    /// Wraps a closure with a descriptive label.
    pub fn labeled<F>(label: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(f),
            label: label.into(),
        }
    }

    /// Invokes the callable.
    #[must_use]
    pub fn call(&self, args: &[Value]) -> Value {
        (self.inner)(args)
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self.label)
    }
}

/// The value held by a register.
///
/// Registers hold either plain JSON data or a [`Callable`]. Only
/// callables can be invoked by `eval`.
///
/// Equality compares data by value and callables by identity.
#[derive(Debug, Clone)]
pub enum RegisterValue {
    /// Plain data.
    Data(Value),
    /// Invocable value.
    Callable(Callable),
}

impl RegisterValue {
    /// Returns the data, or `None` for a callable.
    #[must_use]
    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Self::Data(v) => Some(v),
            Self::Callable(_) => None,
        }
    }

    /// Returns the callable, or `None` for data.
    #[must_use]
    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Self::Callable(c) => Some(c),
            Self::Data(_) => None,
        }
    }

    /// Returns `true` for a callable.
    #[must_use]
    pub fn is_invocable(&self) -> bool {
        matches!(self, Self::Callable(_))
    }

    /// Consumes the value, returning the data if it is data.
    #[must_use]
    pub fn into_data(self) -> Option<Value> {
        match self {
            Self::Data(v) => Some(v),
            Self::Callable(_) => None,
        }
    }
}

impl PartialEq for RegisterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Data(a), Self::Data(b)) => a == b,
            (Self::Callable(a), Self::Callable(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            _ => false,
        }
    }
}

impl From<Value> for RegisterValue {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

impl From<Callable> for RegisterValue {
    fn from(callable: Callable) -> Self {
        Self::Callable(callable)
    }
}
