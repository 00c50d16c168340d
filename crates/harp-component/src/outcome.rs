//! Operation results.

use harp_event::RegisterValue;
use serde_json::Value;

/// What a successfully dispatched operation produced.
///
/// Mutating operations return [`Outcome::Done`]; `get` and `eval`
/// return [`Outcome::Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The operation completed with nothing to report.
    Done,
    /// The operation produced a value.
    Value(RegisterValue),
}

impl Outcome {
    /// Returns the produced value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&RegisterValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Done => None,
        }
    }

    /// Returns the produced value when it is plain data.
    #[must_use]
    pub fn as_data(&self) -> Option<&Value> {
        self.value().and_then(RegisterValue::as_data)
    }

    /// Consumes the outcome, returning the produced value.
    #[must_use]
    pub fn into_value(self) -> Option<RegisterValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Done => None,
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl From<RegisterValue> for Outcome {
    fn from(value: RegisterValue) -> Self {
        Self::Value(value)
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self::Value(RegisterValue::Data(value))
    }
}

impl From<()> for Outcome {
    fn from((): ()) -> Self {
        Self::Done
    }
}
