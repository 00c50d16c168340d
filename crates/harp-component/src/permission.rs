//! API permission table.
//!
//! Every exposed operation has exactly one gating [`Predicate`]. The
//! table is seeded from the exposed operation names at construction:
//!
//! - names with no supplied predicate default to [`Predicate::always`]
//! - supplied predicates for names that are not exposed are dropped
//!
//! After construction the key set never changes. Only the predicate for
//! an existing name can be replaced, and only when `api_mutable` accepts
//! the caller's context.

use crate::ComponentError;
use harp_auth::{Context, Predicate};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Per-component mapping from operation name to access predicate.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    owner: String,
    entries: BTreeMap<String, Predicate>,
    api_mutable: Predicate,
}

impl PermissionTable {
    /// Seeds a table covering exactly `exposed`.
    pub fn new<I, S>(
        owner: impl Into<String>,
        exposed: I,
        mut initial: HashMap<String, Predicate>,
        api_mutable: Predicate,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owner = owner.into();
        let entries: BTreeMap<String, Predicate> = exposed
            .into_iter()
            .map(Into::into)
            .map(|name: String| {
                let pred = initial.remove(&name).unwrap_or_else(Predicate::always);
                (name, pred)
            })
            .collect();

        for (name, pred) in &initial {
            warn!(
                component = %owner,
                operation = %name,
                predicate = pred.label(),
                "dropping permission for operation that is not exposed"
            );
        }

        Self {
            owner,
            entries,
            api_mutable,
        }
    }

    /// Checks that `operation` is exposed and that `ctx` may call it.
    ///
    /// # Errors
    ///
    /// `OperationNotFound` or `PermissionDenied`.
    pub fn is_permitted(&self, operation: &str, ctx: &Context) -> Result<(), ComponentError> {
        let pred = self.predicate(operation)?;
        if pred.check(ctx) {
            Ok(())
        } else {
            Err(ComponentError::PermissionDenied {
                component: self.owner.clone(),
                operation: operation.to_string(),
            })
        }
    }

    /// Replaces the predicate gating one operation.
    ///
    /// # Errors
    ///
    /// `OperationNotFound` if `operation` is not exposed,
    /// `PermissionLocked` if `api_mutable` rejects `ctx`.
    pub fn modify_api_permission(
        &mut self,
        operation: &str,
        predicate: Predicate,
        ctx: &Context,
    ) -> Result<(), ComponentError> {
        self.predicate(operation)?;
        if !self.api_mutable.check(ctx) {
            return Err(ComponentError::PermissionLocked {
                component: self.owner.clone(),
                target: format!("api_permission:{operation}"),
            });
        }
        self.entries.insert(operation.to_string(), predicate);
        Ok(())
    }

    fn predicate(&self, operation: &str) -> Result<&Predicate, ComponentError> {
        self.entries
            .get(operation)
            .ok_or_else(|| ComponentError::OperationNotFound {
                component: self.owner.clone(),
                operation: operation.to_string(),
            })
    }

    /// Gated operation names in sorted order.
    #[must_use]
    pub fn operations(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn contains(&self, operation: &str) -> bool {
        self.entries.contains_key(operation)
    }

    /// Label of the predicate gating `operation`.
    #[must_use]
    pub fn label(&self, operation: &str) -> Option<&str> {
        self.entries.get(operation).map(Predicate::label)
    }
}
