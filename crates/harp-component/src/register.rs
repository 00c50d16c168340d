//! Capability-gated register store.
//!
//! A register is one keyed slot holding a [`RegisterValue`] together with
//! the policy that guards it:
//!
//! ```text
//! key ──▶ Register { value, accessor, mutator, immutable }
//!                      │        │         │         │
//!                      │   gates get/eval │    freezes policy
//!                      │             gates update/delete
//!                      └── replaced by update
//! ```
//!
//! The four parts live in a single record, so a key either has all of
//! them or none.
//!
//! # Check order
//!
//! | Operation | Failure order |
//! |-----------|---------------|
//! | `get` | `KeyNotFound`, `AccessDenied` |
//! | `eval` | `KeyNotFound`, `NotInvocable`, `AccessDenied` |
//! | `update` | `KeyNotFound`, `AccessDenied` |
//! | `delete` | `KeyNotFound`, `ImmutableRegister`, `AccessDenied` |
//! | `add` | `KeyAlreadyExists` |
//! | `modify_accessor` / `modify_mutator` | `KeyNotFound`, `ImmutableRegister` |

use crate::ComponentError;
use harp_auth::{Context, Predicate};
use harp_event::RegisterValue;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct Register {
    value: RegisterValue,
    accessor: Predicate,
    mutator: Predicate,
    immutable: bool,
}

/// Registers owned by one component.
///
/// # Example
///
/// ```
/// use harp_auth::{Context, Predicate};
/// use harp_component::RegisterStore;
/// use serde_json::json;
///
/// let mut store = RegisterStore::new("mem");
/// store
///     .add("x", Predicate::always(), Predicate::never(), false, json!(5))
///     .unwrap();
///
/// let ctx = Context::system();
/// assert_eq!(store.get("x", &ctx).unwrap().as_data(), Some(&json!(5)));
/// assert!(store.update("x", json!(6), &ctx).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RegisterStore {
    owner: String,
    registers: HashMap<String, Register>,
}

impl RegisterStore {
    /// Creates an empty store owned by the named component.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            registers: HashMap::new(),
        }
    }

    /// Name of the owning component, used in errors.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn entry(&self, key: &str) -> Result<&Register, ComponentError> {
        self.registers
            .get(key)
            .ok_or_else(|| ComponentError::KeyNotFound {
                component: self.owner.clone(),
                key: key.to_string(),
            })
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut Register, ComponentError> {
        let owner = &self.owner;
        self.registers
            .get_mut(key)
            .ok_or_else(|| ComponentError::KeyNotFound {
                component: owner.clone(),
                key: key.to_string(),
            })
    }

    fn access_denied(&self, key: &str) -> ComponentError {
        ComponentError::AccessDenied {
            component: self.owner.clone(),
            key: key.to_string(),
        }
    }

    fn immutable(&self, key: &str) -> ComponentError {
        ComponentError::ImmutableRegister {
            component: self.owner.clone(),
            key: key.to_string(),
        }
    }

    /// Reads a register.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if absent, `AccessDenied` if the accessor rejects `ctx`.
    pub fn get(&self, key: &str, ctx: &Context) -> Result<RegisterValue, ComponentError> {
        let reg = self.entry(key)?;
        if !reg.accessor.check(ctx) {
            return Err(self.access_denied(key));
        }
        Ok(reg.value.clone())
    }

    /// Invokes a callable register with positional arguments.
    ///
    /// # Errors
    ///
    /// `KeyNotFound`, `NotInvocable`, `AccessDenied`, checked in that order.
    pub fn eval(&self, key: &str, ctx: &Context, args: &[Value]) -> Result<Value, ComponentError> {
        let reg = self.entry(key)?;
        let Some(callable) = reg.value.as_callable() else {
            return Err(ComponentError::NotInvocable {
                component: self.owner.clone(),
                key: key.to_string(),
            });
        };
        if !reg.accessor.check(ctx) {
            return Err(self.access_denied(key));
        }
        Ok(callable.call(args))
    }

    /// Replaces a register's value.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if absent, `AccessDenied` if the mutator rejects `ctx`.
    pub fn update(
        &mut self,
        key: &str,
        value: impl Into<RegisterValue>,
        ctx: &Context,
    ) -> Result<(), ComponentError> {
        if !self.entry(key)?.mutator.check(ctx) {
            return Err(self.access_denied(key));
        }
        self.entry_mut(key)?.value = value.into();
        Ok(())
    }

    /// Removes a register entirely.
    ///
    /// An immutable register can never be deleted, whatever its mutator says.
    ///
    /// # Errors
    ///
    /// `KeyNotFound`, `ImmutableRegister`, `AccessDenied`, in that order.
    pub fn delete(&mut self, key: &str, ctx: &Context) -> Result<(), ComponentError> {
        let reg = self.entry(key)?;
        if reg.immutable {
            return Err(self.immutable(key));
        }
        if !reg.mutator.check(ctx) {
            return Err(self.access_denied(key));
        }
        self.registers.remove(key);
        debug!(component = %self.owner, key, "register deleted");
        Ok(())
    }

    /// Creates a register.
    ///
    /// # Errors
    ///
    /// `KeyAlreadyExists` if `key` is taken; the existing register is
    /// left untouched.
    pub fn add(
        &mut self,
        key: impl Into<String>,
        accessor: Predicate,
        mutator: Predicate,
        immutable: bool,
        value: impl Into<RegisterValue>,
    ) -> Result<(), ComponentError> {
        let key = key.into();
        if self.registers.contains_key(&key) {
            return Err(ComponentError::KeyAlreadyExists {
                component: self.owner.clone(),
                key,
            });
        }
        debug!(
            component = %self.owner,
            key = %key,
            accessor = accessor.label(),
            mutator = mutator.label(),
            immutable,
            "register added"
        );
        self.registers.insert(
            key,
            Register {
                value: value.into(),
                accessor,
                mutator,
                immutable,
            },
        );
        Ok(())
    }

    /// Replaces the accessor of a mutable register.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if absent, `ImmutableRegister` if frozen.
    pub fn modify_accessor(&mut self, key: &str, accessor: Predicate) -> Result<(), ComponentError> {
        if self.entry(key)?.immutable {
            return Err(self.immutable(key));
        }
        self.entry_mut(key)?.accessor = accessor;
        Ok(())
    }

    /// Replaces the mutator of a mutable register.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if absent, `ImmutableRegister` if frozen.
    pub fn modify_mutator(&mut self, key: &str, mutator: Predicate) -> Result<(), ComponentError> {
        if self.entry(key)?.immutable {
            return Err(self.immutable(key));
        }
        self.entry_mut(key)?.mutator = mutator;
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.registers.contains_key(key)
    }

    /// Register keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.registers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Returns `Some(true)` for a frozen register, `None` if absent.
    #[must_use]
    pub fn is_immutable(&self, key: &str) -> Option<bool> {
        self.registers.get(key).map(|r| r.immutable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harp_event::Callable;
    use harp_types::ErrorCode;
    use proptest::prelude::*;
    use serde_json::json;

    fn ctx() -> Context {
        Context::system()
    }

    fn open_store() -> RegisterStore {
        let mut store = RegisterStore::new("mem");
        store
            .add("x", Predicate::always(), Predicate::always(), false, json!(1))
            .unwrap();
        store
    }

    #[test]
    fn get_missing_key() {
        let store = RegisterStore::new("mem");
        let err = store.get("nope", &ctx()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_KEY_NOT_FOUND");
        assert_eq!(err.component(), "mem");
    }

    #[test]
    fn get_denied_by_accessor() {
        let mut store = RegisterStore::new("mem");
        store
            .add("secret", Predicate::flag("cleared"), Predicate::always(), false, json!("s"))
            .unwrap();

        assert!(matches!(
            store.get("secret", &ctx()),
            Err(ComponentError::AccessDenied { .. })
        ));
        let cleared = ctx().with_attr("cleared", true);
        assert_eq!(store.get("secret", &cleared).unwrap().as_data(), Some(&json!("s")));
    }

    #[test]
    fn update_checks_mutator() {
        let mut store = RegisterStore::new("mem");
        store
            .add("ro", Predicate::always(), Predicate::never(), false, json!(1))
            .unwrap();

        let err = store.update("ro", json!(2), &ctx()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_ACCESS_DENIED");
        assert_eq!(store.get("ro", &ctx()).unwrap().as_data(), Some(&json!(1)));

        let err = store.update("missing", json!(2), &ctx()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_KEY_NOT_FOUND");
    }

    #[test]
    fn update_replaces_value() {
        let mut store = open_store();
        store.update("x", json!({"a": 1}), &ctx()).unwrap();
        assert_eq!(store.get("x", &ctx()).unwrap().as_data(), Some(&json!({"a": 1})));
    }

    #[test]
    fn duplicate_add_keeps_original() {
        let mut store = open_store();
        let err = store
            .add("x", Predicate::never(), Predicate::never(), true, json!(99))
            .unwrap_err();
        assert_eq!(err.code(), "COMPONENT_KEY_ALREADY_EXISTS");
        assert_eq!(store.get("x", &ctx()).unwrap().as_data(), Some(&json!(1)));
        assert_eq!(store.is_immutable("x"), Some(false));
    }

    #[test]
    fn immutable_register_resists_delete_and_policy_change() {
        let mut store = RegisterStore::new("mem");
        store
            .add("pc", Predicate::always(), Predicate::always(), true, json!(0))
            .unwrap();

        let err = store.delete("pc", &ctx()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_IMMUTABLE_REGISTER");
        let err = store.modify_accessor("pc", Predicate::never()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_IMMUTABLE_REGISTER");
        let err = store.modify_mutator("pc", Predicate::never()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_IMMUTABLE_REGISTER");

        // value stays writable through the mutator
        store.update("pc", json!(4), &ctx()).unwrap();
        assert_eq!(store.get("pc", &ctx()).unwrap().as_data(), Some(&json!(4)));
    }

    #[test]
    fn delete_requires_mutator() {
        let mut store = RegisterStore::new("mem");
        store
            .add("x", Predicate::always(), Predicate::never(), false, json!(0))
            .unwrap();
        let err = store.delete("x", &ctx()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_ACCESS_DENIED");
        assert!(store.contains("x"));
    }

    #[test]
    fn delete_removes_everything() {
        let mut store = open_store();
        store.delete("x", &ctx()).unwrap();
        assert!(!store.contains("x"));
        assert!(store.is_empty());
        assert_eq!(store.is_immutable("x"), None);

        let err = store.delete("x", &ctx()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_KEY_NOT_FOUND");

        // the key is free again
        store
            .add("x", Predicate::never(), Predicate::never(), true, json!(2))
            .unwrap();
        assert_eq!(store.is_immutable("x"), Some(true));
    }

    #[test]
    fn modify_policies() {
        let mut store = open_store();
        store.modify_accessor("x", Predicate::never()).unwrap();
        assert!(store.get("x", &ctx()).is_err());

        store.modify_mutator("x", Predicate::never()).unwrap();
        assert!(store.update("x", json!(3), &ctx()).is_err());

        let err = store.modify_mutator("missing", Predicate::never()).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_KEY_NOT_FOUND");
    }

    #[test]
    fn eval_check_order() {
        let mut store = RegisterStore::new("alu");
        let sum = Callable::labeled("sum", |args| {
            json!(args.iter().filter_map(Value::as_i64).sum::<i64>())
        });
        store
            .add("sum", Predicate::flag("exec"), Predicate::never(), true, sum)
            .unwrap();
        store
            .add("data", Predicate::never(), Predicate::never(), false, json!(1))
            .unwrap();

        let err = store.eval("missing", &ctx(), &[]).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_KEY_NOT_FOUND");

        // NotInvocable wins over AccessDenied
        let err = store.eval("data", &ctx(), &[]).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_NOT_INVOCABLE");

        let err = store.eval("sum", &ctx(), &[json!(1)]).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_ACCESS_DENIED");

        let exec = ctx().with_attr("exec", true);
        let out = store.eval("sum", &exec, &[json!(2), json!(3)]).unwrap();
        assert_eq!(out, json!(5));
    }

    #[test]
    fn keys_sorted() {
        let mut store = RegisterStore::new("mem");
        for k in ["b", "c", "a"] {
            store
                .add(k, Predicate::always(), Predicate::always(), false, json!(null))
                .unwrap();
        }
        assert_eq!(store.keys(), vec!["a", "b", "c"]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.owner(), "mem");
    }

    proptest! {
        #[test]
        fn add_then_get_round_trips(key in "[a-z]{1,12}", n in any::<i64>()) {
            let mut store = RegisterStore::new("mem");
            store.add(key.clone(), Predicate::always(), Predicate::always(), false, json!(n)).unwrap();
            prop_assert_eq!(store.get(&key, &ctx()).unwrap(), RegisterValue::Data(json!(n)));
        }

        #[test]
        fn immutable_never_deletes(key in "[a-z]{1,12}", cleared in any::<bool>()) {
            let mut store = RegisterStore::new("mem");
            store.add(key.clone(), Predicate::always(), Predicate::always(), true, json!(0)).unwrap();
            let ctx = ctx().with_attr("cleared", cleared);
            let err = store.delete(&key, &ctx).unwrap_err();
            prop_assert_eq!(err.code(), "COMPONENT_IMMUTABLE_REGISTER");
            prop_assert!(store.contains(&key));
        }

        #[test]
        fn second_add_fails(key in "[a-z]{1,12}", a in any::<i32>(), b in any::<i32>()) {
            let mut store = RegisterStore::new("mem");
            store.add(key.clone(), Predicate::always(), Predicate::always(), false, json!(a)).unwrap();
            let err = store.add(key.clone(), Predicate::always(), Predicate::always(), false, json!(b)).unwrap_err();
            prop_assert_eq!(err.code(), "COMPONENT_KEY_ALREADY_EXISTS");
            prop_assert_eq!(store.get(&key, &ctx()).unwrap(), RegisterValue::Data(json!(a)));
        }
    }
}
