//! Flag provider capability traits and the built-in adapters.
//!
//! The store never owns or copies a flag's value. It holds a shared
//! reference to something implementing [`FlagValue`] and re-reads it on
//! every lookup, so a mutation made by the flag system after binding is
//! visible on the next `get` without re-binding.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Capability interface for a single bound flag-like value.
///
/// Any flag library can participate by implementing this trait. Reads must
/// be side-effect-free; thread-safety of the underlying value is the flag
/// system's responsibility.
pub trait FlagValue: Send + Sync {
    /// Whether the value was explicitly set by the caller, as opposed to
    /// still holding only its declared default.
    fn has_changed(&self) -> bool;

    /// The current string representation of the value.
    fn value_str(&self) -> String;

    /// The declared type tag (`"string"`, `"string_slice"`, `"bool"`,
    /// `"int"`, `"float"`, `"duration"`, ...). Unrecognized tags decode as
    /// plain strings.
    fn value_type(&self) -> String;

    /// The string representation of the declared default.
    fn default_str(&self) -> String;
}

/// Capability interface for a collection of flags.
pub trait FlagValueSet {
    /// Visit every flag in the collection, including flags that were never
    /// explicitly set.
    fn visit_all(&self, visit: &mut dyn FnMut(&str, Arc<dyn FlagValue>));
}

#[derive(Debug)]
struct FlagState {
    value: String,
    changed: bool,
}

/// A named, externally-mutable flag cell.
///
/// This is the built-in single-flag adapter: the flag system (or a test)
/// owns an `Arc<Flag>`, mutates it through [`Flag::set_value`] and
/// [`Flag::mark_changed`], and the store observes it live. The changed bit
/// is monotonic; there is no way back to the unchanged state.
#[derive(Debug)]
pub struct Flag {
    name: String,
    value_type: String,
    default: String,
    state: Mutex<FlagState>,
}

impl Flag {
    /// Create a flag holding its default value, not yet changed.
    pub fn new(
        name: impl Into<String>,
        default: impl Into<String>,
        value_type: impl Into<String>,
    ) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            value_type: value_type.into(),
            state: Mutex::new(FlagState {
                value: default.clone(),
                changed: false,
            }),
            default,
        }
    }

    /// The flag's declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the current value without touching the changed bit.
    pub fn set_value(&self, value: impl Into<String>) {
        self.state().value = value.into();
    }

    /// Mark the flag as explicitly set. Monotonic.
    pub fn mark_changed(&self) {
        self.state().changed = true;
    }

    /// Replace the current value and mark the flag as explicitly set, the
    /// way a flag system records a parsed occurrence.
    pub fn set(&self, value: impl Into<String>) {
        let mut state = self.state();
        state.value = value.into();
        state.changed = true;
    }

    fn state(&self) -> MutexGuard<'_, FlagState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FlagValue for Flag {
    fn has_changed(&self) -> bool {
        self.state().changed
    }

    fn value_str(&self) -> String {
        self.state().value.clone()
    }

    fn value_type(&self) -> String {
        self.value_type.clone()
    }

    fn default_str(&self) -> String {
        self.default.clone()
    }
}

/// An ordered collection of [`Flag`]s, the built-in collection adapter.
#[derive(Debug, Default)]
pub struct FlagSet {
    flags: indexmap::IndexMap<String, Arc<Flag>>,
}

impl FlagSet {
    /// Create an empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flag, returning the shared handle the flag system keeps for
    /// later mutation. A flag with the same name replaces the previous one.
    pub fn add(&mut self, flag: Flag) -> Arc<Flag> {
        let flag = Arc::new(flag);
        self.flags.insert(flag.name().to_string(), Arc::clone(&flag));
        flag
    }

    /// Look up a flag by its declared name.
    pub fn lookup(&self, name: &str) -> Option<Arc<Flag>> {
        self.flags.get(name).cloned()
    }

    /// Number of flags in the set.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether the set contains no flags.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FlagValueSet for FlagSet {
    fn visit_all(&self, visit: &mut dyn FnMut(&str, Arc<dyn FlagValue>)) {
        for (name, flag) in &self.flags {
            visit(name, Arc::clone(flag) as Arc<dyn FlagValue>);
        }
    }
}
