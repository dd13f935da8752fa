//! The tier store: one map per precedence layer and the resolution walk.
//!
//! Precedence, highest first: override, changed flag, env (explicit binding
//! then automatic), config-file tree, key/value-store tree, defaults, and
//! finally the declared default of a bound-but-unchanged flag. An unset flag
//! must not shadow an env or tree entry, which is why its default is only a
//! last resort.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::coerce;
use crate::env::{EnvSource, StdEnv};
use crate::flag::FlagValue;
use crate::key::{self, KEY_DELIMITER};
use crate::value::{self, Table, Value};

pub(crate) struct Store {
    pub(crate) overrides: Table,
    pub(crate) flags: IndexMap<String, Arc<dyn FlagValue>>,
    pub(crate) env_bindings: IndexMap<String, String>,
    pub(crate) file: Table,
    pub(crate) remote: Table,
    pub(crate) defaults: Table,
    pub(crate) aliases: IndexMap<String, String>,
    pub(crate) env_prefix: Option<String>,
    pub(crate) automatic_env: bool,
    pub(crate) env_source: Box<dyn EnvSource>,
}

impl Store {
    pub(crate) fn new() -> Self {
        Self {
            overrides: Table::default(),
            flags: IndexMap::new(),
            env_bindings: IndexMap::new(),
            file: Table::default(),
            remote: Table::default(),
            defaults: Table::default(),
            aliases: IndexMap::new(),
            env_prefix: None,
            automatic_env: false,
            env_source: Box::new(StdEnv),
        }
    }

    /// Follow the alias chain to the canonical key. The input must already
    /// be normalized; so are all registered aliases.
    pub(crate) fn resolve_alias(&self, mut key: String) -> String {
        let mut hops = 0;
        while let Some(target) = self.aliases.get(&key) {
            key = target.clone();
            hops += 1;
            if hops > self.aliases.len() {
                break;
            }
        }
        key
    }

    /// The variable name consulted by the automatic env lookup.
    pub(crate) fn env_var_name(&self, key: &str) -> String {
        let base = key.replace(KEY_DELIMITER, "_").to_uppercase();
        match &self.env_prefix {
            Some(prefix) if !prefix.is_empty() => {
                format!("{}_{base}", prefix.to_uppercase())
            }
            _ => base,
        }
    }

    /// Resolve a key through the precedence chain.
    ///
    /// Never errors; flag values are decoded per their declared type tag,
    /// degrading to the raw string when the tag does not fit.
    pub(crate) fn find(&self, raw_key: &str) -> Option<Value> {
        let key = self.resolve_alias(key::normalize(raw_key));
        let parts = key::split_path(&key);

        if let Some(v) = value::lookup_path(&self.overrides, &parts) {
            tracing::debug!(key = %key, tier = "override", "resolved");
            return Some(v.clone());
        }

        // An unchanged flag does not win here, but its declared default is
        // remembered as the candidate of last resort.
        let mut flag_default = None;
        if let Some(provider) = self.flags.get(&key) {
            let tag = provider.value_type();
            if provider.has_changed() {
                tracing::debug!(key = %key, tier = "flag", "resolved");
                return Some(coerce::decode_flag_value(&provider.value_str(), &tag));
            }
            flag_default = Some(coerce::decode_flag_value(&provider.default_str(), &tag));
        }

        if let Some(var) = self.env_bindings.get(&key) {
            if let Some(raw) = self.env_source.get(var) {
                tracing::debug!(key = %key, tier = "env", var = %var, "resolved");
                return Some(Value::String(raw));
            }
        }
        if self.automatic_env {
            let var = self.env_var_name(&key);
            if let Some(raw) = self.env_source.get(&var) {
                tracing::debug!(key = %key, tier = "env", var = %var, "resolved");
                return Some(Value::String(raw));
            }
        }

        if let Some(v) = value::lookup_path(&self.file, &parts) {
            tracing::debug!(key = %key, tier = "file", "resolved");
            return Some(v.clone());
        }

        if let Some(v) = value::lookup_path(&self.remote, &parts) {
            tracing::debug!(key = %key, tier = "remote", "resolved");
            return Some(v.clone());
        }

        if let Some(v) = value::lookup_path(&self.defaults, &parts) {
            tracing::debug!(key = %key, tier = "default", "resolved");
            return Some(v.clone());
        }

        if flag_default.is_some() {
            tracing::debug!(key = %key, tier = "flag-default", "resolved");
        }
        flag_default
    }

    /// Every key known to any tier, normalized, sorted.
    pub(crate) fn all_keys(&self) -> Vec<String> {
        let mut keys = IndexSet::new();
        value::collect_leaf_paths(&self.overrides, "", &mut keys);
        for k in self.flags.keys() {
            keys.insert(k.clone());
        }
        for k in self.env_bindings.keys() {
            keys.insert(k.clone());
        }
        value::collect_leaf_paths(&self.file, "", &mut keys);
        value::collect_leaf_paths(&self.remote, "", &mut keys);
        value::collect_leaf_paths(&self.defaults, "", &mut keys);

        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort();
        keys
    }
}
