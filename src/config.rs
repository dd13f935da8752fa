//! The public configuration instance.

use std::io;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::coerce;
use crate::de::{self, DecodeError};
use crate::dump;
use crate::env::EnvSource;
use crate::error::ConfigError;
use crate::flag::{Flag, FlagValue, FlagValueSet};
use crate::key;
use crate::store::Store;
use crate::value::{self, Table, Value};

/// A layered configuration instance.
///
/// Holds one map per precedence tier plus the set of bound flag providers,
/// and resolves `get` through the fixed tier order on every call. All
/// methods take `&self`; an internal lock serializes tier-map access so
/// binds and reads may interleave from arbitrary threads. Independently
/// constructed instances share no state with each other or with the
/// process-wide [`shared`](crate::shared) instance.
pub struct Config {
    store: RwLock<Store>,
}

impl Config {
    /// Create an empty configuration instance.
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Bind a single flag provider under `key`.
    ///
    /// The provider is held by reference, never copied: later mutations are
    /// visible on the next [`get`](Config::get). Re-binding a key replaces
    /// the previous provider (last bind wins).
    pub fn bind_flag_value(
        &self,
        key: &str,
        provider: Arc<dyn FlagValue>,
    ) -> Result<(), ConfigError> {
        let key = key::normalize(key);
        if key.is_empty() {
            return Err(ConfigError::invalid_provider("cannot bind an empty key"));
        }
        tracing::debug!(key = %key, value_type = %provider.value_type(), "bound flag provider");
        self.write().flags.insert(key, provider);
        Ok(())
    }

    /// Bind one concrete [`Flag`] under `key`.
    pub fn bind_flag(&self, key: &str, flag: &Arc<Flag>) -> Result<(), ConfigError> {
        self.bind_flag_value(key, Arc::clone(flag) as Arc<dyn FlagValue>)
    }

    /// Bind every flag in a collection, each under its own normalized name.
    ///
    /// All flags are visited, including ones never explicitly set, so that
    /// their declared defaults participate in resolution. Enumeration stops
    /// at the first invalid entry; keys bound before it stay bound.
    pub fn bind_flag_values(&self, collection: &dyn FlagValueSet) -> Result<(), ConfigError> {
        let mut result = Ok(());
        collection.visit_all(&mut |name, provider| {
            if result.is_ok() {
                result = self.bind_flag_value(name, provider);
            }
        });
        result
    }

    /// Bind every flag in a [`FlagSet`](crate::FlagSet).
    pub fn bind_flags(&self, flags: &dyn FlagValueSet) -> Result<(), ConfigError> {
        self.bind_flag_values(flags)
    }

    // ========================================================================
    // Writing tiers
    // ========================================================================

    /// Set an explicit override. Highest precedence, wins unconditionally.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let key = key::normalize(key);
        let mut store = self.write();
        value::insert_path(
            &mut store.overrides,
            &key::split_path(&key),
            value.into().normalize_keys(),
        );
    }

    /// Set a programmatic default. Lowest tier above a bound-but-unchanged
    /// flag's own default.
    pub fn set_default(&self, key: &str, value: impl Into<Value>) {
        let key = key::normalize(key);
        let mut store = self.write();
        value::insert_path(
            &mut store.defaults,
            &key::split_path(&key),
            value.into().normalize_keys(),
        );
    }

    /// Replace the config-file tier with a pre-parsed tree.
    ///
    /// This crate does not parse file formats; an external parser produces
    /// the tree. Keys are normalized recursively on ingestion.
    pub fn set_file_tree(&self, tree: Table) {
        self.write().file = value::normalize_table_keys(tree);
    }

    /// Replace the key/value-store tier with a pre-parsed tree.
    pub fn set_remote_tree(&self, tree: Table) {
        self.write().remote = value::normalize_table_keys(tree);
    }

    /// Register `alias` as another name for `key`. Aliases resolve
    /// transitively before any tier lookup.
    pub fn register_alias(&self, alias: &str, key: &str) {
        self.write()
            .aliases
            .insert(key::normalize(alias), key::normalize(key));
    }

    // ========================================================================
    // Environment tier
    // ========================================================================

    /// Set the prefix used to derive environment variable names.
    pub fn set_env_prefix(&self, prefix: &str) {
        self.write().env_prefix = Some(prefix.to_string());
    }

    /// Enable automatic environment lookup: any key resolves against the
    /// variable derived from the prefix and the key path.
    pub fn automatic_env(&self) {
        self.write().automatic_env = true;
    }

    /// Bind `key` to the environment variable derived from the current
    /// prefix (`database.port` with prefix `APP` reads `APP_DATABASE_PORT`).
    pub fn bind_env(&self, key: &str) {
        let key = key::normalize(key);
        let mut store = self.write();
        let var = store.env_var_name(&key);
        store.env_bindings.insert(key, var);
    }

    /// Bind `key` to a specific environment variable.
    pub fn bind_env_to(&self, key: &str, var: &str) {
        self.write()
            .env_bindings
            .insert(key::normalize(key), var.to_string());
    }

    /// Replace the environment source. The default reads the process
    /// environment; tests inject a [`MockEnv`](crate::MockEnv).
    pub fn set_env_source(&self, source: impl EnvSource + 'static) {
        self.write().env_source = Box::new(source);
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Resolve a key through the precedence chain.
    ///
    /// Returns `None` when no tier has the key. Never errors; typed reads
    /// go through the accessors below.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().find(key)
    }

    /// Whether any tier has the key.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn get_coerced<T>(
        &self,
        key: &str,
        expected: &'static str,
        convert: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => convert(&v)
                .map(Some)
                .ok_or_else(|| ConfigError::coercion(&key::normalize(key), &v, expected)),
        }
    }

    /// Resolve and coerce to a string.
    pub fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.get_coerced(key, "string", coerce::to_string)
    }

    /// Resolve and coerce to a boolean.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get_coerced(key, "boolean", coerce::to_bool)
    }

    /// Resolve and coerce to an integer.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        self.get_coerced(key, "integer", coerce::to_i64)
    }

    /// Resolve and coerce to a float.
    pub fn get_float(&self, key: &str) -> Result<Option<f64>, ConfigError> {
        self.get_coerced(key, "float", coerce::to_f64)
    }

    /// Resolve and coerce to a duration (`300ms`, `2.5s`, `1h30m`; bare
    /// integers count whole nanoseconds).
    pub fn get_duration(&self, key: &str) -> Result<Option<Duration>, ConfigError> {
        self.get_coerced(key, "duration", coerce::to_duration)
    }

    /// Resolve and coerce to a string sequence. Plain strings are parsed as
    /// one CSV line; the empty string is the empty sequence.
    pub fn get_string_slice(&self, key: &str) -> Result<Option<Vec<String>>, ConfigError> {
        self.get_coerced(key, "string sequence", coerce::to_string_slice)
    }

    /// Every key known to any tier, normalized and sorted.
    pub fn all_keys(&self) -> Vec<String> {
        self.read().all_keys()
    }

    /// Resolve every known key through the precedence chain into one
    /// merged, nested tree.
    pub fn all_settings(&self) -> Table {
        let store = self.read();
        let mut out = Table::default();
        for key in store.all_keys() {
            if let Some(v) = store.find(&key) {
                value::insert_path(&mut out, &key::split_path(&key), v);
            }
        }
        out
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    /// Decode the merged configuration into `T`.
    ///
    /// Every known key is resolved through the full precedence chain, then
    /// the tree deserializes with scalar coercion (string to int/bool/float,
    /// string to sequence via the CSV rule). A field absent at every tier
    /// keeps its pre-existing value when declared with `#[serde(default)]`
    /// or as an `Option`.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        de::from_value(Value::Table(self.all_settings())).map_err(ConfigError::DecodeTarget)
    }

    /// Decode the value resolved at `key` into `T`.
    pub fn unmarshal_key<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(v) => de::from_value(v).map_err(ConfigError::DecodeTarget),
            None => Err(ConfigError::DecodeTarget(DecodeError::new(format!(
                "key '{}' is not set in any tier",
                key::normalize(key)
            )))),
        }
    }

    // ========================================================================
    // Debugging
    // ========================================================================

    /// Write a human-readable dump of every tier, in precedence order.
    pub fn dump_to(&self, w: &mut dyn io::Write) -> io::Result<()> {
        dump::render(&self.read(), w)
    }

    /// Render the tier dump to a string.
    pub fn dump(&self) -> String {
        let mut buf = Vec::new();
        let _ = self.dump_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
