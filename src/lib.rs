#![warn(missing_docs)]
#![deny(unsafe_code)]
#![doc = include_str!("../README.md")]

mod coerce;
mod config;
mod de;
mod dump;
mod env;
mod error;
mod flag;
mod key;
mod store;
mod value;

pub use config::Config;
pub use de::DecodeError;
pub use env::{EnvSource, MockEnv, StdEnv};
pub use error::ConfigError;
pub use flag::{Flag, FlagSet, FlagValue, FlagValueSet};
pub use value::{Table, Value};

use std::io;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use serde::de::DeserializeOwned;

// ============================================================================
// Shared instance
// ============================================================================

static SHARED: LazyLock<Config> = LazyLock::new(Config::new);

/// The process-wide shared configuration instance.
///
/// Empty on first use and long-lived for the process duration. Independent
/// instances created with [`Config::new`] share no state with it, so tests
/// can run against their own instance without polluting this one.
pub fn shared() -> &'static Config {
    &SHARED
}

/// Bind a single flag provider under `key` on the shared instance.
pub fn bind_flag_value(key: &str, provider: Arc<dyn FlagValue>) -> Result<(), ConfigError> {
    shared().bind_flag_value(key, provider)
}

/// Bind one concrete [`Flag`] under `key` on the shared instance.
pub fn bind_flag(key: &str, flag: &Arc<Flag>) -> Result<(), ConfigError> {
    shared().bind_flag(key, flag)
}

/// Bind every flag in a collection on the shared instance.
pub fn bind_flag_values(collection: &dyn FlagValueSet) -> Result<(), ConfigError> {
    shared().bind_flag_values(collection)
}

/// Bind every flag in a [`FlagSet`] on the shared instance.
pub fn bind_flags(flags: &dyn FlagValueSet) -> Result<(), ConfigError> {
    shared().bind_flags(flags)
}

/// Set an explicit override on the shared instance.
pub fn set(key: &str, value: impl Into<Value>) {
    shared().set(key, value)
}

/// Set a programmatic default on the shared instance.
pub fn set_default(key: &str, value: impl Into<Value>) {
    shared().set_default(key, value)
}

/// Replace the shared instance's config-file tier with a pre-parsed tree.
pub fn set_file_tree(tree: Table) {
    shared().set_file_tree(tree)
}

/// Replace the shared instance's key/value-store tier with a pre-parsed tree.
pub fn set_remote_tree(tree: Table) {
    shared().set_remote_tree(tree)
}

/// Register a key alias on the shared instance.
pub fn register_alias(alias: &str, key: &str) {
    shared().register_alias(alias, key)
}

/// Set the environment variable prefix on the shared instance.
pub fn set_env_prefix(prefix: &str) {
    shared().set_env_prefix(prefix)
}

/// Enable automatic environment lookup on the shared instance.
pub fn automatic_env() {
    shared().automatic_env()
}

/// Bind `key` to its derived environment variable on the shared instance.
pub fn bind_env(key: &str) {
    shared().bind_env(key)
}

/// Bind `key` to a specific environment variable on the shared instance.
pub fn bind_env_to(key: &str, var: &str) {
    shared().bind_env_to(key, var)
}

/// Replace the environment source of the shared instance.
pub fn set_env_source(source: impl EnvSource + 'static) {
    shared().set_env_source(source)
}

/// Resolve a key through the shared instance's precedence chain.
pub fn get(key: &str) -> Option<Value> {
    shared().get(key)
}

/// Whether any tier of the shared instance has the key.
pub fn is_set(key: &str) -> bool {
    shared().is_set(key)
}

/// Resolve and coerce to a string on the shared instance.
pub fn get_string(key: &str) -> Result<Option<String>, ConfigError> {
    shared().get_string(key)
}

/// Resolve and coerce to a boolean on the shared instance.
pub fn get_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    shared().get_bool(key)
}

/// Resolve and coerce to an integer on the shared instance.
pub fn get_int(key: &str) -> Result<Option<i64>, ConfigError> {
    shared().get_int(key)
}

/// Resolve and coerce to a float on the shared instance.
pub fn get_float(key: &str) -> Result<Option<f64>, ConfigError> {
    shared().get_float(key)
}

/// Resolve and coerce to a duration on the shared instance.
pub fn get_duration(key: &str) -> Result<Option<Duration>, ConfigError> {
    shared().get_duration(key)
}

/// Resolve and coerce to a string sequence on the shared instance.
pub fn get_string_slice(key: &str) -> Result<Option<Vec<String>>, ConfigError> {
    shared().get_string_slice(key)
}

/// Every key known to any tier of the shared instance.
pub fn all_keys() -> Vec<String> {
    shared().all_keys()
}

/// The shared instance's merged settings tree.
pub fn all_settings() -> Table {
    shared().all_settings()
}

/// Decode the shared instance's merged configuration into `T`.
pub fn unmarshal<T: DeserializeOwned>() -> Result<T, ConfigError> {
    shared().unmarshal()
}

/// Decode the value resolved at `key` on the shared instance into `T`.
pub fn unmarshal_key<T: DeserializeOwned>(key: &str) -> Result<T, ConfigError> {
    shared().unmarshal_key(key)
}

/// Write a tier dump of the shared instance.
pub fn dump_to(w: &mut dyn io::Write) -> io::Result<()> {
    shared().dump_to(w)
}

/// Render a tier dump of the shared instance to a string.
pub fn dump() -> String {
    shared().dump()
}
