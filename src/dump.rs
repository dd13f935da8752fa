//! Debug dump of the tier store.

use std::io;

use indexmap::IndexSet;
use owo_colors::OwoColorize;

use crate::key;
use crate::store::Store;
use crate::value::{self, Table};

/// Render every tier in precedence order, one section per tier.
pub(crate) fn render(store: &Store, w: &mut dyn io::Write) -> io::Result<()> {
    writeln!(w, "{}", "Override:".bold())?;
    write_table(w, &store.overrides)?;

    writeln!(w, "{}", "Flags:".bold())?;
    for (key, provider) in &store.flags {
        let detail = format!(
            "[{}] changed={} value={:?} default={:?}",
            provider.value_type(),
            provider.has_changed(),
            provider.value_str(),
            provider.default_str()
        );
        writeln!(w, "  {key} {}", detail.dimmed())?;
    }

    writeln!(w, "{}", "Env:".bold())?;
    if let Some(prefix) = &store.env_prefix {
        writeln!(w, "  prefix = {prefix}")?;
    }
    if store.automatic_env {
        writeln!(w, "  automatic lookup enabled")?;
    }
    for (key, var) in &store.env_bindings {
        writeln!(w, "  {key} -> {var}")?;
    }

    writeln!(w, "{}", "Config File:".bold())?;
    write_table(w, &store.file)?;

    writeln!(w, "{}", "Key/Value Store:".bold())?;
    write_table(w, &store.remote)?;

    writeln!(w, "{}", "Defaults:".bold())?;
    write_table(w, &store.defaults)?;

    writeln!(w, "{}", "Aliases:".bold())?;
    for (alias, key) in &store.aliases {
        writeln!(w, "  {alias} -> {key}")?;
    }

    Ok(())
}

fn write_table(w: &mut dyn io::Write, table: &Table) -> io::Result<()> {
    let mut paths = IndexSet::new();
    value::collect_leaf_paths(table, "", &mut paths);
    for path in &paths {
        if let Some(v) = value::lookup_path(table, &key::split_path(path)) {
            writeln!(w, "  {path} = {v}")?;
        }
    }
    Ok(())
}
