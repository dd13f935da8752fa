//! Flag binding behavior: live reads after external mutation, collection
//! enumeration, case-insensitive keys, and instance isolation.

use std::sync::Arc;

use strata::{Config, ConfigError, Flag, FlagSet, Value};

#[test]
fn test_bind_flag_values_reflects_later_mutation() {
    // Bind a whole collection on the shared instance before any flag is
    // explicitly set, then let the flag system mutate every flag.
    let mut flag_set = FlagSet::new();
    for name in ["host", "port", "endpoint"] {
        flag_set.add(Flag::new(name, "", "string"));
    }

    strata::bind_flag_values(&flag_set).unwrap();

    // All three keys are registered even though none has changed yet.
    for name in ["host", "port", "endpoint"] {
        assert!(strata::is_set(name), "{name} should be bound");
    }

    let mutated = [
        ("host", "localhost"),
        ("port", "6060"),
        ("endpoint", "/public"),
    ];
    for (name, value) in mutated {
        flag_set.lookup(name).unwrap().set(value);
    }

    // No re-bind: the next get reflects the mutation.
    for (name, expected) in mutated {
        assert_eq!(strata::get(name), Some(Value::from(expected)));
    }
}

#[test]
fn test_bind_flag_live_read() {
    let flag = Arc::new(Flag::new("testflag", "testing", "string"));
    strata::bind_flag("testvalue", &flag).unwrap();

    // Unchanged: the flag's own default applies.
    assert_eq!(strata::get("testvalue"), Some(Value::from("testing")));

    flag.set_value("testing_mutate");
    flag.mark_changed();

    assert_eq!(strata::get("testvalue"), Some(Value::from("testing_mutate")));
}

#[test]
fn test_bind_flags_on_independent_instance() {
    let v = Config::new();
    let mut flag_set = FlagSet::new();
    for name in ["host", "port", "endpoint"] {
        flag_set.add(Flag::new(name, "", "string"));
    }

    v.bind_flags(&flag_set).unwrap();

    let mutated = [
        ("host", "localhost"),
        ("port", "6060"),
        ("endpoint", "/public"),
    ];
    for (name, value) in mutated {
        flag_set.lookup(name).unwrap().set(value);
    }

    for (name, expected) in mutated {
        assert_eq!(v.get(name), Some(Value::from(expected)));
    }
}

#[test]
fn test_bind_flag_case_insensitivity() {
    let v = Config::new();

    let flag = Arc::new(Flag::new("eyeballs", "green", "string"));
    flag.mark_changed();

    v.bind_flag("eYEs", &flag).unwrap();
    assert_eq!(v.get("eyes"), Some(Value::from("green")));
    assert_eq!(v.get("EYES"), Some(Value::from("green")));
    assert_eq!(v.get_string("Eyes").unwrap().as_deref(), Some("green"));
}

#[test]
fn test_collection_bind_normalizes_names() {
    let v = Config::new();
    let mut flag_set = FlagSet::new();
    let flag = flag_set.add(Flag::new("Verbose", "false", "bool"));
    flag.set("true");

    v.bind_flags(&flag_set).unwrap();
    assert_eq!(v.get("verbose"), Some(Value::Bool(true)));
}

#[test]
fn test_instance_isolation() {
    let v = Config::new();
    let flag = Arc::new(Flag::new("lonely", "solo", "string"));
    v.bind_flag("lonely", &flag).unwrap();
    v.set("island.key", "independent");

    // The shared instance never observes the independent instance.
    assert_eq!(strata::get("island.key"), None);
    assert_eq!(strata::get("lonely"), None);

    // And the other way around.
    strata::set("island.other", "shared");
    assert_eq!(v.get("island.other"), None);
}

#[test]
fn test_rebinding_same_key_last_bind_wins() {
    let v = Config::new();
    let first = Arc::new(Flag::new("a", "one", "string"));
    let second = Arc::new(Flag::new("a", "two", "string"));

    v.bind_flag("key", &first).unwrap();
    v.bind_flag("key", &second).unwrap();

    assert_eq!(v.get("key"), Some(Value::from("two")));
}

#[test]
fn test_bind_empty_key_is_invalid_provider() {
    let v = Config::new();
    let flag = Arc::new(Flag::new("x", "", "string"));

    let err = v.bind_flag("", &flag).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidProvider { .. }));
    assert!(err.to_string().contains("invalid provider"));
}

#[test]
fn test_override_beats_flag_regardless_of_changed_state() {
    let v = Config::new();

    let unchanged = Arc::new(Flag::new("a", "flag-default", "string"));
    v.bind_flag("first", &unchanged).unwrap();
    v.set("first", "override");
    assert_eq!(v.get("first"), Some(Value::from("override")));

    let changed = Arc::new(Flag::new("b", "", "string"));
    changed.set("flagged");
    v.bind_flag("second", &changed).unwrap();
    v.set("second", "override");
    assert_eq!(v.get("second"), Some(Value::from("override")));
}

#[test]
fn test_typed_flags_decode_per_type_tag() {
    let v = Config::new();
    let mut flag_set = FlagSet::new();
    flag_set.add(Flag::new("retries", "3", "int")).set("5");
    flag_set.add(Flag::new("verbose", "false", "bool")).set("true");
    flag_set
        .add(Flag::new("hosts", "", "string_slice"))
        .set("a,b");

    v.bind_flags(&flag_set).unwrap();

    assert_eq!(v.get("retries"), Some(Value::Integer(5)));
    assert_eq!(v.get("verbose"), Some(Value::Bool(true)));
    assert_eq!(
        v.get("hosts"),
        Some(Value::Array(vec![Value::from("a"), Value::from("b")]))
    );
}
