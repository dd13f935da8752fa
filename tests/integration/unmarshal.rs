//! Structure population from the merged precedence chain.

use std::sync::Arc;

use serde::Deserialize;
use strata::{Config, Flag, FlagSet, MockEnv, Table, Value};

fn table(entries: Vec<(&str, Value)>) -> Table {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[derive(Debug, Deserialize, PartialEq)]
struct Slices {
    string_slice: Vec<String>,
}

#[test]
fn test_string_slice_flag_and_preset_default_coexist() {
    let cases: &[(&str, &[&str])] = &[
        ("", &[]),
        ("jeden", &["jeden"]),
        ("dwa,trzy", &["dwa", "trzy"]),
        ("cztery,\"piec , szesc\"", &["cztery", "piec , szesc"]),
    ];

    for (raw, expected) in cases {
        for changed in [false, true] {
            let v = Config::new();
            v.set_default("string_slice", vec!["default"]);

            let mut flag_set = FlagSet::new();
            let flag = flag_set.add(Flag::new("string_slice", "", "string_slice"));
            flag.set_value(*raw);
            if changed {
                flag.mark_changed();
            }

            v.bind_flags(&flag_set).unwrap();

            let decoded: Slices = v.unmarshal().unwrap();
            if changed {
                assert_eq!(decoded.string_slice, expected.to_vec(), "raw={raw:?}");
            } else {
                // The programmatic default survives a bound-but-unchanged
                // flag, no matter what raw value the flag holds.
                assert_eq!(decoded.string_slice, vec!["default"], "raw={raw:?}");
            }
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct ServerSection {
    host: String,
    port: u16,
}

#[derive(Debug, Deserialize, PartialEq)]
struct AppConfig {
    name: String,
    server: ServerSection,
    #[serde(default)]
    debug: bool,
}

#[test]
fn test_unmarshal_merges_tiers() {
    let v = Config::new();
    v.set_file_tree(table(vec![
        ("name", Value::from("demo")),
        (
            "server",
            Value::Table(table(vec![
                ("host", Value::from("file-host")),
                ("port", Value::Integer(1111)),
            ])),
        ),
    ]));

    // Env overrides the file's port; the value arrives as a string and
    // coerces into u16 during decode.
    v.bind_env_to("server.port", "APP_SERVER_PORT");
    v.set_env_source(MockEnv::from_pairs([("APP_SERVER_PORT", "7070")]));

    // A changed bool flag fills a field no tree provides.
    let debug = Arc::new(Flag::new("debug", "false", "bool"));
    debug.set("true");
    v.bind_flag("debug", &debug).unwrap();

    let decoded: AppConfig = v.unmarshal().unwrap();
    assert_eq!(
        decoded,
        AppConfig {
            name: "demo".to_string(),
            server: ServerSection {
                host: "file-host".to_string(),
                port: 7070,
            },
            debug: true,
        }
    );
}

#[test]
fn test_unmarshal_field_matching_is_case_insensitive() {
    let v = Config::new();
    // Tree keys arrive in arbitrary case; normalization on ingestion makes
    // them match lower-case field names.
    v.set_file_tree(table(vec![
        ("Name", Value::from("demo")),
        (
            "SERVER",
            Value::Table(table(vec![
                ("Host", Value::from("h")),
                ("PORT", Value::Integer(1)),
            ])),
        ),
    ]));

    let decoded: AppConfig = v.unmarshal().unwrap();
    assert_eq!(decoded.name, "demo");
    assert_eq!(decoded.server.host, "h");
    assert_eq!(decoded.server.port, 1);
}

#[test]
fn test_unmarshal_key_decodes_one_subtree() {
    let v = Config::new();
    v.set("server.host", "h");
    v.set("server.port", 8080);

    let decoded: ServerSection = v.unmarshal_key("SERVER").unwrap();
    assert_eq!(
        decoded,
        ServerSection {
            host: "h".to_string(),
            port: 8080,
        }
    );

    assert!(v.unmarshal_key::<ServerSection>("absent").is_err());
}

#[test]
fn test_absent_field_keeps_serde_default() {
    let v = Config::new();
    v.set_file_tree(table(vec![
        ("name", Value::from("demo")),
        (
            "server",
            Value::Table(table(vec![
                ("host", Value::from("h")),
                ("port", Value::Integer(1)),
            ])),
        ),
    ]));

    // "debug" is absent at every tier: the field keeps its default.
    let decoded: AppConfig = v.unmarshal().unwrap();
    assert!(!decoded.debug);
}

#[test]
fn test_unmarshal_enum_field_from_string() {
    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum LogFormat {
        Plain,
        Json,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Logging {
        format: LogFormat,
    }

    let v = Config::new();
    v.set_default("logging.format", "json");

    let decoded: Logging = v.unmarshal_key("logging").unwrap();
    assert_eq!(decoded.format, LogFormat::Json);
}

#[test]
fn test_unmarshal_into_scalar_target_fails() {
    let v = Config::new();
    v.set_default("some.key", 1);

    // The merged tree is a table; a scalar target cannot absorb it.
    let err = v.unmarshal::<i64>().unwrap_err();
    assert!(err.to_string().contains("cannot decode configuration"));
}
