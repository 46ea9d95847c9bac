//! End-to-end tests for the default pipeline.
//!
//! Run with: cargo nextest run --package structconf

#![allow(clippy::pedantic)]

use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use serial_test::serial;
use structconf::coerce::CoerceError;
use structconf::handler::FlagSet;
use structconf::{Conf, Context, Error, Settable};

fn cleanup_env(vars: &[&str]) {
    unsafe {
        for k in vars {
            std::env::remove_var(*k);
        }
    }
}

fn with_env<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        for (k, v) in vars {
            std::env::set_var(*k, *v);
        }
    }

    let result = f();

    unsafe {
        for (k, _) in vars {
            std::env::remove_var(*k);
        }
    }

    result
}

fn conf_with_args(args: &[&str]) -> Conf {
    Conf::builder()
        .flags(FlagSet::new("it").with_args(args.iter().copied()))
        .build()
}

// ============================================================================
// Environment and Defaults
// ============================================================================

#[derive(Settable, Default)]
pub struct Basic {
    #[conf("env:IT_NAME")]
    pub name: String,

    #[conf("env:IT_INT,flag:int,default:55")]
    pub int: i64,
}

#[test]
#[serial]
fn test_env_sets_string() {
    cleanup_env(&["IT_NAME", "IT_INT"]);

    let config = with_env(&[("IT_NAME", "Vikki")], || {
        let mut config = Basic::default();
        structconf::parse(&Context::background(), &mut config).expect("should parse");
        config
    });

    assert_eq!(config.name, "Vikki");
    assert_eq!(config.int, 55);
}

#[test]
#[serial]
fn test_default_when_nothing_set() {
    cleanup_env(&["IT_NAME", "IT_INT"]);

    let mut config = Basic::default();
    structconf::parse(&Context::background(), &mut config).expect("should parse");

    assert_eq!(config.name, "");
    assert_eq!(config.int, 55);
}

#[test]
#[serial]
fn test_preset_value_blocks_default() {
    cleanup_env(&["IT_NAME", "IT_INT"]);

    let mut config = Basic {
        name: String::new(),
        int: 7,
    };
    structconf::parse(&Context::background(), &mut config).expect("should parse");

    assert_eq!(config.int, 7);
}

#[test]
#[serial]
fn test_env_overrides_preset_value() {
    cleanup_env(&["IT_NAME", "IT_INT"]);

    let config = with_env(&[("IT_INT", "-12")], || {
        let mut config = Basic {
            name: String::new(),
            int: 7,
        };
        structconf::parse(&Context::background(), &mut config).expect("should parse");
        config
    });

    assert_eq!(config.int, -12);
}

#[test]
#[serial]
fn test_set_but_empty_env_var() {
    cleanup_env(&["IT_NAME", "IT_INT"]);

    let config = with_env(&[("IT_NAME", "")], || {
        let mut config = Basic {
            name: "preset".to_string(),
            int: 0,
        };
        structconf::parse(&Context::background(), &mut config).expect("should parse");
        config
    });

    assert_eq!(config.name, "");
}

// ============================================================================
// Flags
// ============================================================================

#[test]
#[serial]
fn test_flag_overrides_env() {
    cleanup_env(&["IT_NAME", "IT_INT"]);

    let config = with_env(&[("IT_INT", "456")], || {
        let mut config = Basic::default();
        conf_with_args(&["--int", "22"])
            .parse(&Context::background(), &mut config)
            .expect("should parse");
        config
    });

    assert_eq!(config.int, 22);
}

#[test]
#[serial]
fn test_env_used_when_flag_absent() {
    cleanup_env(&["IT_NAME", "IT_INT"]);

    let config = with_env(&[("IT_INT", "456")], || {
        let mut config = Basic::default();
        conf_with_args(&[])
            .parse(&Context::background(), &mut config)
            .expect("should parse");
        config
    });

    assert_eq!(config.int, 456);
}

#[test]
#[serial]
fn test_single_dash_and_equals_forms() {
    cleanup_env(&["IT_NAME", "IT_INT"]);

    for args in [&["-int", "9"][..], &["--int=9"][..], &["-int=9"][..]] {
        let mut config = Basic::default();
        conf_with_args(args)
            .parse(&Context::background(), &mut config)
            .expect("should parse");
        assert_eq!(config.int, 9, "{args:?}");
    }
}

#[derive(Settable, Default)]
pub struct Switches {
    #[conf("flag:verbose,usage:log more")]
    pub verbose: bool,

    #[conf("flag:offset")]
    pub offset: i32,

    #[conf("flag:timeout,default:30s")]
    pub timeout: Duration,
}

#[test]
#[serial]
fn test_bool_and_negative_flags() {
    let mut config = Switches::default();
    let conf = conf_with_args(&["--verbose", "--offset", "-5", "extra"]);
    conf.parse(&Context::background(), &mut config)
        .expect("should parse");

    assert!(config.verbose);
    assert_eq!(config.offset, -5);
    assert_eq!(config.timeout, Duration::from_secs(30));

    let flags = conf.flag_set().expect("flag set configured");
    assert_eq!(flags.remaining(), ["extra"]);
    assert!(!flags.was_explicitly_set("timeout"));
}

#[test]
#[serial]
fn test_unknown_flag_is_an_error() {
    let mut config = Switches::default();
    let err = conf_with_args(&["--nope"])
        .parse(&Context::background(), &mut config)
        .unwrap_err();

    assert!(matches!(err, Error::Flag { .. }), "{err:?}");
}

#[derive(Settable, Default)]
pub struct DuplicateFlags {
    #[conf("flag:port")]
    pub a: u16,

    #[conf("flag:port")]
    pub b: u16,
}

#[test]
#[serial]
fn test_duplicate_flag_names() {
    let mut config = DuplicateFlags::default();
    let err = conf_with_args(&[])
        .parse(&Context::background(), &mut config)
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateFlag { ref name } if name == "port"));
}

// ============================================================================
// Required
// ============================================================================

#[derive(Settable, Default)]
pub struct NeedsUrl {
    #[conf("env:IT_URL,required")]
    pub url: String,

    #[conf("env:IT_RETRIES,required,default:3")]
    pub retries: u8,
}

#[test]
#[serial]
fn test_required_missing() {
    cleanup_env(&["IT_URL", "IT_RETRIES"]);

    let mut config = NeedsUrl::default();
    let err = structconf::parse(&Context::background(), &mut config).unwrap_err();

    assert!(matches!(err, Error::Required { .. }));
    assert_eq!(err.field(), Some("url"));
    assert_eq!(err.to_string(), "field url is required");
}

#[test]
#[serial]
fn test_required_satisfied_by_env_and_default() {
    cleanup_env(&["IT_URL", "IT_RETRIES"]);

    let config = with_env(&[("IT_URL", "postgres://db")], || {
        let mut config = NeedsUrl::default();
        structconf::parse(&Context::background(), &mut config).expect("should parse");
        config
    });

    assert_eq!(config.url, "postgres://db");
    assert_eq!(config.retries, 3);
}

#[test]
#[serial]
fn test_required_satisfied_by_preset_value() {
    cleanup_env(&["IT_URL", "IT_RETRIES"]);

    let mut config = NeedsUrl {
        url: "preset".to_string(),
        retries: 0,
    };
    structconf::parse(&Context::background(), &mut config).expect("should parse");

    assert_eq!(config.url, "preset");
}

#[derive(Settable, Default)]
pub struct EmptyDefault {
    #[conf("default:")]
    pub name: String,
}

#[test]
fn test_empty_default_is_rejected() {
    let mut config = EmptyDefault {
        name: "already set".to_string(),
    };
    let err = Conf::builder()
        .without_env()
        .build()
        .parse(&Context::background(), &mut config)
        .unwrap_err();

    assert!(matches!(err, Error::EmptyDefault { ref field } if field == "name"));
}

// ============================================================================
// Nesting
// ============================================================================

#[derive(Settable, Default)]
pub struct Database {
    #[conf("env:IT_DB_HOST,default:localhost")]
    pub host: String,

    #[conf("env:IT_DB_PORT,default:5432")]
    pub port: u16,
}

#[derive(Settable, Default)]
pub struct Cache {
    #[conf("env:IT_CACHE_TTL,default:5m")]
    pub ttl: Duration,
}

#[derive(Settable, Default)]
pub struct App {
    #[conf("env:IT_APP_NAME,default:app")]
    pub name: String,

    pub database: Database,

    pub cache: Option<Cache>,

    pub replica: Box<Database>,

    pub tags: Vec<String>,

    pub limit: Option<u32>,

    #[conf(skip)]
    pub computed: u64,

    internal: u8,
}

#[test]
#[serial]
fn test_nested_records() {
    cleanup_env(&["IT_APP_NAME", "IT_DB_HOST", "IT_DB_PORT", "IT_CACHE_TTL"]);

    let config = with_env(&[("IT_DB_PORT", "6543"), ("IT_CACHE_TTL", "1h30m")], || {
        let mut config = App {
            cache: Some(Cache::default()),
            ..App::default()
        };
        structconf::parse(&Context::background(), &mut config).expect("should parse");
        config
    });

    assert_eq!(config.name, "app");
    assert_eq!(config.database.host, "localhost");
    assert_eq!(config.database.port, 6543);
    assert_eq!(config.replica.port, 6543);
    assert_eq!(
        config.cache.as_ref().map(|c| c.ttl),
        Some(Duration::from_secs(5400))
    );
    assert!(config.tags.is_empty());
    assert_eq!(config.limit, None);
    assert_eq!(config.computed, 0);
    assert_eq!(config.internal, 0);
}

#[test]
#[serial]
fn test_absent_optional_record_stays_absent() {
    cleanup_env(&["IT_APP_NAME", "IT_DB_HOST", "IT_DB_PORT", "IT_CACHE_TTL"]);

    let mut config = App::default();
    structconf::parse(&Context::background(), &mut config).expect("should parse");

    assert!(config.cache.is_none());
}

#[test]
fn test_discovery_order() {
    let mut config = App {
        cache: Some(Cache::default()),
        ..App::default()
    };
    let names: Vec<_> = structconf::settable_fields(&mut config)
        .expect("should discover")
        .iter()
        .map(structconf::Field::name)
        .collect();

    assert_eq!(names, ["name", "host", "port", "ttl", "host", "port"]);
}

pub struct Plugin;

#[derive(Settable)]
pub struct Mixed {
    #[conf("env:IT_MIXED_NAME,default:mixed")]
    pub name: String,

    pub labels: HashMap<String, String>,

    pub octets: [u8; 4],

    pub hook: fn(u32) -> u32,

    pub events: Sender<u32>,

    pub raw: *const u8,

    pub peers: Vec<String>,

    pub limit: Option<u32>,

    pub aliases: Option<Vec<String>>,

    pub boxed_labels: Box<HashMap<String, String>>,

    pub plugin: Option<Box<dyn Any + Send>>,

    pub database: Database,
}

#[test]
#[serial]
fn test_non_record_members_are_excluded() {
    cleanup_env(&["IT_MIXED_NAME", "IT_DB_HOST", "IT_DB_PORT"]);

    let (events, _rx) = mpsc::channel();
    let mut config = Mixed {
        name: String::new(),
        labels: HashMap::from([("tier".to_string(), "web".to_string())]),
        octets: [10, 0, 0, 1],
        hook: |n| n * 2,
        events,
        raw: std::ptr::null(),
        peers: vec!["a".into()],
        limit: Some(3),
        aliases: Some(vec!["b".into()]),
        boxed_labels: Box::default(),
        plugin: Some(Box::new(Plugin)),
        database: Database::default(),
    };

    let names: Vec<_> = structconf::settable_fields(&mut config)
        .expect("should discover")
        .iter()
        .map(structconf::Field::name)
        .collect();
    assert_eq!(names, ["name", "host", "port"]);

    structconf::parse(&Context::background(), &mut config).expect("should parse");
    assert_eq!(config.name, "mixed");
    assert_eq!(config.database.port, 5432);
    assert_eq!(config.octets, [10, 0, 0, 1]);
    assert_eq!(config.limit, Some(3));
    assert_eq!((config.hook)(4), 8);
}

// ============================================================================
// Conversion
// ============================================================================

#[derive(Settable, Default)]
pub struct Types {
    #[conf("env:IT_SMALL")]
    pub small: u8,

    #[conf("env:IT_RATIO")]
    pub ratio: f64,

    #[conf("env:IT_ON")]
    pub on: bool,

    #[conf("env:IT_PATH")]
    pub path: PathBuf,

    #[conf("env:IT_PIN,secret")]
    pub pin: u32,
}

const TYPE_VARS: [&str; 5] = ["IT_SMALL", "IT_RATIO", "IT_ON", "IT_PATH", "IT_PIN"];

#[test]
#[serial]
fn test_scalar_conversions() {
    cleanup_env(&TYPE_VARS);

    let config = with_env(
        &[
            ("IT_SMALL", "255"),
            ("IT_RATIO", "0.25"),
            ("IT_ON", "T"),
            ("IT_PATH", "/etc/app.toml"),
            ("IT_PIN", "1234"),
        ],
        || {
            let mut config = Types::default();
            structconf::parse(&Context::background(), &mut config).expect("should parse");
            config
        },
    );

    assert_eq!(config.small, 255);
    assert_eq!(config.ratio, 0.25);
    assert!(config.on);
    assert_eq!(config.path, PathBuf::from("/etc/app.toml"));
    assert_eq!(config.pin, 1234);
}

#[test]
#[serial]
fn test_overflow_names_field() {
    cleanup_env(&TYPE_VARS);

    let err = with_env(&[("IT_SMALL", "256")], || {
        let mut config = Types::default();
        structconf::parse(&Context::background(), &mut config).unwrap_err()
    });

    assert_eq!(err.field(), Some("small"));
    assert!(matches!(
        err,
        Error::Coerce {
            source: CoerceError::Overflow { .. },
            ..
        }
    ));
}

#[test]
#[serial]
fn test_secret_value_redacted_in_errors() {
    cleanup_env(&TYPE_VARS);

    let err = with_env(&[("IT_PIN", "hunter2")], || {
        let mut config = Types::default();
        structconf::parse(&Context::background(), &mut config).unwrap_err()
    });

    let display = err.to_string();
    let debug = format!("{err:?}");
    assert!(display.contains("<redacted>"), "{display}");
    assert!(!display.contains("hunter2"), "{display}");
    assert!(!debug.contains("hunter2"), "{debug}");
}

#[derive(Settable, Default)]
pub struct SecretTimeout {
    #[conf("env:IT_SECRET_TIMEOUT,secret")]
    pub timeout: Duration,
}

#[test]
#[serial]
fn test_secret_value_redacted_from_error_chain() {
    let err = with_env(&[("IT_SECRET_TIMEOUT", "hunter2s")], || {
        let mut config = SecretTimeout::default();
        structconf::parse(&Context::background(), &mut config).unwrap_err()
    });

    assert!(std::error::Error::source(&err).is_none());

    let debug = format!("{err:?}");
    assert!(!debug.contains("hunter2"), "{debug}");

    let report = format!("{:?}", miette::Report::new(err));
    assert!(!report.contains("hunter2"), "{report}");
}

#[test]
#[serial]
fn test_invalid_value_is_shown_when_not_secret() {
    cleanup_env(&TYPE_VARS);

    let err = with_env(&[("IT_RATIO", "abc")], || {
        let mut config = Types::default();
        structconf::parse(&Context::background(), &mut config).unwrap_err()
    });

    assert!(err.to_string().contains("\"abc\""), "{err}");
}

#[test]
#[serial]
fn test_first_error_keeps_earlier_writes() {
    cleanup_env(&TYPE_VARS);

    let config = with_env(&[("IT_SMALL", "8"), ("IT_RATIO", "x")], || {
        let mut config = Types::default();
        assert!(structconf::parse(&Context::background(), &mut config).is_err());
        config
    });

    assert_eq!(config.small, 8);
    assert_eq!(config.ratio, 0.0);
}
