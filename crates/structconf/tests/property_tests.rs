//! Property-based tests for structconf invariants.
//!
//! These tests verify that critical invariants hold for all possible inputs,
//! not just hand-picked test cases.

#![allow(clippy::pedantic)]

use proptest::prelude::*;

// ============================================================================
// Annotation Properties
// ============================================================================

mod tag_properties {
    use super::*;
    use structconf::tag;

    proptest! {
        /// Parsing never panics on any input
        #[test]
        fn parse_never_panics(s in ".*") {
            let parsed = tag::parse(&s);
            let _ = parsed.len();
            let _ = tag::lookup(&s, "env");
        }

        /// The last occurrence of a duplicated key wins
        #[test]
        fn last_duplicate_wins(
            key in "[a-z]{1,8}",
            first in "[a-zA-Z0-9_]{0,8}",
            last in "[a-zA-Z0-9_]{0,8}",
        ) {
            let annotation = format!("{key}:{first},{key}:{last}");
            prop_assert_eq!(tag::lookup(&annotation, &key), Some(last.as_str()));
        }

        /// Values keep everything after the first colon
        #[test]
        fn value_keeps_later_colons(key in "[a-z]{1,8}", value in "[a-z:/]{0,16}") {
            let annotation = format!("{key}:{value}");
            prop_assert_eq!(tag::lookup(&annotation, &key), Some(value.as_str()));
        }

        /// Bare keys are present with an empty value
        #[test]
        fn bare_key_is_present(key in "[a-z]{1,8}") {
            let annotation = format!("env:X,{key}");
            prop_assert_eq!(tag::lookup(&annotation, &key), Some(""));
        }
    }
}

// ============================================================================
// Coercion Properties
// ============================================================================

mod coerce_properties {
    use super::*;
    use std::time::Duration;
    use structconf::coerce::{CoerceError, coerce_str};
    use structconf::{Kind, Value};

    macro_rules! int_roundtrip {
        ($($name:ident: $t:ty => $kind:ident),+ $(,)?) => {
            proptest! {
                $(
                    /// Every value of the type parses back to itself
                    #[test]
                    fn $name(n in any::<$t>()) {
                        prop_assert_eq!(coerce_str(Kind::$kind, &n.to_string()), Ok(Value::from(n)));
                    }
                )+
            }
        };
    }

    int_roundtrip! {
        i8_roundtrip: i8 => I8,
        i16_roundtrip: i16 => I16,
        i32_roundtrip: i32 => I32,
        i64_roundtrip: i64 => I64,
        isize_roundtrip: isize => Isize,
        u8_roundtrip: u8 => U8,
        u16_roundtrip: u16 => U16,
        u32_roundtrip: u32 => U32,
        u64_roundtrip: u64 => U64,
        usize_roundtrip: usize => Usize,
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(coerce_str(Kind::I8, "-128"), Ok(Value::I8(i8::MIN)));
        assert_eq!(coerce_str(Kind::I8, "127"), Ok(Value::I8(i8::MAX)));
        assert_eq!(coerce_str(Kind::I8, "-1"), Ok(Value::I8(-1)));
        assert_eq!(coerce_str(Kind::U64, "0"), Ok(Value::U64(0)));
        assert_eq!(
            coerce_str(Kind::U64, &u64::MAX.to_string()),
            Ok(Value::U64(u64::MAX))
        );
    }

    proptest! {
        /// Values just outside a narrow type's range overflow
        #[test]
        fn i8_out_of_range_overflows(n in prop_oneof![-100_000i64..-128, 128i64..100_000]) {
            prop_assert_eq!(
                coerce_str(Kind::I8, &n.to_string()),
                Err(CoerceError::Overflow { kind: Kind::I8 })
            );
        }

        /// Negative text never fits an unsigned type
        #[test]
        fn negative_unsigned_is_rejected(n in i64::MIN..0i64) {
            prop_assert!(coerce_str(Kind::U32, &n.to_string()).is_err());
        }

        /// Coercion never panics on arbitrary text
        #[test]
        fn coerce_never_panics(s in ".*") {
            for kind in [Kind::Bool, Kind::I64, Kind::U16, Kind::F32, Kind::Duration, Kind::String] {
                let _ = coerce_str(kind, &s);
            }
        }

        /// Finite doubles survive a text roundtrip exactly
        #[test]
        fn f64_roundtrip(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
            prop_assert_eq!(coerce_str(Kind::F64, &x.to_string()), Ok(Value::F64(x)));
        }

        /// Finite singles survive a text roundtrip exactly
        #[test]
        fn f32_roundtrip(x in any::<f32>().prop_filter("finite", |x| x.is_finite())) {
            prop_assert_eq!(coerce_str(Kind::F32, &x.to_string()), Ok(Value::F32(x)));
        }

        /// Every accepted boolean spelling maps to its truth value
        #[test]
        fn bool_forms(
            (text, expected) in prop::sample::select(vec![
                ("1", true), ("t", true), ("T", true),
                ("true", true), ("TRUE", true), ("True", true),
                ("0", false), ("f", false), ("F", false),
                ("false", false), ("FALSE", false), ("False", false),
            ])
        ) {
            prop_assert_eq!(coerce_str(Kind::Bool, text), Ok(Value::Bool(expected)));
        }

        /// Anything outside the accepted spellings is not a boolean
        #[test]
        fn bool_rejects_other_text(s in "[a-zA-Z0-9 ]{2,8}") {
            prop_assume!(!["true", "TRUE", "True", "false", "FALSE", "False"].contains(&s.as_str()));
            prop_assert!(coerce_str(Kind::Bool, &s).is_err());
        }

        /// Strings are taken verbatim
        #[test]
        fn string_is_verbatim(s in ".*") {
            prop_assert_eq!(coerce_str(Kind::String, &s), Ok(Value::String(s.clone())));
        }

        /// Whole nanoseconds and seconds parse to the same duration
        #[test]
        fn duration_roundtrip(secs in 0u64..1_000_000_000, nanos in 0u32..1_000_000_000) {
            let d = Duration::new(secs, nanos);
            prop_assert_eq!(
                coerce_str(Kind::Duration, &format!("{}ns", d.as_nanos())),
                Ok(Value::Duration(d))
            );
            prop_assert_eq!(
                coerce_str(Kind::Duration, &format!("{secs}s{nanos}ns")),
                Ok(Value::Duration(d))
            );
        }
    }
}

// ============================================================================
// Duration Properties
// ============================================================================

mod duration_properties {
    use super::*;
    use std::time::Duration;
    use structconf::duration::parse_duration;

    proptest! {
        /// Parsing never panics on any input
        #[test]
        fn parse_never_panics(s in ".*") {
            let _ = parse_duration(&s);
        }

        /// Whole units scale exactly
        #[test]
        fn whole_units(n in 0u64..1_000_000) {
            prop_assert_eq!(parse_duration(&format!("{n}ns")), Ok(Duration::from_nanos(n)));
            prop_assert_eq!(parse_duration(&format!("{n}ms")), Ok(Duration::from_millis(n)));
            prop_assert_eq!(parse_duration(&format!("{n}s")), Ok(Duration::from_secs(n)));
            prop_assert_eq!(parse_duration(&format!("{n}m")), Ok(Duration::from_secs(n * 60)));
        }

        /// Concatenated components add up
        #[test]
        fn components_add(h in 0u64..100, m in 0u64..60, s in 0u64..60) {
            prop_assert_eq!(
                parse_duration(&format!("{h}h{m}m{s}s")),
                Ok(Duration::from_secs(h * 3600 + m * 60 + s))
            );
        }

        /// Non-zero negative durations are rejected
        #[test]
        fn negative_rejected(n in 1u64..1_000_000) {
            let input = format!("-{n}s");
            prop_assert!(parse_duration(&input).is_err());
        }
    }
}
