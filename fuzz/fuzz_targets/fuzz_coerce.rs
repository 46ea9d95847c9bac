#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use structconf::Kind;
use structconf::coerce::coerce_str;

#[derive(Debug, Arbitrary)]
enum FuzzKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Complex64,
    String,
    Duration,
}

impl From<FuzzKind> for Kind {
    fn from(kind: FuzzKind) -> Self {
        match kind {
            FuzzKind::Bool => Kind::Bool,
            FuzzKind::I8 => Kind::I8,
            FuzzKind::I16 => Kind::I16,
            FuzzKind::I32 => Kind::I32,
            FuzzKind::I64 => Kind::I64,
            FuzzKind::Isize => Kind::Isize,
            FuzzKind::U8 => Kind::U8,
            FuzzKind::U16 => Kind::U16,
            FuzzKind::U32 => Kind::U32,
            FuzzKind::U64 => Kind::U64,
            FuzzKind::Usize => Kind::Usize,
            FuzzKind::F32 => Kind::F32,
            FuzzKind::F64 => Kind::F64,
            FuzzKind::Complex64 => Kind::Complex64,
            FuzzKind::String => Kind::String,
            FuzzKind::Duration => Kind::Duration,
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    kind: FuzzKind,
    text: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let kind = Kind::from(input.kind);

    // === Coercion should never panic ===
    if let Ok(value) = coerce_str(kind, input.text) {
        // === A successful coercion has the requested kind ===
        assert_eq!(value.kind(), Some(kind));

        // === Display/Debug should never panic ===
        let _ = format!("{value}");
        let _ = format!("{value:?}");
        let _ = value.is_zero();
    }
});
