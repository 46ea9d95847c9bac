//! Duration literal grammar.
//!
//! A duration literal is a sequence of decimal numbers, each with an optional
//! fraction and a mandatory unit suffix, such as `300ms`, `1.5h` or
//! `2h45m`. Valid units are `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m` and
//! `h`. A lone `0` is accepted without a unit.
//!
//! [`Duration`] cannot be negative, so a leading `-` is rejected unless the
//! literal is zero. Totals above `i64::MAX` nanoseconds (about 292 years)
//! are rejected as overflow so literals stay portable across platforms
//! that use a signed nanosecond count.

use std::time::Duration;

use miette::Diagnostic;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MINUTE;

#[allow(clippy::cast_sign_loss)]
const MAX_NANOS: u128 = i64::MAX as u128;

/// Errors from [`parse_duration`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum DurationError {
    /// The literal does not follow the grammar.
    #[error("invalid duration {0:?}")]
    #[diagnostic(
        code(structconf::duration::invalid),
        help("use a number followed by a unit, e.g. \"1h30m\" or \"250ms\"")
    )]
    Invalid(String),

    /// A number was not followed by a unit.
    #[error("missing unit in duration {0:?}")]
    #[diagnostic(
        code(structconf::duration::missing_unit),
        help("valid units are ns, us, ms, s, m, h")
    )]
    MissingUnit(String),

    /// A unit suffix was not recognised.
    #[error("unknown unit {unit:?} in duration {input:?}")]
    #[diagnostic(
        code(structconf::duration::unknown_unit),
        help("valid units are ns, us, ms, s, m, h")
    )]
    UnknownUnit {
        /// The unrecognised suffix.
        unit: String,
        /// The full literal.
        input: String,
    },

    /// The literal is negative.
    #[error("negative duration {0:?}")]
    #[diagnostic(code(structconf::duration::negative))]
    Negative(String),

    /// The total does not fit in a signed 64-bit nanosecond count.
    #[error("duration {0:?} is out of range")]
    #[diagnostic(code(structconf::duration::overflow))]
    Overflow(String),
}

fn unit_nanos(unit: &str) -> Option<u64> {
    Some(match unit {
        "ns" => 1,
        "us" | "\u{b5}s" | "\u{3bc}s" => NANOS_PER_MICRO,
        "ms" => NANOS_PER_MILLI,
        "s" => NANOS_PER_SECOND,
        "m" => NANOS_PER_MINUTE,
        "h" => NANOS_PER_HOUR,
        _ => return None,
    })
}

/// Splits a leading run of ASCII digits off `s`.
fn take_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Parses a duration literal such as `"3h55m2s"`.
///
/// # Errors
///
/// Returns a [`DurationError`] when the literal is empty, malformed, uses an
/// unknown unit, is negative, or exceeds the supported range.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::Invalid(input.to_owned());
    let overflow = || DurationError::Overflow(input.to_owned());

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }

    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;

    while !rest.is_empty() {
        let (whole, after_whole) = take_digits(rest);
        let (fraction, after_number) = match after_whole.strip_prefix('.') {
            Some(tail) => take_digits(tail),
            None => ("", after_whole),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_end = after_number
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_number.len());
        let (unit, tail) = after_number.split_at(unit_end);

        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_owned()));
        }

        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_owned(),
            input: input.to_owned(),
        })?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let nanos = whole.checked_mul(u128::from(scale)).ok_or_else(overflow)?;

        // Digits past nanosecond precision cannot change the result.
        let mut numerator: u128 = 0;
        let mut denominator: u128 = 1;
        for digit in fraction.bytes().take(18) {
            numerator = numerator * 10 + u128::from(digit - b'0');
            denominator *= 10;
        }
        let fraction_nanos = numerator
            .checked_mul(u128::from(scale))
            .ok_or_else(overflow)?
            / denominator;
        let nanos = nanos.checked_add(fraction_nanos).ok_or_else(overflow)?;

        total = total.checked_add(nanos).ok_or_else(overflow)?;
        if total > MAX_NANOS {
            return Err(overflow());
        }

        rest = tail;
    }

    if negative && total != 0 {
        return Err(DurationError::Negative(input.to_owned()));
    }

    let secs = u64::try_from(total / u128::from(NANOS_PER_SECOND)).map_err(|_| overflow())?;
    let subsec = u32::try_from(total % u128::from(NANOS_PER_SECOND)).map_err(|_| overflow())?;

    Ok(Duration::new(secs, subsec))
}
