//! Sexagesimal angle strings as found in star tables.
//!
//! RA: `"5h 55m 10.3s"` (hours). Dec: `"-8° 12′ 5″"` (degrees); the ASCII
//! forms `'` and `"` are accepted for minutes and seconds.

use std::fmt;

use foundation::math::hours_to_deg;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AngleParseError {
    /// A unit marker (`h`, `m`, `°`, ...) is missing.
    MissingUnit { input: String, unit: &'static str },
    InvalidNumber { input: String, field: &'static str },
    OutOfRange { input: String },
}

impl fmt::Display for AngleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleParseError::MissingUnit { input, unit } => {
                write!(f, "missing '{unit}' in angle {input:?}")
            }
            AngleParseError::InvalidNumber { input, field } => {
                write!(f, "invalid {field} in angle {input:?}")
            }
            AngleParseError::OutOfRange { input } => write!(f, "angle out of range: {input:?}"),
        }
    }
}

impl std::error::Error for AngleParseError {}

/// Parse `"HHh MMm SS.Ss"` into degrees.
pub fn parse_ra_hms(input: &str) -> Result<f64, AngleParseError> {
    let s = input.trim();
    let (h, rest) = split_unit(s, input, &["h"], "h")?;
    let (m, rest) = split_unit(rest, input, &["m"], "m")?;
    let sec = rest.trim().trim_end_matches('s');

    let hours = number(h, input, "hours")?;
    let minutes = number(m, input, "minutes")?;
    let seconds = number(sec, input, "seconds")?;
    if hours < 0.0 || !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(AngleParseError::OutOfRange {
            input: input.to_string(),
        });
    }

    Ok(hours_to_deg(hours + minutes / 60.0 + seconds / 3600.0))
}

/// Parse `"±DD° MM′ SS″"` into degrees.
///
/// A leading `-` negates the whole value, so `"-0° 30′ 0″"` is -0.5.
pub fn parse_dec_dms(input: &str) -> Result<f64, AngleParseError> {
    let s = input.trim();
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (d, rest) = split_unit(unsigned, input, &["°"], "°")?;
    let (m, rest) = split_unit(rest, input, &["′", "'"], "′")?;
    let sec = rest.trim().trim_end_matches(['″', '"']);

    let degrees = number(d, input, "degrees")?;
    let minutes = number(m, input, "minutes")?;
    let seconds = number(sec, input, "seconds")?;
    if degrees < 0.0 || !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(AngleParseError::OutOfRange {
            input: input.to_string(),
        });
    }

    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    if value > 90.0 {
        return Err(AngleParseError::OutOfRange {
            input: input.to_string(),
        });
    }
    Ok(if negative { -value } else { value })
}

fn split_unit<'a>(
    s: &'a str,
    input: &str,
    markers: &[&str],
    unit: &'static str,
) -> Result<(&'a str, &'a str), AngleParseError> {
    markers
        .iter()
        .find_map(|m| s.split_once(m))
        .ok_or_else(|| AngleParseError::MissingUnit {
            input: input.to_string(),
            unit,
        })
}

fn number(s: &str, input: &str, field: &'static str) -> Result<f64, AngleParseError> {
    let s = s.trim();
    // An empty seconds field ("12m") reads as zero.
    if s.is_empty() && field == "seconds" {
        return Ok(0.0);
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AngleParseError::InvalidNumber {
            input: input.to_string(),
            field,
        })
}

#[cfg(test)]
mod tests {
    use super::{AngleParseError, parse_dec_dms, parse_ra_hms};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn ra_hours_minutes_seconds() {
        // Betelgeuse.
        assert_close(parse_ra_hms("5h 55m 10.3s").expect("ra"), 88.792_916_666, 1e-6);
        assert_close(parse_ra_hms("0h 0m 0s").expect("ra"), 0.0, 0.0);
        assert_close(parse_ra_hms(" 12h30m ").expect("ra"), 187.5, 1e-12);
    }

    #[test]
    fn dec_sign_applies_to_whole_value() {
        assert_close(parse_dec_dms("-8° 12′ 5″").expect("dec"), -(8.0 + 12.0 / 60.0 + 5.0 / 3600.0), 1e-12);
        assert_close(parse_dec_dms("+7° 24′ 25″").expect("dec"), 7.0 + 24.0 / 60.0 + 25.0 / 3600.0, 1e-12);
        assert_close(parse_dec_dms("-0° 30′ 0″").expect("dec"), -0.5, 1e-12);
        assert_close(parse_dec_dms("45° 0' 36\"").expect("dec"), 45.01, 1e-12);
    }

    #[test]
    fn malformed_angles_are_errors() {
        assert!(matches!(
            parse_ra_hms("5 55 10"),
            Err(AngleParseError::MissingUnit { unit: "h", .. })
        ));
        assert!(matches!(
            parse_ra_hms("xh 5m 1s"),
            Err(AngleParseError::InvalidNumber { field: "hours", .. })
        ));
        assert!(matches!(
            parse_dec_dms("91° 0′ 0″"),
            Err(AngleParseError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_dec_dms("10° 75′ 0″"),
            Err(AngleParseError::OutOfRange { .. })
        ));
        let msg = parse_dec_dms("12").expect_err("no unit").to_string();
        assert!(msg.contains("missing"));
    }
}
