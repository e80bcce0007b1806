//! Extended cron pattern parser (C1).
//!
//! Grammar: `extended = ["{" delayField "," maxCallsField "}"] cron`, where
//! each field is either `*` or a non-negative decimal integer, and `cron` is
//! a standard five-field cron expression. See spec §4.1.

use crate::error::ChronoError;

/// The three pieces an [`parse_pattern`] call decodes out of an extended
/// pattern string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    /// Seconds to wait after construction before the first registration.
    /// `0` means register immediately.
    pub delay_secs: u64,
    /// Maximum number of ticks to run. `0` means unbounded.
    pub max_calls: u64,
    /// The bare five-field cron expression, trimmed.
    pub cron: String,
}

/// Parse an extended pattern, validating the bare cron expression with
/// `validate`.
///
/// `validate` is injected rather than hard-wired to a concrete cron engine
/// so this function has no runtime dependency and can be unit-tested in
/// isolation; `chronofuture-foundation` wires in the real engine's
/// `validate()`.
///
/// # Errors
///
/// Returns [`ChronoError::InvalidPattern`] for any malformed prefix, a
/// literal `0` maxCalls (must be spelled `*`), an empty cron remainder, or a
/// cron expression that fails `validate`.
pub fn parse_pattern(
    pattern: &str,
    validate: impl FnOnce(&str) -> bool,
) -> Result<ParsedPattern, ChronoError> {
    let trimmed = pattern.trim();

    let (delay_secs, max_calls, cron_part) = if let Some(rest) = trimmed.strip_prefix('{') {
        let close = rest.find('}').ok_or_else(|| {
            ChronoError::invalid_pattern(pattern, trimmed, "missing closing '}' in prefix")
        })?;
        let prefix = &rest[..close];
        let cron_part = &rest[close + 1..];

        let mut fields = prefix.splitn(2, ',');
        let delay_field = fields.next().unwrap_or("").trim();
        let max_calls_field = fields.next().ok_or_else(|| {
            ChronoError::invalid_pattern(pattern, prefix, "expected '{delay,maxCalls}', missing ','")
        })?;
        let max_calls_field = max_calls_field.trim();

        let delay_secs = parse_field(pattern, delay_field, 0)?;
        let max_calls = parse_max_calls_field(pattern, max_calls_field)?;

        (delay_secs, max_calls, cron_part)
    } else {
        (0, 0, trimmed)
    };

    let cron = cron_part.trim().to_string();
    if cron.is_empty() {
        return Err(ChronoError::invalid_pattern(
            pattern,
            cron_part,
            "cron expression is empty after trimming",
        ));
    }
    if !validate(&cron) {
        return Err(ChronoError::invalid_pattern(
            pattern,
            &cron,
            "cron expression failed engine validation",
        ));
    }

    Ok(ParsedPattern {
        delay_secs,
        max_calls,
        cron,
    })
}

/// Parse a `*`-or-integer field, returning `default` for `*`.
fn parse_field(original: &str, field: &str, default: u64) -> Result<u64, ChronoError> {
    if field == "*" {
        return Ok(default);
    }
    field.parse::<u64>().map_err(|_| {
        ChronoError::invalid_pattern(original, field, "expected '*' or a non-negative integer")
    })
}

/// `maxCalls` has one extra rule over [`parse_field`]: a literal `0` is
/// rejected, since unbounded must be spelled `*`.
fn parse_max_calls_field(original: &str, field: &str) -> Result<u64, ChronoError> {
    if field == "*" {
        return Ok(0);
    }
    let parsed = field.parse::<u64>().map_err(|_| {
        ChronoError::invalid_pattern(original, field, "expected '*' or a non-negative integer")
    })?;
    if parsed == 0 {
        return Err(ChronoError::invalid_pattern(
            original,
            field,
            "maxCalls literal '0' is forbidden; use '*' for unbounded",
        ));
    }
    Ok(parsed)
}
