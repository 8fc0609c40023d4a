use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?T?(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$")
        .expect("duration pattern should compile")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DurationError {
    #[error("not an ISO-8601 duration: {0:?}")]
    Invalid(String),

    #[error("duration overflows: {0:?}")]
    Overflow(String),
}

/// Parse the `PT#H#M#S` form used by video metadata APIs into seconds.
///
/// A leading day component (`P1DT2H`) is accepted as well.
///
/// # Errors
///
/// Returns `DurationError::Invalid` for anything else, `DurationError::Overflow`
/// if the total does not fit in `u32`.
pub fn parse_iso8601_duration(raw: &str) -> Result<u32, DurationError> {
    let trimmed = raw.trim();
    let caps = ISO_DURATION
        .captures(trimmed)
        .filter(|_| trimmed.len() > 2)
        .ok_or_else(|| DurationError::Invalid(raw.to_owned()))?;

    let overflow = || DurationError::Overflow(raw.to_owned());
    let mut total: u32 = 0;
    for (group, unit) in [(1, 86_400_u32), (2, 3_600), (3, 60), (4, 1)] {
        let Some(m) = caps.get(group) else { continue };
        let value: u32 = m.as_str().parse().map_err(|_| overflow())?;
        total = value
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(overflow)?;
    }
    Ok(total)
}
