use time::{Date, OffsetDateTime, UtcOffset};

use crate::error::{LodgeError, LodgeResult};

/// The current time at the lodge.
pub fn now(offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(offset)
}

/// The current date at the lodge.
pub fn today(offset: UtcOffset) -> Date {
    now(offset).date()
}

pub fn offset_from_hours(hours: i8) -> LodgeResult<UtcOffset> {
    UtcOffset::from_hms(hours, 0, 0)
        .map_err(|err| LodgeError::Config(format!("Invalid UTC offset {}: {}", hours, err)))
}

/// Fails with `Invalid` when `value` is longer than `max` characters.
pub fn check_length(field: &str, value: &str, max: usize) -> LodgeResult<()> {
    if value.chars().count() > max {
        Err(LodgeError::Invalid(format!(
            "{} must be at most {} characters",
            field, max
        )))
    } else {
        Ok(())
    }
}
