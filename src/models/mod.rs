use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

pub mod fine;
pub mod member;
pub mod position;
pub mod schedule;
pub mod term;
pub mod trade;
pub mod user;
pub mod work_job;

pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
pub const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");
pub const TIME_WITH_SECONDS_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// A calendar date, written `YYYY-MM-DD`
#[derive(sqlx::Type, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[sqlx(transparent)]
pub struct GqlDate(pub Date);

#[Scalar(name = "Date")]
impl ScalarType for GqlDate {
    fn parse(value: Value) -> InputValueResult<Self> {
        if let Value::String(date_str) = &value {
            if let Ok(date) = Date::parse(date_str, DATE_FORMAT) {
                return Ok(GqlDate(date));
            }
        }

        Err(InputValueError::expected_type(value))
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.format(DATE_FORMAT).unwrap_or_default())
    }
}

/// A time of day, written `HH:MM`, or `HH:MM:SS` when it has seconds
#[derive(sqlx::Type, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[sqlx(transparent)]
pub struct GqlTime(pub Time);

#[Scalar(name = "Time")]
impl ScalarType for GqlTime {
    fn parse(value: Value) -> InputValueResult<Self> {
        if let Value::String(time_str) = &value {
            if let Ok(time) = Time::parse(time_str, TIME_WITH_SECONDS_FORMAT)
                .or_else(|_| Time::parse(time_str, TIME_FORMAT))
            {
                return Ok(GqlTime(time));
            }
        }

        Err(InputValueError::expected_type(value))
    }

    fn to_value(&self) -> Value {
        let format = if self.0.second() == 0 {
            TIME_FORMAT
        } else {
            TIME_WITH_SECONDS_FORMAT
        };
        Value::String(self.0.format(format).unwrap_or_default())
    }
}

/// A point in time, written in RFC 3339
#[derive(sqlx::Type, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[sqlx(transparent)]
pub struct GqlDateTime(pub OffsetDateTime);

#[Scalar(name = "DateTime")]
impl ScalarType for GqlDateTime {
    fn parse(value: Value) -> InputValueResult<Self> {
        if let Value::String(date_str) = &value {
            if let Ok(date) = OffsetDateTime::parse(date_str, &Rfc3339) {
                return Ok(GqlDateTime(date));
            }
        }

        Err(InputValueError::expected_type(value))
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.format(&Rfc3339).unwrap_or_default())
    }
}
