use crate::types::Decimal;
use std::fmt::{Debug, Display, Formatter};

/// Indicates the most precise time unit that has been specified in the accompanying [Timestamp].
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Default)]
pub enum Precision {
    /// Year-level precision (e.g. `2020T`)
    #[default]
    Year,
    /// Month-level precision (e.g. `2020-08T`)
    Month,
    /// Day-level precision (e.g. `2020-08-01T`)
    Day,
    /// Minute-level precision (e.g. `2020-08-01T12:34Z`)
    HourAndMinute,
    /// Second-level precision or greater. (e.g. `2020-08-01T12:34:56Z` or `2020-08-01T12:34:56.123456789Z`)
    Second,
}

/// The raw fields of an Ion timestamp as they appear in the encoding.
///
/// No calendar validation is performed beyond what the encoding's bit widths impose; fields below
/// the timestamp's precision are zero (month and day default to `1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub(crate) precision: Precision,
    pub(crate) year: u16,
    pub(crate) month: u8,
    pub(crate) day: u8,
    pub(crate) hour: u8,
    pub(crate) minute: u8,
    pub(crate) second: u8,
    pub(crate) fractional_seconds: Option<Decimal>,
    // Minutes east of UTC. `None` is the unknown offset (`-00:00`).
    pub(crate) offset_minutes: Option<i32>,
}

impl Timestamp {
    pub(crate) fn with_year(year: u16) -> Self {
        Timestamp {
            precision: Precision::Year,
            year,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            fractional_seconds: None,
            offset_minutes: None,
        }
    }

    pub(crate) fn with_month(mut self, month: u8) -> Self {
        self.precision = Precision::Month;
        self.month = month;
        self
    }

    pub(crate) fn with_day(mut self, day: u8) -> Self {
        self.precision = Precision::Day;
        self.day = day;
        self
    }

    pub(crate) fn with_hour_and_minute(mut self, hour: u8, minute: u8) -> Self {
        self.precision = Precision::HourAndMinute;
        self.hour = hour;
        self.minute = minute;
        self
    }

    pub(crate) fn with_second(mut self, second: u8) -> Self {
        self.precision = Precision::Second;
        self.second = second;
        self
    }

    pub(crate) fn with_fractional_seconds(mut self, fraction: Decimal) -> Self {
        self.fractional_seconds = Some(fraction);
        self
    }

    pub(crate) fn with_offset(mut self, offset_minutes: Option<i32>) -> Self {
        self.offset_minutes = offset_minutes;
        self
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// The fractional seconds as a decimal in the range `[0, 1)`, if present.
    pub fn fractional_seconds(&self) -> Option<&Decimal> {
        self.fractional_seconds.as_ref()
    }

    /// The offset from UTC in minutes. `None` indicates that the offset is unknown.
    pub fn offset(&self) -> Option<i32> {
        self.offset_minutes
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.year)?;
        if self.precision == Precision::Year {
            return write!(f, "T");
        }
        write!(f, "-{:02}", self.month)?;
        if self.precision == Precision::Month {
            return write!(f, "T");
        }
        write!(f, "-{:02}", self.day)?;
        if self.precision == Precision::Day {
            return Ok(());
        }
        write!(f, "T{:02}:{:02}", self.hour, self.minute)?;
        if self.precision == Precision::Second {
            write!(f, ":{:02}", self.second)?;
            if let Some(fraction) = &self.fractional_seconds {
                write!(f, " (+{fraction})")?;
            }
        }
        match self.offset_minutes {
            None => write!(f, "-00:00"),
            Some(0) => write!(f, "Z"),
            Some(minutes) => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let minutes = minutes.abs();
                write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_follows_precision() {
        let year = Timestamp::with_year(2024);
        assert_eq!(year.to_string(), "2024T");
        let day = year.clone().with_month(3).with_day(9);
        assert_eq!(day.to_string(), "2024-03-09");
        let minute = day.with_hour_and_minute(7, 5).with_offset(Some(-90));
        assert_eq!(minute.to_string(), "2024-03-09T07:05-01:30");
        assert_eq!(minute.precision(), Precision::HourAndMinute);
    }
}
