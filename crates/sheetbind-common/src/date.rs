use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* ───────────────────── Spreadsheet date-serial utilities ───────────────────
1900 system:
  Serial 1  = 1900-01-01
  Serial 59 = 1900-02-28
  Serial 60 = 1900-02-29  (phantom, kept for Lotus compatibility)
  Serial 61 = 1900-03-01
1904 system:
  Serial 0  = 1904-01-01, no phantom day.
Time is stored as fractional days (no timezone), resolved to milliseconds.
------------------------------------------------------------------------- */

/// Base date for the 1900 date system. Serial 1 = base + 1 day = 1900-01-01.
const EPOCH_1900: NaiveDate = NaiveDate::from_ymd_opt(1899, 12, 31).unwrap();
const EPOCH_1904: NaiveDate = NaiveDate::from_ymd_opt(1904, 1, 1).unwrap();
const FIRST_REAL_MARCH: NaiveDate = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap();
const PHANTOM_LEAP_SERIAL: i64 = 60;
const MILLIS_PER_DAY: i64 = 86_400_000;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateSystem {
    #[default]
    Excel1900,
    Excel1904,
}

impl Display for DateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSystem::Excel1900 => write!(f, "1900"),
            DateSystem::Excel1904 => write!(f, "1904"),
        }
    }
}

impl DateSystem {
    /// Convert a serial number to a calendar timestamp.
    ///
    /// Returns `None` for negative, non-finite or out-of-calendar serials.
    pub fn to_datetime(self, serial: f64) -> Option<NaiveDateTime> {
        serial_to_datetime(serial, self)
    }

    pub fn to_serial(self, dt: &NaiveDateTime) -> f64 {
        datetime_to_serial(dt, self)
    }
}

pub fn serial_to_datetime(serial: f64, system: DateSystem) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let mut days = serial.trunc() as i64;
    let mut millis = (serial.fract() * MILLIS_PER_DAY as f64).round() as i64;
    if millis >= MILLIS_PER_DAY {
        days += 1;
        millis -= MILLIS_PER_DAY;
    }

    let date = match system {
        DateSystem::Excel1900 if days == PHANTOM_LEAP_SERIAL => NaiveDate::from_ymd_opt(1900, 2, 28)?,
        DateSystem::Excel1900 => {
            let offset = if days < PHANTOM_LEAP_SERIAL { days } else { days - 1 };
            EPOCH_1900.checked_add_signed(TimeDelta::try_days(offset)?)?
        }
        DateSystem::Excel1904 => EPOCH_1904.checked_add_signed(TimeDelta::try_days(days)?)?,
    };

    let time = NaiveTime::from_num_seconds_from_midnight_opt(
        (millis / 1_000) as u32,
        ((millis % 1_000) * 1_000_000) as u32,
    )?;
    Some(date.and_time(time))
}

pub fn datetime_to_serial(dt: &NaiveDateTime, system: DateSystem) -> f64 {
    let date = dt.date();
    let days = match system {
        // Dates on or after 1900-03-01 get +1 to account for the phantom Feb 29
        DateSystem::Excel1900 if date >= FIRST_REAL_MARCH => (date - EPOCH_1900).num_days() + 1,
        DateSystem::Excel1900 => (date - EPOCH_1900).num_days(),
        DateSystem::Excel1904 => (date - EPOCH_1904).num_days(),
    };

    let time = dt.time();
    let millis = i64::from(time.num_seconds_from_midnight()) * 1_000
        + i64::from(time.nanosecond().min(999_999_999) / 1_000_000);
    days as f64 + millis as f64 / MILLIS_PER_DAY as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn phantom_leap_day_maps_to_feb_28() {
        let dt = serial_to_datetime(60.0, DateSystem::Excel1900).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(1900, 2, 28).unwrap());
        let dt = serial_to_datetime(61.0, DateSystem::Excel1900).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(1900, 3, 1).unwrap());
    }

    #[test]
    fn known_serials_1900() {
        assert_eq!(
            serial_to_datetime(1.0, DateSystem::Excel1900).unwrap(),
            ymd_hms(1900, 1, 1, 0, 0, 0)
        );
        assert_eq!(
            serial_to_datetime(45292.5, DateSystem::Excel1900).unwrap(),
            ymd_hms(2024, 1, 1, 12, 0, 0)
        );
        assert_eq!(datetime_to_serial(&ymd_hms(2024, 1, 1, 0, 0, 0), DateSystem::Excel1900), 45292.0);
    }

    #[test]
    fn known_serials_1904() {
        assert_eq!(
            serial_to_datetime(0.0, DateSystem::Excel1904).unwrap(),
            ymd_hms(1904, 1, 1, 0, 0, 0)
        );
        let dt = ymd_hms(2024, 1, 1, 6, 0, 0);
        let serial = datetime_to_serial(&dt, DateSystem::Excel1904);
        assert_eq!(serial, 43830.25);
        assert_eq!(serial_to_datetime(serial, DateSystem::Excel1904).unwrap(), dt);
    }

    #[test]
    fn millisecond_precision_survives() {
        let dt = NaiveDate::from_ymd_opt(2021, 7, 15)
            .unwrap()
            .and_hms_milli_opt(13, 45, 10, 250)
            .unwrap();
        let serial = datetime_to_serial(&dt, DateSystem::Excel1900);
        assert_eq!(serial_to_datetime(serial, DateSystem::Excel1900).unwrap(), dt);
    }

    #[test]
    fn rejects_invalid_serials() {
        assert!(serial_to_datetime(-1.0, DateSystem::Excel1900).is_none());
        assert!(serial_to_datetime(f64::NAN, DateSystem::Excel1900).is_none());
        assert!(serial_to_datetime(f64::INFINITY, DateSystem::Excel1904).is_none());
        assert!(serial_to_datetime(1e300, DateSystem::Excel1900).is_none());
    }
}
