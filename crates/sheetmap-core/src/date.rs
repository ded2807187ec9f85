//! Excel day-serial date conversion
//!
//! Excel stores dates as "serial numbers": the count of days (possibly
//! fractional) since the fictitious "January 0, 1900". Workbooks created on
//! classic Mac Excel use an alternate epoch that is 1462 days later.

use chrono::{DateTime, NaiveDateTime};

/// Days between the 1900 Excel epoch and the Unix epoch.
///
/// Accounts for the 19 leap years in between (and for Excel's deliberate
/// "1900 was a leap year" Lotus 1-2-3 compatibility bug, which this constant
/// absorbs).
const DAYS_BEFORE_UNIX_EPOCH: f64 = (70 * 365 + 19) as f64;

/// Day offset of the 1904 (Mac) date system relative to the 1900 one.
const EPOCH_1904_OFFSET_DAYS: f64 = 1462.0;

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Convert an Excel day serial to a calendar timestamp (UTC).
///
/// Fractional serials carry sub-day precision; the result is rounded to the
/// nearest millisecond. Leap seconds are ignored, consistent with standard
/// Unix-time semantics.
///
/// Returns `None` when the serial is not representable as a timestamp
/// (NaN, infinite, or out of `chrono`'s range).
pub fn serial_to_datetime(serial: f64, epoch1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }

    let mut serial = serial;
    if epoch1904 {
        serial += EPOCH_1904_OFFSET_DAYS;
    }

    let millis = ((serial - DAYS_BEFORE_UNIX_EPOCH) * MS_PER_DAY).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }

    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc())
}

/// Convert a calendar timestamp (UTC) back to an Excel day serial.
pub fn datetime_to_serial(datetime: NaiveDateTime, epoch1904: bool) -> f64 {
    let millis = datetime.and_utc().timestamp_millis() as f64;
    let mut serial = millis / MS_PER_DAY + DAYS_BEFORE_UNIX_EPOCH;
    if epoch1904 {
        serial -= EPOCH_1904_OFFSET_DAYS;
    }
    serial
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_known_serials() {
        // 43183 is 2018-03-24.
        assert_eq!(serial_to_datetime(43183.0, false).unwrap(), date(2018, 3, 24));
        // 25569 is the Unix epoch itself.
        assert_eq!(serial_to_datetime(25569.0, false).unwrap(), date(1970, 1, 1));
    }

    #[test]
    fn test_epoch_1904() {
        // The same calendar day is 1462 serials earlier in the 1904 system.
        assert_eq!(
            serial_to_datetime(43183.0 - 1462.0, true).unwrap(),
            date(2018, 3, 24)
        );
    }

    #[test]
    fn test_fractional_serial() {
        // 0.5 of a day is noon.
        let dt = serial_to_datetime(43183.5, false).unwrap();
        assert_eq!(dt.date(), date(2018, 3, 24).date());
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.minute(), 0);
    }

    #[test]
    fn test_round_trip() {
        for epoch1904 in [false, true] {
            // A spread of whole days across a century, including leap days.
            for serial in [367.0, 25569.0, 36526.0, 43183.0, 44620.0, 73050.0] {
                let dt = serial_to_datetime(serial, epoch1904).unwrap();
                let back = datetime_to_serial(dt, epoch1904);
                assert!(
                    (back - serial).abs() < 1e-9,
                    "serial {} round-tripped to {}",
                    serial,
                    back
                );
            }
        }
    }

    #[test]
    fn test_unrepresentable() {
        assert_eq!(serial_to_datetime(f64::NAN, false), None);
        assert_eq!(serial_to_datetime(f64::INFINITY, false), None);
        assert_eq!(serial_to_datetime(1e300, false), None);
    }
}
