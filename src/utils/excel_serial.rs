use chrono::{Days, NaiveDate, NaiveTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Convert an Excel 1900-system serial number to a calendar date.
///
/// The fractional (time) part is ignored. Serials below 61 account for the
/// phantom 1900-02-29 that the 1900 date system counts.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use meteo_archive::utils::serial_to_date;
///
/// assert_eq!(serial_to_date(45657.5), NaiveDate::from_ymd_opt(2024, 12, 31));
/// ```
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }

    let days = serial.floor() as u64;
    let base = if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    base.checked_add_days(Days::new(days))
}

/// Interpret the fractional part of a serial as a fraction of a 24-hour day.
///
/// The result is rounded to the nearest millisecond and wraps at midnight,
/// so it always lies in [00:00, 24:00).
pub fn serial_to_time(serial: f64) -> Option<NaiveTime> {
    if !serial.is_finite() {
        return None;
    }

    let fraction = serial - serial.floor();
    let millis = ((fraction * MILLIS_PER_DAY).round() as u64) % MILLIS_PER_DAY as u64;

    NaiveTime::from_num_seconds_from_midnight_opt(
        (millis / 1000) as u32,
        ((millis % 1000) * 1_000_000) as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_to_date() {
        assert_eq!(
            serial_to_date(45657.0),
            NaiveDate::from_ymd_opt(2024, 12, 31)
        );
        assert_eq!(serial_to_date(1.0), NaiveDate::from_ymd_opt(1900, 1, 1));
        assert_eq!(serial_to_date(61.0), NaiveDate::from_ymd_opt(1900, 3, 1));
        assert_eq!(serial_to_date(45292.75), NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_serial_to_date_rejects_out_of_range() {
        assert!(serial_to_date(0.5).is_none());
        assert!(serial_to_date(-3.0).is_none());
        assert!(serial_to_date(f64::NAN).is_none());
    }

    #[test]
    fn test_serial_to_time() {
        assert_eq!(serial_to_time(45657.5), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(serial_to_time(0.25), NaiveTime::from_hms_opt(6, 0, 0));
        assert_eq!(
            serial_to_time(0.0), // midnight
            NaiveTime::from_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn test_serial_to_time_wraps_at_midnight() {
        // 23:59:59.9999 rounds up to a full day
        assert_eq!(
            serial_to_time(0.999_999_999),
            NaiveTime::from_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn test_serial_to_time_three_hourly_observations() {
        let expected = [0, 3, 6, 9, 12, 15, 18, 21];
        for (i, hour) in expected.iter().enumerate() {
            let serial = i as f64 / 8.0;
            assert_eq!(serial_to_time(serial), NaiveTime::from_hms_opt(*hour, 0, 0));
        }
    }
}
