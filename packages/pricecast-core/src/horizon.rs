//! Business-day horizons for forecast requests.
//!
//! Weekends (Saturday, Sunday) are the only non-business days; exchange
//! holidays are not modelled.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::{Error, Result};

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Count business days in the half-open range `[start, end)`.
///
/// Negative when `end` is before `start`, counting `[end, start)`.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use pricecast_core::business_days_between;
///
/// let friday = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
/// assert_eq!(business_days_between(friday, monday), 1);
/// assert_eq!(business_days_between(monday, friday), -1);
/// ```
pub fn business_days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return -business_days_between(end, start);
    }

    let days = (end - start).num_days();
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;

    let mut date = start + Days::new((full_weeks * 7) as u64);
    while date < end {
        if is_business_day(date) {
            count += 1;
        }
        date = date + Days::new(1);
    }

    count
}

/// The first `count` business days strictly after `anchor`.
pub fn business_dates_after(anchor: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut date = anchor;
    while dates.len() < count {
        date = date + Days::new(1);
        if is_business_day(date) {
            dates.push(date);
        }
    }
    dates
}

/// Convert a target date into a simulation horizon in business days.
///
/// `target` must be on or after `today` and at most `max_days` calendar days
/// ahead; anything else is `InvalidParameter`.
pub fn horizon_for(today: NaiveDate, target: NaiveDate, max_days: i64) -> Result<usize> {
    if target < today {
        return Err(Error::InvalidParameter(format!(
            "target date {} is before {}",
            target, today
        )));
    }

    let ahead = (target - today).num_days();
    if ahead > max_days {
        return Err(Error::InvalidParameter(format!(
            "target date {} is {} days ahead, limit is {}",
            target, ahead, max_days
        )));
    }

    usize::try_from(business_days_between(today, target)).map_err(|_| {
        Error::InvalidParameter(format!(
            "no valid business-day count between {} and {}",
            today, target
        ))
    })
}
