use chrono::{Days, NaiveDate};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Number of days shown by the week grid.
pub const WEEK_LENGTH: usize = 7;

/// This is the standard way of converting a date to a key in habitgrid.
pub fn date_to_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a key written by [date_to_key], and only such keys: `2025-3-7` is refused. Years outside
/// `0000..=9999` carry a sign (`+10000-01-01`, `-0001-01-01`) and are accepted as well.
pub fn key_to_date(key: &str) -> Option<NaiveDate> {
    let mut parts = key.rsplitn(3, '-');
    let day = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let year = parts.next()?.parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    (date_to_key(date) == key).then_some(date)
}

/// Returns the rolling week ending at `today`, oldest day first.
pub fn week_keys(today: NaiveDate) -> [NaiveDate; WEEK_LENGTH] {
    std::array::from_fn(|index| {
        let offset = (WEEK_LENGTH - 1 - index) as u64;
        today
            .checked_sub_days(Days::new(offset))
            .unwrap_or(NaiveDate::MIN)
    })
}
