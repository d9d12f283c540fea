use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Calendar date at `now` in the enforcement time zone.
pub fn local_date_at(tz: &Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

/// Today's date in the enforcement time zone.
pub fn today_local(tz: &Tz) -> NaiveDate {
    local_date_at(tz, Utc::now())
}
