//! Reporting windows and their resolution to UTC ranges.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Time range a report covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Window {
    Today,
    ThisWeek,
    ThisMonth,
    AllTime,
}

/// Half-open UTC range `[from, to)`; a missing bound is unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpenseRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Window {
    /// Resolves the window around `now`, using the calendar of `now`'s zone.
    ///
    /// Weeks start on Monday.
    pub fn range(self, now: DateTime<Tz>) -> ExpenseRange {
        let tz = now.timezone();
        let today = now.date_naive();
        let (start, end) = match self {
            Window::AllTime => return ExpenseRange::default(),
            Window::Today => (today, today + Duration::days(1)),
            Window::ThisWeek => {
                let monday = week_start(today);
                (monday, monday + Duration::days(7))
            }
            Window::ThisMonth => {
                let first = month_start(today);
                (first, month_start(first + Duration::days(32)))
            }
        };

        ExpenseRange {
            from: Some(local_midnight(&tz, start)),
            to: Some(local_midnight(&tz, end)),
        }
    }
}

/// Monday of the week containing `date`.
pub(crate) fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// First instant of `date` in `tz`, as UTC.
///
/// When midnight falls in a DST gap the naive time is taken as UTC.
fn local_midnight(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}
