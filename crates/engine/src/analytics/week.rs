use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Weekday};
use chrono_tz::Tz;

use crate::{Currency, Expense, Money, window::week_start};

use super::{ADD_HINT, SEPARATOR, local_date, rank_categories, top_list, total};

const TOP_CATEGORIES: usize = 3;

/// Expenses of the current Monday-to-Sunday week.
///
/// Lists the weekdays that have spending in calendar order, the average over
/// those days only and the top categories with their share of the total.
pub fn week(expenses: &[Expense], now: DateTime<Tz>, currency: Currency) -> String {
    let monday = week_start(now.date_naive());
    let sunday = monday + Duration::days(6);
    let span = format!("{} - {}", monday.format("%d.%m"), sunday.format("%d.%m"));
    if expenses.is_empty() {
        return format!("📊 No expenses this week ({span}). {ADD_HINT}");
    }

    let tz = now.timezone();
    let mut per_day: BTreeMap<u32, (Weekday, Money)> = BTreeMap::new();
    for expense in expenses {
        let weekday = local_date(expense, &tz).weekday();
        let entry = per_day
            .entry(weekday.num_days_from_monday())
            .or_insert((weekday, Money::ZERO));
        entry.1 += expense.amount;
    }

    let grand_total = total(expenses);
    let mut out = format!("📊 Expenses for the week ({span})\n\n");
    for (weekday, sum) in per_day.values() {
        if sum.is_positive() {
            out.push_str(&format!("{}: {}\n", weekday_name(*weekday), sum.format(currency)));
        }
    }
    out.push_str(&format!(
        "\n{SEPARATOR}\n💰 Total: {}\n📈 Average per day: {}\n",
        grand_total.format(currency),
        grand_total.split(per_day.len()).format(currency),
    ));
    out.push_str("🏆 Top categories:\n");
    out.push_str(&top_list(
        &rank_categories(expenses),
        TOP_CATEGORIES,
        Some(grand_total),
        currency,
    ));
    out
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
