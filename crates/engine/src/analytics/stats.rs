use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{Currency, Expense, Money, money::div_round};

use super::{ADD_HINT, local_date, rank_categories, top_list, total};

const TOP_CATEGORIES: usize = 4;

/// Length of a trend bucket.
const TREND_BUCKET_DAYS: i64 = 30;

/// Month-over-month change of spending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    /// Nothing was spent in the previous bucket.
    NoData,
    /// Signed change in whole percent.
    Change(i64),
}

impl Trend {
    fn line(self) -> String {
        match self {
            Trend::NoData => "📉 Trend: no trend data".to_string(),
            Trend::Change(percent) if percent >= 0 => {
                format!("📈 Trend: +{percent}% vs previous month")
            }
            Trend::Change(percent) => format!("📉 Trend: {percent}% vs previous month"),
        }
    }
}

/// Compares the last 30 days with the 30 days before them.
pub fn trend(expenses: &[Expense], now: DateTime<Utc>) -> Trend {
    let recent_from = now - Duration::days(TREND_BUCKET_DAYS);
    let older_from = now - Duration::days(2 * TREND_BUCKET_DAYS);

    let (mut recent, mut older) = (Money::ZERO, Money::ZERO);
    for expense in expenses {
        if expense.created_at > recent_from {
            recent += expense.amount;
        } else if expense.created_at > older_from {
            older += expense.amount;
        }
    }

    if !older.is_positive() {
        return Trend::NoData;
    }
    let change = (i128::from(recent.minor()) - i128::from(older.minor())) * 100;
    Trend::Change(div_round(change, i128::from(older.minor())) as i64)
}

/// All-time statistics.
pub fn stats(expenses: &[Expense], now: DateTime<Tz>, currency: Currency) -> String {
    let (Some(first), Some(last)) = (
        expenses.iter().map(|e| e.created_at).min(),
        expenses.iter().map(|e| e.created_at).max(),
    ) else {
        return format!("📊 No data for statistics yet. {ADD_HINT}");
    };

    let grand_total = total(expenses);
    let days = i128::from((last - first).num_days() + 1);
    let minor = i128::from(grand_total.minor());
    let symbol = currency.symbol();

    let mut out = String::from("📈 Expense statistics\n\n");
    out.push_str(&format!(
        "💰 Total spent: {}\n📊 Transactions: {}\n\n",
        grand_total.format_whole(currency),
        expenses.len()
    ));
    out.push_str("📅 Average spending:\n");
    out.push_str(&format!("   • Per day: {}{symbol}\n", div_round(minor, days * 100)));
    out.push_str(&format!("   • Per week: {}{symbol}\n", div_round(minor * 7, days * 100)));
    // a month is 30.44 days on average
    out.push_str(&format!(
        "   • Per month: {}{symbol}\n\n",
        div_round(minor * 3044, days * 100 * 100)
    ));

    out.push_str("🏆 Top categories:\n");
    out.push_str(&top_list(
        &rank_categories(expenses),
        TOP_CATEGORIES,
        Some(grand_total),
        currency,
    ));
    out.push('\n');
    out.push_str(&trend(expenses, now.with_timezone(&Utc)).line());
    out.push('\n');

    if let Some((day, sum)) = most_expensive_day(expenses, &now.timezone()) {
        out.push_str(&format!(
            "📅 Most expensive day: {} ({})",
            day.format("%d.%m.%Y"),
            sum.format_whole(currency)
        ));
    }
    out
}

/// Calendar day with the highest spending; the earliest day wins a tie.
fn most_expensive_day(expenses: &[Expense], tz: &Tz) -> Option<(NaiveDate, Money)> {
    let mut per_day: BTreeMap<NaiveDate, Money> = BTreeMap::new();
    for expense in expenses {
        *per_day.entry(local_date(expense, tz)).or_default() += expense.amount;
    }
    per_day.into_iter().fold(None, |best, (day, sum)| match best {
        Some((_, best_sum)) if best_sum >= sum => best,
        _ => Some((day, sum)),
    })
}
