//! Spending reports.
//!
//! Every view is a pure function of the expense list, the zoned "now" and the
//! display currency. Nothing here touches storage, so the views can run on
//! any number of workers at once.
//!
//! Amounts are summed as [`Money`], so grouping never accumulates floating
//! point error. Rankings go through [`rank_categories`], which orders by total
//! descending and breaks ties by category name.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{Currency, Expense, Money};

pub use month::month;
pub use stats::{Trend, stats, trend};
pub use today::today;
pub use week::week;

mod month;
mod stats;
mod today;
mod week;

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Hint appended to every empty report.
const ADD_HINT: &str = "Use /add to record an expense.";

/// Sum of a single category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub name: String,
    pub total: Money,
}

/// Groups `expenses` by category, biggest total first.
///
/// Equal totals are ordered by name so a render is reproducible.
pub fn rank_categories(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut sums: BTreeMap<&str, Money> = BTreeMap::new();
    for expense in expenses {
        *sums.entry(expense.category.as_str()).or_default() += expense.amount;
    }

    let mut ranked: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(name, total)| CategoryTotal {
            name: name.to_string(),
            total,
        })
        .collect();
    // stable: names stay ascending within equal totals
    ranked.sort_by(|a, b| b.total.cmp(&a.total));
    ranked
}

fn total(expenses: &[Expense]) -> Money {
    expenses.iter().map(|expense| expense.amount).sum()
}

fn local_date(expense: &Expense, tz: &Tz) -> NaiveDate {
    expense.created_at.with_timezone(tz).date_naive()
}

/// Numbered ranking lines; percentages are shown when `grand_total` is set.
fn top_list(
    ranked: &[CategoryTotal],
    limit: usize,
    grand_total: Option<Money>,
    currency: Currency,
) -> String {
    let mut out = String::new();
    for (position, entry) in ranked.iter().take(limit).enumerate() {
        out.push_str(&format!(
            "   {}. {}: {}",
            position + 1,
            entry.name,
            entry.total.format_whole(currency)
        ));
        if let Some(grand_total) = grand_total {
            out.push_str(&format!(" ({}%)", entry.total.percent_of(grand_total)));
        }
        out.push('\n');
    }
    out
}
