use chrono::DateTime;
use chrono_tz::Tz;

use crate::{Currency, Expense};

use super::{ADD_HINT, SEPARATOR, rank_categories, total};

/// Expenses of the current day grouped by category.
///
/// Each group lists its expenses in the order they were given.
pub fn today(expenses: &[Expense], now: DateTime<Tz>, currency: Currency) -> String {
    let header = format!("📊 Expenses for today ({})", now.format("%d.%m.%Y"));
    if expenses.is_empty() {
        return format!("{header}\n\nNo expenses today yet.\n{ADD_HINT}");
    }

    let mut out = format!("{header}\n\n");
    for group in rank_categories(expenses) {
        out.push_str(&format!("{}: {}\n", group.name, group.total.format(currency)));
        for expense in expenses.iter().filter(|e| e.category == group.name) {
            out.push_str(&format!(
                "   • {}: {}\n",
                expense.description,
                expense.amount.format(currency)
            ));
        }
    }
    out.push_str(&format!(
        "\n{SEPARATOR}\n💰 Total: {}",
        total(expenses).format(currency)
    ));
    out
}
