use chrono::DateTime;
use chrono_tz::Tz;

use crate::{Currency, Expense};

use super::{ADD_HINT, SEPARATOR, rank_categories, top_list, total};

const TOP_CATEGORIES: usize = 3;

/// Expenses of the current calendar month: top categories and the total.
pub fn month(expenses: &[Expense], now: DateTime<Tz>, currency: Currency) -> String {
    let month_name = now.format("%B");
    if expenses.is_empty() {
        return format!("📊 No expenses in {month_name}. {ADD_HINT}");
    }

    let mut out = format!("📊 Expenses for {month_name}\n\n");
    out.push_str(&top_list(
        &rank_categories(expenses),
        TOP_CATEGORIES,
        None,
        currency,
    ));
    out.push_str(&format!(
        "\n{SEPARATOR}\n💰 Total: {}\n",
        total(expenses).format(currency)
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::*;

    #[test]
    fn empty_month_is_named() {
        let reply = month(&[], moscow(2026, 2, 3, 12), Currency::Rub);
        assert_eq!(reply, "📊 No expenses in February. Use /add to record an expense.");
    }

    #[test]
    fn lists_top_three_without_percentages() {
        let now = moscow(2026, 10, 14, 12);
        let expenses = vec![
            expense("A", 30_000, "a", now),
            expense("B", 50_000, "b", now),
            expense("C", 10_000, "c", now),
            expense("D", 5_050, "d", now),
        ];
        let reply = month(&expenses, now, Currency::Rub);
        assert_eq!(
            reply,
            "📊 Expenses for October\n\n   1. B: 500₽\n   2. A: 300₽\n   3. C: 100₽\n\n\
             ━━━━━━━━━━━━━━━━━━━━\n💰 Total: 950.50₽\n"
        );
    }
}
