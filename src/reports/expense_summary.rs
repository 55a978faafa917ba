use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, JournalEntry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub account: String,
    pub total_cents: Cents,
    pub count: i64,
    /// Share of the summary total, 0.0 when the total is zero
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub rows: Vec<ExpenseRow>,
    pub total_cents: Cents,
}

/// Summarize overhead spending: Posted entries in the date range whose
/// debit account is on the overhead whitelist, grouped by debit account and
/// sorted descending by amount.
pub fn build_expense_summary(
    entries: &[JournalEntry],
    from_date: DateTime<Utc>,
    to_date: DateTime<Utc>,
    overheads: &[String],
) -> ExpenseSummary {
    let mut totals: HashMap<String, (Cents, i64)> = HashMap::new();

    for entry in entries.iter().filter(|e| {
        e.is_posted()
            && e.date >= from_date
            && e.date <= to_date
            && overheads.contains(&e.debit_account)
    }) {
        let slot = totals.entry(entry.debit_account.clone()).or_insert((0, 0));
        slot.0 += entry.amount_cents;
        slot.1 += 1;
    }

    let total_cents: Cents = totals.values().map(|(t, _)| t).sum();

    let mut rows: Vec<ExpenseRow> = totals
        .into_iter()
        .map(|(account, (cents, count))| ExpenseRow {
            account,
            total_cents: cents,
            count,
            percentage: if total_cents != 0 {
                cents as f64 / total_cents as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_cents
            .cmp(&a.total_cents)
            .then_with(|| a.account.cmp(&b.account))
    });

    ExpenseSummary {
        from_date,
        to_date,
        rows,
        total_cents,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::EntryStatus;
    use crate::reports::categories::overhead_accounts;

    fn date(s: &str) -> DateTime<Utc> {
        let naive = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        Utc.from_utc_datetime(&naive.and_hms_opt(0, 0, 0).unwrap())
    }

    fn posted(day: &str, debit: &str, amount: Cents) -> JournalEntry {
        JournalEntry::new(date(day), "test", debit, "Cash", amount)
            .with_status(EntryStatus::Posted)
    }

    #[test]
    fn test_grouped_and_sorted_descending() {
        let entries = vec![
            posted("2024-05-01", "Rent Expense", 50_000),
            posted("2024-05-02", "Utilities Expense", 8_000),
            posted("2024-05-03", "Rent Expense", 50_000),
            posted("2024-05-04", "Salaries Expense", 120_000),
        ];
        let summary = build_expense_summary(
            &entries,
            date("2024-05-01"),
            date("2024-05-31"),
            &overhead_accounts(),
        );

        assert_eq!(summary.total_cents, 228_000);
        let names: Vec<&str> = summary.rows.iter().map(|r| r.account.as_str()).collect();
        assert_eq!(names, vec!["Salaries Expense", "Rent Expense", "Utilities Expense"]);
        assert_eq!(summary.rows[1].total_cents, 100_000);
        assert_eq!(summary.rows[1].count, 2);
    }

    #[test]
    fn test_non_whitelisted_accounts_ignored() {
        let entries = vec![
            posted("2024-05-01", "Rent Expense", 10_000),
            posted("2024-05-01", "Cost of Goods Sold", 90_000),
        ];
        let summary = build_expense_summary(
            &entries,
            date("2024-05-01"),
            date("2024-05-31"),
            &overhead_accounts(),
        );
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.total_cents, 10_000);
        assert!((summary.rows[0].percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_range() {
        let entries = vec![posted("2024-06-01", "Rent Expense", 10_000)];
        let summary = build_expense_summary(
            &entries,
            date("2024-05-01"),
            date("2024-05-31"),
            &overhead_accounts(),
        );
        assert!(summary.rows.is_empty());
        assert_eq!(summary.total_cents, 0);
    }
}
