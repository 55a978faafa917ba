use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{AccountType, Cents, Chart, JournalEntry, journal};

/// One account's netted position. Debit-normal accounts (assets, expenses)
/// carry their net in the debit column, the rest in the credit column; the
/// other column is zero. A net on the wrong side stays negative rather than
/// being moved across.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account: String,
    /// None when the entry references an account missing from the chart
    pub account_type: Option<AccountType>,
    pub debit_cents: Cents,
    pub credit_cents: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: Cents,
    pub total_credit: Cents,
    /// Reconciliation warning, never auto-corrected
    pub is_balanced: bool,
    pub imbalance_cents: Cents,
}

impl TrialBalance {
    pub fn row(&self, account: &str) -> Option<&TrialBalanceRow> {
        self.rows.iter().find(|r| r.account == account)
    }

    /// Net balance of an account in its normal column, zero if absent.
    pub fn net_of(&self, account: &str) -> Cents {
        self.row(account)
            .map(|r| r.debit_cents + r.credit_cents)
            .unwrap_or(0)
    }
}

/// Build the trial balance from a snapshot of journal entries.
///
/// Only Posted entries contribute. Each entry is expanded through the
/// journal-line expander, so GST entries contribute their control-account
/// lines exactly as the journal book shows them. Entries posting both sides
/// to the same account are kept and net to zero.
pub fn build_trial_balance(entries: &[JournalEntry], chart: &Chart) -> TrialBalance {
    let mut debits: HashMap<String, Cents> = HashMap::new();
    let mut credits: HashMap<String, Cents> = HashMap::new();

    for entry in entries.iter().filter(|e| e.is_posted()) {
        for line in journal::expand(entry, chart) {
            *debits.entry(line.account.clone()).or_insert(0) += line.debit_cents();
            *credits.entry(line.account).or_insert(0) += line.credit_cents();
        }
    }

    let mut names: Vec<String> = debits.keys().chain(credits.keys()).cloned().collect();
    names.sort();
    names.dedup();

    let mut rows = Vec::with_capacity(names.len());
    let mut total_debit = 0;
    let mut total_credit = 0;

    for name in names {
        let debit = debits.get(&name).copied().unwrap_or(0);
        let credit = credits.get(&name).copied().unwrap_or(0);
        let account_type = chart.type_of(&name);

        // Accounts missing from the chart net debit-normal.
        let debit_normal = account_type.map(|t| t.is_debit_normal()).unwrap_or(true);
        let (debit_cents, credit_cents) = if debit_normal {
            (debit - credit, 0)
        } else {
            (0, credit - debit)
        };

        total_debit += debit_cents;
        total_credit += credit_cents;

        rows.push(TrialBalanceRow {
            account: name,
            account_type,
            debit_cents,
            credit_cents,
        });
    }

    TrialBalance {
        rows,
        total_debit,
        total_credit,
        is_balanced: total_debit == total_credit,
        imbalance_cents: total_debit - total_credit,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{EntryStatus, GstTreatment, default_chart};

    fn chart() -> Chart {
        Chart::new(default_chart())
    }

    fn posted(debit: &str, credit: &str, amount: Cents) -> JournalEntry {
        JournalEntry::new(Utc::now(), "test", debit, credit, amount)
            .with_status(EntryStatus::Posted)
    }

    #[test]
    fn test_empty_ledger() {
        let tb = build_trial_balance(&[], &chart());
        assert!(tb.rows.is_empty());
        assert!(tb.is_balanced);
        assert_eq!(tb.imbalance_cents, 0);
    }

    #[test]
    fn test_worked_example() {
        // Cash sale of 1000, then 200 rent paid from cash.
        let entries = vec![
            posted("Cash", "Sales Revenue", 100_000),
            posted("Rent Expense", "Cash", 20_000),
        ];
        let tb = build_trial_balance(&entries, &chart());

        assert_eq!(tb.net_of("Cash"), 80_000);
        assert_eq!(tb.net_of("Sales Revenue"), 100_000);
        assert_eq!(tb.net_of("Rent Expense"), 20_000);
        assert_eq!(tb.total_debit, 100_000);
        assert_eq!(tb.total_credit, 100_000);
        assert!(tb.is_balanced);
    }

    #[test]
    fn test_only_posted_entries_contribute() {
        let draft = JournalEntry::new(Utc::now(), "draft", "Cash", "Sales Revenue", 50_000);
        let entries = vec![posted("Cash", "Sales Revenue", 100_000), draft];
        let tb = build_trial_balance(&entries, &chart());
        assert_eq!(tb.net_of("Cash"), 100_000);
    }

    #[test]
    fn test_gst_entry_stays_balanced() {
        let entry = JournalEntry::new(Utc::now(), "sale", "Cash", "Sales Revenue", 100_000)
            .with_status(EntryStatus::Posted)
            .with_gst(GstTreatment::CgstSgst, 1800);
        let tb = build_trial_balance(&[entry], &chart());

        assert_eq!(tb.net_of("Cash"), 118_000);
        assert_eq!(tb.net_of("Sales Revenue"), 100_000);
        assert_eq!(tb.net_of("CGST Payable"), 9_000);
        assert_eq!(tb.net_of("SGST Payable"), 9_000);
        assert!(tb.is_balanced);
    }

    #[test]
    fn test_same_account_entry_nets_to_zero() {
        let entries = vec![posted("Cash", "Cash", 10_000)];
        let tb = build_trial_balance(&entries, &chart());
        assert_eq!(tb.net_of("Cash"), 0);
        assert!(tb.is_balanced);
    }

    #[test]
    fn test_unknown_account_nets_debit_normal() {
        let entries = vec![posted("Sundry Deposits", "Cash", 5_000)];
        let tb = build_trial_balance(&entries, &chart());
        let row = tb.row("Sundry Deposits").unwrap();
        assert_eq!(row.account_type, None);
        assert_eq!(row.debit_cents, 5_000);
    }
}
