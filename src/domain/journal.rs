use serde::{Deserialize, Serialize};

use super::{AccountType, Cents, Chart, GstTreatment, JournalEntry, split_cgst_sgst};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxComponent {
    Cgst,
    Sgst,
    Igst,
}

impl TaxComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxComponent::Cgst => "CGST",
            TaxComponent::Sgst => "SGST",
            TaxComponent::Igst => "IGST",
        }
    }
}

/// One display/posting row of the journal book. Each line hits exactly one
/// account on exactly one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account: String,
    pub side: Side,
    pub amount_cents: Cents,
    /// Set on lines that carry a GST component rather than the base amount
    pub tax: Option<TaxComponent>,
}

impl JournalLine {
    fn debit(account: impl Into<String>, amount_cents: Cents) -> Self {
        Self {
            account: account.into(),
            side: Side::Debit,
            amount_cents,
            tax: None,
        }
    }

    fn credit(account: impl Into<String>, amount_cents: Cents) -> Self {
        Self {
            account: account.into(),
            side: Side::Credit,
            amount_cents,
            tax: None,
        }
    }

    fn with_tax(mut self, tax: TaxComponent) -> Self {
        self.tax = Some(tax);
        self
    }

    pub fn debit_cents(&self) -> Cents {
        match self.side {
            Side::Debit => self.amount_cents,
            Side::Credit => 0,
        }
    }

    pub fn credit_cents(&self) -> Cents {
        match self.side {
            Side::Credit => self.amount_cents,
            Side::Debit => 0,
        }
    }
}

/// The four transaction shapes the expander distinguishes. Each shape has a
/// fixed mapping of which side carries the gross amount and which side the
/// GST line items land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryShape {
    Sale,
    Purchase,
    SalesReturn,
    PurchaseReturn,
}

/// Classify an entry by its account names, falling back to the chart's
/// account types for revenue detection.
pub fn classify(entry: &JournalEntry, chart: &Chart) -> EntryShape {
    if entry.debit_account.ends_with("Returned")
        && chart.type_of(&entry.debit_account) == Some(AccountType::Revenue)
    {
        return EntryShape::SalesReturn;
    }
    if entry.debit_account == "Sales Revenue Returned" {
        return EntryShape::SalesReturn;
    }
    if entry.credit_account.ends_with("Returned") {
        return EntryShape::PurchaseReturn;
    }
    match chart.type_of(&entry.credit_account) {
        Some(AccountType::Revenue) => EntryShape::Sale,
        Some(_) | None => {
            if entry.credit_account == "Sales Revenue" {
                EntryShape::Sale
            } else {
                EntryShape::Purchase
            }
        }
    }
}

/// Expand an entry into its journal-book lines.
///
/// Without GST this is the plain two-sided posting. With GST, the side that
/// faces the counterparty carries base plus tax, and the tax itself becomes
/// one IGST line or two equal CGST/SGST lines on the other side:
///
/// - sale: debit gross, credit base to revenue, GST credited to the Payable
///   control accounts
/// - purchase: debit base, GST debited to the Receivable control accounts,
///   credit gross
/// - sales return: debit base to the returns account, GST debited back
///   against the Payable accounts as split reversal lines, credit gross
/// - purchase return: exactly two lines with GST folded into both sides and
///   no separate GST line items (asymmetric with sales returns)
pub fn expand(entry: &JournalEntry, chart: &Chart) -> Vec<JournalLine> {
    let base = entry.amount_cents;
    let gst = entry.gst_amount();

    if gst == 0 {
        return vec![
            JournalLine::debit(&entry.debit_account, base),
            JournalLine::credit(&entry.credit_account, base),
        ];
    }

    // gst > 0 implies a treatment is set
    let treatment = entry
        .gst_treatment
        .unwrap_or(GstTreatment::CgstSgst);

    match classify(entry, chart) {
        EntryShape::Sale => {
            let mut lines = vec![
                JournalLine::debit(&entry.debit_account, base + gst),
                JournalLine::credit(&entry.credit_account, base),
            ];
            lines.extend(gst_lines(treatment, gst, Side::Credit, GstDirection::Output));
            lines
        }
        EntryShape::Purchase => {
            let mut lines = vec![JournalLine::debit(&entry.debit_account, base)];
            lines.extend(gst_lines(treatment, gst, Side::Debit, GstDirection::Input));
            lines.push(JournalLine::credit(&entry.credit_account, base + gst));
            lines
        }
        EntryShape::SalesReturn => {
            let mut lines = vec![JournalLine::debit(&entry.debit_account, base)];
            lines.extend(gst_lines(treatment, gst, Side::Debit, GstDirection::Output));
            lines.push(JournalLine::credit(&entry.credit_account, base + gst));
            lines
        }
        EntryShape::PurchaseReturn => {
            vec![
                JournalLine::debit(&entry.debit_account, base + gst),
                JournalLine::credit(&entry.credit_account, base + gst),
            ]
        }
    }
}

/// Whether GST lines post to the output (Payable) or input (Receivable)
/// control accounts.
#[derive(Debug, Clone, Copy)]
enum GstDirection {
    Output,
    Input,
}

impl GstDirection {
    fn account(&self, component: TaxComponent) -> &'static str {
        match (self, component) {
            (GstDirection::Output, TaxComponent::Cgst) => "CGST Payable",
            (GstDirection::Output, TaxComponent::Sgst) => "SGST Payable",
            (GstDirection::Output, TaxComponent::Igst) => "IGST Payable",
            (GstDirection::Input, TaxComponent::Cgst) => "CGST Receivable",
            (GstDirection::Input, TaxComponent::Sgst) => "SGST Receivable",
            (GstDirection::Input, TaxComponent::Igst) => "IGST Receivable",
        }
    }
}

fn gst_lines(
    treatment: GstTreatment,
    gst: Cents,
    side: Side,
    direction: GstDirection,
) -> Vec<JournalLine> {
    let line = |component: TaxComponent, amount: Cents| {
        let account = direction.account(component);
        match side {
            Side::Debit => JournalLine::debit(account, amount).with_tax(component),
            Side::Credit => JournalLine::credit(account, amount).with_tax(component),
        }
    };

    match treatment {
        GstTreatment::CgstSgst => {
            let (cgst, sgst) = split_cgst_sgst(gst);
            vec![
                line(TaxComponent::Cgst, cgst),
                line(TaxComponent::Sgst, sgst),
            ]
        }
        // IGST is never split
        GstTreatment::Igst => vec![line(TaxComponent::Igst, gst)],
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{Account, default_chart};

    fn chart() -> Chart {
        Chart::new(default_chart())
    }

    fn lines_balance(lines: &[JournalLine]) -> bool {
        let debit: Cents = lines.iter().map(|l| l.debit_cents()).sum();
        let credit: Cents = lines.iter().map(|l| l.credit_cents()).sum();
        debit == credit
    }

    #[test]
    fn test_no_gst_two_lines() {
        let entry = JournalEntry::new(Utc::now(), "Rent", "Rent Expense", "Cash", 20_000);
        let lines = expand(&entry, &chart());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], JournalLine::debit("Rent Expense", 20_000));
        assert_eq!(lines[1], JournalLine::credit("Cash", 20_000));
    }

    #[test]
    fn test_sale_cgst_sgst_split() {
        let entry = JournalEntry::new(Utc::now(), "Sale", "Cash", "Sales Revenue", 100_000)
            .with_gst(GstTreatment::CgstSgst, 1800);
        let lines = expand(&entry, &chart());

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], JournalLine::debit("Cash", 118_000));
        assert_eq!(lines[1], JournalLine::credit("Sales Revenue", 100_000));

        let cgst = lines.iter().find(|l| l.tax == Some(TaxComponent::Cgst)).unwrap();
        let sgst = lines.iter().find(|l| l.tax == Some(TaxComponent::Sgst)).unwrap();
        assert_eq!(cgst.account, "CGST Payable");
        assert_eq!(cgst.side, Side::Credit);
        assert_eq!(cgst.amount_cents, 9_000);
        assert_eq!(sgst.account, "SGST Payable");
        assert_eq!(sgst.side, Side::Credit);
        assert_eq!(sgst.amount_cents, 9_000);
        assert!(lines_balance(&lines));
    }

    #[test]
    fn test_purchase_gst_on_debit_side() {
        let entry = JournalEntry::new(
            Utc::now(),
            "Stock purchase",
            "Inventory",
            "Accounts Payable",
            100_000,
        )
        .with_gst(GstTreatment::CgstSgst, 1800);
        let lines = expand(&entry, &chart());

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], JournalLine::debit("Inventory", 100_000));
        let gst_lines: Vec<_> = lines.iter().filter(|l| l.tax.is_some()).collect();
        assert_eq!(gst_lines.len(), 2);
        for line in &gst_lines {
            assert_eq!(line.side, Side::Debit);
            assert_eq!(line.amount_cents, 9_000);
            assert!(line.account.ends_with("Receivable"));
        }
        assert_eq!(lines[3], JournalLine::credit("Accounts Payable", 118_000));
        assert!(lines_balance(&lines));
    }

    #[test]
    fn test_igst_never_split() {
        let entry = JournalEntry::new(Utc::now(), "Sale", "Cash", "Sales Revenue", 100_000)
            .with_gst(GstTreatment::Igst, 1800);
        let lines = expand(&entry, &chart());

        let gst_lines: Vec<_> = lines.iter().filter(|l| l.tax.is_some()).collect();
        assert_eq!(gst_lines.len(), 1);
        assert_eq!(gst_lines[0].tax, Some(TaxComponent::Igst));
        assert_eq!(gst_lines[0].account, "IGST Payable");
        assert_eq!(gst_lines[0].amount_cents, 18_000);
        assert!(lines_balance(&lines));
    }

    #[test]
    fn test_sales_return_splits_gst_reversal() {
        let entry = JournalEntry::new(
            Utc::now(),
            "Goods returned by customer",
            "Sales Revenue Returned",
            "Accounts Receivable",
            50_000,
        )
        .with_gst(GstTreatment::CgstSgst, 1800);
        let lines = expand(&entry, &chart());

        assert_eq!(classify(&entry, &chart()), EntryShape::SalesReturn);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], JournalLine::debit("Sales Revenue Returned", 50_000));
        let gst_lines: Vec<_> = lines.iter().filter(|l| l.tax.is_some()).collect();
        for line in &gst_lines {
            assert_eq!(line.side, Side::Debit);
            assert!(line.account.ends_with("Payable"));
        }
        assert_eq!(lines[3], JournalLine::credit("Accounts Receivable", 59_000));
        assert!(lines_balance(&lines));
    }

    #[test]
    fn test_purchase_return_folds_gst() {
        let entry = JournalEntry::new(
            Utc::now(),
            "Goods returned to supplier",
            "Accounts Payable",
            "Purchases Returned",
            50_000,
        )
        .with_gst(GstTreatment::CgstSgst, 1800);
        let lines = expand(&entry, &chart());

        assert_eq!(classify(&entry, &chart()), EntryShape::PurchaseReturn);
        // GST folded into both sides, no separate GST line items
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], JournalLine::debit("Accounts Payable", 59_000));
        assert_eq!(lines[1], JournalLine::credit("Purchases Returned", 59_000));
        assert!(lines_balance(&lines));
    }

    #[test]
    fn test_classify_service_revenue_as_sale() {
        let entry = JournalEntry::new(Utc::now(), "Consulting", "Bank", "Service Revenue", 10_000);
        assert_eq!(classify(&entry, &chart()), EntryShape::Sale);
    }

    #[test]
    fn test_classify_unknown_accounts_default_to_purchase() {
        let entry = JournalEntry::new(Utc::now(), "Misc", "Sundry", "Petty Cash Float", 1_000);
        assert_eq!(classify(&entry, &chart()), EntryShape::Purchase);
    }

    #[test]
    fn test_same_account_both_sides_is_kept() {
        // Not filtered out: treated as a normal two-sided posting
        let entry = JournalEntry::new(Utc::now(), "Odd", "Cash", "Cash", 1_000);
        let lines = expand(&entry, &chart());
        assert_eq!(lines.len(), 2);
        assert!(lines_balance(&lines));
    }

    #[test]
    fn test_custom_returns_account_via_chart_type() {
        let mut accounts = default_chart();
        accounts.push(Account::new(
            "4910",
            "Export Sales Returned",
            crate::domain::AccountType::Revenue,
        ));
        let chart = Chart::new(accounts);
        let entry = JournalEntry::new(
            Utc::now(),
            "Export return",
            "Export Sales Returned",
            "Accounts Receivable",
            10_000,
        );
        assert_eq!(classify(&entry, &chart), EntryShape::SalesReturn);
    }
}
