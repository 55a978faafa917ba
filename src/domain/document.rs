use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, PartyType, RateBps};

pub type DocumentId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentStatus {
    Open,
    Paid,
    Overdue,
    PartiallyPaid,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Open => "open",
            DocumentStatus::Paid => "paid",
            DocumentStatus::Overdue => "overdue",
            DocumentStatus::PartiallyPaid => "partially-paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(DocumentStatus::Open),
            "paid" => Some(DocumentStatus::Paid),
            "overdue" => Some(DocumentStatus::Overdue),
            "partially-paid" | "partially_paid" => Some(DocumentStatus::PartiallyPaid),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: Cents,
    pub amount_cents: Cents,
    pub tax_rate_bps: RateBps,
    pub tax_cents: Cents,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: i64,
        unit_price_cents: Cents,
        tax_rate_bps: RateBps,
    ) -> Self {
        let amount_cents = quantity * unit_price_cents;
        let tax_cents = super::gst_cents(amount_cents, tax_rate_bps);
        Self {
            description: description.into(),
            quantity,
            unit_price_cents,
            amount_cents,
            tax_rate_bps,
            tax_cents,
        }
    }
}

/// A receivable (invoice, party = customer) or payable (bill, party =
/// supplier) document. The outstanding balance only ever decreases through
/// posted payment entries; the aging scheduler reads it as given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub party_type: PartyType,
    /// Customer or supplier name, used as the aging grouping key
    pub party: String,
    pub doc_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: DocumentStatus,
    pub items: Vec<LineItem>,
    /// Total including tax
    pub amount_cents: Cents,
    /// Outstanding amount
    pub balance_cents: Cents,
}

impl Document {
    pub fn new(
        party_type: PartyType,
        party: impl Into<String>,
        doc_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
        amount_cents: Cents,
    ) -> Self {
        assert!(amount_cents > 0, "Document amount must be positive");
        Self {
            id: Uuid::new_v4(),
            party_type,
            party: party.into(),
            doc_date,
            due_date,
            status: DocumentStatus::Open,
            items: Vec::new(),
            amount_cents,
            balance_cents: amount_cents,
        }
    }

    /// Build a document from line items; the total is the sum of each
    /// item's amount plus tax.
    pub fn from_items(
        party_type: PartyType,
        party: impl Into<String>,
        doc_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
        items: Vec<LineItem>,
    ) -> Self {
        let amount_cents: Cents = items.iter().map(|i| i.amount_cents + i.tax_cents).sum();
        let mut doc = Self::new(party_type, party, doc_date, due_date, amount_cents);
        doc.items = items;
        doc
    }

    pub fn is_receivable(&self) -> bool {
        self.party_type == PartyType::Customer
    }

    pub fn is_outstanding(&self) -> bool {
        self.balance_cents > 0
    }

    /// Apply a payment, flipping the status to PartiallyPaid or Paid.
    /// The caller must reject payments exceeding the outstanding balance.
    pub fn apply_payment(&mut self, amount_cents: Cents) {
        assert!(
            amount_cents > 0 && amount_cents <= self.balance_cents,
            "Payment must be positive and within the outstanding balance"
        );
        self.balance_cents -= amount_cents;
        self.status = if self.balance_cents == 0 {
            DocumentStatus::Paid
        } else {
            DocumentStatus::PartiallyPaid
        };
    }
}
