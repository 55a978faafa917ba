use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, RateBps, gst_cents};

pub type EntryId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Editable, excluded from financial statements
    Draft,
    /// Awaiting approval, still excluded from statements
    Pending,
    /// Finalized and included in the trial balance and P&L
    Posted,
    /// Discarded, kept for the audit trail
    Rejected,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Pending => "pending",
            EntryStatus::Posted => "posted",
            EntryStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(EntryStatus::Draft),
            "pending" => Some(EntryStatus::Pending),
            "posted" => Some(EntryStatus::Posted),
            "rejected" => Some(EntryStatus::Rejected),
            _ => None,
        }
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryStatus::from_str(s).ok_or_else(|| format!("unknown entry status: {}", s))
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How GST on an entry is levied: intra-state transactions split the tax
/// into equal CGST and SGST halves, inter-state transactions levy a single
/// IGST for the full amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GstTreatment {
    CgstSgst,
    Igst,
}

impl GstTreatment {
    pub fn as_str(&self) -> &'static str {
        match self {
            GstTreatment::CgstSgst => "cgst-sgst",
            GstTreatment::Igst => "igst",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cgst-sgst" | "cgst_sgst" => Some(GstTreatment::CgstSgst),
            "igst" => Some(GstTreatment::Igst),
            _ => None,
        }
    }
}

impl std::str::FromStr for GstTreatment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GstTreatment::from_str(s).ok_or_else(|| format!("unknown GST treatment: {}", s))
    }
}

impl std::fmt::Display for GstTreatment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyType {
    Customer,
    Supplier,
}

impl PartyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyType::Customer => "customer",
            PartyType::Supplier => "supplier",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "customer" => Some(PartyType::Customer),
            "supplier" => Some(PartyType::Supplier),
            _ => None,
        }
    }
}

impl std::str::FromStr for PartyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartyType::from_str(s).ok_or_else(|| format!("unknown party type: {}", s))
    }
}

impl std::fmt::Display for PartyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A double-entry journal entry. The amount is the base (pre-GST) amount;
/// when a GST treatment is set the tax is derived from `gst_rate_bps` on
/// top of it. Posted entries are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: EntryId,
    /// Monotonically increasing sequence number for ordering
    pub sequence: i64,
    pub date: DateTime<Utc>,
    pub description: String,
    /// Account receiving the debit (references Account.name)
    pub debit_account: String,
    /// Account receiving the credit
    pub credit_account: String,
    /// Base amount in cents, pre-GST (always positive)
    pub amount_cents: Cents,
    pub status: EntryStatus,
    /// External reference (invoice number, voucher, etc.)
    pub reference: Option<String>,
    pub gst_treatment: Option<GstTreatment>,
    /// GST rate in basis points (1800 = 18%)
    pub gst_rate_bps: Option<RateBps>,
    pub party_type: Option<PartyType>,
    /// Customer or supplier name this entry settles against
    pub party: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl JournalEntry {
    pub fn new(
        date: DateTime<Utc>,
        description: impl Into<String>,
        debit_account: impl Into<String>,
        credit_account: impl Into<String>,
        amount_cents: Cents,
    ) -> Self {
        assert!(amount_cents > 0, "Entry amount must be positive");
        Self {
            id: Uuid::new_v4(),
            sequence: 0, // Will be set by repository
            date,
            description: description.into(),
            debit_account: debit_account.into(),
            credit_account: credit_account.into(),
            amount_cents,
            status: EntryStatus::Draft,
            reference: None,
            gst_treatment: None,
            gst_rate_bps: None,
            party_type: None,
            party: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_gst(mut self, treatment: GstTreatment, rate_bps: RateBps) -> Self {
        self.gst_treatment = Some(treatment);
        self.gst_rate_bps = Some(rate_bps);
        self
    }

    pub fn with_party(mut self, party_type: PartyType, party: impl Into<String>) -> Self {
        self.party_type = Some(party_type);
        self.party = Some(party.into());
        self
    }

    pub fn is_posted(&self) -> bool {
        self.status == EntryStatus::Posted
    }

    /// GST amount in cents, zero when no treatment or rate is set.
    pub fn gst_amount(&self) -> Cents {
        match (self.gst_treatment, self.gst_rate_bps) {
            (Some(_), Some(rate)) if rate > 0 => gst_cents(self.amount_cents, rate),
            _ => 0,
        }
    }

    /// Base plus GST: what the counterparty actually owes or is owed.
    pub fn gross_amount(&self) -> Cents {
        self.amount_cents + self.gst_amount()
    }
}
