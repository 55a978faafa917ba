use chrono::{DateTime, Utc};

use crate::domain::{
    Account, AccountType, Cents, Chart, Document, DocumentId, EntryId, EntryStatus, GstTreatment,
    JournalEntry, JournalLine, LineItem, PartyType, RateBps, default_chart, journal,
};
use crate::reports::{
    AgingReport, BalanceSheet, BalanceSheetTaxonomy, ExpenseSummary, ProfitAndLoss,
    ProfitLossTaxonomy, TrialBalance, build_aging, build_balance_sheet, build_expense_summary,
    build_profit_loss, build_trial_balance, overhead_accounts,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct LedgerService {
    repo: Repository,
    balance_sheet_taxonomy: BalanceSheetTaxonomy,
    profit_loss_taxonomy: ProfitLossTaxonomy,
    overheads: Vec<String>,
}

/// Parameters for recording a journal entry.
pub struct NewEntry {
    pub date: DateTime<Utc>,
    pub description: String,
    pub debit_account: String,
    pub credit_account: String,
    pub amount_cents: Cents,
    pub reference: Option<String>,
    pub gst_treatment: Option<GstTreatment>,
    pub gst_rate_bps: Option<RateBps>,
    pub party_type: Option<PartyType>,
    pub party: Option<String>,
    /// Post immediately instead of leaving the entry in draft
    pub post: bool,
}

/// Filter for querying journal entries.
#[derive(Default)]
pub struct EntryFilter {
    pub status: Option<EntryStatus>,
    pub account: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// One journal-book row: the entry together with its expanded lines.
pub struct JournalBookEntry {
    pub entry: JournalEntry,
    pub lines: Vec<JournalLine>,
}

/// Result of recording a payment against a document.
#[derive(Debug)]
pub struct PaymentResult {
    pub document: Document,
    pub payment_entry: JournalEntry,
}

/// Data-quality report over the whole ledger. Issues are signals for the
/// user, not failures; only the caller decides whether to treat them as
/// fatal.
pub struct IntegrityReport {
    pub account_count: i64,
    pub entry_count: i64,
    pub posted_count: i64,
    pub is_balanced: bool,
    pub imbalance_cents: Cents,
    pub unknown_accounts: Vec<String>,
    pub non_positive_amounts: i64,
    pub overdrawn_documents: i64,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.is_balanced
            && self.unknown_accounts.is_empty()
            && self.non_positive_amounts == 0
            && self.overdrawn_documents == 0
    }

    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.is_balanced {
            issues.push(format!(
                "trial balance is off by {} cents",
                self.imbalance_cents
            ));
        }
        for account in &self.unknown_accounts {
            issues.push(format!(
                "entries reference account '{}' which is not in the chart",
                account
            ));
        }
        if self.non_positive_amounts > 0 {
            issues.push(format!(
                "{} entries have a non-positive amount",
                self.non_positive_amounts
            ));
        }
        if self.overdrawn_documents > 0 {
            issues.push(format!(
                "{} documents have a balance exceeding their total",
                self.overdrawn_documents
            ));
        }
        issues
    }
}

impl LedgerService {
    /// Create a new ledger service with the given repository and the
    /// standard category taxonomies.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            balance_sheet_taxonomy: BalanceSheetTaxonomy::standard(),
            profit_loss_taxonomy: ProfitLossTaxonomy::standard(),
            overheads: overhead_accounts(),
        }
    }

    /// Initialize a new database at the given path and seed the default
    /// chart of accounts.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        let service = Self::new(repo);
        for account in default_chart() {
            service.repo.save_account(&account).await?;
        }
        Ok(service)
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Account operations
    // ========================

    /// Create a new account. Names are the key journal entries reference,
    /// so they must be unique.
    pub async fn create_account(
        &self,
        code: String,
        name: String,
        account_type: AccountType,
        parent_code: Option<String>,
    ) -> Result<Account, AppError> {
        if self.repo.get_account_by_name(&name).await?.is_some() {
            return Err(AppError::AccountAlreadyExists(name));
        }

        let mut account = Account::new(code, name, account_type);
        if let Some(parent) = parent_code {
            account = account.with_parent(parent);
        }

        self.repo.save_account(&account).await?;
        Ok(account)
    }

    pub async fn get_account(&self, name: &str) -> Result<Account, AppError> {
        self.repo
            .get_account_by_name(name)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(name.to_string()))
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    /// Load the full chart of accounts.
    pub async fn chart(&self) -> Result<Chart, AppError> {
        Ok(Chart::new(self.repo.list_accounts().await?))
    }

    // ========================
    // Entry operations
    // ========================

    /// Record a journal entry. Account names are deliberately not checked
    /// against the chart; unknown names surface through `check_integrity`.
    pub async fn record_entry(&self, new: NewEntry) -> Result<JournalEntry, AppError> {
        if new.amount_cents <= 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }
        if let Some(rate) = new.gst_rate_bps {
            if !(0..=10_000).contains(&rate) {
                return Err(AppError::InvalidAmount(
                    "GST rate must be between 0 and 100 percent".to_string(),
                ));
            }
        }

        let mut entry = JournalEntry::new(
            new.date,
            new.description,
            new.debit_account,
            new.credit_account,
            new.amount_cents,
        );
        if let Some(reference) = new.reference {
            entry = entry.with_reference(reference);
        }
        if let (Some(treatment), Some(rate)) = (new.gst_treatment, new.gst_rate_bps) {
            entry = entry.with_gst(treatment, rate);
        }
        if let (Some(party_type), Some(party)) = (new.party_type, new.party) {
            entry = entry.with_party(party_type, party);
        }
        if new.post {
            entry = entry.with_status(EntryStatus::Posted);
        }

        self.repo.save_entry(&mut entry).await?;
        Ok(entry)
    }

    pub async fn get_entry(&self, id: EntryId) -> Result<JournalEntry, AppError> {
        self.repo
            .get_entry(id)
            .await?
            .ok_or_else(|| AppError::EntryNotFound(id.to_string()))
    }

    pub async fn list_entries(&self, filter: EntryFilter) -> Result<Vec<JournalEntry>, AppError> {
        Ok(self.repo.list_entries_filtered(&filter).await?)
    }

    /// Post a draft or pending entry, making it visible to the financial
    /// statements. Posted entries are immutable.
    pub async fn post_entry(&self, id: EntryId) -> Result<JournalEntry, AppError> {
        self.transition_entry(id, EntryStatus::Posted, "posted")
            .await
    }

    /// Reject a draft or pending entry, keeping it for the audit trail.
    pub async fn reject_entry(&self, id: EntryId) -> Result<JournalEntry, AppError> {
        self.transition_entry(id, EntryStatus::Rejected, "rejected")
            .await
    }

    async fn transition_entry(
        &self,
        id: EntryId,
        to: EntryStatus,
        action: &'static str,
    ) -> Result<JournalEntry, AppError> {
        let mut entry = self.get_entry(id).await?;
        if !matches!(entry.status, EntryStatus::Draft | EntryStatus::Pending) {
            return Err(AppError::EntryNotActionable {
                id: id.to_string(),
                status: entry.status,
                action,
            });
        }
        self.repo.update_entry_status(id, to).await?;
        entry.status = to;
        Ok(entry)
    }

    // ========================
    // Document operations
    // ========================

    /// Create an invoice for `amount_cents`, or from `items` when the list
    /// is non-empty (the total is then derived from the items and
    /// `amount_cents` is ignored).
    pub async fn create_invoice(
        &self,
        customer: String,
        doc_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
        amount_cents: Cents,
        items: Vec<LineItem>,
    ) -> Result<Document, AppError> {
        self.create_document(
            PartyType::Customer,
            customer,
            doc_date,
            due_date,
            amount_cents,
            items,
        )
        .await
    }

    /// Create a bill; same amount/items semantics as `create_invoice`.
    pub async fn create_bill(
        &self,
        supplier: String,
        doc_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
        amount_cents: Cents,
        items: Vec<LineItem>,
    ) -> Result<Document, AppError> {
        self.create_document(
            PartyType::Supplier,
            supplier,
            doc_date,
            due_date,
            amount_cents,
            items,
        )
        .await
    }

    async fn create_document(
        &self,
        party_type: PartyType,
        party: String,
        doc_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
        amount_cents: Cents,
        items: Vec<LineItem>,
    ) -> Result<Document, AppError> {
        let document = if items.is_empty() {
            if amount_cents <= 0 {
                return Err(AppError::InvalidAmount(
                    "Amount must be positive".to_string(),
                ));
            }
            Document::new(party_type, party, doc_date, due_date, amount_cents)
        } else {
            let total: Cents = items.iter().map(|i| i.amount_cents + i.tax_cents).sum();
            if total <= 0 {
                return Err(AppError::InvalidAmount(
                    "Items must total a positive amount".to_string(),
                ));
            }
            Document::from_items(party_type, party, doc_date, due_date, items)
        };
        self.repo.save_document(&document).await?;
        Ok(document)
    }

    pub async fn get_document(&self, id: DocumentId) -> Result<Document, AppError> {
        self.repo
            .get_document(id)
            .await?
            .ok_or_else(|| AppError::DocumentNotFound(id.to_string()))
    }

    pub async fn list_documents(
        &self,
        party_type: PartyType,
        include_settled: bool,
    ) -> Result<Vec<Document>, AppError> {
        let documents = self.repo.list_documents(Some(party_type)).await?;
        Ok(if include_settled {
            documents
        } else {
            documents.into_iter().filter(|d| d.is_outstanding()).collect()
        })
    }

    /// List every document regardless of party type or status.
    pub async fn list_all_documents(&self) -> Result<Vec<Document>, AppError> {
        Ok(self.repo.list_documents(None).await?)
    }

    /// Record a payment against an invoice or bill. The outstanding
    /// balance only moves through this path: the payment itself is a
    /// posted journal entry against the settlement account.
    pub async fn record_payment(
        &self,
        document_id: DocumentId,
        amount_cents: Cents,
        settlement_account: &str,
        date: DateTime<Utc>,
    ) -> Result<PaymentResult, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::InvalidAmount(
                "Payment must be positive".to_string(),
            ));
        }

        let mut document = self.get_document(document_id).await?;
        if amount_cents > document.balance_cents {
            return Err(AppError::PaymentExceedsBalance {
                party: document.party.clone(),
                balance: document.balance_cents,
                requested: amount_cents,
            });
        }

        let (debit, credit, description) = match document.party_type {
            PartyType::Customer => (
                settlement_account.to_string(),
                "Accounts Receivable".to_string(),
                format!("Payment received from {}", document.party),
            ),
            PartyType::Supplier => (
                "Accounts Payable".to_string(),
                settlement_account.to_string(),
                format!("Payment made to {}", document.party),
            ),
        };

        let mut payment_entry = JournalEntry::new(date, description, debit, credit, amount_cents)
            .with_status(EntryStatus::Posted)
            .with_party(document.party_type, document.party.clone())
            .with_reference(document.id.to_string());
        self.repo.save_entry(&mut payment_entry).await?;

        document.apply_payment(amount_cents);
        self.repo
            .update_document_balance(document.id, document.balance_cents, document.status)
            .await?;

        Ok(PaymentResult {
            document,
            payment_entry,
        })
    }

    // ========================
    // Snapshot restore
    // ========================

    /// Restore an account from a snapshot. Returns false when an account
    /// with the same name already exists and the row is skipped.
    pub async fn restore_account(&self, account: &Account) -> Result<bool, AppError> {
        if self.repo.get_account_by_name(&account.name).await?.is_some() {
            return Ok(false);
        }
        self.repo.save_account(account).await?;
        Ok(true)
    }

    /// Restore a journal entry from a snapshot, preserving its status.
    /// The sequence number is reassigned; snapshots are restored in
    /// sequence order so relative ordering survives.
    pub async fn restore_entry(&self, entry: &JournalEntry) -> Result<JournalEntry, AppError> {
        let mut entry = entry.clone();
        self.repo.save_entry(&mut entry).await?;
        Ok(entry)
    }

    /// Restore a document from a snapshot as-is, balance included.
    pub async fn restore_document(&self, document: &Document) -> Result<(), AppError> {
        self.repo.save_document(document).await?;
        Ok(())
    }

    // ========================
    // Reports
    // ========================

    pub async fn trial_balance(&self) -> Result<TrialBalance, AppError> {
        let entries = self.repo.list_entries().await?;
        let chart = self.chart().await?;
        Ok(build_trial_balance(&entries, &chart))
    }

    pub async fn balance_sheet(&self) -> Result<BalanceSheet, AppError> {
        let trial_balance = self.trial_balance().await?;
        let chart = self.chart().await?;
        Ok(build_balance_sheet(
            &trial_balance,
            &chart,
            &self.balance_sheet_taxonomy,
        )?)
    }

    pub async fn profit_and_loss(
        &self,
        from_date: DateTime<Utc>,
        to_date: DateTime<Utc>,
    ) -> Result<ProfitAndLoss, AppError> {
        let entries = self.repo.list_entries().await?;
        Ok(build_profit_loss(
            &entries,
            from_date,
            to_date,
            &self.profit_loss_taxonomy,
        )?)
    }

    pub async fn expense_summary(
        &self,
        from_date: DateTime<Utc>,
        to_date: DateTime<Utc>,
    ) -> Result<ExpenseSummary, AppError> {
        let entries = self.repo.list_entries().await?;
        Ok(build_expense_summary(
            &entries,
            from_date,
            to_date,
            &self.overheads,
        ))
    }

    pub async fn receivables_aging(&self, as_of: DateTime<Utc>) -> Result<AgingReport, AppError> {
        let documents = self.repo.list_documents(Some(PartyType::Customer)).await?;
        Ok(build_aging(&documents, as_of))
    }

    pub async fn payables_aging(&self, as_of: DateTime<Utc>) -> Result<AgingReport, AppError> {
        let documents = self.repo.list_documents(Some(PartyType::Supplier)).await?;
        Ok(build_aging(&documents, as_of))
    }

    /// The journal book: entries matching the filter, each expanded into
    /// its posting lines (GST control-account lines included).
    pub async fn journal_book(&self, filter: EntryFilter) -> Result<Vec<JournalBookEntry>, AppError> {
        let entries = self.repo.list_entries_filtered(&filter).await?;
        let chart = self.chart().await?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let lines = journal::expand(&entry, &chart);
                JournalBookEntry { entry, lines }
            })
            .collect())
    }

    // ========================
    // Integrity
    // ========================

    /// Check ledger data quality. Imbalances and unknown account names
    /// are reported, never corrected.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let stats = self.repo.get_integrity_stats().await?;
        let entries = self.repo.list_entries().await?;
        let chart = self.chart().await?;

        let trial_balance = build_trial_balance(&entries, &chart);

        let mut unknown_accounts: Vec<String> = entries
            .iter()
            .flat_map(|e| [e.debit_account.as_str(), e.credit_account.as_str()])
            .filter(|name| chart.get(name).is_none())
            .map(|name| name.to_string())
            .collect();
        unknown_accounts.sort();
        unknown_accounts.dedup();

        Ok(IntegrityReport {
            account_count: stats.account_count,
            entry_count: stats.entry_count,
            posted_count: stats.posted_count,
            is_balanced: trial_balance.is_balanced,
            imbalance_cents: trial_balance.imbalance_cents,
            unknown_accounts,
            non_positive_amounts: stats.non_positive_amounts,
            overdrawn_documents: stats.overdrawn_documents,
        })
    }
}
