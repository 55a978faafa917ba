use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::application::EntryFilter;
use crate::domain::{
    Account, AccountId, AccountType, Cents, Document, DocumentId, DocumentStatus, EntryId,
    EntryStatus, GstTreatment, JournalEntry, LineItem, PartyType,
};

use super::{MIGRATION_001_INITIAL, MIGRATION_002_DOCUMENTS};

/// Statistics for ledger integrity verification.
#[derive(Debug, Clone)]
pub struct IntegrityStats {
    pub account_count: i64,
    pub entry_count: i64,
    pub posted_count: i64,
    pub non_positive_amounts: i64,
    pub overdrawn_documents: i64,
}

/// Repository for persisting and querying accounts, journal entries and
/// documents.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::query(MIGRATION_002_DOCUMENTS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Account operations
    // ========================

    /// Save a new account to the database.
    pub async fn save_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, code, name, account_type, parent_code)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id.to_string())
        .bind(&account.code)
        .bind(&account.name)
        .bind(account.account_type.as_str())
        .bind(&account.parent_code)
        .execute(&self.pool)
        .await
        .context("Failed to save account")?;
        Ok(())
    }

    /// Get an account by ID.
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, name, account_type, parent_code
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    /// Get an account by name.
    pub async fn get_account_by_name(&self, name: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, name, account_type, parent_code
            FROM accounts
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    /// List all accounts, ordered by code.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            "SELECT id, code, name, account_type, parent_code FROM accounts ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let id_str: String = row.get("id");
        let account_type_str: String = row.get("account_type");

        Ok(Account {
            id: Uuid::parse_str(&id_str).context("Invalid account ID")?,
            code: row.get("code"),
            name: row.get("name"),
            account_type: AccountType::from_str(&account_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid account type: {}", account_type_str))?,
            parent_code: row.get("parent_code"),
        })
    }

    // ========================
    // Entry operations
    // ========================

    /// Save a new journal entry to the database.
    /// Automatically assigns the next sequence number.
    pub async fn save_entry(&self, entry: &mut JournalEntry) -> Result<()> {
        // Get and increment sequence number atomically
        let sequence = self.next_sequence().await?;
        entry.sequence = sequence;

        sqlx::query(
            r#"
            INSERT INTO journal_entries (id, sequence, date, description, debit_account, credit_account, amount_cents, status, reference, gst_treatment, gst_rate_bps, party_type, party, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.sequence)
        .bind(entry.date.to_rfc3339())
        .bind(&entry.description)
        .bind(&entry.debit_account)
        .bind(&entry.credit_account)
        .bind(entry.amount_cents)
        .bind(entry.status.as_str())
        .bind(&entry.reference)
        .bind(entry.gst_treatment.map(|t| t.as_str()))
        .bind(entry.gst_rate_bps)
        .bind(entry.party_type.map(|p| p.as_str()))
        .bind(&entry.party)
        .bind(entry.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save journal entry")?;

        Ok(())
    }

    /// Get the next sequence number and increment the counter.
    async fn next_sequence(&self) -> Result<i64> {
        let row = sqlx::query(
            r#"
            UPDATE sequence_counter
            SET value = value + 1
            WHERE name = 'entry_sequence'
            RETURNING value
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to get next sequence number")?;

        Ok(row.get("value"))
    }

    /// Get a journal entry by ID.
    pub async fn get_entry(&self, id: EntryId) -> Result<Option<JournalEntry>> {
        let row = sqlx::query(
            r#"
            SELECT id, sequence, date, description, debit_account, credit_account, amount_cents, status, reference, gst_treatment, gst_rate_bps, party_type, party, recorded_at
            FROM journal_entries
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch journal entry")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// List all journal entries, ordered by sequence number.
    pub async fn list_entries(&self) -> Result<Vec<JournalEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, sequence, date, description, debit_account, credit_account, amount_cents, status, reference, gst_treatment, gst_rate_bps, party_type, party, recorded_at
            FROM journal_entries
            ORDER BY sequence
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list journal entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// List journal entries with optional filters.
    pub async fn list_entries_filtered(&self, filter: &EntryFilter) -> Result<Vec<JournalEntry>> {
        // Build query dynamically based on filters
        let mut query = String::from(
            "SELECT id, sequence, date, description, debit_account, credit_account, amount_cents, status, reference, gst_treatment, gst_rate_bps, party_type, party, recorded_at FROM journal_entries WHERE 1=1"
        );

        // Collect all string bindings first so they live long enough
        let from_date_str = filter.from_date.map(|dt| dt.to_rfc3339());
        let to_date_str = filter.to_date.map(|dt| dt.to_rfc3339());

        if filter.status.is_some() {
            query.push_str(" AND status = ?");
        }
        if filter.account.is_some() {
            query.push_str(" AND (debit_account = ? OR credit_account = ?)");
        }
        if filter.from_date.is_some() {
            query.push_str(" AND date >= ?");
        }
        if filter.to_date.is_some() {
            query.push_str(" AND date <= ?");
        }

        query.push_str(" ORDER BY sequence");

        if let Some(lim) = filter.limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }

        let mut sql_query = sqlx::query(&query);

        if let Some(status) = filter.status {
            sql_query = sql_query.bind(status.as_str());
        }
        if let Some(ref account) = filter.account {
            sql_query = sql_query.bind(account).bind(account);
        }
        if let Some(ref fd_str) = from_date_str {
            sql_query = sql_query.bind(fd_str);
        }
        if let Some(ref td_str) = to_date_str {
            sql_query = sql_query.bind(td_str);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list filtered journal entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Update the status of a journal entry.
    pub async fn update_entry_status(&self, id: EntryId, status: EntryStatus) -> Result<()> {
        sqlx::query("UPDATE journal_entries SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update entry status")?;
        Ok(())
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<JournalEntry> {
        let id_str: String = row.get("id");
        let date_str: String = row.get("date");
        let status_str: String = row.get("status");
        let gst_treatment_str: Option<String> = row.get("gst_treatment");
        let party_type_str: Option<String> = row.get("party_type");
        let recorded_at_str: String = row.get("recorded_at");

        Ok(JournalEntry {
            id: Uuid::parse_str(&id_str).context("Invalid entry ID")?,
            sequence: row.get("sequence"),
            date: DateTime::parse_from_rfc3339(&date_str)
                .context("Invalid entry date")?
                .with_timezone(&Utc),
            description: row.get("description"),
            debit_account: row.get("debit_account"),
            credit_account: row.get("credit_account"),
            amount_cents: row.get("amount_cents"),
            status: EntryStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid entry status: {}", status_str))?,
            reference: row.get("reference"),
            gst_treatment: gst_treatment_str
                .map(|s| {
                    GstTreatment::from_str(&s)
                        .ok_or_else(|| anyhow::anyhow!("Invalid GST treatment: {}", s))
                })
                .transpose()?,
            gst_rate_bps: row.get("gst_rate_bps"),
            party_type: party_type_str
                .map(|s| {
                    PartyType::from_str(&s)
                        .ok_or_else(|| anyhow::anyhow!("Invalid party type: {}", s))
                })
                .transpose()?,
            party: row.get("party"),
            recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                .context("Invalid recorded_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Document operations
    // ========================

    /// Save a new document with its line items.
    pub async fn save_document(&self, document: &Document) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, party_type, party, doc_date, due_date, status, amount_cents, balance_cents)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(document.id.to_string())
        .bind(document.party_type.as_str())
        .bind(&document.party)
        .bind(document.doc_date.to_rfc3339())
        .bind(document.due_date.to_rfc3339())
        .bind(document.status.as_str())
        .bind(document.amount_cents)
        .bind(document.balance_cents)
        .execute(&self.pool)
        .await
        .context("Failed to save document")?;

        for (position, item) in document.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO document_items (document_id, position, description, quantity, unit_price_cents, amount_cents, tax_rate_bps, tax_cents)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(document.id.to_string())
            .bind(position as i64)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.amount_cents)
            .bind(item.tax_rate_bps)
            .bind(item.tax_cents)
            .execute(&self.pool)
            .await
            .context("Failed to save document item")?;
        }

        Ok(())
    }

    /// Get a document by ID, including its line items.
    pub async fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
        let row = sqlx::query(
            r#"
            SELECT id, party_type, party, doc_date, due_date, status, amount_cents, balance_cents
            FROM documents
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch document")?;

        match row {
            Some(row) => {
                let mut document = Self::row_to_document(&row)?;
                document.items = self.get_document_items(id).await?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    /// List documents, optionally restricted to one party type, ordered by
    /// due date.
    pub async fn list_documents(&self, party_type: Option<PartyType>) -> Result<Vec<Document>> {
        let rows = match party_type {
            Some(pt) => {
                sqlx::query(
                    r#"
                    SELECT id, party_type, party, doc_date, due_date, status, amount_cents, balance_cents
                    FROM documents
                    WHERE party_type = ?
                    ORDER BY due_date
                    "#,
                )
                .bind(pt.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, party_type, party, doc_date, due_date, status, amount_cents, balance_cents
                    FROM documents
                    ORDER BY due_date
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list documents")?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut document = Self::row_to_document(row)?;
            document.items = self.get_document_items(document.id).await?;
            documents.push(document);
        }
        Ok(documents)
    }

    /// Update a document's outstanding balance and status after a payment.
    pub async fn update_document_balance(
        &self,
        id: DocumentId,
        balance_cents: Cents,
        status: DocumentStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE documents SET balance_cents = ?, status = ? WHERE id = ?")
            .bind(balance_cents)
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update document balance")?;
        Ok(())
    }

    async fn get_document_items(&self, document_id: DocumentId) -> Result<Vec<LineItem>> {
        let rows = sqlx::query(
            r#"
            SELECT description, quantity, unit_price_cents, amount_cents, tax_rate_bps, tax_cents
            FROM document_items
            WHERE document_id = ?
            ORDER BY position
            "#,
        )
        .bind(document_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch document items")?;

        Ok(rows
            .iter()
            .map(|row| LineItem {
                description: row.get("description"),
                quantity: row.get("quantity"),
                unit_price_cents: row.get("unit_price_cents"),
                amount_cents: row.get("amount_cents"),
                tax_rate_bps: row.get("tax_rate_bps"),
                tax_cents: row.get("tax_cents"),
            })
            .collect())
    }

    fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Result<Document> {
        let id_str: String = row.get("id");
        let party_type_str: String = row.get("party_type");
        let doc_date_str: String = row.get("doc_date");
        let due_date_str: String = row.get("due_date");
        let status_str: String = row.get("status");

        Ok(Document {
            id: Uuid::parse_str(&id_str).context("Invalid document ID")?,
            party_type: PartyType::from_str(&party_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid party type: {}", party_type_str))?,
            party: row.get("party"),
            doc_date: DateTime::parse_from_rfc3339(&doc_date_str)
                .context("Invalid document date")?
                .with_timezone(&Utc),
            due_date: DateTime::parse_from_rfc3339(&due_date_str)
                .context("Invalid due date")?
                .with_timezone(&Utc),
            status: DocumentStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid document status: {}", status_str))?,
            items: Vec::new(),
            amount_cents: row.get("amount_cents"),
            balance_cents: row.get("balance_cents"),
        })
    }

    // ========================
    // Integrity
    // ========================

    /// Get statistics for integrity checking.
    pub async fn get_integrity_stats(&self) -> Result<IntegrityStats> {
        let account_count: i64 = sqlx::query("SELECT COUNT(*) as count FROM accounts")
            .fetch_one(&self.pool)
            .await?
            .get("count");

        let entry_count: i64 = sqlx::query("SELECT COUNT(*) as count FROM journal_entries")
            .fetch_one(&self.pool)
            .await?
            .get("count");

        let posted_count: i64 =
            sqlx::query("SELECT COUNT(*) as count FROM journal_entries WHERE status = 'posted'")
                .fetch_one(&self.pool)
                .await?
                .get("count");

        let non_positive_amounts: i64 =
            sqlx::query("SELECT COUNT(*) as count FROM journal_entries WHERE amount_cents <= 0")
                .fetch_one(&self.pool)
                .await?
                .get("count");

        let overdrawn_documents: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM documents
            WHERE balance_cents < 0 OR balance_cents > amount_cents
            "#,
        )
        .fetch_one(&self.pool)
        .await?
        .get("count");

        Ok(IntegrityStats {
            account_count,
            entry_count,
            posted_count,
            non_positive_amounts,
            overdrawn_documents,
        })
    }
}
