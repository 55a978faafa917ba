use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{EntryFilter, LedgerService};
use crate::domain::{Account, Document, JournalEntry};

/// Database snapshot for full export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
    pub entries: Vec<JournalEntry>,
    pub documents: Vec<Document>,
}

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export journal entries to CSV format
    pub async fn export_entries_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.service.list_entries(EntryFilter::default()).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record([
            "id",
            "sequence",
            "date",
            "description",
            "debit_account",
            "credit_account",
            "amount_cents",
            "status",
            "reference",
            "gst_treatment",
            "gst_rate_bps",
            "party_type",
            "party",
        ])?;

        let mut count = 0;
        for entry in &entries {
            csv_writer.write_record([
                entry.id.to_string(),
                entry.sequence.to_string(),
                entry.date.to_rfc3339(),
                entry.description.clone(),
                entry.debit_account.clone(),
                entry.credit_account.clone(),
                entry.amount_cents.to_string(),
                entry.status.to_string(),
                entry.reference.clone().unwrap_or_default(),
                entry
                    .gst_treatment
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                entry
                    .gst_rate_bps
                    .map(|r| r.to_string())
                    .unwrap_or_default(),
                entry
                    .party_type
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
                entry.party.clone().unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the trial balance to CSV format
    pub async fn export_trial_balance_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let trial_balance = self.service.trial_balance().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record(["account", "type", "debit_cents", "credit_cents"])?;

        let mut count = 0;
        for row in &trial_balance.rows {
            csv_writer.write_record([
                row.account.clone(),
                row.account_type.map(|t| t.to_string()).unwrap_or_default(),
                row.debit_cents.to_string(),
                row.credit_cents.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.write_record([
            "TOTAL".to_string(),
            String::new(),
            trial_balance.total_debit.to_string(),
            trial_balance.total_credit.to_string(),
        ])?;

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export a receivables or payables aging report to CSV format
    pub async fn export_aging_csv<W: Write>(
        &self,
        writer: W,
        receivables: bool,
        as_of: DateTime<Utc>,
    ) -> Result<usize> {
        let report = if receivables {
            self.service.receivables_aging(as_of).await?
        } else {
            self.service.payables_aging(as_of).await?
        };
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record([
            "party",
            "current",
            "1_30",
            "31_60",
            "61_90",
            "over_90",
            "total",
        ])?;

        let mut count = 0;
        for party in &report.parties {
            let b = &party.buckets;
            csv_writer.write_record([
                party.party.clone(),
                b.current.to_string(),
                b.days_1_30.to_string(),
                b.days_31_60.to_string(),
                b.days_61_90.to_string(),
                b.days_over_90.to_string(),
                b.total().to_string(),
            ])?;
            count += 1;
        }

        let t = &report.total;
        csv_writer.write_record([
            "TOTAL".to_string(),
            t.current.to_string(),
            t.days_1_30.to_string(),
            t.days_31_60.to_string(),
            t.days_61_90.to_string(),
            t.days_over_90.to_string(),
            t.total().to_string(),
        ])?;

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full ledger as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let accounts = self.service.list_accounts().await?;
        let entries = self.service.list_entries(EntryFilter::default()).await?;
        let documents = self.service.list_all_documents().await?;

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            accounts,
            entries,
            documents,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
