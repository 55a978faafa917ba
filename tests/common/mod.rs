// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use munim::application::{LedgerService, NewEntry};
use munim::domain::{Cents, GstTreatment, JournalEntry, RateBps};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Record and post a plain journal entry
pub async fn post_entry(
    service: &LedgerService,
    date: &str,
    description: &str,
    debit: &str,
    credit: &str,
    amount_cents: Cents,
) -> Result<JournalEntry> {
    let entry = service
        .record_entry(NewEntry {
            date: parse_date(date),
            description: description.to_string(),
            debit_account: debit.to_string(),
            credit_account: credit.to_string(),
            amount_cents,
            reference: None,
            gst_treatment: None,
            gst_rate_bps: None,
            party_type: None,
            party: None,
            post: true,
        })
        .await?;
    Ok(entry)
}

/// Record and post a journal entry with GST metadata
pub async fn post_gst_entry(
    service: &LedgerService,
    date: &str,
    description: &str,
    debit: &str,
    credit: &str,
    amount_cents: Cents,
    treatment: GstTreatment,
    rate_bps: RateBps,
) -> Result<JournalEntry> {
    let entry = service
        .record_entry(NewEntry {
            date: parse_date(date),
            description: description.to_string(),
            debit_account: debit.to_string(),
            credit_account: credit.to_string(),
            amount_cents,
            reference: None,
            gst_treatment: Some(treatment),
            gst_rate_bps: Some(rate_bps),
            party_type: None,
            party: None,
            post: true,
        })
        .await?;
    Ok(entry)
}
