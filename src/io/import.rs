use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::io::Read;

use crate::application::{LedgerService, NewEntry};
use crate::domain::{AccountType, EntryStatus, GstTreatment, PartyType, parse_cents, parse_rate_bps};
use crate::io::export::LedgerSnapshot;

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
    pub skip_duplicates: bool,
    pub create_missing_accounts: bool,
    pub validate_only: bool,
}

/// Importer for loading data into the ledger
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import journal entries from CSV. Expected columns:
    /// date, description, debit_account, credit_account, amount,
    /// reference, gst_treatment, gst_rate, party_type, party, status.
    /// Amounts and rates are in display form ("118.00", "18"); entries with
    /// status "posted" are posted immediately, everything else lands as a
    /// draft.
    pub async fn import_entries_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let date_str = record.get(0).unwrap_or("");
            let description = record.get(1).unwrap_or("").to_string();
            let debit_account = record.get(2).unwrap_or("").to_string();
            let credit_account = record.get(3).unwrap_or("").to_string();
            let amount_str = record.get(4).unwrap_or("");
            let reference = record.get(5).and_then(non_empty);
            let gst_treatment_str = record.get(6).and_then(non_empty);
            let gst_rate_str = record.get(7).and_then(non_empty);
            let party_type_str = record.get(8).and_then(non_empty);
            let party = record.get(9).and_then(non_empty);
            let status_str = record.get(10).unwrap_or("draft");

            let date = match parse_date(date_str) {
                Ok(d) => d,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("date".to_string()),
                        error: format!("Invalid date: {}", e),
                    });
                    continue;
                }
            };

            let amount_cents = match parse_cents(amount_str) {
                Ok(a) => a,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("amount".to_string()),
                        error: format!("Invalid amount: {}", e),
                    });
                    continue;
                }
            };

            let gst_treatment = match gst_treatment_str {
                Some(s) => match GstTreatment::from_str(&s) {
                    Some(t) => Some(t),
                    None => {
                        errors.push(ImportError {
                            line,
                            field: Some("gst_treatment".to_string()),
                            error: format!("Invalid GST treatment: {}", s),
                        });
                        continue;
                    }
                },
                None => None,
            };

            let gst_rate_bps = match gst_rate_str {
                Some(s) => match parse_rate_bps(&s) {
                    Ok(r) => Some(r),
                    Err(e) => {
                        errors.push(ImportError {
                            line,
                            field: Some("gst_rate".to_string()),
                            error: format!("Invalid GST rate: {}", e),
                        });
                        continue;
                    }
                },
                None => None,
            };

            let party_type = match party_type_str {
                Some(s) => match PartyType::from_str(&s) {
                    Some(p) => Some(p),
                    None => {
                        errors.push(ImportError {
                            line,
                            field: Some("party_type".to_string()),
                            error: format!("Invalid party type: {}", s),
                        });
                        continue;
                    }
                },
                None => None,
            };

            // Validate accounts exist (or create them)
            if options.create_missing_accounts {
                if let Err(e) = ensure_account_exists(self.service, &debit_account).await {
                    errors.push(ImportError {
                        line,
                        field: Some("debit_account".to_string()),
                        error: format!("Account error: {}", e),
                    });
                    continue;
                }
                if let Err(e) = ensure_account_exists(self.service, &credit_account).await {
                    errors.push(ImportError {
                        line,
                        field: Some("credit_account".to_string()),
                        error: format!("Account error: {}", e),
                    });
                    continue;
                }
            }

            // Skip actual import if dry run or validate only
            if options.dry_run || options.validate_only {
                imported += 1;
                continue;
            }

            let post = EntryStatus::from_str(status_str) == Some(EntryStatus::Posted);

            match self
                .service
                .record_entry(NewEntry {
                    date,
                    description,
                    debit_account,
                    credit_account,
                    amount_cents,
                    reference,
                    gst_treatment,
                    gst_rate_bps,
                    party_type,
                    party,
                    post,
                })
                .await
            {
                Ok(_) => {
                    imported += 1;
                }
                Err(e) => {
                    if options.skip_duplicates {
                        skipped += 1;
                    } else {
                        errors.push(ImportError {
                            line,
                            field: None,
                            error: format!("Entry creation failed: {}", e),
                        });
                    }
                }
            }
        }

        Ok(ImportResult {
            imported,
            skipped,
            errors,
        })
    }

    /// Restore a full ledger from a JSON snapshot: accounts first, then
    /// journal entries in sequence order, then documents.
    pub async fn import_full_json<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let snapshot: LedgerSnapshot = serde_json::from_reader(reader)?;

        if options.dry_run || options.validate_only {
            // Just validate the JSON structure
            return Ok(ImportResult {
                imported: snapshot.accounts.len()
                    + snapshot.entries.len()
                    + snapshot.documents.len(),
                skipped: 0,
                errors: Vec::new(),
            });
        }

        let mut imported = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();

        for account in &snapshot.accounts {
            match self.service.restore_account(account).await {
                Ok(true) => imported += 1,
                Ok(false) => skipped += 1,
                Err(e) => errors.push(ImportError {
                    line: 0,
                    field: Some(account.name.clone()),
                    error: format!("Account restore failed: {}", e),
                }),
            }
        }

        let mut entries = snapshot.entries.clone();
        entries.sort_by_key(|e| e.sequence);
        for entry in &entries {
            match self.service.restore_entry(entry).await {
                Ok(_) => imported += 1,
                Err(e) => errors.push(ImportError {
                    line: 0,
                    field: Some(entry.id.to_string()),
                    error: format!("Entry restore failed: {}", e),
                }),
            }
        }

        for document in &snapshot.documents {
            match self.service.restore_document(document).await {
                Ok(()) => imported += 1,
                Err(e) => errors.push(ImportError {
                    line: 0,
                    field: Some(document.id.to_string()),
                    error: format!("Document restore failed: {}", e),
                }),
            }
        }

        Ok(ImportResult {
            imported,
            skipped,
            errors,
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

// Helper function to parse a date
fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    // Try RFC3339 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try YYYY-MM-DD format
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    anyhow::bail!("Invalid date format: {}", s)
}

// Helper to ensure an account exists
async fn ensure_account_exists(service: &LedgerService, name: &str) -> Result<()> {
    // Check if account already exists
    if service.get_account(name).await.is_ok() {
        return Ok(());
    }

    // Create a default expense account (user can recode it later)
    service
        .create_account(
            "9999".to_string(),
            name.to_string(),
            AccountType::Expense,
            None,
        )
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-04-01").is_ok());
        assert!(parse_date("2024-04-01T10:30:00Z").is_ok());
        assert!(parse_date("01/04/2024").is_err());
        assert!(parse_date("").is_err());
    }
}
