use thiserror::Error;

use crate::domain::{Cents, EntryStatus};
use crate::reports::TaxonomyError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    #[error("Entry {id} is {status}; only draft or pending entries can be {action}")]
    EntryNotActionable {
        id: String,
        status: EntryStatus,
        action: &'static str,
    },

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error(
        "Payment of {requested} cents exceeds outstanding balance of {balance} cents on {party}'s document"
    )]
    PaymentExceedsBalance {
        party: String,
        balance: Cents,
        requested: Cents,
    },

    #[error("Invalid category taxonomy: {0}")]
    Taxonomy(#[from] TaxonomyError),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
