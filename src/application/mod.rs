mod error;
mod service;

pub use error::AppError;
pub use service::{
    EntryFilter, IntegrityReport, JournalBookEntry, LedgerService, NewEntry, PaymentResult,
};
