mod repository;

pub use repository::*;

/// SQL migration for initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// SQL migration for invoices and bills
pub const MIGRATION_002_DOCUMENTS: &str = include_str!("migrations/002_documents.sql");
