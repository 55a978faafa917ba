mod account;
mod document;
mod entry;
pub mod journal;
mod money;

pub use account::*;
pub use document::*;
pub use entry::*;
pub use journal::*;
pub use money::*;
