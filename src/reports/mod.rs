//! Pure report builders: every function here is a synchronous,
//! referentially transparent function of its input snapshot. Nothing is
//! cached; reports are recomputed on every call.

mod aging;
mod balance_sheet;
mod categories;
mod expense_summary;
mod profit_loss;
mod trial_balance;

pub use aging::*;
pub use balance_sheet::*;
pub use categories::*;
pub use expense_summary::*;
pub use profit_loss::*;
pub use trial_balance::*;
