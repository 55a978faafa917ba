use serde::{Deserialize, Serialize};

use crate::domain::{Cents, Chart};

use super::categories::{BalanceSheetTaxonomy, TaxonomyError};
use super::trial_balance::TrialBalance;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account: String,
    pub balance_cents: Cents,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheetSection {
    pub accounts: Vec<AccountBalance>,
    pub total_cents: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetAssets {
    pub current: BalanceSheetSection,
    pub fixed: BalanceSheetSection,
    pub other: BalanceSheetSection,
    pub total_cents: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetLiabilities {
    pub current: BalanceSheetSection,
    pub long_term: BalanceSheetSection,
    pub total_cents: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub assets: BalanceSheetAssets,
    pub liabilities: BalanceSheetLiabilities,
    pub equity: BalanceSheetSection,
    pub total_liabilities_and_equity: Cents,
    /// Reconciliation warning: assets vs liabilities + equity
    pub is_balanced: bool,
    pub difference_cents: Cents,
}

/// Build the balance sheet by reading each taxonomy account's net out of
/// the trial balance. Accounts absent from the trial balance contribute
/// zero; listed accounts with children in the chart are rolled up (own net
/// plus direct children).
pub fn build_balance_sheet(
    trial_balance: &TrialBalance,
    chart: &Chart,
    taxonomy: &BalanceSheetTaxonomy,
) -> Result<BalanceSheet, TaxonomyError> {
    // Also validates the taxonomy (duplicate names) before any numbers are read.
    let map = taxonomy.map()?;

    let balance_of = |name: &str| -> Cents {
        match chart.get(name) {
            Some(account) if !chart.children_of(&account.code).is_empty() => {
                // A child the taxonomy lists under its own name reports
                // there; the parent's roll-up skips it so the balance is
                // counted once.
                chart.rolled_up_balance(account, |n| {
                    if n != name && map.classify(n).is_some() {
                        0
                    } else {
                        trial_balance.net_of(n)
                    }
                })
            }
            _ => trial_balance.net_of(name),
        }
    };

    let section = |names: &[String]| -> BalanceSheetSection {
        let accounts: Vec<AccountBalance> = names
            .iter()
            .map(|name| AccountBalance {
                account: name.clone(),
                balance_cents: balance_of(name),
            })
            .collect();
        let total_cents = accounts.iter().map(|a| a.balance_cents).sum();
        BalanceSheetSection {
            accounts,
            total_cents,
        }
    };

    let current_assets = section(&taxonomy.current_assets);
    let fixed_assets = section(&taxonomy.fixed_assets);
    let other_assets = section(&taxonomy.other_assets);
    let assets_total =
        current_assets.total_cents + fixed_assets.total_cents + other_assets.total_cents;

    let current_liabilities = section(&taxonomy.current_liabilities);
    let long_term_liabilities = section(&taxonomy.long_term_liabilities);
    let liabilities_total = current_liabilities.total_cents + long_term_liabilities.total_cents;

    let equity = section(&taxonomy.equity);
    let total_liabilities_and_equity = liabilities_total + equity.total_cents;

    Ok(BalanceSheet {
        assets: BalanceSheetAssets {
            current: current_assets,
            fixed: fixed_assets,
            other: other_assets,
            total_cents: assets_total,
        },
        liabilities: BalanceSheetLiabilities {
            current: current_liabilities,
            long_term: long_term_liabilities,
            total_cents: liabilities_total,
        },
        equity,
        total_liabilities_and_equity,
        is_balanced: assets_total == total_liabilities_and_equity,
        difference_cents: assets_total - total_liabilities_and_equity,
    })
}
