use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, JournalEntry};

use super::categories::{ProfitLossCategory, ProfitLossTaxonomy, TaxonomyError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTotal {
    pub account: String,
    pub total_cents: Cents,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfitLossSection {
    pub accounts: Vec<AccountTotal>,
    pub total_cents: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub revenue: ProfitLossSection,
    pub cost_of_goods_sold: ProfitLossSection,
    pub operating_expenses: ProfitLossSection,
    pub other_income: ProfitLossSection,
    pub other_expenses: ProfitLossSection,
    pub gross_profit: Cents,
    pub operating_profit: Cents,
    pub net_profit: Cents,
}

/// Build the profit-and-loss statement over Posted entries dated within
/// `[from_date, to_date]` (inclusive of the end date).
///
/// Income-side categories accumulate from the credit side of an entry and
/// expense-side categories from the debit side; a posting to a category
/// account on its opposite side subtracts, which is how the contra
/// "Returned" accounts reduce their section.
pub fn build_profit_loss(
    entries: &[JournalEntry],
    from_date: DateTime<Utc>,
    to_date: DateTime<Utc>,
    taxonomy: &ProfitLossTaxonomy,
) -> Result<ProfitAndLoss, TaxonomyError> {
    let map = taxonomy.map()?;

    // (category, account) -> total
    let mut totals: HashMap<(ProfitLossCategory, String), Cents> = HashMap::new();

    let in_range =
        |entry: &JournalEntry| entry.date >= from_date && entry.date <= to_date;

    for entry in entries.iter().filter(|e| e.is_posted() && in_range(e)) {
        if let Some(category) = map.classify(&entry.credit_account) {
            let sign = if category.is_income() { 1 } else { -1 };
            *totals
                .entry((category, entry.credit_account.clone()))
                .or_insert(0) += sign * entry.amount_cents;
        }
        if let Some(category) = map.classify(&entry.debit_account) {
            let sign = if category.is_income() { -1 } else { 1 };
            *totals
                .entry((category, entry.debit_account.clone()))
                .or_insert(0) += sign * entry.amount_cents;
        }
    }

    let section = |category: ProfitLossCategory| -> ProfitLossSection {
        let mut accounts: Vec<AccountTotal> = totals
            .iter()
            .filter(|((c, _), _)| *c == category)
            .map(|((_, account), &total_cents)| AccountTotal {
                account: account.clone(),
                total_cents,
            })
            .collect();
        accounts.sort_by(|a, b| a.account.cmp(&b.account));
        let total_cents = accounts.iter().map(|a| a.total_cents).sum();
        ProfitLossSection {
            accounts,
            total_cents,
        }
    };

    let revenue = section(ProfitLossCategory::Revenue);
    let cost_of_goods_sold = section(ProfitLossCategory::CostOfGoodsSold);
    let operating_expenses = section(ProfitLossCategory::OperatingExpenses);
    let other_income = section(ProfitLossCategory::OtherIncome);
    let other_expenses = section(ProfitLossCategory::OtherExpenses);

    let gross_profit = revenue.total_cents - cost_of_goods_sold.total_cents;
    let operating_profit = gross_profit - operating_expenses.total_cents;
    let net_profit = operating_profit + other_income.total_cents - other_expenses.total_cents;

    Ok(ProfitAndLoss {
        from_date,
        to_date,
        revenue,
        cost_of_goods_sold,
        operating_expenses,
        other_income,
        other_expenses,
        gross_profit,
        operating_profit,
        net_profit,
    })
}
