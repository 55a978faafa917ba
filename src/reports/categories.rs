use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Balance-sheet section a leaf account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceSheetCategory {
    CurrentAssets,
    FixedAssets,
    OtherAssets,
    CurrentLiabilities,
    LongTermLiabilities,
    Equity,
}

/// Profit-and-loss section an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfitLossCategory {
    Revenue,
    CostOfGoodsSold,
    OperatingExpenses,
    OtherIncome,
    OtherExpenses,
}

impl ProfitLossCategory {
    /// Income-side categories accumulate from the credit side of an entry,
    /// expense-side categories from the debit side.
    pub fn is_income(&self) -> bool {
        matches!(
            self,
            ProfitLossCategory::Revenue | ProfitLossCategory::OtherIncome
        )
    }
}

/// A typed account-name to category mapping. A name placed in two category
/// lists is rejected when the taxonomy is loaded instead of silently
/// classifying into whichever list happened to be checked first.
#[derive(Debug, Clone)]
pub struct CategoryMap<C: Copy> {
    map: HashMap<String, C>,
}

impl<C: Copy> CategoryMap<C> {
    pub fn from_lists<'a, I>(lists: I) -> Result<Self, TaxonomyError>
    where
        I: IntoIterator<Item = (C, &'a [String])>,
    {
        let mut map = HashMap::new();
        for (category, names) in lists {
            for name in names {
                if map.insert(name.clone(), category).is_some() {
                    return Err(TaxonomyError::DuplicateAccount(name.clone()));
                }
            }
        }
        Ok(Self { map })
    }

    pub fn classify(&self, account: &str) -> Option<C> {
        self.map.get(account).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    /// The same account name appears in more than one category list
    DuplicateAccount(String),
}

impl std::fmt::Display for TaxonomyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxonomyError::DuplicateAccount(name) => {
                write!(f, "account '{}' appears in more than one category", name)
            }
        }
    }
}

impl std::error::Error for TaxonomyError {}

/// Balance-sheet taxonomy: which account names roll into which section.
/// Immutable configuration data injected into the builders, never mutated
/// after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetTaxonomy {
    pub current_assets: Vec<String>,
    pub fixed_assets: Vec<String>,
    pub other_assets: Vec<String>,
    pub current_liabilities: Vec<String>,
    pub long_term_liabilities: Vec<String>,
    pub equity: Vec<String>,
}

impl BalanceSheetTaxonomy {
    pub fn standard() -> Self {
        Self {
            current_assets: names(&[
                "Cash",
                "Bank",
                "Accounts Receivable",
                "Inventory",
                "Prepaid Expenses",
                "CGST Receivable",
                "SGST Receivable",
                "IGST Receivable",
            ]),
            fixed_assets: names(&["Machinery", "Furniture", "Vehicles"]),
            other_assets: Vec::new(),
            current_liabilities: names(&[
                "Accounts Payable",
                "Salaries Payable",
                "CGST Payable",
                "SGST Payable",
                "IGST Payable",
            ]),
            long_term_liabilities: names(&["Bank Loan"]),
            equity: names(&["Owner's Capital", "Retained Earnings"]),
        }
    }

    pub fn map(&self) -> Result<CategoryMap<BalanceSheetCategory>, TaxonomyError> {
        CategoryMap::from_lists([
            (
                BalanceSheetCategory::CurrentAssets,
                self.current_assets.as_slice(),
            ),
            (
                BalanceSheetCategory::FixedAssets,
                self.fixed_assets.as_slice(),
            ),
            (
                BalanceSheetCategory::OtherAssets,
                self.other_assets.as_slice(),
            ),
            (
                BalanceSheetCategory::CurrentLiabilities,
                self.current_liabilities.as_slice(),
            ),
            (
                BalanceSheetCategory::LongTermLiabilities,
                self.long_term_liabilities.as_slice(),
            ),
            (BalanceSheetCategory::Equity, self.equity.as_slice()),
        ])
    }
}

/// Profit-and-loss taxonomy. Contra accounts live in the section they
/// offset ("Sales Revenue Returned" under revenue, "Purchases Returned"
/// under COGS) and accumulate with a negative sign from their posting side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitLossTaxonomy {
    pub revenue: Vec<String>,
    pub cost_of_goods_sold: Vec<String>,
    pub operating_expenses: Vec<String>,
    pub other_income: Vec<String>,
    pub other_expenses: Vec<String>,
}

impl ProfitLossTaxonomy {
    pub fn standard() -> Self {
        Self {
            revenue: names(&["Sales Revenue", "Service Revenue", "Sales Revenue Returned"]),
            cost_of_goods_sold: names(&["Cost of Goods Sold", "Purchases Returned"]),
            operating_expenses: names(&[
                "Rent Expense",
                "Salaries Expense",
                "Utilities Expense",
                "Office Supplies",
                "Travel Expense",
                "Depreciation Expense",
            ]),
            other_income: names(&["Interest Income"]),
            other_expenses: names(&["Interest Expense"]),
        }
    }

    pub fn map(&self) -> Result<CategoryMap<ProfitLossCategory>, TaxonomyError> {
        CategoryMap::from_lists([
            (ProfitLossCategory::Revenue, self.revenue.as_slice()),
            (
                ProfitLossCategory::CostOfGoodsSold,
                self.cost_of_goods_sold.as_slice(),
            ),
            (
                ProfitLossCategory::OperatingExpenses,
                self.operating_expenses.as_slice(),
            ),
            (ProfitLossCategory::OtherIncome, self.other_income.as_slice()),
            (
                ProfitLossCategory::OtherExpenses,
                self.other_expenses.as_slice(),
            ),
        ])
    }
}

/// Fixed whitelist of overhead accounts for the expense summary.
pub fn overhead_accounts() -> Vec<String> {
    names(&[
        "Rent Expense",
        "Salaries Expense",
        "Utilities Expense",
        "Office Supplies",
        "Travel Expense",
        "Depreciation Expense",
        "Interest Expense",
    ])
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_taxonomies_load() {
        assert!(BalanceSheetTaxonomy::standard().map().is_ok());
        assert!(ProfitLossTaxonomy::standard().map().is_ok());
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let mut taxonomy = ProfitLossTaxonomy::standard();
        taxonomy.other_expenses.push("Sales Revenue".to_string());
        assert_eq!(
            taxonomy.map().unwrap_err(),
            TaxonomyError::DuplicateAccount("Sales Revenue".to_string())
        );
    }

    #[test]
    fn test_classify() {
        let map = ProfitLossTaxonomy::standard().map().unwrap();
        assert_eq!(
            map.classify("Sales Revenue"),
            Some(ProfitLossCategory::Revenue)
        );
        assert_eq!(
            map.classify("Rent Expense"),
            Some(ProfitLossCategory::OperatingExpenses)
        );
        assert_eq!(map.classify("Cash"), None);
    }
}
