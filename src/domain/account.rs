use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type AccountId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Cash, bank, receivables, inventory, fixed assets
    Asset,
    /// Payables, loans, taxes collected but not yet remitted
    Liability,
    /// Owner's capital, retained earnings
    Equity,
    /// Sales and other income
    Revenue,
    /// Purchases, overheads, other costs
    Expense,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(AccountType::Asset),
            "liability" => Some(AccountType::Liability),
            "equity" => Some(AccountType::Equity),
            "revenue" => Some(AccountType::Revenue),
            "expense" => Some(AccountType::Expense),
            _ => None,
        }
    }

    /// Debit-normal accounts carry their net balance in the debit column.
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountType::from_str(s).ok_or_else(|| format!("unknown account type: {}", s))
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Short ledger code, e.g. "1001"
    pub code: String,
    /// Unique name referenced by journal entries
    pub name: String,
    pub account_type: AccountType,
    /// Optional parent account code (one level of nesting)
    pub parent_code: Option<String>,
}

impl Account {
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            account_type,
            parent_code: None,
        }
    }

    pub fn with_parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }
}

/// The chart of accounts: an account list with name-keyed lookup and
/// one-level parent roll-up.
#[derive(Debug, Clone, Default)]
pub struct Chart {
    accounts: Vec<Account>,
    by_name: HashMap<String, usize>,
}

impl Chart {
    pub fn new(accounts: Vec<Account>) -> Self {
        let by_name = accounts
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name.clone(), i))
            .collect();
        Self { accounts, by_name }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn get(&self, name: &str) -> Option<&Account> {
        self.by_name.get(name).map(|&i| &self.accounts[i])
    }

    pub fn type_of(&self, name: &str) -> Option<AccountType> {
        self.get(name).map(|a| a.account_type)
    }

    /// Direct children of the account with the given code.
    pub fn children_of(&self, code: &str) -> Vec<&Account> {
        self.accounts
            .iter()
            .filter(|a| a.parent_code.as_deref() == Some(code))
            .collect()
    }

    /// Roll an account's balance up through its children: the parent's own
    /// net plus the nets of all direct children, looked up by name.
    pub fn rolled_up_balance<F>(&self, account: &Account, balance_of: F) -> Cents
    where
        F: Fn(&str) -> Cents,
    {
        let own = balance_of(&account.name);
        let children: Cents = self
            .children_of(&account.code)
            .iter()
            .map(|c| balance_of(&c.name))
            .sum();
        own + children
    }
}

/// The chart seeded on `init`: a standard small-business ledger plus the
/// GST control accounts the journal expander posts to.
pub fn default_chart() -> Vec<Account> {
    vec![
        Account::new("1000", "Cash", AccountType::Asset),
        Account::new("1010", "Bank", AccountType::Asset),
        Account::new("1100", "Accounts Receivable", AccountType::Asset),
        Account::new("1200", "Inventory", AccountType::Asset),
        Account::new("1300", "Prepaid Expenses", AccountType::Asset),
        Account::new("1500", "Machinery", AccountType::Asset),
        Account::new("1510", "Furniture", AccountType::Asset),
        Account::new("1520", "Vehicles", AccountType::Asset),
        Account::new("1600", "CGST Receivable", AccountType::Asset),
        Account::new("1610", "SGST Receivable", AccountType::Asset),
        Account::new("1620", "IGST Receivable", AccountType::Asset),
        Account::new("2000", "Accounts Payable", AccountType::Liability),
        Account::new("2100", "Salaries Payable", AccountType::Liability),
        Account::new("2200", "CGST Payable", AccountType::Liability),
        Account::new("2210", "SGST Payable", AccountType::Liability),
        Account::new("2220", "IGST Payable", AccountType::Liability),
        Account::new("2500", "Bank Loan", AccountType::Liability),
        Account::new("3000", "Owner's Capital", AccountType::Equity),
        Account::new("3100", "Retained Earnings", AccountType::Equity),
        Account::new("4000", "Sales Revenue", AccountType::Revenue),
        Account::new("4100", "Service Revenue", AccountType::Revenue),
        Account::new("4200", "Interest Income", AccountType::Revenue),
        Account::new("4900", "Sales Revenue Returned", AccountType::Revenue),
        Account::new("5000", "Cost of Goods Sold", AccountType::Expense),
        Account::new("5100", "Purchases Returned", AccountType::Expense),
        Account::new("6000", "Rent Expense", AccountType::Expense),
        Account::new("6100", "Salaries Expense", AccountType::Expense),
        Account::new("6200", "Utilities Expense", AccountType::Expense),
        Account::new("6300", "Office Supplies", AccountType::Expense),
        Account::new("6400", "Travel Expense", AccountType::Expense),
        Account::new("6500", "Depreciation Expense", AccountType::Expense),
        Account::new("6600", "Interest Expense", AccountType::Expense),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_roundtrip() {
        for at in [
            AccountType::Asset,
            AccountType::Liability,
            AccountType::Equity,
            AccountType::Revenue,
            AccountType::Expense,
        ] {
            let s = at.as_str();
            let parsed = AccountType::from_str(s).unwrap();
            assert_eq!(at, parsed);
        }
    }

    #[test]
    fn test_normal_balance_sides() {
        assert!(AccountType::Asset.is_debit_normal());
        assert!(AccountType::Expense.is_debit_normal());
        assert!(!AccountType::Liability.is_debit_normal());
        assert!(!AccountType::Equity.is_debit_normal());
        assert!(!AccountType::Revenue.is_debit_normal());
    }

    #[test]
    fn test_chart_lookup() {
        let chart = Chart::new(default_chart());
        assert_eq!(chart.type_of("Cash"), Some(AccountType::Asset));
        assert_eq!(chart.type_of("Sales Revenue"), Some(AccountType::Revenue));
        assert_eq!(chart.type_of("No Such Account"), None);
    }

    #[test]
    fn test_rolled_up_balance() {
        let chart = Chart::new(vec![
            Account::new("1000", "Current Assets", AccountType::Asset),
            Account::new("1001", "Cash", AccountType::Asset).with_parent("1000"),
            Account::new("1002", "Bank", AccountType::Asset).with_parent("1000"),
        ]);
        let parent = chart.get("Current Assets").unwrap();
        let total = chart.rolled_up_balance(parent, |name| match name {
            "Current Assets" => 100,
            "Cash" => 500,
            "Bank" => 2500,
            _ => 0,
        });
        assert_eq!(total, 3100);
    }
}
