use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{EntryFilter, LedgerService, NewEntry};
use crate::domain::{
    AccountType, EntryStatus, GstTreatment, LineItem, PartyType, Side, format_cents, format_rate,
    parse_cents, parse_rate_bps,
};

/// Munim - General Ledger
#[derive(Parser)]
#[command(name = "munim")]
#[command(about = "A local-first general ledger with GST-aware financial reports")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "munim.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database with the standard chart of accounts
    Init,

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Journal entry commands
    #[command(subcommand)]
    Entry(EntryCommands),

    /// Customer invoice commands
    #[command(subcommand)]
    Invoice(DocumentCommands),

    /// Supplier bill commands
    #[command(subcommand)]
    Bill(DocumentCommands),

    /// Generate financial reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export data to CSV or JSON
    Export {
        /// What to export: entries, trial-balance, receivables, payables, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import data from CSV or JSON
    Import {
        /// What to import: entries, full
        import_type: String,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,

        /// Skip records that fail instead of reporting errors
        #[arg(long)]
        skip_duplicates: bool,

        /// Create accounts that don't exist
        #[arg(long)]
        create_accounts: bool,

        /// Validate without importing
        #[arg(long)]
        validate: bool,
    },

    /// Verify ledger integrity
    Check,
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name (must be unique)
        name: String,

        /// Ledger code, e.g. "6500"
        #[arg(short, long)]
        code: String,

        /// Account type: asset, liability, equity, revenue, expense
        #[arg(short = 't', long = "type")]
        account_type: String,

        /// Parent account code for roll-up
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// List all accounts
    List,

    /// Show detailed account information
    Show {
        /// Account name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum EntryCommands {
    /// Record a journal entry
    Record {
        /// Base amount before GST (e.g., "1000.00" or "1000")
        amount: String,

        /// Account to debit
        #[arg(long)]
        debit: String,

        /// Account to credit
        #[arg(long)]
        credit: String,

        /// Description of the entry
        #[arg(short = 'm', long)]
        description: String,

        /// Date of the entry (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// External reference (invoice number, voucher)
        #[arg(short, long)]
        reference: Option<String>,

        /// GST treatment: cgst-sgst (intra-state) or igst (inter-state)
        #[arg(long)]
        gst: Option<String>,

        /// GST rate as a percentage (e.g., "18" or "2.5")
        #[arg(long)]
        gst_rate: Option<String>,

        /// Party type: customer or supplier
        #[arg(long)]
        party_type: Option<String>,

        /// Customer or supplier name
        #[arg(long)]
        party: Option<String>,

        /// Post immediately instead of leaving a draft
        #[arg(long)]
        post: bool,
    },

    /// List journal entries
    List {
        /// Filter by status: draft, pending, posted, rejected
        #[arg(long)]
        status: Option<String>,

        /// Filter by account name (debit or credit side)
        #[arg(long)]
        account: Option<String>,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from_date: Option<String>,

        /// Filter to date (YYYY-MM-DD)
        #[arg(long)]
        to_date: Option<String>,

        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Post a draft or pending entry
    Post {
        /// Entry ID
        id: String,
    },

    /// Reject a draft or pending entry
    Reject {
        /// Entry ID
        id: String,
    },

    /// Show detailed entry information
    Show {
        /// Entry ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum DocumentCommands {
    /// Create a new document
    Create {
        /// Customer or supplier name
        party: String,

        /// Total amount including tax (e.g., "1180.00")
        #[arg(short, long, required_unless_present = "items", conflicts_with = "items")]
        amount: Option<String>,

        /// Line item as "DESC:QTY:UNIT_PRICE[:GST%]" (repeatable)
        #[arg(long = "item", value_name = "ITEM")]
        items: Vec<String>,

        /// Document date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,
    },

    /// List documents
    List {
        /// Include fully settled documents
        #[arg(long)]
        all: bool,
    },

    /// Record a payment against a document
    Pay {
        /// Document ID
        id: String,

        /// Payment amount (omit to settle the full balance)
        #[arg(short, long)]
        amount: Option<String>,

        /// Settlement account (Cash, Bank, ...)
        #[arg(long, default_value = "Bank")]
        account: String,

        /// Payment date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Trial balance over all posted entries
    TrialBalance {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Balance sheet
    BalanceSheet {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Profit and loss statement
    ProfitLoss {
        /// Start date (YYYY-MM-DD, defaults to start of current month)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Overhead expense breakdown
    Expenses {
        /// Start date (YYYY-MM-DD, defaults to start of current month)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Receivables aging
    Receivables {
        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Payables aging
    Payables {
        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Journal book with expanded GST posting lines
    Journal {
        /// Filter by status: draft, pending, posted, rejected
        #[arg(long)]
        status: Option<String>,

        /// Filter by account name (debit or credit side)
        #[arg(long)]
        account: Option<String>,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter to date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Account(account_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_account_command(&service, account_cmd).await?;
            }

            Commands::Entry(entry_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_entry_command(&service, entry_cmd).await?;
            }

            Commands::Invoice(invoice_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_document_command(&service, PartyType::Customer, invoice_cmd).await?;
            }

            Commands::Bill(bill_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_document_command(&service, PartyType::Supplier, bill_cmd).await?;
            }

            Commands::Report(report_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_report_command(&service, report_cmd).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
            }

            Commands::Import {
                import_type,
                input,
                dry_run,
                skip_duplicates,
                create_accounts,
                validate,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_import_command(
                    &service,
                    &import_type,
                    input.as_deref(),
                    dry_run,
                    skip_duplicates,
                    create_accounts,
                    validate,
                )
                .await?;
            }

            Commands::Check => {
                let service = LedgerService::connect(&self.database).await?;
                run_check_command(&service).await?;
            }
        }

        Ok(())
    }
}

async fn run_account_command(service: &LedgerService, cmd: AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Create {
            name,
            code,
            account_type,
            parent,
        } => {
            let at: AccountType = account_type.parse().map_err(|e| {
                anyhow::anyhow!(
                    "Invalid account type '{}'. Valid types: asset, liability, equity, revenue, expense. Error: {}",
                    account_type,
                    e
                )
            })?;

            let account = service.create_account(code, name, at, parent).await?;
            println!(
                "Created account: {} {} ({})",
                account.code, account.name, account.account_type
            );
        }

        AccountCommands::List => {
            let accounts = service.list_accounts().await?;
            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                println!("{:<8} {:<30} {:<12} {:<8}", "CODE", "NAME", "TYPE", "PARENT");
                println!("{}", "-".repeat(60));
                for account in accounts {
                    println!(
                        "{:<8} {:<30} {:<12} {:<8}",
                        account.code,
                        truncate(&account.name, 30),
                        account.account_type,
                        account.parent_code.as_deref().unwrap_or("")
                    );
                }
            }
        }

        AccountCommands::Show { name } => {
            let account = service.get_account(&name).await?;
            let trial_balance = service.trial_balance().await?;

            println!("Account: {}", account.name);
            println!("  ID:      {}", account.id);
            println!("  Code:    {}", account.code);
            println!("  Type:    {}", account.account_type);
            if let Some(parent) = &account.parent_code {
                println!("  Parent:  {}", parent);
            }
            println!(
                "  Balance: {}",
                format_cents(trial_balance.net_of(&account.name))
            );
        }
    }
    Ok(())
}

async fn run_entry_command(service: &LedgerService, cmd: EntryCommands) -> Result<()> {
    match cmd {
        EntryCommands::Record {
            amount,
            debit,
            credit,
            description,
            date,
            reference,
            gst,
            gst_rate,
            party_type,
            party,
            post,
        } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '1000.00' or '1000'")?;

            let date = match date {
                Some(date_str) => parse_date(&date_str).with_context(|| {
                    format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                })?,
                None => Utc::now(),
            };

            let gst_treatment = gst
                .as_deref()
                .map(|s| {
                    GstTreatment::from_str(s).ok_or_else(|| {
                        anyhow::anyhow!(
                            "Invalid GST treatment '{}'. Valid: cgst-sgst, igst",
                            s
                        )
                    })
                })
                .transpose()?;

            let gst_rate_bps = gst_rate
                .as_deref()
                .map(|s| parse_rate_bps(s).context("Invalid GST rate. Use '18' or '2.5'"))
                .transpose()?;

            if gst_treatment.is_some() != gst_rate_bps.is_some() {
                anyhow::bail!("--gst and --gst-rate must be given together");
            }

            let pt = party_type
                .as_deref()
                .map(|s| {
                    PartyType::from_str(s).ok_or_else(|| {
                        anyhow::anyhow!("Invalid party type '{}'. Valid: customer, supplier", s)
                    })
                })
                .transpose()?;

            let entry = service
                .record_entry(NewEntry {
                    date,
                    description,
                    debit_account: debit,
                    credit_account: credit,
                    amount_cents,
                    reference,
                    gst_treatment,
                    gst_rate_bps,
                    party_type: pt,
                    party,
                    post,
                })
                .await?;

            println!(
                "Recorded entry #{}: Dr {} / Cr {} {} [{}] ({})",
                entry.sequence,
                entry.debit_account,
                entry.credit_account,
                format_cents(entry.amount_cents),
                entry.status,
                entry.id
            );
            if entry.gst_amount() > 0 {
                println!(
                    "  GST {} @ {}: {} (gross {})",
                    entry.gst_treatment.map(|t| t.to_string()).unwrap_or_default(),
                    entry.gst_rate_bps.map(format_rate).unwrap_or_default(),
                    format_cents(entry.gst_amount()),
                    format_cents(entry.gross_amount())
                );
            }
        }

        EntryCommands::List {
            status,
            account,
            from_date,
            to_date,
            limit,
        } => {
            let filter = build_entry_filter(status, account, from_date, to_date, limit)?;
            let entries = service.list_entries(filter).await?;

            if entries.is_empty() {
                println!("No entries found.");
            } else {
                println!(
                    "{:<6} {:<12} {:<10} {:>12} {:<20} {:<20} DESCRIPTION",
                    "SEQ", "DATE", "STATUS", "AMOUNT", "DEBIT", "CREDIT"
                );
                println!("{}", "-".repeat(110));
                for entry in &entries {
                    println!(
                        "{:<6} {:<12} {:<10} {:>12} {:<20} {:<20} {}",
                        entry.sequence,
                        entry.date.format("%Y-%m-%d"),
                        entry.status,
                        format_cents(entry.amount_cents),
                        truncate(&entry.debit_account, 20),
                        truncate(&entry.credit_account, 20),
                        truncate(&entry.description, 30)
                    );
                }
            }
        }

        EntryCommands::Post { id } => {
            let entry_id =
                Uuid::parse_str(&id).context("Invalid entry ID format (expected UUID)")?;
            let entry = service.post_entry(entry_id).await?;
            println!("Posted entry #{} ({})", entry.sequence, entry.id);
        }

        EntryCommands::Reject { id } => {
            let entry_id =
                Uuid::parse_str(&id).context("Invalid entry ID format (expected UUID)")?;
            let entry = service.reject_entry(entry_id).await?;
            println!("Rejected entry #{} ({})", entry.sequence, entry.id);
        }

        EntryCommands::Show { id } => {
            let entry_id =
                Uuid::parse_str(&id).context("Invalid entry ID format (expected UUID)")?;
            let entry = service.get_entry(entry_id).await?;

            println!("Entry: {}", entry.id);
            println!("  Sequence:    {}", entry.sequence);
            println!("  Date:        {}", entry.date.format("%Y-%m-%d"));
            println!("  Status:      {}", entry.status);
            println!("  Description: {}", entry.description);
            println!("  Debit:       {}", entry.debit_account);
            println!("  Credit:      {}", entry.credit_account);
            println!("  Amount:      {}", format_cents(entry.amount_cents));
            if let (Some(treatment), Some(rate)) = (entry.gst_treatment, entry.gst_rate_bps) {
                println!("  GST:         {} @ {}", treatment, format_rate(rate));
                println!("  GST amount:  {}", format_cents(entry.gst_amount()));
                println!("  Gross:       {}", format_cents(entry.gross_amount()));
            }
            if let Some(reference) = &entry.reference {
                println!("  Reference:   {}", reference);
            }
            if let (Some(party_type), Some(party)) = (entry.party_type, &entry.party) {
                println!("  Party:       {} ({})", party, party_type);
            }
            println!(
                "  Recorded at: {}",
                entry.recorded_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }
    Ok(())
}

async fn run_document_command(
    service: &LedgerService,
    party_type: PartyType,
    cmd: DocumentCommands,
) -> Result<()> {
    let noun = match party_type {
        PartyType::Customer => "invoice",
        PartyType::Supplier => "bill",
    };

    match cmd {
        DocumentCommands::Create {
            party,
            amount,
            items,
            date,
            due,
        } => {
            let amount_cents = match &amount {
                Some(a) => parse_cents(a).context("Invalid amount format. Use '1180.00'")?,
                None => 0,
            };
            let items = items
                .iter()
                .map(|spec| parse_line_item(spec))
                .collect::<Result<Vec<_>>>()?;
            let doc_date = match date {
                Some(date_str) => parse_date(&date_str)?,
                None => Utc::now(),
            };
            let due_date = parse_date(&due).context("Invalid due date. Use YYYY-MM-DD")?;

            let document = match party_type {
                PartyType::Customer => {
                    service
                        .create_invoice(party, doc_date, due_date, amount_cents, items)
                        .await?
                }
                PartyType::Supplier => {
                    service
                        .create_bill(party, doc_date, due_date, amount_cents, items)
                        .await?
                }
            };

            println!(
                "Created {}: {} {} due {} ({})",
                noun,
                document.party,
                format_cents(document.amount_cents),
                document.due_date.format("%Y-%m-%d"),
                document.id
            );
            for item in &document.items {
                println!(
                    "  {} x{} @ {} (+{} GST)",
                    item.description,
                    item.quantity,
                    format_cents(item.unit_price_cents),
                    format_cents(item.tax_cents)
                );
            }
        }

        DocumentCommands::List { all } => {
            let documents = service.list_documents(party_type, all).await?;
            if documents.is_empty() {
                println!("No {}s found.", noun);
            } else {
                println!(
                    "{:<36} {:<20} {:<12} {:<15} {:>12} {:>12}",
                    "ID", "PARTY", "DUE", "STATUS", "AMOUNT", "BALANCE"
                );
                println!("{}", "-".repeat(112));
                for document in &documents {
                    println!(
                        "{:<36} {:<20} {:<12} {:<15} {:>12} {:>12}",
                        document.id,
                        truncate(&document.party, 20),
                        document.due_date.format("%Y-%m-%d"),
                        document.status,
                        format_cents(document.amount_cents),
                        format_cents(document.balance_cents)
                    );
                }
            }
        }

        DocumentCommands::Pay {
            id,
            amount,
            account,
            date,
        } => {
            let document_id =
                Uuid::parse_str(&id).context("Invalid document ID format (expected UUID)")?;
            let document = service.get_document(document_id).await?;

            let amount_cents = match amount {
                Some(a) => parse_cents(&a).context("Invalid payment amount")?,
                None => document.balance_cents,
            };
            let payment_date = match date {
                Some(date_str) => parse_date(&date_str)?,
                None => Utc::now(),
            };

            let result = service
                .record_payment(document_id, amount_cents, &account, payment_date)
                .await?;

            println!(
                "Recorded payment of {} against {} {} (entry #{})",
                format_cents(amount_cents),
                noun,
                result.document.id,
                result.payment_entry.sequence
            );
            println!(
                "  Remaining balance: {} [{}]",
                format_cents(result.document.balance_cents),
                result.document.status
            );
        }
    }
    Ok(())
}

async fn run_report_command(service: &LedgerService, cmd: ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::TrialBalance { format } => {
            let report = service.trial_balance().await?;

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                "csv" => {
                    println!("account,type,debit,credit");
                    for row in &report.rows {
                        println!(
                            "{},{},{},{}",
                            row.account,
                            row.account_type.map(|t| t.to_string()).unwrap_or_default(),
                            row.debit_cents,
                            row.credit_cents
                        );
                    }
                    println!("TOTAL,,{},{}", report.total_debit, report.total_credit);
                }
                _ => {
                    println!("Trial Balance");
                    println!();
                    println!("{:<30} {:<10} {:>14} {:>14}", "ACCOUNT", "TYPE", "DEBIT", "CREDIT");
                    println!("{}", "-".repeat(72));

                    for row in &report.rows {
                        println!(
                            "{:<30} {:<10} {:>14} {:>14}",
                            truncate(&row.account, 30),
                            row.account_type.map(|t| t.to_string()).unwrap_or_default(),
                            format_cents(row.debit_cents),
                            format_cents(row.credit_cents)
                        );
                    }

                    println!("{}", "-".repeat(72));
                    println!(
                        "{:<30} {:<10} {:>14} {:>14}  {}",
                        "TOTAL",
                        "",
                        format_cents(report.total_debit),
                        format_cents(report.total_credit),
                        if report.is_balanced {
                            "OK".to_string()
                        } else {
                            format!("OFF BY {}", format_cents(report.imbalance_cents))
                        }
                    );
                }
            }
        }

        ReportCommands::BalanceSheet { format } => {
            let report = service.balance_sheet().await?;

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                "csv" => {
                    println!("section,account,balance");
                    for (section, accounts) in [
                        ("current_assets", &report.assets.current.accounts),
                        ("fixed_assets", &report.assets.fixed.accounts),
                        ("other_assets", &report.assets.other.accounts),
                        ("current_liabilities", &report.liabilities.current.accounts),
                        ("long_term_liabilities", &report.liabilities.long_term.accounts),
                        ("equity", &report.equity.accounts),
                    ] {
                        for account in accounts {
                            println!("{},{},{}", section, account.account, account.balance_cents);
                        }
                    }
                }
                _ => {
                    println!("Balance Sheet");
                    println!();

                    print_balance_sheet_section("Current Assets", &report.assets.current);
                    print_balance_sheet_section("Fixed Assets", &report.assets.fixed);
                    print_balance_sheet_section("Other Assets", &report.assets.other);
                    println!(
                        "{:<32} {:>15}",
                        "Total Assets",
                        format_cents(report.assets.total_cents)
                    );
                    println!();

                    print_balance_sheet_section("Current Liabilities", &report.liabilities.current);
                    print_balance_sheet_section(
                        "Long-term Liabilities",
                        &report.liabilities.long_term,
                    );
                    println!(
                        "{:<32} {:>15}",
                        "Total Liabilities",
                        format_cents(report.liabilities.total_cents)
                    );
                    println!();

                    print_balance_sheet_section("Equity", &report.equity);
                    println!();

                    println!("{}", "=".repeat(48));
                    println!(
                        "{:<32} {:>15}",
                        "Liabilities + Equity",
                        format_cents(report.total_liabilities_and_equity)
                    );
                    if !report.is_balanced {
                        println!(
                            "WARNING: off by {} against total assets",
                            format_cents(report.difference_cents)
                        );
                    }
                }
            }
        }

        ReportCommands::ProfitLoss { from, to, format } => {
            let (from_date, to_date) = parse_date_range(from, to)?;
            let report = service.profit_and_loss(from_date, to_date).await?;

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                "csv" => {
                    println!("section,account,total");
                    for (section, accounts) in [
                        ("revenue", &report.revenue.accounts),
                        ("cost_of_goods_sold", &report.cost_of_goods_sold.accounts),
                        ("operating_expenses", &report.operating_expenses.accounts),
                        ("other_income", &report.other_income.accounts),
                        ("other_expenses", &report.other_expenses.accounts),
                    ] {
                        for account in accounts {
                            println!("{},{},{}", section, account.account, account.total_cents);
                        }
                    }
                    println!("gross_profit,,{}", report.gross_profit);
                    println!("operating_profit,,{}", report.operating_profit);
                    println!("net_profit,,{}", report.net_profit);
                }
                _ => {
                    println!("Profit and Loss");
                    println!(
                        "Period: {} to {}",
                        from_date.format("%Y-%m-%d"),
                        to_date.format("%Y-%m-%d")
                    );
                    println!();

                    print_profit_loss_section("Revenue", &report.revenue);
                    print_profit_loss_section("Cost of Goods Sold", &report.cost_of_goods_sold);
                    println!(
                        "{:<32} {:>15}",
                        "Gross Profit",
                        format_cents(report.gross_profit)
                    );
                    println!();

                    print_profit_loss_section("Operating Expenses", &report.operating_expenses);
                    println!(
                        "{:<32} {:>15}",
                        "Operating Profit",
                        format_cents(report.operating_profit)
                    );
                    println!();

                    print_profit_loss_section("Other Income", &report.other_income);
                    print_profit_loss_section("Other Expenses", &report.other_expenses);

                    println!("{}", "=".repeat(48));
                    println!(
                        "{:<32} {:>15}",
                        "Net Profit",
                        format_cents(report.net_profit)
                    );
                }
            }
        }

        ReportCommands::Expenses { from, to, format } => {
            let (from_date, to_date) = parse_date_range(from, to)?;
            let report = service.expense_summary(from_date, to_date).await?;

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                "csv" => {
                    println!("account,total,count,percentage");
                    for row in &report.rows {
                        println!(
                            "{},{},{},{:.2}",
                            row.account, row.total_cents, row.count, row.percentage
                        );
                    }
                }
                _ => {
                    println!("Expense Summary");
                    println!(
                        "Period: {} to {}",
                        from_date.format("%Y-%m-%d"),
                        to_date.format("%Y-%m-%d")
                    );
                    println!();
                    println!(
                        "{:<30} {:>14} {:>8} {:>8}",
                        "ACCOUNT", "TOTAL", "COUNT", "PERCENT"
                    );
                    println!("{}", "-".repeat(64));

                    for row in &report.rows {
                        println!(
                            "{:<30} {:>14} {:>8} {:>7.1}%",
                            truncate(&row.account, 30),
                            format_cents(row.total_cents),
                            row.count,
                            row.percentage
                        );
                    }

                    println!("{}", "-".repeat(64));
                    println!("{:<30} {:>14}", "TOTAL", format_cents(report.total_cents));
                }
            }
        }

        ReportCommands::Receivables { as_of, format } => {
            let as_of = parse_as_of(as_of)?;
            let report = service.receivables_aging(as_of).await?;
            print_aging_report("Receivables Aging", &report, &format)?;
        }

        ReportCommands::Payables { as_of, format } => {
            let as_of = parse_as_of(as_of)?;
            let report = service.payables_aging(as_of).await?;
            print_aging_report("Payables Aging", &report, &format)?;
        }

        ReportCommands::Journal {
            status,
            account,
            from,
            to,
            limit,
            format,
        } => {
            let filter = build_entry_filter(status, account, from, to, limit)?;
            let book = service.journal_book(filter).await?;

            if format == "json" {
                #[derive(serde::Serialize)]
                struct JsonLine<'a> {
                    account: &'a str,
                    side: &'a str,
                    amount_cents: i64,
                }
                #[derive(serde::Serialize)]
                struct JsonEntry<'a> {
                    entry: &'a crate::domain::JournalEntry,
                    lines: Vec<JsonLine<'a>>,
                }
                let entries: Vec<JsonEntry> = book
                    .iter()
                    .map(|b| JsonEntry {
                        entry: &b.entry,
                        lines: b
                            .lines
                            .iter()
                            .map(|l| JsonLine {
                                account: &l.account,
                                side: match l.side {
                                    Side::Debit => "debit",
                                    Side::Credit => "credit",
                                },
                                amount_cents: l.amount_cents,
                            })
                            .collect(),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if book.is_empty() {
                println!("No entries found.");
            } else {
                for item in &book {
                    let entry = &item.entry;
                    println!(
                        "#{} {} {} [{}]",
                        entry.sequence,
                        entry.date.format("%Y-%m-%d"),
                        entry.description,
                        entry.status
                    );
                    for line in &item.lines {
                        match line.side {
                            Side::Debit => println!(
                                "    Dr {:<30} {:>14}",
                                truncate(&line.account, 30),
                                format_cents(line.amount_cents)
                            ),
                            Side::Credit => println!(
                                "       Cr {:<27} {:>14}",
                                truncate(&line.account, 27),
                                format_cents(line.amount_cents)
                            ),
                        }
                    }
                    println!();
                }
            }
        }
    }

    Ok(())
}

fn print_balance_sheet_section(
    title: &str,
    section: &crate::reports::BalanceSheetSection,
) {
    if section.accounts.is_empty() {
        return;
    }
    println!("{}:", title);
    for account in &section.accounts {
        println!(
            "  {:<30} {:>15}",
            truncate(&account.account, 30),
            format_cents(account.balance_cents)
        );
    }
    println!(
        "  {:<30} {:>15}",
        format!("Total {}", title),
        format_cents(section.total_cents)
    );
    println!();
}

fn print_profit_loss_section(title: &str, section: &crate::reports::ProfitLossSection) {
    println!("{}:", title);
    for account in &section.accounts {
        println!(
            "  {:<30} {:>15}",
            truncate(&account.account, 30),
            format_cents(account.total_cents)
        );
    }
    println!(
        "  {:<30} {:>15}",
        format!("Total {}", title),
        format_cents(section.total_cents)
    );
    println!();
}

fn print_aging_report(
    title: &str,
    report: &crate::reports::AgingReport,
    format: &str,
) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        "csv" => {
            println!("party,current,1_30,31_60,61_90,over_90,total");
            for party in &report.parties {
                let b = &party.buckets;
                println!(
                    "{},{},{},{},{},{},{}",
                    party.party,
                    b.current,
                    b.days_1_30,
                    b.days_31_60,
                    b.days_61_90,
                    b.days_over_90,
                    b.total()
                );
            }
        }
        _ => {
            println!("{}", title);
            println!("As of: {}", report.as_of.format("%Y-%m-%d"));
            println!();
            println!(
                "{:<20} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
                "PARTY", "CURRENT", "1-30", "31-60", "61-90", ">90", "TOTAL"
            );
            println!("{}", "-".repeat(100));

            for party in &report.parties {
                let b = &party.buckets;
                println!(
                    "{:<20} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
                    truncate(&party.party, 20),
                    format_cents(b.current),
                    format_cents(b.days_1_30),
                    format_cents(b.days_31_60),
                    format_cents(b.days_61_90),
                    format_cents(b.days_over_90),
                    format_cents(b.total())
                );
            }

            println!("{}", "-".repeat(100));
            let t = &report.total;
            println!(
                "{:<20} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
                "TOTAL",
                format_cents(t.current),
                format_cents(t.days_1_30),
                format_cents(t.days_31_60),
                format_cents(t.days_61_90),
                format_cents(t.days_over_90),
                format_cents(t.total())
            );
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "entries" => {
            let count = exporter.export_entries_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} entries", count);
            }
        }
        "trial-balance" => {
            let count = exporter.export_trial_balance_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} accounts", count);
            }
        }
        "receivables" => {
            let count = exporter.export_aging_csv(writer, true, Utc::now()).await?;
            if output.is_some() {
                eprintln!("Exported {} parties", count);
            }
        }
        "payables" => {
            let count = exporter.export_aging_csv(writer, false, Utc::now()).await?;
            if output.is_some() {
                eprintln!("Exported {} parties", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full ledger: {} accounts, {} entries, {} documents",
                    snapshot.accounts.len(),
                    snapshot.entries.len(),
                    snapshot.documents.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: entries, trial-balance, receivables, payables, full",
                export_type
            );
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &LedgerService,
    import_type: &str,
    input: Option<&str>,
    dry_run: bool,
    skip_duplicates: bool,
    create_accounts: bool,
    validate: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    let importer = Importer::new(service);

    // Determine input reader
    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let options = ImportOptions {
        dry_run,
        skip_duplicates,
        create_missing_accounts: create_accounts,
        validate_only: validate,
    };

    let result = match import_type {
        "entries" => importer.import_entries_csv(reader, options).await?,
        "full" => importer.import_full_json(reader, options).await?,
        _ => {
            anyhow::bail!(
                "Invalid import type '{}'. Valid types: entries, full",
                import_type
            );
        }
    };

    // Display results
    if validate || dry_run {
        println!("Validation successful");
    } else {
        println!("Import complete");
    }
    println!("  Imported: {}", result.imported);
    println!("  Skipped:  {}", result.skipped);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in result.errors.iter().take(10) {
            println!(
                "  Line {}: {}",
                error.line,
                error
                    .field
                    .as_ref()
                    .map(|f| format!("{}: ", f))
                    .unwrap_or_default()
                    + &error.error
            );
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }

    Ok(())
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity().await?;

    println!("Accounts: {}", report.account_count);
    println!(
        "Entries:  {} ({} posted)",
        report.entry_count, report.posted_count
    );
    println!();
    println!(
        "Trial balance: {}",
        if report.is_balanced {
            "OK".to_string()
        } else {
            format!("OFF BY {}", format_cents(report.imbalance_cents))
        }
    );
    println!();

    if report.is_healthy() {
        println!("Ledger is consistent.");
    } else {
        println!("Issues found:");
        for issue in report.issues() {
            println!("  - {}", issue);
        }
        anyhow::bail!("Ledger integrity check failed");
    }

    Ok(())
}

fn build_entry_filter(
    status: Option<String>,
    account: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
    limit: Option<usize>,
) -> Result<EntryFilter> {
    let status = status
        .as_deref()
        .map(|s| {
            EntryStatus::from_str(s).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid status '{}'. Valid: draft, pending, posted, rejected",
                    s
                )
            })
        })
        .transpose()?;

    let from_date = from_date
        .map(|s| parse_date(&s))
        .transpose()
        .context("Invalid from-date")?;
    let to_date = to_date
        .map(|s| parse_end_date(&s))
        .transpose()
        .context("Invalid to-date")?;

    Ok(EntryFilter {
        status,
        account,
        from_date,
        to_date,
        limit,
    })
}

fn parse_date_range(
    from: Option<String>,
    to: Option<String>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    use chrono::Datelike;

    let now = Utc::now();

    // Default to_date is now
    let to_date = match to {
        Some(date_str) => parse_end_date(&date_str)?,
        None => now,
    };

    // Default from_date is start of current month
    let from_date = match from {
        Some(date_str) => parse_date(&date_str)?,
        None => now
            .date_naive()
            .with_day(1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or(now),
    };

    Ok((from_date, to_date))
}

fn parse_as_of(as_of: Option<String>) -> Result<DateTime<Utc>> {
    match as_of {
        Some(date_str) => parse_date(&date_str).context("Invalid as-of date. Use YYYY-MM-DD"),
        None => Ok(Utc::now()),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        // Cut on a char boundary so multibyte names don't panic
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    use chrono::NaiveDate;

    // Parse YYYY-MM-DD format
    let naive_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")?;

    // Convert to UTC datetime at midnight
    let naive_datetime = naive_date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;

    Ok(DateTime::from_naive_utc_and_offset(naive_datetime, Utc))
}

/// Parse a "DESC:QTY:UNIT_PRICE[:GST%]" item spec, e.g. "Widget:10:100.00:18".
fn parse_line_item(spec: &str) -> Result<LineItem> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() < 3 || parts.len() > 4 {
        anyhow::bail!(
            "Invalid item '{}'. Use DESC:QTY:UNIT_PRICE[:GST%]",
            spec
        );
    }
    let quantity: i64 = parts[1]
        .trim()
        .parse()
        .with_context(|| format!("Invalid quantity in item '{}'", spec))?;
    let unit_price = parse_cents(parts[2])
        .with_context(|| format!("Invalid unit price in item '{}'", spec))?;
    let rate_bps = match parts.get(3) {
        Some(rate) => parse_rate_bps(rate)
            .with_context(|| format!("Invalid GST rate in item '{}'", spec))?,
        None => 0,
    };
    Ok(LineItem::new(parts[0].trim(), quantity, unit_price, rate_bps))
}

/// Parse an end-of-range date to the last second of that day, so entries
/// recorded with an intra-day timestamp on the end date still fall inside
/// the range.
fn parse_end_date(date_str: &str) -> Result<DateTime<Utc>> {
    use chrono::NaiveDate;

    let naive_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")?;

    let naive_datetime = naive_date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;

    Ok(DateTime::from_naive_utc_and_offset(naive_datetime, Utc))
}
