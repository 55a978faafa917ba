mod common;

use anyhow::Result;
use munim::application::EntryFilter;
use munim::domain::{EntryStatus, GstTreatment};
use munim::io::{ImportOptions, Importer, Exporter};

use common::{parse_date, post_entry, post_gst_entry, test_service};

#[tokio::test]
async fn test_export_entries_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;

    post_entry(&service, "2024-04-01", "Cash sale", "Cash", "Sales Revenue", 100_000).await?;
    post_gst_entry(
        &service,
        "2024-04-02",
        "GST sale",
        "Cash",
        "Sales Revenue",
        50_000,
        GstTreatment::Igst,
        1800,
    )
    .await?;

    let exporter = Exporter::new(&service);
    let mut buffer = Vec::new();
    let count = exporter.export_entries_csv(&mut buffer).await?;
    assert_eq!(count, 2);

    let csv = String::from_utf8(buffer)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3); // header + 2 rows
    assert!(lines[0].starts_with("id,sequence,date"));
    assert!(lines[1].contains("Cash sale"));
    assert!(lines[2].contains("igst"));
    assert!(lines[2].contains("1800"));

    Ok(())
}

#[tokio::test]
async fn test_import_entries_csv_with_per_line_errors() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let csv = "\
date,description,debit_account,credit_account,amount,reference,gst_treatment,gst_rate,party_type,party,status
2024-04-01,Cash sale,Cash,Sales Revenue,1000.00,,,,,,posted
2024-04-02,GST sale,Cash,Sales Revenue,500.00,INV-1,cgst-sgst,18,customer,Sharma Traders,posted
bad-date,Broken,Cash,Sales Revenue,10.00,,,,,,draft
2024-04-03,Bad amount,Cash,Sales Revenue,abc,,,,,,draft
2024-04-04,Draft rent,Rent Expense,Bank,200.00,,,,,,draft
";

    let importer = Importer::new(&service);
    let result = importer
        .import_entries_csv(csv.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 3);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0].line, 4);
    assert_eq!(result.errors[0].field.as_deref(), Some("date"));
    assert_eq!(result.errors[1].field.as_deref(), Some("amount"));

    // Statuses and GST metadata made it through
    let entries = service.list_entries(EntryFilter::default()).await?;
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].status, EntryStatus::Posted);
    assert_eq!(entries[1].gst_treatment, Some(GstTreatment::CgstSgst));
    assert_eq!(entries[1].gst_rate_bps, Some(1800));
    assert_eq!(entries[1].amount_cents, 50_000);
    assert_eq!(entries[2].status, EntryStatus::Draft);

    // GST entry landed in the trial balance with its control accounts
    let tb = service.trial_balance().await?;
    assert_eq!(tb.net_of("CGST Payable"), 4_500);
    assert!(tb.is_balanced);

    Ok(())
}

#[tokio::test]
async fn test_import_dry_run_writes_nothing() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let csv = "\
date,description,debit_account,credit_account,amount,reference,gst_treatment,gst_rate,party_type,party,status
2024-04-01,Cash sale,Cash,Sales Revenue,1000.00,,,,,,posted
";

    let importer = Importer::new(&service);
    let options = ImportOptions {
        dry_run: true,
        ..Default::default()
    };
    let result = importer.import_entries_csv(csv.as_bytes(), options).await?;
    assert_eq!(result.imported, 1);

    let entries = service.list_entries(EntryFilter::default()).await?;
    assert!(entries.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_full_json_snapshot_roundtrip() -> Result<()> {
    let (source, _temp_a) = test_service().await?;

    post_gst_entry(
        &source,
        "2024-04-01",
        "GST sale",
        "Cash",
        "Sales Revenue",
        100_000,
        GstTreatment::CgstSgst,
        1800,
    )
    .await?;
    post_entry(&source, "2024-04-02", "Rent", "Rent Expense", "Bank", 20_000).await?;
    source
        .create_invoice(
            "Sharma Traders".to_string(),
            parse_date("2024-04-01"),
            parse_date("2024-05-01"),
            118_000,
            Vec::new(),
        )
        .await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&source).export_full_json(&mut buffer).await?;
    assert_eq!(snapshot.entries.len(), 2);
    assert_eq!(snapshot.documents.len(), 1);

    // Restore into a fresh database; the seeded chart is skipped, not duplicated
    let (target, _temp_b) = test_service().await?;
    let result = Importer::new(&target)
        .import_full_json(buffer.as_slice(), ImportOptions::default())
        .await?;
    assert!(result.errors.is_empty());
    assert_eq!(result.skipped, snapshot.accounts.len());
    assert_eq!(result.imported, 3);

    // The restored ledger produces the same trial balance
    let tb_source = source.trial_balance().await?;
    let tb_target = target.trial_balance().await?;
    assert_eq!(tb_source.total_debit, tb_target.total_debit);
    assert_eq!(tb_target.net_of("Cash"), 118_000);
    assert_eq!(tb_target.net_of("SGST Payable"), 9_000);

    // Documents survive with their balances
    let receivables = target.receivables_aging(parse_date("2024-06-30")).await?;
    assert_eq!(receivables.total.total(), 118_000);

    Ok(())
}
