mod common;

use anyhow::Result;
use munim::application::AppError;
use munim::domain::{DocumentStatus, EntryStatus, LineItem};

use common::{parse_date, test_service};

#[tokio::test]
async fn test_invoice_lifecycle_with_payments() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let invoice = service
        .create_invoice(
            "Sharma Traders".to_string(),
            parse_date("2024-04-01"),
            parse_date("2024-05-01"),
            118_000,
            Vec::new(),
        )
        .await?;
    assert_eq!(invoice.status, DocumentStatus::Open);
    assert_eq!(invoice.balance_cents, 118_000);

    // Partial payment
    let result = service
        .record_payment(invoice.id, 50_000, "Bank", parse_date("2024-04-20"))
        .await?;
    assert_eq!(result.document.balance_cents, 68_000);
    assert_eq!(result.document.status, DocumentStatus::PartiallyPaid);

    // The payment is a posted journal entry against the settlement account
    assert_eq!(result.payment_entry.status, EntryStatus::Posted);
    assert_eq!(result.payment_entry.debit_account, "Bank");
    assert_eq!(result.payment_entry.credit_account, "Accounts Receivable");

    // Overpayment is rejected
    let err = service
        .record_payment(invoice.id, 100_000, "Bank", parse_date("2024-04-25"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PaymentExceedsBalance { .. }));

    // Settle the rest
    let result = service
        .record_payment(invoice.id, 68_000, "Bank", parse_date("2024-04-28"))
        .await?;
    assert_eq!(result.document.balance_cents, 0);
    assert_eq!(result.document.status, DocumentStatus::Paid);

    // Settled invoices drop out of the outstanding list
    let outstanding = service
        .list_documents(munim::domain::PartyType::Customer, false)
        .await?;
    assert!(outstanding.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_bill_payment_reverses_sides() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let bill = service
        .create_bill(
            "Gupta Supplies".to_string(),
            parse_date("2024-04-01"),
            parse_date("2024-05-01"),
            59_000,
            Vec::new(),
        )
        .await?;

    let result = service
        .record_payment(bill.id, 59_000, "Bank", parse_date("2024-04-15"))
        .await?;
    assert_eq!(result.payment_entry.debit_account, "Accounts Payable");
    assert_eq!(result.payment_entry.credit_account, "Bank");
    assert_eq!(result.document.status, DocumentStatus::Paid);

    Ok(())
}

#[tokio::test]
async fn test_receivables_aging_bucket_boundaries() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let as_of = parse_date("2024-06-30");

    let cases = [
        ("Due Today", "2024-06-30", 1_000),   // 0 days -> current
        ("Not Yet Due", "2024-07-15", 2_000), // negative -> current
        ("Thirty", "2024-05-31", 3_000),      // 30 days -> 1-30
        ("Thirty One", "2024-05-30", 4_000),  // 31 days -> 31-60
        ("Sixty", "2024-05-01", 5_000),       // 60 days -> 31-60
        ("Ninety", "2024-04-01", 6_000),      // 90 days -> 61-90
        ("Ninety One", "2024-03-31", 7_000),  // 91 days -> over 90
    ];
    for (party, due, amount) in cases {
        service
            .create_invoice(
                party.to_string(),
                parse_date("2024-01-01"),
                parse_date(due),
                amount,
                Vec::new(),
            )
            .await?;
    }

    let report = service.receivables_aging(as_of).await?;

    let buckets_of = |party: &str| {
        report
            .parties
            .iter()
            .find(|p| p.party == party)
            .map(|p| p.buckets)
            .unwrap()
    };

    assert_eq!(buckets_of("Due Today").current, 1_000);
    assert_eq!(buckets_of("Not Yet Due").current, 2_000);
    assert_eq!(buckets_of("Thirty").days_1_30, 3_000);
    assert_eq!(buckets_of("Thirty One").days_31_60, 4_000);
    assert_eq!(buckets_of("Sixty").days_31_60, 5_000);
    assert_eq!(buckets_of("Ninety").days_61_90, 6_000);
    assert_eq!(buckets_of("Ninety One").days_over_90, 7_000);

    assert_eq!(report.total.current, 3_000);
    assert_eq!(report.total.days_31_60, 9_000);
    assert_eq!(report.total.total(), 28_000);

    Ok(())
}

#[tokio::test]
async fn test_aging_skips_settled_documents_and_splits_party_types() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let as_of = parse_date("2024-06-30");

    let invoice = service
        .create_invoice(
            "Paid Up".to_string(),
            parse_date("2024-04-01"),
            parse_date("2024-05-01"),
            10_000,
            Vec::new(),
        )
        .await?;
    service
        .record_payment(invoice.id, 10_000, "Bank", parse_date("2024-05-01"))
        .await?;

    service
        .create_bill(
            "Supplier Co".to_string(),
            parse_date("2024-04-01"),
            parse_date("2024-05-01"),
            25_000,
            Vec::new(),
        )
        .await?;

    let receivables = service.receivables_aging(as_of).await?;
    assert!(receivables.parties.is_empty());
    assert_eq!(receivables.total.total(), 0);

    let payables = service.payables_aging(as_of).await?;
    assert_eq!(payables.parties.len(), 1);
    assert_eq!(payables.parties[0].party, "Supplier Co");
    assert_eq!(payables.total.days_over_90, 0);
    assert_eq!(payables.total.days_31_60, 25_000);

    Ok(())
}

#[tokio::test]
async fn test_document_requires_positive_amount() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .create_invoice(
            "Zero Co".to_string(),
            parse_date("2024-04-01"),
            parse_date("2024-05-01"),
            0,
            Vec::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    Ok(())
}

#[tokio::test]
async fn test_itemized_invoice_totals_and_persists_items() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let items = vec![
        LineItem::new("Widgets", 10, 10_000, 1800), // 100_000 + 18_000 GST
        LineItem::new("Delivery", 1, 5_000, 0),     // 5_000
    ];
    let invoice = service
        .create_invoice(
            "Sharma Traders".to_string(),
            parse_date("2024-04-01"),
            parse_date("2024-05-01"),
            0,
            items,
        )
        .await?;

    // Total derived from the items, tax included
    assert_eq!(invoice.amount_cents, 123_000);
    assert_eq!(invoice.balance_cents, 123_000);

    // Items round-trip through storage
    let stored = service.get_document(invoice.id).await?;
    assert_eq!(stored.items.len(), 2);
    assert_eq!(stored.items[0].description, "Widgets");
    assert_eq!(stored.items[0].tax_cents, 18_000);
    assert_eq!(stored.items[1].amount_cents, 5_000);

    // Payments work the same against an itemized document
    let result = service
        .record_payment(invoice.id, 123_000, "Bank", parse_date("2024-04-20"))
        .await?;
    assert_eq!(result.document.status, DocumentStatus::Paid);

    Ok(())
}
