use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, Document};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBuckets {
    pub current: Cents,
    pub days_1_30: Cents,
    pub days_31_60: Cents,
    pub days_61_90: Cents,
    pub days_over_90: Cents,
}

impl AgingBuckets {
    pub fn total(&self) -> Cents {
        self.current + self.days_1_30 + self.days_31_60 + self.days_61_90 + self.days_over_90
    }

    fn add(&mut self, days_past_due: i64, amount: Cents) {
        match days_past_due {
            i64::MIN..=0 => self.current += amount,
            1..=30 => self.days_1_30 += amount,
            31..=60 => self.days_31_60 += amount,
            61..=90 => self.days_61_90 += amount,
            _ => self.days_over_90 += amount,
        }
    }

    fn accumulate(&mut self, other: &AgingBuckets) {
        self.current += other.current;
        self.days_1_30 += other.days_1_30;
        self.days_31_60 += other.days_31_60;
        self.days_61_90 += other.days_61_90;
        self.days_over_90 += other.days_over_90;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyAging {
    /// Customer or supplier name, as written on the documents
    pub party: String,
    pub buckets: AgingBuckets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingReport {
    pub as_of: DateTime<Utc>,
    pub parties: Vec<PartyAging>,
    /// Grand total across all parties
    pub total: AgingBuckets,
}

/// Bucket outstanding document balances by days past due as of `as_of`.
/// Documents with nothing outstanding are skipped; a document due exactly
/// on `as_of` (or later) is current.
pub fn build_aging(documents: &[Document], as_of: DateTime<Utc>) -> AgingReport {
    let mut by_party: HashMap<String, AgingBuckets> = HashMap::new();

    for doc in documents.iter().filter(|d| d.is_outstanding()) {
        let days_past_due = (as_of - doc.due_date).num_days();
        by_party
            .entry(doc.party.clone())
            .or_default()
            .add(days_past_due, doc.balance_cents);
    }

    let mut parties: Vec<PartyAging> = by_party
        .into_iter()
        .map(|(party, buckets)| PartyAging { party, buckets })
        .collect();
    parties.sort_by(|a, b| a.party.cmp(&b.party));

    let mut total = AgingBuckets::default();
    for party in &parties {
        total.accumulate(&party.buckets);
    }

    AgingReport {
        as_of,
        parties,
        total,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::PartyType;

    fn date(s: &str) -> DateTime<Utc> {
        let naive = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        Utc.from_utc_datetime(&naive.and_hms_opt(0, 0, 0).unwrap())
    }

    fn invoice(party: &str, due: DateTime<Utc>, balance: Cents) -> Document {
        let mut doc = Document::new(PartyType::Customer, party, due, due, balance.max(1));
        doc.balance_cents = balance;
        doc
    }

    #[test]
    fn test_bucket_boundaries() {
        let as_of = date("2024-06-30");
        let docs = vec![
            invoice("A", as_of, 100),                       // due today -> current
            invoice("A", as_of - Duration::days(30), 200),  // 30 days -> 1-30
            invoice("A", as_of - Duration::days(31), 300),  // 31 days -> 31-60
            invoice("A", as_of - Duration::days(60), 400),  // 60 days -> 31-60
            invoice("A", as_of - Duration::days(61), 500),  // 61 days -> 61-90
            invoice("A", as_of - Duration::days(90), 600),  // 90 days -> 61-90
            invoice("A", as_of - Duration::days(91), 700),  // 91 days -> 90+
            invoice("A", as_of + Duration::days(10), 800),  // not yet due -> current
        ];
        let report = build_aging(&docs, as_of);
        let buckets = report.parties[0].buckets;

        assert_eq!(buckets.current, 900);
        assert_eq!(buckets.days_1_30, 200);
        assert_eq!(buckets.days_31_60, 700);
        assert_eq!(buckets.days_61_90, 1100);
        assert_eq!(buckets.days_over_90, 700);
        assert_eq!(buckets.total(), 3600);
    }

    #[test]
    fn test_zero_balance_excluded() {
        let as_of = date("2024-06-30");
        let docs = vec![
            invoice("A", as_of - Duration::days(45), 0),
            invoice("B", as_of - Duration::days(45), 1000),
        ];
        let report = build_aging(&docs, as_of);
        assert_eq!(report.parties.len(), 1);
        assert_eq!(report.parties[0].party, "B");
        assert_eq!(report.total.total(), 1000);
    }

    #[test]
    fn test_grand_total_sums_parties() {
        let as_of = date("2024-06-30");
        let docs = vec![
            invoice("Acme Traders", as_of - Duration::days(5), 1_000),
            invoice("Mehta & Sons", as_of - Duration::days(40), 2_000),
            invoice("Acme Traders", as_of - Duration::days(100), 3_000),
        ];
        let report = build_aging(&docs, as_of);

        assert_eq!(report.parties.len(), 2);
        assert_eq!(report.total.days_1_30, 1_000);
        assert_eq!(report.total.days_31_60, 2_000);
        assert_eq!(report.total.days_over_90, 3_000);
        assert_eq!(report.total.total(), 6_000);
    }

    #[test]
    fn test_empty_documents() {
        let report = build_aging(&[], date("2024-06-30"));
        assert!(report.parties.is_empty());
        assert_eq!(report.total, AgingBuckets::default());
    }
}
