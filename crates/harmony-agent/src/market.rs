//! Simulated dataset marketplace and spending ledger.
//!
//! The marketplace is a static category-keyed catalog validated for
//! globally unique listing ids at construction. The ledger is append-only:
//! entries are never removed or mutated.

use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("duplicate dataset id: {0}")]
    DuplicateId(String),
}

/// One purchasable dataset in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetListing {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub price_units: u64,
    pub description: String,
}

/// Category-keyed dataset catalog. Categories are matched
/// case-insensitively; listing ids are unique across all categories.
#[derive(Debug, Clone)]
pub struct Marketplace {
    categories: HashMap<String, Vec<DatasetListing>>,
}

impl Marketplace {
    /// Build a catalog, rejecting duplicate listing ids across categories.
    /// Category names are normalized to lowercase.
    pub fn new(
        categories: Vec<(String, Vec<DatasetListing>)>,
    ) -> Result<Self, MarketError> {
        let mut seen = std::collections::HashSet::new();
        let mut map = HashMap::new();
        for (domain, listings) in categories {
            for listing in &listings {
                if !seen.insert(listing.id.clone()) {
                    return Err(MarketError::DuplicateId(listing.id.clone()));
                }
            }
            map.insert(domain.to_lowercase(), listings);
        }
        Ok(Self { categories: map })
    }

    /// Known domain names, sorted for stable output.
    pub fn domains(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.categories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Case-insensitive category lookup.
    pub fn search(&self, domain: &str) -> Option<&[DatasetListing]> {
        self.categories
            .get(&domain.to_lowercase())
            .map(Vec::as_slice)
    }

    /// Linear scan across all categories for a listing id. The catalog is
    /// small and static, so a full scan is acceptable here.
    pub fn find_by_id(&self, dataset_id: &str) -> Option<&DatasetListing> {
        self.categories
            .values()
            .flatten()
            .find(|listing| listing.id == dataset_id)
    }

    /// The built-in demo catalog.
    pub fn demo() -> Self {
        Self::new(vec![
            (
                "machine learning".into(),
                vec![
                    DatasetListing {
                        id: "ds001".into(),
                        name: "Large-Scale Image Dataset".into(),
                        provider: "VisionData Inc.".into(),
                        price_units: 12,
                        description: "50k labeled images for computer vision tasks".into(),
                    },
                    DatasetListing {
                        id: "ds002".into(),
                        name: "Financial Transactions Dataset".into(),
                        provider: "OpenFinance Labs".into(),
                        price_units: 20,
                        description: "Anonymized transaction data for fraud detection".into(),
                    },
                ],
            ),
            (
                "nlp".into(),
                vec![DatasetListing {
                    id: "ds003".into(),
                    name: "Multilingual Text Corpus".into(),
                    provider: "LinguaTech".into(),
                    price_units: 8,
                    description: "Text data in 20 languages for NLP models".into(),
                }],
            ),
        ])
        .expect("demo catalog has unique ids")
    }
}

/// One simulated purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub item: String,
    pub cost_units: u64,
    pub when: String,
}

/// Append-only record of simulated purchases.
#[derive(Debug, Clone, Default)]
pub struct SpendingLedger {
    entries: Vec<LedgerEntry>,
}

impl SpendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in demo history the agent starts with.
    pub fn seeded() -> Self {
        Self {
            entries: vec![
                LedgerEntry {
                    item: "Sentiment Analysis Dataset".into(),
                    cost_units: 6,
                    when: "Last week".into(),
                },
                LedgerEntry {
                    item: "Stock Market API Access".into(),
                    cost_units: 10,
                    when: "Two weeks ago".into(),
                },
            ],
        }
    }

    pub fn record(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn total_units(&self) -> u64 {
        self.entries.iter().map(|e| e.cost_units).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, price: u64) -> DatasetListing {
        DatasetListing {
            id: id.into(),
            name: format!("Dataset {id}"),
            provider: "Test Provider".into(),
            price_units: price,
            description: "test data".into(),
        }
    }

    #[test]
    fn duplicate_id_rejected() {
        let result = Marketplace::new(vec![
            ("nlp".into(), vec![listing("ds001", 5)]),
            ("vision".into(), vec![listing("ds001", 9)]),
        ]);
        assert!(matches!(result, Err(MarketError::DuplicateId(id)) if id == "ds001"));
    }

    #[test]
    fn duplicate_id_within_category_rejected() {
        let result = Marketplace::new(vec![(
            "nlp".into(),
            vec![listing("ds001", 5), listing("ds001", 7)],
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn search_is_case_insensitive() {
        let market = Marketplace::demo();
        let upper = market.search("NLP").unwrap();
        let lower = market.search("nlp").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 1);
    }

    #[test]
    fn find_by_id_scans_all_categories() {
        let market = Marketplace::demo();
        assert_eq!(market.find_by_id("ds003").unwrap().name, "Multilingual Text Corpus");
        assert!(market.find_by_id("ds999").is_none());
    }

    #[test]
    fn domains_are_sorted() {
        let market = Marketplace::demo();
        assert_eq!(market.domains(), vec!["machine learning", "nlp"]);
    }

    #[test]
    fn ledger_total_and_append_order() {
        let mut ledger = SpendingLedger::seeded();
        assert_eq!(ledger.total_units(), 16);

        ledger.record(LedgerEntry {
            item: "New Dataset".into(),
            cost_units: 4,
            when: "Today".into(),
        });
        assert_eq!(ledger.total_units(), 20);
        assert_eq!(ledger.entries().len(), 3);
        assert_eq!(ledger.entries()[2].item, "New Dataset");
        // earlier entries untouched
        assert_eq!(ledger.entries()[0].item, "Sentiment Analysis Dataset");
    }
}
