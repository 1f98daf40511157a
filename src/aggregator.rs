// 🧺 Aggregator - concatenate adapter outputs in run order
// No deduplication, validation or coercion here

use crate::record::RecordCollection;
use crate::sources::FetchOutcome;

pub fn aggregate<I>(outcomes: I) -> RecordCollection
where
    I: IntoIterator<Item = FetchOutcome>,
{
    outcomes
        .into_iter()
        .flat_map(FetchOutcome::into_records)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{fields, BookRecord};
    use crate::table::write_records;
    use tempfile::TempDir;

    fn titled(title: &str) -> BookRecord {
        BookRecord::new().with(fields::TITLE, title)
    }

    #[test]
    fn test_concatenates_in_order_keeping_duplicates() {
        let merged = aggregate(vec![
            FetchOutcome::Fetched(vec![titled("A"), titled("B")]),
            FetchOutcome::unavailable("down"),
            FetchOutcome::Empty,
            FetchOutcome::Fetched(vec![titled("A")]),
        ]);

        let titles: Vec<String> = merged.iter().filter_map(|r| r.title()).collect();
        assert_eq!(titles, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_nothing_in_nothing_out() {
        assert!(aggregate(Vec::new()).is_empty());
        assert!(aggregate(vec![FetchOutcome::Empty]).is_empty());
    }

    #[test]
    fn test_persisted_union_of_disjoint_sources() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.csv");

        let api = FetchOutcome::Fetched(vec![BookRecord::new()
            .with(fields::TITLE, "Dune")
            .with(fields::AUTHORS, "Frank Herbert")]);
        let dataset = FetchOutcome::Fetched(vec![BookRecord::new()
            .with("name", "Neuromancer")
            .with(fields::RATING, "4.0")]);

        let summary = write_records(&path, &aggregate(vec![api, dataset])).unwrap();

        assert_eq!(summary.columns, vec!["title", "authors", "name", "rating"]);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "title,authors,name,rating\nDune,Frank Herbert,,\n,,Neuromancer,4.0\n"
        );
    }
}
