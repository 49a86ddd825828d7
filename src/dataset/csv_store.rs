//! CSV persistence for datasets

use crate::dataset::Record;
use crate::CrawlerError;
use std::path::Path;

/// Column order of the dataset file
pub const DATASET_COLUMNS: [&str; 5] = ["title", "category", "price", "rating", "product_page_url"];

/// Writes all records to `path`, truncating any existing file
///
/// The header row is always written, even for an empty dataset.
pub fn write_csv(path: &Path, records: &[Record]) -> Result<(), CrawlerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(DATASET_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Reads records from a dataset file
///
/// The header must match [`DATASET_COLUMNS`] exactly.
pub fn read_csv(path: &Path) -> Result<Vec<Record>, CrawlerError> {
    let mut reader = csv::ReaderBuilder::new().from_path(path)?;

    let headers = reader.headers()?.clone();
    if !headers.iter().eq(DATASET_COLUMNS.iter().copied()) {
        return Err(CrawlerError::Dataset(format!(
            "Unexpected columns in {}: {:?}",
            path.display(),
            headers
        )));
    }

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: Record = row?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record {
                title: "A Light in the Attic".to_string(),
                category: "Poetry".to_string(),
                price: 51.77,
                rating: 3,
                product_page_url: "https://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html"
                    .to_string(),
            },
            Record {
                title: "Tipping, the \"Velvet\", Point".to_string(),
                category: "UNKNOWN".to_string(),
                price: 0.0,
                rating: 0,
                product_page_url: "https://books.toscrape.com/".to_string(),
            },
        ]
    }

    #[test]
    fn test_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");

        write_csv(&path, &sample()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();

        assert_eq!(
            lines.next(),
            Some("title,category,price,rating,product_page_url")
        );
        assert_eq!(
            lines.next(),
            Some("A Light in the Attic,Poetry,51.77,3,https://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html")
        );
    }

    #[test]
    fn test_quoted_titles_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");

        write_csv(&path, &sample()).unwrap();
        assert_eq!(read_csv(&path).unwrap(), sample());
    }

    #[test]
    fn test_empty_dataset_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_csv(&path, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), "title,category,price,rating,product_page_url");
        assert!(read_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("books.csv");

        write_csv(&path, &sample()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rejects_foreign_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "name,cost\nfoo,1\n").unwrap();

        assert!(matches!(read_csv(&path), Err(CrawlerError::Dataset(_))));
    }
}
