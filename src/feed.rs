//! Feed adapter: writes externally sourced records into a store.

use crate::error::{Result, StoreError};
use crate::store::RecordStore;
use crate::types::Record;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Turns external records into [`RecordStore::set`] calls, one per record.
///
/// No batching and no retries. Validation is whatever `set` does.
pub struct FeedAdapter<'a, T: Record> {
    store: &'a RecordStore<T>,
}

impl<'a, T: Record> FeedAdapter<'a, T> {
    pub fn new(store: &'a RecordStore<T>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a RecordStore<T> {
        self.store
    }

    /// Write one record.
    pub fn add_record(&self, record: T) -> Result<()> {
        self.store.set(record)
    }

    /// Write records in order, stopping at the first failure.
    ///
    /// Returns the number written. Records before the failure stay written.
    pub fn add_all<I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let mut count = 0;
        for record in records {
            self.add_record(record)?;
            count += 1;
        }
        Ok(count)
    }
}

impl<'a, T: Record + DeserializeOwned> FeedAdapter<'a, T> {
    /// Load a JSON array of records.
    ///
    /// The whole document is parsed before anything is written, so a parse
    /// error leaves the store untouched.
    pub fn load_json<R: Read>(&self, reader: R) -> Result<usize> {
        let records: Vec<T> = serde_json::from_reader(reader)?;
        let count = self.add_all(records)?;
        debug!(store = %self.store.config().name, count, "loaded JSON feed");
        Ok(count)
    }

    /// Load one JSON record per line. Blank lines are skipped.
    pub fn load_json_lines<R: BufRead>(&self, reader: R) -> Result<usize> {
        let mut count = 0;
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: T = serde_json::from_str(&line).map_err(|e| {
                StoreError::Deserialization(format!("line {}: {}", index + 1, e))
            })?;
            self.add_record(record)?;
            count += 1;
        }
        debug!(store = %self.store.config().name, count, "loaded JSON lines feed");
        Ok(count)
    }

    /// Load a feed file. `.jsonl` and `.ndjson` files are read as JSON lines,
    /// anything else as a JSON array.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jsonl") | Some("ndjson") => self.load_json_lines(reader),
            _ => self.load_json(reader),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::Pokemon;
    use std::io::Cursor;

    #[test]
    fn test_add_record() {
        let store = RecordStore::new();
        let feed = FeedAdapter::new(&store);

        feed.add_record(Pokemon::new("eevee", 55, 50)).unwrap();
        assert_eq!(store.get("eevee").unwrap().attack, 55);
    }

    #[test]
    fn test_add_record_propagates_invalid() {
        let store = RecordStore::new();
        let feed = FeedAdapter::new(&store);

        let result = feed.add_all(vec![
            Pokemon::new("eevee", 55, 50),
            Pokemon::new("", 1, 1),
            Pokemon::new("vulpix", 41, 40),
        ]);
        assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
        assert_eq!(store.ids(), vec!["eevee"]);
    }

    #[test]
    fn test_load_json_array() {
        let store = RecordStore::<Pokemon>::new();
        let data = r#"[
            {"id": "bulbasaur", "attack": 49, "defense": 49},
            {"id": "ivysaur", "attack": 62, "defense": 63}
        ]"#;

        let count = FeedAdapter::new(&store).load_json(data.as_bytes()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.ids(), vec!["bulbasaur", "ivysaur"]);
    }

    #[test]
    fn test_load_json_parse_error_writes_nothing() {
        let store = RecordStore::<Pokemon>::new();
        let data = r#"[{"id": "bulbasaur", "attack": 49, "defense": 49}, {"id": 3}]"#;

        let result = FeedAdapter::new(&store).load_json(data.as_bytes());
        assert!(matches!(result, Err(StoreError::Deserialization(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_json_lines() {
        let store = RecordStore::<Pokemon>::new();
        let data = "{\"id\": \"pidgey\", \"attack\": 45, \"defense\": 40}\n\n{\"id\": \"rattata\", \"attack\": 56, \"defense\": 35}\n";

        let count = FeedAdapter::new(&store)
            .load_json_lines(Cursor::new(data))
            .unwrap();
        assert_eq!(count, 2);
        assert!(store.contains("rattata"));
    }

    #[test]
    fn test_load_json_lines_reports_line() {
        let store = RecordStore::<Pokemon>::new();
        let data = "{\"id\": \"pidgey\", \"attack\": 45, \"defense\": 40}\nnot json\n";

        let err = FeedAdapter::new(&store)
            .load_json_lines(Cursor::new(data))
            .unwrap_err();
        match err {
            StoreError::Deserialization(msg) => assert!(msg.starts_with("line 2:")),
            other => panic!("Expected Deserialization error, got {:?}", other),
        }
        assert!(store.contains("pidgey"));
    }
}
